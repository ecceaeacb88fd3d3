pub mod args;
pub mod email;
pub mod error;
pub mod usage;
pub mod validate;

use std::ffi::OsString;
use std::path::PathBuf;

use tracing::debug;

pub use args::{Flag, HelpReason, Invocation, Request, parse};
pub use email::{build_message, deliver, write_eml};
pub use error::{Error, Result};
pub use validate::{Violation, validate};

/// How a single invocation ended when no build error occurred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Help(HelpReason),
    Invalid(Vec<Violation>),
    Written { dir: PathBuf, path: PathBuf },
}

/// Runs the whole pipeline for an already parsed invocation.
pub fn execute(invocation: Invocation) -> Result<Outcome> {
    let request = match invocation {
        Invocation::Help(reason) => return Ok(Outcome::Help(reason)),
        Invocation::Send(request) => request,
    };

    if let Err(violations) = validate(&request) {
        return Ok(Outcome::Invalid(violations));
    }

    debug!(dir = %request.output_dir.display(), "request is valid, building message");
    let path = deliver(&request)?;
    Ok(Outcome::Written {
        dir: request.output_dir,
        path,
    })
}

/// Parses `tokens` and runs the pipeline.
pub fn run<I, S>(tokens: I) -> Result<Outcome>
where
    I: IntoIterator<Item = S>,
    S: Into<OsString>,
{
    execute(parse(tokens))
}
