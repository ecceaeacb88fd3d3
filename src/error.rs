//! Errors raised while building or writing a message. Usage and validation
//! problems are not errors; they are reported through `Invocation::Help` and
//! `validate::Violation`.
use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid mailbox '{address}': {source}")]
    Address {
        address: String,
        source: lettre::address::AddressError,
    },

    #[error("failed to assemble message: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("cannot read attachment {}: {source}", path.display())]
    Attachment { path: PathBuf, source: io::Error },

    #[error("attachment path {} has no file name", path.display())]
    AttachmentName { path: PathBuf },

    #[error("unsupported content type '{0}'")]
    ContentType(String),

    #[error("cannot write eml file to {}: {source}", dir.display())]
    Write { dir: PathBuf, source: io::Error },
}
