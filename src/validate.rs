use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::args::{Flag, Request};

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
        .expect("email pattern is a valid regex")
});

/// A rule the request broke. Each one renders as a single diagnostic line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Violation {
    InvalidFrom,
    InvalidTo,
    InvalidOutputDir,
}

impl Violation {
    pub fn flag(self) -> Flag {
        match self {
            Violation::InvalidFrom => Flag::From,
            Violation::InvalidTo => Flag::To,
            Violation::InvalidOutputDir => Flag::OutputDir,
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::InvalidFrom | Violation::InvalidTo => write!(
                f,
                "{} argument needs to contain a valid email address.",
                self.flag()
            ),
            Violation::InvalidOutputDir => write!(
                f,
                "{} argument needs to contain a valid destination path for the eml file.",
                self.flag()
            ),
        }
    }
}

pub fn is_email_address(candidate: &str) -> bool {
    !candidate.trim().is_empty() && EMAIL_PATTERN.is_match(candidate)
}

/// Checks every rule and reports all of the broken ones.
pub fn validate(request: &Request) -> Result<(), Vec<Violation>> {
    let mut violations = Vec::new();

    if !is_email_address(&request.from) {
        violations.push(Violation::InvalidFrom);
    }

    if !is_email_address(&request.to) {
        violations.push(Violation::InvalidTo);
    }

    if request.output_dir.as_os_str().is_empty() || !request.output_dir.is_dir() {
        violations.push(Violation::InvalidOutputDir);
    }

    if violations.is_empty() {
        Ok(())
    } else {
        debug!(count = violations.len(), "request failed validation");
        Err(violations)
    }
}
