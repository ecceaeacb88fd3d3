use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::PathBuf;

use tracing::debug;

/// Token that turns the rest of an attachment list into literal paths.
pub const LITERAL_SEPARATOR: &str = "--";

/// Command-line switches understood by the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flag {
    OutputDir,
    From,
    To,
    Subject,
    Body,
    Attachments,
    Help,
}

impl Flag {
    pub const ALL: [Flag; 7] = [
        Flag::OutputDir,
        Flag::From,
        Flag::To,
        Flag::Subject,
        Flag::Body,
        Flag::Attachments,
        Flag::Help,
    ];

    pub fn from_token(token: &str) -> Option<Flag> {
        Flag::ALL.into_iter().find(|flag| flag.as_str() == token)
    }

    fn from_os_token(token: &OsStr) -> Option<Flag> {
        token.to_str().and_then(Flag::from_token)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Flag::OutputDir => "-d",
            Flag::From => "-f",
            Flag::To => "-t",
            Flag::Subject => "-s",
            Flag::Body => "-b",
            Flag::Attachments => "-a",
            Flag::Help => "-h",
        }
    }

    /// Flags whose value must be present and non-empty for the invocation
    /// to make sense at all.
    fn requires_value(self) -> bool {
        matches!(self, Flag::OutputDir | Flag::From | Flag::To)
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why the invocation ended up showing usage instead of writing a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HelpReason {
    NoArguments,
    Requested,
    UnknownToken(String),
    /// The flag was the last token, so no value followed it.
    MissingValue(Flag),
    /// The flag was followed by an empty string.
    EmptyValue(Flag),
}

impl fmt::Display for HelpReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HelpReason::NoArguments => f.write_str("no arguments given"),
            HelpReason::Requested => f.write_str("help requested"),
            HelpReason::UnknownToken(token) => write!(f, "unrecognized argument '{}'", token),
            HelpReason::MissingValue(flag) => write!(f, "{} expects a value", flag),
            HelpReason::EmptyValue(flag) => write!(f, "{} value must not be empty", flag),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Request {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
    pub attachments: Vec<PathBuf>,
    pub output_dir: PathBuf,
}

/// Result of parsing the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    Help(HelpReason),
    Send(Request),
}

/// One flag together with whatever tokens it consumed.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Arg {
    Value(Flag, Option<OsString>),
    Attachments(Vec<PathBuf>),
    Help,
}

impl Request {
    fn apply(self, arg: Arg) -> Result<Request, HelpReason> {
        match arg {
            Arg::Help => Err(HelpReason::Requested),
            Arg::Attachments(attachments) => Ok(Request {
                attachments,
                ..self
            }),
            Arg::Value(flag, value) => {
                let value = match value {
                    None if flag.requires_value() => return Err(HelpReason::MissingValue(flag)),
                    Some(v) if v.is_empty() && flag.requires_value() => {
                        return Err(HelpReason::EmptyValue(flag));
                    }
                    value => value.unwrap_or_default(),
                };
                // Paths keep their raw bytes; text fields only need to be
                // displayable, and a mangled address fails validation anyway.
                Ok(match flag {
                    Flag::OutputDir => Request {
                        output_dir: PathBuf::from(value),
                        ..self
                    },
                    Flag::From => Request {
                        from: lossy(value),
                        ..self
                    },
                    Flag::To => Request {
                        to: lossy(value),
                        ..self
                    },
                    Flag::Subject => Request {
                        subject: lossy(value),
                        ..self
                    },
                    Flag::Body => Request {
                        body: lossy(value),
                        ..self
                    },
                    Flag::Attachments | Flag::Help => self,
                })
            }
        }
    }
}

fn lossy(value: OsString) -> String {
    value
        .into_string()
        .unwrap_or_else(|raw| raw.to_string_lossy().into_owned())
}

/// Groups raw tokens into flag/value items, stopping at the first token
/// that is not a flag.
fn lex(tokens: Vec<OsString>) -> Result<Vec<Arg>, HelpReason> {
    let mut args = Vec::new();
    let mut tokens = tokens.into_iter().peekable();

    while let Some(token) = tokens.next() {
        let flag = Flag::from_os_token(&token)
            .ok_or_else(|| HelpReason::UnknownToken(lossy(token.clone())))?;
        let arg = match flag {
            Flag::Help => Arg::Help,
            Flag::Attachments => {
                let mut paths = Vec::new();
                while let Some(next) = tokens.next_if(|t| Flag::from_os_token(t).is_none()) {
                    if next == LITERAL_SEPARATOR {
                        paths.extend(tokens.by_ref().map(PathBuf::from));
                        break;
                    }
                    paths.push(PathBuf::from(next));
                }
                Arg::Attachments(paths)
            }
            _ => Arg::Value(flag, tokens.next()),
        };
        let stop = arg == Arg::Help;
        args.push(arg);
        if stop {
            break;
        }
    }

    Ok(args)
}

/// Parses command-line tokens (without the program name). Tokens are taken
/// as `OsString`s so that paths which are not valid UTF-8 survive intact.
pub fn parse<I, S>(tokens: I) -> Invocation
where
    I: IntoIterator<Item = S>,
    S: Into<OsString>,
{
    let tokens: Vec<OsString> = tokens.into_iter().map(Into::into).collect();
    if tokens.is_empty() {
        return Invocation::Help(HelpReason::NoArguments);
    }

    let parsed = lex(tokens).and_then(|args| {
        args.into_iter()
            .try_fold(Request::default(), |request, arg| request.apply(arg))
    });

    match parsed {
        Ok(request) => {
            debug!(
                attachments = request.attachments.len(),
                "parsed send request"
            );
            Invocation::Send(request)
        }
        Err(reason) => {
            debug!(%reason, "falling back to usage");
            Invocation::Help(reason)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn send(tokens: &[&str]) -> Request {
        match parse(tokens.iter().copied()) {
            Invocation::Send(request) => request,
            other => panic!("expected a send request, got {:?}", other),
        }
    }

    fn help(tokens: &[&str]) -> HelpReason {
        match parse(tokens.iter().copied()) {
            Invocation::Help(reason) => reason,
            other => panic!("expected help, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_input_shows_help() {
        assert_eq!(help(&[]), HelpReason::NoArguments);
    }

    #[test]
    fn test_full_invocation() {
        let request = send(&[
            "-d", "/tmp", "-f", "a@b.com", "-t", "c@d.com", "-s", "Hi", "-b", "Body", "-a",
            "/tmp/x.txt",
        ]);
        assert_eq!(request.output_dir, PathBuf::from("/tmp"));
        assert_eq!(request.from, "a@b.com");
        assert_eq!(request.to, "c@d.com");
        assert_eq!(request.subject, "Hi");
        assert_eq!(request.body, "Body");
        assert_eq!(request.attachments, vec![PathBuf::from("/tmp/x.txt")]);
    }

    #[test]
    fn test_help_flag_stops_parsing() {
        assert_eq!(help(&["-f", "a@b.com", "-h", "-t"]), HelpReason::Requested);
    }

    #[test]
    fn test_unknown_token_stops_parsing() {
        assert_eq!(
            help(&["-f", "a@b.com", "--from", "x", "-h"]),
            HelpReason::UnknownToken("--from".to_string())
        );
        assert_eq!(
            help(&["stray", "-d", "/tmp"]),
            HelpReason::UnknownToken("stray".to_string())
        );
    }

    #[test]
    fn test_missing_required_value() {
        assert_eq!(
            help(&["-t", "c@d.com", "-f"]),
            HelpReason::MissingValue(Flag::From)
        );
        assert_eq!(help(&["-d"]), HelpReason::MissingValue(Flag::OutputDir));
    }

    #[test]
    fn test_empty_required_value() {
        assert_eq!(
            help(&["-d", "", "-f", "a@b.com"]),
            HelpReason::EmptyValue(Flag::OutputDir)
        );
    }

    #[test]
    fn test_optional_values_may_be_empty_or_missing() {
        let request = send(&["-f", "a@b.com", "-s", "", "-b"]);
        assert_eq!(request.subject, "");
        assert_eq!(request.body, "");
        assert_eq!(request.from, "a@b.com");
    }

    #[test]
    fn test_value_flag_takes_next_token_verbatim() {
        let request = send(&["-s", "-t", "-b", "x"]);
        assert_eq!(request.subject, "-t");
        assert_eq!(request.body, "x");
    }

    #[test]
    fn test_attachments_stop_at_next_flag() {
        let request = send(&["-a", "one.txt", "two.pdf", "-f", "a@b.com", "-a"]);
        assert!(request.attachments.is_empty());

        let request = send(&["-a", "one.txt", "two.pdf", "-f", "a@b.com"]);
        assert_eq!(
            request.attachments,
            vec![PathBuf::from("one.txt"), PathBuf::from("two.pdf")]
        );
        assert_eq!(request.from, "a@b.com");
    }

    #[test]
    fn test_attachment_run_keeps_unknown_dash_tokens() {
        let request = send(&["-a", "-x", "-", "file", "-v"]);
        assert_eq!(
            request.attachments,
            vec![
                PathBuf::from("-x"),
                PathBuf::from("-"),
                PathBuf::from("file"),
                PathBuf::from("-v")
            ]
        );
    }

    #[test]
    fn test_unlisted_switch_is_unknown() {
        assert_eq!(help(&["-v"]), HelpReason::UnknownToken("-v".to_string()));
        assert_eq!(
            help(&["-f", "a@b.com", "-v", "-t", "c@d.com"]),
            HelpReason::UnknownToken("-v".to_string())
        );

        let request = send(&["-a", "x", "-v"]);
        assert_eq!(
            request.attachments,
            vec![PathBuf::from("x"), PathBuf::from("-v")]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_paths_are_kept_verbatim() {
        use std::os::unix::ffi::OsStringExt;

        let attachment = OsString::from_vec(b"/tmp/f\xFF.txt".to_vec());
        let dir = OsString::from_vec(b"/tmp/out\xFE".to_vec());
        let tokens = vec![
            OsString::from("-d"),
            dir.clone(),
            OsString::from("-f"),
            OsString::from("a@b.com"),
            OsString::from("-a"),
            attachment.clone(),
        ];

        match parse(tokens) {
            Invocation::Send(request) => {
                assert_eq!(request.output_dir, PathBuf::from(dir));
                assert_eq!(request.attachments, vec![PathBuf::from(attachment)]);
                assert_eq!(request.from, "a@b.com");
            }
            other => panic!("expected a send request, got {:?}", other),
        }

        let stray = OsString::from_vec(b"\xFF".to_vec());
        assert_eq!(
            parse(vec![stray]),
            Invocation::Help(HelpReason::UnknownToken("\u{FFFD}".to_string()))
        );
    }

    #[test]
    fn test_separator_makes_flag_spellings_literal() {
        let request = send(&["-f", "a@b.com", "-a", "x.txt", "--", "-d", "-a"]);
        assert_eq!(
            request.attachments,
            vec![
                PathBuf::from("x.txt"),
                PathBuf::from("-d"),
                PathBuf::from("-a")
            ]
        );
        assert_eq!(request.output_dir, PathBuf::new());
    }

    #[test]
    fn test_separator_outside_attachments_is_unknown() {
        assert_eq!(
            help(&["--", "-d", "/tmp"]),
            HelpReason::UnknownToken("--".to_string())
        );
    }

    #[test]
    fn test_last_write_wins() {
        let request = send(&["-f", "first@b.com", "-a", "a", "-f", "second@b.com", "-a", "b"]);
        assert_eq!(request.from, "second@b.com");
        assert_eq!(request.attachments, vec![PathBuf::from("b")]);
    }

    #[test]
    fn test_invalid_values_are_left_to_validation() {
        let request = send(&["-d", "/nonexistent", "-f", "bad", "-t", "c@d.com"]);
        assert_eq!(request.output_dir, PathBuf::from("/nonexistent"));
        assert_eq!(request.from, "bad");
        assert_eq!(request.to, "c@d.com");
    }

    #[test]
    fn test_flag_round_trips_through_token() {
        for flag in Flag::ALL {
            assert_eq!(Flag::from_token(flag.as_str()), Some(flag));
        }
        assert_eq!(Flag::from_token("-x"), None);
    }
}
