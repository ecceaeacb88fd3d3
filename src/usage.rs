pub const USAGE: &str = r#"
-d destination folder where the eml file is written.
-f from email address.
-t to email address.
-s subject text.
-b body text.
-a attachments - attachment paths separated by a space. Paths after a
   literal -- are taken as file names even if they look like flags.
-h help.

Example

-d "/tmp" -f "mail@gmail.com" -t "import@mail.com" -s "Test email" -b "Test email body." -a "/tmp/test.txt" "/tmp/test2.txt"
"#;

/// Usage text, prefixed by the reason when help was not asked for explicitly.
pub fn render(reason: &crate::args::HelpReason) -> String {
    use crate::args::HelpReason;

    match reason {
        HelpReason::NoArguments | HelpReason::Requested => USAGE.to_string(),
        reason => format!("{}\n{}", reason, USAGE),
    }
}
