use std::io::{self, BufRead, Write};

/// Literal the user must type to allow a destructive overwrite
pub const CONFIRM_TOKEN: &str = "OVERWRITE";

/// Source of the go-ahead for a destructive run
pub trait Confirm {
    /// Show `prompt` and return whether the reply is exactly `token`
    fn confirm(&self, prompt: &str, token: &str) -> io::Result<bool>;
}

/// Read one line and compare it to `token`.
///
/// Only the line terminator is stripped; surrounding spaces or a different
/// case do not match. End of input counts as a refusal.
pub fn read_confirmation<R: BufRead>(mut reader: R, token: &str) -> io::Result<bool> {
    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 {
        return Ok(false);
    }

    let reply = line
        .strip_suffix('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .unwrap_or(line.as_str());

    Ok(reply == token)
}

/// Blocking prompt on stderr, answered on stdin. There is no timeout.
#[derive(Debug, Default)]
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&self, prompt: &str, token: &str) -> io::Result<bool> {
        let mut stderr = io::stderr();
        write!(stderr, "{}", prompt)?;
        stderr.flush()?;

        read_confirmation(io::stdin().lock(), token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_exact_token_confirms() {
        assert!(read_confirmation(Cursor::new("OVERWRITE\n"), CONFIRM_TOKEN).unwrap());
        assert!(read_confirmation(Cursor::new("OVERWRITE\r\n"), CONFIRM_TOKEN).unwrap());
        assert!(read_confirmation(Cursor::new("OVERWRITE"), CONFIRM_TOKEN).unwrap());
    }

    #[test]
    fn test_anything_else_refuses() {
        for reply in ["overwrite\n", "yes\n", " OVERWRITE\n", "OVERWRITE \n", "\n", "y\n"] {
            assert!(
                !read_confirmation(Cursor::new(reply), CONFIRM_TOKEN).unwrap(),
                "{:?} should not confirm",
                reply
            );
        }
    }

    #[test]
    fn test_end_of_input_refuses() {
        assert!(!read_confirmation(Cursor::new(""), CONFIRM_TOKEN).unwrap());
    }

    #[test]
    fn test_only_first_line_counts() {
        assert!(!read_confirmation(Cursor::new("no\nOVERWRITE\n"), CONFIRM_TOKEN).unwrap());
    }
}
