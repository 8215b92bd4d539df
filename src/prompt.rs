//! Interactive prompt boundary.

use std::io::{BufRead as _, Write as _};

/// Capability seam for the interactive questions asked while seeding `.env`.
///
/// A provider returns the answer for one question; whatever it returns is
/// used verbatim, and providers are expected to substitute `default` when the
/// user gives no input. Non-interactive callers use [`DefaultAnswers`].
pub trait AnswerProvider: Send + Sync {
    /// Ask one question and return the answer (or the default).
    fn ask(&self, prompt: &str, default: &str) -> String;
}

/// Terminal provider: prints `prompt [default]: ` and reads one line from
/// stdin. Empty input, EOF, or a read error all fall back to the default.
#[derive(Debug, Default)]
pub struct StdinAnswers;

impl StdinAnswers {
    /// Create a stdin-backed provider.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl AnswerProvider for StdinAnswers {
    #[allow(clippy::print_stdout)]
    fn ask(&self, prompt: &str, default: &str) -> String {
        if default.is_empty() {
            print!("{prompt}: ");
        } else {
            print!("{prompt} [{default}]: ");
        }
        let _ = std::io::stdout().flush();

        let mut input = String::new();
        if std::io::stdin().lock().read_line(&mut input).is_err() {
            return default.to_string();
        }
        let answer = input.trim();
        if answer.is_empty() {
            default.to_string()
        } else {
            answer.to_string()
        }
    }
}

/// Provider that always answers with the default. Used by `--defaults` and
/// by any non-interactive caller.
#[derive(Debug, Default)]
pub struct DefaultAnswers;

impl DefaultAnswers {
    /// Create a defaults-only provider.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl AnswerProvider for DefaultAnswers {
    fn ask(&self, _prompt: &str, default: &str) -> String {
        default.to_string()
    }
}
