//! CLI error handling

use std::fmt;

use liftoff_errors::UserFacingError;

/// CLI-specific error type
#[derive(Debug)]
pub enum CliError {
    /// Manifest loading error
    Config(liftoff_errors::Error),
    /// Operations error
    Ops(liftoff_errors::Error),
    /// I/O error
    Io(std::io::Error),
}

impl CliError {
    /// Tag a library error as coming from manifest loading
    pub fn config(e: liftoff_errors::Error) -> Self {
        CliError::Config(e)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(e) | CliError::Ops(e) => {
                if matches!(self, CliError::Config(_)) {
                    write!(f, "Manifest error: ")?;
                }
                let message = e.user_message();
                write!(f, "{message}")?;
                if let Some(code) = e.user_code() {
                    write!(f, "\n  Code: {code}")?;
                }
                if let Some(hint) = e.user_hint() {
                    write!(f, "\n  Hint: {hint}")?;
                }
                if e.is_retryable() {
                    write!(f, "\n  Retry: safe to retry this operation.")?;
                }
                Ok(())
            }
            CliError::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Config(e) | CliError::Ops(e) => Some(e),
            CliError::Io(e) => Some(e),
        }
    }
}

impl From<liftoff_errors::Error> for CliError {
    fn from(e: liftoff_errors::Error) -> Self {
        CliError::Ops(e)
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e)
    }
}
