//! CLI error handling

use std::fmt;

use depbuild_errors::UserFacingError;

/// CLI-specific error type
#[derive(Debug)]
pub enum CliError {
    /// Configuration error
    Config(depbuild_errors::ConfigError),
    /// Error from the build pipeline
    Build(depbuild_errors::Error),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(e) => write!(f, "Configuration error: {e}"),
            CliError::Build(e) => {
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
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Config(e) => Some(e),
            CliError::Build(e) => Some(e),
        }
    }
}

impl From<depbuild_errors::ConfigError> for CliError {
    fn from(e: depbuild_errors::ConfigError) -> Self {
        CliError::Config(e)
    }
}

impl From<depbuild_errors::Error> for CliError {
    fn from(e: depbuild_errors::Error) -> Self {
        match e {
            depbuild_errors::Error::Config(config) => CliError::Config(config),
            other => CliError::Build(other),
        }
    }
}
