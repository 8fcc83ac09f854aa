//! Build pipeline error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum BuildError {
    #[error("Checksum for {file} doesn't match! expected {expected}, got {actual}")]
    HashMismatch {
        file: String,
        expected: String,
        actual: String,
    },

    #[error("extraction failed: {message}")]
    ExtractionFailed { message: String },

    #[error("archive {archive} lists no entries")]
    EmptyArchive { archive: String },

    #[error("command `{command}` failed: {}", exit_description(.code))]
    CommandFailed { command: String, code: Option<i32> },

    #[error("invalid URL: {url}")]
    InvalidUrl { url: String },
}

#[allow(clippy::ref_option)]
fn exit_description(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "terminated by signal".to_string(),
    }
}

impl UserFacingError for BuildError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::HashMismatch { .. } => Some(
                "Delete the cached archive from the build directory so it is downloaded again.",
            ),
            Self::ExtractionFailed { .. } | Self::EmptyArchive { .. } => {
                Some("The archive may be truncated; remove it and rerun the build.")
            }
            Self::CommandFailed { .. } => {
                Some("Inspect the command output above and fix the toolchain or flags.")
            }
            Self::InvalidUrl { .. } => Some("Correct the source URL of the package."),
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::HashMismatch { .. } => "build.hash_mismatch",
            Self::ExtractionFailed { .. } => "build.extraction_failed",
            Self::EmptyArchive { .. } => "build.empty_archive",
            Self::CommandFailed { .. } => "build.command_failed",
            Self::InvalidUrl { .. } => "build.invalid_url",
        };
        Some(code)
    }
}
