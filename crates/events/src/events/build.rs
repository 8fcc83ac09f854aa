use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Events emitted around the external commands of a build chain
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BuildEvent {
    /// A CMake executable was located (or will be bootstrapped)
    ToolchainDetected {
        tool: String,
        path: Option<String>,
    },

    /// Command about to be spawned
    CommandStarted {
        package: String,
        command: String,
        working_dir: PathBuf,
    },

    /// Command exited successfully
    CommandCompleted { package: String, command: String },

    /// Command exited with a non-zero status or could not be spawned
    CommandFailed {
        package: String,
        command: String,
        exit_code: Option<i32>,
    },
}
