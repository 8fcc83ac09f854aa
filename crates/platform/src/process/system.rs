//! Process operations backed by `tokio::process`

use async_trait::async_trait;
use depbuild_errors::{Error, PlatformError};
use std::process::Stdio;
use std::time::Instant;
use tokio::process::Command;
use tracing::debug;

use super::{CommandOutput, PlatformCommand, ProcessOperations};

/// Runs commands as real child processes
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemProcessOperations;

impl SystemProcessOperations {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProcessOperations for SystemProcessOperations {
    async fn execute_command(&self, cmd: PlatformCommand) -> Result<CommandOutput, Error> {
        let start = Instant::now();
        let command_line = cmd.command_line();

        let mut command = Command::new(cmd.program());
        command.args(cmd.get_args());

        if let Some(dir) = cmd.get_current_dir() {
            command.current_dir(dir);
        }

        if let Some(env) = cmd.get_env_vars() {
            command.env_clear();
            command.envs(env);
        }

        debug!(
            command = %command_line,
            cwd = ?cmd.get_current_dir(),
            "spawning process"
        );

        let result = if cmd.captures_output() {
            command.stdin(Stdio::null());
            command.output().await.map(|output| CommandOutput {
                exit_code: output.status.code(),
                stdout: output.stdout,
                stderr: output.stderr,
            })
        } else {
            command
                .stdin(Stdio::inherit())
                .stdout(Stdio::inherit())
                .stderr(Stdio::inherit());
            command.status().await.map(|status| CommandOutput {
                exit_code: status.code(),
                ..CommandOutput::default()
            })
        };

        let output = result.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => PlatformError::CommandNotFound {
                command: cmd.program().to_string(),
            },
            _ => PlatformError::ProcessExecutionFailed {
                command: command_line.clone(),
                message: e.to_string(),
            },
        })?;

        debug!(
            command = %command_line,
            exit_code = ?output.exit_code,
            elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
            "process finished"
        );

        Ok(output)
    }
}
