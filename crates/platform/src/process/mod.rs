//! Process execution operations

mod system;

pub use system::SystemProcessOperations;

use async_trait::async_trait;
use depbuild_errors::Error;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Platform-specific command builder and execution
#[derive(Debug, Clone, Default)]
pub struct PlatformCommand {
    program: String,
    args: Vec<String>,
    current_dir: Option<PathBuf>,
    env: Option<BTreeMap<String, String>>,
    capture_output: bool,
}

impl PlatformCommand {
    /// Create a new platform command
    #[must_use]
    pub fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
            ..Self::default()
        }
    }

    /// Add an argument to the command
    pub fn arg<S: AsRef<str>>(&mut self, arg: S) -> &mut Self {
        self.args.push(arg.as_ref().to_string());
        self
    }

    /// Add multiple arguments to the command
    pub fn args<I, S>(&mut self, args: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for arg in args {
            self.args.push(arg.as_ref().to_string());
        }
        self
    }

    /// Set the working directory for the command
    pub fn current_dir<P: Into<PathBuf>>(&mut self, dir: P) -> &mut Self {
        self.current_dir = Some(dir.into());
        self
    }

    /// Replace the child's environment with exactly this map
    ///
    /// Without a call to this the child inherits the parent environment.
    pub fn envs(&mut self, env: &BTreeMap<String, String>) -> &mut Self {
        self.env = Some(env.clone());
        self
    }

    /// Collect stdout/stderr instead of passing them through to the terminal
    pub fn capture_output(&mut self, capture: bool) -> &mut Self {
        self.capture_output = capture;
        self
    }

    /// Get the program name
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Get the arguments
    #[must_use]
    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    /// Get the current directory
    #[must_use]
    pub fn get_current_dir(&self) -> Option<&PathBuf> {
        self.current_dir.as_ref()
    }

    /// Get the replacement environment, if one was set
    #[must_use]
    pub fn get_env_vars(&self) -> Option<&BTreeMap<String, String>> {
        self.env.as_ref()
    }

    #[must_use]
    pub fn captures_output(&self) -> bool {
        self.capture_output
    }

    /// Render the command line for logs and error messages
    #[must_use]
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Output from command execution
///
/// `stdout`/`stderr` are empty unless the command asked for capture.
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    pub exit_code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl CommandOutput {
    /// Whether the process exited with status zero
    #[must_use]
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Captured stdout decoded lossily
    #[must_use]
    pub fn stdout_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    /// Captured stderr decoded lossily
    #[must_use]
    pub fn stderr_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }
}

/// Trait for process execution operations
#[async_trait]
pub trait ProcessOperations: Send + Sync {
    /// Execute a command to completion and return its output
    ///
    /// A non-zero exit is reported through [`CommandOutput::exit_code`], not as an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the process could not be spawned or waited on.
    async fn execute_command(&self, cmd: PlatformCommand) -> Result<CommandOutput, Error>;

    /// Create a new command builder
    fn create_command(&self, program: &str) -> PlatformCommand {
        PlatformCommand::new(program)
    }
}
