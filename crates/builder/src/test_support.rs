//! Shared fixtures for the unit tests

use crate::{BuildContext, BuildEnvironment, CmakeTool};
use async_trait::async_trait;
use depbuild_config::Config;
use depbuild_errors::{Error, PlatformError};
use depbuild_events::EventSender;
use depbuild_net::NetClient;
use depbuild_platform::{CommandOutput, PlatformCommand, ProcessOperations, SystemProcessOperations};
use std::path::Path;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
enum Rule {
    ExitProgram(String, i32),
    ExitMatching(String, i32),
    Unspawnable(String),
}

/// Records every command and pretends it succeeded unless a rule says otherwise
#[derive(Clone, Default)]
pub(crate) struct RecordingRunner {
    calls: Arc<Mutex<Vec<PlatformCommand>>>,
    rules: Vec<Rule>,
    delegate_tar: bool,
}

impl RecordingRunner {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Commands whose program is exactly `program` exit with `code`
    pub(crate) fn fail_program(mut self, program: &str, code: i32) -> Self {
        self.rules.push(Rule::ExitProgram(program.to_string(), code));
        self
    }

    /// Commands whose command line contains `pattern` exit with `code`
    pub(crate) fn fail_matching(mut self, pattern: &str, code: i32) -> Self {
        self.rules.push(Rule::ExitMatching(pattern.to_string(), code));
        self
    }

    /// Commands running `program` cannot be spawned
    pub(crate) fn unspawnable(mut self, program: &str) -> Self {
        self.rules.push(Rule::Unspawnable(program.to_string()));
        self
    }

    /// Hand `tar` invocations that no rule matched to the real system
    pub(crate) fn delegate_tar(mut self) -> Self {
        self.delegate_tar = true;
        self
    }

    pub(crate) fn calls(&self) -> Vec<PlatformCommand> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProcessOperations for RecordingRunner {
    async fn execute_command(&self, cmd: PlatformCommand) -> Result<CommandOutput, Error> {
        self.calls.lock().unwrap().push(cmd.clone());

        let line = cmd.command_line();
        for rule in &self.rules {
            match rule {
                Rule::Unspawnable(program) if cmd.program() == program => {
                    return Err(PlatformError::ProcessExecutionFailed {
                        command: line,
                        message: "No such file or directory".to_string(),
                    }
                    .into());
                }
                Rule::ExitProgram(program, code) if cmd.program() == program => {
                    return Ok(CommandOutput {
                        exit_code: Some(*code),
                        ..CommandOutput::default()
                    });
                }
                Rule::ExitMatching(pattern, code) if line.contains(pattern.as_str()) => {
                    return Ok(CommandOutput {
                        exit_code: Some(*code),
                        ..CommandOutput::default()
                    });
                }
                _ => {}
            }
        }

        if self.delegate_tar && cmd.program() == "tar" {
            return SystemProcessOperations.execute_command(cmd).await;
        }

        Ok(CommandOutput {
            exit_code: Some(0),
            ..CommandOutput::default()
        })
    }
}

pub(crate) fn config_for(root: &Path) -> Config {
    let mut config = Config::default();
    config.paths.root = Some(root.to_path_buf());
    config
}

pub(crate) fn context_for(
    root: &Path,
    runner: RecordingRunner,
    tx: EventSender,
    cmake: CmakeTool,
) -> BuildContext {
    let inherited = vec![("PATH".to_string(), "/usr/bin:/bin".to_string())];
    let env = BuildEnvironment::new(&config_for(root), inherited, cmake);
    BuildContext::new(env, NetClient::with_defaults().unwrap(), Arc::new(runner), tx)
}

/// Uncompressed tar whose entries all live under `top/`
pub(crate) fn tar_bytes(top: &str, files: &[(&str, &str)]) -> Vec<u8> {
    let mut builder = tar::Builder::new(Vec::new());
    for (name, contents) in files {
        let mut header = tar::Header::new_gnu();
        header.set_size(contents.len() as u64);
        header.set_mode(0o644);
        builder
            .append_data(&mut header, format!("{top}/{name}"), contents.as_bytes())
            .unwrap();
    }
    builder.into_inner().unwrap()
}

pub(crate) fn write_tar(archive: &Path, top: &str, files: &[(&str, &str)]) {
    std::fs::write(archive, tar_bytes(top, files)).unwrap();
}
