//! Build command chains
//!
//! A package describes how it is built as a list of [`BuildStep`]s. The
//! concrete command lines are only rendered at execution time, against the
//! shared [`BuildEnvironment`], so the prefix and the CMake executable are
//! whatever the environment settled on for this run.

mod autotools;
mod cmake;

use crate::{BuildContext, BuildEnvironment};
use autotools::Linkage;
use depbuild_errors::{BuildError, Error};
use depbuild_events::{AppEvent, BuildEvent, EventEmitter};
use std::fmt;
use std::path::Path;
use tracing::{error, info};

/// Argument list for presets that take no extra flags
pub const NO_ARGS: [&str; 0] = [];

/// One external command of a build
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildStep {
    /// `./configure --prefix=<prefix> <args>`
    Configure { args: Vec<String> },
    /// `./configure --prefix=<prefix> --enable-static --disable-shared <args>`
    ConfigureStatic { args: Vec<String> },
    /// `<cmake> -DCMAKE_INSTALL_PREFIX=<prefix> <args> .`
    CMake { args: Vec<String> },
    /// `make <args>`
    Make { args: Vec<String> },
    /// `make <args> install`
    Install { args: Vec<String> },
}

fn owned<I, S>(args: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    args.into_iter().map(Into::into).collect()
}

impl BuildStep {
    #[must_use]
    pub fn configure<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Configure { args: owned(args) }
    }

    #[must_use]
    pub fn configure_static<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::ConfigureStatic { args: owned(args) }
    }

    #[must_use]
    pub fn cmake<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::CMake { args: owned(args) }
    }

    #[must_use]
    pub fn make<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Make { args: owned(args) }
    }

    #[must_use]
    pub fn install<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Install { args: owned(args) }
    }

    /// Full argument vector, program first
    #[must_use]
    pub fn argv(&self, env: &BuildEnvironment) -> Vec<String> {
        match self {
            Self::Configure { args } => {
                autotools::configure_argv(env.prefix(), Linkage::Default, args)
            }
            Self::ConfigureStatic { args } => {
                autotools::configure_argv(env.prefix(), Linkage::StaticOnly, args)
            }
            Self::CMake { args } => cmake::cmake_argv(env.cmake().executable(), env.prefix(), args),
            Self::Make { args } => autotools::make_argv(env.make(), args, false),
            Self::Install { args } => autotools::make_argv(env.make(), args, true),
        }
    }

    #[must_use]
    pub fn args(&self) -> &[String] {
        match self {
            Self::Configure { args }
            | Self::ConfigureStatic { args }
            | Self::CMake { args }
            | Self::Make { args }
            | Self::Install { args } => args,
        }
    }
}

impl fmt::Display for BuildStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            Self::Configure { .. } => "configure",
            Self::ConfigureStatic { .. } => "configure (static)",
            Self::CMake { .. } => "cmake",
            Self::Make { .. } => "make",
            Self::Install { .. } => "make install",
        };
        f.write_str(kind)?;
        for arg in self.args() {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Ordered steps run one after another in a package's working directory
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandChain {
    steps: Vec<BuildStep>,
}

impl CommandChain {
    #[must_use]
    pub fn new(steps: Vec<BuildStep>) -> Self {
        Self { steps }
    }

    /// Static-only autotools library: configure, then install
    #[must_use]
    pub fn library<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(vec![
            BuildStep::configure_static(args),
            BuildStep::Install { args: Vec::new() },
        ])
    }

    /// Autotools program: configure, then install
    #[must_use]
    pub fn tool<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(vec![
            BuildStep::configure(args),
            BuildStep::Install { args: Vec::new() },
        ])
    }

    /// CMake project: configure in source, then install
    #[must_use]
    pub fn cmake_install<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(vec![
            BuildStep::cmake(args),
            BuildStep::Install { args: Vec::new() },
        ])
    }

    /// Append a step
    #[must_use]
    pub fn then(mut self, step: BuildStep) -> Self {
        self.steps.push(step);
        self
    }

    #[must_use]
    pub fn steps(&self) -> &[BuildStep] {
        &self.steps
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Run every step in `workdir` with the environment's variables
    ///
    /// Output goes straight to the terminal. The first step that cannot be
    /// spawned or exits non-zero stops the chain.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::CommandFailed`] for a non-zero exit, or the
    /// spawn error of the failing step.
    pub async fn execute(
        &self,
        ctx: &BuildContext,
        package: &str,
        workdir: &Path,
    ) -> Result<(), Error> {
        for step in &self.steps {
            let argv = step.argv(ctx.env());
            let Some((program, args)) = argv.split_first() else {
                continue;
            };
            let command_line = argv.join(" ");

            let mut cmd = ctx.runner().create_command(program);
            cmd.args(args)
                .current_dir(workdir)
                .envs(ctx.env().env_vars());

            info!(package = %package, command = %command_line, "running build command");
            ctx.emit(AppEvent::Build(BuildEvent::CommandStarted {
                package: package.to_string(),
                command: command_line.clone(),
                working_dir: workdir.to_path_buf(),
            }));

            let exit_code = match ctx.runner().execute_command(cmd).await {
                Ok(output) if output.success() => {
                    ctx.emit(AppEvent::Build(BuildEvent::CommandCompleted {
                        package: package.to_string(),
                        command: command_line,
                    }));
                    continue;
                }
                Ok(output) => output.exit_code,
                Err(e) => {
                    error!(package = %package, command = %command_line, error = %e, "could not start build command");
                    ctx.emit(AppEvent::Build(BuildEvent::CommandFailed {
                        package: package.to_string(),
                        command: command_line,
                        exit_code: None,
                    }));
                    return Err(e);
                }
            };

            error!(package = %package, command = %command_line, exit_code = ?exit_code, "build command failed");
            ctx.emit(AppEvent::Build(BuildEvent::CommandFailed {
                package: package.to_string(),
                command: command_line.clone(),
                exit_code,
            }));
            return Err(BuildError::CommandFailed {
                command: command_line,
                code: exit_code,
            }
            .into());
        }

        Ok(())
    }
}

/// A package's build instructions: one chain or several run back to back
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    Chain(CommandChain),
    Sequence(Vec<CommandChain>),
}

impl Commands {
    /// All steps in execution order
    #[must_use]
    pub fn flatten(&self) -> CommandChain {
        match self {
            Self::Chain(chain) => chain.clone(),
            Self::Sequence(chains) => CommandChain::new(
                chains
                    .iter()
                    .flat_map(|chain| chain.steps().iter().cloned())
                    .collect(),
            ),
        }
    }
}

impl Default for Commands {
    /// A static library with no extra configure flags
    fn default() -> Self {
        Self::Chain(CommandChain::library(NO_ARGS))
    }
}

impl From<CommandChain> for Commands {
    fn from(chain: CommandChain) -> Self {
        Self::Chain(chain)
    }
}

impl From<Vec<CommandChain>> for Commands {
    fn from(chains: Vec<CommandChain>) -> Self {
        Self::Sequence(chains)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{context_for, RecordingRunner};
    use crate::CmakeTool;
    use depbuild_events::channel;
    use tempfile::tempdir;

    #[test]
    fn test_presets() {
        assert_eq!(
            CommandChain::library(["--disable-cpplibs"]).steps(),
            [
                BuildStep::configure_static(["--disable-cpplibs"]),
                BuildStep::Install { args: Vec::new() },
            ]
        );
        assert_eq!(
            CommandChain::tool(NO_ARGS).steps()[0],
            BuildStep::Configure { args: Vec::new() }
        );
        assert_eq!(
            CommandChain::cmake_install(["-DLIB_SUFFIX="]).steps()[0],
            BuildStep::cmake(["-DLIB_SUFFIX="])
        );
        assert_eq!(Commands::default(), Commands::Chain(CommandChain::library(NO_ARGS)));
    }

    #[test]
    fn test_sequence_flattens_in_order() {
        let commands = Commands::from(vec![
            CommandChain::new(vec![BuildStep::make(["-C", "lib"])]),
            CommandChain::tool(["--quiet"]),
        ]);
        let flat = commands.flatten();
        assert_eq!(flat.steps().len(), 3);
        assert_eq!(flat.steps()[0], BuildStep::make(["-C", "lib"]));
        assert_eq!(flat.steps()[2], BuildStep::Install { args: Vec::new() });
    }

    #[test]
    fn test_display() {
        assert_eq!(
            BuildStep::configure_static(["--without-x"]).to_string(),
            "configure (static) --without-x"
        );
        assert_eq!(BuildStep::Install { args: Vec::new() }.to_string(), "make install");
    }

    #[tokio::test]
    async fn test_chain_runs_each_step_in_workdir() {
        let root = tempdir().unwrap();
        let runner = RecordingRunner::new();
        let (tx, mut rx) = channel();
        let ctx = context_for(root.path(), runner.clone(), tx, CmakeTool::Bootstrap);
        let workdir = root.path().join("libogg-1.3.4");

        let chain = CommandChain::new(vec![
            BuildStep::configure(["--enable-foo"]),
            BuildStep::Make { args: Vec::new() },
            BuildStep::Install { args: Vec::new() },
        ]);
        chain.execute(&ctx, "ogg", &workdir).await.unwrap();

        let calls = runner.calls();
        assert_eq!(calls.len(), 3);

        let prefix = ctx.env().prefix().display().to_string();
        assert_eq!(calls[0].program(), "./configure");
        assert_eq!(
            calls[0].get_args(),
            [format!("--prefix={prefix}"), "--enable-foo".to_string()]
        );
        assert_eq!(calls[1].command_line(), "make");
        assert_eq!(calls[2].command_line(), "make install");

        for call in &calls {
            assert_eq!(call.get_current_dir(), Some(&workdir));
            assert_eq!(call.get_env_vars(), Some(ctx.env().env_vars()));
            assert!(!call.captures_output());
        }

        let mut started = 0;
        let mut completed = 0;
        while let Ok(event) = rx.try_recv() {
            match event {
                AppEvent::Build(BuildEvent::CommandStarted { .. }) => started += 1,
                AppEvent::Build(BuildEvent::CommandCompleted { .. }) => completed += 1,
                _ => {}
            }
        }
        assert_eq!((started, completed), (3, 3));
    }

    #[tokio::test]
    async fn test_chain_stops_at_first_failure() {
        let root = tempdir().unwrap();
        let runner = RecordingRunner::new().fail_matching("make -j1", 2);
        let (tx, _rx) = channel();
        let ctx = context_for(root.path(), runner.clone(), tx, CmakeTool::Bootstrap);

        let chain = CommandChain::new(vec![
            BuildStep::configure(["--disable-nls"]),
            BuildStep::make(["-j1"]),
            BuildStep::Install { args: Vec::new() },
        ]);
        let err = chain
            .execute(&ctx, "gettext", root.path())
            .await
            .unwrap_err();

        let calls = runner.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].command_line(), "make -j1");
        assert!(calls.iter().all(|call| call.command_line() != "make install"));
        match err {
            Error::Build(BuildError::CommandFailed { command, code }) => {
                assert_eq!(command, "make -j1");
                assert_eq!(code, Some(2));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_failed_configure_runs_nothing_else() {
        let root = tempdir().unwrap();
        let runner = RecordingRunner::new().fail_program("./configure", 1);
        let (tx, mut rx) = channel();
        let ctx = context_for(root.path(), runner.clone(), tx, CmakeTool::Bootstrap);

        let chain = CommandChain::new(vec![
            BuildStep::configure(NO_ARGS),
            BuildStep::Make { args: Vec::new() },
            BuildStep::Install { args: Vec::new() },
        ]);
        let err = chain.execute(&ctx, "ogg", root.path()).await.unwrap_err();

        assert!(matches!(err, Error::Build(BuildError::CommandFailed { code: Some(1), .. })));
        assert_eq!(runner.calls().len(), 1);

        let mut started = 0;
        let mut failed = 0;
        while let Ok(event) = rx.try_recv() {
            match event {
                AppEvent::Build(BuildEvent::CommandStarted { .. }) => started += 1,
                AppEvent::Build(BuildEvent::CommandFailed { .. }) => failed += 1,
                _ => {}
            }
        }
        assert_eq!((started, failed), (1, 1));
    }

    #[tokio::test]
    async fn test_spawn_failure_propagates() {
        let root = tempdir().unwrap();
        let runner = RecordingRunner::new().unspawnable("./configure");
        let (tx, _rx) = channel();
        let ctx = context_for(root.path(), runner.clone(), tx, CmakeTool::Bootstrap);

        let err = CommandChain::library(NO_ARGS)
            .execute(&ctx, "ogg", root.path())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Platform(_)));
        assert_eq!(runner.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_cmake_uses_environment_executable() {
        let root = tempdir().unwrap();
        let runner = RecordingRunner::new();
        let (tx, _rx) = channel();
        let ctx = context_for(
            root.path(),
            runner.clone(),
            tx,
            CmakeTool::Detected("/opt/cmake".to_string()),
        );

        CommandChain::cmake_install(["-DBUILD_SHARED_LIBS=NO"])
            .execute(&ctx, "fluidsynth", root.path())
            .await
            .unwrap();

        let calls = runner.calls();
        assert_eq!(calls[0].program(), "/opt/cmake");
        assert_eq!(calls[0].get_args().last().map(String::as_str), Some("."));
    }
}
