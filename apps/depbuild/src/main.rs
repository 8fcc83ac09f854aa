//! depbuild - build pinned third-party libraries into a local prefix
//!
//! Loads the configuration, settles the build environment, then builds
//! every enabled package in order while rendering the event stream.

mod cli;
mod display;
mod error;
mod events;
mod logging;

use crate::cli::Cli;
use crate::error::CliError;
use crate::events::EventHandler;
use clap::Parser;
use depbuild_builder::{BuildContext, BuildEnvironment, BuildSummary, PackageRegistry};
use depbuild_config::Config;
use depbuild_events::EventReceiver;
use depbuild_net::{NetClient, NetConfig};
use depbuild_platform::{ProcessOperations, SystemProcessOperations};
use std::future::Future;
use std::process;
use std::sync::Arc;
use tokio::select;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    logging::init_tracing(cli.debug);

    if let Err(e) = run(cli).await {
        error!("Application error: {}", e);
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

/// Main application logic
async fn run(cli: Cli) -> Result<(), CliError> {
    info!("Starting depbuild v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration with proper precedence:
    // 1. Start with file config (or defaults)
    let mut config = Config::load_or_default(cli.config.as_deref()).await?;

    // 2. Merge environment variables
    config.merge_env()?;

    // 3. Apply CLI flags (highest precedence)
    apply_cli_config(&mut config, &cli);

    let mut registry = PackageRegistry::with_defaults()?;

    if cli.list {
        print!("{}", display::render_plan(&registry, &config));
        return Ok(());
    }

    let colors_enabled = console::Term::stdout().features().colors_supported();
    let mut event_handler = EventHandler::new(colors_enabled, cli.debug);

    let (event_sender, event_receiver) = depbuild_events::channel();
    let runner: Arc<dyn ProcessOperations> = Arc::new(SystemProcessOperations::new());
    let client = NetClient::new(NetConfig::from(&config.network))?;

    let build = async {
        let env = BuildEnvironment::prepare(&config, runner.as_ref(), &event_sender).await?;
        registry.prepare_for(&env, &event_sender)?;

        let ctx = BuildContext::new(env, client, Arc::clone(&runner), event_sender.clone());
        registry.build_all(&ctx).await
    };

    let summary = execute_with_events(build, event_receiver, &mut event_handler).await?;
    println!("{}", display::render_summary(&summary));

    info!("Command completed successfully");
    Ok(())
}

/// Drive the build while rendering events as they arrive
async fn execute_with_events<F>(
    build: F,
    mut event_receiver: EventReceiver,
    event_handler: &mut EventHandler,
) -> Result<BuildSummary, CliError>
where
    F: Future<Output = Result<BuildSummary, depbuild_errors::Error>>,
{
    let mut build = std::pin::pin!(build);

    loop {
        select! {
            result = &mut build => {
                // Drain any remaining events
                while let Ok(event) = event_receiver.try_recv() {
                    event_handler.handle_event(event);
                }
                return result.map_err(CliError::from);
            }

            event = event_receiver.recv() => {
                match event {
                    Some(event) => event_handler.handle_event(event),
                    None => { /* Channel closed: keep waiting for the build to finish */ }
                }
            }
        }
    }
}

/// Apply CLI configuration overrides (highest precedence)
fn apply_cli_config(config: &mut Config, cli: &Cli) {
    if let Some(root) = &cli.root {
        config.paths.root = Some(root.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use depbuild_events::EventEmitter;

    #[test]
    fn test_cli_root_overrides_config() {
        let mut config = Config::default();
        config.paths.root = Some("/from/file".into());

        let cli = Cli::try_parse_from(["depbuild", "--root", "/from/cli"]).unwrap();
        apply_cli_config(&mut config, &cli);
        assert_eq!(config.paths.root, Some("/from/cli".into()));

        let cli = Cli::try_parse_from(["depbuild"]).unwrap();
        apply_cli_config(&mut config, &cli);
        assert_eq!(config.paths.root, Some("/from/cli".into()));
    }

    #[tokio::test]
    async fn test_events_drained_after_build_finishes() {
        let (tx, rx) = depbuild_events::channel();
        let mut handler = EventHandler::new(false, false);

        let build = async {
            tx.emit_warning("first");
            tx.emit_package_banner("ogg");
            Ok::<_, depbuild_errors::Error>(BuildSummary {
                built: vec!["ogg".to_string()],
                skipped: Vec::new(),
            })
        };

        let summary = execute_with_events(build, rx, &mut handler).await.unwrap();
        assert_eq!(summary.built, ["ogg"]);
    }

    #[tokio::test]
    async fn test_build_error_becomes_cli_error() {
        let (_tx, rx) = depbuild_events::channel();
        let mut handler = EventHandler::new(false, false);

        let build = async {
            Err::<BuildSummary, depbuild_errors::Error>(depbuild_errors::BuildError::CommandFailed {
                command: "make install".to_string(),
                code: Some(2),
            }
            .into())
        };

        let err = execute_with_events(build, rx, &mut handler)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Code: build.command_failed"));
    }
}
