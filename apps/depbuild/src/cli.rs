//! Command line interface definition

use clap::Parser;
use std::path::PathBuf;

/// depbuild - build pinned third-party libraries into a local prefix
#[derive(Parser, Debug)]
#[command(name = "depbuild")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Fetch, verify and build pinned third-party libraries into a local prefix")]
#[command(long_about = None)]
pub struct Cli {
    /// Use alternate config file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Directory that holds the build and prefix trees
    #[arg(long, value_name = "PATH")]
    pub root: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Print the build plan without building anything
    #[arg(long)]
    pub list: bool,
}
