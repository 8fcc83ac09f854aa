//! Plain-text rendering of the build plan and the final summary

use depbuild_builder::{BuildSummary, PackageRegistry};
use depbuild_config::Config;
use std::fmt::Write;

/// The ordered package list with the commands each one will run
pub fn render_plan(registry: &PackageRegistry, config: &Config) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Build directory: {}", config.build_dir().display());
    let _ = writeln!(out, "Install prefix:  {}", config.prefix_dir().display());
    let _ = writeln!(out);

    for package in registry.packages() {
        let marker = if package.is_enabled() { "x" } else { " " };
        let _ = writeln!(out, "[{marker}] {:<12} {}", package.name(), package.archive_name());
        for step in package.commands().flatten().steps() {
            let _ = writeln!(out, "      {step}");
        }
    }

    out
}

pub fn render_summary(summary: &BuildSummary) -> String {
    let built = summary.built.len();
    let noun = if built == 1 { "package" } else { "packages" };
    if summary.skipped.is_empty() {
        format!("Built {built} {noun}")
    } else {
        format!("Built {built} {noun} ({} disabled)", summary.skipped.len())
    }
}
