//! Tracing setup and event mirroring
//!
//! Library crates log through `tracing` directly. Events that reach the CLI
//! are mirrored into the same subscriber so a `--debug` run has one stream
//! with both.

use depbuild_events::AppEvent;
use tracing::{debug, error, info, trace, warn, Level};
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is not set
///
/// Without `--debug` the event renderer is the only output, so failures are
/// reported once.
pub(crate) fn default_filter(debug_enabled: bool) -> &'static str {
    if debug_enabled {
        "info,depbuild=debug,depbuild_builder=debug,depbuild_net=debug"
    } else {
        "off"
    }
}

/// Install the global subscriber, writing to stderr
pub fn init_tracing(debug_enabled: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(debug_enabled)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(debug_enabled)
        .init();
}

/// Log an `AppEvent` at the level it declares
pub fn log_event_with_tracing(event: &AppEvent) {
    let source = event.log_target();
    match event.log_level() {
        Level::ERROR => error!(source, event = ?event, "event"),
        Level::WARN => warn!(source, event = ?event, "event"),
        Level::INFO => info!(source, event = ?event, "event"),
        Level::DEBUG => debug!(source, event = ?event, "event"),
        _ => trace!(source, event = ?event, "event"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use depbuild_events::{DownloadEvent, GeneralEvent};

    #[test]
    fn test_default_filter() {
        assert_eq!(default_filter(false), "off");
        assert!(default_filter(true).contains("depbuild_builder=debug"));
        assert!(EnvFilter::try_new(default_filter(true)).is_ok());
        assert!(EnvFilter::try_new(default_filter(false)).is_ok());
    }

    #[test]
    fn test_log_event_without_subscriber() {
        log_event_with_tracing(&AppEvent::General(GeneralEvent::warning("no subscriber")));
        log_event_with_tracing(&AppEvent::Download(DownloadEvent::Progress {
            url: "https://downloads.xiph.org/x".to_string(),
            filename: "x".to_string(),
            bytes_downloaded: 65536,
        }));
    }
}
