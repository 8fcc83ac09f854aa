use serde::{Deserialize, Serialize};

use super::FailureContext;

/// Download-specific events for the event system
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DownloadEvent {
    /// Response headers received; body streaming is about to begin
    Started {
        url: String,
        filename: String,
        total_size: Option<u64>,
    },

    /// Primary request was rejected; retrying with the browser identity
    Retrying { url: String, reason: String },

    /// Cumulative bytes written so far
    Progress {
        url: String,
        filename: String,
        bytes_downloaded: u64,
    },

    /// Download completed successfully
    Completed {
        url: String,
        filename: String,
        size: u64,
        hash: String,
    },

    /// Download failed; any partial file has been removed
    Failed {
        url: String,
        failure: FailureContext,
    },
}
