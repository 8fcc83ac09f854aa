//! Source archive downloads
//!
//! A download is one GET with the client's own identity and, if that is
//! rejected, exactly one more with a browser identity. The body is streamed
//! to disk in fixed blocks while it is being digested, so the caller gets
//! the SHA-256 of the file without reading it back.

mod stream;

pub use stream::stream_to_file;

use crate::client::{Identity, NetClient};
use depbuild_errors::{Error, UserFacingError};
use depbuild_events::{AppEvent, DownloadEvent, EventEmitter, EventSender, FailureContext};
use depbuild_hash::Hash;
use futures::TryStreamExt;
use std::path::Path;
use tokio_util::io::StreamReader;
use tracing::{debug, warn};

/// Outcome of a completed download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadResult {
    pub hash: Hash,
    pub size: u64,
}

/// Download `url` to `dest`, returning the digest of what was written
///
/// # Errors
///
/// Returns an error if both the primary and the browser-identity attempt
/// are rejected, or if the body cannot be streamed to disk. In the latter
/// case `dest` is removed before returning.
pub async fn download_file(
    client: &NetClient,
    url: &str,
    dest: &Path,
    tx: &EventSender,
) -> Result<DownloadResult, Error> {
    crate::parse_url(url)?;

    let response = match client.get(url, Identity::Default).await {
        Ok(response) => response,
        Err(primary) => {
            warn!(url = %url, error = %primary, "request rejected, retrying with browser user agent");
            tx.emit(AppEvent::Download(DownloadEvent::Retrying {
                url: url.to_string(),
                reason: primary.user_message().into_owned(),
            }));

            client
                .get(url, Identity::Browser)
                .await
                .inspect_err(|e| emit_failed(tx, url, e))?
        }
    };

    let filename = display_name(dest);
    tx.emit(AppEvent::Download(DownloadEvent::Started {
        url: url.to_string(),
        filename: filename.clone(),
        total_size: response.content_length(),
    }));
    debug!(url = %url, dest = %dest.display(), "streaming response body");

    let body = StreamReader::new(response.bytes_stream().map_err(std::io::Error::other));

    match stream_to_file(body, dest, url, tx).await {
        Ok(result) => {
            tx.emit(AppEvent::Download(DownloadEvent::Completed {
                url: url.to_string(),
                filename,
                size: result.size,
                hash: result.hash.to_hex(),
            }));
            Ok(result)
        }
        Err(e) => {
            emit_failed(tx, url, &e);
            Err(e)
        }
    }
}

fn emit_failed(tx: &EventSender, url: &str, error: &Error) {
    tx.emit(AppEvent::Download(DownloadEvent::Failed {
        url: url.to_string(),
        failure: FailureContext::from_error(error),
    }));
}

pub(crate) fn display_name(path: &Path) -> String {
    path.file_name().map_or_else(
        || path.display().to_string(),
        |name| name.to_string_lossy().into_owned(),
    )
}
