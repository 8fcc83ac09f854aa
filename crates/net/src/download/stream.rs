//! Low-level streaming download mechanics

use super::{display_name, DownloadResult};
use depbuild_errors::{Error, NetworkError};
use depbuild_events::{AppEvent, DownloadEvent, EventEmitter, EventSender};
use depbuild_hash::{Hasher, CHUNK_SIZE};
use std::path::Path;
use tokio::fs::{self as tokio_fs, File};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tracing::{debug, warn};

/// Stream `reader` into a fresh file at `dest`, digesting as it goes
///
/// Progress is reported after every block as the cumulative byte count.
/// If anything fails after the file was created, the partial file is
/// deleted and the original error is returned.
///
/// # Errors
///
/// Returns an error if `dest` cannot be created or written, or if the
/// reader fails before reaching end of stream.
pub async fn stream_to_file<R>(
    reader: R,
    dest: &Path,
    url: &str,
    tx: &EventSender,
) -> Result<DownloadResult, Error>
where
    R: AsyncRead,
{
    let reader = std::pin::pin!(reader);

    let mut file = File::create(dest)
        .await
        .map_err(|e| Error::io_with_path(&e, dest))?;

    let result = copy_blocks(reader, &mut file, dest, url, tx).await;
    drop(file);

    if let Err(e) = &result {
        warn!(dest = %dest.display(), error = %e, "download interrupted, removing partial file");
        if let Err(cleanup) = tokio_fs::remove_file(dest).await {
            if cleanup.kind() != std::io::ErrorKind::NotFound {
                warn!(dest = %dest.display(), error = %cleanup, "failed to remove partial file");
            }
        }
    }

    result
}

async fn copy_blocks<R>(
    mut reader: R,
    file: &mut File,
    dest: &Path,
    url: &str,
    tx: &EventSender,
) -> Result<DownloadResult, Error>
where
    R: AsyncRead + Unpin,
{
    let filename = display_name(dest);
    let mut hasher = Hasher::new();
    let mut buffer = vec![0u8; CHUNK_SIZE];

    loop {
        let n = reader
            .read(&mut buffer)
            .await
            .map_err(|e| NetworkError::DownloadFailed(format!("{url}: {e}")))?;
        if n == 0 {
            break;
        }

        file.write_all(&buffer[..n])
            .await
            .map_err(|e| Error::io_with_path(&e, dest))?;
        hasher.update(&buffer[..n]);

        tx.emit(AppEvent::Download(DownloadEvent::Progress {
            url: url.to_string(),
            filename: filename.clone(),
            bytes_downloaded: hasher.bytes_processed(),
        }));
    }

    file.flush()
        .await
        .map_err(|e| Error::io_with_path(&e, dest))?;

    let size = hasher.bytes_processed();
    let hash = hasher.finalize();
    debug!(dest = %dest.display(), bytes = size, sha256 = %hash, "download complete");

    Ok(DownloadResult { hash, size })
}
