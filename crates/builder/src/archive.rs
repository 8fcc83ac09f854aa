//! Source archive inspection and extraction via the system `tar`

use depbuild_errors::{BuildError, Error};
use depbuild_platform::ProcessOperations;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};

/// Name of the directory the archive unpacks into
///
/// Taken from the first entry of `tar -tf`: everything before its first
/// `/`, or the whole entry when it has none.
///
/// # Errors
///
/// Returns an error if `tar` cannot be run, exits non-zero, or lists
/// nothing.
pub async fn top_level_dir(
    runner: &dyn ProcessOperations,
    build_dir: &Path,
    archive: &Path,
) -> Result<String, Error> {
    let mut cmd = runner.create_command("tar");
    cmd.arg("-tf")
        .arg(archive.display().to_string())
        .current_dir(build_dir)
        .capture_output(true);

    let output = runner.execute_command(cmd).await?;
    if !output.success() {
        return Err(BuildError::ExtractionFailed {
            message: format!(
                "tar -tf {} exited with {:?}: {}",
                archive.display(),
                output.exit_code,
                output.stderr_lossy().trim()
            ),
        }
        .into());
    }

    let listing = output.stdout_lossy();
    let top = first_component(&listing).ok_or_else(|| BuildError::EmptyArchive {
        archive: archive.display().to_string(),
    })?;

    debug!(archive = %archive.display(), work_dir = %top, "archive top-level directory");
    Ok(top)
}

/// Unpack `archive` inside `build_dir` and return the working directory
///
/// On failure the partially written `build_dir/<top_level>` is removed
/// before the error is returned.
///
/// # Errors
///
/// Returns an error if `tar` cannot be run or exits non-zero.
pub async fn extract(
    runner: &dyn ProcessOperations,
    build_dir: &Path,
    archive: &Path,
    top_level: &str,
) -> Result<PathBuf, Error> {
    let work_dir = build_dir.join(top_level);

    let mut cmd = runner.create_command("tar");
    cmd.arg("-xf")
        .arg(archive.display().to_string())
        .current_dir(build_dir);

    let failure = match runner.execute_command(cmd).await {
        Ok(output) if output.success() => return Ok(work_dir),
        Ok(output) => format!(
            "tar -xf {} exited with {:?}",
            archive.display(),
            output.exit_code
        ),
        Err(e) => e.to_string(),
    };

    remove_partial_tree(build_dir, top_level).await;
    Err(BuildError::ExtractionFailed { message: failure }.into())
}

async fn remove_partial_tree(build_dir: &Path, top_level: &str) {
    // Only ever a single plain child of the build directory.
    let mut components = Path::new(top_level).components();
    let is_plain_child = matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    );
    if !is_plain_child {
        warn!(work_dir = %top_level, "refusing to clean up unexpected extraction path");
        return;
    }

    let path = build_dir.join(top_level);
    match tokio::fs::remove_dir_all(&path).await {
        Ok(()) => debug!(path = %path.display(), "removed partial extraction"),
        Err(e) => debug!(path = %path.display(), error = %e, "nothing to clean up"),
    }
}

fn first_component(listing: &str) -> Option<String> {
    let first = listing.lines().map(str::trim).find(|line| !line.is_empty())?;
    let top = first.split('/').next().unwrap_or(first);
    Some(top.to_string())
}
