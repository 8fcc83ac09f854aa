//! Build tool discovery

use depbuild_config::constants::CMAKE_APP_BUNDLE;
use depbuild_platform::ProcessOperations;
use tracing::debug;

/// Where the `cmake` executable comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CmakeTool {
    /// A working executable was found (or configured) at this path
    Detected(String),
    /// Nothing usable; CMake is built from source into the prefix first
    Bootstrap,
}

impl CmakeTool {
    /// Executable name to put at the front of `cmake` command lines
    ///
    /// A bootstrapped CMake is installed into `<prefix>/bin`, which is at
    /// the front of the child `PATH`, so the bare name resolves to it.
    #[must_use]
    pub fn executable(&self) -> &str {
        match self {
            Self::Detected(path) => path,
            Self::Bootstrap => "cmake",
        }
    }

    #[must_use]
    pub fn needs_bootstrap(&self) -> bool {
        matches!(self, Self::Bootstrap)
    }
}

/// Probe for a working `cmake`
///
/// Tries `cmake` from `PATH` first, then the copy inside the macOS app
/// bundle. A candidate counts when `<candidate> --version` can be spawned
/// and exits with status zero. Spawn failures are not errors here.
pub async fn detect_cmake(runner: &dyn ProcessOperations) -> CmakeTool {
    for candidate in ["cmake", CMAKE_APP_BUNDLE] {
        let mut cmd = runner.create_command(candidate);
        cmd.arg("--version").capture_output(true);

        match runner.execute_command(cmd).await {
            Ok(output) if output.success() => {
                debug!(cmake = candidate, "found cmake");
                return CmakeTool::Detected(candidate.to_string());
            }
            Ok(output) => {
                debug!(cmake = candidate, exit_code = ?output.exit_code, "cmake candidate failed");
            }
            Err(e) => {
                debug!(cmake = candidate, error = %e, "cmake candidate could not run");
            }
        }
    }

    CmakeTool::Bootstrap
}
