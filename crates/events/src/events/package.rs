use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use super::FailureContext;

/// Stages a package moves through while it is being built
///
/// `Idle -> ResolvingSource -> Verified -> Extracted -> Building -> Idle`,
/// with any stage able to drop into `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PackageStage {
    Idle,
    ResolvingSource,
    Verified,
    Extracted,
    Building,
    Failed,
}

impl fmt::Display for PackageStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::ResolvingSource => "resolving source",
            Self::Verified => "verified",
            Self::Extracted => "extracted",
            Self::Building => "building",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Per-package pipeline events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PackageEvent {
    /// Printed once before a package starts
    Banner { name: String },

    /// The package moved to a new stage
    StageChanged { name: String, stage: PackageStage },

    /// A cached archive was found and will be re-hashed instead of downloaded
    SourceCached { name: String, path: PathBuf },

    /// Archive unpacked into its working directory
    Extracted { name: String, work_dir: PathBuf },

    /// Package is listed but disabled
    Skipped { name: String },

    /// Package built and installed into the prefix
    Completed { name: String },

    /// Package failed; the run stops here
    Failed {
        name: String,
        stage: PackageStage,
        failure: FailureContext,
    },
}
