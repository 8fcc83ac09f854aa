//! A single third-party dependency and its build pipeline
//!
//! Every package goes through the same stages:
//!
//! 1. **Resolving source**: reuse `<build_dir>/<filename>` if it is already
//!    there, otherwise download it.
//! 2. **Verified**: the archive's SHA-256 matches the pinned checksum.
//! 3. **Extracted**: the archive is unpacked next to itself.
//! 4. **Building**: the command chain runs inside the unpacked tree.
//!
//! Each transition is emitted as a [`PackageEvent`] and logged. The first
//! failing stage ends the package with [`PackageEvent::Failed`].

use crate::{archive, BuildContext, Commands};
use depbuild_errors::{BuildError, Error};
use depbuild_events::{AppEvent, EventEmitter, FailureContext, PackageEvent, PackageStage};
use depbuild_hash::Hash;
use depbuild_net::{download_file, url_filename};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

/// Static description of a dependency
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    name: String,
    source: String,
    filename: String,
    checksum: Hash,
    commands: Commands,
    enabled: bool,
}

impl Package {
    /// Describe an enabled package built with [`Commands::default`]
    ///
    /// # Errors
    ///
    /// Returns an error if `source` has no file name to save the archive
    /// under, or if `checksum` is not a 64-digit hex SHA-256.
    pub fn new(
        name: impl Into<String>,
        source: impl Into<String>,
        checksum: &str,
    ) -> Result<Self, Error> {
        let source = source.into();
        let filename =
            url_filename(&source).map_err(|_| BuildError::InvalidUrl { url: source.clone() })?;

        Ok(Self {
            name: name.into(),
            source,
            filename,
            checksum: Hash::from_hex(checksum)?,
            commands: Commands::default(),
            enabled: true,
        })
    }

    #[must_use]
    pub fn with_commands(mut self, commands: impl Into<Commands>) -> Self {
        self.commands = commands.into();
        self
    }

    /// Keep the package listed but leave it out of the run
    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// File name the archive is stored under in the build directory
    #[must_use]
    pub fn archive_name(&self) -> &str {
        &self.filename
    }

    #[must_use]
    pub fn checksum(&self) -> &Hash {
        &self.checksum
    }

    #[must_use]
    pub fn commands(&self) -> &Commands {
        &self.commands
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Fetch, verify, unpack and build this package
    ///
    /// Returns the directory the package was built in.
    ///
    /// # Errors
    ///
    /// Returns the error of the first stage that failed.
    pub async fn build(&self, ctx: &BuildContext) -> Result<PathBuf, Error> {
        ctx.emit_package_banner(self.name.as_str());
        info!(package = %self.name, source = %self.source, "building package");

        let mut session = BuildSession::new(self, ctx);
        match session.run().await {
            Ok(work_dir) => {
                ctx.emit(AppEvent::Package(PackageEvent::Completed {
                    name: self.name.clone(),
                }));
                info!(package = %self.name, "package installed");
                Ok(work_dir)
            }
            Err(e) => {
                session.fail(&e);
                Err(e)
            }
        }
    }
}

/// Transient per-build state, gone once `build` returns
struct BuildSession<'a> {
    package: &'a Package,
    ctx: &'a BuildContext,
    stage: PackageStage,
    archive: PathBuf,
}

impl<'a> BuildSession<'a> {
    fn new(package: &'a Package, ctx: &'a BuildContext) -> Self {
        Self {
            package,
            ctx,
            stage: PackageStage::Idle,
            archive: ctx.env().build_dir().join(&package.filename),
        }
    }

    fn enter(&mut self, stage: PackageStage) {
        debug!(package = %self.package.name, from = %self.stage, to = %stage, "stage change");
        self.stage = stage;
        self.ctx.emit_package_stage(self.package.name.as_str(), stage);
    }

    fn fail(&mut self, error: &Error) {
        error!(package = %self.package.name, stage = %self.stage, error = %error, "package failed");
        self.ctx.emit(AppEvent::Package(PackageEvent::Failed {
            name: self.package.name.clone(),
            stage: self.stage,
            failure: FailureContext::from_error(error),
        }));
        self.stage = PackageStage::Failed;
    }

    async fn run(&mut self) -> Result<PathBuf, Error> {
        self.enter(PackageStage::ResolvingSource);
        let actual = self.resolve_source().await?;
        self.verify(actual)?;
        self.enter(PackageStage::Verified);

        let work_dir = self.extract().await?;
        self.enter(PackageStage::Extracted);

        self.enter(PackageStage::Building);
        self.package
            .commands
            .flatten()
            .execute(self.ctx, &self.package.name, &work_dir)
            .await?;

        self.enter(PackageStage::Idle);
        Ok(work_dir)
    }

    /// Digest of the archive, downloading it first if it is not cached
    async fn resolve_source(&self) -> Result<Hash, Error> {
        let archive = self.archive.as_path();

        if is_file(archive).await {
            debug!(package = %self.package.name, path = %archive.display(), "using cached archive");
            self.ctx.emit(AppEvent::Package(PackageEvent::SourceCached {
                name: self.package.name.clone(),
                path: archive.to_path_buf(),
            }));
            return Hash::hash_file(archive).await;
        }

        let result = download_file(
            self.ctx.client(),
            &self.package.source,
            archive,
            self.ctx.events(),
        )
        .await?;
        Ok(result.hash)
    }

    fn verify(&self, actual: Hash) -> Result<(), Error> {
        if actual == self.package.checksum {
            return Ok(());
        }
        Err(BuildError::HashMismatch {
            file: self.package.filename.clone(),
            expected: self.package.checksum.to_hex(),
            actual: actual.to_hex(),
        }
        .into())
    }

    async fn extract(&self) -> Result<PathBuf, Error> {
        let build_dir = self.ctx.env().build_dir();
        let runner = self.ctx.runner();

        let top_level = archive::top_level_dir(runner, build_dir, &self.archive).await?;
        let work_dir = archive::extract(runner, build_dir, &self.archive, &top_level).await?;

        self.ctx.emit(AppEvent::Package(PackageEvent::Extracted {
            name: self.package.name.clone(),
            work_dir: work_dir.clone(),
        }));
        Ok(work_dir)
    }
}

async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .is_ok_and(|meta| meta.is_file())
}
