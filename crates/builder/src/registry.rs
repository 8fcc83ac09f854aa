//! The ordered list of dependencies and the run over it

use crate::{BuildContext, BuildEnvironment, CommandChain, Package};
use depbuild_errors::Error;
use depbuild_events::{AppEvent, EventEmitter, EventSender, PackageEvent};
use tracing::{info, warn};

/// Name of the package that provides CMake when none is installed
pub const CMAKE_BOOTSTRAP_NAME: &str = "cmake";

/// Outcome of a complete run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildSummary {
    pub built: Vec<String>,
    pub skipped: Vec<String>,
}

/// Packages in the order they are built
#[derive(Debug, Clone, Default)]
pub struct PackageRegistry {
    packages: Vec<Package>,
}

impl PackageRegistry {
    #[must_use]
    pub fn new(packages: Vec<Package>) -> Self {
        Self { packages }
    }

    /// The shipped dependency list
    ///
    /// # Errors
    ///
    /// Returns an error if any built-in descriptor is malformed.
    pub fn with_defaults() -> Result<Self, Error> {
        default_packages().map(Self::new)
    }

    #[must_use]
    pub fn packages(&self) -> &[Package] {
        &self.packages
    }

    /// Packages that will actually be built, in order
    #[must_use]
    pub fn enabled(&self) -> impl Iterator<Item = &Package> {
        self.packages.iter().filter(|package| package.is_enabled())
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Package> {
        self.packages.iter().find(|package| package.name() == name)
    }

    /// Put the CMake bootstrap package first when the environment has no CMake
    ///
    /// Does nothing if a usable CMake was found or the bootstrap package is
    /// already listed. Otherwise warns on `tx` that CMake will be built.
    ///
    /// # Errors
    ///
    /// Returns an error if the bootstrap descriptor is malformed.
    pub fn prepare_for(&mut self, env: &BuildEnvironment, tx: &EventSender) -> Result<(), Error> {
        if !env.needs_cmake_bootstrap() || self.get(CMAKE_BOOTSTRAP_NAME).is_some() {
            return Ok(());
        }

        let bootstrap = cmake_bootstrap_package()?;
        warn!(archive = %bootstrap.archive_name(), "no usable cmake found, building it from source first");
        tx.emit_warning(format!(
            "cmake not found; building {} first",
            bootstrap.archive_name()
        ));
        self.packages.insert(0, bootstrap);
        Ok(())
    }

    /// Build every enabled package in order
    ///
    /// The first failure ends the run. Packages built before it stay
    /// installed in the prefix.
    ///
    /// # Errors
    ///
    /// Returns the error of the package that failed.
    pub async fn build_all(&self, ctx: &BuildContext) -> Result<BuildSummary, Error> {
        let mut summary = BuildSummary::default();
        ctx.emit_operation_started("build dependencies");

        for package in &self.packages {
            if !package.is_enabled() {
                ctx.emit(AppEvent::Package(PackageEvent::Skipped {
                    name: package.name().to_string(),
                }));
                summary.skipped.push(package.name().to_string());
                continue;
            }

            if let Err(e) = package.build(ctx).await {
                ctx.emit_operation_completed("build dependencies", false);
                return Err(e);
            }
            summary.built.push(package.name().to_string());
        }

        info!(
            built = summary.built.len(),
            skipped = summary.skipped.len(),
            "all dependencies built"
        );
        ctx.emit_operation_completed("build dependencies", true);
        Ok(summary)
    }
}

/// CMake 3.16.2 built from source with its own configure script
///
/// # Errors
///
/// Returns an error if the descriptor is malformed.
pub fn cmake_bootstrap_package() -> Result<Package, Error> {
    Package::new(
        CMAKE_BOOTSTRAP_NAME,
        "https://github.com/Kitware/CMake/releases/download/v3.16.2/cmake-3.16.2.tar.gz",
        "8c09786ec60ca2be354c29829072c38113de9184f29928eb9da8446a5f2ce6a9",
    )
}

/// The shipped dependency list, in build order
///
/// Only Ogg and Vorbis are enabled; the rest are kept pinned for when
/// they are needed again.
///
/// # Errors
///
/// Returns an error if any descriptor is malformed.
pub fn default_packages() -> Result<Vec<Package>, Error> {
    Ok(vec![
        Package::new(
            "ogg",
            "https://downloads.xiph.org/releases/ogg/libogg-1.3.4.tar.gz",
            "fe5670640bd49e828d64d2879c31cb4dde9758681bb664f9bdbf159a01b0c76e",
        )?,
        Package::new(
            "vorbis",
            "https://downloads.xiph.org/releases/vorbis/libvorbis-1.3.6.tar.xz",
            "af00bb5a784e7c9e69f56823de4637c350643deedaf333d0fa86ecdba6fcb415",
        )?,
        Package::new(
            "FLAC",
            "https://downloads.xiph.org/releases/flac/flac-1.3.3.tar.xz",
            "213e82bd716c9de6db2f98bcadbc4c24c7e2efe8c75939a1a84e28539c4e1748",
        )?
        .with_commands(CommandChain::library(["--disable-cpplibs"]))
        .disabled(),
        Package::new(
            "Yasm",
            "https://www.tortall.net/projects/yasm/releases/yasm-1.3.0.tar.gz",
            "3dce6601b495f5b3d45b59f7d2492a340ee7e84b5beca17e48f862502bd5603f",
        )?
        .disabled(),
        Package::new(
            "vpx",
            "https://github.com/webmproject/libvpx/archive/v1.8.2.tar.gz",
            "8735d9fcd1a781ae6917f28f239a8aa358ce4864ba113ea18af4bb2dc8b474ac",
        )?
        .with_commands(CommandChain::library([
            "--disable-examples",
            "--disable-unit-tests",
        ]))
        .disabled(),
        Package::new(
            "ffi",
            "https://sourceware.org/pub/libffi/libffi-3.2.1.tar.gz",
            "d06ebb8e1d9a22d19e38d63fdb83954253f39bedc5d46232a05645685722ca37",
        )?
        .disabled(),
        Package::new(
            "gettext",
            "https://ftp.gnu.org/gnu/gettext/gettext-0.20.1.tar.xz",
            "53f02fbbec9e798b0faaf7c73272f83608e835c6288dd58be6c9bb54624a3800",
        )?
        .disabled(),
        Package::new(
            "fluidsynth",
            "https://github.com/FluidSynth/fluidsynth/archive/v2.1.0.tar.gz",
            "526addc6d8445035840d3af7282d3ba89567df209d28e183da04a1a877da2da3",
        )?
        .with_commands(CommandChain::cmake_install([
            "-DCMAKE_BUILD_TYPE=Release",
            "-DBUILD_SHARED_LIBS=NO",
            "-DLIB_SUFFIX=",
            "-Denable-framework=NO",
            "-Denable-readline=NO",
            "-Denable-sdl2=NO",
        ]))
        .disabled(),
        Package::new(
            "mad",
            "https://downloads.sourceforge.net/project/mad/libmad/0.15.1b/libmad-0.15.1b.tar.gz",
            "bbfac3ed6bfbc2823d3775ebb931087371e142bb0e9bb1bee51a76a6e0078690",
        )?
        .disabled(),
        Package::new(
            "jpeg",
            "http://www.ijg.org/files/jpegsrc.v9c.tar.gz",
            "650250979303a649e21f87b5ccd02672af1ea6954b911342ea491f351ceb7122",
        )?
        .disabled(),
        Package::new(
            "png",
            "https://downloads.sourceforge.net/libpng/libpng-1.6.37.tar.xz",
            "505e70834d35383537b6491e7ae8641f1a4bed1876dbfe361201fc80868d88ca",
        )?
        .disabled(),
        Package::new(
            "xz",
            "https://downloads.sourceforge.net/project/lzmautils/xz-5.2.4.tar.gz",
            "b512f3b726d3b37b6dc4c8570e137b9311e7552e8ccbab4d39d47ce5f4177145",
        )?
        .disabled(),
        Package::new(
            "tiff",
            "https://download.osgeo.org/libtiff/tiff-4.1.0.tar.gz",
            "5d29f32517dadb6dbcd1255ea5bbc93a2b54b94fbf83653b4d65c7d6775b8634",
        )?
        .disabled(),
        Package::new(
            "webp",
            "https://storage.googleapis.com/downloads.webmproject.org/releases/webp/libwebp-1.0.1.tar.gz",
            "8c744a5422dbffa0d1f92e90b34186fb8ed44db93fbacb55abd751ac8808d922",
        )?
        .with_commands(CommandChain::library(["--disable-gif"]))
        .disabled(),
        Package::new(
            "SDL2",
            "https://www.libsdl.org/release/SDL2-2.0.9.tar.gz",
            "255186dc676ecd0c1dbf10ec8a2cc5d6869b5079d8a38194c2aecdff54b324b1",
        )?
        .with_commands(CommandChain::library(["--without-x"]))
        .disabled(),
        Package::new(
            "SDL2_image",
            "https://www.libsdl.org/projects/SDL_image/release/SDL2_image-2.0.5.tar.gz",
            "bdd5f6e026682f7d7e1be0b6051b209da2f402a2dd8bd1c4bd9c25ad263108d0",
        )?
        .with_commands(CommandChain::library([
            "--disable-jpg-shared",
            "--disable-png-shared",
            "--disable-tif-shared",
            "--disable-webp-shared",
        ]))
        .disabled(),
        Package::new(
            "SDL2_mixer",
            "https://www.libsdl.org/projects/SDL_mixer/release/SDL2_mixer-2.0.4.tar.gz",
            "b4cf5a382c061cd75081cf246c2aa2f9df8db04bdda8dcdc6b6cca55bede2419",
        )?
        .with_commands(CommandChain::library([
            "--disable-music-ogg-shared",
            "--disable-music-flac-shared",
        ]))
        .disabled(),
        Package::new(
            "SDL2_net",
            "https://www.libsdl.org/projects/SDL_net/release/SDL2_net-2.0.1.tar.gz",
            "15ce8a7e5a23dafe8177c8df6e6c79b6749a03fff1e8196742d3571657609d21",
        )?
        .disabled(),
    ])
}
