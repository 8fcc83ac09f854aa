//! Fixed names and defaults shared by the config layer and the builder

/// Platform tag used in the build and prefix directory names
pub const DEFAULT_PLATFORM: &str = "macos";

/// Oldest macOS release the built libraries must run on
pub const DEFAULT_MACOS_MIN_VERSION: &str = "10.9";

pub const DEFAULT_MAKE: &str = "make";

/// Frameworks every link line pulls in
pub const DEFAULT_FRAMEWORKS: &[&str] = &["AudioUnit"];

/// CMake shipped inside the macOS app bundle
pub const CMAKE_APP_BUNDLE: &str = "/Applications/CMake.app/Contents/bin/cmake";

/// Identity used when a host rejects the default client
pub const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:60.0) Gecko/20100101 Firefox/60.0";

/// Config file looked up in the working directory when `--config` is absent
pub const CONFIG_FILE_NAME: &str = "depbuild.toml";

pub const ENV_ROOT: &str = "DEPBUILD_ROOT";
pub const ENV_MACOS_MIN_VERSION: &str = "DEPBUILD_MACOS_MIN_VERSION";
pub const ENV_MAKE: &str = "DEPBUILD_MAKE";
pub const ENV_CMAKE: &str = "DEPBUILD_CMAKE";
pub const ENV_NETWORK_TIMEOUT: &str = "DEPBUILD_NETWORK_TIMEOUT";
