//! Build environment management
//!
//! This module owns everything that is decided once per run and then shared
//! by every package: the build and prefix directories, the compiler and
//! linker flags, the child environment, and which `make`/`cmake` to call.

mod core;
mod toolchain;
mod variables;

// Re-export public API
pub use self::core::BuildEnvironment;
pub use toolchain::{detect_cmake, CmakeTool};
