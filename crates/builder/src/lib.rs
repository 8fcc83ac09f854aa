#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Dependency builder for depbuild
//!
//! This crate turns a fixed, ordered list of pinned source archives into
//! static libraries under a shared install prefix. Each package is fetched
//! (or taken from the build directory), checked against its SHA-256,
//! unpacked with the system `tar` and built with autotools or CMake inside
//! one [`BuildEnvironment`] that is settled before the first package runs.

pub mod archive;
mod commands;
mod context;
mod environment;
mod package;
mod registry;

#[cfg(test)]
mod test_support;

pub use commands::{BuildStep, CommandChain, Commands, NO_ARGS};
pub use context::BuildContext;
pub use environment::{detect_cmake, BuildEnvironment, CmakeTool};
pub use package::Package;
pub use registry::{
    cmake_bootstrap_package, default_packages, BuildSummary, PackageRegistry, CMAKE_BOOTSTRAP_NAME,
};
