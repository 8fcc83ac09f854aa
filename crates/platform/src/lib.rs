#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Process execution layer for depbuild
//!
//! Every external tool (`tar`, `./configure`, `cmake`, `make`) is launched
//! through [`ProcessOperations`]. The build pipeline only ever sees the
//! trait, so tests can substitute a recording runner for the real one.

pub mod process;

pub use process::{CommandOutput, PlatformCommand, ProcessOperations, SystemProcessOperations};
