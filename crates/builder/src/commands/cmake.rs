//! CMake command lines

use std::path::Path;

/// `<cmake> -DCMAKE_INSTALL_PREFIX=<prefix> <args> .`
///
/// Always an in-source configure of the working directory.
pub(crate) fn cmake_argv(cmake: &str, prefix: &Path, user_args: &[String]) -> Vec<String> {
    let mut argv = vec![
        cmake.to_string(),
        format!("-DCMAKE_INSTALL_PREFIX={}", prefix.display()),
    ];
    argv.extend(user_args.iter().cloned());
    argv.push(".".to_string());
    argv
}
