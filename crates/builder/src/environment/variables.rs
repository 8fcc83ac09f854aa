//! Compiler flags and the child process environment

use std::collections::BTreeMap;
use std::path::Path;

/// Variables that receive the compiler flags
pub(crate) const COMPILER_FLAG_VARS: &[&str] =
    &["CPPFLAGS", "CFLAGS", "CXXFLAGS", "OBJCFLAGS", "OBJCXXFLAGS"];

/// Flags shared by compiling and linking
pub(crate) fn common_flags(macos_min_version: &str, sdk: Option<&Path>) -> String {
    let mut flags = format!("-mmacosx-version-min={macos_min_version}");
    if let Some(sdk) = sdk {
        flags.push_str(&format!(" -isysroot {}", sdk.display()));
    }
    flags
}

pub(crate) fn compiler_flags(common: &str, include_dir: &Path) -> String {
    format!("{common} -I{}", include_dir.display())
}

pub(crate) fn linker_flags<S: AsRef<str>>(common: &str, lib_dir: &Path, frameworks: &[S]) -> String {
    let mut flags = format!("{common} -L{}", lib_dir.display());
    for framework in frameworks {
        flags.push_str(" -framework ");
        flags.push_str(framework.as_ref());
    }
    flags
}

/// Overlay the build variables on an inherited environment
///
/// `bin_dir` goes to the front of `PATH` so tools installed by earlier
/// packages shadow system copies.
pub(crate) fn child_environment<I>(
    inherited: I,
    bin_dir: &Path,
    compiler_flags: &str,
    linker_flags: &str,
) -> BTreeMap<String, String>
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut env: BTreeMap<String, String> = inherited.into_iter().collect();

    let bin = bin_dir.display().to_string();
    let path = match env.get("PATH") {
        Some(existing) if !existing.is_empty() => format!("{bin}:{existing}"),
        _ => bin,
    };
    env.insert("PATH".to_string(), path);

    for var in COMPILER_FLAG_VARS {
        env.insert((*var).to_string(), compiler_flags.to_string());
    }
    env.insert("LDFLAGS".to_string(), linker_flags.to_string());

    env
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_flags() {
        assert_eq!(common_flags("10.9", None), "-mmacosx-version-min=10.9");
        assert_eq!(
            common_flags("10.9", Some(Path::new("/w/MacOSX10.9.sdk"))),
            "-mmacosx-version-min=10.9 -isysroot /w/MacOSX10.9.sdk"
        );
    }

    #[test]
    fn test_linker_flags_list_frameworks() {
        let flags = linker_flags(
            "-mmacosx-version-min=10.9",
            Path::new("/w/dependencies_macos/lib"),
            &["AudioUnit", "CoreAudio"],
        );
        assert_eq!(
            flags,
            "-mmacosx-version-min=10.9 -L/w/dependencies_macos/lib -framework AudioUnit -framework CoreAudio"
        );
    }

    #[test]
    fn test_path_is_prepended() {
        let inherited = vec![
            ("PATH".to_string(), "/usr/bin:/bin".to_string()),
            ("HOME".to_string(), "/Users/dev".to_string()),
        ];
        let env = child_environment(inherited, Path::new("/p/bin"), "-I/p/include", "-L/p/lib");

        assert_eq!(env["PATH"], "/p/bin:/usr/bin:/bin");
        assert_eq!(env["HOME"], "/Users/dev");
        for var in COMPILER_FLAG_VARS {
            assert_eq!(env[*var], "-I/p/include");
        }
        assert_eq!(env["LDFLAGS"], "-L/p/lib");
    }

    #[test]
    fn test_missing_path_becomes_bin_dir() {
        let env = child_environment(Vec::new(), Path::new("/p/bin"), "", "");
        assert_eq!(env["PATH"], "/p/bin");
    }

    #[test]
    fn test_inherited_flags_are_overridden() {
        let inherited = vec![("CFLAGS".to_string(), "-O3".to_string())];
        let env = child_environment(inherited, Path::new("/p/bin"), "-I/p/include", "-L/p/lib");
        assert_eq!(env["CFLAGS"], "-I/p/include");
    }
}
