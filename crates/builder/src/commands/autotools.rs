//! GNU Autotools and make command lines

use std::path::Path;

/// Whether `configure` should restrict itself to static libraries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Linkage {
    Default,
    StaticOnly,
}

/// `./configure --prefix=<prefix> [--enable-static --disable-shared] <args>`
pub(crate) fn configure_argv(prefix: &Path, linkage: Linkage, user_args: &[String]) -> Vec<String> {
    let mut argv = vec![
        "./configure".to_string(),
        format!("--prefix={}", prefix.display()),
    ];
    if linkage == Linkage::StaticOnly {
        argv.push("--enable-static".to_string());
        argv.push("--disable-shared".to_string());
    }
    argv.extend(user_args.iter().cloned());
    argv
}

/// `make <args>`, followed by `install` for the install step
pub(crate) fn make_argv(make: &str, user_args: &[String], install: bool) -> Vec<String> {
    let mut argv = vec![make.to_string()];
    argv.extend(user_args.iter().cloned());
    if install {
        argv.push("install".to_string());
    }
    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(args: &[&str]) -> Vec<String> {
        args.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_configure() {
        assert_eq!(
            configure_argv(Path::new("/p"), Linkage::Default, &strings(&["--disable-gif"])),
            strings(&["./configure", "--prefix=/p", "--disable-gif"])
        );
    }

    #[test]
    fn test_configure_static() {
        assert_eq!(
            configure_argv(Path::new("/p"), Linkage::StaticOnly, &strings(&["--without-x"])),
            strings(&[
                "./configure",
                "--prefix=/p",
                "--enable-static",
                "--disable-shared",
                "--without-x"
            ])
        );
    }

    #[test]
    fn test_make_and_install() {
        assert_eq!(make_argv("make", &[], false), strings(&["make"]));
        assert_eq!(
            make_argv("gmake", &strings(&["-j4"]), true),
            strings(&["gmake", "-j4", "install"])
        );
    }
}
