#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Network operations for depbuild
//!
//! This crate fetches source archives over HTTP(S), falling back to a
//! browser identity for hosts that turn away unknown clients.

mod client;
mod download;

pub use client::{Identity, NetClient, NetConfig};
pub use download::{download_file, stream_to_file, DownloadResult};

use depbuild_errors::{Error, NetworkError};
use url::Url;

/// Parse and validate a URL
///
/// # Errors
///
/// Returns an error if the URL string is malformed or invalid according to RFC 3986.
pub fn parse_url(url: &str) -> Result<Url, Error> {
    Url::parse(url).map_err(|e| NetworkError::InvalidUrl(format!("{url}: {e}")).into())
}

/// Name a downloaded file after the last path segment of its URL
///
/// # Errors
///
/// Returns an error if the URL is invalid or its path has no final segment.
pub fn url_filename(url: &str) -> Result<String, Error> {
    let parsed = parse_url(url)?;
    parsed
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|segment| !segment.is_empty())
        .map(ToString::to_string)
        .ok_or_else(|| NetworkError::InvalidUrl(format!("{url}: no file name in path")).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_url() {
        assert!(parse_url("https://downloads.xiph.org").is_ok());
        assert!(parse_url("not a url").is_err());
    }

    #[test]
    fn test_url_filename() {
        assert_eq!(
            url_filename("https://downloads.xiph.org/releases/ogg/libogg-1.3.4.tar.gz").unwrap(),
            "libogg-1.3.4.tar.gz"
        );
        assert_eq!(
            url_filename("https://github.com/webmproject/libvpx/archive/v1.8.2.tar.gz").unwrap(),
            "v1.8.2.tar.gz"
        );
        assert!(url_filename("https://example.com/").is_err());
        assert!(url_filename("https://example.com/releases/").is_err());
    }
}
