//! HTTP client with a browser-identity fallback

use depbuild_config::NetworkConfig;
use depbuild_errors::{Error, NetworkError};
use reqwest::header::USER_AGENT;
use reqwest::{Client, Response};
use std::time::Duration;

/// Network client configuration
#[derive(Debug, Clone)]
pub struct NetConfig {
    pub timeout: Duration,
    pub connect_timeout: Duration,
    /// Identity sent on the first attempt
    pub user_agent: String,
    /// Identity sent on the single retry after the first attempt is rejected
    pub browser_user_agent: String,
}

impl Default for NetConfig {
    fn default() -> Self {
        Self::from(&NetworkConfig::default())
    }
}

impl From<&NetworkConfig> for NetConfig {
    fn from(config: &NetworkConfig) -> Self {
        Self {
            timeout: Duration::from_secs(config.timeout),
            connect_timeout: Duration::from_secs(config.connect_timeout),
            user_agent: config
                .user_agent
                .clone()
                .unwrap_or_else(|| format!("depbuild/{}", env!("CARGO_PKG_VERSION"))),
            browser_user_agent: config.browser_user_agent.clone(),
        }
    }
}

/// Which identity a request goes out with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Identity {
    Default,
    Browser,
}

/// HTTP client wrapper
#[derive(Clone)]
pub struct NetClient {
    client: Client,
    config: NetConfig,
}

impl NetClient {
    /// Create a new network client
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying reqwest client fails to initialize.
    pub fn new(config: NetConfig) -> Result<Self, Error> {
        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| NetworkError::ConnectionRefused(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Create with default configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created with default settings.
    pub fn with_defaults() -> Result<Self, Error> {
        Self::new(NetConfig::default())
    }

    #[must_use]
    pub fn config(&self) -> &NetConfig {
        &self.config
    }

    /// Issue a GET and require a success status
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or when the server answers
    /// with a non-success status.
    pub async fn get(&self, url: &str, identity: Identity) -> Result<Response, Error> {
        let mut request = self.client.get(url);
        if identity == Identity::Browser {
            request = request.header(USER_AGENT, &self.config.browser_user_agent);
        }

        let response = request.send().await.map_err(|e| map_reqwest_error(&e, url))?;

        if !response.status().is_success() {
            return Err(NetworkError::HttpError {
                status: response.status().as_u16(),
                message: response.status().to_string(),
            }
            .into());
        }

        Ok(response)
    }
}

pub(crate) fn map_reqwest_error(e: &reqwest::Error, url: &str) -> Error {
    if e.is_timeout() {
        NetworkError::Timeout {
            url: url.to_string(),
        }
        .into()
    } else if e.is_connect() {
        NetworkError::ConnectionRefused(e.to_string()).into()
    } else {
        NetworkError::DownloadFailed(e.to_string()).into()
    }
}
