//! HTTP transport for the harvester
//!
//! This module handles all outbound requests, including:
//! - Building the HTTP client with a proper user agent string
//! - GET requests decoded as JSON with a per-call timeout
//! - Error classification into timeouts, connection failures, HTTP status
//!   failures and undecodable bodies
//!
//! Everything above this layer talks to [`JsonTransport`], so tests can swap
//! the network out.

use crate::config::UserAgentConfig;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Failure of a single outbound request
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("connection to {url} failed: {message}")]
    Connect { url: String, message: String },

    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("undecodable response from {url}: {message}")]
    Decode { url: String, message: String },

    #[error("request to {url} failed: {message}")]
    Other { url: String, message: String },
}

impl TransportError {
    /// Returns true if the upstream definitively says the resource is gone
    pub fn is_definitive_absence(&self) -> bool {
        matches!(
            self,
            Self::Status { status, .. }
                if *status == StatusCode::NOT_FOUND.as_u16() || *status == StatusCode::GONE.as_u16()
        )
    }
}

/// Source of JSON documents addressed by URL
#[async_trait]
pub trait JsonTransport: Send + Sync {
    /// Fetches `url` and decodes the body as JSON, giving up after `timeout`
    async fn get_json(&self, url: &str, timeout: Duration) -> Result<Value, TransportError>;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The user agent configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use steam_harvest::config::UserAgentConfig;
/// use steam_harvest::crawler::build_http_client;
///
/// let client = build_http_client(&UserAgentConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// [`JsonTransport`] backed by reqwest
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds the client from the user agent configuration
    pub fn from_config(config: &UserAgentConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::new(build_http_client(config)?))
    }
}

#[async_trait]
impl JsonTransport for HttpTransport {
    async fn get_json(&self, url: &str, timeout: Duration) -> Result<Value, TransportError> {
        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| classify_error(url, &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|e| classify_error(url, &e))?;

        serde_json::from_str(&body).map_err(|e| TransportError::Decode {
            url: url.to_string(),
            message: e.to_string(),
        })
    }
}

/// Classifies a reqwest failure
fn classify_error(url: &str, e: &reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout {
            url: url.to_string(),
        }
    } else if e.is_connect() {
        TransportError::Connect {
            url: url.to_string(),
            message: e.to_string(),
        }
    } else if e.is_decode() || e.is_body() {
        TransportError::Decode {
            url: url.to_string(),
            message: e.to_string(),
        }
    } else {
        TransportError::Other {
            url: url.to_string(),
            message: e.to_string(),
        }
    }
}
