//! Transport Layer for the API Client
//!
//! Abstracts the HTTP connection for testability. Provides:
//! - Transport trait: interface for one request/response exchange
//! - HttpTransport: authenticated HTTPS connection for production
//!
//! The in-process test double lives in `crate::mock`.

use std::time::Duration;

use cv_api::{Method, UNLIMITED_PER_PAGE};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::Url;
use serde_json::Value;
use tracing::debug;

/// Transport trait for API communication
pub trait Transport: Send + Sync {
    /// Issue one request and return the decoded JSON body.
    ///
    /// `params` is a JSON object (or null). Reads send it as the query
    /// string, creates as the JSON body; deletes take no parameters.
    fn fetch(&self, method: Method, path: &str, params: &Value) -> Result<Value, TransportError>;
}

/// Transport errors
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Response is not valid JSON: {0}")]
    Decode(String),

    #[error("Server unavailable: {0}")]
    Unavailable(String),

    /// The caller built a request the transport cannot express.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl TransportError {
    /// True when the error comes from a malformed request rather than the
    /// server or the network.
    pub fn is_misuse(&self) -> bool {
        matches!(self, TransportError::InvalidRequest(_))
    }
}

/// HTTP transport configuration
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Server base URL, e.g. `https://foreman.example.com`
    pub base_url: String,
    /// API user
    pub user: String,
    /// API token (used as the basic-auth password)
    pub token: String,
    /// Verify the server certificate
    pub verify_tls: bool,
    /// Per-request timeout in seconds
    pub timeout_seconds: u64,
    /// `per_page` added to reads that do not set one
    pub per_page: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            user: "api".to_string(),
            token: String::new(),
            verify_tls: false,
            timeout_seconds: 120,
            per_page: UNLIMITED_PER_PAGE.to_string(),
        }
    }
}

/// HTTP transport for production use
pub struct HttpTransport {
    client: Client,
    config: HttpConfig,
}

impl HttpTransport {
    /// Create a new HTTP transport with the given configuration
    pub fn new(config: HttpConfig) -> Result<Self, TransportError> {
        Url::parse(&config.base_url).map_err(|e| {
            TransportError::InvalidRequest(format!("base URL '{}': {}", config.base_url, e))
        })?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .danger_accept_invalid_certs(!config.verify_tls)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self { client, config })
    }

    /// Join the base URL and an API path
    fn url(&self, path: &str) -> Result<Url, TransportError> {
        let joined = format!("{}{}", self.config.base_url.trim_end_matches('/'), path);
        Url::parse(&joined).map_err(|e| TransportError::InvalidRequest(format!("{}: {}", joined, e)))
    }

    /// Flatten a params object into query pairs, adding `per_page`
    fn query_pairs(&self, params: &Value) -> Result<Vec<(String, String)>, TransportError> {
        let mut pairs = Vec::new();
        match params {
            Value::Null => {}
            Value::Object(map) => {
                for (key, value) in map {
                    let rendered = match value {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    };
                    pairs.push((key.clone(), rendered));
                }
            }
            other => {
                return Err(TransportError::InvalidRequest(format!(
                    "query parameters must be an object, got {}",
                    other
                )))
            }
        }
        if !pairs.iter().any(|(key, _)| key == "per_page") {
            pairs.push(("per_page".to_string(), self.config.per_page.clone()));
        }
        Ok(pairs)
    }
}

impl Transport for HttpTransport {
    fn fetch(&self, method: Method, path: &str, params: &Value) -> Result<Value, TransportError> {
        let url = self.url(path)?;
        debug!(%method, %url, "api request");

        let request = match method {
            Method::Read => self.client.get(url).query(&self.query_pairs(params)?),
            Method::Create => match params {
                Value::Null => self.client.post(url).json(&serde_json::json!({})),
                body => self.client.post(url).json(body),
            },
            Method::Delete => {
                if !params.is_null() && params.as_object().map_or(true, |m| !m.is_empty()) {
                    return Err(TransportError::InvalidRequest(format!(
                        "DELETE {} does not take parameters",
                        path
                    )));
                }
                self.client.delete(url)
            }
        };

        let response = request
            .basic_auth(&self.config.user, Some(&self.config.token))
            .send()?;
        let status = response.status();
        let body = response.text()?;
        debug!(%status, bytes = body.len(), "api response");

        serde_json::from_str(&body).map_err(|e| {
            TransportError::Decode(format!("{} (HTTP {}): {}", path, status.as_u16(), e))
        })
    }
}
