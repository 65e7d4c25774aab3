//! HTTP transport seam.
//!
//! [`Transport`] is the single capability the client core consumes: one
//! synchronous request/response exchange. The default implementation wraps a
//! blocking reqwest client; tests substitute their own implementations to
//! observe or fake traffic. Connection reuse, timeouts and TLS live entirely
//! behind this seam.

use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use tracing::{debug, trace};

use crate::error::Result;

/// JSON request body content type.
pub const CONTENT_TYPE_JSON: &str = "application/json";
/// Newline-delimited JSON content type used by bulk endpoints.
pub const CONTENT_TYPE_NDJSON: &str = "application/x-ndjson";

/// Default user agent presented to the engine, in the compatible-bot form
/// intermediaries expect from automated clients.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (compatible; FalxBot/0.1; +https://github.com/mosuka/falx)";
/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// HTTP methods the engine API uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

/// A synchronous request/response exchange.
pub trait Transport: Send + Sync {
    /// Send one request and return the response status and body. Transport
    /// failures (connect, timeout, protocol) are reported as errors; any
    /// HTTP status is a successful exchange.
    fn send(&self, method: Method, url: &str, content_type: &str, body: &[u8])
    -> Result<(u16, Vec<u8>)>;
}

/// Blocking reqwest-backed transport.
pub struct HttpTransport {
    client: reqwest::blocking::Client,
    user_agent: String,
}

impl HttpTransport {
    /// Create a transport with the given user agent and request timeout.
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(HttpTransport {
            client,
            user_agent: user_agent.to_string(),
        })
    }

    /// Create a transport with the default user agent and timeout.
    pub fn with_defaults() -> Result<Self> {
        HttpTransport::new(DEFAULT_USER_AGENT, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }
}

impl Transport for HttpTransport {
    fn send(
        &self,
        method: Method,
        url: &str,
        content_type: &str,
        body: &[u8],
    ) -> Result<(u16, Vec<u8>)> {
        debug!(method = method.as_str(), url, body_len = body.len(), "sending request");
        trace!(body = %String::from_utf8_lossy(body), "request body");

        let mut request = match method {
            Method::Get => self.client.get(url),
            Method::Post => self.client.post(url).body(body.to_vec()),
        };
        request = request.header(USER_AGENT, self.user_agent.as_str());
        if !content_type.is_empty() {
            request = request.header(CONTENT_TYPE, content_type);
        }

        let response = request.send()?;
        let status = response.status().as_u16();
        let bytes = response.bytes()?.to_vec();

        debug!(status, body_len = bytes.len(), "received response");
        trace!(body = %String::from_utf8_lossy(&bytes), "response body");

        Ok((status, bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_user_agent_is_compatible_bot_token() {
        assert!(DEFAULT_USER_AGENT.starts_with("Mozilla/5.0 (compatible; "));
        assert!(DEFAULT_USER_AGENT.contains("FalxBot/"));
        assert!(DEFAULT_USER_AGENT.contains("+https://"));
    }
}
