//! The HTTP transport seam.
//!
//! Everything above this module works against the [`Transport`] trait so the
//! retry and failover logic can be exercised without a network.

use std::time::Duration;

use reqwest::blocking::Client;

use crate::error::TransportError;
use crate::types::{HttpRequest, HttpResponse};

pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_millis(1000);
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(3000);

/// Sends one request to one endpoint.
///
/// Any HTTP response counts as `Ok`, whatever its status. `Err` means no
/// response was obtained at all.
pub trait Transport: Send + Sync {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Production transport using a blocking reqwest client.
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Create a transport with the given connect and overall request timeouts.
    pub fn new(connect_timeout: Duration, read_timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(read_timeout)
            .build()?;

        Ok(Self { client })
    }

    /// 1 s connect and 3 s request timeout.
    pub fn with_default_timeouts() -> Result<Self, reqwest::Error> {
        Self::new(DEFAULT_CONNECT_TIMEOUT, DEFAULT_READ_TIMEOUT)
    }

    /// Wrap an already configured client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    fn transport_error(request: &HttpRequest, error: reqwest::Error) -> TransportError {
        let url = request.url.to_string();
        let message = error.to_string();
        if error.is_timeout() {
            TransportError::Timeout { url, message }
        } else if error.is_connect() {
            TransportError::Connect { url, message }
        } else {
            TransportError::Io { url, message }
        }
    }
}

impl Transport for ReqwestTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let method: http::Method = request.method.into();
        let mut req_builder = self.client.request(method, request.url.clone());

        if !request.form.is_empty() {
            req_builder = req_builder.form(&request.form);
        }

        let response = req_builder
            .send()
            .map_err(|e| Self::transport_error(request, e))?;

        let status = response.status().as_u16();
        let status_text = response
            .status()
            .canonical_reason()
            .unwrap_or("Unknown")
            .to_string();

        // A body that breaks off mid-read is as good as no response.
        let body = response
            .text()
            .map_err(|e| Self::transport_error(request, e))?;

        Ok(HttpResponse {
            status,
            status_text,
            body,
        })
    }
}
