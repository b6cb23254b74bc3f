//! Shared HTTP plumbing for the provider clients.
//!
//! - One `reqwest::Client` built from configuration (user agent, rustls,
//!   compression) and cloned into every provider.
//! - Uniform classification of transport and status failures into
//!   [`ProviderError`] so every provider advances a cascade the same way.
//! - A bounded byte download used by the image cache.

pub mod url;

use newsdeck_core::{AppConfig, ProviderError};
use reqwest::{Client, StatusCode};

pub use url::{UrlError, canonical_identity, canonicalize};

/// Build the shared HTTP client.
pub fn http_client(config: &AppConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(&config.user_agent)
        .timeout(config.attempt_timeout())
        .use_rustls_tls()
        .gzip(true)
        .brotli(true)
        .deflate(true)
        .build()
}

/// Map a transport-level reqwest failure into a provider error.
pub(crate) fn request_error(e: reqwest::Error) -> ProviderError {
    if e.is_timeout() { ProviderError::Timeout } else { ProviderError::Network(e.to_string()) }
}

/// Map a non-success HTTP status into a provider error, if any.
pub(crate) fn status_error(status: StatusCode) -> Option<ProviderError> {
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Some(ProviderError::RateLimited);
    }
    if status.is_client_error() || status.is_server_error() {
        return Some(ProviderError::Http { status: status.as_u16() });
    }
    None
}

/// Download a URL's body, rejecting payloads over `max_bytes`.
pub(crate) async fn fetch_bytes(http: &Client, url: &str, max_bytes: usize) -> Result<bytes::Bytes, ProviderError> {
    let response = http.get(url).send().await.map_err(request_error)?;

    if let Some(e) = status_error(response.status()) {
        return Err(e);
    }

    if let Some(len) = response.content_length()
        && len as usize > max_bytes
    {
        return Err(ProviderError::InvalidPayload(format!("{len} bytes exceeds {max_bytes}")));
    }

    let bytes = response.bytes().await.map_err(request_error)?;
    if bytes.len() > max_bytes {
        return Err(ProviderError::InvalidPayload(format!("{} bytes exceeds {max_bytes}", bytes.len())));
    }

    Ok(bytes)
}
