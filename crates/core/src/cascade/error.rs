//! Provider attempt error types.

/// Errors from a single provider attempt.
///
/// Every variant advances the cascade to the next provider; none crosses the
/// cascade boundary. `MissingCredentials` is a configuration problem rather
/// than a transient one and is logged distinctly for operability.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ProviderError {
    /// Provider requires a credential that is not configured.
    #[error("missing credentials: {0}")]
    MissingCredentials(String),

    /// Attempt exceeded its bounded timeout.
    #[error("request timeout")]
    Timeout,

    /// Non-2xx HTTP response.
    #[error("HTTP error: {status}")]
    Http { status: u16 },

    /// Rate limited by the remote service.
    #[error("rate limited: too many requests")]
    RateLimited,

    /// Transport-level failure (DNS, connect, TLS, read).
    #[error("network error: {0}")]
    Network(String),

    /// Response body did not match the provider's wire schema.
    #[error("parse error: {0}")]
    Parse(String),

    /// Payload arrived but failed minimal validity checks.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),
}

impl ProviderError {
    /// Whether this is a configuration failure rather than a transient one.
    pub fn is_configuration(&self) -> bool {
        matches!(self, ProviderError::MissingCredentials(_))
    }
}
