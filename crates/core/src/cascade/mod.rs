//! Ordered provider fallback with a deterministic terminal stage.
//!
//! A [`Cascade`] tries providers in fixed priority order. Any failure —
//! timeout, non-2xx status, missing credentials, unparseable body, payload
//! failing validity — advances to the next provider; exhaustion invokes a
//! pure local fallback that cannot fail. Callers therefore never see an
//! error from a cascade, only a payload and a record of where it came from.
//!
//! Each attempt is independent and carries its own bounded timeout; a result
//! that arrives after the timeout is discarded.

pub mod error;

use std::time::Duration;

use async_trait::async_trait;

pub use error::ProviderError;

/// Default bound on a single provider attempt.
const DEFAULT_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(10);

/// One stage of a cascade.
#[async_trait]
pub trait Provider<Req, Out>: Send + Sync
where
    Req: Send + Sync,
{
    /// Short stable name used in logs and outcome reporting.
    fn name(&self) -> &str;

    async fn attempt(&self, req: &Req) -> Result<Out, ProviderError>;
}

/// Which stage produced a cascade's payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Provider(String),
    Fallback,
}

/// A cascade run's payload plus provenance.
#[derive(Debug, Clone)]
pub struct CascadeOutcome<Out> {
    pub value: Out,
    pub resolved_by: Resolution,
}

impl<Out> CascadeOutcome<Out> {
    pub fn is_fallback(&self) -> bool {
        self.resolved_by == Resolution::Fallback
    }
}

/// Ordered providers plus an infallible deterministic fallback.
pub struct Cascade<Req, Out>
where
    Req: Send + Sync,
{
    providers: Vec<Box<dyn Provider<Req, Out>>>,
    attempt_timeout: Duration,
    validate: Option<Box<dyn Fn(&Out) -> Result<(), String> + Send + Sync>>,
    fallback: Box<dyn Fn(&Req) -> Out + Send + Sync>,
}

impl<Req, Out> Cascade<Req, Out>
where
    Req: Send + Sync,
    Out: Send,
{
    /// Create a cascade with only its terminal fallback.
    ///
    /// The fallback must be pure: identical requests produce byte-identical
    /// payloads across runs.
    pub fn new(fallback: impl Fn(&Req) -> Out + Send + Sync + 'static) -> Self {
        Self {
            providers: Vec::new(),
            attempt_timeout: DEFAULT_ATTEMPT_TIMEOUT,
            validate: None,
            fallback: Box::new(fallback),
        }
    }

    /// Append a provider. Order of calls is priority order.
    pub fn with_provider(mut self, provider: impl Provider<Req, Out> + 'static) -> Self {
        self.providers.push(Box::new(provider));
        self
    }

    /// Bound each provider attempt. Exceeding it advances the cascade.
    pub fn with_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = timeout;
        self
    }

    /// Minimal validity check applied to successful payloads; a rejection
    /// advances the cascade exactly like a provider failure.
    pub fn with_validator(mut self, validate: impl Fn(&Out) -> Result<(), String> + Send + Sync + 'static) -> Self {
        self.validate = Some(Box::new(validate));
        self
    }

    /// Run the cascade to completion. Never fails.
    pub async fn run(&self, req: &Req) -> CascadeOutcome<Out> {
        for provider in &self.providers {
            let attempt = tokio::time::timeout(self.attempt_timeout, provider.attempt(req)).await;
            let result = match attempt {
                Ok(result) => result,
                Err(_) => Err(ProviderError::Timeout),
            };

            match result {
                Ok(value) => {
                    if let Some(validate) = &self.validate
                        && let Err(reason) = validate(&value)
                    {
                        tracing::warn!(provider = provider.name(), reason = %reason, "provider payload failed validity, advancing");
                        continue;
                    }
                    tracing::debug!(provider = provider.name(), "provider succeeded");
                    return CascadeOutcome {
                        value,
                        resolved_by: Resolution::Provider(provider.name().to_string()),
                    };
                }
                Err(e) if e.is_configuration() => {
                    tracing::warn!(provider = provider.name(), error = %e, "provider not configured, advancing");
                }
                Err(e) => {
                    tracing::warn!(provider = provider.name(), error = %e, "provider failed, advancing");
                }
            }
        }

        tracing::debug!("all providers exhausted, using deterministic fallback");
        CascadeOutcome { value: (self.fallback)(req), resolved_by: Resolution::Fallback }
    }
}
