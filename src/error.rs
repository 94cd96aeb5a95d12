use thiserror::Error;

/// Errors surfaced by top-level scanner calls.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("scanner state is not loaded; call load() first")]
    NotLoaded,

    #[error("unable to interpret message input: {0}")]
    Parse(String),

    #[error("classifier model could not be loaded: {0}")]
    Model(String),
}

/// A single feed provider failed to fetch or parse. Recovered per-provider
/// inside `load()`; scanning continues with the providers that succeeded.
#[derive(Debug, Clone, Error)]
#[error("feed provider {provider} unavailable: {reason}")]
pub struct FeedUnavailableError {
    pub provider: String,
    pub reason: String,
}

impl FeedUnavailableError {
    pub fn new(provider: &str, reason: impl Into<String>) -> Self {
        Self {
            provider: provider.to_string(),
            reason: reason.into(),
        }
    }
}

/// One attachment's payload would not decode. The attachment is skipped
/// and the failure recorded as a scan warning; it never fails the scan.
#[derive(Debug, Clone, Error)]
#[error("Attachment #{index} could not be decoded and was skipped: {reason}")]
pub struct AttachmentDecodeError {
    /// 1-based attachment position.
    pub index: usize,
    pub reason: String,
}
