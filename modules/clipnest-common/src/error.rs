use thiserror::Error;

use crate::guard::RejectReason;

#[derive(Error, Debug)]
pub enum ClipnestError {
    /// SSRF or malformed-URL rejection. Surfaced as 4xx, never retried.
    #[error("Validation error: {0}")]
    Validation(RejectReason),

    /// Both the primary and fallback fetch strategies failed. Surfaced as
    /// 5xx; the caller may resubmit, the pipeline never retries on its own.
    #[error("Fetch error: {0}")]
    Fetch(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}
