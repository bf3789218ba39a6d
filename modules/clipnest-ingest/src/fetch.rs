//! Fetch-strategy orchestration.
//!
//! Picks a strategy by platform, runs it under a bounded timeout, and falls
//! back to the other strategy exactly once. Thin content is not a failure;
//! only a double miss is. Attempts run strictly in sequence so a struggling
//! host never sees both strategies at once.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::{info, warn};

use clipnest_common::{guard, ClipnestError, FetchResult, PlatformTag};

use crate::platform;
use crate::scraper::FetchStrategy;

/// Platforms whose content only exists after page JS runs.
const RENDER_PLATFORMS: &[PlatformTag] = &[
    PlatformTag::Threads,
    PlatformTag::Instagram,
    PlatformTag::Twitter,
];

/// A successful orchestration: the fetch result plus the post-redirect
/// platform tag that governs normalization.
#[derive(Debug)]
pub struct FetchOutcome {
    pub result: FetchResult,
    pub platform: PlatformTag,
}

pub struct ContentFetchOrchestrator {
    render: Arc<dyn FetchStrategy>,
    reader: Arc<dyn FetchStrategy>,
    attempt_timeout: Duration,
}

impl ContentFetchOrchestrator {
    pub fn new(
        render: Arc<dyn FetchStrategy>,
        reader: Arc<dyn FetchStrategy>,
        attempt_timeout: Duration,
    ) -> Self {
        Self {
            render,
            reader,
            attempt_timeout,
        }
    }

    pub async fn fetch(
        &self,
        url: &str,
        hint: Option<PlatformTag>,
    ) -> Result<FetchOutcome, ClipnestError> {
        let candidate = guard::validate(url).map_err(ClipnestError::Validation)?;
        let pre_tag = platform::detect(candidate.parsed.as_str(), hint);

        // Ordered attempt list: the platform's strategy first, the other one
        // as the single fallback. Never a third attempt.
        let (primary, fallback) = if RENDER_PLATFORMS.contains(&pre_tag) {
            (&self.render, &self.reader)
        } else {
            (&self.reader, &self.render)
        };

        let result = match self.attempt(primary.as_ref(), url, pre_tag).await {
            Ok(result) => result,
            Err(primary_err) => {
                warn!(
                    url,
                    strategy = primary.name(),
                    error = %primary_err,
                    "Primary fetch failed, trying fallback"
                );
                match self.attempt(fallback.as_ref(), url, pre_tag).await {
                    Ok(result) => result,
                    Err(fallback_err) => {
                        warn!(
                            url,
                            strategy = fallback.name(),
                            error = %fallback_err,
                            "Fallback fetch failed"
                        );
                        return Err(ClipnestError::Fetch(format!(
                            "{}: {primary_err}; {}: {fallback_err}",
                            primary.name(),
                            fallback.name()
                        )));
                    }
                }
            }
        };

        // The tag derived from the post-redirect URL supersedes the
        // pre-fetch guess for normalization.
        let post_tag = platform::detect(&result.final_url, hint);
        if post_tag != pre_tag {
            info!(url, from = %pre_tag, to = %post_tag, "Platform re-classified after redirect");
        }

        Ok(FetchOutcome {
            result,
            platform: post_tag,
        })
    }

    /// One bounded attempt. Timeout, error, and empty text all count as a
    /// miss; thin-but-nonempty text is a hit.
    async fn attempt(
        &self,
        strategy: &dyn FetchStrategy,
        url: &str,
        tag: PlatformTag,
    ) -> Result<FetchResult> {
        match tokio::time::timeout(self.attempt_timeout, strategy.fetch(url, tag)).await {
            Ok(Ok(result)) if result.raw_text.trim().is_empty() => {
                anyhow::bail!("{} returned empty content", strategy.name())
            }
            Ok(Ok(result)) => Ok(result),
            Ok(Err(e)) => Err(e),
            Err(_) => anyhow::bail!(
                "{} timed out after {:?}",
                strategy.name(),
                self.attempt_timeout
            ),
        }
    }
}
