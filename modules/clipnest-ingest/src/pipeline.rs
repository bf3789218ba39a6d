//! One pipeline pass per inbound URL: guard → classify → fetch → collect
//! images → normalize. Stateless across requests: everything here is
//! per-request locals, so concurrent requests never share mutable state.

use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use clipnest_common::{
    guard, ClipDraft, ClipnestError, Config, NormalizedContent, PlatformTag,
};

use crate::fetch::{ContentFetchOrchestrator, FetchOutcome};
use crate::images::{self, HtmlImageCollector, ImageCollector};
use crate::normalize;
use crate::platform;
use crate::scraper::{FetchStrategy, ReaderFetcher, RenderFetcher};

pub struct IngestRequest {
    pub url: String,
    pub hint: Option<PlatformTag>,
}

/// Pre-captured content from the client-side capture flow. Skips the fetch
/// entirely but still passes guard, detection, and normalization.
pub struct CapturedContent {
    pub text: String,
    pub html: Option<String>,
}

pub struct ContentPipeline {
    orchestrator: ContentFetchOrchestrator,
    collector: Arc<dyn ImageCollector>,
}

impl ContentPipeline {
    pub fn new(orchestrator: ContentFetchOrchestrator, collector: Arc<dyn ImageCollector>) -> Self {
        Self {
            orchestrator,
            collector,
        }
    }

    /// Wire up strategies from configuration. Without a Browserless
    /// endpoint the render strategy fails fast and the reader covers
    /// everything via the fallback path.
    pub fn from_config(config: &Config) -> Self {
        let timeout = Duration::from_secs(config.fetch_timeout_secs);

        let render: Arc<dyn FetchStrategy> = match config.browserless_url {
            Some(ref base) => Arc::new(RenderFetcher::new(
                base,
                config.browserless_token.as_deref(),
                timeout,
                config.max_concurrent_renders,
            )),
            None => Arc::new(RenderFetcher::disabled()),
        };
        let reader: Arc<dyn FetchStrategy> = Arc::new(ReaderFetcher::new(timeout));

        Self::new(
            ContentFetchOrchestrator::new(render, reader, timeout),
            Arc::new(HtmlImageCollector),
        )
    }

    /// Full fetch flow for a submitted URL.
    pub async fn run(&self, request: IngestRequest) -> Result<ClipDraft, ClipnestError> {
        let outcome = self.orchestrator.fetch(&request.url, request.hint).await?;
        let FetchOutcome { result, platform } = outcome;

        let collected = match self
            .collector
            .collect(&result.final_url, result.html_content.as_deref())
            .await
        {
            Ok(urls) => urls,
            Err(e) => {
                warn!(url = %request.url, error = %e, "Image collection failed");
                Vec::new()
            }
        };
        let md_images = images::markdown_image_urls(&result.raw_text);
        let image_set = images::merge_images([collected, md_images]);

        let content = normalize::normalize(platform, &result.raw_text);

        Ok(ClipDraft {
            url: request.url,
            final_url: result.final_url,
            platform,
            content,
            raw_text: result.raw_text,
            html_content: result.html_content,
            images: image_set,
            author: result.author,
            author_handle: result.author_handle,
            author_avatar: result.author_avatar,
        })
    }

    /// Client-capture flow: the browser extension already has the page
    /// text/HTML, so there is nothing to fetch, but the URL still has to
    /// clear the guard, and the text still gets the platform's normalizer.
    pub async fn run_captured(
        &self,
        request: IngestRequest,
        captured: CapturedContent,
    ) -> Result<ClipDraft, ClipnestError> {
        let candidate = guard::validate(&request.url).map_err(ClipnestError::Validation)?;
        let platform = platform::detect(candidate.parsed.as_str(), request.hint);

        let collected = match self
            .collector
            .collect(&request.url, captured.html.as_deref())
            .await
        {
            Ok(urls) => urls,
            Err(e) => {
                warn!(url = %request.url, error = %e, "Image collection failed");
                Vec::new()
            }
        };
        let md_images = images::markdown_image_urls(&captured.text);
        let image_set = images::merge_images([collected, md_images]);

        let content: NormalizedContent = normalize::normalize(platform, &captured.text);

        Ok(ClipDraft {
            url: request.url.clone(),
            final_url: request.url,
            platform,
            content,
            raw_text: captured.text,
            html_content: captured.html,
            images: image_set,
            author: None,
            author_handle: None,
            author_avatar: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use anyhow::Result;
    use async_trait::async_trait;

    use clipnest_common::FetchResult;

    struct FixedStrategy {
        text: &'static str,
        final_url: &'static str,
    }

    #[async_trait]
    impl FetchStrategy for FixedStrategy {
        async fn fetch(&self, _url: &str, platform: PlatformTag) -> Result<FetchResult> {
            Ok(FetchResult {
                raw_text: self.text.to_string(),
                html_content: Some(
                    r#"<meta property="og:image" content="https://cdn.example/og.jpg">"#
                        .to_string(),
                ),
                final_url: self.final_url.to_string(),
                author: Some("Author".to_string()),
                author_handle: None,
                author_avatar: None,
                platform,
            })
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    fn pipeline(text: &'static str, final_url: &'static str) -> ContentPipeline {
        let strategy = Arc::new(FixedStrategy { text, final_url });
        ContentPipeline::new(
            ContentFetchOrchestrator::new(
                strategy.clone(),
                strategy,
                Duration::from_millis(200),
            ),
            Arc::new(HtmlImageCollector),
        )
    }

    const ARTICLE: &str = "![lead](https://cdn.example/lead.png)\n\nA real paragraph that is definitely longer than fifty characters for content detection.";

    #[tokio::test]
    async fn run_produces_draft_with_merged_images_and_clean_text() {
        let pipeline = pipeline(ARTICLE, "https://example.com/post");
        let draft = pipeline
            .run(IngestRequest {
                url: "https://example.com/post".to_string(),
                hint: None,
            })
            .await
            .unwrap();

        assert!(draft.content.clean_text.contains("A real paragraph"));
        assert!(!draft.content.clean_text.contains("![lead]"));
        // og:image from HTML first, then the markdown-referenced lead image
        assert_eq!(
            draft.images.as_slice(),
            &[
                "https://cdn.example/og.jpg".to_string(),
                "https://cdn.example/lead.png".to_string(),
            ]
        );
        assert_eq!(draft.platform, PlatformTag::Web);
        assert_eq!(draft.author.as_deref(), Some("Author"));
    }

    #[tokio::test]
    async fn run_rejects_blocked_urls_before_fetching() {
        let pipeline = pipeline(ARTICLE, "https://example.com/post");
        let err = pipeline
            .run(IngestRequest {
                url: "http://192.168.0.10/admin".to_string(),
                hint: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ClipnestError::Validation(_)));
    }

    #[tokio::test]
    async fn captured_flow_skips_fetch_but_normalizes() {
        let pipeline = pipeline("unused", "https://unused.example");
        let draft = pipeline
            .run_captured(
                IngestRequest {
                    url: "https://www.threads.net/@user/post/1".to_string(),
                    hint: None,
                },
                CapturedContent {
                    text: "a captured post body from the extension".to_string(),
                    html: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(draft.platform, PlatformTag::Threads);
        assert!(draft.content.threads.is_some());
        assert_eq!(draft.final_url, "https://www.threads.net/@user/post/1");
    }

    #[tokio::test]
    async fn captured_flow_still_guards_the_url() {
        let pipeline = pipeline("unused", "https://unused.example");
        let err = pipeline
            .run_captured(
                IngestRequest {
                    url: "http://localhost/secret".to_string(),
                    hint: None,
                },
                CapturedContent {
                    text: "text".to_string(),
                    html: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ClipnestError::Validation(_)));
    }
}
