use std::sync::LazyLock;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use regex::Regex;
use spider_transformations::transformation::content::{
    transform_content_input, ReturnFormat, TransformConfig, TransformInput,
};
use tokio::sync::Semaphore;
use tracing::{info, warn};

use clipnest_common::{guard, FetchResult, PlatformTag};

// --- FetchStrategy trait ---

#[async_trait]
pub trait FetchStrategy: Send + Sync {
    async fn fetch(&self, url: &str, platform: PlatformTag) -> Result<FetchResult>;
    fn name(&self) -> &str;
}

/// Redirect chains longer than this abort the request.
const MAX_REDIRECTS: usize = 5;

const USER_AGENT: &str = "Mozilla/5.0 (compatible; ClipnestBot/0.1; +https://clipnest.app/bot)";

/// Build a reqwest client whose redirect policy re-validates every hop
/// against the URL guard. A redirect into private address space aborts the
/// request instead of following it.
fn guarded_client(timeout: Duration) -> reqwest::Client {
    let policy = reqwest::redirect::Policy::custom(|attempt| {
        if attempt.previous().len() > MAX_REDIRECTS {
            return attempt.error("too many redirects");
        }
        match guard::validate(attempt.url().as_str()) {
            Ok(_) => attempt.follow(),
            Err(reason) => attempt.error(format!("redirect target rejected: {reason}")),
        }
    });

    reqwest::Client::builder()
        .timeout(timeout)
        .redirect(policy)
        .user_agent(USER_AGENT)
        .build()
        .expect("Failed to build HTTP client")
}

/// Readability main-content extraction to Markdown. Images survive into the
/// Markdown so the collector can harvest them; normalizers strip the syntax.
fn readability_markdown(url: &str, html: &[u8]) -> String {
    let parsed_url = url::Url::parse(url).ok();
    let config = TransformConfig {
        readability: true,
        main_content: true,
        return_format: ReturnFormat::Markdown,
        filter_images: false,
        filter_svg: true,
        clean_html: true,
    };
    let input = TransformInput {
        url: parsed_url.as_ref(),
        content: html,
        screenshot_bytes: None,
        encoding: None,
        selector_config: None,
        ignore_tags: None,
    };

    transform_content_input(input, &config)
}

// --- Author metadata scraping ---

static OG_TITLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"property=["']og:title["'][^>]*content=["']([^"']+)["']"#).expect("valid regex")
});
static OG_IMAGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"property=["']og:image["'][^>]*content=["']([^"']+)["']"#).expect("valid regex")
});
static META_AUTHOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"name=["']author["'][^>]*content=["']([^"']+)["']"#).expect("valid regex")
});
static HANDLE_IN_TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(@([A-Za-z0-9._]+)\)").expect("valid regex"));

/// Author display name from meta tags. Social og:title carries
/// "Name (@handle) on Threads"; the name part is what we want.
pub(crate) fn page_author(html: &str) -> Option<String> {
    if let Some(cap) = META_AUTHOR_RE.captures(html) {
        return Some(cap[1].trim().to_string());
    }
    let title = OG_TITLE_RE.captures(html)?[1].trim().to_string();
    let name = title.split(" (@").next().unwrap_or(&title).trim();
    if name.is_empty() {
        return None;
    }
    Some(name.to_string())
}

/// Profile avatar. Social pages put it in og:image.
pub(crate) fn page_avatar(html: &str) -> Option<String> {
    OG_IMAGE_RE.captures(html).map(|cap| cap[1].to_string())
}

/// Author handle, from the `@user` path segment or the og:title parenthetical.
pub(crate) fn profile_handle(url: &str, html: &str) -> Option<String> {
    if let Ok(parsed) = url::Url::parse(url) {
        if let Some(mut segments) = parsed.path_segments() {
            if let Some(handle) = segments.find(|s| s.starts_with('@')) {
                return Some(handle.trim_start_matches('@').to_string());
            }
        }
    }
    HANDLE_IN_TITLE_RE
        .captures(html)
        .map(|cap| cap[1].to_string())
}

// --- Render strategy (Browserless + Readability) ---

/// Headless-render fetch for platforms whose initial HTML is an empty shell.
/// Resolves redirects through the guard first, renders the final URL, then
/// extracts main content and profile metadata from the rendered DOM.
pub struct RenderFetcher {
    client: Option<browserless_client::BrowserlessClient>,
    probe: reqwest::Client,
    semaphore: Semaphore,
}

impl RenderFetcher {
    pub fn new(base_url: &str, token: Option<&str>, timeout: Duration, max_concurrent: usize) -> Self {
        info!(base_url, max_concurrent, "Using Browserless render fetcher");
        Self {
            client: Some(browserless_client::BrowserlessClient::with_timeout(
                base_url, token, timeout,
            )),
            probe: guarded_client(timeout),
            semaphore: Semaphore::new(max_concurrent),
        }
    }

    /// A fetcher with no render service behind it. Fails fast so the
    /// orchestrator falls through to the reader strategy.
    pub fn disabled() -> Self {
        Self {
            client: None,
            probe: guarded_client(Duration::from_secs(10)),
            semaphore: Semaphore::new(1),
        }
    }

    /// Resolve redirects without rendering. Every hop goes back through the
    /// guard; the URL this returns is what gets rendered and re-classified.
    async fn resolve_final_url(&self, url: &str) -> Result<String> {
        let resp = self
            .probe
            .get(url)
            .send()
            .await
            .context("Redirect resolution failed")?;
        Ok(resp.url().to_string())
    }
}

#[async_trait]
impl FetchStrategy for RenderFetcher {
    async fn fetch(&self, url: &str, platform: PlatformTag) -> Result<FetchResult> {
        let Some(client) = self.client.as_ref() else {
            anyhow::bail!("Render service not configured");
        };

        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| anyhow::anyhow!("Render semaphore closed"))?;

        info!(url, scraper = "render", "Fetching URL");

        let final_url = self.resolve_final_url(url).await?;

        let html = client
            .content(&final_url)
            .await
            .context("Browserless content request failed")?;

        if html.trim().is_empty() {
            warn!(url, scraper = "render", "Empty rendered DOM");
            return Ok(FetchResult {
                raw_text: String::new(),
                html_content: None,
                final_url,
                author: None,
                author_handle: None,
                author_avatar: None,
                platform,
            });
        }

        let text = readability_markdown(&final_url, html.as_bytes());
        let author = page_author(&html);
        let author_handle = profile_handle(&final_url, &html);
        let author_avatar = page_avatar(&html);

        info!(
            url,
            scraper = "render",
            bytes = text.len(),
            "Fetched successfully"
        );
        Ok(FetchResult {
            raw_text: text,
            html_content: Some(html),
            final_url,
            author,
            author_handle,
            author_avatar,
            platform,
        })
    }

    fn name(&self) -> &str {
        "render"
    }
}

// --- Reader strategy (server-side fetch + Readability) ---

/// Lightweight article fetch: one guarded GET, no JS execution, Readability
/// extraction over the response body.
pub struct ReaderFetcher {
    client: reqwest::Client,
}

impl ReaderFetcher {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: guarded_client(timeout),
        }
    }
}

#[async_trait]
impl FetchStrategy for ReaderFetcher {
    async fn fetch(&self, url: &str, platform: PlatformTag) -> Result<FetchResult> {
        info!(url, scraper = "reader", "Fetching URL");

        let resp = self
            .client
            .get(url)
            .send()
            .await
            .context("Reader request failed")?;

        let final_url = resp.url().to_string();
        let html = resp.text().await.context("Reader body read failed")?;

        if html.trim().is_empty() {
            warn!(url, scraper = "reader", "Empty response body");
            return Ok(FetchResult {
                raw_text: String::new(),
                html_content: None,
                final_url,
                author: None,
                author_handle: None,
                author_avatar: None,
                platform,
            });
        }

        let text = readability_markdown(&final_url, html.as_bytes());
        let author = page_author(&html);
        let author_avatar = page_avatar(&html);

        info!(
            url,
            scraper = "reader",
            bytes = text.len(),
            "Fetched successfully"
        );
        Ok(FetchResult {
            raw_text: text,
            html_content: Some(html),
            final_url,
            author,
            author_handle: None,
            author_avatar,
            platform,
        })
    }

    fn name(&self) -> &str {
        "reader"
    }
}
