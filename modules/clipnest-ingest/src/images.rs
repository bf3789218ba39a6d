//! Candidate image collection and merging.
//!
//! Image extraction proper lives outside the core; collectors are the
//! seam. The pipeline merges whatever sources it has into one ImageSet:
//! unique by string identity, first-seen order preserved.

use std::collections::HashSet;
use std::sync::LazyLock;

use anyhow::Result;
use async_trait::async_trait;
use regex::Regex;

use clipnest_common::ImageSet;

/// Cap on candidates from a single page.
const MAX_IMAGES: usize = 20;

#[async_trait]
pub trait ImageCollector: Send + Sync {
    /// Candidate image URLs for a page, best-effort. Order matters: the
    /// merge keeps first-seen order.
    async fn collect(&self, url: &str, html: Option<&str>) -> Result<Vec<String>>;
}

/// No-op collector for when image capture is handled elsewhere.
pub struct NoopImageCollector;

#[async_trait]
impl ImageCollector for NoopImageCollector {
    async fn collect(&self, _url: &str, _html: Option<&str>) -> Result<Vec<String>> {
        Ok(Vec::new())
    }
}

static OG_IMAGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"property=["']og:image["'][^>]*content=["']([^"']+)["']"#).expect("valid regex")
});
static IMG_SRC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<img[^>]+src\s*=\s*["']([^"']+)["']"#).expect("valid regex"));
static MD_IMAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[[^\]]*\]\(([^)\s]+)\)").expect("valid regex"));

/// Pulls `og:image` and `<img src>` candidates straight out of page HTML.
pub struct HtmlImageCollector;

#[async_trait]
impl ImageCollector for HtmlImageCollector {
    async fn collect(&self, url: &str, html: Option<&str>) -> Result<Vec<String>> {
        let Some(html) = html else {
            return Ok(Vec::new());
        };
        Ok(extract_image_urls(html, url))
    }
}

/// Extract image URLs from HTML, og:image first so the lead image stays the
/// lead. Relative srcs resolve against `base_url`; dedups and caps at
/// MAX_IMAGES.
pub fn extract_image_urls(html: &str, base_url: &str) -> Vec<String> {
    let base = url::Url::parse(base_url).ok();
    let mut seen = HashSet::new();
    let mut out = Vec::new();

    let captures = OG_IMAGE_RE
        .captures_iter(html)
        .chain(IMG_SRC_RE.captures_iter(html));

    for cap in captures {
        let raw = &cap[1];
        if raw.starts_with("data:") {
            continue;
        }

        let resolved = if raw.starts_with("http://") || raw.starts_with("https://") {
            raw.to_string()
        } else if let Some(ref b) = base {
            match b.join(raw) {
                Ok(u) => u.to_string(),
                Err(_) => continue,
            }
        } else {
            continue;
        };

        if seen.insert(resolved.clone()) {
            out.push(resolved);
            if out.len() >= MAX_IMAGES {
                break;
            }
        }
    }

    out
}

/// Image URLs referenced in extracted Markdown. The normalizers strip the
/// syntax from prose; the URLs themselves are still clip candidates.
pub fn markdown_image_urls(markdown: &str) -> Vec<String> {
    MD_IMAGE_RE
        .captures_iter(markdown)
        .map(|cap| cap[1].to_string())
        .filter(|u| u.starts_with("http://") || u.starts_with("https://"))
        .collect()
}

/// Merge candidate sources into one set, first-seen order preserved.
pub fn merge_images<I>(sources: I) -> ImageSet
where
    I: IntoIterator<Item = Vec<String>>,
{
    let mut set = ImageSet::new();
    for source in sources {
        for url in source {
            set.insert(url);
        }
    }
    set
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_dedups_across_sources_keeping_first_seen_order() {
        let a = vec![
            "https://i/1.png".to_string(),
            "https://i/2.png".to_string(),
        ];
        let b = vec![
            "https://i/2.png".to_string(),
            "https://i/3.png".to_string(),
            "https://i/1.png".to_string(),
        ];
        let merged = merge_images([a, b]);
        assert_eq!(
            merged.as_slice(),
            &[
                "https://i/1.png".to_string(),
                "https://i/2.png".to_string(),
                "https://i/3.png".to_string(),
            ]
        );
    }

    #[test]
    fn extract_prefers_og_image_and_resolves_relative_srcs() {
        let html = r#"
            <meta property="og:image" content="https://cdn.example/lead.jpg">
            <img src="/static/body.png">
            <img src="data:image/gif;base64,AAAA">
            <img src="https://cdn.example/lead.jpg">
        "#;
        let urls = extract_image_urls(html, "https://example.com/post/1");
        assert_eq!(
            urls,
            vec![
                "https://cdn.example/lead.jpg".to_string(),
                "https://example.com/static/body.png".to_string(),
            ]
        );
    }

    #[test]
    fn markdown_images_are_harvested_before_stripping() {
        let md = "intro\n\n![alt](https://i/a.png)\n\n![](/relative.png)\n\ntext";
        assert_eq!(markdown_image_urls(md), vec!["https://i/a.png".to_string()]);
    }

    #[tokio::test]
    async fn noop_collector_returns_nothing() {
        let urls = NoopImageCollector
            .collect("https://example.com", Some("<img src='https://i/x.png'>"))
            .await
            .unwrap();
        assert!(urls.is_empty());
    }
}
