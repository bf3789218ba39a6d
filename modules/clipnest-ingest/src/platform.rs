//! URL → platform classification.

use clipnest_common::PlatformTag;
use url::Url;

/// Classify a URL by hostname. An explicit `hint` from the client-side
/// capture flow wins over pattern matching.
///
/// Called twice per request: before the fetch to pick a strategy, and again
/// on the post-redirect URL; the second result is authoritative for
/// choosing a normalizer.
pub fn detect(url: &str, hint: Option<PlatformTag>) -> PlatformTag {
    if let Some(tag) = hint {
        return tag;
    }

    let Ok(parsed) = Url::parse(url) else {
        return PlatformTag::Web;
    };
    let host = parsed.host_str().unwrap_or("").to_ascii_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host);

    if matches_domain(host, "threads.net") || matches_domain(host, "threads.com") {
        PlatformTag::Threads
    } else if host == "blog.naver.com" || host == "m.blog.naver.com" || host == "naver.me" {
        PlatformTag::Naver
    } else if matches_domain(host, "instagram.com") {
        PlatformTag::Instagram
    } else if matches_domain(host, "youtube.com") || host == "youtu.be" {
        PlatformTag::Youtube
    } else if matches_domain(host, "twitter.com") || host == "x.com" {
        PlatformTag::Twitter
    } else {
        PlatformTag::Web
    }
}

/// Exact domain or any subdomain of it.
fn matches_domain(host: &str, domain: &str) -> bool {
    host == domain || host.ends_with(&format!(".{domain}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_known_platforms() {
        assert_eq!(
            detect("https://www.threads.net/@user/post/123", None),
            PlatformTag::Threads
        );
        assert_eq!(
            detect("https://blog.naver.com/someone/223000000000", None),
            PlatformTag::Naver
        );
        assert_eq!(
            detect("https://m.blog.naver.com/someone/223000000000", None),
            PlatformTag::Naver
        );
        assert_eq!(
            detect("https://www.instagram.com/p/abc/", None),
            PlatformTag::Instagram
        );
        assert_eq!(
            detect("https://youtu.be/dQw4w9WgXcQ", None),
            PlatformTag::Youtube
        );
        assert_eq!(detect("https://x.com/user/status/1", None), PlatformTag::Twitter);
        assert_eq!(detect("https://news.example.com/article", None), PlatformTag::Web);
    }

    #[test]
    fn hint_overrides_pattern_match() {
        assert_eq!(
            detect("https://news.example.com/article", Some(PlatformTag::Naver)),
            PlatformTag::Naver
        );
    }

    #[test]
    fn shorteners_classify_as_web_before_redirect() {
        assert_eq!(detect("https://bit.ly/x", None), PlatformTag::Web);
    }

    #[test]
    fn unparseable_urls_default_to_web() {
        assert_eq!(detect("not a url", None), PlatformTag::Web);
    }
}
