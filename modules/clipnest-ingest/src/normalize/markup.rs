//! Markdown/markup helpers shared by the normalization pipelines.

use std::sync::LazyLock;

use regex::Regex;

static IMAGE_MD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[[^\]]*\]\([^)]*\)").expect("valid regex"));
static IMAGE_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\[Image \d+:[^\]]*\]\]").expect("valid regex"));
static LINK_MD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]*)\]\(([^)]*)\)").expect("valid regex"));
static PARA_SPLIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n[ \t]*\n").expect("valid regex"));

/// Remove `![alt](url)` image markdown and `[[Image N: …]]` placeholders.
pub(crate) fn strip_image_markdown(text: &str) -> String {
    let text = IMAGE_MD_RE.replace_all(text, "");
    IMAGE_TAG_RE.replace_all(&text, "").into_owned()
}

/// Rewrite `[label](url)` to its label. Links whose label is empty or in
/// `noise_labels` (case-insensitive) are deleted outright, not unlinked;
/// a bare "더보기" is still noise.
pub(crate) fn rewrite_links(text: &str, noise_labels: &[&str]) -> String {
    LINK_MD_RE
        .replace_all(text, |caps: &regex::Captures| {
            let label = caps[1].trim();
            let lower = label.to_lowercase();
            if label.is_empty() || noise_labels.contains(&lower.as_str()) {
                String::new()
            } else {
                label.to_string()
            }
        })
        .into_owned()
}

/// Split on blank lines, dropping empty fragments.
pub(crate) fn split_paragraphs(text: &str) -> Vec<String> {
    PARA_SPLIT_RE
        .split(text)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(String::from)
        .collect()
}

/// Length in characters, not bytes; the thresholds throughout the
/// pipelines must treat Korean text fairly.
pub(crate) fn char_len(s: &str) -> usize {
    s.chars().count()
}
