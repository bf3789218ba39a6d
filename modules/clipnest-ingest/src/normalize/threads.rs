//! Threads post cleanup.
//!
//! The capture layer emits the post body, then a comments section marker,
//! then individual comments separated by a divider. The split survives
//! normalization; the presentation layer renders comments as their own
//! list, so flattening here would lose structure it needs.

use std::collections::HashSet;

use clipnest_common::{NormalizedContent, ThreadsContent};

use super::markup::{rewrite_links, split_paragraphs, strip_image_markdown};

/// Marker the capture layer inserts before the comment section.
pub const COMMENTS_MARKER: &str = "=====댓글=====";
/// Divider between individual comments.
pub const COMMENT_DIVIDER: &str = "-----";

pub fn normalize(raw: &str) -> NormalizedContent {
    let text = strip_image_markdown(raw);
    let text = rewrite_links(&text, &[]);
    let text = dedupe_paragraphs(&text);
    let (main_content, comments) = split_comments(&text);
    NormalizedContent::with_threads(ThreadsContent {
        main_content,
        comments,
    })
}

/// Threads DOM extraction repeats the post body (feed card + og
/// description). First occurrence wins; structural markers are exempt so
/// the comment split still sees them.
fn dedupe_paragraphs(text: &str) -> String {
    let mut seen = HashSet::new();
    split_paragraphs(text)
        .into_iter()
        .filter(|p| p == COMMENTS_MARKER || p == COMMENT_DIVIDER || seen.insert(p.clone()))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Stateless split: everything before the marker is the post, the rest
/// splits on the divider into comments.
fn split_comments(text: &str) -> (String, Vec<String>) {
    match text.split_once(COMMENTS_MARKER) {
        None => (text.trim().to_string(), Vec::new()),
        Some((main, rest)) => {
            let comments = rest
                .split(COMMENT_DIVIDER)
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(String::from)
                .collect();
            (main.trim().to_string(), comments)
        }
    }
}
