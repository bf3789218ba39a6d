//! Generic web article cleanup.
//!
//! Readability extraction leaves markdown residue, navigation runs, footer
//! boilerplate, and the occasional embedded JSON prompt blob. This pipeline
//! runs a fixed stage order over the text; every stage is pure and the whole
//! pipeline is idempotent on its own output.
//!
//! The numeric cutoffs are heuristic, tuned against captured pages. Treat
//! them as tunable constants, not derived values.

use std::sync::LazyLock;

use regex::Regex;

use clipnest_common::NormalizedContent;

use super::markup::{char_len, rewrite_links, split_paragraphs, strip_image_markdown};

/// Paragraphs shorter than this never survive the final filter.
const MIN_PARAGRAPH_LEN: usize = 10;
/// A line must be shorter than this to read as navigation.
const NAV_LINE_MAX_LEN: usize = 30;
/// Consecutive nav-like lines before output is suppressed.
const NAV_RUN_THRESHOLD: usize = 3;
/// A line longer than this ends a nav suppression run.
const NAV_RESUME_LEN: usize = 50;
/// Leading paragraphs shorter than this are skipped before content starts.
const LEAD_SKIP_LEN: usize = 50;
/// A paragraph longer than this switches the extractor into content mode.
const CONTENT_ENTER_LEN: usize = 80;
/// In content mode, paragraphs must clear this to be kept.
const CONTENT_KEEP_LEN: usize = 30;
/// JSON/prompt-shaped paragraph heuristics.
const PROMPT_BLOCK_LEN: usize = 200;
const PROMPT_BLOCK_QUOTES: usize = 10;
/// Date-stamp-only paragraphs below this length are dropped.
const DATE_ONLY_MAX_LEN: usize = 20;

/// Link labels that mark the whole link as noise: delete, don't unlink.
const NOISE_LINK_LABELS: &[&str] = &[
    "링크",
    "link",
    "로그인",
    "log in",
    "read more",
    "learn more",
    "click here",
    "더보기",
    "자세히",
];

/// Menu/category vocabulary, Korean and English. A short line containing
/// one of these reads as site navigation, not content.
const NAV_KEYWORDS: &[&str] = &[
    // Korean
    "메뉴",
    "카테고리",
    "홈",
    "로그인",
    "회원가입",
    "검색",
    "공지",
    "목록",
    "이전",
    "다음",
    "전체보기",
    "구독",
    "댓글",
    "공유",
    "태그",
    // English
    "menu",
    "category",
    "home",
    "login",
    "sign in",
    "sign up",
    "search",
    "subscribe",
    "share",
    "related",
    "previous",
    "next",
    "about us",
    "privacy",
    "terms",
    "cookie",
];

/// Footer fingerprints. A matching line ends its block; a matching
/// paragraph ends the document.
static FOOTER_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)copyright|\(c\)\s*\d{4}|©",
        r"(?i)all rights reserved",
        r"무단\s*전재|저작권",
        r"(?i)^contact(\s+us)?\b",
        r"^문의",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid regex"))
    .collect()
});

static EMPTY_PAIR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\s*\]|\(\s*\)").expect("valid regex"));
static BARE_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*https?://\S+\s*$").expect("valid regex"));
static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").expect("valid regex")
});
static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{2,4}[-.\s]\d{3,4}[-.\s]\d{4}\b").expect("valid regex"));
static DATE_ONLY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}[-./]\d{1,2}[-./]\d{1,2}\.?$").expect("valid regex"));

pub fn normalize(raw: &str) -> NormalizedContent {
    NormalizedContent::text(clean(raw))
}

/// Fixed stage order. Each stage is pure; reordering changes behavior.
fn clean(raw: &str) -> String {
    let text = strip_image_markdown(raw);
    let text = rewrite_links(&text, NOISE_LINK_LABELS);
    let text = strip_garbage(&text);
    let text = drop_prompt_blocks(&text);
    let text = filter_nav_footer(&text);
    let text = extract_main_zone(&text);
    final_filter(&text)
}

/// Empty bracket/paren pairs, stray `[링크]`, standalone URLs, emails,
/// phone-shaped digit runs.
fn strip_garbage(text: &str) -> String {
    let text = text.replace("[링크]", "");
    let text = EMPTY_PAIR_RE.replace_all(&text, "");
    let text = BARE_URL_RE.replace_all(&text, "");
    let text = EMAIL_RE.replace_all(&text, "");
    PHONE_RE.replace_all(&text, "").into_owned()
}

/// Embedded AI-prompt/JSON blobs. Image-generator prompts pasted into
/// posts show up as paragraph-sized JSON.
fn is_prompt_block(para: &str) -> bool {
    if para.contains("\"style_mode\"") || para.contains("\"negative_prompt\"") {
        return true;
    }
    char_len(para) > PROMPT_BLOCK_LEN
        && para.contains('{')
        && para.contains("\":")
        && para.matches('"').count() > PROMPT_BLOCK_QUOTES
}

fn drop_prompt_blocks(text: &str) -> String {
    split_paragraphs(text)
        .into_iter()
        .filter(|p| !is_prompt_block(p))
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn is_nav_line(line: &str) -> bool {
    if line.is_empty() || char_len(line) >= NAV_LINE_MAX_LEN {
        return false;
    }
    let lower = line.to_lowercase();
    if NAV_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
        return true;
    }
    // Short bullet-style items: "- Home", "* 공지사항", "> 목록"
    char_len(line) < 20
        && matches!(
            line.chars().next(),
            Some('-') | Some('*') | Some('•') | Some('>')
        )
}

fn is_footer_line(line: &str) -> bool {
    !line.is_empty() && FOOTER_RES.iter().any(|re| re.is_match(line))
}

/// Two-state {collecting, suppressing} machine over lines. Three or more
/// consecutive nav-like lines retro-drop the run and suppress output until
/// a line longer than NAV_RESUME_LEN; a footer-like line ends the block.
fn filter_nav_footer(text: &str) -> String {
    let mut out: Vec<&str> = Vec::new();
    let mut nav_run = 0usize;
    let mut suppressing = false;

    for line in text.lines() {
        let trimmed = line.trim();

        if is_footer_line(trimmed) {
            break;
        }

        if suppressing {
            if char_len(trimmed) > NAV_RESUME_LEN {
                suppressing = false;
                nav_run = 0;
                out.push(line);
            }
            continue;
        }

        if is_nav_line(trimmed) {
            nav_run += 1;
            if nav_run >= NAV_RUN_THRESHOLD {
                // Drop the nav lines already emitted and stop collecting.
                out.truncate(out.len().saturating_sub(nav_run - 1));
                suppressing = true;
                nav_run = 0;
                continue;
            }
        } else if !trimmed.is_empty() {
            nav_run = 0;
        }

        out.push(line);
    }

    out.join("\n")
}

fn is_footer_paragraph(para: &str) -> bool {
    para.lines().any(|line| is_footer_line(line.trim()))
}

/// Main-content zone extraction: {seeking, content} machine over
/// paragraphs. Short lead-ins are skipped until a paragraph clears
/// CONTENT_ENTER_LEN; content mode then latches. Stops at the first
/// footer-like paragraph.
fn extract_main_zone(text: &str) -> String {
    let mut in_content = false;
    let mut kept = Vec::new();

    for para in split_paragraphs(text) {
        if is_footer_paragraph(&para) {
            break;
        }
        let len = char_len(&para);
        if !in_content {
            if len > CONTENT_ENTER_LEN {
                in_content = true;
                kept.push(para);
            } else if len >= LEAD_SKIP_LEN {
                kept.push(para);
            }
            continue;
        }
        if len > CONTENT_KEEP_LEN {
            kept.push(para);
        }
    }

    kept.join("\n\n")
}

fn is_residue(para: &str) -> bool {
    let len = char_len(para);
    if len < MIN_PARAGRAPH_LEN {
        return true;
    }
    if !para.chars().any(|c| c.is_alphanumeric()) {
        return true;
    }
    if para
        .chars()
        .all(|c| c.is_ascii_digit() || c.is_whitespace() || c == ',' || c == '.')
    {
        return true;
    }
    len < DATE_ONLY_MAX_LEN && DATE_ONLY_RE.is_match(para)
}

/// Drop residue paragraphs and rejoin the survivors with blank lines.
fn final_filter(text: &str) -> String {
    split_paragraphs(text)
        .into_iter()
        .filter(|p| !is_residue(p))
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    const REAL_PARAGRAPH: &str =
        "A real paragraph that is definitely longer than fifty characters for content detection.";

    #[test]
    fn keeps_content_and_drops_image_and_noise_link() {
        let input = format!("![a](http://i/a.png)\n\n[링크](http://x)\n\n{REAL_PARAGRAPH}");
        let out = normalize(&input).clean_text;
        assert!(out.contains(REAL_PARAGRAPH));
        assert!(!out.contains("![a]"));
        assert!(!out.contains("링크"));
        assert!(!out.contains("http://i/a.png"));
    }

    #[test]
    fn is_idempotent_on_representative_text() {
        let input = format!(
            "- Home\n- 카테고리\n- Login\n\n{REAL_PARAGRAPH}\n\nShorter trailing paragraph that still clears thirty characters.\n\n2024-01-01\n\n© 2024 Example Corp. All rights reserved."
        );
        let once = clean(&input);
        let twice = clean(&once);
        assert_eq!(once, twice);
        assert!(once.contains(REAL_PARAGRAPH));
    }

    #[test]
    fn drops_prompt_shaped_blocks() {
        let blob = format!(
            "{{\"prompt\": \"value\", \"style_mode\": \"anime\"}}\n\n{REAL_PARAGRAPH}"
        );
        let out = clean(&blob);
        assert!(!out.contains("style_mode"));
        assert!(out.contains(REAL_PARAGRAPH));

        let long_json = format!(
            "{{{}}}",
            (0..15)
                .map(|i| format!("\"key{i}\": \"some value padding the block\""))
                .collect::<Vec<_>>()
                .join(", ")
        );
        assert!(is_prompt_block(&long_json));
    }

    #[test]
    fn nav_runs_are_suppressed_until_long_line() {
        let input = "- Home\n- Category\n- Login\n- Search\nshort\nThis is a long line of real content that easily clears the fifty character resume threshold.";
        let out = filter_nav_footer(input);
        assert!(!out.contains("- Home"));
        assert!(!out.contains("short"));
        assert!(out.contains("real content"));
    }

    #[test]
    fn two_nav_lines_do_not_suppress() {
        let input = "- Home\n- Category\nplain text line without nav words";
        let out = filter_nav_footer(input);
        assert!(out.contains("- Home"));
        assert!(out.contains("plain text"));
    }

    #[test]
    fn footer_line_ends_the_block() {
        let input = format!("{REAL_PARAGRAPH}\n© 2024 Example. All rights reserved.\nafter footer");
        let out = filter_nav_footer(&input);
        assert!(out.contains("content detection"));
        assert!(!out.contains("after footer"));
    }

    #[test]
    fn main_zone_skips_short_leads_and_latches() {
        let input = format!(
            "tiny\n\nA lead line under the fifty character mark.\n\n{REAL_PARAGRAPH}\n\nA kept middle paragraph over thirty characters.\n\ntiny tail"
        );
        let out = extract_main_zone(&input);
        assert!(!out.contains("tiny"));
        assert!(out.contains(REAL_PARAGRAPH));
        assert!(out.contains("kept middle"));
    }

    #[test]
    fn final_filter_drops_dates_digits_and_punctuation() {
        let input = format!("{REAL_PARAGRAPH}\n\n2024-03-15\n\n12345\n\n!!! ---\n\nshort");
        let out = final_filter(&input);
        assert_eq!(out, REAL_PARAGRAPH);
    }

    #[test]
    fn strips_bare_urls_emails_and_phones() {
        let input = format!(
            "{REAL_PARAGRAPH} Reach us at help@example.com or 010-1234-5678.\n\nhttps://example.com/bare"
        );
        let out = clean(&input);
        assert!(!out.contains("help@example.com"));
        assert!(!out.contains("010-1234-5678"));
        assert!(!out.contains("https://example.com/bare"));
        assert!(out.contains("content detection"));
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert_eq!(clean(""), "");
        assert_eq!(clean("   \n\n  "), "");
    }
}
