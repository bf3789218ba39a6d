//! Naver blog cleanup.
//!
//! Naver blog pages carry heavy chrome even after Readability extraction:
//! follow/like/comment counters, menu labels, attachment widgets, glyph
//! bullets. The pipeline removes the chrome catalogue, cleans line by line
//! behind a {seeking, found} gate, then re-segments into paragraphs.
//!
//! Thresholds are heuristic; keep them as named constants.

use std::sync::LazyLock;

use regex::Regex;

use clipnest_common::NormalizedContent;

use super::markup::{char_len, rewrite_links, strip_image_markdown};

/// Once a line clears this, the extractor latches into found-content state.
const CONTENT_GATE_LEN: usize = 15;
/// Lines shorter than this are dropped outright.
const MIN_LINE_LEN: usize = 3;
/// A line starting with a letter and longer than this flushes the current
/// paragraph buffer (new-section heuristic).
const SECTION_FLUSH_LEN: usize = 30;
/// Paragraphs shorter than this are dropped after re-segmentation.
const MIN_PARAGRAPH_LEN: usize = 15;

/// Blog chrome that survives extraction. Removed wherever it appears.
const CHROME_LITERALS: &[&str] = &[
    "이웃추가",
    "서로이웃",
    "공감한 사람 보러가기",
    "댓글쓰기",
    "공유하기",
    "인쇄",
    "블로그 홈",
    "이 블로그",
    "카테고리 이동",
    "전체보기",
    "네이버 블로그",
    "NAVER blog",
    "맨 위로",
    "TOP",
    "첨부파일",
    "본문 기타 기능",
    "URL 복사",
];

/// Counter/URL variants the literals can't cover.
static CHROME_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"공감\s*\d+",
        r"댓글\s*\d+",
        r"이웃\s*[\d,]+\s*명?",
        r"조회수?\s*[\d,]+",
        r"https?://\S+",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid regex"))
    .collect()
});

/// Arrow/bullet glyphs trimmed from line edges.
const EDGE_GLYPHS: &[char] = &[
    '▶', '▷', '►', '▲', '▼', '◀', '◁', '■', '□', '●', '○', '·', '•', '→', '←', '❯', '❮', '>',
    '|',
];

/// Words that alone on a line are navigation, not content.
const NAV_WORDS: &[&str] = &[
    "이전", "다음", "목록", "메뉴", "홈", "prev", "next", "list", "home", "menu",
];

static SPACE_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t]{3,}").expect("valid regex"));

pub fn normalize(raw: &str) -> NormalizedContent {
    let text = strip_image_markdown(raw);
    let text = rewrite_links(&text, &[]);
    let text = strip_chrome(&text);
    let lines = clean_lines(&text);
    let paragraphs = resegment(lines);
    NormalizedContent::text(paragraphs.join("\n\n"))
}

/// Ordered rule table: literals first, then the regex variants.
fn strip_chrome(text: &str) -> String {
    let mut text = text.to_string();
    for literal in CHROME_LITERALS {
        text = text.replace(literal, "");
    }
    for re in CHROME_RES.iter() {
        text = re.replace_all(&text, "").into_owned();
    }
    text
}

fn is_nav_word_line(line: &str) -> bool {
    let lower = line.to_lowercase();
    NAV_WORDS.contains(&lower.as_str())
}

/// Per-line cleanup behind a {seeking, found} gate: glyph edges trimmed,
/// space runs collapsed, junk lines dropped. Nothing is emitted until a
/// line clears CONTENT_GATE_LEN; that line flips the state for good.
fn clean_lines(text: &str) -> Vec<String> {
    let mut found_content = false;
    let mut out = Vec::new();

    for line in text.lines() {
        let line = line.trim_matches(|c: char| c.is_whitespace() || EDGE_GLYPHS.contains(&c));
        let line = SPACE_RUN_RE.replace_all(line, "  ");
        let line = line.trim();

        if line.is_empty() {
            // Leading blank lines go; interior blanks are paragraph breaks.
            if found_content {
                out.push(String::new());
            }
            continue;
        }

        let len = char_len(line);
        if len < MIN_LINE_LEN {
            continue;
        }
        if line.chars().all(|c| c.is_ascii_digit() || c == ',') {
            continue;
        }
        if is_nav_word_line(line) {
            continue;
        }

        if !found_content {
            if len > CONTENT_GATE_LEN {
                found_content = true;
                out.push(line.to_string());
            }
            continue;
        }

        out.push(line.to_string());
    }

    out
}

/// Re-segment cleaned lines into paragraphs. A line that starts with a
/// letter and runs past SECTION_FLUSH_LEN reads as a new section, so the
/// buffer flushes before it. Residual short paragraphs are dropped.
fn resegment(lines: Vec<String>) -> Vec<String> {
    let mut paragraphs = Vec::new();
    let mut buf: Vec<String> = Vec::new();

    for line in lines {
        if line.is_empty() {
            flush(&mut buf, &mut paragraphs);
            continue;
        }
        let starts_alpha = line.chars().next().is_some_and(|c| c.is_alphabetic());
        if starts_alpha && char_len(&line) > SECTION_FLUSH_LEN && !buf.is_empty() {
            flush(&mut buf, &mut paragraphs);
        }
        buf.push(line);
    }
    flush(&mut buf, &mut paragraphs);

    paragraphs.retain(|p| char_len(p) >= MIN_PARAGRAPH_LEN);
    paragraphs
}

fn flush(buf: &mut Vec<String>, out: &mut Vec<String>) {
    if !buf.is_empty() {
        out.push(buf.join("\n"));
        buf.clear();
    }
}
