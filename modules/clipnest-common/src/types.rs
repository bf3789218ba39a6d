use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// --- Platform classification ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlatformTag {
    Web,
    Threads,
    Naver,
    Instagram,
    Youtube,
    Twitter,
}

impl PlatformTag {
    /// Parse a client-supplied platform hint. Unknown values are ignored
    /// rather than rejected; detection covers them.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "web" => Some(PlatformTag::Web),
            "threads" => Some(PlatformTag::Threads),
            "naver" => Some(PlatformTag::Naver),
            "instagram" => Some(PlatformTag::Instagram),
            "youtube" => Some(PlatformTag::Youtube),
            "twitter" | "x" => Some(PlatformTag::Twitter),
            _ => None,
        }
    }
}

impl std::fmt::Display for PlatformTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlatformTag::Web => write!(f, "web"),
            PlatformTag::Threads => write!(f, "threads"),
            PlatformTag::Naver => write!(f, "naver"),
            PlatformTag::Instagram => write!(f, "instagram"),
            PlatformTag::Youtube => write!(f, "youtube"),
            PlatformTag::Twitter => write!(f, "twitter"),
        }
    }
}

// --- Fetch output ---

/// What one fetch strategy attempt produced. Consumed by exactly one
/// normalizer, then discarded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchResult {
    /// Extracted main-content text (Markdown from Readability extraction,
    /// or DOM text for rendered social pages).
    pub raw_text: String,
    /// Full page HTML when the strategy had it. Image collection reads it.
    pub html_content: Option<String>,
    /// URL after following redirects. The platform tag re-derived from this
    /// supersedes the pre-fetch guess.
    pub final_url: String,
    pub author: Option<String>,
    pub author_handle: Option<String>,
    pub author_avatar: Option<String>,
    /// Tag the fetch ran under (pre-redirect classification).
    pub platform: PlatformTag,
}

// --- Normalized content ---

/// Threads posts keep their structural split: the presentation layer
/// renders comments as a separate list, so flattening here would lose it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreadsContent {
    pub main_content: String,
    pub comments: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedContent {
    /// Cleaned prose, paragraphs joined by blank lines. Free of image
    /// markdown and JSON/prompt-shaped blocks. May be empty: thin content
    /// is a valid low-information result, not an error.
    pub clean_text: String,
    pub threads: Option<ThreadsContent>,
}

impl NormalizedContent {
    pub fn text(clean_text: String) -> Self {
        Self {
            clean_text,
            threads: None,
        }
    }

    pub fn passthrough(raw: &str) -> Self {
        Self::text(raw.to_string())
    }

    pub fn with_threads(threads: ThreadsContent) -> Self {
        let mut clean_text = threads.main_content.clone();
        for comment in &threads.comments {
            clean_text.push_str("\n\n");
            clean_text.push_str(comment);
        }
        Self {
            clean_text,
            threads: Some(threads),
        }
    }
}

// --- Image set ---

/// Ordered image URL set: unique by string identity, first-seen order
/// preserved.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageSet {
    urls: Vec<String>,
}

impl ImageSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a URL, keeping first-seen order. Returns false on duplicates.
    pub fn insert(&mut self, url: String) -> bool {
        if self.urls.iter().any(|u| *u == url) {
            return false;
        }
        self.urls.push(url);
        true
    }

    pub fn as_slice(&self) -> &[String] {
        &self.urls
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}

impl From<Vec<String>> for ImageSet {
    fn from(urls: Vec<String>) -> Self {
        let mut set = Self::new();
        for url in urls {
            set.insert(url);
        }
        set
    }
}

// --- Clip interface types ---

/// Everything the pipeline hands to the clip assembler for one request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClipDraft {
    pub url: String,
    pub final_url: String,
    pub platform: PlatformTag,
    pub content: NormalizedContent,
    pub raw_text: String,
    pub html_content: Option<String>,
    pub images: ImageSet,
    pub author: Option<String>,
    pub author_handle: Option<String>,
    pub author_avatar: Option<String>,
}

/// The persisted unit of saved content, produced downstream by the
/// assembler. The assembler must accept drafts with empty clean text and
/// degrade to a URL-only clip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Clip {
    pub id: Uuid,
    pub title: String,
    pub summary: String,
    pub keywords: Vec<String>,
    pub category: Option<String>,
    pub created_at: DateTime<Utc>,
}
