//! Clip assembly boundary.
//!
//! Assembly (AI title/summary/keywords, persistence) lives outside
//! this crate. The pipeline hands over a ClipDraft; the assembler must
//! accept drafts with empty or very short clean text and degrade to a
//! URL-only clip rather than reject the request. That degradation path is
//! why the pipeline returns thin results instead of erroring on them.

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use clipnest_common::{Clip, ClipDraft};

#[async_trait]
pub trait ClipAssembler: Send + Sync {
    async fn assemble(&self, draft: ClipDraft) -> Result<Clip>;
}

/// Stub assembler for tests and the CLI: no AI call, no persistence.
/// Title falls back to the URL when the draft has no text: the URL-only
/// degradation every real assembler must also implement.
pub struct NoopAssembler;

#[async_trait]
impl ClipAssembler for NoopAssembler {
    async fn assemble(&self, draft: ClipDraft) -> Result<Clip> {
        let first_line = draft
            .content
            .clean_text
            .lines()
            .find(|l| !l.trim().is_empty());
        let title: String = first_line
            .unwrap_or(&draft.url)
            .chars()
            .take(80)
            .collect();

        Ok(Clip {
            id: Uuid::new_v4(),
            title,
            summary: String::new(),
            keywords: Vec::new(),
            category: None,
            created_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use clipnest_common::{ImageSet, NormalizedContent, PlatformTag};

    fn draft(clean_text: &str) -> ClipDraft {
        ClipDraft {
            url: "https://example.com/a".to_string(),
            final_url: "https://example.com/a".to_string(),
            platform: PlatformTag::Web,
            content: NormalizedContent::text(clean_text.to_string()),
            raw_text: clean_text.to_string(),
            html_content: None,
            images: ImageSet::new(),
            author: None,
            author_handle: None,
            author_avatar: None,
        }
    }

    #[tokio::test]
    async fn empty_draft_degrades_to_url_only_clip() {
        let clip = NoopAssembler.assemble(draft("")).await.unwrap();
        assert_eq!(clip.title, "https://example.com/a");
    }

    #[tokio::test]
    async fn title_comes_from_first_text_line() {
        let clip = NoopAssembler
            .assemble(draft("First line\n\nsecond paragraph"))
            .await
            .unwrap();
        assert_eq!(clip.title, "First line");
    }
}
