//! Platform-keyed normalization registry.
//!
//! Every normalizer is total: malformed or empty input degrades to an empty
//! string, never an error. Instagram and YouTube pass through untouched;
//! their renderers already cope with raw captions. Twitter posts fetch via
//! the render strategy but carry no marker structure, so they take the
//! generic web pipeline.

mod markup;
pub mod naver;
pub mod threads;
pub mod web;

use clipnest_common::{NormalizedContent, PlatformTag};

pub fn normalize(tag: PlatformTag, raw_text: &str) -> NormalizedContent {
    match tag {
        PlatformTag::Threads => threads::normalize(raw_text),
        PlatformTag::Naver => naver::normalize(raw_text),
        PlatformTag::Instagram | PlatformTag::Youtube => NormalizedContent::passthrough(raw_text),
        PlatformTag::Web | PlatformTag::Twitter => web::normalize(raw_text),
    }
}
