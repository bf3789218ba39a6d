pub mod assembler;
pub mod fetch;
pub mod images;
pub mod normalize;
pub mod pipeline;
pub mod platform;
pub mod scraper;

pub use fetch::{ContentFetchOrchestrator, FetchOutcome};
pub use pipeline::{CapturedContent, ContentPipeline, IngestRequest};
