pub mod config;
pub mod error;
pub mod guard;
pub mod types;

pub use config::Config;
pub use error::ClipnestError;
pub use guard::{CandidateUrl, RejectReason};
pub use types::*;
