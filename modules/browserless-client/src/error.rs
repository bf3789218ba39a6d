use thiserror::Error;

pub type Result<T> = std::result::Result<T, BrowserlessError>;

#[derive(Debug, Error)]
pub enum BrowserlessError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("render failed (status {status}): {message}")]
    Api { status: u16, message: String },
}
