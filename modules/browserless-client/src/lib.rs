//! Minimal client for the Browserless `/content` endpoint.
//!
//! Browserless hosts headless Chromium behind an HTTP API: `/content`
//! navigates to a URL, executes page JS, and returns the rendered DOM.
//! The render fetch strategy uses it for script-heavy platforms whose
//! initial HTML carries no content (Threads, Instagram, X).

pub mod error;

pub use error::{BrowserlessError, Result};

use std::time::Duration;

use tracing::debug;

pub struct BrowserlessClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl BrowserlessClient {
    pub fn new(base_url: &str, token: Option<&str>) -> Self {
        Self::with_timeout(base_url, token, Duration::from_secs(30))
    }

    /// Build a client with an explicit render budget. Social feeds hydrate
    /// late; the caller owns the timeout, not this crate.
    pub fn with_timeout(base_url: &str, token: Option<&str>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.map(String::from),
        }
    }

    /// Fetch fully-rendered HTML for a URL via the `/content` endpoint.
    /// Waits for network idle so late-hydrating feeds are in the DOM.
    pub async fn content(&self, url: &str) -> Result<String> {
        let mut endpoint = format!("{}/content", self.base_url);
        if let Some(ref token) = self.token {
            endpoint.push_str(&format!("?token={token}"));
        }

        let body = serde_json::json!({
            "url": url,
            "gotoOptions": { "waitUntil": "networkidle2" },
        });

        debug!(url, "Requesting rendered content");

        let resp = self
            .client
            .post(&endpoint)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(BrowserlessError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(resp.text().await?)
    }
}
