use std::env;

/// Pipeline configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Browserless endpoint, e.g. `http://localhost:3000`. When unset the
    /// render strategy reports itself unavailable and every fetch runs
    /// through the reader strategy.
    pub browserless_url: Option<String>,
    pub browserless_token: Option<String>,

    /// Per-attempt fetch budget in seconds. Primary and fallback each get
    /// one full budget; there is no third attempt.
    pub fetch_timeout_secs: u64,

    /// Max concurrent headless render sessions. Each session pins a
    /// Chromium tab on the render service.
    pub max_concurrent_renders: usize,
}

impl Config {
    /// Load configuration from environment variables. All pipeline settings
    /// have working defaults; only numeric parse failures panic.
    pub fn from_env() -> Self {
        Self {
            browserless_url: env::var("BROWSERLESS_URL").ok().filter(|v| !v.is_empty()),
            browserless_token: env::var("BROWSERLESS_TOKEN").ok().filter(|v| !v.is_empty()),
            fetch_timeout_secs: env::var("FETCH_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .expect("FETCH_TIMEOUT_SECS must be a number"),
            max_concurrent_renders: env::var("MAX_CONCURRENT_RENDERS")
                .unwrap_or_else(|_| "2".to_string())
                .parse()
                .expect("MAX_CONCURRENT_RENDERS must be a number"),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            browserless_url: None,
            browserless_token: None,
            fetch_timeout_secs: 30,
            max_concurrent_renders: 2,
        }
    }
}
