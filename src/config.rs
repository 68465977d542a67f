use std::{env, path::PathBuf, time::Duration};

use tracing::warn;

pub const DEFAULT_BASE_URL: &str = "https://www.steamgifts.com";
pub const DEFAULT_REQUESTS_FILE: &str = "./requests.txt";
/// Number of search pages requested concurrently before joining.
pub const DEFAULT_BATCH_WIDTH: usize = 10;

const BASE_URL_VAR: &str = "AUTOENTRY_BASE_URL";
const REQUESTS_FILE_VAR: &str = "AUTOENTRY_REQUESTS_FILE";
const BATCH_WIDTH_VAR: &str = "AUTOENTRY_BATCH_WIDTH";

/// Where the site lives and how hard we hit it.
/// Injected into the HTTP client and the pipeline instead of global URLs.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    /// Scheme and host without a trailing slash.
    pub base_url: String,
    pub requests_path: PathBuf,
    pub batch_width: usize,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            requests_path: DEFAULT_REQUESTS_FILE.into(),
            batch_width: DEFAULT_BATCH_WIDTH,
            timeout: Duration::from_secs(30),
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).into(),
        }
    }
}

impl SiteConfig {
    /// Defaults, overridden by `AUTOENTRY_*` environment variables when set.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(base_url) = env::var(BASE_URL_VAR) {
            config = config.with_base_url(base_url);
        }
        if let Ok(path) = env::var(REQUESTS_FILE_VAR) {
            config.requests_path = path.into();
        }
        if let Ok(width) = env::var(BATCH_WIDTH_VAR) {
            match width.parse::<usize>() {
                Ok(width) if width > 0 => config.batch_width = width,
                _ => warn!("ignoring {BATCH_WIDTH_VAR}={width}, expected a positive integer"),
            }
        }
        config
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_requests_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.requests_path = path.into();
        self
    }

    pub fn root_url(&self) -> String {
        format!("{}/", self.base_url)
    }

    pub fn search_url(&self, page: usize) -> String {
        format!("{}/giveaways/search?page={page}", self.base_url)
    }

    pub fn entered_url(&self) -> String {
        format!("{}/giveaways/entered", self.base_url)
    }

    pub fn entered_search_url(&self, page: usize) -> String {
        format!("{}/giveaways/entered/search?page={page}", self.base_url)
    }

    pub fn ajax_url(&self) -> String {
        format!("{}/ajax.php", self.base_url)
    }

    /// Absolute URL of a giveaway page, used as the referer of its entry request.
    pub fn giveaway_url(&self, relative_url: &str) -> String {
        format!("{}{relative_url}", self.base_url)
    }
}
