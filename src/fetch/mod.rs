//! Page fetching for the modem's web UI.
//!
//! The modem serves three fixed status pages; each is fetched once per run.

mod http;

pub use http::*;

use std::fmt;
use thiserror::Error;

/// Fetch failure for a single page. Any transport or HTTP status failure is fatal for that page.
#[derive(Error, Debug)]
#[error("failed to fetch {url}: {cause}")]
pub struct FetchError {
    pub url: String,
    pub cause: String,
}

impl FetchError {
    pub fn new(url: &str, cause: impl ToString) -> Self {
        Self {
            url: url.to_string(),
            cause: cause.to_string(),
        }
    }
}

/// The status pages scraped from the modem, in run order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    LineStats,
    GeneralStats,
    LogStats,
}

impl Page {
    /// Path of the page relative to the device base URL.
    pub fn path(self) -> &'static str {
        match self {
            Page::LineStats => "main.html",
            Page::GeneralStats => "cmswinfo.html",
            Page::LogStats => "cmeventlog.html",
        }
    }

    /// Absolute URL of the page under the given base URL.
    pub fn url(self, base: &str) -> String {
        format!("{}/{}", base.trim_end_matches('/'), self.path())
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Page::LineStats => "line-stats",
            Page::GeneralStats => "general-stats",
            Page::LogStats => "log-stats",
        };
        f.write_str(name)
    }
}

/// Retrieves raw page bodies.
pub trait PageFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}
