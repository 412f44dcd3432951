//! Per-page outcomes of a scrape run and the process exit status derived from them.

use thiserror::Error;

use crate::fetch::{FetchError, Page};
use crate::html::LocateError;
use crate::sink::WriteError;

/// Failure that stopped processing of one page.
#[derive(Error, Debug)]
pub enum PageError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Locate(#[from] LocateError),
    #[error("failed to clear {measurement}: {source}")]
    Clear {
        measurement: &'static str,
        source: WriteError,
    },
}

impl PageError {
    pub fn exit_code(&self) -> u8 {
        match self {
            PageError::Fetch(_) => 2,
            PageError::Locate(LocateError::NoRows { .. }) => 4,
            PageError::Locate(_) => 3,
            PageError::Clear { .. } => 5,
        }
    }
}

/// What happened on one page.
#[derive(Debug)]
pub struct PageOutcome {
    pub page: Page,
    pub url: String,
    pub written: usize,
    /// Rows dropped because a field was missing or malformed.
    pub skipped_rows: usize,
    pub failed_writes: usize,
    pub error: Option<PageError>,
}

impl PageOutcome {
    pub fn new(page: Page, url: &str) -> Self {
        Self {
            page,
            url: url.to_string(),
            written: 0,
            skipped_rows: 0,
            failed_writes: 0,
            error: None,
        }
    }

    pub fn is_clean(&self) -> bool {
        self.error.is_none() && self.skipped_rows == 0 && self.failed_writes == 0
    }

    pub fn log(&self) {
        match &self.error {
            Some(e) => tracing::error!(
                "{} ({}): aborted after {} records: {}",
                self.page,
                self.url,
                self.written,
                e
            ),
            None => tracing::info!(
                "{}: wrote {} records ({} rows skipped, {} writes failed)",
                self.page,
                self.written,
                self.skipped_rows,
                self.failed_writes
            ),
        }
    }
}

/// Outcome of a full run, one entry per page in run order.
#[derive(Debug, Default)]
pub struct RunReport {
    pub pages: Vec<PageOutcome>,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.pages.iter().all(PageOutcome::is_clean)
    }

    pub fn written(&self) -> usize {
        self.pages.iter().map(|p| p.written).sum()
    }

    /// 0 on success. Otherwise the first page failure decides; row-level
    /// problems alone give 6.
    pub fn exit_code(&self) -> u8 {
        if let Some(err) = self.pages.iter().find_map(|p| p.error.as_ref()) {
            return err.exit_code();
        }
        if self.is_success() {
            0
        } else {
            6
        }
    }
}
