//! Scrape pipeline: fetch each page, locate its tables, map rows, write records.
//!
//! Pages, tables and rows are processed strictly in order. A failure on one
//! page stops that page only; records already written stay written.

mod report;

pub use report::*;

use chrono::{SubsecRound, Utc};

use crate::config::ScraperConfig;
use crate::fetch::{Page, PageFetcher};
use crate::html::RawPage;
use crate::metrics::{MapContext, Mapper, EVENT_LOG};
use crate::sink::MetricSink;

/// A table on a page and the mapper applied to its rows.
#[derive(Debug, Clone, Copy)]
pub struct TableSpec {
    pub index: usize,
    pub mapper: Mapper,
}

/// A page and the tables read from it.
#[derive(Debug, Clone, Copy)]
pub struct PageSpec {
    pub page: Page,
    pub tables: &'static [TableSpec],
    /// Measurement whose series are dropped before this page's tables are read.
    pub clears: Option<&'static str>,
}

/// The modem's page layout.
pub const PAGES: [PageSpec; 3] = [
    PageSpec {
        page: Page::LineStats,
        tables: &[
            TableSpec { index: 0, mapper: Mapper::ConfigFile },
            TableSpec { index: 1, mapper: Mapper::DownstreamChannel },
            TableSpec { index: 2, mapper: Mapper::UpstreamChannel },
        ],
        clears: None,
    },
    PageSpec {
        page: Page::GeneralStats,
        tables: &[
            TableSpec { index: 0, mapper: Mapper::FirmwareVersion },
            TableSpec { index: 1, mapper: Mapper::Uptime },
        ],
        clears: None,
    },
    PageSpec {
        page: Page::LogStats,
        tables: &[TableSpec { index: 0, mapper: Mapper::EventLogEntry }],
        clears: Some(EVENT_LOG),
    },
];

/// Runs one scrape pass against the device.
pub struct Scraper<F, S> {
    fetcher: F,
    sink: S,
    device_url: String,
    device_tag: String,
}

impl<F: PageFetcher, S: MetricSink> Scraper<F, S> {
    pub fn new(cfg: &ScraperConfig, fetcher: F, sink: S) -> Self {
        Self {
            fetcher,
            sink,
            device_url: cfg.device_url.clone(),
            device_tag: cfg.device_tag.clone(),
        }
    }

    /// Scrape every page once. Never stops early; see the report for failures.
    pub async fn run(&mut self) -> RunReport {
        let ctx = MapContext {
            captured_at: Utc::now().trunc_subsecs(0),
            host: self.device_tag.clone(),
        };

        let mut report = RunReport::default();
        for spec in &PAGES {
            let outcome = self.scrape_page(spec, &ctx).await;
            outcome.log();
            report.pages.push(outcome);
        }
        report
    }

    async fn scrape_page(&mut self, spec: &PageSpec, ctx: &MapContext) -> PageOutcome {
        let url = spec.page.url(&self.device_url);
        let mut outcome = PageOutcome::new(spec.page, &url);

        if let Err(e) = self.process_page(spec, &url, ctx, &mut outcome).await {
            outcome.error = Some(e);
        }
        outcome
    }

    async fn process_page(
        &mut self,
        spec: &PageSpec,
        url: &str,
        ctx: &MapContext,
        outcome: &mut PageOutcome,
    ) -> Result<(), PageError> {
        let body = self.fetcher.fetch(url).await?;
        let page = RawPage::parse(url, &body);

        if let Some(measurement) = spec.clears {
            self.sink
                .clear_series(measurement)
                .await
                .map_err(|source| PageError::Clear { measurement, source })?;
        }

        for table in spec.tables {
            let located = page.table(table.index)?;
            let rows = located.data_rows()?;
            tracing::debug!(
                "{}: table {} has {} data rows",
                page.url(),
                located.index(),
                rows.len()
            );

            for row in rows {
                let record = match table.mapper.map(row.ordinal, &row.cells, ctx) {
                    Ok(Some(record)) => record,
                    Ok(None) => continue,
                    Err(e) => {
                        tracing::warn!(
                            "{}: skipping {} row {} of table {}: {}",
                            spec.page,
                            table.mapper.measurement(),
                            row.ordinal,
                            table.index,
                            e
                        );
                        outcome.skipped_rows += 1;
                        continue;
                    }
                };

                match self.sink.write(&record).await {
                    Ok(()) => outcome.written += 1,
                    Err(e) => {
                        tracing::error!(
                            "{}: failed to write {} row {}: {}",
                            spec.page,
                            record.measurement(),
                            row.ordinal,
                            e
                        );
                        outcome.failed_writes += 1;
                    }
                }
            }
        }

        Ok(())
    }

    #[cfg(test)]
    pub fn sink(&self) -> &S {
        &self.sink
    }
}
