//! Metric sink: the time-series store records are written to.

mod influx;
pub mod line_protocol;

pub use influx::*;

use crate::metrics::MetricRecord;
use thiserror::Error;

/// Sink error types.
#[derive(Error, Debug)]
pub enum WriteError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("database returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("query failed: {0}")]
    Query(String),
}

/// Destination for metric records.
pub trait MetricSink {
    /// Write one record.
    async fn write(&mut self, record: &MetricRecord) -> Result<(), WriteError>;

    /// Drop every series of a measurement.
    async fn clear_series(&mut self, measurement: &str) -> Result<(), WriteError>;
}
