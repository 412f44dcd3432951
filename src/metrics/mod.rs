//! Typed metric records and their time-series point form.

mod mappers;

pub use mappers::*;

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

pub const CONFIG_FILE: &str = "config_file";
pub const DOWNSTREAM_STATISTICS: &str = "downstream_statistics";
pub const UPSTREAM_STATISTICS: &str = "upstream_statistics";
pub const FW_VER: &str = "fw_ver";
pub const UPTIME: &str = "uptime";
pub const EVENT_LOG: &str = "event_log";

/// A single row could not be turned into a record.
#[derive(Error, Debug, PartialEq)]
pub enum MapError {
    #[error("missing field at cell {index}")]
    MissingField { index: usize },
    #[error("cell {index} is not numeric: {value:?}")]
    NotNumeric { index: usize, value: String },
    #[error("cell {index} has unexpected format: {value:?}")]
    Malformed { index: usize, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    pub host: String,
    pub file: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DownstreamChannel {
    pub channel_id: String,
    pub status: String,
    pub modulation: String,
    /// MHz, truncated.
    pub frequency: i64,
    pub power: f64,
    pub snr: f64,
    pub corrected: i64,
    pub uncorrectables: i64,
    pub time: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamChannel {
    pub channel_id: String,
    pub status: String,
    pub channel_type: String,
    /// MHz.
    pub frequency: f64,
    /// MHz.
    pub width: f64,
    pub power: f64,
    pub time: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FirmwareVersion {
    pub host: String,
    pub firmware: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Uptime {
    pub host: String,
    pub up_time: String,
    pub uptime_full: String,
    /// Day count and hour only, e.g. "5 12".
    pub uptime_d_h: String,
    pub time: DateTime<Utc>,
}

/// The device reports its own timestamp text; it is carried as a tag
/// rather than as the point time.
#[derive(Debug, Clone, PartialEq)]
pub struct EventLogEntry {
    pub timestamp: String,
    pub id: String,
    pub level: String,
    pub desc: String,
}

/// One metric produced from one table row.
#[derive(Debug, Clone, PartialEq)]
pub enum MetricRecord {
    ConfigFile(ConfigFile),
    DownstreamChannel(DownstreamChannel),
    UpstreamChannel(UpstreamChannel),
    FirmwareVersion(FirmwareVersion),
    Uptime(Uptime),
    EventLogEntry(EventLogEntry),
}

/// Field value as written to the store.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Str(String),
    Int(i64),
    Float(f64),
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Str(s.to_string())
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Int(v)
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Float(v)
    }
}

/// Measurement, tags, fields and optional timestamp of a record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Point {
    pub measurement: &'static str,
    pub tags: BTreeMap<String, String>,
    pub fields: BTreeMap<String, FieldValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<DateTime<Utc>>,
}

impl Point {
    fn new(measurement: &'static str, time: Option<DateTime<Utc>>) -> Self {
        Self {
            measurement,
            tags: BTreeMap::new(),
            fields: BTreeMap::new(),
            time,
        }
    }

    fn tag(mut self, key: &str, value: &str) -> Self {
        self.tags.insert(key.to_string(), value.to_string());
        self
    }

    fn field(mut self, key: &str, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }
}

impl MetricRecord {
    pub fn measurement(&self) -> &'static str {
        match self {
            MetricRecord::ConfigFile(_) => CONFIG_FILE,
            MetricRecord::DownstreamChannel(_) => DOWNSTREAM_STATISTICS,
            MetricRecord::UpstreamChannel(_) => UPSTREAM_STATISTICS,
            MetricRecord::FirmwareVersion(_) => FW_VER,
            MetricRecord::Uptime(_) => UPTIME,
            MetricRecord::EventLogEntry(_) => EVENT_LOG,
        }
    }

    pub fn to_point(&self) -> Point {
        let point = Point::new(self.measurement(), self.time());

        match self {
            MetricRecord::ConfigFile(r) => point
                .tag("host", &r.host)
                .field("file", r.file.as_str()),
            MetricRecord::DownstreamChannel(r) => point
                .tag("channel_id", &r.channel_id)
                .field("status", r.status.as_str())
                .field("modulation", r.modulation.as_str())
                .field("frequency", r.frequency)
                .field("power", r.power)
                .field("snr", r.snr)
                .field("corrected", r.corrected)
                .field("uncorrectables", r.uncorrectables),
            MetricRecord::UpstreamChannel(r) => point
                .tag("channel_id", &r.channel_id)
                .field("status", r.status.as_str())
                .field("channel_type", r.channel_type.as_str())
                .field("frequency", r.frequency)
                .field("width", r.width)
                .field("power", r.power),
            MetricRecord::FirmwareVersion(r) => point
                .tag("host", &r.host)
                .field("firmware", r.firmware.as_str()),
            MetricRecord::Uptime(r) => point
                .tag("host", &r.host)
                .tag("up_time", &r.up_time)
                .field("uptime_full", r.uptime_full.as_str())
                .field("uptime_d_h", r.uptime_d_h.as_str()),
            MetricRecord::EventLogEntry(r) => point
                .tag("tag_timestamp", &r.timestamp)
                .field("time_d_t", r.timestamp.as_str())
                .field("id", r.id.as_str())
                .field("level", r.level.as_str())
                .field("desc", r.desc.as_str()),
        }
    }

    fn time(&self) -> Option<DateTime<Utc>> {
        match self {
            MetricRecord::DownstreamChannel(r) => Some(r.time),
            MetricRecord::UpstreamChannel(r) => Some(r.time),
            MetricRecord::Uptime(r) => Some(r.time),
            MetricRecord::ConfigFile(_)
            | MetricRecord::FirmwareVersion(_)
            | MetricRecord::EventLogEntry(_) => None,
        }
    }
}
