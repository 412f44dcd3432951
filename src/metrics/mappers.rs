//! Row-to-record mappers, one per measurement.
//!
//! Cell positions are fixed by the modem's page layout.

use chrono::{DateTime, Utc};

use super::*;

mod config_file {
    pub const ROW: usize = 5;
    pub const FILE: usize = 2;
}

mod downstream {
    pub const CHANNEL_ID: usize = 0;
    pub const STATUS: usize = 1;
    pub const MODULATION: usize = 2;
    pub const FREQUENCY: usize = 3;
    pub const POWER: usize = 4;
    pub const SNR: usize = 5;
    pub const CORRECTED: usize = 6;
    pub const UNCORRECTABLES: usize = 7;
}

mod upstream {
    pub const CHANNEL_ID: usize = 1;
    pub const STATUS: usize = 2;
    pub const CHANNEL_TYPE: usize = 3;
    pub const FREQUENCY: usize = 4;
    pub const WIDTH: usize = 5;
    pub const POWER: usize = 6;
}

mod firmware {
    pub const ROW: usize = 3;
    pub const VERSION: usize = 1;
}

mod uptime {
    pub const ROW: usize = 1;
    pub const LABEL: usize = 0;
    pub const VALUE: usize = 1;
}

mod event_log {
    pub const TIMESTAMP: usize = 0;
    pub const ID: usize = 1;
    pub const LEVEL: usize = 2;
    pub const DESC: usize = 3;
}

const HZ_PER_MHZ: f64 = 1_000_000.0;

/// Values shared by every record of one run.
#[derive(Debug, Clone)]
pub struct MapContext {
    pub captured_at: DateTime<Utc>,
    pub host: String,
}

/// Which data rows a mapper consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowGate {
    Every,
    /// Only the data row with this 1-based ordinal.
    Only(usize),
}

/// The per-measurement row mappers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mapper {
    ConfigFile,
    DownstreamChannel,
    UpstreamChannel,
    FirmwareVersion,
    Uptime,
    EventLogEntry,
}

impl Mapper {
    pub fn measurement(self) -> &'static str {
        match self {
            Mapper::ConfigFile => CONFIG_FILE,
            Mapper::DownstreamChannel => DOWNSTREAM_STATISTICS,
            Mapper::UpstreamChannel => UPSTREAM_STATISTICS,
            Mapper::FirmwareVersion => FW_VER,
            Mapper::Uptime => UPTIME,
            Mapper::EventLogEntry => EVENT_LOG,
        }
    }

    pub fn gate(self) -> RowGate {
        match self {
            Mapper::ConfigFile => RowGate::Only(config_file::ROW),
            Mapper::FirmwareVersion => RowGate::Only(firmware::ROW),
            Mapper::Uptime => RowGate::Only(uptime::ROW),
            Mapper::DownstreamChannel | Mapper::UpstreamChannel | Mapper::EventLogEntry => {
                RowGate::Every
            }
        }
    }

    /// Map one data row. Returns `Ok(None)` for rows outside the mapper's gate.
    pub fn map(
        self,
        ordinal: usize,
        cells: &[String],
        ctx: &MapContext,
    ) -> Result<Option<MetricRecord>, MapError> {
        if let RowGate::Only(wanted) = self.gate() {
            if ordinal != wanted {
                return Ok(None);
            }
        }

        let record = match self {
            Mapper::ConfigFile => MetricRecord::ConfigFile(ConfigFile {
                host: ctx.host.clone(),
                file: text(cells, config_file::FILE)?,
            }),
            Mapper::DownstreamChannel => {
                let hz = leading_number(cells, downstream::FREQUENCY)?;
                MetricRecord::DownstreamChannel(DownstreamChannel {
                    channel_id: text(cells, downstream::CHANNEL_ID)?,
                    status: text(cells, downstream::STATUS)?,
                    modulation: text(cells, downstream::MODULATION)?,
                    frequency: (hz / HZ_PER_MHZ).trunc() as i64,
                    power: leading_number(cells, downstream::POWER)?,
                    snr: leading_number(cells, downstream::SNR)?,
                    corrected: integer(cells, downstream::CORRECTED)?,
                    uncorrectables: integer(cells, downstream::UNCORRECTABLES)?,
                    time: ctx.captured_at,
                })
            }
            Mapper::UpstreamChannel => MetricRecord::UpstreamChannel(UpstreamChannel {
                channel_id: text(cells, upstream::CHANNEL_ID)?,
                status: text(cells, upstream::STATUS)?,
                channel_type: text(cells, upstream::CHANNEL_TYPE)?,
                frequency: leading_number(cells, upstream::FREQUENCY)? / HZ_PER_MHZ,
                width: leading_number(cells, upstream::WIDTH)? / HZ_PER_MHZ,
                power: leading_number(cells, upstream::POWER)?,
                time: ctx.captured_at,
            }),
            Mapper::FirmwareVersion => MetricRecord::FirmwareVersion(FirmwareVersion {
                host: ctx.host.clone(),
                firmware: text(cells, firmware::VERSION)?,
            }),
            Mapper::Uptime => {
                let full = text(cells, uptime::VALUE)?;
                let day_hour = day_hour(&full).ok_or_else(|| MapError::Malformed {
                    index: uptime::VALUE,
                    value: full.clone(),
                })?;
                MetricRecord::Uptime(Uptime {
                    host: ctx.host.clone(),
                    up_time: text(cells, uptime::LABEL)?,
                    uptime_full: full,
                    uptime_d_h: day_hour,
                    time: ctx.captured_at,
                })
            }
            Mapper::EventLogEntry => MetricRecord::EventLogEntry(EventLogEntry {
                timestamp: text(cells, event_log::TIMESTAMP)?,
                id: text(cells, event_log::ID)?,
                level: text(cells, event_log::LEVEL)?,
                desc: text(cells, event_log::DESC)?,
            }),
        };

        Ok(Some(record))
    }
}

fn cell(cells: &[String], index: usize) -> Result<&str, MapError> {
    cells
        .get(index)
        .map(String::as_str)
        .ok_or(MapError::MissingField { index })
}

fn text(cells: &[String], index: usize) -> Result<String, MapError> {
    cell(cells, index).map(str::to_string)
}

/// Parse the token before the first space as a float, e.g. "549000000 Hz".
fn leading_number(cells: &[String], index: usize) -> Result<f64, MapError> {
    let raw = cell(cells, index)?;
    let token = raw.split_once(' ').map_or(raw, |(head, _)| head);

    match token.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(MapError::NotNumeric {
            index,
            value: raw.to_string(),
        }),
    }
}

fn integer(cells: &[String], index: usize) -> Result<i64, MapError> {
    let raw = cell(cells, index)?;
    raw.parse().map_err(|_| MapError::NotNumeric {
        index,
        value: raw.to_string(),
    })
}

/// "5 days, 12:34:56" -> "5 12". Tied to the device's exact phrasing.
fn day_hour(full: &str) -> Option<String> {
    let (days, rest) = full.split_once(' ')?;
    let (_unit, clock) = rest.split_once(' ')?;
    let hours = clock.split(':').next()?;
    Some(format!("{} {}", days, hours))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ctx() -> MapContext {
        MapContext {
            captured_at: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
            host: "cm8200b".to_string(),
        }
    }

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_downstream_row() {
        let cells = row(&[
            "1", "Locked", "QAM256", "549000000 Hz", "3.2 dBmV", "40.1 dB", "12", "0",
        ]);
        let record = Mapper::DownstreamChannel.map(1, &cells, &ctx()).unwrap();

        let Some(MetricRecord::DownstreamChannel(r)) = record else {
            panic!("expected downstream record");
        };
        assert_eq!(r.channel_id, "1");
        assert_eq!(r.status, "Locked");
        assert_eq!(r.modulation, "QAM256");
        assert_eq!(r.frequency, 549);
        assert_eq!(r.power, 3.2);
        assert_eq!(r.snr, 40.1);
        assert_eq!(r.corrected, 12);
        assert_eq!(r.uncorrectables, 0);
        assert_eq!(r.time, ctx().captured_at);
    }

    #[test]
    fn test_downstream_frequency_truncates() {
        let cells = row(&[
            "2", "Locked", "QAM256", "555999999 Hz", "-1.0 dBmV", "38 dB", "0", "0",
        ]);
        let Some(MetricRecord::DownstreamChannel(r)) =
            Mapper::DownstreamChannel.map(2, &cells, &ctx()).unwrap()
        else {
            panic!("expected downstream record");
        };
        assert_eq!(r.frequency, 555);
        assert_eq!(r.power, -1.0);
    }

    #[test]
    fn test_upstream_row() {
        let cells = row(&[
            "1", "3", "Locked", "SC-QAM", "30600000 Hz", "6400000 Hz", "44.0 dBmV",
        ]);
        let Some(MetricRecord::UpstreamChannel(r)) =
            Mapper::UpstreamChannel.map(1, &cells, &ctx()).unwrap()
        else {
            panic!("expected upstream record");
        };
        assert_eq!(r.channel_id, "3");
        assert_eq!(r.status, "Locked");
        assert_eq!(r.channel_type, "SC-QAM");
        assert_eq!(r.frequency, 30.6);
        assert_eq!(r.width, 6.4);
        assert_eq!(r.power, 44.0);
    }

    #[test]
    fn test_missing_field() {
        let cells = row(&["1", "Locked", "QAM256", "549000000 Hz"]);
        assert_eq!(
            Mapper::DownstreamChannel.map(1, &cells, &ctx()),
            Err(MapError::MissingField { index: 4 })
        );
    }

    #[test]
    fn test_non_numeric_fields() {
        let cells = row(&[
            "1", "Locked", "QAM256", "---- Hz", "3.2 dBmV", "40.1 dB", "12", "0",
        ]);
        assert_eq!(
            Mapper::DownstreamChannel.map(1, &cells, &ctx()),
            Err(MapError::NotNumeric {
                index: 3,
                value: "---- Hz".to_string()
            })
        );

        let cells = row(&[
            "1", "Locked", "QAM256", "549000000 Hz", "3.2 dBmV", "40.1 dB", "1.5", "0",
        ]);
        assert!(matches!(
            Mapper::DownstreamChannel.map(1, &cells, &ctx()),
            Err(MapError::NotNumeric { index: 6, .. })
        ));

        let cells = row(&["1", "3", "Locked", "SC-QAM", "NaN Hz", "6400000 Hz", "44 dBmV"]);
        assert!(matches!(
            Mapper::UpstreamChannel.map(1, &cells, &ctx()),
            Err(MapError::NotNumeric { index: 4, .. })
        ));
    }

    #[test]
    fn test_config_file_gate() {
        let cells = row(&["Config File", "", "config_v2.bin"]);
        assert_eq!(Mapper::ConfigFile.gate(), RowGate::Only(5));
        assert_eq!(Mapper::ConfigFile.map(4, &cells, &ctx()), Ok(None));
        assert_eq!(Mapper::ConfigFile.map(6, &cells, &ctx()), Ok(None));

        let record = Mapper::ConfigFile.map(5, &cells, &ctx()).unwrap();
        assert_eq!(
            record,
            Some(MetricRecord::ConfigFile(ConfigFile {
                host: "cm8200b".to_string(),
                file: "config_v2.bin".to_string(),
            }))
        );
    }

    #[test]
    fn test_gated_rows_not_validated() {
        // Short rows outside the gate are ignored, not errors.
        let cells = row(&["x"]);
        assert_eq!(Mapper::FirmwareVersion.map(1, &cells, &ctx()), Ok(None));
        assert_eq!(
            Mapper::FirmwareVersion.map(3, &cells, &ctx()),
            Err(MapError::MissingField { index: 1 })
        );
    }

    #[test]
    fn test_firmware_row() {
        let cells = row(&["Software Version", "AB01.01.009.12_042220_193.0A.NSH"]);
        let record = Mapper::FirmwareVersion.map(3, &cells, &ctx()).unwrap();
        assert_eq!(
            record,
            Some(MetricRecord::FirmwareVersion(FirmwareVersion {
                host: "cm8200b".to_string(),
                firmware: "AB01.01.009.12_042220_193.0A.NSH".to_string(),
            }))
        );
    }

    #[test]
    fn test_uptime_row() {
        let cells = row(&["System Uptime", "5 days, 12:34:56"]);
        let Some(MetricRecord::Uptime(r)) = Mapper::Uptime.map(1, &cells, &ctx()).unwrap() else {
            panic!("expected uptime record");
        };
        assert_eq!(r.up_time, "System Uptime");
        assert_eq!(r.uptime_full, "5 days, 12:34:56");
        assert_eq!(r.uptime_d_h, "5 12");
        assert_eq!(r.host, "cm8200b");
    }

    #[test]
    fn test_uptime_unexpected_format() {
        let cells = row(&["System Uptime", "12:34:56"]);
        assert!(matches!(
            Mapper::Uptime.map(1, &cells, &ctx()),
            Err(MapError::Malformed { index: 1, .. })
        ));
    }

    #[test]
    fn test_event_log_row() {
        let cells = row(&[
            "Mon Mar 04 10:11:12 2024",
            "82000200",
            "Critical (3)",
            "No Ranging Response received - T3 time-out",
        ]);
        let record = Mapper::EventLogEntry.map(7, &cells, &ctx()).unwrap();
        assert_eq!(
            record,
            Some(MetricRecord::EventLogEntry(EventLogEntry {
                timestamp: "Mon Mar 04 10:11:12 2024".to_string(),
                id: "82000200".to_string(),
                level: "Critical (3)".to_string(),
                desc: "No Ranging Response received - T3 time-out".to_string(),
            }))
        );
    }

    #[test]
    fn test_day_hour() {
        assert_eq!(day_hour("5 days, 12:34:56").as_deref(), Some("5 12"));
        assert_eq!(day_hour("0 days 00:01:02").as_deref(), Some("0 00"));
        assert_eq!(day_hour("garbage"), None);
    }
}
