//! Configuration module for the modem scraper.
//!
//! Loads configuration from environment variables with sensible defaults.

use std::env;
use std::time::Duration;

/// Scraper configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ScraperConfig {
    /// InfluxDB host (default: "127.0.0.1")
    pub influx_host: String,
    /// InfluxDB HTTP port (default: 8086)
    pub influx_port: u16,
    /// InfluxDB database name; must already exist (default: "cm8200b_stats")
    pub influx_database: String,
    /// InfluxDB username (default: "admin")
    pub influx_username: String,
    /// InfluxDB password (default: empty)
    pub influx_password: String,
    /// Base URL of the modem's web UI (default: "http://192.168.0.1")
    pub device_url: String,
    /// Value of the `host` tag on singleton measurements (default: "cm8200b")
    pub device_tag: String,
    /// Transport timeout for each page fetch (default: 10s)
    pub fetch_timeout: Duration,
    /// Transport timeout for each database request (default: 10s)
    pub write_timeout: Duration,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            influx_host: "127.0.0.1".to_string(),
            influx_port: 8086,
            influx_database: "cm8200b_stats".to_string(),
            influx_username: "admin".to_string(),
            influx_password: String::new(),
            device_url: "http://192.168.0.1".to_string(),
            device_tag: "cm8200b".to_string(),
            fetch_timeout: Duration::from_secs(10),
            write_timeout: Duration::from_secs(10),
        }
    }
}

impl ScraperConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `INFLUXDB_HOST`: database host (default: "127.0.0.1")
    /// - `INFLUXDB_HOST_PORT`: database port (default: 8086)
    /// - `INFLUXDB_DATABASE`: database name (default: "cm8200b_stats")
    /// - `INFLUXDB_USERNAME`: database user (default: "admin")
    /// - `INFLUXDB_PASSWORD`: database password (default: "")
    /// - `NTD_URL`: modem base URL (default: "http://192.168.0.1")
    /// - `CM_DEVICE_TAG`: host tag value (default: "cm8200b")
    /// - `CM_FETCH_TIMEOUT_SECS`: page fetch timeout (default: 10)
    /// - `CM_WRITE_TIMEOUT_SECS`: database request timeout (default: 10)
    pub fn load() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup on top of the defaults.
    ///
    /// Numeric values that fail to parse are ignored.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(host) = lookup("INFLUXDB_HOST") {
            cfg.influx_host = host;
        }

        if let Some(port_str) = lookup("INFLUXDB_HOST_PORT") {
            if let Ok(port) = port_str.parse() {
                cfg.influx_port = port;
            }
        }

        if let Some(database) = lookup("INFLUXDB_DATABASE") {
            cfg.influx_database = database;
        }

        if let Some(username) = lookup("INFLUXDB_USERNAME") {
            cfg.influx_username = username;
        }

        if let Some(password) = lookup("INFLUXDB_PASSWORD") {
            cfg.influx_password = password;
        }

        if let Some(url) = lookup("NTD_URL") {
            cfg.device_url = url;
        }

        if let Some(tag) = lookup("CM_DEVICE_TAG") {
            cfg.device_tag = tag;
        }

        if let Some(secs) = lookup("CM_FETCH_TIMEOUT_SECS").and_then(|s| s.parse().ok()) {
            cfg.fetch_timeout = Duration::from_secs(secs);
        }

        if let Some(secs) = lookup("CM_WRITE_TIMEOUT_SECS").and_then(|s| s.parse().ok()) {
            cfg.write_timeout = Duration::from_secs(secs);
        }

        cfg
    }

    /// Base URL of the InfluxDB HTTP API.
    pub fn influx_url(&self) -> String {
        format!("http://{}:{}", self.influx_host, self.influx_port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let cfg = ScraperConfig::default();
        assert_eq!(cfg.influx_host, "127.0.0.1");
        assert_eq!(cfg.influx_port, 8086);
        assert_eq!(cfg.influx_database, "cm8200b_stats");
        assert_eq!(cfg.influx_username, "admin");
        assert_eq!(cfg.influx_password, "");
        assert_eq!(cfg.device_url, "http://192.168.0.1");
        assert_eq!(cfg.device_tag, "cm8200b");
        assert_eq!(cfg.influx_url(), "http://127.0.0.1:8086");
    }

    #[test]
    fn test_overrides_applied() {
        let vars: HashMap<&str, &str> = [
            ("INFLUXDB_HOST", "influx.lan"),
            ("INFLUXDB_HOST_PORT", "9999"),
            ("INFLUXDB_PASSWORD", "secret"),
            ("NTD_URL", "http://10.0.0.1"),
            ("CM_FETCH_TIMEOUT_SECS", "3"),
        ]
        .into_iter()
        .collect();

        let cfg = ScraperConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(cfg.influx_url(), "http://influx.lan:9999");
        assert_eq!(cfg.influx_password, "secret");
        assert_eq!(cfg.device_url, "http://10.0.0.1");
        assert_eq!(cfg.fetch_timeout, Duration::from_secs(3));
        assert_eq!(cfg.influx_database, "cm8200b_stats");
    }

    #[test]
    fn test_bad_numbers_keep_defaults() {
        let cfg = ScraperConfig::from_lookup(|k| match k {
            "INFLUXDB_HOST_PORT" => Some("not-a-port".to_string()),
            "CM_WRITE_TIMEOUT_SECS" => Some("-1".to_string()),
            _ => None,
        });
        assert_eq!(cfg.influx_port, 8086);
        assert_eq!(cfg.write_timeout, Duration::from_secs(10));
    }
}
