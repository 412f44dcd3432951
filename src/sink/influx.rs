//! InfluxDB 1.x HTTP sink.

use serde::Deserialize;

use super::{line_protocol, MetricSink, WriteError};
use crate::config::ScraperConfig;
use crate::metrics::MetricRecord;

/// Writes records to an existing InfluxDB database over the HTTP API.
pub struct InfluxSink {
    client: reqwest::Client,
    base_url: String,
    database: String,
    username: String,
    password: String,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    results: Vec<StatementResult>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StatementResult {
    error: Option<String>,
}

impl QueryResponse {
    fn first_error(self) -> Option<String> {
        self.error
            .or_else(|| self.results.into_iter().find_map(|r| r.error))
    }
}

impl InfluxSink {
    pub fn new(cfg: &ScraperConfig) -> Result<Self, WriteError> {
        let client = reqwest::Client::builder()
            .timeout(cfg.write_timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: cfg.influx_url(),
            database: cfg.influx_database.clone(),
            username: cfg.influx_username.clone(),
            password: cfg.influx_password.clone(),
        })
    }

    /// Query parameters for `/write`. No precision: timestamps are
    /// nanoseconds, and untimed points get the server's nanosecond clock.
    fn write_params(&self) -> [(&'static str, &str); 1] {
        [("db", self.database.as_str())]
    }

    fn post(&self, endpoint: &str) -> reqwest::RequestBuilder {
        self.client
            .post(format!("{}/{}", self.base_url, endpoint))
            .basic_auth(&self.username, Some(&self.password))
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, WriteError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(WriteError::Status {
        status: status.as_u16(),
        body,
    })
}

impl MetricSink for InfluxSink {
    async fn write(&mut self, record: &MetricRecord) -> Result<(), WriteError> {
        let point = record.to_point();
        if let Ok(json) = serde_json::to_string(&point) {
            tracing::debug!("Writing point {}", json);
        }

        let response = self
            .post("write")
            .query(&self.write_params())
            .body(line_protocol::encode(&point))
            .send()
            .await?;

        check_status(response).await?;
        Ok(())
    }

    async fn clear_series(&mut self, measurement: &str) -> Result<(), WriteError> {
        let query = format!("DROP SERIES FROM \"{}\"", measurement.replace('"', "\\\""));

        let response = self
            .post("query")
            .query(&[("db", self.database.as_str())])
            .form(&[("q", query.as_str())])
            .send()
            .await?;

        let body: QueryResponse = check_status(response).await?.json().await?;
        match body.first_error() {
            Some(err) => Err(WriteError::Query(err)),
            None => {
                tracing::info!("Cleared series for measurement {}", measurement);
                Ok(())
            }
        }
    }
}
