//! NASA NeoWs API client implementation.

use super::{DataSourceError, NeoSource};
use crate::domain::{Neo, OrbitalData};
use async_trait::async_trait;
use backoff::future::retry;
use backoff::ExponentialBackoff;
use chrono::NaiveDate;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_BASE_URL: &str = "https://api.nasa.gov/neo/rest/v1";

/// NeoWs data source using the public feed and lookup endpoints.
#[derive(Debug, Clone)]
pub struct NasaNeoSource {
    client: Client,
    base_url: String,
    api_key: String,
}

impl NasaNeoSource {
    /// Create a new NeoWs data source with a per-request timeout.
    pub fn new(
        base_url: String,
        api_key: String,
        timeout: Duration,
    ) -> Result<Self, DataSourceError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DataSourceError::Other(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn feed_url(&self) -> String {
        format!("{}/feed", self.base_url)
    }

    fn lookup_url(&self, neo_id: &str) -> String {
        format!("{}/neo/{}", self.base_url, neo_id)
    }

    async fn get_json(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<serde_json::Value, DataSourceError> {
        let backoff = ExponentialBackoff {
            max_elapsed_time: Some(Duration::from_secs(30)),
            ..Default::default()
        };

        retry(backoff, || async {
            let response = self
                .client
                .get(url)
                .query(query)
                .query(&[("api_key", self.api_key.as_str())])
                .send()
                .await
                .map_err(|e| {
                    backoff::Error::transient(DataSourceError::NetworkError(e.to_string()))
                })?;

            let status = response.status();
            if status == StatusCode::TOO_MANY_REQUESTS {
                return Err(backoff::Error::transient(DataSourceError::RateLimited));
            }
            if status.is_server_error() {
                return Err(backoff::Error::transient(DataSourceError::HttpError {
                    status: status.as_u16(),
                    message: "Server error".to_string(),
                }));
            }
            if status == StatusCode::NOT_FOUND {
                return Err(backoff::Error::permanent(DataSourceError::NotFound(
                    url.to_string(),
                )));
            }
            if !status.is_success() {
                return Err(backoff::Error::permanent(DataSourceError::HttpError {
                    status: status.as_u16(),
                    message: "Client error".to_string(),
                }));
            }

            response
                .json::<serde_json::Value>()
                .await
                .map_err(|e| backoff::Error::permanent(DataSourceError::ParseError(e.to_string())))
        })
        .await
    }
}

#[async_trait]
impl NeoSource for NasaNeoSource {
    async fn fetch_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Neo>, DataSourceError> {
        debug!("Fetching feed range start={}, end={}", start, end);

        let query = [
            ("start_date", start.format("%Y-%m-%d").to_string()),
            ("end_date", end.format("%Y-%m-%d").to_string()),
        ];
        let response = self.get_json(&self.feed_url(), &query).await?;
        parse_feed(&response)
    }

    async fn fetch_detail(&self, neo_id: &str) -> Option<OrbitalData> {
        match self.get_json(&self.lookup_url(neo_id), &[]).await {
            Ok(response) => parse_orbital_data(&response),
            Err(e) => {
                warn!(neo_id = %neo_id, error = %e, "Orbital detail fetch failed");
                None
            }
        }
    }

    async fn fetch_neo(&self, neo_id: &str) -> Result<Neo, DataSourceError> {
        debug!("Fetching single record neo_id={}", neo_id);

        let response = self
            .get_json(&self.lookup_url(neo_id), &[])
            .await
            .map_err(|e| match e {
                DataSourceError::NotFound(_) => DataSourceError::NotFound(neo_id.to_string()),
                other => other,
            })?;
        serde_json::from_value(response)
            .map_err(|e| DataSourceError::ParseError(format!("Invalid record {}: {}", neo_id, e)))
    }
}

/// Flatten the feed's date-keyed grouping into one sequence.
///
/// Records that fail to decode are skipped with a warning.
fn parse_feed(response: &serde_json::Value) -> Result<Vec<Neo>, DataSourceError> {
    let by_date = response
        .get("near_earth_objects")
        .and_then(|v| v.as_object())
        .ok_or_else(|| {
            DataSourceError::ParseError("Missing near_earth_objects object".to_string())
        })?;

    let mut neos = Vec::new();
    for (date, entries) in by_date {
        let Some(entries) = entries.as_array() else {
            warn!("Feed entry for {} is not an array", date);
            continue;
        };
        for entry in entries {
            match serde_json::from_value::<Neo>(entry.clone()) {
                Ok(neo) => neos.push(neo),
                Err(e) => {
                    warn!("Failed to parse feed record on {}: {}", date, e);
                }
            }
        }
    }

    Ok(neos)
}

fn parse_orbital_data(response: &serde_json::Value) -> Option<OrbitalData> {
    let orbital = response.get("orbital_data")?;
    match serde_json::from_value::<OrbitalData>(orbital.clone()) {
        Ok(data) => Some(data),
        Err(e) => {
            warn!("Failed to parse orbital_data: {}", e);
            None
        }
    }
}
