//! Retrieval of the hourly position snapshots.
//!
//! Each hour lives at `{base_url}/{hour:02}.json` as a JSON array of
//! `[latitude, longitude, altitude]` samples, hour `00` being the most recent.
//! Hours are fetched concurrently with a bounded fan-out, each request with its
//! own timeout. A failing hour is recorded and skipped; it never aborts the
//! others.

use crate::samples::error::SampleFetchError;
use crate::types::data_quality::{DataQuality, HourFetchError};
use crate::types::position::{Position, LAST_HOUR};
use bon::Builder;
use chrono::{DateTime, Utc};
use futures_util::stream::{self, StreamExt};
use log::{debug, info, warn};
use reqwest::Client;
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

pub const DEFAULT_BASE_URL: &str = "https://a.windbornesystems.com/treasure";

#[derive(Debug, Clone, PartialEq, Builder)]
pub struct FetcherConfig {
    /// URL the `NN.json` snapshot names are appended to.
    #[builder(default = DEFAULT_BASE_URL.to_string(), into)]
    pub base_url: String,
    /// Number of hourly snapshots to request, starting at hour 0. At most 24.
    #[builder(default = LAST_HOUR + 1)]
    pub hours: u8,
    #[builder(default = Duration::from_secs(10))]
    pub request_timeout: Duration,
    /// Maximum number of requests in flight at once.
    #[builder(default = 8)]
    pub max_concurrency: usize,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// The outcome of fetching every hourly snapshot: whatever succeeded, plus one
/// error per hour that did not.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HourlySnapshots {
    pub per_hour: BTreeMap<u8, Vec<Position>>,
    pub errors: Vec<HourFetchError>,
    pub success_count: usize,
    pub total_requests: usize,
    pub fetched_at: DateTime<Utc>,
}

impl HourlySnapshots {
    /// Collects per-hour results in any order.
    pub fn from_hours(
        fetched_at: DateTime<Utc>,
        results: impl IntoIterator<Item = (u8, Result<Vec<Position>, SampleFetchError>)>,
    ) -> Self {
        let mut snapshots = Self {
            fetched_at,
            ..Self::default()
        };
        for (hour, result) in results {
            snapshots.total_requests += 1;
            match result {
                Ok(positions) => {
                    snapshots.success_count += 1;
                    snapshots.per_hour.insert(hour, positions);
                }
                Err(e) => {
                    warn!("Hour {:02} unavailable: {}", hour, e);
                    snapshots.errors.push(HourFetchError {
                        hour,
                        reason: e.to_string(),
                    });
                }
            }
        }
        snapshots.errors.sort_by_key(|e| e.hour);
        snapshots
    }

    /// All positions as one pool, ordered by hour and then by arrival.
    pub fn positions(&self) -> Vec<Position> {
        self.per_hour.values().flatten().copied().collect()
    }

    pub fn data_quality(&self) -> DataQuality {
        DataQuality {
            successful_hours: self.success_count,
            failed_hours: self.errors.len(),
            total_requests: self.total_requests,
            errors: self.errors.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct HourlyFetcher {
    client: Client,
    config: FetcherConfig,
}

impl HourlyFetcher {
    pub fn new(config: FetcherConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub fn config(&self) -> &FetcherConfig {
        &self.config
    }

    pub fn hour_url(&self, hour: u8) -> String {
        format!("{}/{:02}.json", self.config.base_url.trim_end_matches('/'), hour)
    }

    pub async fn fetch_all_hours(&self) -> HourlySnapshots {
        let fetched_at = Utc::now();
        let hours = self.config.hours.min(LAST_HOUR + 1);
        let concurrency = self.config.max_concurrency.max(1);
        let start = Instant::now();
        info!(
            "Fetching {} hourly snapshots from {} ({} concurrent)",
            hours, self.config.base_url, concurrency
        );

        let results: Vec<_> = stream::iter(0..hours)
            .map(|hour| async move { (hour, self.fetch_hour(hour, fetched_at).await) })
            .buffer_unordered(concurrency)
            .collect()
            .await;

        let snapshots = HourlySnapshots::from_hours(fetched_at, results);
        info!(
            "Fetched {}/{} hourly snapshots ({} positions) in {:?}",
            snapshots.success_count,
            snapshots.total_requests,
            snapshots.per_hour.values().map(Vec::len).sum::<usize>(),
            start.elapsed()
        );
        snapshots
    }

    async fn fetch_hour(
        &self,
        hour: u8,
        fetched_at: DateTime<Utc>,
    ) -> Result<Vec<Position>, SampleFetchError> {
        let url = self.hour_url(hour);
        let response = self
            .client
            .get(&url)
            .timeout(self.config.request_timeout)
            .send()
            .await
            .map_err(|e| request_error(&url, e))?;

        let response = match response.error_for_status() {
            Ok(resp) => resp,
            Err(e) => {
                return Err(if let Some(status) = e.status() {
                    SampleFetchError::HttpStatus {
                        url,
                        status,
                        source: e,
                    }
                } else {
                    SampleFetchError::NetworkRequest(url, e)
                });
            }
        };

        let body = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                SampleFetchError::Timeout(url.clone())
            } else {
                SampleFetchError::BodyRead(url.clone(), e)
            }
        })?;
        parse_snapshot(&body, hour, fetched_at, &url)
    }
}

fn request_error(url: &str, e: reqwest::Error) -> SampleFetchError {
    if e.is_timeout() {
        SampleFetchError::Timeout(url.to_string())
    } else {
        SampleFetchError::NetworkRequest(url.to_string(), e)
    }
}

/// Parses one snapshot body, keeping the samples that validate and dropping
/// the rest.
pub fn parse_snapshot(
    body: &[u8],
    hour: u8,
    fetched_at: DateTime<Utc>,
    url: &str,
) -> Result<Vec<Position>, SampleFetchError> {
    let value: Value = serde_json::from_slice(body).map_err(|e| SampleFetchError::JsonParse {
        url: url.to_string(),
        source: e,
    })?;
    let samples = value
        .as_array()
        .ok_or_else(|| SampleFetchError::NotAnArray(url.to_string()))?;

    let mut positions = Vec::with_capacity(samples.len());
    let mut rejected = 0;
    for sample in samples {
        match Position::from_raw(sample, hour, fetched_at) {
            Ok(position) => positions.push(position),
            Err(reason) => {
                rejected += 1;
                debug!("Hour {:02}: dropping sample {}: {}", hour, sample, reason);
            }
        }
    }
    if rejected > 0 {
        debug!(
            "Hour {:02}: kept {} samples, dropped {} invalid",
            hour,
            positions.len(),
            rejected
        );
    }
    Ok(positions)
}
