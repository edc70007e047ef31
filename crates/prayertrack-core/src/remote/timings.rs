//! Remote prayer timings.
//!
//! The default source is the Aladhan timings endpoint:
//! `GET {base}/timings/{dd-MM-yyyy}?latitude=..&longitude=..&method=..`,
//! answering `{ "data": { "timings": { "Fajr": "04:30", ... } } }`.

use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::HashMap;
use std::future::Future;
use url::Url;

use super::{http_client, Coordinate};
use crate::error::RemoteError;
use crate::period::PeriodSchedule;
use crate::storage::config::RemoteConfig;

/// Maps a coordinate, calculation method and date to the day's schedule.
pub trait TimingsSource: Send + Sync {
    fn timings(
        &self,
        coordinate: Coordinate,
        method: u8,
        date: NaiveDate,
    ) -> impl Future<Output = Result<PeriodSchedule, RemoteError>> + Send;
}

#[derive(Debug, Deserialize)]
struct TimingsResponse {
    data: TimingsData,
}

#[derive(Debug, Deserialize)]
struct TimingsData {
    timings: HashMap<String, String>,
}

/// HTTP client for the Aladhan timings API.
#[derive(Debug, Clone)]
pub struct AladhanClient {
    base_url: String,
    http_client: reqwest::Client,
}

impl AladhanClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            http_client: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: &RemoteConfig) -> Result<Self, RemoteError> {
        Ok(Self {
            base_url: config.timings_base_url.clone(),
            http_client: http_client(config.timeout_secs, &config.user_agent)?,
        })
    }

    /// Request URL for the given parameters.
    pub fn timings_url(
        &self,
        coordinate: Coordinate,
        method: u8,
        date: NaiveDate,
    ) -> Result<Url, RemoteError> {
        let raw = format!(
            "{}/timings/{}",
            self.base_url.trim_end_matches('/'),
            date.format("%d-%m-%Y")
        );
        let mut url = Url::parse(&raw).map_err(|_| RemoteError::InvalidUrl(raw.clone()))?;
        url.query_pairs_mut()
            .append_pair("latitude", &coordinate.latitude.to_string())
            .append_pair("longitude", &coordinate.longitude.to_string())
            .append_pair("method", &method.to_string());
        Ok(url)
    }
}

impl TimingsSource for AladhanClient {
    async fn timings(
        &self,
        coordinate: Coordinate,
        method: u8,
        date: NaiveDate,
    ) -> Result<PeriodSchedule, RemoteError> {
        let url = self.timings_url(coordinate, method, date)?;
        tracing::debug!(%url, "fetching prayer timings");

        let resp = self.http_client.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(RemoteError::InvalidResponse {
                status_code: status.as_u16(),
            });
        }

        let body = resp.bytes().await?;
        let parsed: TimingsResponse = serde_json::from_slice(&body)
            .map_err(|e| RemoteError::InvalidData(e.to_string()))?;
        Ok(PeriodSchedule::from_timings(parsed.data.timings))
    }
}
