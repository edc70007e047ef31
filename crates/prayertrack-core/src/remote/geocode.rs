//! Reverse geocoding: coordinate -> (city, country).
//!
//! The default implementation queries a Nominatim server
//! (`GET {base}/reverse?format=jsonv2&lat=..&lon=..`).

use serde::Deserialize;
use std::future::Future;
use url::Url;

use super::{http_client, Coordinate, Place};
use crate::error::GeoError;
use crate::storage::config::RemoteConfig;

pub trait ReverseGeocoder: Send + Sync {
    fn reverse(&self, coordinate: Coordinate) -> impl Future<Output = Result<Place, GeoError>> + Send;
}

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    #[serde(default)]
    address: Option<Address>,
}

#[derive(Debug, Deserialize)]
struct Address {
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    country: Option<String>,
}

impl Address {
    /// A country is required; the locality may be absent.
    fn into_place(self) -> Option<Place> {
        let country = self.country.filter(|c| !c.is_empty())?;
        let city = self.city.or(self.town).or(self.village).unwrap_or_default();
        Some(Place { city, country })
    }
}

#[derive(Debug, Clone)]
pub struct NominatimClient {
    base_url: String,
    http_client: reqwest::Client,
}

impl NominatimClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            http_client: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: &RemoteConfig) -> Result<Self, GeoError> {
        Ok(Self {
            base_url: config.geocode_base_url.clone(),
            http_client: http_client(config.timeout_secs, &config.user_agent)?,
        })
    }

    fn reverse_url(&self, coordinate: Coordinate) -> Option<Url> {
        let mut url = Url::parse(&format!("{}/reverse", self.base_url.trim_end_matches('/'))).ok()?;
        url.query_pairs_mut()
            .append_pair("format", "jsonv2")
            .append_pair("lat", &coordinate.latitude.to_string())
            .append_pair("lon", &coordinate.longitude.to_string());
        Some(url)
    }
}

impl ReverseGeocoder for NominatimClient {
    async fn reverse(&self, coordinate: Coordinate) -> Result<Place, GeoError> {
        let failed = || GeoError::ReverseFailed { coordinate };
        let url = self.reverse_url(coordinate).ok_or_else(failed)?;

        let resp = self.http_client.get(url).send().await.map_err(|e| {
            tracing::warn!(error = %e, "reverse geocoding request failed");
            failed()
        })?;
        if !resp.status().is_success() {
            tracing::debug!(status = %resp.status(), "reverse geocoding rejected");
            return Err(failed());
        }
        let body = resp.bytes().await.map_err(|e| {
            tracing::warn!(error = %e, "reverse geocoding body unreadable");
            failed()
        })?;
        let parsed: ReverseResponse = serde_json::from_slice(&body).map_err(|_| failed())?;
        parsed
            .address
            .and_then(Address::into_place)
            .ok_or_else(failed)
    }
}
