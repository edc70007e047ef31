//! Collaborators that feed the coordinator: remote timings, reverse
//! geocoding and the device location.
//!
//! Each collaborator is a trait so hosts and tests can substitute their own
//! source; the HTTP implementations here are the defaults.

pub mod geocode;
pub mod location;
pub mod methods;
pub mod timings;

pub use geocode::{NominatimClient, ReverseGeocoder};
pub use location::{FixedLocation, LocationProvider};
pub use methods::{all_methods, method_name, CalculationMethod, CALCULATION_METHODS, DEFAULT_METHOD};
pub use timings::{AladhanClient, TimingsSource};

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Both components finite and within their geographic ranges.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// Reverse-geocoded place name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Place {
    pub city: String,
    pub country: String,
}

fn http_client(
    timeout_secs: u64,
    user_agent: &str,
) -> Result<reqwest::Client, reqwest::Error> {
    let mut builder = reqwest::Client::builder().user_agent(user_agent.to_string());
    if timeout_secs > 0 {
        builder = builder.timeout(std::time::Duration::from_secs(timeout_secs));
    }
    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinate_display_and_range() {
        let c = Coordinate::new(21.42251, 39.82616);
        assert_eq!(c.to_string(), "21.4225, 39.8262");
        assert!(c.is_valid());
        assert!(!Coordinate::new(f64::INFINITY, 0.0).is_valid());
        assert!(!Coordinate::new(91.0, 0.0).is_valid());
    }
}
