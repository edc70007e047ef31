use std::future::Future;

use super::Coordinate;
use crate::error::GeoError;

/// One-shot "current location" request.
pub trait LocationProvider: Send + Sync {
    fn current_location(&self) -> impl Future<Output = Result<Coordinate, GeoError>> + Send;
}

/// A provider backed by a known coordinate (configuration or command line).
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedLocation {
    coordinate: Option<Coordinate>,
}

impl FixedLocation {
    pub fn new(coordinate: Coordinate) -> Self {
        Self {
            coordinate: Some(coordinate),
        }
    }

    pub fn unavailable() -> Self {
        Self { coordinate: None }
    }
}

impl From<Option<Coordinate>> for FixedLocation {
    fn from(coordinate: Option<Coordinate>) -> Self {
        Self { coordinate }
    }
}

impl LocationProvider for FixedLocation {
    async fn current_location(&self) -> Result<Coordinate, GeoError> {
        match self.coordinate {
            Some(c) if c.is_valid() => Ok(c),
            Some(c) => Err(GeoError::LocationUnavailable(format!("coordinate out of range: {c}"))),
            None => Err(GeoError::LocationUnavailable("no location configured".into())),
        }
    }
}
