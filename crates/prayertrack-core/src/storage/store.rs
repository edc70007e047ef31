//! Persistent settings contract.
//!
//! Every value lives under its own fixed key; the schedule is stored as the
//! JSON object it was saved as.

use chrono::NaiveDateTime;
use std::collections::HashMap;

use crate::error::DatabaseError;
use crate::period::PeriodSchedule;
use crate::remote::{Coordinate, Place, DEFAULT_METHOD};

pub mod keys {
    pub const PRAYER_TIMES: &str = "prayerTimes";
    pub const HAS_PRAYED: &str = "hasPrayed";
    /// End of the window the prayed flag was set in.
    pub const PRAYED_WINDOW: &str = "prayedWindow";
    pub const LATITUDE: &str = "latitude";
    pub const LONGITUDE: &str = "longitude";
    pub const COUNTRY: &str = "country";
    pub const CITY: &str = "city";
    pub const METHOD: &str = "method";
}

const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Key-value persistence for the schedule and scalar settings.
///
/// Implementors provide the three raw operations; the typed accessors are
/// shared.
pub trait SettingsStore: Send {
    fn get_value(&self, key: &str) -> Result<Option<String>, DatabaseError>;

    fn set_value(&mut self, key: &str, value: &str) -> Result<(), DatabaseError>;

    fn remove_value(&mut self, key: &str) -> Result<(), DatabaseError>;

    fn save_schedule(&mut self, schedule: &PeriodSchedule) -> Result<(), DatabaseError> {
        let json = serde_json::to_string(schedule).map_err(|e| DatabaseError::CorruptValue {
            key: keys::PRAYER_TIMES.into(),
            message: e.to_string(),
        })?;
        self.set_value(keys::PRAYER_TIMES, &json)
    }

    fn load_schedule(&self) -> Result<Option<PeriodSchedule>, DatabaseError> {
        let Some(json) = self.get_value(keys::PRAYER_TIMES)? else {
            return Ok(None);
        };
        serde_json::from_str(&json)
            .map(Some)
            .map_err(|e| DatabaseError::CorruptValue {
                key: keys::PRAYER_TIMES.into(),
                message: e.to_string(),
            })
    }

    fn clear_schedule(&mut self) -> Result<(), DatabaseError> {
        self.remove_value(keys::PRAYER_TIMES)
    }

    fn has_prayed(&self) -> Result<bool, DatabaseError> {
        Ok(self.get_value(keys::HAS_PRAYED)?.as_deref() == Some("true"))
    }

    fn set_has_prayed(&mut self, prayed: bool) -> Result<(), DatabaseError> {
        self.set_value(keys::HAS_PRAYED, if prayed { "true" } else { "false" })
    }

    fn prayed_window(&self) -> Result<Option<NaiveDateTime>, DatabaseError> {
        Ok(self
            .get_value(keys::PRAYED_WINDOW)?
            .and_then(|v| NaiveDateTime::parse_from_str(&v, DATETIME_FORMAT).ok()))
    }

    fn set_prayed_window(&mut self, window_end: Option<NaiveDateTime>) -> Result<(), DatabaseError> {
        match window_end {
            Some(end) => self.set_value(keys::PRAYED_WINDOW, &end.format(DATETIME_FORMAT).to_string()),
            None => self.remove_value(keys::PRAYED_WINDOW),
        }
    }

    fn coordinate(&self) -> Result<Option<Coordinate>, DatabaseError> {
        let lat = self.get_value(keys::LATITUDE)?.and_then(|v| v.parse::<f64>().ok());
        let lon = self.get_value(keys::LONGITUDE)?.and_then(|v| v.parse::<f64>().ok());
        Ok(match (lat, lon) {
            (Some(lat), Some(lon)) => Some(Coordinate::new(lat, lon)).filter(Coordinate::is_valid),
            _ => None,
        })
    }

    fn set_coordinate(&mut self, coordinate: Coordinate) -> Result<(), DatabaseError> {
        self.set_value(keys::LATITUDE, &coordinate.latitude.to_string())?;
        self.set_value(keys::LONGITUDE, &coordinate.longitude.to_string())
    }

    fn place(&self) -> Result<Place, DatabaseError> {
        Ok(Place {
            city: self.get_value(keys::CITY)?.unwrap_or_default(),
            country: self.get_value(keys::COUNTRY)?.unwrap_or_default(),
        })
    }

    fn set_place(&mut self, place: &Place) -> Result<(), DatabaseError> {
        self.set_value(keys::CITY, &place.city)?;
        self.set_value(keys::COUNTRY, &place.country)
    }

    fn method(&self) -> Result<u8, DatabaseError> {
        Ok(self
            .get_value(keys::METHOD)?
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_METHOD))
    }

    fn set_method(&mut self, method: u8) -> Result<(), DatabaseError> {
        self.set_value(keys::METHOD, &method.to_string())
    }
}

/// In-process store for tests and embedding hosts without a disk.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemoryStore {
    fn get_value(&self, key: &str) -> Result<Option<String>, DatabaseError> {
        Ok(self.values.get(key).cloned())
    }

    fn set_value(&mut self, key: &str, value: &str) -> Result<(), DatabaseError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_value(&mut self, key: &str) -> Result<(), DatabaseError> {
        self.values.remove(key);
        Ok(())
    }
}
