//! Core error types for prayertrack-core.
//!
//! Every user-facing failure implements [`AlertError`] so hosts can surface
//! it as a titled message. None of them are fatal to the process.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

use crate::period::Period;
use crate::remote::Coordinate;

/// Core error type for prayertrack-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Schedule validation errors
    #[error("Schedule error: {0}")]
    Schedule(#[from] ScheduleError),

    /// Remote timings errors
    #[error("Remote timings error: {0}")]
    Remote(#[from] RemoteError),

    /// Location and reverse geocoding errors
    #[error("Location error: {0}")]
    Geo(#[from] GeoError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Schedule validation failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("Prayer times are incomplete (missing: {})", join_periods(.missing))]
    Incomplete { missing: Vec<Period> },

    #[error("Prayer times cover more than a day ({inversions} day changes)")]
    SpansMultipleDays { inversions: usize },

    #[error("Invalid time '{value}' for {period}, expected HH:MM")]
    MalformedTime { period: Period, value: String },
}

/// Failures of the remote timings source.
#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Server responded with status {status_code}")]
    InvalidResponse { status_code: u16 },

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// Failures of location acquisition and reverse geocoding.
#[derive(Error, Debug)]
pub enum GeoError {
    #[error("Could not resolve a place name for {coordinate}")]
    ReverseFailed { coordinate: Coordinate },

    #[error("No coordinates available yet")]
    NoCoordinatesYet,

    #[error("Location unavailable: {0}")]
    LocationUnavailable(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Unknown dot-path key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Data directory could not be determined or created
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

/// Database-specific errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Stored value could not be decoded
    #[error("Corrupt value under key '{key}': {message}")]
    CorruptValue { key: String, message: String },

    /// Database is locked
    #[error("Database is locked")]
    Locked,
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _msg) if e.code == rusqlite::ErrorCode::DatabaseLocked => {
                DatabaseError::Locked
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Database(err.into())
    }
}

impl CoreError {
    /// User-facing alert for the kinds a host should surface.
    pub fn alert(&self) -> Option<Alert> {
        match self {
            CoreError::Schedule(e) => Some(e.to_alert()),
            CoreError::Remote(e) => Some(e.to_alert()),
            CoreError::Geo(e) => Some(e.to_alert()),
            _ => None,
        }
    }
}

/// An error that can be shown to the user as a titled message.
pub trait AlertError: std::error::Error {
    fn title(&self) -> String;

    fn message(&self) -> String {
        self.to_string()
    }

    fn to_alert(&self) -> Alert {
        Alert {
            title: self.title(),
            message: self.message(),
        }
    }
}

impl AlertError for ScheduleError {
    fn title(&self) -> String {
        match self {
            ScheduleError::Incomplete { .. } => "Incomplete Prayer Times".into(),
            ScheduleError::SpansMultipleDays { .. } => "Prayer Times Not Within A Day".into(),
            ScheduleError::MalformedTime { .. } => "Invalid Prayer Time".into(),
        }
    }

    fn message(&self) -> String {
        match self {
            ScheduleError::Incomplete { .. } => {
                "Please fill in the time of every period before leaving the settings.".into()
            }
            ScheduleError::SpansMultipleDays { .. } => {
                "The prayer times you entered cover more than a single day.".into()
            }
            other => other.to_string(),
        }
    }
}

impl AlertError for RemoteError {
    fn title(&self) -> String {
        match self {
            RemoteError::InvalidUrl(_) => "Invalid URL".into(),
            RemoteError::InvalidResponse { .. } => "Server Error".into(),
            RemoteError::InvalidData(_) => "Invalid Data".into(),
            RemoteError::Network(_) => "Network Error".into(),
        }
    }

    fn message(&self) -> String {
        match self {
            RemoteError::InvalidUrl(url) => format!("The prayer times URL is invalid: {url}"),
            RemoteError::InvalidResponse { status_code } => {
                format!("The prayer times server responded with status code {status_code}.")
            }
            RemoteError::InvalidData(_) => "The prayer times received could not be read.".into(),
            RemoteError::Network(e) => format!("Could not reach the prayer times server: {e}"),
        }
    }
}

impl AlertError for GeoError {
    fn title(&self) -> String {
        match self {
            GeoError::ReverseFailed { .. } => "Location Error".into(),
            GeoError::NoCoordinatesYet => "No Location".into(),
            GeoError::LocationUnavailable(_) => "Location Unavailable".into(),
            GeoError::Network(_) => "Network Error".into(),
        }
    }

    fn message(&self) -> String {
        match self {
            GeoError::ReverseFailed { coordinate } => {
                format!("Could not find the city and country at {coordinate}.")
            }
            GeoError::NoCoordinatesYet => {
                "Your location has not been determined yet. Use your current location first.".into()
            }
            other => other.to_string(),
        }
    }
}

/// A titled, user-facing message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub title: String,
    pub message: String,
}

impl Alert {
    /// Geocoding and timings both failed: one alert carrying both messages.
    pub fn combined(geo: &GeoError, remote: &RemoteError) -> Self {
        Self {
            title: "Errors".into(),
            message: format!("{}\n{}", geo.message(), remote.message()),
        }
    }
}

fn join_periods(periods: &[Period]) -> String {
    periods
        .iter()
        .map(|p| p.name())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
