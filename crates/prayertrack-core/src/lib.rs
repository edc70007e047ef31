//! # PrayerTrack Core Library
//!
//! This library provides the core logic for PrayerTrack, a daily prayer-times
//! tracker. All operations are available via the standalone `prayertrack`
//! CLI binary; any GUI is a thin layer over the same library.
//!
//! ## Architecture
//!
//! - **Period Engine**: A wall-clock-based state machine over the seven daily
//!   periods. The caller invokes `tick()` periodically for countdown and
//!   rollover updates
//! - **Prayer Toggle**: Swipe-to-complete gesture state machine, reset on
//!   every rollover
//! - **Settings Coordinator**: Fetches, edits and validates schedules before
//!   they reach the engine
//! - **Storage**: SQLite-based settings storage and TOML-based configuration
//!
//! ## Key Components
//!
//! - [`PeriodEngine`]: Period state machine
//! - [`PrayerTracker`]: Single owner of the engine, toggle and store
//! - [`SettingsCoordinator`]: Remote fetch and manual editing
//! - [`Database`]: Settings persistence
//! - [`Config`]: Application configuration management

pub mod clock;
pub mod coordinator;
pub mod error;
pub mod events;
pub mod period;
pub mod remote;
pub mod storage;
pub mod toggle;
pub mod tracker;

pub use clock::{Clock, FixedClock, SystemClock};
pub use coordinator::{FetchOutcome, SettingsCoordinator};
pub use error::{
    Alert, AlertError, ConfigError, CoreError, DatabaseError, GeoError, RemoteError,
    ScheduleError,
};
pub use events::{Event, ToggleSnapshot};
pub use period::{Countdown, Period, PeriodEngine, PeriodSchedule};
pub use remote::{AladhanClient, Coordinate, NominatimClient, Place};
pub use storage::{Config, Database, MemoryStore, SettingsStore};
pub use toggle::{CommitRule, DragOutcome, DragSink, PrayerToggle, ToggleState, TrackGeometry};
pub use tracker::{PrayerTracker, SharedTracker};
