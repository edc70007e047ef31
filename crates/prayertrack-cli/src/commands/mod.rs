pub mod config;
pub mod fetch;
pub mod method;
pub mod schedule;
pub mod status;
pub mod toggle;
pub mod watch;

use chrono::NaiveDateTime;
use prayertrack_core::{
    AladhanClient, Alert, Clock, Config, Database, NominatimClient, PrayerTracker,
    SettingsCoordinator, SystemClock,
};
use serde::Serialize;

pub type CmdResult = Result<(), Box<dyn std::error::Error>>;

pub type Coordinator = SettingsCoordinator<Database, AladhanClient, NominatimClient>;

pub fn print_json<T: Serialize>(value: &T) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn alert_error(alert: Alert) -> Box<dyn std::error::Error> {
    format!("{}: {}", alert.title, alert.message).into()
}

/// Single-threaded runtime for the async commands.
pub fn runtime() -> std::io::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
}

pub fn coordinator(config: &Config) -> Result<Coordinator, Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let timings = AladhanClient::from_config(&config.remote)?;
    let geocoder = NominatimClient::from_config(&config.remote)?;
    Ok(SettingsCoordinator::new(db, timings, geocoder)?)
}

/// Tracker over the saved schedule. Fails with the validation alert when the
/// saved schedule is missing or invalid.
pub fn tracker(
    config: &Config,
    now: NaiveDateTime,
) -> Result<PrayerTracker<Database>, Box<dyn std::error::Error>> {
    let coordinator = coordinator(config)?;
    let schedule = coordinator.commit().map_err(alert_error)?;
    Ok(PrayerTracker::new(
        coordinator.into_store(),
        schedule,
        config.geometry(),
        config.toggle.commit_rule,
        now,
    ))
}

/// `--at` override, or the local wall clock.
pub fn resolve_now(at: Option<&str>) -> Result<NaiveDateTime, Box<dyn std::error::Error>> {
    let Some(raw) = at else {
        return Ok(SystemClock.now());
    };
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .ok_or_else(|| format!("invalid --at value: {raw} (expected YYYY-MM-DDTHH:MM[:SS])").into())
}
