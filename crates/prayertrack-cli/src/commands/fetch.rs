use clap::Args;
use prayertrack_core::remote::FixedLocation;
use prayertrack_core::{Config, Coordinate};
use serde_json::json;

use super::{alert_error, coordinator, print_json, runtime, CmdResult};

#[derive(Args)]
pub struct FetchArgs {
    /// Latitude in degrees (defaults to location.latitude)
    #[arg(long, allow_negative_numbers = true, requires = "lon")]
    lat: Option<f64>,
    /// Longitude in degrees (defaults to location.longitude)
    #[arg(long, allow_negative_numbers = true, requires = "lat")]
    lon: Option<f64>,
    /// Calculation method id to use and remember
    #[arg(long)]
    method: Option<u8>,
}

pub fn run(args: FetchArgs) -> CmdResult {
    let config = Config::load_or_default();
    let mut coordinator = coordinator(&config)?;
    if let Some(method) = args.method {
        coordinator.set_method(method)?;
    }

    let location = match (args.lat, args.lon) {
        (Some(lat), Some(lon)) => FixedLocation::new(Coordinate::new(lat, lon)),
        _ => FixedLocation::from(config.default_location()),
    };

    let outcome = runtime()?.block_on(coordinator.request_location(&location))?;
    let Some(outcome) = outcome else {
        return Err("location unavailable: pass --lat/--lon or set location.latitude and location.longitude".into());
    };

    let alert = outcome.alert();
    print_json(&json!({
        "outcome": outcome.kind(),
        "place": outcome.place(),
        "schedule": outcome.schedule(),
        "alert": alert,
    }))?;
    match alert {
        Some(alert) => Err(alert_error(alert)),
        None => Ok(()),
    }
}

pub fn refresh() -> CmdResult {
    let config = Config::load_or_default();
    let mut coordinator = coordinator(&config)?;
    let schedule = runtime()?
        .block_on(coordinator.refresh())
        .map_err(|e| match e.alert() {
            Some(alert) => alert_error(alert),
            None => e.into(),
        })?;
    print_json(&schedule)
}
