//! Settings glue: fetches, edits and validates the schedule before it ever
//! reaches the engine.
//!
//! A fetched or edited schedule is persisted verbatim into the working copy.
//! Only [`SettingsCoordinator::commit`] hands a schedule to the engine, and
//! only once it validates.

use chrono::NaiveTime;
use std::sync::Arc;
use tracing::{info, warn};

use crate::clock::{Clock, SystemClock};
use crate::error::{Alert, AlertError, ConfigError, CoreError, DatabaseError, GeoError, RemoteError, ScheduleError};
use crate::period::{Period, PeriodSchedule};
use crate::remote::{
    Coordinate, LocationProvider, Place, ReverseGeocoder, TimingsSource, CALCULATION_METHODS,
};
use crate::storage::SettingsStore;

/// Result of the concurrent geocode + timings request.
#[derive(Debug)]
pub enum FetchOutcome {
    Both {
        place: Place,
        schedule: PeriodSchedule,
    },
    TimingsFailed {
        place: Place,
        error: RemoteError,
    },
    GeocodeFailed {
        schedule: PeriodSchedule,
        error: GeoError,
    },
    BothFailed {
        geo: GeoError,
        remote: RemoteError,
    },
}

impl FetchOutcome {
    pub fn from_results(
        geo: Result<Place, GeoError>,
        timings: Result<PeriodSchedule, RemoteError>,
    ) -> Self {
        match (geo, timings) {
            (Ok(place), Ok(schedule)) => FetchOutcome::Both { place, schedule },
            (Ok(place), Err(error)) => FetchOutcome::TimingsFailed { place, error },
            (Err(error), Ok(schedule)) => FetchOutcome::GeocodeFailed { schedule, error },
            (Err(geo), Err(remote)) => FetchOutcome::BothFailed { geo, remote },
        }
    }

    pub fn place(&self) -> Option<&Place> {
        match self {
            FetchOutcome::Both { place, .. } | FetchOutcome::TimingsFailed { place, .. } => {
                Some(place)
            }
            _ => None,
        }
    }

    pub fn schedule(&self) -> Option<&PeriodSchedule> {
        match self {
            FetchOutcome::Both { schedule, .. } | FetchOutcome::GeocodeFailed { schedule, .. } => {
                Some(schedule)
            }
            _ => None,
        }
    }

    /// The alert to show, if anything failed.
    pub fn alert(&self) -> Option<Alert> {
        match self {
            FetchOutcome::Both { .. } => None,
            FetchOutcome::TimingsFailed { error, .. } => Some(error.to_alert()),
            FetchOutcome::GeocodeFailed { error, .. } => Some(error.to_alert()),
            FetchOutcome::BothFailed { geo, remote } => Some(Alert::combined(geo, remote)),
        }
    }

    /// Short name of the outcome, for logs and JSON output.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchOutcome::Both { .. } => "both",
            FetchOutcome::TimingsFailed { .. } => "timings_failed",
            FetchOutcome::GeocodeFailed { .. } => "geocode_failed",
            FetchOutcome::BothFailed { .. } => "both_failed",
        }
    }
}

pub struct SettingsCoordinator<S, T, G> {
    store: S,
    timings: T,
    geocoder: G,
    clock: Arc<dyn Clock>,
    working: PeriodSchedule,
}

impl<S, T, G> SettingsCoordinator<S, T, G>
where
    S: SettingsStore,
    T: TimingsSource,
    G: ReverseGeocoder,
{
    /// Start from the persisted schedule, or an empty one.
    pub fn new(store: S, timings: T, geocoder: G) -> Result<Self, DatabaseError> {
        let working = store.load_schedule()?.unwrap_or_default();
        Ok(Self {
            store,
            timings,
            geocoder,
            clock: Arc::new(SystemClock),
            working,
        })
    }

    /// Use `clock` for the fetch date.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Schedule as last fetched or edited, not necessarily valid.
    pub fn working_schedule(&self) -> &PeriodSchedule {
        &self.working
    }

    // ── Remote ───────────────────────────────────────────────────────

    /// Store `coordinate`, then geocode it and fetch its timings concurrently.
    ///
    /// Whatever succeeded is persisted; the outcome carries the alert for
    /// whatever did not.
    pub async fn update_from_location(
        &mut self,
        coordinate: Coordinate,
    ) -> Result<FetchOutcome, DatabaseError> {
        self.store.set_coordinate(coordinate)?;
        let method = self.store.method()?;
        let date = self.clock.now().date();

        let (geo, timings) = tokio::join!(
            self.geocoder.reverse(coordinate),
            self.timings.timings(coordinate, method, date),
        );
        let outcome = FetchOutcome::from_results(geo, timings);
        info!(%coordinate, method, outcome = outcome.kind(), "location update finished");

        if let Some(schedule) = outcome.schedule() {
            self.replace_working(schedule.clone())?;
        }
        if let Some(place) = outcome.place() {
            self.store.set_place(place)?;
        }
        Ok(outcome)
    }

    /// Fetch timings again for the stored coordinate and method.
    pub async fn refresh(&mut self) -> Result<PeriodSchedule, CoreError> {
        let coordinate = self.store.coordinate()?.ok_or(GeoError::NoCoordinatesYet)?;
        let method = self.store.method()?;
        let date = self.clock.now().date();
        let schedule = self.timings.timings(coordinate, method, date).await?;
        info!(%coordinate, method, %date, "timings refreshed");
        self.replace_working(schedule.clone())?;
        Ok(schedule)
    }

    /// One-shot location request. A failure is logged and leaves the
    /// settings untouched.
    pub async fn request_location<P: LocationProvider>(
        &mut self,
        provider: &P,
    ) -> Result<Option<FetchOutcome>, DatabaseError> {
        match provider.current_location().await {
            Ok(coordinate) => self.update_from_location(coordinate).await.map(Some),
            Err(e) => {
                warn!(error = %e, "location request failed");
                Ok(None)
            }
        }
    }

    // ── Manual editing ───────────────────────────────────────────────

    /// Initial picker value: the current time, or the sample default.
    pub fn picker_time(&self, period: Period) -> NaiveTime {
        self.working
            .time_of(period)
            .or_else(|| PeriodSchedule::sample().time_of(period))
            .unwrap_or(NaiveTime::MIN)
    }

    pub fn save_manual_time(
        &mut self,
        period: Period,
        hour: u32,
        minute: u32,
    ) -> Result<(), CoreError> {
        if hour > 23 || minute > 59 {
            return Err(ScheduleError::MalformedTime {
                period,
                value: format!("{hour:02}:{minute:02}"),
            }
            .into());
        }
        self.working.set_time(period, hour, minute);
        self.store.save_schedule(&self.working)?;
        Ok(())
    }

    /// Replace the whole working schedule, e.g. from an import.
    pub fn replace_working(&mut self, schedule: PeriodSchedule) -> Result<(), DatabaseError> {
        self.store.save_schedule(&schedule)?;
        self.working = schedule;
        Ok(())
    }

    pub fn clear(&mut self) -> Result<(), DatabaseError> {
        self.store.clear_schedule()?;
        self.working = PeriodSchedule::new();
        Ok(())
    }

    /// Validate the working schedule for hand-off to the engine.
    pub fn commit(&self) -> Result<PeriodSchedule, Alert> {
        match self.working.validate() {
            Ok(()) => Ok(self.working.clone()),
            Err(e) => {
                warn!(error = %e, "schedule rejected");
                Err(e.to_alert())
            }
        }
    }

    // ── Calculation method ───────────────────────────────────────────

    pub fn method(&self) -> Result<u8, DatabaseError> {
        self.store.method()
    }

    pub fn set_method(&mut self, index: u8) -> Result<(), CoreError> {
        if usize::from(index) >= CALCULATION_METHODS.len() {
            return Err(ConfigError::InvalidValue {
                key: "method".into(),
                message: format!(
                    "expected 0..{}, got {index}",
                    CALCULATION_METHODS.len() - 1
                ),
            }
            .into());
        }
        self.store.set_method(index)?;
        Ok(())
    }
}
