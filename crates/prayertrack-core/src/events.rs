use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::period::Period;
use crate::toggle::ToggleState;

/// Every state change in the system produces an Event.
/// Hosts render snapshots; the tracker reacts to rollovers.
///
/// Timestamps are local wall-clock time, the frame the schedule lives in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// Engine (re)initialized from a schedule.
    EngineInitialized {
        active: Period,
        next_boundary: NaiveDateTime,
        crossed_midnight: bool,
        /// No window contained `at`; the engine fell back to Fajr.
        degraded: bool,
        at: NaiveDateTime,
    },
    /// The countdown reached zero and the next period became active.
    PeriodRollover {
        from: Period,
        to: Period,
        next_boundary: NaiveDateTime,
        crossed_midnight: bool,
        at: NaiveDateTime,
    },
    /// A new validated schedule was swapped in.
    ScheduleReplaced {
        active: Period,
        at: NaiveDateTime,
    },
    /// The user marked the active prayer as performed.
    PrayerCompleted {
        period: Period,
        at: NaiveDateTime,
    },
    StateSnapshot {
        active: Period,
        next: Period,
        countdown: String,
        countdown_secs: i64,
        /// Fraction of the window *remaining* (1.0 just started, 0.0 about to roll over).
        progress_fraction: Option<f64>,
        crossed_midnight: bool,
        next_boundary: NaiveDateTime,
        actionable: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        toggle: Option<ToggleSnapshot>,
        at: NaiveDateTime,
    },
}

/// Toggle part of a state snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToggleSnapshot {
    pub visible: bool,
    pub completed: bool,
    pub state: ToggleState,
    pub offset: f64,
}
