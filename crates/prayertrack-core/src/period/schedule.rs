//! The day's prayer-time boundaries and their validation.
//!
//! Times are kept as the `HH:MM` strings they arrive as. Ordering checks use
//! plain string comparison, which is exact for zero-padded 24-hour values.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::kind::{Period, PERIOD_COUNT};
use crate::error::ScheduleError;

/// Mapping from period to its `HH:MM` start time for the current day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PeriodSchedule {
    times: BTreeMap<Period, String>,
}

impl PeriodSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reference schedule, also used as picker defaults for manual entry.
    pub fn sample() -> Self {
        Self::from_timings([
            ("Fajr", "04:30"),
            ("Sunrise", "05:45"),
            ("Dhuhr", "12:00"),
            ("Asr", "16:55"),
            ("Maghrib", "20:15"),
            ("Isha", "22:05"),
            ("Midnight", "00:45"),
        ])
    }

    /// Build from a name -> time mapping such as a remote payload.
    ///
    /// Unknown names (Imsak, Sunset, ...) are dropped and anything after the
    /// first whitespace-separated token is ignored ("05:12 (CEST)").
    pub fn from_timings<I, K, V>(timings: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let times = timings
            .into_iter()
            .filter_map(|(name, value)| {
                let period = name.as_ref().parse::<Period>().ok()?;
                let value = value.as_ref().split_whitespace().next().unwrap_or("");
                Some((period, value.to_string()))
            })
            .collect();
        Self { times }
    }

    pub fn get(&self, period: Period) -> Option<&str> {
        self.times.get(&period).map(String::as_str)
    }

    /// Replace a single period's value (manual edit).
    pub fn set(&mut self, period: Period, value: impl Into<String>) {
        self.times.insert(period, value.into());
    }

    /// Replace a single period's value from picker components.
    pub fn set_time(&mut self, period: Period, hour: u32, minute: u32) {
        self.set(period, format!("{hour:02}:{minute:02}"));
    }

    pub fn iter(&self) -> impl Iterator<Item = (Period, &str)> {
        self.times.iter().map(|(p, v)| (*p, v.as_str()))
    }

    /// Parsed start time of `period`, if present and well formed.
    pub fn time_of(&self, period: Period) -> Option<NaiveTime> {
        self.get(period).and_then(parse_hhmm)
    }

    /// Periods with no value or an empty value.
    pub fn missing(&self) -> Vec<Period> {
        Period::ALL
            .iter()
            .copied()
            .filter(|p| self.get(*p).map_or(true, str::is_empty))
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing().is_empty()
    }

    /// Number of adjacent cyclic pairs whose start is later than the next start.
    pub fn inversions(&self) -> usize {
        (0..PERIOD_COUNT)
            .filter(|&i| {
                let from = self.get(Period::from_index(i));
                let to = self.get(Period::from_index(i + 1));
                matches!((from, to), (Some(a), Some(b)) if a > b)
            })
            .count()
    }

    /// At most one day change across the cycle.
    pub fn is_within_single_day(&self) -> bool {
        self.inversions() < 2
    }

    pub fn validate(&self) -> Result<(), ScheduleError> {
        let missing = self.missing();
        if !missing.is_empty() {
            return Err(ScheduleError::Incomplete { missing });
        }
        let inversions = self.inversions();
        if inversions >= 2 {
            return Err(ScheduleError::SpansMultipleDays { inversions });
        }
        for (period, value) in self.iter() {
            if parse_hhmm(value).is_none() {
                return Err(ScheduleError::MalformedTime {
                    period,
                    value: value.to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Parse a zero-padded 24-hour `HH:MM` string.
pub(crate) fn parse_hhmm(value: &str) -> Option<NaiveTime> {
    let bytes = value.as_bytes();
    if bytes.len() != 5 || bytes[2] != b':' {
        return None;
    }
    NaiveTime::parse_from_str(value, "%H:%M").ok()
}
