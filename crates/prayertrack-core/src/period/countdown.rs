use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Non-negative whole-second time left until the next boundary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Countdown {
    secs: i64,
}

impl Countdown {
    pub const ZERO: Countdown = Countdown { secs: 0 };

    pub fn from_secs(secs: i64) -> Self {
        Self { secs: secs.max(0) }
    }

    /// `max(0, target - now)`, truncated to whole seconds.
    pub fn between(now: NaiveDateTime, target: NaiveDateTime) -> Self {
        Self::from_secs((target - now).num_seconds())
    }

    pub fn as_secs(self) -> i64 {
        self.secs
    }

    pub fn as_duration(self) -> Duration {
        Duration::seconds(self.secs)
    }

    pub fn is_zero(self) -> bool {
        self.secs == 0
    }

    pub fn hours(self) -> i64 {
        self.secs / 3600
    }

    pub fn minutes(self) -> i64 {
        self.secs % 3600 / 60
    }

    pub fn seconds(self) -> i64 {
        self.secs % 60
    }
}

impl fmt::Display for Countdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.hours(), self.minutes(), self.seconds())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 10)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn formats_zero_padded() {
        assert_eq!(Countdown::from_secs(6300).to_string(), "01:45:00");
        assert_eq!(Countdown::from_secs(59).to_string(), "00:00:59");
        assert_eq!(Countdown::from_secs(24 * 3600).to_string(), "24:00:00");
    }

    #[test]
    fn never_negative() {
        let c = Countdown::between(at(12, 0, 5), at(12, 0, 0));
        assert!(c.is_zero());
        assert_eq!(c.to_string(), "00:00:00");
    }

    #[test]
    fn truncates_partial_seconds() {
        let now = at(11, 59, 59) + Duration::milliseconds(500);
        assert!(Countdown::between(now, at(12, 0, 0)).is_zero());
    }
}
