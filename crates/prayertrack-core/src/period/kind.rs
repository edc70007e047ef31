use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of named boundaries in one cycle.
pub const PERIOD_COUNT: usize = 7;

/// One of the seven prayer-time boundaries, in cyclic order.
///
/// Serialized by English name (`"Fajr"`, `"Sunrise"`, ...), which is also the
/// key used by the remote timings payload and the persisted schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Period {
    Fajr,
    Sunrise,
    Dhuhr,
    Asr,
    Maghrib,
    Isha,
    Midnight,
}

impl Period {
    pub const ALL: [Period; PERIOD_COUNT] = [
        Period::Fajr,
        Period::Sunrise,
        Period::Dhuhr,
        Period::Asr,
        Period::Maghrib,
        Period::Isha,
        Period::Midnight,
    ];

    /// Period at `index`, wrapping cyclically (7 -> Fajr).
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % PERIOD_COUNT]
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn next(self) -> Self {
        Self::from_index(self.index() + 1)
    }

    pub fn previous(self) -> Self {
        Self::from_index(self.index() + PERIOD_COUNT - 1)
    }

    /// Whether the completion toggle is offered while this period is active.
    ///
    /// Sunrise and Midnight mark the end of a prayer window, not a prayer.
    pub fn is_actionable(self) -> bool {
        !matches!(self, Period::Sunrise | Period::Midnight)
    }

    pub fn name(self) -> &'static str {
        match self {
            Period::Fajr => "Fajr",
            Period::Sunrise => "Sunrise",
            Period::Dhuhr => "Dhuhr",
            Period::Asr => "Asr",
            Period::Maghrib => "Maghrib",
            Period::Isha => "Isha",
            Period::Midnight => "Midnight",
        }
    }
}

/// Free-function form used by hosts that only track the raw index.
pub fn is_actionable(active_index: usize) -> bool {
    Period::from_index(active_index).is_actionable()
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Period::ALL
            .iter()
            .copied()
            .find(|p| p.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown period: {s}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_wraps_cyclically() {
        assert_eq!(Period::from_index(7), Period::Fajr);
        assert_eq!(Period::Midnight.next(), Period::Fajr);
        assert_eq!(Period::Fajr.previous(), Period::Midnight);
        assert_eq!(Period::Asr.index(), 3);
    }

    #[test]
    fn sunrise_and_midnight_are_not_actionable() {
        let actionable: Vec<_> = Period::ALL.iter().filter(|p| p.is_actionable()).collect();
        assert_eq!(actionable.len(), 5);
        assert!(!is_actionable(1));
        assert!(!is_actionable(6));
        assert!(is_actionable(5));
    }

    #[test]
    fn parses_names_case_insensitively() {
        assert_eq!("maghrib".parse::<Period>().unwrap(), Period::Maghrib);
        assert_eq!(" Isha ".parse::<Period>().unwrap(), Period::Isha);
        assert!("Imsak".parse::<Period>().is_err());
    }

    #[test]
    fn serializes_by_name() {
        assert_eq!(serde_json::to_string(&Period::Dhuhr).unwrap(), "\"Dhuhr\"");
    }
}
