//! Prayer period engine.
//!
//! The engine is a wall-clock-based state machine over the seven cyclic
//! periods. It does not own a clock or a thread - the caller passes the
//! current local time to `tick()` (once per second in practice).
//!
//! ## State Transitions
//!
//! ```text
//! Fajr -> Sunrise -> Dhuhr -> Asr -> Maghrib -> Isha -> Midnight -> Fajr
//! ```
//!
//! A transition (rollover) happens when the countdown to the next boundary
//! reaches zero. A window whose end time is not later than its start time
//! crosses local midnight and ends on the following calendar day.
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = PeriodEngine::new(schedule, now);
//! // In a loop:
//! for event in engine.tick(now) { /* PeriodRollover */ }
//! println!("{}", engine.countdown());
//! ```

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use tracing::{debug, info, warn};

use super::countdown::Countdown;
use super::kind::{Period, PERIOD_COUNT};
use super::schedule::PeriodSchedule;
use crate::events::Event;

/// Result of locating the window that contains a time of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveWindow {
    pub period: Period,
    pub crossed_midnight: bool,
    /// False when no window matched and the lookup fell back to Fajr.
    pub matched: bool,
}

/// Find the period whose half-open window `[time[i], time[i+1])` contains `now`.
///
/// Scans from Fajr; the first containing window wins. Falls back to Fajr when
/// nothing matches, which only happens for schedules that skipped validation.
pub fn locate_active_period(schedule: &PeriodSchedule, now: NaiveTime) -> ActiveWindow {
    let now = now.format("%H:%M").to_string();
    for i in 0..PERIOD_COUNT {
        let period = Period::from_index(i);
        if let Some(crossed_midnight) = window_contains(schedule, period, &now) {
            return ActiveWindow {
                period,
                crossed_midnight,
                matched: true,
            };
        }
    }
    ActiveWindow {
        period: Period::Fajr,
        crossed_midnight: crosses_midnight(schedule, Period::Fajr),
        matched: false,
    }
}

/// `Some(crossed_midnight)` if `now` lies in the window starting at `period`.
fn window_contains(schedule: &PeriodSchedule, period: Period, now: &str) -> Option<bool> {
    let start = schedule.get(period)?;
    let end = schedule.get(period.next())?;
    if start < end {
        (start <= now && now < end).then_some(false)
    } else {
        // Outside the short complementary interval [end, start).
        (!(end <= now && now < start)).then_some(true)
    }
}

/// Whether the window starting at `period` ends on the following day.
///
/// Equal boundaries describe a full 24-hour window.
pub fn crosses_midnight(schedule: &PeriodSchedule, period: Period) -> bool {
    match (schedule.get(period), schedule.get(period.next())) {
        (Some(start), Some(end)) => start >= end,
        _ => false,
    }
}

/// Absolute instant at which the window starting at `active` ends.
///
/// `window_date` is the date the window opened on; a midnight-crossing window
/// ends on the day after. Returns `None` when the next boundary is unparseable.
pub fn anchor_next_boundary(
    schedule: &PeriodSchedule,
    active: Period,
    crossed_midnight: bool,
    window_date: NaiveDate,
) -> Option<NaiveDateTime> {
    let time = schedule.time_of(active.next())?;
    let date = if crossed_midnight {
        window_date.succ_opt()?
    } else {
        window_date
    };
    Some(date.and_time(time))
}

/// Date on which the window containing `now` opened.
///
/// Past midnight inside a crossing window, the window opened yesterday.
fn window_date(schedule: &PeriodSchedule, window: &ActiveWindow, now: NaiveDateTime) -> NaiveDate {
    let today = now.date();
    if !window.crossed_midnight {
        return today;
    }
    let now_hhmm = now.format("%H:%M").to_string();
    match schedule.get(window.period) {
        Some(start) if now_hhmm.as_str() < start => today.pred_opt().unwrap_or(today),
        _ => today,
    }
}

/// Core period engine.
///
/// Operates on caller-supplied local wall-clock time -- no internal clock.
#[derive(Debug, Clone)]
pub struct PeriodEngine {
    schedule: PeriodSchedule,
    active: Period,
    crossed_midnight: bool,
    next_boundary: NaiveDateTime,
    countdown: Countdown,
    progress_fraction: Option<f64>,
    degraded: bool,
}

impl PeriodEngine {
    /// Create an engine positioned on the window containing `now`.
    ///
    /// The countdown is computed immediately; `progress_fraction` stays
    /// undefined until the first `tick()`.
    pub fn new(schedule: PeriodSchedule, now: NaiveDateTime) -> Self {
        let mut engine = Self {
            schedule,
            active: Period::Fajr,
            crossed_midnight: false,
            next_boundary: now,
            countdown: Countdown::ZERO,
            progress_fraction: None,
            degraded: false,
        };
        engine.initialize(now);
        engine
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn schedule(&self) -> &PeriodSchedule {
        &self.schedule
    }

    pub fn active(&self) -> Period {
        self.active
    }

    pub fn active_index(&self) -> usize {
        self.active.index()
    }

    /// Period that ended when the active window opened.
    pub fn previous_period(&self) -> Period {
        self.active.previous()
    }

    /// Period whose start the countdown targets.
    pub fn next_period(&self) -> Period {
        self.active.next()
    }

    pub fn is_actionable(&self) -> bool {
        self.active.is_actionable()
    }

    pub fn crossed_midnight(&self) -> bool {
        self.crossed_midnight
    }

    pub fn next_boundary(&self) -> NaiveDateTime {
        self.next_boundary
    }

    pub fn countdown(&self) -> Countdown {
        self.countdown
    }

    /// Fraction of the current window still *remaining*.
    ///
    /// 1.0 when the window just opened, 0.0 right before rollover.
    pub fn progress_fraction(&self) -> Option<f64> {
        self.progress_fraction
    }

    /// True when the last lookup found no containing window.
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    /// Window length in seconds, 24h added for midnight-crossing windows.
    pub fn window_secs(&self) -> Option<i64> {
        let start = self.schedule.time_of(self.active)?;
        let end = self.schedule.time_of(self.active.next())?;
        let mut secs = end.signed_duration_since(start).num_seconds();
        if self.crossed_midnight {
            secs += 24 * 3600;
        }
        (secs > 0).then_some(secs)
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self, now: NaiveDateTime) -> Event {
        Event::StateSnapshot {
            active: self.active,
            next: self.next_period(),
            countdown: self.countdown.to_string(),
            countdown_secs: self.countdown.as_secs(),
            progress_fraction: self.progress_fraction,
            crossed_midnight: self.crossed_midnight,
            next_boundary: self.next_boundary,
            actionable: self.is_actionable(),
            toggle: None,
            at: now,
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Swap in a new schedule and re-initialize from scratch.
    pub fn set_schedule(&mut self, schedule: PeriodSchedule, now: NaiveDateTime) -> Event {
        self.schedule = schedule;
        self.initialize(now)
    }

    /// Call periodically. Returns one `PeriodRollover` per boundary crossed.
    pub fn tick(&mut self, now: NaiveDateTime) -> Vec<Event> {
        let mut events = Vec::new();
        self.countdown = Countdown::between(now, self.next_boundary);
        if self.started_after(now) {
            let before = (self.active, self.next_boundary);
            let event = self.initialize(now);
            if (self.active, self.next_boundary) != before {
                warn!(
                    from = %before.0,
                    to = %self.active,
                    now = %now,
                    "clock moved backwards, re-initialized"
                );
                events.push(event);
            }
        }
        let mut rollovers = 0;
        while self.countdown.is_zero() {
            if rollovers == PERIOD_COUNT {
                warn!(
                    next_boundary = %self.next_boundary,
                    now = %now,
                    "clock moved past a full cycle, re-initializing"
                );
                events.push(self.initialize(now));
                break;
            }
            events.push(self.roll_over(now));
            rollovers += 1;
            self.countdown = Countdown::between(now, self.next_boundary);
        }
        self.progress_fraction = self.compute_progress();
        events
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// The active window opens after `now`, i.e. the clock went back.
    fn started_after(&self, now: NaiveDateTime) -> bool {
        !self.degraded
            && self
                .window_secs()
                .is_some_and(|window| Countdown::between(now, self.next_boundary).as_secs() > window)
    }

    /// Cold (re)initialization: locate + anchor, discarding prior state.
    fn initialize(&mut self, now: NaiveDateTime) -> Event {
        let window = locate_active_period(&self.schedule, now.time());
        if !window.matched {
            warn!(
                now = %now.format("%H:%M"),
                "no period window contains the current time, defaulting to Fajr"
            );
        }
        let date = window_date(&self.schedule, &window, now);
        self.active = window.period;
        self.crossed_midnight = window.crossed_midnight;
        self.degraded = !window.matched;
        self.next_boundary = self.anchor_or_fallback(date, now);
        self.countdown = Countdown::between(now, self.next_boundary);
        self.progress_fraction = None;
        debug!(
            active = %self.active,
            next_boundary = %self.next_boundary,
            crossed_midnight = self.crossed_midnight,
            "period engine initialized"
        );
        Event::EngineInitialized {
            active: self.active,
            next_boundary: self.next_boundary,
            crossed_midnight: self.crossed_midnight,
            degraded: self.degraded,
            at: now,
        }
    }

    fn roll_over(&mut self, now: NaiveDateTime) -> Event {
        let from = self.active;
        let reached = self.next_boundary;
        self.active = from.next();
        self.crossed_midnight = crosses_midnight(&self.schedule, self.active);
        self.degraded = false;
        self.next_boundary = self.anchor_or_fallback(reached.date(), reached);
        info!(
            from = %from,
            to = %self.active,
            next_boundary = %self.next_boundary,
            "period rollover"
        );
        Event::PeriodRollover {
            from,
            to: self.active,
            next_boundary: self.next_boundary,
            crossed_midnight: self.crossed_midnight,
            at: now,
        }
    }

    fn anchor_or_fallback(&self, window_date: NaiveDate, from: NaiveDateTime) -> NaiveDateTime {
        anchor_next_boundary(&self.schedule, self.active, self.crossed_midnight, window_date)
            .filter(|anchor| *anchor > from)
            .unwrap_or_else(|| {
                warn!(
                    period = %self.active.next(),
                    "next boundary is unusable, holding until the next midnight"
                );
                (from.date() + Duration::days(1)).and_time(NaiveTime::MIN)
            })
    }

    fn compute_progress(&self) -> Option<f64> {
        let window = self.window_secs()?;
        Some((self.countdown.as_secs() as f64 / window as f64).clamp(0.0, 1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn at(d: u32, h: u32, m: u32, s: u32) -> NaiveDateTime {
        day(d).and_hms_opt(h, m, s).unwrap()
    }

    #[test]
    fn isha_at_eleven_pm_crosses_midnight() {
        let mut engine = PeriodEngine::new(PeriodSchedule::sample(), at(10, 23, 0, 0));
        assert_eq!(engine.active(), Period::Isha);
        assert_eq!(engine.active_index(), 5);
        assert!(engine.crossed_midnight());
        assert_eq!(engine.next_boundary(), at(11, 0, 45, 0));
        assert!(engine.tick(at(10, 23, 0, 0)).is_empty());
        assert_eq!(engine.countdown().to_string(), "01:45:00");
    }

    #[test]
    fn just_past_midnight_boundary_is_not_actionable() {
        let engine = PeriodEngine::new(PeriodSchedule::sample(), at(10, 0, 50, 0));
        assert_eq!(engine.active(), Period::Midnight);
        assert!(!engine.is_actionable());
        assert!(!engine.crossed_midnight());
        assert_eq!(engine.next_boundary(), at(10, 4, 30, 0));
    }

    #[test]
    fn after_midnight_inside_crossing_window_targets_today() {
        let engine = PeriodEngine::new(PeriodSchedule::sample(), at(11, 0, 10, 0));
        assert_eq!(engine.active(), Period::Isha);
        assert!(engine.crossed_midnight());
        assert_eq!(engine.next_boundary(), at(11, 0, 45, 0));
        assert_eq!(engine.countdown().as_secs(), 35 * 60);
    }

    #[test]
    fn window_start_is_inclusive() {
        let engine = PeriodEngine::new(PeriodSchedule::sample(), at(10, 12, 0, 0));
        assert_eq!(engine.active(), Period::Dhuhr);
    }

    #[test]
    fn tick_rolls_over_exactly_once_per_boundary() {
        let mut engine = PeriodEngine::new(PeriodSchedule::sample(), at(10, 16, 54, 0));
        assert_eq!(engine.active(), Period::Dhuhr);

        let events = engine.tick(at(10, 16, 55, 0));
        assert_eq!(events.len(), 1);
        assert!(matches!(
            events[0],
            Event::PeriodRollover { from: Period::Dhuhr, to: Period::Asr, .. }
        ));
        assert_eq!(engine.next_boundary(), at(10, 20, 15, 0));

        // Ticking again at the same instant must not fire again.
        assert!(engine.tick(at(10, 16, 55, 0)).is_empty());
        assert!(engine.tick(at(10, 16, 55, 1)).is_empty());
        assert_eq!(engine.active(), Period::Asr);
    }

    #[test]
    fn rollover_into_crossing_window_anchors_next_day() {
        let mut engine = PeriodEngine::new(PeriodSchedule::sample(), at(10, 22, 0, 0));
        assert_eq!(engine.active(), Period::Maghrib);
        let events = engine.tick(at(10, 22, 5, 0));
        assert_eq!(events.len(), 1);
        assert_eq!(engine.active(), Period::Isha);
        assert!(engine.crossed_midnight());
        assert_eq!(engine.next_boundary(), at(11, 0, 45, 0));

        engine.tick(at(11, 0, 45, 0));
        assert_eq!(engine.active(), Period::Midnight);
        assert!(!engine.crossed_midnight());
        assert_eq!(engine.next_boundary(), at(11, 4, 30, 0));
    }

    #[test]
    fn skipped_boundaries_each_produce_a_rollover() {
        let mut engine = PeriodEngine::new(PeriodSchedule::sample(), at(10, 4, 0, 0));
        assert_eq!(engine.active(), Period::Midnight);
        // Sleep through Fajr, Sunrise and Dhuhr.
        let events = engine.tick(at(10, 13, 0, 0));
        assert_eq!(events.len(), 3);
        assert_eq!(engine.active(), Period::Dhuhr);
        assert_eq!(engine.countdown().as_secs(), (3 * 60 + 55) * 60);
    }

    #[test]
    fn clock_jump_past_full_cycle_reinitializes() {
        let mut engine = PeriodEngine::new(PeriodSchedule::sample(), at(10, 13, 0, 0));
        let events = engine.tick(at(13, 13, 0, 0));
        assert!(matches!(events.last(), Some(Event::EngineInitialized { .. })));
        assert_eq!(engine.active(), Period::Dhuhr);
        assert_eq!(engine.next_boundary(), at(13, 16, 55, 0));
    }

    #[test]
    fn clock_moving_backwards_reinitializes() {
        let mut engine = PeriodEngine::new(PeriodSchedule::sample(), at(10, 13, 0, 0));
        assert_eq!(engine.active(), Period::Dhuhr);

        let events = engine.tick(at(10, 10, 0, 0));
        assert_eq!(events.len(), 1);
        assert!(matches!(
            events[0],
            Event::EngineInitialized { active: Period::Sunrise, .. }
        ));
        assert_eq!(engine.active(), Period::Sunrise);
        assert_eq!(engine.next_boundary(), at(10, 12, 0, 0));
        assert_eq!(engine.countdown().to_string(), "02:00:00");
        let progress = engine.progress_fraction().unwrap();
        assert!(progress > 0.0 && progress < 1.0);

        // Ticking forward from there is ordinary again.
        assert!(engine.tick(at(10, 10, 0, 1)).is_empty());
        assert_eq!(engine.active(), Period::Sunrise);
    }

    #[test]
    fn backward_jump_within_window_keeps_state() {
        let mut engine = PeriodEngine::new(PeriodSchedule::sample(), at(10, 13, 0, 0));
        assert!(engine.tick(at(10, 12, 30, 0)).is_empty());
        assert_eq!(engine.active(), Period::Dhuhr);
        assert_eq!(engine.countdown().to_string(), "04:25:00");
    }

    #[test]
    fn progress_is_fraction_remaining() {
        let mut engine = PeriodEngine::new(PeriodSchedule::sample(), at(10, 12, 0, 0));
        assert_eq!(engine.progress_fraction(), None);

        engine.tick(at(10, 12, 0, 0));
        assert_eq!(engine.progress_fraction(), Some(1.0));

        // Dhuhr lasts 4h55m; 1h later 3h55m remain.
        engine.tick(at(10, 13, 0, 0));
        let expected = (3 * 3600 + 55 * 60) as f64 / (4 * 3600 + 55 * 60) as f64;
        assert!((engine.progress_fraction().unwrap() - expected).abs() < 1e-9);
    }

    #[test]
    fn progress_uses_full_day_for_crossing_window() {
        let mut engine = PeriodEngine::new(PeriodSchedule::sample(), at(10, 23, 0, 0));
        engine.tick(at(10, 23, 0, 0));
        // Isha 22:05 -> 00:45 lasts 2h40m, 1h45m remain.
        assert_eq!(engine.window_secs(), Some(160 * 60));
        let expected = 105.0 / 160.0;
        assert!((engine.progress_fraction().unwrap() - expected).abs() < 1e-9);
    }

    #[test]
    fn unmatched_lookup_falls_back_to_fajr() {
        // Without Asr nothing covers 12:00..20:15.
        let s = PeriodSchedule::from_timings(
            PeriodSchedule::sample()
                .iter()
                .filter(|(p, _)| *p != Period::Asr)
                .map(|(p, v)| (p.name(), v.to_string()))
                .collect::<Vec<_>>(),
        );
        let window = locate_active_period(&s, NaiveTime::from_hms_opt(13, 0, 0).unwrap());
        assert!(!window.matched);
        assert_eq!(window.period, Period::Fajr);

        let mut engine = PeriodEngine::new(s, at(10, 13, 0, 0));
        assert!(engine.is_degraded());
        // Sunrise already passed today: hold until midnight instead of spinning.
        assert_eq!(engine.next_boundary(), at(11, 0, 0, 0));
        assert!(engine.tick(at(10, 13, 0, 1)).is_empty());
        assert_eq!(engine.active(), Period::Fajr);
    }

    #[test]
    fn complete_schedules_always_match_a_window() {
        let s = PeriodSchedule::sample();
        for minute in (0..24 * 60).step_by(7) {
            let now = NaiveTime::from_hms_opt(minute / 60, minute % 60, 0).unwrap();
            assert!(locate_active_period(&s, now).matched, "no window at {now}");
        }
    }

    #[test]
    fn equal_boundaries_form_a_full_day_window() {
        let s = PeriodSchedule::from_timings(Period::ALL.iter().map(|p| (p.name(), "12:00")));
        let mut engine = PeriodEngine::new(s, at(10, 15, 0, 0));
        assert_eq!(engine.active(), Period::Fajr);
        assert!(engine.crossed_midnight());
        assert_eq!(engine.next_boundary(), at(11, 12, 0, 0));
        engine.tick(at(10, 15, 0, 0));
        assert_eq!(engine.window_secs(), Some(24 * 3600));
    }

    #[test]
    fn set_schedule_discards_previous_state() {
        let mut engine = PeriodEngine::new(PeriodSchedule::sample(), at(10, 13, 0, 0));
        engine.tick(at(10, 13, 0, 0));
        let mut s = PeriodSchedule::sample();
        s.set(Period::Dhuhr, "13:30");
        let event = engine.set_schedule(s, at(10, 13, 0, 0));
        assert!(matches!(
            event,
            Event::EngineInitialized { active: Period::Sunrise, degraded: false, .. }
        ));
        assert_eq!(engine.progress_fraction(), None);
        assert_eq!(engine.next_boundary(), at(10, 13, 30, 0));
    }

    #[test]
    fn snapshot_reports_countdown_and_next_period() {
        let engine = PeriodEngine::new(PeriodSchedule::sample(), at(10, 23, 0, 0));
        match engine.snapshot(at(10, 23, 0, 0)) {
            Event::StateSnapshot {
                active,
                next,
                countdown,
                actionable,
                ..
            } => {
                assert_eq!(active, Period::Isha);
                assert_eq!(next, Period::Midnight);
                assert_eq!(countdown, "01:45:00");
                assert!(actionable);
            }
            _ => panic!("Expected StateSnapshot"),
        }
    }
}
