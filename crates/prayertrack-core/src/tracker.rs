//! Single owner of the period engine and the completion toggle.
//!
//! All engine mutation goes through one `PrayerTracker`. Hosts that tick from
//! a background task share it as a [`SharedTracker`], which serializes every
//! call behind one async mutex, so a schedule swap is never observed half
//! applied.

use chrono::NaiveDateTime;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::error::CoreError;
use crate::events::{Event, ToggleSnapshot};
use crate::period::{PeriodEngine, PeriodSchedule};
use crate::storage::SettingsStore;
use crate::toggle::{CommitRule, DragOutcome, DragSink, PrayerToggle, TrackGeometry};

pub type SharedTracker<S> = Arc<Mutex<PrayerTracker<S>>>;

pub struct PrayerTracker<S: SettingsStore> {
    engine: PeriodEngine,
    toggle: PrayerToggle,
    store: S,
}

impl<S: SettingsStore> PrayerTracker<S> {
    /// Start tracking `schedule` at `now`, restoring a completion recorded
    /// earlier in the same window.
    pub fn new(
        store: S,
        schedule: PeriodSchedule,
        geometry: TrackGeometry,
        rule: CommitRule,
        now: NaiveDateTime,
    ) -> Self {
        let mut tracker = Self {
            engine: PeriodEngine::new(schedule, now),
            toggle: PrayerToggle::new(geometry, rule),
            store,
        };
        tracker.restore_completion();
        tracker
    }

    /// Build from the schedule persisted in `store`, if any. A persisted
    /// schedule that no longer validates is an error.
    pub fn from_store(
        store: S,
        geometry: TrackGeometry,
        rule: CommitRule,
        now: NaiveDateTime,
    ) -> Result<Option<Self>, CoreError> {
        let Some(schedule) = store.load_schedule()? else {
            return Ok(None);
        };
        schedule.validate()?;
        Ok(Some(Self::new(store, schedule, geometry, rule, now)))
    }

    pub fn into_shared(self) -> SharedTracker<S> {
        Arc::new(Mutex::new(self))
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn engine(&self) -> &PeriodEngine {
        &self.engine
    }

    pub fn toggle(&self) -> &PrayerToggle {
        &self.toggle
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn toggle_visible(&self) -> bool {
        self.toggle.is_visible(self.engine.active())
    }

    /// Engine snapshot including the toggle.
    pub fn snapshot(&self, now: NaiveDateTime) -> Event {
        let mut snapshot = self.engine.snapshot(now);
        if let Event::StateSnapshot { toggle, .. } = &mut snapshot {
            *toggle = Some(ToggleSnapshot {
                visible: self.toggle_visible(),
                completed: self.toggle.completed(),
                state: self.toggle.state(),
                offset: self.toggle.offset(),
            });
        }
        snapshot
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Advance the engine. Any rollover resets the toggle and the prayed flag.
    pub fn tick(&mut self, now: NaiveDateTime) -> Vec<Event> {
        let events = self.engine.tick(now);
        let moved = events.iter().any(|e| {
            matches!(
                e,
                Event::PeriodRollover { .. } | Event::EngineInitialized { .. }
            )
        });
        if moved {
            self.reset_completion();
        }
        events
    }

    /// Swap in a validated schedule and re-initialize the engine from scratch.
    ///
    /// The completion survives only if the active window is unchanged.
    pub fn replace_schedule(&mut self, schedule: PeriodSchedule, now: NaiveDateTime) -> Event {
        let before = (self.engine.active(), self.engine.next_boundary());
        self.engine.set_schedule(schedule, now);
        let after = (self.engine.active(), self.engine.next_boundary());
        if before != after {
            self.reset_completion();
        }
        info!(active = %after.0, "schedule replaced");
        Event::ScheduleReplaced {
            active: after.0,
            at: now,
        }
    }

    /// Gesture moved. Ignored while the toggle is hidden.
    pub fn drag_delta(&mut self, dx: f64) {
        if self.toggle_visible() {
            self.toggle.on_drag_delta(dx);
        }
    }

    /// Gesture ended. Returns `PrayerCompleted` when it marked the prayer.
    pub fn drag_end(&mut self, now: NaiveDateTime) -> Option<Event> {
        if !self.toggle_visible() {
            return None;
        }
        match self.toggle.on_drag_end() {
            DragOutcome::Completed => {
                let period = self.engine.active();
                self.persist_completion(true);
                info!(%period, "prayer marked as performed");
                Some(Event::PrayerCompleted { period, at: now })
            }
            outcome => {
                debug!(?outcome, "toggle released");
                None
            }
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn restore_completion(&mut self) {
        let prayed = self.store.has_prayed().unwrap_or_else(|e| {
            warn!(error = %e, "could not read prayed flag");
            false
        });
        let window = self.store.prayed_window().ok().flatten();
        // A flag recorded for another window is left for rollover to clear.
        if prayed && window == Some(self.engine.next_boundary()) {
            self.toggle.restore_completed();
        }
    }

    fn reset_completion(&mut self) {
        let was_completed = self.toggle.completed();
        self.toggle.reset();
        if was_completed || self.store.has_prayed().unwrap_or(true) {
            self.persist_completion(false);
        }
    }

    fn persist_completion(&mut self, prayed: bool) {
        let window = prayed.then(|| self.engine.next_boundary());
        let result = self
            .store
            .set_has_prayed(prayed)
            .and_then(|_| self.store.set_prayed_window(window));
        if let Err(e) = result {
            warn!(error = %e, "could not persist prayed flag");
        }
    }
}

/// Drive `tracker` from `clock` every `interval` until `shutdown` resolves.
///
/// `on_tick` receives the events of the tick and a fresh snapshot; it runs
/// after the lock is released.
pub async fn run<S, C, F, Fut>(
    tracker: SharedTracker<S>,
    clock: &C,
    interval: Duration,
    mut on_tick: F,
    shutdown: Fut,
) where
    S: SettingsStore,
    C: Clock,
    F: FnMut(&[Event], &Event),
    Fut: Future<Output = ()>,
{
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            biased;
            _ = &mut shutdown => {
                debug!("tick loop stopped");
                break;
            }
            _ = ticker.tick() => {
                let now = clock.now();
                let (events, snapshot) = {
                    let mut tracker = tracker.lock().await;
                    let events = tracker.tick(now);
                    (events, tracker.snapshot(now))
                };
                on_tick(&events, &snapshot);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::period::Period;
    use crate::storage::MemoryStore;
    use chrono::NaiveDate;

    fn at(d: u32, h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, d)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    fn tracker_at(now: NaiveDateTime) -> PrayerTracker<MemoryStore> {
        PrayerTracker::new(
            MemoryStore::new(),
            PeriodSchedule::sample(),
            TrackGeometry::default(),
            CommitRule::ReachRight,
            now,
        )
    }

    fn swipe(tracker: &mut PrayerTracker<MemoryStore>, now: NaiveDateTime) -> Option<Event> {
        tracker.drag_delta(500.0);
        tracker.drag_end(now)
    }

    #[test]
    fn completion_is_persisted_and_reset_on_rollover() {
        let mut tracker = tracker_at(at(10, 16, 0, 0));
        assert!(tracker.toggle_visible());

        let event = swipe(&mut tracker, at(10, 16, 0, 0));
        assert!(matches!(event, Some(Event::PrayerCompleted { period: Period::Dhuhr, .. })));
        assert!(!tracker.toggle_visible());
        assert!(tracker.store().has_prayed().unwrap());

        let events = tracker.tick(at(10, 16, 55, 0));
        assert_eq!(events.len(), 1);
        assert!(!tracker.toggle().completed());
        assert!(tracker.toggle_visible());
        assert!(!tracker.store().has_prayed().unwrap());
    }

    #[test]
    fn drags_are_ignored_while_hidden() {
        let mut tracker = tracker_at(at(10, 6, 0, 0));
        assert_eq!(tracker.engine().active(), Period::Sunrise);
        assert!(!tracker.toggle_visible());
        assert!(swipe(&mut tracker, at(10, 6, 0, 0)).is_none());
        assert!(!tracker.toggle().completed());
    }

    #[test]
    fn completion_restored_only_within_same_window() {
        let mut tracker = tracker_at(at(10, 13, 0, 0));
        swipe(&mut tracker, at(10, 13, 0, 0));
        let store = tracker.store().clone();

        let same_window = PrayerTracker::new(
            store.clone(),
            PeriodSchedule::sample(),
            TrackGeometry::default(),
            CommitRule::ReachRight,
            at(10, 14, 0, 0),
        );
        assert!(same_window.toggle().completed());

        let later = PrayerTracker::new(
            store.clone(),
            PeriodSchedule::sample(),
            TrackGeometry::default(),
            CommitRule::ReachRight,
            at(10, 17, 0, 0),
        );
        assert!(!later.toggle().completed());
        // Looking at another window must not erase the recorded one.
        assert!(later.store().has_prayed().unwrap());
        assert_eq!(later.store().prayed_window().unwrap(), Some(at(10, 16, 55, 0)));

        let back = PrayerTracker::new(
            store,
            PeriodSchedule::sample(),
            TrackGeometry::default(),
            CommitRule::ReachRight,
            at(10, 15, 0, 0),
        );
        assert!(back.toggle().completed());
    }

    #[test]
    fn schedule_swap_keeps_completion_when_window_unchanged() {
        let mut tracker = tracker_at(at(10, 13, 0, 0));
        swipe(&mut tracker, at(10, 13, 0, 0));

        let mut same = PeriodSchedule::sample();
        same.set(Period::Midnight, "00:40");
        tracker.replace_schedule(same, at(10, 13, 0, 0));
        assert!(tracker.toggle().completed());

        let mut moved = PeriodSchedule::sample();
        moved.set(Period::Asr, "17:10");
        let event = tracker.replace_schedule(moved, at(10, 13, 0, 0));
        assert!(matches!(event, Event::ScheduleReplaced { active: Period::Dhuhr, .. }));
        assert!(!tracker.toggle().completed());
    }

    #[test]
    fn from_store_requires_a_saved_schedule() {
        let store = MemoryStore::new();
        let none = PrayerTracker::from_store(
            store,
            TrackGeometry::default(),
            CommitRule::ReachRight,
            at(10, 13, 0, 0),
        )
        .unwrap();
        assert!(none.is_none());

        let mut store = MemoryStore::new();
        let mut broken = PeriodSchedule::sample();
        broken.set(Period::Asr, "");
        store.save_schedule(&broken).unwrap();
        let err = PrayerTracker::from_store(
            store,
            TrackGeometry::default(),
            CommitRule::ReachRight,
            at(10, 13, 0, 0),
        )
        .err()
        .unwrap();
        assert!(matches!(err, CoreError::Schedule(_)));
    }

    #[test]
    fn snapshot_includes_toggle() {
        let tracker = tracker_at(at(10, 23, 0, 0));
        match tracker.snapshot(at(10, 23, 0, 0)) {
            Event::StateSnapshot { toggle: Some(t), .. } => {
                assert!(t.visible);
                assert!(!t.completed);
            }
            other => panic!("Expected StateSnapshot, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn run_loop_ticks_until_shutdown() {
        let clock = Arc::new(FixedClock::new(at(10, 16, 54, 58)));
        let shared = tracker_at(at(10, 16, 54, 58)).into_shared();

        let mut rollovers = 0;
        let mut ticks = 0;
        let ticking_clock = Arc::clone(&clock);
        run(
            Arc::clone(&shared),
            clock.as_ref(),
            Duration::from_secs(1),
            |events, _snapshot| {
                ticks += 1;
                rollovers += events.len();
                ticking_clock.advance(chrono::Duration::seconds(1));
            },
            tokio::time::sleep(Duration::from_millis(4_500)),
        )
        .await;

        assert_eq!(ticks, 5);
        assert_eq!(rollovers, 1);
        assert_eq!(shared.lock().await.engine().active(), Period::Asr);
    }
}
