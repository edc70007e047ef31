//! Property tests for window lookup, rollover and the completion toggle.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use prayertrack_core::period::locate_active_period;
use prayertrack_core::{
    CommitRule, Event, Period, PeriodEngine, PeriodSchedule, PrayerToggle, TrackGeometry,
};
use proptest::prelude::*;

fn hhmm(minute_of_day: u32) -> String {
    format!("{:02}:{:02}", minute_of_day / 60, minute_of_day % 60)
}

/// Seven distinct times in cyclic order, starting at any of them, so at most
/// one adjacent pair is inverted.
fn single_day_schedule() -> impl Strategy<Value = PeriodSchedule> {
    (prop::collection::btree_set(0u32..1440, 7), 0usize..7).prop_map(|(minutes, rotation)| {
        let sorted: Vec<u32> = minutes.into_iter().collect();
        let mut schedule = PeriodSchedule::new();
        for (i, period) in Period::ALL.iter().enumerate() {
            schedule.set(*period, hhmm(sorted[(i + rotation) % 7]));
        }
        schedule
    })
}

/// Independent window check on `HH:MM` strings.
fn contains(schedule: &PeriodSchedule, period: Period, now: &str) -> bool {
    let start = schedule.get(period).unwrap_or_default();
    let end = schedule.get(period.next()).unwrap_or_default();
    if start < end {
        start <= now && now < end
    } else {
        !(end <= now && now < start)
    }
}

fn day_start() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 10)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

#[derive(Debug, Clone)]
enum Input {
    Delta(f64),
    End,
    Rollover,
}

fn input() -> impl Strategy<Value = Input> {
    prop_oneof![
        4 => (-500.0f64..500.0).prop_map(Input::Delta),
        2 => Just(Input::End),
        1 => Just(Input::Rollover),
    ]
}

proptest! {
    #[test]
    fn exactly_one_window_contains_now(schedule in single_day_schedule(), minute in 0u32..1440) {
        prop_assert!(schedule.validate().is_ok());
        let now = hhmm(minute);
        let containing: Vec<Period> = Period::ALL
            .iter()
            .copied()
            .filter(|p| contains(&schedule, *p, &now))
            .collect();
        prop_assert_eq!(containing.len(), 1);

        let time = NaiveTime::from_hms_opt(minute / 60, minute % 60, 0).unwrap();
        let window = locate_active_period(&schedule, time);
        prop_assert!(window.matched);
        prop_assert_eq!(window.period, containing[0]);

        let engine = PeriodEngine::new(schedule, day_start() + Duration::minutes(minute.into()));
        prop_assert!(engine.window_secs().is_some_and(|s| s > 0));
        prop_assert!(!engine.countdown().is_zero());
    }

    #[test]
    fn rollover_advances_one_step_per_boundary(
        schedule in single_day_schedule(),
        start in 0i64..86_400,
        steps in prop::collection::vec(1i64..20_000, 1..40),
    ) {
        let mut now = day_start() + Duration::seconds(start);
        let mut engine = PeriodEngine::new(schedule, now);
        let mut boundary = engine.next_boundary();
        for step in steps {
            now += Duration::seconds(step);
            for event in engine.tick(now) {
                match event {
                    Event::PeriodRollover { from, to, next_boundary, .. } => {
                        prop_assert_eq!(to, from.next());
                        prop_assert!(next_boundary > boundary);
                        boundary = next_boundary;
                    }
                    Event::EngineInitialized { next_boundary, .. } => boundary = next_boundary,
                    other => prop_assert!(false, "unexpected event {:?}", other),
                }
            }
            prop_assert!(engine.next_boundary() > now);
            prop_assert!(engine.countdown().as_secs() >= 0);
            let progress = engine.progress_fraction().unwrap_or(0.0);
            prop_assert!((0.0..=1.0).contains(&progress));
        }
    }

    #[test]
    fn toggle_offset_stays_on_the_track(
        track in 0.0f64..600.0,
        diameter in 0.0f64..120.0,
        return_left in any::<bool>(),
        inputs in prop::collection::vec(input(), 0..60),
    ) {
        let rule = if return_left { CommitRule::ReturnLeft } else { CommitRule::ReachRight };
        let geometry = TrackGeometry::new(track, diameter);
        let mut toggle = PrayerToggle::new(geometry, rule);
        for input in inputs {
            match input {
                Input::Delta(dx) => toggle.on_drag_changed(dx, track, diameter),
                Input::End => {
                    toggle.on_drag_ended(track, diameter);
                }
                Input::Rollover => toggle.reset(),
            }
            prop_assert!(toggle.offset() >= 0.0);
            prop_assert!(toggle.offset() <= geometry.max_offset());
        }
    }

    #[test]
    fn completion_is_sticky_until_rollover(
        return_left in any::<bool>(),
        inputs in prop::collection::vec(input(), 0..60),
    ) {
        let rule = if return_left { CommitRule::ReturnLeft } else { CommitRule::ReachRight };
        let mut toggle = PrayerToggle::new(TrackGeometry::default(), rule);
        let (track, diameter) = (300.0, 70.0);
        for input in inputs {
            let was_completed = toggle.completed();
            let rolled_over = matches!(input, Input::Rollover);
            match input {
                Input::Delta(dx) => toggle.on_drag_changed(dx, track, diameter),
                Input::End => {
                    toggle.on_drag_ended(track, diameter);
                }
                Input::Rollover => toggle.reset(),
            }
            if was_completed && !rolled_over {
                prop_assert!(toggle.completed());
            }
            if rolled_over {
                prop_assert!(!toggle.completed());
            }
        }
    }
}
