use chrono::{NaiveTime, Timelike};
use clap::Subcommand;
use prayertrack_core::{Config, Period, PeriodSchedule};
use serde_json::json;
use std::collections::HashMap;
use std::io::Read;

use super::{alert_error, coordinator, print_json, CmdResult};

#[derive(Subcommand)]
pub enum ScheduleAction {
    /// Print the saved prayer times and whether they are usable
    Show,
    /// Set one period's time
    Set {
        /// Period name (Fajr, Sunrise, Dhuhr, Asr, Maghrib, Isha, Midnight)
        period: Period,
        /// Time as HH:MM (24h)
        time: String,
    },
    /// Replace all times from a JSON object of name to HH:MM ("-" reads stdin)
    Import {
        file: String,
    },
    /// Print the sample schedule
    Sample {
        /// Also save it as the current schedule
        #[arg(long)]
        save: bool,
    },
    /// Check that the saved times are complete and cover a single day
    Validate,
    /// Remove the saved times
    Clear,
}

fn read_source(file: &str) -> std::io::Result<String> {
    if file == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        std::fs::read_to_string(file)
    }
}

pub fn run(action: ScheduleAction) -> CmdResult {
    let config = Config::load_or_default();
    let mut coordinator = coordinator(&config)?;

    match action {
        ScheduleAction::Show => {
            let problem = coordinator.commit().err();
            print_json(&json!({
                "schedule": coordinator.working_schedule(),
                "valid": problem.is_none(),
                "problem": problem,
            }))?;
        }
        ScheduleAction::Set { period, time } => {
            let parsed = NaiveTime::parse_from_str(time.trim(), "%H:%M")
                .map_err(|_| format!("invalid time for {period}: {time} (expected HH:MM)"))?;
            coordinator.save_manual_time(period, parsed.hour(), parsed.minute())?;
            print_json(coordinator.working_schedule())?;
        }
        ScheduleAction::Import { file } => {
            let raw: HashMap<String, String> = serde_json::from_str(&read_source(&file)?)?;
            coordinator.replace_working(PeriodSchedule::from_timings(raw))?;
            let schedule = coordinator.commit().map_err(alert_error)?;
            print_json(&schedule)?;
        }
        ScheduleAction::Sample { save } => {
            let sample = PeriodSchedule::sample();
            if save {
                coordinator.replace_working(sample.clone())?;
            }
            print_json(&sample)?;
        }
        ScheduleAction::Validate => {
            coordinator.commit().map_err(alert_error)?;
            print_json(&json!({ "valid": true }))?;
        }
        ScheduleAction::Clear => {
            coordinator.clear()?;
            println!("schedule cleared");
        }
    }
    Ok(())
}
