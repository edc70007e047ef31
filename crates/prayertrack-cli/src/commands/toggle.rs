use clap::Subcommand;
use prayertrack_core::{Config, Event};

use super::{print_json, resolve_now, tracker, CmdResult};

#[derive(Subcommand)]
pub enum ToggleAction {
    /// Print the toggle state for the current period
    Status {
        #[arg(long)]
        at: Option<String>,
    },
    /// Perform swipe gestures, one per horizontal distance given
    Swipe {
        /// Drag distances in points; negative moves left
        #[arg(required = true, allow_negative_numbers = true)]
        gestures: Vec<f64>,
        #[arg(long)]
        at: Option<String>,
    },
}

pub fn run(action: ToggleAction) -> CmdResult {
    let config = Config::load_or_default();
    match action {
        ToggleAction::Status { at } => {
            let now = resolve_now(at.as_deref())?;
            let tracker = tracker(&config, now)?;
            if let Event::StateSnapshot { toggle, .. } = tracker.snapshot(now) {
                print_json(&toggle)?;
            }
        }
        ToggleAction::Swipe { gestures, at } => {
            let now = resolve_now(at.as_deref())?;
            let mut tracker = tracker(&config, now)?;
            if !tracker.toggle_visible() {
                return Err(format!(
                    "nothing to mark during {}",
                    tracker.engine().active()
                )
                .into());
            }
            let mut completed = None;
            for dx in gestures {
                tracker.drag_delta(dx);
                if let Some(event) = tracker.drag_end(now) {
                    completed = Some(event);
                }
            }
            match completed {
                Some(event) => print_json(&event)?,
                None => print_json(&tracker.snapshot(now))?,
            }
        }
    }
    Ok(())
}
