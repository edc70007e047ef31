use clap::Args;
use prayertrack_core::Config;

use super::{print_json, resolve_now, tracker, CmdResult};

#[derive(Args)]
pub struct StatusArgs {
    /// Evaluate at this local time instead of now (YYYY-MM-DDTHH:MM[:SS])
    #[arg(long)]
    at: Option<String>,
}

pub fn run(args: StatusArgs) -> CmdResult {
    let config = Config::load_or_default();
    let now = resolve_now(args.at.as_deref())?;
    let mut tracker = tracker(&config, now)?;
    tracker.tick(now);
    print_json(&tracker.snapshot(now))
}
