use clap::Args;
use prayertrack_core::tracker::run as run_tracker;
use prayertrack_core::{Clock, Config, Event, SystemClock};
use std::sync::Arc;
use tokio::sync::Notify;

use super::{runtime, tracker, CmdResult};

#[derive(Args)]
pub struct WatchArgs {
    /// Stop after this many ticks (runs until Ctrl-C otherwise)
    #[arg(long)]
    ticks: Option<u64>,
}

fn print_line(event: &Event) {
    match serde_json::to_string(event) {
        Ok(line) => println!("{line}"),
        Err(e) => tracing::warn!(error = %e, "could not serialize event"),
    }
}

pub fn run(args: WatchArgs) -> CmdResult {
    let config = Config::load_or_default();
    let clock = SystemClock;
    let shared = tracker(&config, clock.now())?.into_shared();

    let done = Arc::new(Notify::new());
    let notify = Arc::clone(&done);
    let mut seen = 0u64;
    let on_tick = move |events: &[Event], snapshot: &Event| {
        events.iter().for_each(print_line);
        print_line(snapshot);
        seen += 1;
        if args.ticks.is_some_and(|n| seen >= n) {
            notify.notify_one();
        }
    };

    runtime()?.block_on(async {
        let shutdown = async {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = done.notified() => {}
            }
        };
        run_tracker(shared, &clock, config.tick_interval(), on_tick, shutdown).await;
    });
    Ok(())
}
