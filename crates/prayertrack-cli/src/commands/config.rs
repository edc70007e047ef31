//! `prayertrack config`: inspect and edit `config.toml`.
//!
//! Keys are dotted paths into one of four sections:
//! `remote` (API endpoints, user agent, request timeout), `tracker`
//! (countdown tick cadence), `toggle` (track geometry and commit rule) and
//! `location` (fallback coordinate for `fetch`).

use clap::{Subcommand, ValueEnum};
use prayertrack_core::Config;

use super::{print_json, CmdResult};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print one setting
    Get {
        /// Dotted key, e.g. "toggle.commit_rule" or "remote.timeout_secs"
        key: String,
    },
    /// Change one setting and save it
    Set {
        /// Dotted key, e.g. "location.latitude" or "tracker.tick_interval_ms"
        key: String,
        /// New value; commit_rule takes "reach_right" or "return_left"
        value: String,
    },
    /// Print the settings as JSON
    List {
        /// Only this section
        #[arg(long, value_enum)]
        section: Option<Section>,
    },
    /// Print where the config file lives
    Path,
    /// Restore the default endpoints, cadence and toggle geometry
    Reset,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum Section {
    Remote,
    Tracker,
    Toggle,
    Location,
}

pub fn run(action: ConfigAction) -> CmdResult {
    match action {
        ConfigAction::Get { key } => {
            let value = Config::load_or_default()
                .get(&key)
                .ok_or_else(|| format!("unknown key: {key}"))?;
            println!("{value}");
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            // Echo what was stored, which may be normalized ("15" -> 15).
            let stored = config.get(&key).unwrap_or(value);
            println!("{key} = {stored}");
        }
        ConfigAction::List { section } => {
            let config = Config::load_or_default();
            match section {
                None => print_json(&config)?,
                Some(Section::Remote) => print_json(&config.remote)?,
                Some(Section::Tracker) => print_json(&config.tracker)?,
                Some(Section::Toggle) => print_json(&config.toggle)?,
                Some(Section::Location) => print_json(&config.location)?,
            }
        }
        ConfigAction::Path => println!("{}", Config::path()?.display()),
        ConfigAction::Reset => {
            Config::default().save()?;
            tracing::info!("configuration reset to defaults");
            println!("config reset to defaults");
        }
    }
    Ok(())
}
