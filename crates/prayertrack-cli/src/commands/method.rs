use clap::Subcommand;
use prayertrack_core::remote::{all_methods, method_name};
use prayertrack_core::Config;
use serde_json::json;

use super::{coordinator, print_json, CmdResult};

#[derive(Subcommand)]
pub enum MethodAction {
    /// List the calculation methods
    List,
    /// Show the selected method
    Show,
    /// Select a method by id
    Set { id: u8 },
}

pub fn run(action: MethodAction) -> CmdResult {
    if let MethodAction::List = action {
        return print_json(&all_methods());
    }

    let config = Config::load_or_default();
    let mut coordinator = coordinator(&config)?;
    if let MethodAction::Set { id } = action {
        coordinator.set_method(id)?;
    }
    let id = coordinator.method()?;
    print_json(&json!({ "id": id, "name": method_name(id) }))
}
