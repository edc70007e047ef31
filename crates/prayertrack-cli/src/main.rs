use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "prayertrack", version, about = "PrayerTrack CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the current period, countdown and toggle state as JSON
    Status(commands::status::StatusArgs),
    /// Run the countdown, printing one JSON line per tick
    Watch(commands::watch::WatchArgs),
    /// Prayer times management
    Schedule {
        #[command(subcommand)]
        action: commands::schedule::ScheduleAction,
    },
    /// Fetch prayer times and place name for a location
    Fetch(commands::fetch::FetchArgs),
    /// Re-fetch prayer times for the stored location
    Refresh,
    /// Calculation method management
    Method {
        #[command(subcommand)]
        action: commands::method::MethodAction,
    },
    /// Mark the current prayer as performed
    Toggle {
        #[command(subcommand)]
        action: commands::toggle::ToggleAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_env("PRAYERTRACK_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Status(args) => commands::status::run(args),
        Commands::Watch(args) => commands::watch::run(args),
        Commands::Schedule { action } => commands::schedule::run(action),
        Commands::Fetch(args) => commands::fetch::run(args),
        Commands::Refresh => commands::fetch::refresh(),
        Commands::Method { action } => commands::method::run(action),
        Commands::Toggle { action } => commands::toggle::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
