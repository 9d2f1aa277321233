use anyhow::Result;
use clap::{Parser, Subcommand};

use revlens::cli::{self, OutputFormat, SummaryArgs};

#[derive(Debug, Parser)]
#[command(name = "revlens")]
#[command(about = "Review sentiment dashboard with date-range filtering")]
struct App {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the web dashboard
    Serve {
        /// Listen address (default from config: 127.0.0.1:9747)
        #[arg(long)]
        addr: Option<String>,
        /// Do not open the dashboard in a browser
        #[arg(long)]
        no_browser: bool,
    },
    /// Print the dashboard for a selection, optionally filtered by date
    Summary {
        /// positive, negative, neutral or doubtful
        #[arg(long)]
        sentiment: Option<String>,
        /// Dimension label, e.g. "Clinical Care"
        #[arg(long)]
        dimension: Option<String>,
        /// Range start (YYYY-MM-DD)
        #[arg(long)]
        start: Option<String>,
        /// Range end (YYYY-MM-DD)
        #[arg(long)]
        end: Option<String>,
        /// Quick range id (see `revlens presets`)
        #[arg(long, conflicts_with_all = ["start", "end"])]
        preset: Option<String>,
        /// Maximum number of review cards to print
        #[arg(long)]
        limit: Option<usize>,
        /// Output format: table (default), json
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// List the quick date ranges
    Presets {
        /// Output format: table (default), json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Inspect and maintain the filter result cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
    /// Show recent filter requests
    History {
        /// Output format: table (default), json, csv
        #[arg(long, default_value = "table")]
        format: String,
        /// Only include the last N days of data
        #[arg(long)]
        days: Option<u32>,
        /// Maximum number of requests shown
        #[arg(long, default_value = "20")]
        limit: usize,
    },
    /// Show filter request statistics
    Stats {
        /// Output format: table (default), json, csv
        #[arg(long, default_value = "table")]
        format: String,
        /// Only include the last N days of data
        #[arg(long)]
        days: Option<u32>,
    },
    /// Check config, baseline data, cache and event log
    Health,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand)]
enum CacheAction {
    /// List live cached ranges
    List,
    /// Remove every cached filter result
    Clear,
    /// Remove expired or corrupt entries
    Sweep,
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    /// Show the effective configuration
    Show,
    /// Write the default config to ~/.revlens/config.toml
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Set a config value, e.g. `revlens config set cache.ttl_hours 6`
    Set { key: String, value: String },
    /// Reset the global config to defaults
    Reset,
}

fn main() -> Result<()> {
    let app = App::parse();

    match app.command {
        Commands::Serve { addr, no_browser } => cli::run_serve(addr, no_browser),
        Commands::Summary {
            sentiment,
            dimension,
            start,
            end,
            preset,
            limit,
            format,
        } => {
            let args = SummaryArgs {
                sentiment,
                dimension,
                start,
                end,
                preset,
                limit,
            };
            cli::run_summary(args, OutputFormat::from_str_opt(Some(&format)))
        }
        Commands::Presets { format } => cli::run_presets(OutputFormat::from_str_opt(Some(&format))),
        Commands::Cache { action } => match action {
            CacheAction::List => cli::run_cache_list(),
            CacheAction::Clear => cli::run_cache_clear(),
            CacheAction::Sweep => cli::run_cache_sweep(),
        },
        Commands::History {
            format,
            days,
            limit,
        } => cli::run_history(OutputFormat::from_str_opt(Some(&format)), days, limit),
        Commands::Stats { format, days } => {
            let fmt = OutputFormat::from_str_opt(Some(&format));
            cli::run_stats(fmt, days)
        }
        Commands::Health => cli::run_health(),
        Commands::Config { action } => match action {
            ConfigAction::Show => cli::run_config_show(),
            ConfigAction::Init { force } => cli::run_config_init(force),
            ConfigAction::Set { key, value } => cli::run_config_set(&key, &value),
            ConfigAction::Reset => cli::run_config_reset(),
        },
    }
}
