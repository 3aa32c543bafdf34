mod cmd;
mod output;

use clap::{Parser, Subcommand};
use cmd::config::ConfigSubcommand;
use std::path::PathBuf;
use weekly_core::config::CONFIG_FILE;

#[derive(Parser)]
#[command(
    name = "weekly",
    about = "Compose a weekly progress update from mail and board context, review it, publish it",
    version,
    propagate_version = true
)]
struct Cli {
    /// Path to the YAML config file
    #[arg(long, global = true, env = "WEEKLY_CONFIG", default_value = CONFIG_FILE)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the review server
    Serve(cmd::serve::ServeArgs),

    /// Word-level diff of two text files
    Diff {
        /// Previous version
        old: PathBuf,
        /// New version
        new: PathBuf,
        /// Output segments as JSON
        #[arg(long, short = 'j')]
        json: bool,
    },

    /// Inspect or write the config file
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Serve(_) => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .init();

    let result = match cli.command {
        Commands::Serve(args) => cmd::serve::run(&cli.config, args),
        Commands::Diff { old, new, json } => cmd::diff::run(&old, &new, json),
        Commands::Config { subcommand } => cmd::config::run(&cli.config, subcommand),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
