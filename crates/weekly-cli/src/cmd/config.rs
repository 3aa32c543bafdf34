use crate::output::print_table;
use anyhow::{bail, Context, Result};
use clap::Subcommand;
use std::path::Path;
use weekly_core::config::Config;

// ---------------------------------------------------------------------------
// Subcommand definition
// ---------------------------------------------------------------------------

#[derive(Subcommand, Debug)]
pub enum ConfigSubcommand {
    /// Print the effective config (file values over defaults)
    Show {
        /// Print as YAML instead of a table
        #[arg(long)]
        yaml: bool,
    },
    /// Write a config file with the default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn run(path: &Path, subcommand: ConfigSubcommand) -> Result<()> {
    match subcommand {
        ConfigSubcommand::Show { yaml } => run_show(path, yaml),
        ConfigSubcommand::Init { force } => run_init(path, force),
    }
}

fn run_show(path: &Path, yaml: bool) -> Result<()> {
    let config = Config::load_or_default(path)
        .with_context(|| format!("loading {}", path.display()))?;
    if yaml {
        print!("{}", serde_yaml::to_string(&config)?);
        return Ok(());
    }

    let rows = vec![
        vec!["model".into(), config.model.clone()],
        vec!["openai_base_url".into(), config.openai_base_url.clone()],
        vec!["trello_base_url".into(), config.trello_base_url.clone()],
        vec!["discord_base_url".into(), config.discord_base_url.clone()],
        vec!["default_board_id".into(), config.default_board_id.clone()],
        vec!["review_url".into(), config.review_url.clone()],
        vec!["reveal.pulse_ms".into(), config.reveal.pulse_ms.to_string()],
        vec!["reveal.reveal_ms".into(), config.reveal.reveal_ms.to_string()],
        vec![
            "readiness.max_attempts".into(),
            config.readiness.max_attempts.to_string(),
        ],
        vec![
            "readiness.interval_ms".into(),
            config.readiness.interval.as_millis().to_string(),
        ],
        vec![
            "generation_timeout_secs".into(),
            config.generation_timeout_secs.to_string(),
        ],
    ];
    print_table(&["KEY", "VALUE"], rows);
    Ok(())
}

fn run_init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    Config::default()
        .save(path)
        .with_context(|| format!("writing {}", path.display()))?;
    println!("Wrote {}", path.display());
    Ok(())
}
