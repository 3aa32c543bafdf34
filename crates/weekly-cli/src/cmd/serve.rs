use anyhow::{Context, Result};
use clap::Args;
use std::path::Path;
use weekly_core::config::Config;
use weekly_server::{AppState, Secrets};

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Port to listen on (0 = OS-assigned)
    #[arg(long, default_value = "3000")]
    pub port: u16,

    /// Open the page in a browser once listening
    #[arg(long)]
    pub open: bool,

    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,

    #[arg(long, env = "TRELLO_API_KEY", hide_env_values = true)]
    pub trello_api_key: Option<String>,

    #[arg(long, env = "TRELLO_TOKEN", hide_env_values = true)]
    pub trello_token: Option<String>,

    #[arg(long, env = "DISCORD_TOKEN", hide_env_values = true)]
    pub discord_token: Option<String>,

    /// Channel that receives published updates
    #[arg(long, env = "DISCORD_CHANNEL_ID")]
    pub discord_channel_id: Option<String>,
}

impl ServeArgs {
    /// Collect secrets, falling back to the browser-prefixed Trello
    /// variables older deployments still set.
    fn secrets(self) -> Secrets {
        Secrets {
            openai_api_key: self.openai_api_key,
            trello_api_key: self
                .trello_api_key
                .or_else(|| env_fallback("NEXT_PUBLIC_TRELLO_API_KEY")),
            trello_token: self
                .trello_token
                .or_else(|| env_fallback("NEXT_PUBLIC_TRELLO_TOKEN")),
            discord_token: self.discord_token,
            discord_channel_id: self.discord_channel_id.filter(|c| !c.trim().is_empty()),
        }
    }
}

fn env_fallback(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

pub fn run(config_path: &Path, args: ServeArgs) -> Result<()> {
    let config = Config::load_or_default(config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    let port = args.port;
    let open = args.open;
    let secrets = args.secrets();

    for (name, missing) in [
        ("OPENAI_API_KEY", secrets.openai_api_key.is_none()),
        ("TRELLO_API_KEY", secrets.trello_api_key.is_none()),
        ("TRELLO_TOKEN", secrets.trello_token.is_none()),
        ("DISCORD_TOKEN", secrets.discord_token.is_none()),
        ("DISCORD_CHANNEL_ID", secrets.discord_channel_id.is_none()),
    ] {
        if missing {
            tracing::warn!("{name} is not set; the routes that need it will fail");
        }
    }

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let state = AppState::live(config, secrets)?;
        weekly_server::serve(state, port, open).await
    })
}
