use crate::board::DEFAULT_BOARD_ID;
use crate::error::Result;
use crate::presentation::RevealTimings;
use crate::publish::ReadinessPolicy;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE: &str = "weekly.yaml";

// ---------------------------------------------------------------------------
// RevealConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealConfig {
    #[serde(default = "default_pulse_ms")]
    pub pulse_ms: u64,
    #[serde(default = "default_reveal_ms")]
    pub reveal_ms: u64,
}

fn default_pulse_ms() -> u64 {
    2_000
}

fn default_reveal_ms() -> u64 {
    5_000
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            pulse_ms: default_pulse_ms(),
            reveal_ms: default_reveal_ms(),
        }
    }
}

impl RevealConfig {
    pub fn timings(&self) -> RevealTimings {
        RevealTimings {
            pulse: Duration::from_millis(self.pulse_ms),
            reveal: Duration::from_millis(self.reveal_ms),
        }
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Non-secret settings. API keys and tokens come from the environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_openai_base_url")]
    pub openai_base_url: String,
    #[serde(default = "default_trello_base_url")]
    pub trello_base_url: String,
    #[serde(default = "default_discord_base_url")]
    pub discord_base_url: String,
    #[serde(default = "default_board_id")]
    pub default_board_id: String,
    /// Link posted by the webhook to invite the team to review.
    #[serde(default = "default_review_url")]
    pub review_url: String,
    #[serde(default)]
    pub reveal: RevealConfig,
    #[serde(default)]
    pub readiness: ReadinessPolicy,
    #[serde(default = "default_generation_timeout_secs")]
    pub generation_timeout_secs: u64,
}

fn default_model() -> String {
    "gpt-4o".to_string()
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_trello_base_url() -> String {
    "https://api.trello.com/1".to_string()
}

fn default_discord_base_url() -> String {
    "https://discord.com/api/v10".to_string()
}

fn default_board_id() -> String {
    DEFAULT_BOARD_ID.to_string()
}

fn default_review_url() -> String {
    "http://localhost:3000/".to_string()
}

fn default_generation_timeout_secs() -> u64 {
    60
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: default_model(),
            openai_base_url: default_openai_base_url(),
            trello_base_url: default_trello_base_url(),
            discord_base_url: default_discord_base_url(),
            default_board_id: default_board_id(),
            review_url: default_review_url(),
            reveal: RevealConfig::default(),
            readiness: ReadinessPolicy::default(),
            generation_timeout_secs: default_generation_timeout_secs(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        if data.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(&data)?)
    }

    /// Load `path` if it exists, defaults otherwise.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load(path)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let data = serde_yaml::to_string(self)?;
        std::fs::write(path, data)?;
        Ok(())
    }

    pub fn generation_timeout(&self) -> Duration {
        Duration::from_secs(self.generation_timeout_secs)
    }

    /// The invitation posted by the webhook.
    pub fn review_invitation(&self) -> String {
        format!("Start your weekly project report: {}", self.review_url)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_or_default(&dir.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.readiness.max_attempts, 10);
        assert_eq!(config.reveal.timings(), RevealTimings::default());
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "model: gpt-4o-mini\nreveal:\n  reveal_ms: 8000\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.reveal.reveal_ms, 8000);
        assert_eq!(config.reveal.pulse_ms, 2000);
        assert_eq!(config.default_board_id, DEFAULT_BOARD_ID);
    }

    #[test]
    fn partial_readiness_keeps_default_interval() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "readiness:\n  max_attempts: 5\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.readiness.max_attempts, 5);
        assert_eq!(config.readiness.interval, Duration::from_secs(1));
    }

    #[test]
    fn save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        let mut config = Config::default();
        config.review_url = "https://example.com/review".into();
        config.save(&path).unwrap();
        assert_eq!(Config::load(&path).unwrap(), config);
    }

    #[test]
    fn invalid_yaml_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "model: [unterminated").unwrap();
        assert!(Config::load(&path).is_err());
    }

    #[test]
    fn review_invitation_includes_url() {
        let config = Config {
            review_url: "https://example.com/r".into(),
            ..Config::default()
        };
        assert_eq!(
            config.review_invitation(),
            "Start your weekly project report: https://example.com/r"
        );
    }
}
