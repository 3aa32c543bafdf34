use thiserror::Error;

#[derive(Debug, Error)]
pub enum WeeklyError {
    #[error("Missing context")]
    MissingContext,

    #[error("generation failed: {0}")]
    Generation(String),

    #[error("a generation request is already in flight")]
    GenerationInFlight,

    #[error("Discord bot is not ready (gave up after {attempts} attempts)")]
    PublishNotReady { attempts: u32 },

    #[error("Channel not found: {0}")]
    ChannelNotFound(String),

    #[error("Channel is not a text channel: {0}")]
    ChannelNotText(String),

    #[error("Message is required")]
    MissingMessage,

    #[error("Failed to send Discord message: {0}")]
    Publish(String),

    #[error("Trello error {status}: {body}")]
    BoardFetch { status: u16, body: String },

    #[error("missing credentials: {0}")]
    MissingCredentials(String),

    #[error("invalid transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl WeeklyError {
    /// True for `ChannelNotFound` and `ChannelNotText`: the publish target
    /// itself is unusable, as opposed to the publisher.
    pub fn is_invalid_target(&self) -> bool {
        matches!(
            self,
            WeeklyError::ChannelNotFound(_) | WeeklyError::ChannelNotText(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, WeeklyError>;
