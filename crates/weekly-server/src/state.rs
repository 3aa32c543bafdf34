use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};
use weekly_core::board::BoardProvider;
use weekly_core::clock::{Clock, SystemClock};
use weekly_core::config::Config;
use weekly_core::generation::TextGenerator;
use weekly_core::publish::Publisher;
use weekly_core::session::EditingSession;

use crate::clients::{DiscordPublisher, OpenAiGenerator, TrelloBoards};

/// What changed, as broadcast to SSE subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    Progress,
    Context,
    Reveal,
}

impl SessionEvent {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionEvent::Progress => "progress",
            SessionEvent::Context => "context",
            SessionEvent::Reveal => "reveal",
        }
    }
}

/// Credentials and targets read from the environment.
#[derive(Debug, Clone, Default)]
pub struct Secrets {
    pub openai_api_key: Option<String>,
    pub trello_api_key: Option<String>,
    pub trello_token: Option<String>,
    pub discord_token: Option<String>,
    pub discord_channel_id: Option<String>,
}

/// The external services the routes talk to.
#[derive(Clone)]
pub struct Collaborators {
    pub generator: Arc<dyn TextGenerator>,
    pub boards: Arc<dyn BoardProvider>,
    pub publisher: Arc<dyn Publisher>,
}

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub session: Arc<Mutex<EditingSession>>,
    pub generator: Arc<dyn TextGenerator>,
    pub boards: Arc<dyn BoardProvider>,
    pub publisher: Arc<dyn Publisher>,
    pub channel_id: Option<String>,
    pub event_tx: broadcast::Sender<SessionEvent>,
}

impl AppState {
    pub fn new(
        config: Config,
        collaborators: Collaborators,
        channel_id: Option<String>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let (tx, _) = broadcast::channel(64);
        let session = EditingSession::new(&config, "", clock);
        Self {
            config: Arc::new(config),
            session: Arc::new(Mutex::new(session)),
            generator: collaborators.generator,
            boards: collaborators.boards,
            publisher: collaborators.publisher,
            channel_id,
            event_tx: tx,
        }
    }

    /// State wired to the real OpenAI, Trello and Discord APIs.
    ///
    /// The Discord bot starts connecting in the background; publish routes
    /// wait for it with the configured readiness policy.
    pub fn live(config: Config, secrets: Secrets) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.generation_timeout())
            .build()?;

        let generator = OpenAiGenerator::new(
            http.clone(),
            &config.openai_base_url,
            secrets.openai_api_key,
            &config.model,
        );
        let boards = TrelloBoards::new(
            http.clone(),
            &config.trello_base_url,
            secrets.trello_api_key,
            secrets.trello_token,
        );
        let publisher = Arc::new(DiscordPublisher::new(
            http,
            &config.discord_base_url,
            secrets.discord_token,
        ));

        // Guard: only spawn if inside a Tokio runtime.
        if tokio::runtime::Handle::try_current().is_ok() {
            let bot = publisher.clone();
            tokio::spawn(async move {
                if let Err(e) = bot.connect().await {
                    tracing::error!("Discord bot failed to connect: {e}");
                }
            });
        }

        let collaborators = Collaborators {
            generator: Arc::new(generator),
            boards: Arc::new(boards),
            publisher,
        };
        Ok(Self::new(
            config,
            collaborators,
            secrets.discord_channel_id,
            Arc::new(SystemClock),
        ))
    }

    /// Tell SSE subscribers that the session changed.
    pub fn notify(&self, event: SessionEvent) {
        let _ = self.event_tx.send(event);
    }

    /// Notify subscribers again as each pending reveal deadline passes, so
    /// the page settles without polling.
    pub fn schedule_refresh(&self) {
        if tokio::runtime::Handle::try_current().is_err() {
            return;
        }
        let app = self.clone();
        tokio::spawn(async move {
            let mut last = None;
            loop {
                let Some(deadline) = app.session.lock().await.next_deadline() else {
                    break;
                };
                // A deadline the clock never reaches would spin forever.
                if last == Some(deadline) {
                    break;
                }
                last = Some(deadline);
                tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)).await;
                app.session.lock().await.tick();
                app.notify(SessionEvent::Reveal);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn live_state_without_runtime_starts_with_empty_document() {
        let state = AppState::live(Config::default(), Secrets::default()).unwrap();
        let session = state.session.try_lock().unwrap();
        assert_eq!(session.content(), "");
        assert!(!state.publisher.is_ready());
        assert!(state.channel_id.is_none());
    }
}
