//! Posting messages through a Discord bot over the REST API.
//!
//! `connect` verifies the bot token once and flips the ready flag; sends
//! before that are held back by the caller's readiness poll.

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;
use weekly_core::publish::Publisher;
use weekly_core::{Result, WeeklyError};

/// Channel types that accept messages (text, DM, voice, group DM,
/// announcement, the three thread kinds, stage).
const TEXT_CAPABLE: &[u8] = &[0, 1, 2, 3, 5, 10, 11, 12, 13];

pub struct DiscordPublisher {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
    ready: AtomicBool,
    bot_user: RwLock<Option<String>>,
}

#[derive(Deserialize)]
struct BotUser {
    username: String,
    #[serde(default)]
    discriminator: Option<String>,
}

impl BotUser {
    fn tag(&self) -> String {
        match self.discriminator.as_deref() {
            Some(d) if d != "0" => format!("{}#{d}", self.username),
            _ => self.username.clone(),
        }
    }
}

#[derive(Deserialize)]
struct Channel {
    #[serde(rename = "type")]
    kind: u8,
}

#[derive(Deserialize)]
struct SentMessage {
    id: String,
}

impl DiscordPublisher {
    pub fn new(http: reqwest::Client, base_url: &str, token: Option<String>) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            ready: AtomicBool::new(false),
            bot_user: RwLock::new(None),
        }
    }

    /// Log the bot in by resolving its own user. Marks the publisher ready.
    pub async fn connect(&self) -> Result<()> {
        let token = self.token()?;
        let resp = self
            .http
            .get(format!("{}/users/@me", self.base_url))
            .header("Authorization", format!("Bot {token}"))
            .send()
            .await
            .map_err(|e| WeeklyError::Publish(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(WeeklyError::Publish(format!(
                "login rejected with {}",
                resp.status()
            )));
        }
        let user: BotUser = resp
            .json()
            .await
            .map_err(|e| WeeklyError::Publish(e.to_string()))?;

        let tag = user.tag();
        tracing::info!("Discord bot is online as {tag}");
        *self.bot_user.write().unwrap_or_else(|e| e.into_inner()) = Some(tag);
        self.ready.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn token(&self) -> Result<&str> {
        self.token
            .as_deref()
            .ok_or_else(|| WeeklyError::MissingCredentials("DISCORD_TOKEN".to_string()))
    }
}

#[async_trait]
impl Publisher for DiscordPublisher {
    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    fn bot_user(&self) -> Option<String> {
        self.bot_user
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    async fn send(&self, channel_id: &str, message: &str) -> Result<String> {
        let token = self.token()?;
        let auth = format!("Bot {token}");

        let resp = self
            .http
            .get(format!("{}/channels/{channel_id}", self.base_url))
            .header("Authorization", &auth)
            .send()
            .await
            .map_err(|e| WeeklyError::Publish(e.to_string()))?;
        match resp.status().as_u16() {
            404 => return Err(WeeklyError::ChannelNotFound(channel_id.to_string())),
            s if !(200..300).contains(&s) => {
                return Err(WeeklyError::Publish(format!("channel lookup returned {s}")))
            }
            _ => {}
        }
        let channel: Channel = resp
            .json()
            .await
            .map_err(|e| WeeklyError::Publish(e.to_string()))?;
        if !TEXT_CAPABLE.contains(&channel.kind) {
            return Err(WeeklyError::ChannelNotText(channel_id.to_string()));
        }

        let resp = self
            .http
            .post(format!("{}/channels/{channel_id}/messages", self.base_url))
            .header("Authorization", &auth)
            .json(&serde_json::json!({ "content": message }))
            .send()
            .await
            .map_err(|e| WeeklyError::Publish(e.to_string()))?;
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(WeeklyError::Publish(format!("{status}: {body}")));
        }
        let sent: SentMessage = resp
            .json()
            .await
            .map_err(|e| WeeklyError::Publish(e.to_string()))?;
        Ok(sent.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn publisher(url: &str) -> DiscordPublisher {
        DiscordPublisher::new(reqwest::Client::new(), url, Some("bot-token".into()))
    }

    #[tokio::test]
    async fn connect_marks_ready_and_records_tag() {
        let mut server = mockito::Server::new_async().await;
        let _me = server
            .mock("GET", "/users/@me")
            .match_header("authorization", "Bot bot-token")
            .with_status(200)
            .with_body(r#"{"id":"1","username":"weekly","discriminator":"4242"}"#)
            .create_async()
            .await;

        let p = publisher(&server.url());
        assert!(!p.is_ready());
        p.connect().await.unwrap();
        assert!(p.is_ready());
        assert_eq!(p.bot_user().as_deref(), Some("weekly#4242"));
    }

    #[tokio::test]
    async fn rejected_login_stays_connecting() {
        let mut server = mockito::Server::new_async().await;
        let _me = server
            .mock("GET", "/users/@me")
            .with_status(401)
            .create_async()
            .await;

        let p = publisher(&server.url());
        assert!(p.connect().await.is_err());
        assert!(!p.is_ready());
        assert!(p.bot_user().is_none());
    }

    #[tokio::test]
    async fn send_posts_to_text_channel() {
        let mut server = mockito::Server::new_async().await;
        let _channel = server
            .mock("GET", "/channels/55")
            .with_status(200)
            .with_body(r#"{"id":"55","type":0}"#)
            .create_async()
            .await;
        let post = server
            .mock("POST", "/channels/55/messages")
            .match_body(mockito::Matcher::Json(serde_json::json!({ "content": "hello" })))
            .with_status(200)
            .with_body(r#"{"id":"900","channel_id":"55"}"#)
            .create_async()
            .await;

        let id = publisher(&server.url()).send("55", "hello").await.unwrap();
        assert_eq!(id, "900");
        post.assert_async().await;
    }

    #[tokio::test]
    async fn missing_channel_is_not_found() {
        let mut server = mockito::Server::new_async().await;
        let _channel = server
            .mock("GET", "/channels/404")
            .with_status(404)
            .create_async()
            .await;

        let err = publisher(&server.url()).send("404", "hi").await.unwrap_err();
        assert!(matches!(err, WeeklyError::ChannelNotFound(id) if id == "404"));
    }

    #[tokio::test]
    async fn category_channel_is_not_text() {
        let mut server = mockito::Server::new_async().await;
        let _channel = server
            .mock("GET", "/channels/7")
            .with_status(200)
            .with_body(r#"{"id":"7","type":4}"#)
            .create_async()
            .await;

        let err = publisher(&server.url()).send("7", "hi").await.unwrap_err();
        assert!(matches!(err, WeeklyError::ChannelNotText(_)));
    }

    #[test]
    fn pomelo_usernames_drop_zero_discriminator() {
        let user = BotUser {
            username: "weekly".into(),
            discriminator: Some("0".into()),
        };
        assert_eq!(user.tag(), "weekly");
    }
}
