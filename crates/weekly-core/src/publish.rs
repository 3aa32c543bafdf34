//! Publishing the finished update to a chat channel.
//!
//! The publisher connects in the background; callers wait for it with a
//! fixed-attempt poll ([`ReadinessPolicy`]) rather than blocking forever.

use crate::error::{Result, WeeklyError};
use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use std::time::Duration;

#[async_trait]
pub trait Publisher: Send + Sync {
    /// Whether the underlying bot has finished connecting.
    fn is_ready(&self) -> bool;

    /// Display name of the connected bot, once known.
    fn bot_user(&self) -> Option<String>;

    /// Send `message` to `channel_id`, returning the new message id.
    async fn send(&self, channel_id: &str, message: &str) -> Result<String>;
}

// ---------------------------------------------------------------------------
// Readiness polling
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadinessPolicy {
    pub max_attempts: u32,
    #[serde(with = "duration_millis")]
    pub interval: Duration,
}

impl Default for ReadinessPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            interval: Duration::from_secs(1),
        }
    }
}

/// Poll `publisher` until ready. Returns the number of waits it took.
pub async fn wait_until_ready(publisher: &dyn Publisher, policy: ReadinessPolicy) -> Result<u32> {
    let mut attempts = 0;
    while !publisher.is_ready() && attempts < policy.max_attempts {
        tokio::time::sleep(policy.interval).await;
        attempts += 1;
    }
    if !publisher.is_ready() {
        return Err(WeeklyError::PublishNotReady { attempts });
    }
    Ok(attempts)
}

// ---------------------------------------------------------------------------
// Publish
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishReceipt {
    pub success: bool,
    pub message_id: String,
    pub channel_id: String,
}

/// Strip mention formatting (`<#123>`, `<@!123>`, …) from a channel id.
pub fn clean_channel_id(raw: &str) -> String {
    static MENTION: OnceLock<Regex> = OnceLock::new();
    let re = MENTION.get_or_init(|| Regex::new(r"[<#@&!>]").expect("static regex"));
    re.replace_all(raw.trim(), "").into_owned()
}

/// Validate, wait for readiness, and send.
pub async fn publish(
    publisher: &dyn Publisher,
    policy: ReadinessPolicy,
    channel_id: &str,
    message: &str,
) -> Result<PublishReceipt> {
    if message.is_empty() {
        return Err(WeeklyError::MissingMessage);
    }
    wait_until_ready(publisher, policy).await?;

    let channel_id = clean_channel_id(channel_id);
    let message_id = publisher.send(&channel_id, message).await?;
    tracing::info!(channel = %channel_id, message = %message_id, "published update");
    Ok(PublishReceipt {
        success: true,
        message_id,
        channel_id,
    })
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(d)?))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
    use std::sync::Mutex;

    struct FakePublisher {
        ready: AtomicBool,
        ready_after_polls: Option<u32>,
        polls: AtomicU32,
        sent: Mutex<Vec<(String, String)>>,
        fail_with: Option<fn(&str) -> WeeklyError>,
    }

    impl FakePublisher {
        fn ready() -> Self {
            Self {
                ready: AtomicBool::new(true),
                ready_after_polls: None,
                polls: AtomicU32::new(0),
                sent: Mutex::new(Vec::new()),
                fail_with: None,
            }
        }

        fn never_ready() -> Self {
            Self {
                ready: AtomicBool::new(false),
                ..Self::ready()
            }
        }
    }

    #[async_trait]
    impl Publisher for FakePublisher {
        fn is_ready(&self) -> bool {
            let polls = self.polls.fetch_add(1, Ordering::SeqCst);
            if let Some(n) = self.ready_after_polls {
                if polls >= n {
                    self.ready.store(true, Ordering::SeqCst);
                }
            }
            self.ready.load(Ordering::SeqCst)
        }

        fn bot_user(&self) -> Option<String> {
            Some("weekly-bot#0001".into())
        }

        async fn send(&self, channel_id: &str, message: &str) -> Result<String> {
            if let Some(fail) = self.fail_with {
                return Err(fail(channel_id));
            }
            self.sent
                .lock()
                .unwrap()
                .push((channel_id.to_string(), message.to_string()));
            Ok("m-1".into())
        }
    }

    fn not_text(id: &str) -> WeeklyError {
        WeeklyError::ChannelNotText(id.to_string())
    }

    #[test]
    fn channel_id_mentions_are_stripped() {
        assert_eq!(clean_channel_id("<#1410308102468796566>"), "1410308102468796566");
        assert_eq!(clean_channel_id(" <@!42> "), "42");
        assert_eq!(clean_channel_id("123"), "123");
    }

    #[tokio::test(start_paused = true)]
    async fn ready_publisher_needs_no_wait() {
        let p = FakePublisher::ready();
        assert_eq!(wait_until_ready(&p, ReadinessPolicy::default()).await.unwrap(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn never_ready_gives_up_after_max_attempts() {
        let p = FakePublisher::never_ready();
        let start = tokio::time::Instant::now();
        let err = wait_until_ready(&p, ReadinessPolicy::default())
            .await
            .unwrap_err();
        assert!(matches!(err, WeeklyError::PublishNotReady { attempts: 10 }));
        assert_eq!(start.elapsed(), Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn becomes_ready_mid_poll() {
        let p = FakePublisher {
            ready_after_polls: Some(3),
            ..FakePublisher::never_ready()
        };
        let attempts = wait_until_ready(&p, ReadinessPolicy::default()).await.unwrap();
        assert_eq!(attempts, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn publish_sends_to_cleaned_channel() {
        let p = FakePublisher::ready();
        let receipt = publish(&p, ReadinessPolicy::default(), "<#99>", "## Achievements")
            .await
            .unwrap();
        assert_eq!(
            receipt,
            PublishReceipt {
                success: true,
                message_id: "m-1".into(),
                channel_id: "99".into(),
            }
        );
        assert_eq!(p.sent.lock().unwrap()[0].0, "99");
    }

    #[tokio::test(start_paused = true)]
    async fn empty_message_is_rejected_before_waiting() {
        let p = FakePublisher::never_ready();
        let err = publish(&p, ReadinessPolicy::default(), "1", "").await.unwrap_err();
        assert!(matches!(err, WeeklyError::MissingMessage));
        assert_eq!(p.polls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn invalid_target_is_surfaced() {
        let p = FakePublisher {
            fail_with: Some(not_text),
            ..FakePublisher::ready()
        };
        let err = publish(&p, ReadinessPolicy::default(), "7", "hi").await.unwrap_err();
        assert!(err.is_invalid_target());
    }

    #[test]
    fn policy_interval_serializes_as_millis() {
        let json = serde_json::to_value(ReadinessPolicy::default()).unwrap();
        assert_eq!(json, serde_json::json!({ "max_attempts": 10, "interval": 1000 }));
    }
}
