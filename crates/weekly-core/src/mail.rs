//! Connection state reported by the mail personalization provider.
//!
//! The browser SDK owns the OAuth flow; the server only ever sees the
//! resulting status and grounding prompt, plus the user id cookie.

use serde::{Deserialize, Serialize};

/// Cookie the browser sets once the provider is connected.
pub const USER_ID_COOKIE: &str = "kontext_user_id";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MailConnection {
    #[serde(default)]
    pub is_connected: bool,
    #[serde(default)]
    pub system_prompt: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
}

impl MailConnection {
    pub fn disconnected() -> Self {
        Self::default()
    }

    /// Grounding text for generation, if the provider is connected and
    /// produced a non-blank prompt.
    pub fn grounding(&self) -> Option<&str> {
        if !self.is_connected {
            return None;
        }
        self.system_prompt
            .as_deref()
            .filter(|p| !p.trim().is_empty())
    }
}

/// Extract the mail user id from a raw `Cookie` header value.
pub fn user_id_from_cookie(header: &str) -> Option<String> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == USER_ID_COOKIE)
        .map(|(_, value)| value.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disconnected_has_no_grounding() {
        let conn = MailConnection {
            is_connected: false,
            system_prompt: Some("You met Alice on Tuesday".into()),
            user_id: None,
        };
        assert_eq!(conn.grounding(), None);
    }

    #[test]
    fn blank_prompt_has_no_grounding() {
        let conn = MailConnection {
            is_connected: true,
            system_prompt: Some("   ".into()),
            user_id: Some("u1".into()),
        };
        assert_eq!(conn.grounding(), None);
    }

    #[test]
    fn connected_prompt_is_grounding() {
        let conn = MailConnection {
            is_connected: true,
            system_prompt: Some("You met Alice on Tuesday".into()),
            user_id: Some("u1".into()),
        };
        assert_eq!(conn.grounding(), Some("You met Alice on Tuesday"));
    }

    #[test]
    fn deserializes_provider_shape() {
        let conn: MailConnection =
            serde_json::from_str(r#"{"isConnected":true,"systemPrompt":"p","userId":"u"}"#)
                .unwrap();
        assert!(conn.is_connected);
        assert_eq!(conn.user_id.as_deref(), Some("u"));
    }

    #[test]
    fn cookie_lookup() {
        assert_eq!(
            user_id_from_cookie("theme=dark; kontext_user_id=abc123; other=1"),
            Some("abc123".to_string())
        );
        assert_eq!(user_id_from_cookie("kontext_user_id="), None);
        assert_eq!(user_id_from_cookie("theme=dark"), None);
    }
}
