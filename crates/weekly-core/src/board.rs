//! Task-board snapshot used as generation context.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Board fetched when the caller does not name one.
pub const DEFAULT_BOARD_ID: &str = "68b2d261fd8b6b2f72c7167d";

/// Query parameters that make Trello return the full board in one call.
pub const BOARD_DUMP_QUERY: &[(&str, &str)] = &[
    ("fields", "all"),
    ("lists", "all"),
    ("list_fields", "all"),
    ("cards", "all"),
    ("card_fields", "all"),
    ("members", "all"),
    ("member_fields", "all"),
    ("labels", "all"),
    ("checklists", "all"),
];

#[async_trait]
pub trait BoardProvider: Send + Sync {
    /// Fetch the raw board dump. Non-success upstream answers surface as
    /// [`crate::WeeklyError::BoardFetch`].
    async fn fetch_board(&self, board_id: &str) -> Result<String>;
}

/// Board text as held by the editing session.
///
/// A failed fetch is stored as its error text so it can be shown inline;
/// `connected` tells the two apart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardContext {
    pub text: String,
    pub connected: bool,
}

impl BoardContext {
    pub fn from_fetch(result: Result<String>) -> Self {
        match result {
            Ok(text) => Self {
                text,
                connected: true,
            },
            Err(e) => {
                tracing::warn!("board fetch failed: {e}");
                Self {
                    text: format!("Error: {e}"),
                    connected: false,
                }
            }
        }
    }

    /// Text edited by hand counts as connected context when non-blank.
    pub fn manual(text: impl Into<String>) -> Self {
        let text = text.into();
        let connected = !text.trim().is_empty();
        Self { text, connected }
    }

    /// Grounding text for generation. Error text is never used as grounding.
    pub fn grounding(&self) -> Option<&str> {
        if !self.connected {
            return None;
        }
        Some(self.text.as_str()).filter(|t| !t.trim().is_empty())
    }
}
