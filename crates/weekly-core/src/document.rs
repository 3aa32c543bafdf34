//! The progress update being composed and its edit/save/cancel workflow.

use crate::error::{Result, WeeklyError};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// ProgressUpdate
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressUpdate {
    pub id: Uuid,
    pub week_of: NaiveDate,
    content: String,
}

impl ProgressUpdate {
    pub fn new(week_of: NaiveDate, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            week_of,
            content: content.into(),
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// e.g. "Week of Monday, January 6, 2025"
    pub fn week_label(&self) -> String {
        format!("Week of {}", self.week_of.format("%A, %B %-d, %Y"))
    }

    pub(crate) fn set_content(&mut self, content: String) {
        self.content = content;
    }
}

/// Monday of the week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let offset = date.weekday().num_days_from_monday();
    date - chrono::Duration::days(i64::from(offset))
}

// ---------------------------------------------------------------------------
// EditMode
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditMode {
    Viewing,
    Editing,
}

impl EditMode {
    pub fn as_str(self) -> &'static str {
        match self {
            EditMode::Viewing => "viewing",
            EditMode::Editing => "editing",
        }
    }
}

impl fmt::Display for EditMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Editor
// ---------------------------------------------------------------------------

/// Owns the document and the scratch buffer used while editing.
///
/// `content` only changes through [`Editor::save`] or
/// [`Editor::replace_content`]; the scratch buffer is never read back
/// into the document implicitly.
#[derive(Debug, Clone)]
pub struct Editor {
    update: ProgressUpdate,
    mode: EditMode,
    scratch: String,
}

impl Editor {
    pub fn new(update: ProgressUpdate) -> Self {
        Self {
            update,
            mode: EditMode::Viewing,
            scratch: String::new(),
        }
    }

    pub fn update(&self) -> &ProgressUpdate {
        &self.update
    }

    pub fn content(&self) -> &str {
        self.update.content()
    }

    pub fn mode(&self) -> EditMode {
        self.mode
    }

    /// The scratch buffer, only meaningful while editing.
    pub fn scratch(&self) -> Option<&str> {
        match self.mode {
            EditMode::Editing => Some(&self.scratch),
            EditMode::Viewing => None,
        }
    }

    /// viewing → editing. Seeds the scratch buffer with the current content.
    pub fn begin_edit(&mut self) -> Result<&str> {
        self.require(EditMode::Viewing, EditMode::Editing)?;
        self.scratch = self.update.content().to_string();
        self.mode = EditMode::Editing;
        Ok(&self.scratch)
    }

    /// Replace the scratch buffer. Does not touch the document.
    pub fn edit_scratch(&mut self, text: impl Into<String>) -> Result<()> {
        self.require(EditMode::Editing, EditMode::Editing)?;
        self.scratch = text.into();
        Ok(())
    }

    /// Commit `content` as the new document body and return to viewing.
    pub fn save(&mut self, content: impl Into<String>) -> Result<&str> {
        self.require(EditMode::Editing, EditMode::Viewing)?;
        self.scratch.clear();
        self.mode = EditMode::Viewing;
        self.update.set_content(content.into());
        Ok(self.update.content())
    }

    /// Commit whatever is in the scratch buffer.
    pub fn save_scratch(&mut self) -> Result<&str> {
        self.require(EditMode::Editing, EditMode::Viewing)?;
        let content = std::mem::take(&mut self.scratch);
        self.save(content)
    }

    /// Discard the scratch buffer and return to viewing.
    pub fn cancel(&mut self) -> Result<()> {
        self.require(EditMode::Editing, EditMode::Viewing)?;
        self.scratch.clear();
        self.mode = EditMode::Viewing;
        Ok(())
    }

    /// Replace the content without changing mode. Used for generated text
    /// and agent-tool writes.
    pub fn replace_content(&mut self, content: impl Into<String>) {
        self.update.set_content(content.into());
    }

    fn require(&self, expected: EditMode, to: EditMode) -> Result<()> {
        if self.mode != expected {
            return Err(WeeklyError::InvalidTransition {
                from: self.mode.to_string(),
                to: to.to_string(),
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
