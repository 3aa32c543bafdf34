//! Generating a new update body from mail and board context.

use crate::error::{Result, WeeklyError};
use crate::session::{EditingSession, GenerationOutcome, GenerationTicket};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

/// Instruction sent alongside the grounding context.
pub const REPORT_INSTRUCTIONS: &str = "\
Write my weekly progress update as a markdown report with exactly these four sections, in this order:

## Achievements
## Blockers
## Next Week's Goals
## Meetings

Use short bullet points. Only use facts from the provided context; if a section has nothing to report, write \"- None\".";

/// What the text-generation collaborator receives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationPrompt {
    /// Combined grounding context, sent as the system input.
    pub system: String,
    pub instructions: String,
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Produce text for `prompt`. Unreachable services and non-success
    /// answers surface as [`WeeklyError::Generation`].
    async fn generate(&self, prompt: &GenerationPrompt) -> Result<String>;
}

// ---------------------------------------------------------------------------
// GenerationRequest
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    #[serde(default)]
    pub mail_context: Option<String>,
    #[serde(default)]
    pub board_context: Option<String>,
}

impl GenerationRequest {
    pub fn new(mail_context: Option<&str>, board_context: Option<&str>) -> Self {
        Self {
            mail_context: mail_context.map(str::to_string),
            board_context: board_context.map(str::to_string),
        }
    }

    /// Mail context first, board context second. Blank inputs count as absent.
    pub fn combined_context(&self) -> Result<String> {
        let parts: Vec<&str> = [self.mail_context.as_deref(), self.board_context.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();
        if parts.is_empty() {
            return Err(WeeklyError::MissingContext);
        }
        Ok(parts.join("\n\n"))
    }

    pub fn prompt(&self) -> Result<GenerationPrompt> {
        let system = self.combined_context()?;
        tracing::debug!(context = %preview(&system), "combined generation context");
        Ok(GenerationPrompt {
            system,
            instructions: REPORT_INSTRUCTIONS.to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// Orchestration
// ---------------------------------------------------------------------------

/// Stateless generation: validate the context and call the generator.
pub async fn generate_report(
    generator: &dyn TextGenerator,
    request: &GenerationRequest,
) -> Result<String> {
    let prompt = request.prompt()?;
    generator.generate(&prompt).await
}

/// Generate into the session's document.
///
/// Uses `request` if given, otherwise the session's stored mail and board
/// context. The session lock is not held while the generator runs. A
/// response that was superseded while in flight is discarded.
pub async fn generate_into(
    session: &Mutex<EditingSession>,
    generator: &dyn TextGenerator,
    request: Option<GenerationRequest>,
) -> Result<GenerationOutcome> {
    let (ticket, prompt) = {
        let mut s = session.lock().await;
        let request = request.unwrap_or_else(|| s.generation_request());
        let prompt = request.prompt()?;
        (s.begin_generation()?, prompt)
    };
    let mut pending = PendingGeneration {
        session,
        ticket: Some(ticket),
    };

    let result = generator.generate(&prompt).await;
    if let Err(e) = &result {
        tracing::warn!("generation failed: {e}");
    }

    let mut s = session.lock().await;
    pending.ticket = None;
    s.finish_generation(ticket, result)
}

/// Releases the busy flag when a generation future is dropped before it
/// reconciles its result.
struct PendingGeneration<'a> {
    session: &'a Mutex<EditingSession>,
    ticket: Option<GenerationTicket>,
}

impl Drop for PendingGeneration<'_> {
    fn drop(&mut self) {
        let Some(ticket) = self.ticket.take() else {
            return;
        };
        match self.session.try_lock() {
            Ok(mut s) => s.abandon_generation(ticket),
            Err(_) => tracing::warn!(
                ticket = ticket.sequence(),
                "session locked, abandoned generation stays in flight"
            ),
        }
    }
}

fn preview(text: &str) -> &str {
    match text.char_indices().nth(200) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
