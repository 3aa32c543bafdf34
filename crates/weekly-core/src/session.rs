//! One user's editing session: the document, its reveal presentation, and
//! the context gathered for generation.
//!
//! Every content mutation goes through [`EditingSession::commit`] so the
//! presentation always diffs against the value that was current right
//! before the newest write.

use crate::board::BoardContext;
use crate::clock::Clock;
use crate::config::Config;
use crate::document::{week_start, EditMode, Editor, ProgressUpdate};
use crate::error::{Result, WeeklyError};
use crate::generation::GenerationRequest;
use crate::mail::MailConnection;
use crate::notes::InterviewNote;
use crate::presentation::{DiffPresentation, PresentationSnapshot};
use crate::render::{self, View};
use chrono::NaiveDate;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

// ---------------------------------------------------------------------------
// Generation sequencing
// ---------------------------------------------------------------------------

/// Identifies one generation request. Only the latest issued ticket may
/// write its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationTicket(u64);

impl GenerationTicket {
    pub fn sequence(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationOutcome {
    Applied,
    /// A newer write superseded this request while it was in flight.
    Discarded,
}

// ---------------------------------------------------------------------------
// SessionView
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub progress_update: ProgressUpdate,
    pub week_label: String,
    pub mode: EditMode,
    pub scratch: Option<String>,
    pub busy: bool,
    pub revision: u64,
    pub presentation: PresentationSnapshot,
    pub view: View,
    pub mail_connected: bool,
    pub board: BoardContext,
    pub notes: Vec<InterviewNote>,
}

// ---------------------------------------------------------------------------
// EditingSession
// ---------------------------------------------------------------------------

pub struct EditingSession {
    editor: Editor,
    presentation: DiffPresentation,
    clock: Arc<dyn Clock>,
    mail: MailConnection,
    board: BoardContext,
    notes: Vec<InterviewNote>,
    last_ticket: u64,
    in_flight: Option<u64>,
    revision: u64,
}

impl EditingSession {
    /// Start a session for the current week.
    pub fn new(config: &Config, seed: impl Into<String>, clock: Arc<dyn Clock>) -> Self {
        let today = chrono::Local::now().date_naive();
        Self::for_week(config, week_start(today), seed, clock)
    }

    pub fn for_week(
        config: &Config,
        week_of: NaiveDate,
        seed: impl Into<String>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let update = ProgressUpdate::new(week_of, seed);
        let mut presentation = DiffPresentation::new(config.reveal.timings());
        presentation.observe(update.content(), clock.now());
        Self {
            editor: Editor::new(update),
            presentation,
            clock,
            mail: MailConnection::disconnected(),
            board: BoardContext::default(),
            notes: Vec::new(),
            last_ticket: 0,
            in_flight: None,
            revision: 0,
        }
    }

    // -- accessors ----------------------------------------------------------

    pub fn content(&self) -> &str {
        self.editor.content()
    }

    pub fn update(&self) -> &ProgressUpdate {
        self.editor.update()
    }

    pub fn mode(&self) -> EditMode {
        self.editor.mode()
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Incremented on every content write.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn presentation(&self) -> &DiffPresentation {
        &self.presentation
    }

    pub fn mail(&self) -> &MailConnection {
        &self.mail
    }

    pub fn board(&self) -> &BoardContext {
        &self.board
    }

    /// Interview notes, oldest first.
    pub fn notes(&self) -> &[InterviewNote] {
        &self.notes
    }

    // -- editing workflow ---------------------------------------------------

    pub fn begin_edit(&mut self) -> Result<String> {
        self.editor.begin_edit().map(str::to_string)
    }

    pub fn edit_scratch(&mut self, text: impl Into<String>) -> Result<()> {
        self.editor.edit_scratch(text)
    }

    /// Commit `content`, or the scratch buffer when `None`.
    pub fn save(&mut self, content: Option<String>) -> Result<()> {
        match content {
            Some(c) => self.editor.save(c)?,
            None => self.editor.save_scratch()?,
        };
        self.supersede_generation("save");
        self.commit();
        Ok(())
    }

    pub fn cancel(&mut self) -> Result<()> {
        self.editor.cancel()
    }

    /// Write from the voice agent's update tool. Does not change mode.
    pub fn apply_agent_update(&mut self, content: impl Into<String>) {
        self.editor.replace_content(content);
        self.supersede_generation("agent update");
        self.commit();
    }

    /// Append a note from the voice agent. Notes never touch the document.
    pub fn take_note(
        &mut self,
        about: impl Into<String>,
        note: impl Into<String>,
    ) -> &InterviewNote {
        self.notes.push(InterviewNote::new(about, note, chrono::Utc::now()));
        &self.notes[self.notes.len() - 1]
    }

    // -- context ------------------------------------------------------------

    pub fn set_mail(&mut self, mail: MailConnection) {
        self.mail = mail;
    }

    pub fn set_board(&mut self, board: BoardContext) {
        self.board = board;
    }

    pub fn set_board_text(&mut self, text: impl Into<String>) {
        self.board = BoardContext::manual(text);
    }

    /// Generation request built from the stored mail and board context.
    pub fn generation_request(&self) -> GenerationRequest {
        GenerationRequest::new(self.mail.grounding(), self.board.grounding())
    }

    // -- generation ---------------------------------------------------------

    /// Mark a generation as in flight. Fails while another one is pending
    /// or while the user is editing.
    pub fn begin_generation(&mut self) -> Result<GenerationTicket> {
        if self.in_flight.is_some() {
            return Err(WeeklyError::GenerationInFlight);
        }
        if self.editor.mode() == EditMode::Editing {
            return Err(WeeklyError::InvalidTransition {
                from: EditMode::Editing.to_string(),
                to: "generating".to_string(),
            });
        }
        self.last_ticket += 1;
        self.in_flight = Some(self.last_ticket);
        Ok(GenerationTicket(self.last_ticket))
    }

    /// Reconcile a finished generation. Stale results, successful or not,
    /// are discarded.
    pub fn finish_generation(
        &mut self,
        ticket: GenerationTicket,
        result: Result<String>,
    ) -> Result<GenerationOutcome> {
        if self.in_flight != Some(ticket.0) {
            tracing::info!(ticket = ticket.0, "discarding superseded generation result");
            return Ok(GenerationOutcome::Discarded);
        }
        self.in_flight = None;

        let content = result?;
        self.editor.replace_content(content);
        self.commit();
        Ok(GenerationOutcome::Applied)
    }

    /// Release `ticket` without touching the document. Used when the
    /// request was dropped before its result arrived.
    pub fn abandon_generation(&mut self, ticket: GenerationTicket) {
        if self.in_flight == Some(ticket.0) {
            tracing::info!(ticket = ticket.0, "generation abandoned");
            self.in_flight = None;
        }
    }

    // -- presentation -------------------------------------------------------

    /// Apply elapsed reveal deadlines.
    pub fn tick(&mut self) {
        self.presentation.tick(self.clock.now());
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.presentation.next_deadline()
    }

    /// Tick, then build the full read model for the UI.
    pub fn view(&mut self) -> SessionView {
        self.tick();
        let presentation = self.presentation.snapshot();
        SessionView {
            progress_update: self.editor.update().clone(),
            week_label: self.editor.update().week_label(),
            mode: self.editor.mode(),
            scratch: self.editor.scratch().map(str::to_string),
            busy: self.is_busy(),
            revision: self.revision,
            view: render::render(&presentation, self.editor.content()),
            presentation,
            mail_connected: self.mail.is_connected,
            board: self.board.clone(),
            notes: self.notes.clone(),
        }
    }

    /// Release presentation deadlines. The document itself is untouched.
    pub fn teardown(&mut self) {
        self.presentation.teardown();
    }

    fn commit(&mut self) {
        self.revision += 1;
        let now = self.clock.now();
        self.presentation.observe(self.editor.content(), now);
    }

    fn supersede_generation(&mut self, by: &str) {
        if let Some(seq) = self.in_flight.take() {
            tracing::info!(ticket = seq, "{by} supersedes in-flight generation");
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
