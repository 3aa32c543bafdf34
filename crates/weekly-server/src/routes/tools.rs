//! Client tools the voice agent calls to read and rewrite the update, and
//! to take notes during the interview.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use weekly_core::notes::InterviewNote;

use crate::error::AppError;
use crate::state::{AppState, SessionEvent};

/// GET /api/tools/read-progress-update: current content as plain text.
pub async fn read_progress_update(State(app): State<AppState>) -> String {
    app.session.lock().await.content().to_string()
}

#[derive(Deserialize)]
pub struct UpdateBody {
    pub content: String,
}

/// POST /api/tools/update-progress-update: replace the content.
pub async fn update_progress_update(
    State(app): State<AppState>,
    Json(body): Json<UpdateBody>,
) -> &'static str {
    app.session.lock().await.apply_agent_update(body.content);
    app.notify(SessionEvent::Progress);
    app.schedule_refresh();
    "success"
}

#[derive(Deserialize)]
pub struct NoteBody {
    #[serde(default)]
    pub about: String,
    pub note: String,
}

/// POST /api/tools/take-interview-notes: append a timestamped note.
pub async fn take_interview_notes(
    State(app): State<AppState>,
    Json(body): Json<NoteBody>,
) -> Result<Json<InterviewNote>, AppError> {
    if body.note.trim().is_empty() {
        return Err(AppError::bad_request("Note is required"));
    }
    let note = app
        .session
        .lock()
        .await
        .take_note(body.about, body.note)
        .clone();
    app.notify(SessionEvent::Progress);
    Ok(Json(note))
}
