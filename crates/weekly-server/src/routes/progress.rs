use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use weekly_core::board::{BoardContext, DEFAULT_BOARD_ID};
use weekly_core::generation::generate_into;
use weekly_core::mail::MailConnection;
use weekly_core::publish::{self, PublishReceipt};
use weekly_core::session::{GenerationOutcome, SessionView};

use crate::error::AppError;
use crate::state::{AppState, SessionEvent};

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

/// GET /api/progress: document, mode and rendered view.
pub async fn get_progress(State(app): State<AppState>) -> Json<SessionView> {
    Json(app.session.lock().await.view())
}

/// POST /api/progress/edit: enter edit mode with a scratch copy.
pub async fn begin_edit(State(app): State<AppState>) -> Result<Json<SessionView>, AppError> {
    let view = {
        let mut session = app.session.lock().await;
        session.begin_edit()?;
        session.view()
    };
    app.notify(SessionEvent::Progress);
    Ok(Json(view))
}

#[derive(Deserialize)]
pub struct ScratchBody {
    pub content: String,
}

/// PUT /api/progress/edit: replace the scratch buffer.
pub async fn edit_scratch(
    State(app): State<AppState>,
    Json(body): Json<ScratchBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    app.session.lock().await.edit_scratch(body.content)?;
    Ok(Json(serde_json::json!({ "ok": true })))
}

#[derive(Deserialize, Default)]
pub struct SaveBody {
    #[serde(default)]
    pub content: Option<String>,
}

/// POST /api/progress/save: commit `content`, or the scratch buffer.
pub async fn save(
    State(app): State<AppState>,
    Json(body): Json<SaveBody>,
) -> Result<Json<SessionView>, AppError> {
    let view = {
        let mut session = app.session.lock().await;
        session.save(body.content)?;
        session.view()
    };
    app.notify(SessionEvent::Progress);
    app.schedule_refresh();
    Ok(Json(view))
}

/// POST /api/progress/cancel: leave edit mode, dropping the scratch buffer.
pub async fn cancel(State(app): State<AppState>) -> Result<Json<SessionView>, AppError> {
    let view = {
        let mut session = app.session.lock().await;
        session.cancel()?;
        session.view()
    };
    app.notify(SessionEvent::Progress);
    Ok(Json(view))
}

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

/// POST /api/progress/generate: regenerate the document from the stored
/// mail and board context.
///
/// The generation runs on its own task so a client that hangs up does not
/// cancel it halfway and leave the session busy.
pub async fn generate(State(app): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    let task = tokio::spawn({
        let app = app.clone();
        async move {
            let result = generate_into(&app.session, app.generator.as_ref(), None).await;
            // Busy cleared either way.
            app.notify(SessionEvent::Progress);
            if matches!(result, Ok(GenerationOutcome::Applied)) {
                app.schedule_refresh();
            }
            result
        }
    });
    let outcome = task
        .await
        .map_err(|e| anyhow::anyhow!("generation task failed: {e}"))??;

    let view = app.session.lock().await.view();
    Ok(Json(serde_json::json!({
        "outcome": outcome,
        "progress": view,
    })))
}

// ---------------------------------------------------------------------------
// Context
// ---------------------------------------------------------------------------

/// PUT /api/progress/mail: record the mail provider's connection state.
pub async fn put_mail(
    State(app): State<AppState>,
    Json(mail): Json<MailConnection>,
) -> Json<serde_json::Value> {
    let connected = mail.is_connected;
    if let Some(user) = mail.user_id.as_deref() {
        tracing::debug!(user, connected, "mail connection updated");
    }
    app.session.lock().await.set_mail(mail);
    app.notify(SessionEvent::Context);
    Json(serde_json::json!({ "isConnected": connected }))
}

#[derive(Deserialize)]
pub struct BoardTextBody {
    pub text: String,
}

/// PUT /api/progress/board: replace the board text by hand.
pub async fn put_board(
    State(app): State<AppState>,
    Json(body): Json<BoardTextBody>,
) -> Json<BoardContext> {
    let board = {
        let mut session = app.session.lock().await;
        session.set_board_text(body.text);
        session.board().clone()
    };
    app.notify(SessionEvent::Context);
    Json(board)
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ConnectBoardBody {
    #[serde(default)]
    pub board_id: Option<String>,
}

/// POST /api/progress/board/connect: fetch the board into the session.
///
/// Fails open: a fetch error is stored as the board text and the response
/// is still 200.
pub async fn connect_board(
    State(app): State<AppState>,
    Json(body): Json<ConnectBoardBody>,
) -> Json<BoardContext> {
    let board_id = body
        .board_id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| default_board_id(&app));

    let board = BoardContext::from_fetch(app.boards.fetch_board(&board_id).await);
    app.session.lock().await.set_board(board.clone());
    app.notify(SessionEvent::Context);
    Json(board)
}

pub(crate) fn default_board_id(app: &AppState) -> String {
    if app.config.default_board_id.is_empty() {
        DEFAULT_BOARD_ID.to_string()
    } else {
        app.config.default_board_id.clone()
    }
}

// ---------------------------------------------------------------------------
// Publish
// ---------------------------------------------------------------------------

/// POST /api/progress/publish: send the current document to the channel.
pub async fn publish_progress(
    State(app): State<AppState>,
) -> Result<Json<PublishReceipt>, AppError> {
    let channel_id = app
        .channel_id
        .clone()
        .ok_or_else(|| AppError::bad_request("Channel ID is required"))?;
    let content = app.session.lock().await.content().to_string();

    let receipt = publish::publish(
        app.publisher.as_ref(),
        app.config.readiness,
        &channel_id,
        &content,
    )
    .await?;
    Ok(Json(receipt))
}
