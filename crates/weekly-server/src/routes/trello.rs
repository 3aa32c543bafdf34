use axum::extract::{Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use crate::error::AppError;
use crate::routes::progress::default_board_id;
use crate::state::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardQuery {
    pub board_id: Option<String>,
}

/// GET /api/trello/board: pass the board dump through unchanged.
pub async fn get_board(
    State(app): State<AppState>,
    Query(q): Query<BoardQuery>,
) -> Result<Response, AppError> {
    let board_id = q
        .board_id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| default_board_id(&app));

    let dump = app.boards.fetch_board(&board_id).await?;
    Ok(([(header::CONTENT_TYPE, "application/json")], dump).into_response())
}
