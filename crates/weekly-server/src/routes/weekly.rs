use axum::extract::State;
use axum::http::{header, HeaderMap};
use axum::Json;
use serde::{Deserialize, Serialize};
use weekly_core::generation::{generate_report, GenerationRequest};
use weekly_core::mail::user_id_from_cookie;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Deserialize, Default)]
pub struct WeeklyBody {
    #[serde(default)]
    pub kontext: Option<String>,
    #[serde(default)]
    pub trello: Option<String>,
}

#[derive(Serialize)]
pub struct WeeklyResponse {
    pub response: String,
}

/// POST /api/weekly: stateless generation from the given context blobs.
///
/// Does not touch the editing session.
pub async fn generate_weekly(
    State(app): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<WeeklyBody>,
) -> Result<Json<WeeklyResponse>, AppError> {
    let user = headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(user_id_from_cookie);
    tracing::info!(user = user.as_deref().unwrap_or("anonymous"), "weekly generation requested");

    let request = GenerationRequest::new(body.kontext.as_deref(), body.trello.as_deref());
    let response = generate_report(app.generator.as_ref(), &request).await?;
    Ok(Json(WeeklyResponse { response }))
}
