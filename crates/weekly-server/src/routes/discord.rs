use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use weekly_core::publish::{self, PublishReceipt};

use crate::error::AppError;
use crate::state::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscordStatus {
    pub status: &'static str,
    pub bot_user: Option<String>,
}

/// GET /api/discord: whether the bot has finished connecting.
pub async fn status(State(app): State<AppState>) -> Json<DiscordStatus> {
    let status = if app.publisher.is_ready() {
        "ready"
    } else {
        "connecting"
    };
    Json(DiscordStatus {
        status,
        bot_user: app.publisher.bot_user(),
    })
}

#[derive(Deserialize)]
pub struct SendBody {
    #[serde(default)]
    pub message: String,
}

/// POST /api/discord: send an arbitrary message to the configured channel.
pub async fn send(
    State(app): State<AppState>,
    Json(body): Json<SendBody>,
) -> Result<Json<PublishReceipt>, AppError> {
    let channel_id = app
        .channel_id
        .as_deref()
        .ok_or_else(|| AppError::bad_request("Channel ID is required"))?;
    let receipt = publish::publish(
        app.publisher.as_ref(),
        app.config.readiness,
        channel_id,
        &body.message,
    )
    .await?;
    Ok(Json(receipt))
}
