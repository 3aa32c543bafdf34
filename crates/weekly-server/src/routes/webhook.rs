use axum::extract::State;
use axum::Json;
use weekly_core::publish;

use crate::state::AppState;

/// POST /api/webhook: post the weekly review invitation.
///
/// Always answers 200; a failed post is only logged.
pub async fn receive(State(app): State<AppState>) -> Json<serde_json::Value> {
    let message = app.config.review_invitation();
    match app.channel_id.as_deref() {
        Some(channel_id) => {
            if let Err(e) = publish::publish(
                app.publisher.as_ref(),
                app.config.readiness,
                channel_id,
                &message,
            )
            .await
            {
                tracing::error!("webhook publish failed: {e}");
            }
        }
        None => tracing::warn!("webhook received but DISCORD_CHANNEL_ID is not set"),
    }
    Json(serde_json::json!({ "message": "Webhook received" }))
}
