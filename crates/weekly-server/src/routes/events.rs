use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use std::convert::Infallible;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;

use crate::state::AppState;

/// GET /api/events: SSE stream naming what changed in the session.
///
/// Event names are `progress` (content, mode or busy flag), `context` (mail
/// or board) and `reveal` (a presentation deadline passed). Lagged
/// receivers simply skip the missed events; the page refetches anyway.
pub async fn sse_events(State(app): State<AppState>) -> impl axum::response::IntoResponse {
    let rx = app.event_tx.subscribe();
    let stream = BroadcastStream::new(rx).filter_map(|msg| {
        msg.ok().map(|kind| {
            Ok::<Event, Infallible>(Event::default().event(kind.as_str()).data(kind.as_str()))
        })
    });
    Sse::new(stream).keep_alive(KeepAlive::default())
}
