pub mod clients;
pub mod embed;
pub mod error;
pub mod routes;
pub mod state;

use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use state::{AppState, Collaborators, Secrets};

/// Build the axum Router with all API routes and middleware.
/// Used by `serve()` and available for integration testing.
pub fn build_router(app_state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Events (SSE)
        .route("/api/events", get(routes::events::sse_events))
        // Progress document
        .route("/api/progress", get(routes::progress::get_progress))
        .route(
            "/api/progress/edit",
            post(routes::progress::begin_edit).put(routes::progress::edit_scratch),
        )
        .route("/api/progress/save", post(routes::progress::save))
        .route("/api/progress/cancel", post(routes::progress::cancel))
        .route("/api/progress/generate", post(routes::progress::generate))
        .route("/api/progress/mail", put(routes::progress::put_mail))
        .route("/api/progress/board", put(routes::progress::put_board))
        .route(
            "/api/progress/board/connect",
            post(routes::progress::connect_board),
        )
        .route(
            "/api/progress/publish",
            post(routes::progress::publish_progress),
        )
        // Stateless generation
        .route("/api/weekly", post(routes::weekly::generate_weekly))
        // Board proxy
        .route("/api/trello/board", get(routes::trello::get_board))
        // Discord
        .route(
            "/api/discord",
            get(routes::discord::status).post(routes::discord::send),
        )
        .route("/api/webhook", post(routes::webhook::receive))
        // Voice agent tools
        .route(
            "/api/tools/read-progress-update",
            get(routes::tools::read_progress_update),
        )
        .route(
            "/api/tools/update-progress-update",
            post(routes::tools::update_progress_update),
        )
        .route(
            "/api/tools/take-interview-notes",
            post(routes::tools::take_interview_notes),
        )
        .fallback(embed::static_handler)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

/// Start the web UI server.
///
/// Frontend assets are embedded in the binary via rust-embed.
pub async fn serve(app_state: AppState, port: u16, open_browser: bool) -> anyhow::Result<()> {
    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    serve_on(app_state, listener, open_browser).await
}

/// Start the web UI server on a pre-bound listener.
///
/// Unlike `serve`, this accepts a `TcpListener` that was already bound so the
/// caller can read the actual port before starting (useful when `port = 0` and
/// the OS picks a free port).
pub async fn serve_on(
    app_state: AppState,
    listener: tokio::net::TcpListener,
    open_browser: bool,
) -> anyhow::Result<()> {
    let actual_port = listener.local_addr()?.port();
    let session = app_state.session.clone();
    let app = build_router(app_state);

    tracing::info!("Weekly update server listening on http://localhost:{actual_port}");

    if open_browser {
        let url = format!("http://localhost:{actual_port}");
        let _ = open::that(&url);
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    // Pending reveal/settle deadlines must not fire after shutdown.
    session.lock().await.teardown();
    tracing::info!("server stopped");
    Ok(())
}
