use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use rust_embed::Embed;

#[derive(Embed)]
#[folder = "../../frontend/dist/"]
struct FrontendAssets;

/// Serve the embedded page and its assets. Unknown paths get `index.html`
/// so client-side routes survive a reload.
pub async fn static_handler(uri: axum::http::Uri) -> Response {
    let path = uri.path().trim_start_matches('/');

    if let Some(asset) = <FrontendAssets as Embed>::get(path) {
        let mime = mime_guess::from_path(path).first_or_octet_stream();
        return (
            StatusCode::OK,
            [(header::CONTENT_TYPE, mime.as_ref())],
            asset.data.into_owned(),
        )
            .into_response();
    }

    // Unmatched API paths are real 404s, not the page.
    if path.starts_with("api/") {
        let body = serde_json::json!({ "error": format!("no route for /{path}") });
        return (StatusCode::NOT_FOUND, axum::Json(body)).into_response();
    }

    match <FrontendAssets as Embed>::get("index.html") {
        Some(page) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
            page.data.into_owned(),
        )
            .into_response(),
        None => (StatusCode::NOT_FOUND, "frontend not bundled").into_response(),
    }
}
