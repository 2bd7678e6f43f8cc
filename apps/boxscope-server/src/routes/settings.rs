//! Extraction settings endpoints

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

use super::with_session;
use crate::error::Result;
use crate::session::{SettingsUpdate, SettingsView};
use crate::state::AppState;

async fn get_settings(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SettingsView>> {
    with_session(&state, &id, |session, _| Ok(session.settings_view()))
        .await
        .map(Json)
}

/// Change DPI, OCR mode or flags; a new DPI re-renders every document
async fn update_settings(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<SettingsUpdate>,
) -> Result<Json<SettingsView>> {
    tracing::debug!(session_id = %id, ?update, "Updating settings");
    with_session(&state, &id, move |session, engine| session.update_settings(engine, &update))
        .await
        .map(Json)
}

pub fn router() -> Router<AppState> {
    Router::new().route("/sessions/:id/settings", get(get_settings).put(update_settings))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use crate::engine::fake::fake_pdf;
    use crate::routes::test_support::{app, create_session, json, send, upload};

    #[tokio::test]
    async fn test_defaults() {
        let (app, _) = app();
        let id = create_session(&app).await;
        let uri = format!("/api/v1/sessions/{}/settings", id);

        let body = json(send(&app, Method::GET, &uri, None).await).await;
        assert_eq!(body["dpi"], 450);
        assert_eq!(body["min_dpi"], 72);
        assert_eq!(body["max_dpi"], 600);
        assert_eq!(body["flags"]["preserve_ligatures"], true);
        assert_eq!(body["flags"]["dehyphenate"], false);
        assert_eq!(body["flag_bits"], 199);
    }

    #[tokio::test]
    async fn test_update_flags_and_mode() {
        let (app, _) = app();
        let id = create_session(&app).await;
        let uri = format!("/api/v1/sessions/{}/settings", id);

        let update = json!({
            "ocr_mode": "full",
            "flags": { "text_preserve_images": true, "dehyphenate": true, "unknown": true }
        });
        let response = send(&app, Method::PUT, &uri, Some(update)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json(response).await;
        assert_eq!(body["ocr_mode"], "full");
        assert_eq!(body["flag_bits"], 4 | 16);
        assert_eq!(body["flags"]["preserve_ligatures"], false);
    }

    #[tokio::test]
    async fn test_update_rejections() {
        let (app, _) = app();
        let id = create_session(&app).await;
        let uri = format!("/api/v1/sessions/{}/settings", id);

        let response = send(&app, Method::PUT, &uri, Some(json!({"ocr_mode": "partial"}))).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json(response).await["error"], "invalid_ocr_mode");

        let response = send(&app, Method::PUT, &uri, Some(json!({"dpi": 1200}))).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_dpi_change_rerenders() {
        let (app, engine) = app();
        let id = create_session(&app).await;
        upload(&app, &id, &[("a.pdf", fake_pdf(1)), ("b.pdf", fake_pdf(1))]).await;
        assert_eq!(engine.renders(), 2);

        let uri = format!("/api/v1/sessions/{}/settings", id);
        let body = json(send(&app, Method::PUT, &uri, Some(json!({"dpi": 150}))).await).await;
        assert_eq!(body["dpi"], 150);
        assert_eq!(engine.renders(), 4);

        send(&app, Method::PUT, &uri, Some(json!({"dpi": 150}))).await;
        assert_eq!(engine.renders(), 4);
    }
}
