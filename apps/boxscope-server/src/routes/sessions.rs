//! Session endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use uuid::Uuid;

use super::with_session;
use crate::error::{AppError, Result};
use crate::session::{SessionSnapshot, SettingsView};
use crate::state::AppState;

#[derive(Serialize)]
pub struct CreateSessionResponse {
    pub id: Uuid,
    pub settings: SettingsView,
}

async fn create_session(
    State(state): State<AppState>,
) -> (StatusCode, Json<CreateSessionResponse>) {
    let session = state.sessions().create_session().await;
    let (id, settings) = {
        let session = session.lock();
        (session.id, session.settings_view())
    };
    (StatusCode::CREATED, Json(CreateSessionResponse { id, settings }))
}

async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionSnapshot>> {
    with_session(&state, &id, |session, _| Ok(session.snapshot()))
        .await
        .map(Json)
}

async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let uuid = Uuid::parse_str(&id).map_err(|_| AppError::SessionNotFound(id.clone()))?;
    state.sessions().remove_session(uuid).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/sessions", post(create_session))
        .route("/sessions/:id", get(get_session).delete(delete_session))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};

    use crate::routes::test_support::{app, create_session, json, send};

    #[tokio::test]
    async fn test_session_lifecycle() {
        let (app, _) = app();
        let id = create_session(&app).await;

        let response = send(&app, Method::GET, &format!("/api/v1/sessions/{}", id), None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json(response).await;
        assert_eq!(body["id"], id.as_str());
        assert_eq!(body["settings"]["dpi"], 450);
        assert_eq!(body["settings"]["ocr_mode"], "off");
        assert_eq!(body["navigation"]["doc_idx"], serde_json::Value::Null);

        let uri = format!("/api/v1/sessions/{}", id);
        let response = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = send(&app, Method::GET, &uri, None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(json(response).await["error"], "session_not_found");
    }

    #[tokio::test]
    async fn test_unknown_session() {
        let (app, _) = app();
        let response = send(&app, Method::GET, "/api/v1/sessions/garbage", None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
