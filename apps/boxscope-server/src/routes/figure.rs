//! Figure endpoint

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};

use super::with_session;
use crate::error::Result;
use crate::state::AppState;

/// Current page with the current level's boxes, or 204 when nothing is selected
async fn get_figure(State(state): State<AppState>, Path(id): Path<String>) -> Result<Response> {
    let view = with_session(&state, &id, |session, engine| session.current_view(engine)).await?;

    Ok(match view {
        Some(view) => Json(view).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/sessions/:id/figure", get(get_figure))
}
