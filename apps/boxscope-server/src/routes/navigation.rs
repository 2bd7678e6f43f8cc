//! Navigation endpoints
//!
//! Prev/next steps past either end leave the state unchanged; clients read
//! the `*_disabled` fields to grey out their controls.

use axum::{
    extract::{Path, State},
    routing::{post, put},
    Json, Router,
};
use serde::Deserialize;

use super::with_session;
use crate::error::{AppError, Result};
use crate::extraction::Level;
use crate::session::{Direction, NavTarget, NavigationState};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SelectPageRequest {
    pub index: usize,
}

#[derive(Debug, Deserialize)]
pub struct SelectLevelRequest {
    pub level: String,
}

async fn step(
    State(state): State<AppState>,
    Path((id, target, direction)): Path<(String, String, String)>,
) -> Result<Json<NavigationState>> {
    let target: NavTarget = target.parse().map_err(AppError::BadRequest)?;
    let direction: Direction = direction.parse().map_err(AppError::BadRequest)?;

    with_session(&state, &id, move |session, _| Ok(session.navigate(target, direction)))
        .await
        .map(Json)
}

async fn select_page(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<SelectPageRequest>,
) -> Result<Json<NavigationState>> {
    with_session(&state, &id, move |session, _| Ok(session.select_page(request.index)))
        .await
        .map(Json)
}

async fn select_level(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<SelectLevelRequest>,
) -> Result<Json<NavigationState>> {
    let level: Level = request.level.parse().map_err(AppError::BadRequest)?;

    with_session(&state, &id, move |session, _| Ok(session.set_level(level)))
        .await
        .map(Json)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/sessions/:id/navigation/:target/:direction", post(step))
        .route("/sessions/:id/page", put(select_page))
        .route("/sessions/:id/level", put(select_level))
}
