//! Boxscope Server Library
//!
//! Renders PDF pages and overlays the text geometry MuPDF extracts from
//! them (blocks, lines, spans, words), so a user can audit how a page is
//! segmented under a given set of extraction flags, OCR mode and DPI.
//!
//! # Modules
//!
//! - `geometry`: point/pixel rectangles and the DPI transform
//! - `extraction`: flag resolution, OCR modes, levels, page geometry
//! - `engine`: the rasterizer/extractor seam; `mupdf` implements it
//! - `ocr`: tesseract-backed OCR text layer
//! - `store`: per-session documents, page rasters and geometry slots
//! - `session`: cache invalidation, navigation, settings, session manager
//! - `figure`: plotly-compatible figure assembly
//! - `routes`: HTTP API

pub mod config;
pub mod engine;
pub mod error;
pub mod extraction;
pub mod figure;
pub mod geometry;
pub mod mupdf;
pub mod ocr;
pub mod routes;
pub mod session;
pub mod state;
pub mod store;

use axum::{routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use state::AppState;

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/api/v1", routes::api_router(state.config()))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
