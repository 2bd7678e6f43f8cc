//! Route modules for the Boxscope server

pub mod documents;
pub mod figure;
pub mod health;
pub mod navigation;
pub mod sessions;
pub mod settings;

use axum::Router;

use crate::config::Config;
use crate::engine::PdfEngine;
use crate::error::Result;
use crate::session::Session;
use crate::state::AppState;

/// All `/api/v1` routes
pub fn api_router(config: &Config) -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(sessions::router())
        .merge(documents::router(config.upload.max_bytes))
        .merge(navigation::router())
        .merge(settings::router())
        .merge(figure::router())
}

/// Run `f` against a session on a blocking worker thread
///
/// Session work may rasterize or extract whole documents, so it never runs
/// on the async executor.
pub(crate) async fn with_session<T, F>(state: &AppState, id: &str, f: F) -> Result<T>
where
    F: FnOnce(&mut Session, &dyn PdfEngine) -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    let session = state.sessions().get_session_by_str(id).await?;
    let engine = state.engine();

    tokio::task::spawn_blocking(move || {
        let mut session = session.lock();
        session.touch();
        let result = f(&mut session, engine.as_ref());
        // the work may have run long enough to age the session
        session.touch();
        result
    })
    .await?
}
