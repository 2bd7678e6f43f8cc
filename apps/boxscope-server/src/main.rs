//! Boxscope Server
//!
//! HTTP front end for inspecting MuPDF page segmentation.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use boxscope_server::config::Config;
use boxscope_server::engine::SharedEngine;
use boxscope_server::mupdf::MuPdfEngine;
use boxscope_server::ocr::{OcrProvider, TesseractProvider};
use boxscope_server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "boxscope_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env();

    tracing::info!("Starting Boxscope Server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "Render DPI: {} (range {}..={})",
        config.render.default_dpi,
        config.render.min_dpi,
        config.render.max_dpi
    );

    // OCR is optional; without tesseract, auto/full extraction reports an error
    let tesseract = TesseractProvider::new(&config.ocr.tesseract_path, &config.ocr.language);
    let engine = if tesseract.is_available() {
        tracing::info!(
            "OCR enabled: {} (lang {}, {} dpi)",
            config.ocr.tesseract_path.display(),
            config.ocr.language,
            config.ocr.dpi
        );
        MuPdfEngine::new().with_ocr(
            Arc::new(tesseract),
            config.ocr.dpi,
            Some(config.ocr.language.clone()),
        )
    } else {
        tracing::warn!(
            "tesseract not found at {}; OCR modes auto/full will fail",
            config.ocr.tesseract_path.display()
        );
        MuPdfEngine::new()
    };
    let engine: SharedEngine = Arc::new(engine);

    let state = AppState::new(config.clone(), engine);
    let _cleanup = state
        .sessions()
        .clone()
        .start_cleanup_task(Duration::from_secs(config.sessions.cleanup_interval_secs));

    let app = boxscope_server::build_router(state);

    // Start server with graceful shutdown
    let host: std::net::IpAddr = config
        .server
        .host
        .parse()
        .with_context(|| format!("Invalid SERVER_HOST: {}", config.server.host))?;
    let addr = SocketAddr::new(host, config.server.port);
    tracing::info!("Boxscope Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown...");
        },
    }
}
