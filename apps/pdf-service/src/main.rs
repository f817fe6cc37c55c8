mod config;
mod errors;
mod models;
mod pdf;
mod routes;
mod state;

use anyhow::Result;
use axum::http::{header, HeaderValue, Method};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::pdf::browser::BrowserSession;
use crate::pdf::chrome::ChromeLauncher;
use crate::pdf::templates::TemplateResolver;
use crate::pdf::PdfGenerator;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting PDF service v{}", env!("CARGO_PKG_VERSION"));

    // The browser is launched lazily on the first render request.
    let launcher = ChromeLauncher::new(config.chrome_path.clone(), config.browser_idle_timeout);
    let browser = Arc::new(BrowserSession::new(Arc::new(launcher)));

    info!("Templates directory: {}", config.templates_dir.display());
    let pdf = PdfGenerator::new(
        TemplateResolver::new(&config.templates_dir),
        Arc::clone(&browser),
        config.render_timeout,
    );

    let state = AppState {
        pdf: Arc::new(pdf),
        browser: Arc::clone(&browser),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config.client_url)?);

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    // Runs whether the server stopped cleanly or failed, so no Chrome process outlives us.
    browser.shutdown().await;
    served?;

    info!("PDF service stopped");
    Ok(())
}

/// CORS for the single frontend origin, with credentials.
fn cors_layer(client_url: &str) -> Result<CorsLayer> {
    Ok(CorsLayer::new()
        .allow_origin(HeaderValue::from_str(client_url)?)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]))
}

/// Resolves on Ctrl-C or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("SIGINT received, shutting down gracefully"),
        _ = terminate => info!("SIGTERM received, shutting down gracefully"),
    }
}
