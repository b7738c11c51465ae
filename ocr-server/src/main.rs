use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ocr_server::api::{create_router, AppState};
use ocr_server::config::{Config, LogFormat, LoggingConfig};
use ocr_server::ocr::{OcrEngine, TesseractEngine};

#[derive(Parser)]
#[command(name = "ocr-server")]
#[command(about = "HTTP service that extracts text from images")]
struct Args {
    /// Address to bind (overrides OCR_HOST)
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on (overrides OCR_PORT)
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    dotenvy::dotenv().ok();

    // The subscriber must exist before the full config load so its warnings are emitted.
    init_tracing(LoggingConfig::from_env().format);

    let mut config = Config::from_env();
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    tracing::info!(
        "Initializing OCR engine (languages: {})...",
        config.ocr.languages
    );
    let engine: Arc<dyn OcrEngine> = Arc::new(TesseractEngine::new(&config.ocr)?);

    let addr = config.bind_address();
    let state = AppState::new(config, engine);
    let app = create_router(state);

    tracing::info!("{} listening on http://{}", env!("CARGO_PKG_NAME"), addr);
    tracing::info!("  API docs:     http://{}/docs", addr);
    tracing::info!("  OpenAPI spec: http://{}/openapi.json", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "ocr_server=info,tower_http=debug".into());

    match format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init(),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining in-flight requests...");
}
