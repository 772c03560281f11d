use clap::Parser;
use std::sync::Arc;
use tracing::{error, info};
use tracing_appender::rolling;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use toolcheck::config::{AppConfig, ConfigError};
use toolcheck::registry::{Registry, SupabaseRegistry};
use toolcheck::version::VERSION;
use toolcheck::web;

const DEFAULT_LOG_DIR: &str = "logs";

#[derive(Parser, Debug)]
#[command(author, version = VERSION, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Directory for the rotating JSON log files, overrides `log_dir` from the configuration
    #[arg(long)]
    log_dir: Option<String>,

    /// Address to listen on, overrides `listen_addr` from the configuration
    #[arg(short, long)]
    listen: Option<String>,
}

fn init_logging(log_dir: &str) {
    // Log to a file: JSON format, daily rotation
    let file_appender = rolling::daily(log_dir, "toolcheck.log");
    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false)
        .json();

    // Log to stdout: human-readable format
    let stdout_layer = fmt::layer().with_writer(std::io::stdout);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stdout_layer)
        .init();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => error!("Failed to listen for SIGTERM: {}", e),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received.");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let args = Args::parse();

    let config = AppConfig::load(args.config.as_deref());

    let log_dir = args.log_dir.clone().unwrap_or_else(|| match &config {
        Ok(config) => config.log_dir.clone(),
        Err(ConfigError::Missing { log_dir, .. }) => log_dir.clone(),
        Err(_) => DEFAULT_LOG_DIR.to_string(),
    });
    init_logging(&log_dir);
    info!("Starting toolcheck, version: {}", VERSION);

    let (app, listen_addr) = match config {
        Ok(config) => {
            let registry: Arc<dyn Registry> = Arc::new(SupabaseRegistry::new(
                &config.supabase_url,
                &config.supabase_anon_key,
                &config.storage_bucket,
            )?);
            info!(registry = %config.supabase_url, bucket = %config.storage_bucket, "Registry client ready.");
            let listen_addr = args.listen.clone().unwrap_or(config.listen_addr);
            (web::create_axum_router(registry, config.label), listen_addr)
        }
        Err(ConfigError::Missing { keys, listen_addr, .. }) => {
            error!(
                "Missing required configuration ({}); serving the configuration-required page only.",
                keys.join(", ")
            );
            let listen_addr = args.listen.clone().unwrap_or(listen_addr);
            (web::create_config_error_router(keys), listen_addr)
        }
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    let listener = tokio::net::TcpListener::bind(&listen_addr).await?;
    info!("HTTP server listening on {}", listen_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped.");
    Ok(())
}
