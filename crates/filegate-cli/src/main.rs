//! Filegate - HTTP file gateway backed by an S3 bucket

use clap::Parser;
use filegate_cli::{GatewayConfig, config::DEFAULT_MAX_UPLOAD_SIZE, run_server_with_shutdown};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "filegate")]
#[command(about = "HTTP file gateway storing uploads in an S3 bucket")]
#[command(version)]
struct Args {
    /// Host to bind to
    #[arg(short = 'H', long, default_value = "0.0.0.0", env = "FILEGATE_HOST")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value = "3002", env = "PORT")]
    port: u16,

    /// Bucket holding uploaded files
    #[arg(long, env = "AWS_BUCKET_NAME")]
    bucket: Option<String>,

    /// Bucket region
    #[arg(long, default_value = "us-east-1", env = "AWS_BUCKET_REGION")]
    region: String,

    /// Access key ID (default AWS credential chain when unset)
    #[arg(long, env = "AWS_PUBLIC_KEY")]
    access_key_id: Option<String>,

    /// Secret access key
    #[arg(long, env = "AWS_SECRET_KEY", hide_env_values = true)]
    secret_access_key: Option<String>,

    /// Custom S3 endpoint (e.g., http://localhost:9000 for MinIO)
    #[arg(long, env = "AWS_ENDPOINT_URL")]
    endpoint_url: Option<String>,

    /// Use path-style bucket addressing
    #[arg(long, env = "AWS_FORCE_PATH_STYLE")]
    force_path_style: bool,

    /// Use in-memory storage (for testing, data will not persist)
    #[arg(long, env = "FILEGATE_MEMORY_STORE")]
    memory_store: bool,

    /// Maximum upload size in bytes
    #[arg(long, default_value_t = DEFAULT_MAX_UPLOAD_SIZE, env = "FILEGATE_MAX_UPLOAD_SIZE")]
    max_upload_size: u64,

    /// Allowed CORS origin ("*" for any)
    #[arg(long, default_value = "http://localhost:3002", env = "FILEGATE_CORS_ORIGIN")]
    cors_origin: String,

    /// Directory for staged uploads
    #[arg(long, env = "FILEGATE_TEMP_DIR")]
    temp_dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, env = "FILEGATE_DEBUG")]
    debug: bool,
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Parse arguments
    let args = Args::parse();

    // Setup logging
    let log_level = if args.debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            format!(
                "filegate_cli={},filegate_store={},tower_http=debug",
                log_level, log_level
            )
            .into()
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Filegate on {}:{}", args.host, args.port);

    if args.memory_store {
        tracing::warn!("⚠️  Using in-memory storage - data will NOT persist!");
    } else if let Some(ref bucket) = args.bucket {
        tracing::info!("Bucket: {} ({})", bucket, args.region);
    }

    if let Some(ref endpoint) = args.endpoint_url {
        tracing::info!("S3 endpoint: {}", endpoint);
    }

    // Build configuration
    let config = GatewayConfig {
        host: args.host,
        port: args.port,
        bucket: args.bucket,
        region: args.region,
        endpoint_url: args.endpoint_url,
        force_path_style: args.force_path_style,
        access_key_id: args.access_key_id,
        secret_access_key: args.secret_access_key,
        use_memory_store: args.memory_store,
        max_upload_size: args.max_upload_size,
        cors_origin: args.cors_origin,
        temp_dir: args.temp_dir,
    };

    // Run the server
    run_server_with_shutdown(config, shutdown_signal()).await
}
