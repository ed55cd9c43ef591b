//! Application state

use crate::config::GatewayConfig;
use crate::gateway::FileGateway;
use anyhow::Context;
use filegate_store::{MemoryObjectStore, ObjectStore, S3Config, S3ObjectStore};
use std::sync::Arc;
use tracing::{info, warn};

/// Application state shared across handlers
pub struct AppState {
    /// Gateway configuration
    pub config: GatewayConfig,
    /// Upload/view/download protocol over the store client
    pub gateway: FileGateway,
}

impl AppState {
    /// Create application state, building the store client from configuration
    pub async fn new(config: GatewayConfig) -> anyhow::Result<Self> {
        let store: Arc<dyn ObjectStore> = if config.use_memory_store {
            info!("Using in-memory object store (data will not persist)");
            Arc::new(MemoryObjectStore::new())
        } else {
            Arc::new(Self::create_s3_store(&config).await?)
        };

        if store.is_persistent() {
            info!("✓ Storage mode: {} (persistent)", store.name());
        } else {
            warn!("⚠ Storage mode: {} (NOT persistent - for development only)", store.name());
        }

        Ok(Self::with_store(config, store))
    }

    /// Create application state around an existing store client
    pub fn with_store(config: GatewayConfig, store: Arc<dyn ObjectStore>) -> Self {
        Self {
            config,
            gateway: FileGateway::new(store),
        }
    }

    async fn create_s3_store(config: &GatewayConfig) -> anyhow::Result<S3ObjectStore> {
        let bucket = config
            .bucket
            .clone()
            .context("no bucket configured; set AWS_BUCKET_NAME or use --memory-store")?;

        let mut s3_config = S3Config::new(bucket, config.region.clone());

        if let Some(ref endpoint) = config.endpoint_url {
            s3_config = s3_config.with_endpoint(endpoint);
        }
        s3_config.force_path_style |= config.force_path_style;

        match (&config.access_key_id, &config.secret_access_key) {
            (Some(key), Some(secret)) => {
                s3_config = s3_config.with_credentials(key, secret);
            }
            (None, None) => info!("No static credentials, using the default AWS provider chain"),
            _ => anyhow::bail!("AWS_PUBLIC_KEY and AWS_SECRET_KEY must be set together"),
        }

        let store = S3ObjectStore::new(s3_config).await?;
        info!(bucket = %store.bucket(), region = %config.region, "S3 object store ready");
        Ok(store)
    }
}
