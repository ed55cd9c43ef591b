//! Gateway configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default upload ceiling (150 MiB)
pub const DEFAULT_MAX_UPLOAD_SIZE: u64 = 150 * 1024 * 1024;

/// Extra body allowance for multipart boundaries and part headers
const MULTIPART_OVERHEAD: u64 = 64 * 1024;

/// Gateway server configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Bucket holding uploaded files
    pub bucket: Option<String>,
    /// Bucket region
    pub region: String,
    /// Custom S3 endpoint (MinIO, R2, localstack, ...)
    pub endpoint_url: Option<String>,
    /// Use path-style bucket addressing
    pub force_path_style: bool,
    /// Access key ID; the default AWS credential chain is used when absent
    pub access_key_id: Option<String>,
    /// Secret access key
    #[serde(skip_serializing)]
    pub secret_access_key: Option<String>,
    /// Use in-memory storage (for testing/development)
    pub use_memory_store: bool,
    /// Maximum accepted upload size (bytes)
    pub max_upload_size: u64,
    /// Allowed CORS origin
    pub cors_origin: String,
    /// Directory for staged uploads (system temp dir when unset)
    pub temp_dir: Option<PathBuf>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3002,
            bucket: None,
            region: "us-east-1".to_string(),
            endpoint_url: None,
            force_path_style: false,
            access_key_id: None,
            secret_access_key: None,
            use_memory_store: false,
            max_upload_size: DEFAULT_MAX_UPLOAD_SIZE,
            cors_origin: "http://localhost:3002".to_string(),
            temp_dir: None,
        }
    }
}

impl GatewayConfig {
    /// Get the bind address
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Maximum request body size, leaving room for multipart framing
    pub fn max_body_size(&self) -> usize {
        usize::try_from(self.max_upload_size.saturating_add(MULTIPART_OVERHEAD))
            .unwrap_or(usize::MAX)
    }

    /// Directory uploads are staged in
    pub fn staging_dir(&self) -> PathBuf {
        self.temp_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}
