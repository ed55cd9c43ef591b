//! # Filegate
//!
//! HTTP file gateway backed by an S3 bucket.
//!
//! This crate provides:
//! - **Upload**: multipart uploads staged to disk, stored under the file name
//! - **Name uniqueness**: a second upload of an existing name is a 409
//! - **View**: file metadata by name
//! - **Download**: streamed passthrough from the bucket as an attachment
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                   HTTP Clients                      │
//! │              (browsers, curl, etc.)                 │
//! └─────────────────────────┬───────────────────────────┘
//!                           │
//! ┌─────────────────────────▼───────────────────────────┐
//! │                      Filegate                       │
//! ├─────────────────────────────────────────────────────┤
//! │  Request ID │ Logging │ CORS │ Body limit           │
//! ├─────────────────────────────────────────────────────┤
//! │          Handlers (upload, view, download)          │
//! ├─────────────────────────────────────────────────────┤
//! │                    FileGateway                      │
//! │        (conflict check, 404/409/500 mapping)        │
//! ├─────────────────────────────────────────────────────┤
//! │                  filegate-store                     │
//! │              (S3 / in-memory backends)              │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod gateway;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;
pub mod upload;

pub use config::GatewayConfig;
pub use error::{ErrorCode, GatewayError};
pub use gateway::{FileDownload, FileGateway, FileView};
pub use server::run_server_with_shutdown;
pub use state::AppState;
pub use upload::UploadRequest;
