//! Upload staging
//!
//! The multipart `file` part is written to a temporary file before it is
//! sent to the store. The temporary file is removed when the
//! [`UploadRequest`] is dropped, which covers success, failure and a client
//! disconnect (the handler future is dropped mid-stream).

use crate::GatewayError;
use axum::extract::Multipart;
use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use filegate_store::ObjectBody;
use std::path::Path;
use tempfile::TempPath;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

/// Name of the form field carrying the file
pub const FILE_FIELD: &str = "file";

/// A staged upload waiting to be stored
#[derive(Debug)]
pub struct UploadRequest {
    /// Uploaded file name, used as the object key
    pub name: String,
    /// Staged size in bytes
    pub size: u64,
    /// Declared or guessed MIME type
    pub content_type: Option<String>,
    temp: TempPath,
}

impl UploadRequest {
    /// Location of the staged bytes
    pub fn path(&self) -> &Path {
        &self.temp
    }

    /// Body to hand to the store; reads from the staged file
    pub fn body(&self) -> ObjectBody {
        ObjectBody::File {
            path: self.temp.to_path_buf(),
            size: self.size,
        }
    }

    /// Stage an in-memory payload
    pub async fn from_bytes(
        name: impl Into<String>,
        data: &[u8],
        staging_dir: &Path,
    ) -> Result<Self, GatewayError> {
        let name = name.into();
        let (file, temp) = create_staging_file(staging_dir)?;
        let mut file = tokio::fs::File::from_std(file);
        file.write_all(data).await?;
        file.flush().await?;

        Ok(Self {
            content_type: Some(guess_content_type(&name)),
            name,
            size: data.len() as u64,
            temp,
        })
    }
}

fn create_staging_file(staging_dir: &Path) -> std::io::Result<(std::fs::File, TempPath)> {
    let temp = tempfile::Builder::new()
        .prefix("filegate-upload-")
        .tempfile_in(staging_dir)?;
    Ok(temp.into_parts())
}

fn guess_content_type(name: &str) -> String {
    mime_guess::from_path(name)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

fn multipart_error(err: MultipartError, limit: u64) -> GatewayError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        GatewayError::PayloadTooLarge { limit }
    } else {
        GatewayError::invalid_input(format!(
            "Failed to parse multipart data: {}",
            err.body_text()
        ))
    }
}

/// Stream the first named `file` part of a multipart body to disk.
///
/// Returns `Ok(None)` when the form carries no file. Other fields are
/// ignored.
pub async fn stage_multipart(
    multipart: &mut Multipart,
    staging_dir: &Path,
    limit: u64,
) -> Result<Option<UploadRequest>, GatewayError> {
    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, limit))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        // Kept as sent; blank names count as no file
        let Some(name) = field
            .file_name()
            .filter(|name| !name.trim().is_empty())
            .map(str::to_string)
        else {
            debug!("file field without a file name, skipping");
            continue;
        };

        let content_type = field
            .content_type()
            .map(str::to_string)
            .unwrap_or_else(|| guess_content_type(&name));

        let (file, temp) = create_staging_file(staging_dir)?;
        let mut file = tokio::fs::File::from_std(file);
        let mut size = 0u64;

        while let Some(chunk) = field.chunk().await.map_err(|e| multipart_error(e, limit))? {
            size += chunk.len() as u64;
            if size > limit {
                warn!(
                    file_name = %name,
                    size,
                    limit,
                    "Upload exceeds size limit, aborting"
                );
                return Err(GatewayError::PayloadTooLarge { limit });
            }
            file.write_all(&chunk).await?;
        }
        file.flush().await?;

        debug!(file_name = %name, size, path = ?temp, "Upload staged");

        return Ok(Some(UploadRequest {
            name,
            size,
            content_type: Some(content_type),
            temp,
        }));
    }

    Ok(None)
}
