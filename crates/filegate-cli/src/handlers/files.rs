//! File upload, view and download handlers

use crate::upload::stage_multipart;
use crate::{AppState, GatewayError};
use axum::{
    Json,
    body::Body,
    extract::{Multipart, Path, State, multipart::MultipartRejection},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use futures::TryStreamExt;
use std::sync::Arc;

/// POST /uploads/files - Upload the multipart `file` field
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, GatewayError> {
    let mut multipart = multipart.map_err(|e| {
        tracing::debug!(error = %e, "Rejected non-multipart upload");
        GatewayError::invalid_input("No file uploaded")
    })?;

    let request = stage_multipart(
        &mut multipart,
        &state.config.staging_dir(),
        state.config.max_upload_size,
    )
    .await?;

    let location = state.gateway.upload(request).await?;

    Ok((StatusCode::FOUND, [(header::LOCATION, location)]).into_response())
}

/// GET /files/{name} - File metadata
pub async fn view_file(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Response, GatewayError> {
    let view = state.gateway.view(&name).await?;
    Ok(Json(view).into_response())
}

/// GET /downloads/files/{name} - Stream the file as an attachment
pub async fn download_file(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Response, GatewayError> {
    let download = state.gateway.download(&name).await?;

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/octet-stream"),
    );
    headers.insert(
        header::CONTENT_DISPOSITION,
        content_disposition(&download.file_name),
    );
    if let Some(size) = download.size {
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from(size));
    }

    // Headers are sent before the first chunk; a failure after that can only
    // abort the connection.
    let file_name = download.file_name;
    let stream = download.content.inspect_err(move |e| {
        tracing::error!(file_name = %file_name, error = %e, "Download stream failed, aborting transfer");
    });

    Ok((StatusCode::OK, headers, Body::from_stream(stream)).into_response())
}

/// `attachment; filename=<name>`, falling back to the RFC 6266 extended
/// form for names that are not valid header text
fn content_disposition(file_name: &str) -> HeaderValue {
    HeaderValue::from_str(&format!("attachment; filename={}", file_name)).unwrap_or_else(|_| {
        let encoded = urlencoding::encode(file_name);
        HeaderValue::from_str(&format!("attachment; filename*=UTF-8''{}", encoded))
            .unwrap_or_else(|_| HeaderValue::from_static("attachment"))
    })
}
