//! Service-level handlers (landing page, health check, fallbacks)

use crate::GatewayError;
use axum::{
    Json,
    http::StatusCode,
    response::{Html, IntoResponse},
};

const LANDING_PAGE: &str = r#"<!doctype html>
<html>
<head><title>Filegate</title></head>
<body>
<form action="/uploads/files" method="post" enctype="multipart/form-data">
<input type="file" name="file">
<button type="submit">Upload</button>
</form>
</body>
</html>
"#;

/// GET / - Landing page
pub async fn landing_page() -> Html<&'static str> {
    Html(LANDING_PAGE)
}

/// HEAD / - Health check
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// GET /files/ and /downloads/files/ - name segment left empty
pub async fn missing_file_name() -> GatewayError {
    GatewayError::invalid_input("Missing file name")
}

/// Fallback for unmatched paths
pub async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({ "code": "NotFound", "message": "Not Found" })),
    )
}
