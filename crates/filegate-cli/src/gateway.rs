//! Upload, view and download protocol on top of the object store
//!
//! Each request is handled independently; the only shared state is the
//! injected store client.

use crate::GatewayError;
use crate::upload::UploadRequest;
use filegate_store::{ObjectMetadata, ObjectStore, ObjectStream};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// Canonical view address for a stored file
pub fn view_location(name: &str) -> String {
    format!("/files/{}", urlencoding::encode(name))
}

/// Presentation data for a stored file
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileView {
    pub file_name: String,
    pub file_metadata: ObjectMetadata,
}

/// A file ready to be streamed to the client
pub struct FileDownload {
    pub file_name: String,
    /// Content length, when the store reported it
    pub size: Option<u64>,
    pub content: ObjectStream,
}

impl fmt::Debug for FileDownload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileDownload")
            .field("file_name", &self.file_name)
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

/// File gateway over an object store
#[derive(Clone)]
pub struct FileGateway {
    store: Arc<dyn ObjectStore>,
}

impl FileGateway {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    /// The underlying store
    pub fn store(&self) -> &Arc<dyn ObjectStore> {
        &self.store
    }

    /// Store a staged upload under its file name and return its view address.
    ///
    /// Uniqueness is best effort: the existence check and the put are two
    /// separate store calls, so two concurrent uploads of the same name can
    /// both pass the check and the later put wins. Sequential duplicates are
    /// always rejected with `Conflict`. Closing the race needs a
    /// conditional put (put-if-absent) from the store.
    pub async fn upload(&self, request: Option<UploadRequest>) -> Result<String, GatewayError> {
        let request =
            request.ok_or_else(|| GatewayError::invalid_input("No file uploaded"))?;

        if self.store.get_object(&request.name).await?.is_some() {
            debug!(file_name = %request.name, "Upload rejected, name already taken");
            return Err(GatewayError::Conflict(request.name));
        }

        let receipt = self
            .store
            .put_object(&request.name, request.body(), request.content_type.as_deref())
            .await?;

        info!(
            file_name = %request.name,
            size = request.size,
            etag = ?receipt.etag,
            "File uploaded"
        );

        Ok(view_location(&request.name))
    }

    /// Look up a file's metadata
    pub async fn view(&self, name: &str) -> Result<FileView, GatewayError> {
        if name.is_empty() {
            return Err(GatewayError::invalid_input("Missing file name"));
        }

        let object = self
            .store
            .get_object(name)
            .await?
            .ok_or_else(|| GatewayError::NotFound(name.to_string()))?;

        Ok(FileView {
            file_name: name.to_string(),
            file_metadata: object.metadata,
        })
    }

    /// Fetch a file for streaming; a missing object is `NotFound`
    pub async fn download(&self, name: &str) -> Result<FileDownload, GatewayError> {
        if name.is_empty() {
            return Err(GatewayError::invalid_input("Missing file name"));
        }

        let object = self
            .store
            .get_object(name)
            .await?
            .ok_or_else(|| GatewayError::NotFound(name.to_string()))?;

        Ok(FileDownload {
            file_name: name.to_string(),
            size: object.metadata.size,
            content: object.content,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use filegate_store::MemoryObjectStore;
    use futures::TryStreamExt;

    fn gateway() -> (FileGateway, MemoryObjectStore) {
        let store = MemoryObjectStore::new();
        (FileGateway::new(Arc::new(store.clone())), store)
    }

    async fn staged(name: &str, data: &[u8]) -> UploadRequest {
        UploadRequest::from_bytes(name, data, &std::env::temp_dir())
            .await
            .unwrap()
    }

    #[test]
    fn test_view_location_is_encoded() {
        assert_eq!(view_location("report.pdf"), "/files/report.pdf");
        assert_eq!(view_location("my file#1.txt"), "/files/my%20file%231.txt");
    }

    #[tokio::test]
    async fn test_upload_without_file_makes_no_store_call() {
        let (gateway, store) = gateway();

        let result = gateway.upload(None).await;
        assert!(matches!(result, Err(GatewayError::InvalidInput(_))));
        assert_eq!(store.call_count(), 0);
    }

    #[tokio::test]
    async fn test_upload_then_view() {
        let (gateway, _) = gateway();

        let location = gateway
            .upload(Some(staged("report.pdf", b"0123456789").await))
            .await
            .unwrap();
        assert_eq!(location, "/files/report.pdf");

        let view = gateway.view("report.pdf").await.unwrap();
        assert_eq!(view.file_name, "report.pdf");
        assert_eq!(view.file_metadata.size, Some(10));
        assert_eq!(view.file_metadata.content_type.as_deref(), Some("application/pdf"));
    }

    #[tokio::test]
    async fn test_second_upload_conflicts_and_keeps_first() {
        let (gateway, store) = gateway();

        gateway.upload(Some(staged("a.txt", b"first").await)).await.unwrap();
        let result = gateway.upload(Some(staged("a.txt", b"second").await)).await;
        assert!(matches!(result, Err(GatewayError::Conflict(ref name)) if name == "a.txt"));

        let object = store.get_object("a.txt").await.unwrap().unwrap();
        assert_eq!(object.into_bytes().await.unwrap().as_ref(), b"first");
    }

    #[tokio::test]
    async fn test_staged_file_released_after_upload() {
        let (gateway, _) = gateway();
        let request = staged("gone.txt", b"bytes").await;
        let path = request.path().to_path_buf();

        gateway.upload(Some(request)).await.unwrap();
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let (gateway, _) = gateway();

        assert!(matches!(
            gateway.view("missing.txt").await,
            Err(GatewayError::NotFound(_))
        ));
        assert!(matches!(
            gateway.download("missing.txt").await,
            Err(GatewayError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_name_is_invalid_input() {
        let (gateway, store) = gateway();

        assert!(matches!(gateway.view("").await, Err(GatewayError::InvalidInput(_))));
        assert!(matches!(gateway.download("").await, Err(GatewayError::InvalidInput(_))));
        assert_eq!(store.call_count(), 0);
    }

    #[tokio::test]
    async fn test_download_round_trip() {
        let (gateway, _) = gateway();
        let data: Vec<u8> = (0..=255).cycle().take(200_000).collect();

        gateway.upload(Some(staged("blob.bin", &data).await)).await.unwrap();

        let download = gateway.download("blob.bin").await.unwrap();
        assert_eq!(download.size, Some(data.len() as u64));
        let chunks: Vec<bytes::Bytes> = download.content.try_collect().await.unwrap();
        assert!(chunks.len() > 1);
        assert_eq!(chunks.concat(), data);
    }
}
