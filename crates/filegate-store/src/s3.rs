//! S3 object store client

use crate::{
    ObjectBody, ObjectListing, ObjectMetadata, ObjectStore, ObjectSummary, Operation, Result,
    StorageError, StorageReceipt, StoredObject,
};
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region, retry::RetryConfig};
use aws_credential_types::Credentials;
use aws_sdk_s3::{
    Client,
    config::http::HttpResponse,
    error::{DisplayErrorContext, ProvideErrorMetadata, SdkError},
    primitives::ByteStream,
};
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use std::fmt;
use tokio_util::io::ReaderStream;
use tracing::{debug, instrument, warn};

/// Static credentials for the bucket
#[derive(Clone)]
pub struct S3Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl fmt::Debug for S3Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("S3Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .finish()
    }
}

/// Configuration for the S3 connection
#[derive(Clone, Debug)]
pub struct S3Config {
    /// Bucket holding all gateway objects
    pub bucket: String,
    /// Bucket region (e.g., "eu-west-1")
    pub region: String,
    /// Custom endpoint for S3-compatible services (MinIO, R2, ...)
    pub endpoint_url: Option<String>,
    /// Static credentials; the default AWS provider chain is used when absent
    pub credentials: Option<S3Credentials>,
    /// Address buckets as `endpoint/bucket` instead of `bucket.endpoint`
    pub force_path_style: bool,
}

impl S3Config {
    /// Create a config for a bucket in a region, using default credentials
    pub fn new(bucket: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            region: region.into(),
            endpoint_url: None,
            credentials: None,
            force_path_style: false,
        }
    }

    /// Use static credentials
    pub fn with_credentials(
        mut self,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
    ) -> Self {
        self.credentials = Some(S3Credentials {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
        });
        self
    }

    /// Use a custom endpoint with path-style addressing
    pub fn with_endpoint(mut self, endpoint_url: impl Into<String>) -> Self {
        self.endpoint_url = Some(endpoint_url.into());
        self.force_path_style = true;
        self
    }
}

/// S3 object store client.
///
/// Built once at startup and shared read-only across requests. SDK retries
/// are disabled so every operation is exactly one request to the bucket.
#[derive(Clone)]
pub struct S3ObjectStore {
    client: Client,
    bucket: String,
}

impl S3ObjectStore {
    /// Create a new S3 object store
    pub async fn new(config: S3Config) -> Result<Self> {
        if config.bucket.trim().is_empty() {
            return Err(StorageError::Configuration(
                "bucket name must not be empty".to_string(),
            ));
        }

        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .retry_config(RetryConfig::disabled());

        if let Some(ref creds) = config.credentials {
            loader = loader.credentials_provider(Credentials::new(
                &creds.access_key_id,
                &creds.secret_access_key,
                None,
                None,
                "filegate",
            ));
        }

        if let Some(ref endpoint) = config.endpoint_url {
            loader = loader.endpoint_url(endpoint);
        }

        let shared = loader.load().await;
        let s3_config = aws_sdk_s3::config::Builder::from(&shared)
            .force_path_style(config.force_path_style)
            .build();

        debug!(
            bucket = %config.bucket,
            region = %config.region,
            endpoint = ?config.endpoint_url,
            "S3 client configured"
        );

        Ok(Self::from_client(Client::from_conf(s3_config), config.bucket))
    }

    /// Wrap an already configured SDK client
    pub fn from_client(client: Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    /// The bucket this client addresses
    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

/// True when the store reported that the key does not exist.
///
/// Only an explicit `NoSuchKey` counts. A 404 without an S3 error code comes
/// from something other than the bucket (proxy, wrong endpoint) and is a
/// store failure, as is `NoSuchBucket`.
fn is_missing_key<E>(err: &SdkError<E, HttpResponse>) -> bool
where
    E: ProvideErrorMetadata,
{
    err.code() == Some("NoSuchKey")
}

/// Normalize an SDK failure into `StorageError::Unavailable`
fn unavailable<E>(operation: Operation, key: Option<&str>, err: SdkError<E, HttpResponse>) -> StorageError
where
    E: std::error::Error + Send + Sync + 'static,
{
    warn!(
        operation = %operation,
        key = ?key,
        error = %DisplayErrorContext(&err),
        "S3 request failed"
    );
    StorageError::unavailable(operation, key, err)
}

fn to_chrono(timestamp: &aws_sdk_s3::primitives::DateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(timestamp.secs(), timestamp.subsec_nanos())
}

fn to_size(length: Option<i64>) -> Option<u64> {
    length.and_then(|len| u64::try_from(len).ok())
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    fn name(&self) -> &'static str {
        "s3"
    }

    fn is_persistent(&self) -> bool {
        true
    }

    #[instrument(skip(self, body), fields(bucket = %self.bucket, size = body.len()))]
    async fn put_object(
        &self,
        key: &str,
        body: ObjectBody,
        content_type: Option<&str>,
    ) -> Result<StorageReceipt> {
        let (stream, size) = match body {
            ObjectBody::Bytes(data) => {
                let size = data.len() as u64;
                (ByteStream::from(data), size)
            }
            ObjectBody::File { path, size } => {
                let stream = ByteStream::from_path(&path)
                    .await
                    .map_err(|e| StorageError::unavailable(Operation::Put, Some(key), e))?;
                (stream, size)
            }
        };

        let size = i64::try_from(size).map_err(|e| {
            StorageError::unavailable(Operation::Put, Some(key), e)
        })?;

        let output = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(stream)
            .content_length(size)
            .set_content_type(content_type.map(str::to_string))
            .send()
            .await
            .map_err(|e| unavailable(Operation::Put, Some(key), e))?;

        Ok(StorageReceipt {
            key: key.to_string(),
            etag: output.e_tag().map(str::to_string),
            version_id: output.version_id().map(str::to_string),
        })
    }

    #[instrument(skip(self), fields(bucket = %self.bucket))]
    async fn get_object(&self, key: &str) -> Result<Option<StoredObject>> {
        let output = match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(output) => output,
            Err(e) if is_missing_key(&e) => {
                debug!(key, "object not found");
                return Ok(None);
            }
            Err(e) => return Err(unavailable(Operation::Get, Some(key), e)),
        };

        let metadata = ObjectMetadata {
            size: to_size(output.content_length()),
            content_type: output.content_type().map(str::to_string),
            last_modified: output.last_modified().and_then(to_chrono),
            etag: output.e_tag().map(str::to_string),
        };

        let owned_key = key.to_string();
        let content = ReaderStream::new(output.body.into_async_read())
            .map_err(move |e| StorageError::unavailable(Operation::Read, Some(&owned_key), e));

        Ok(Some(StoredObject {
            key: key.to_string(),
            metadata,
            content: Box::pin(content),
        }))
    }

    #[instrument(skip(self), fields(bucket = %self.bucket))]
    async fn list_objects(&self) -> Result<ObjectListing> {
        let output = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .send()
            .await
            .map_err(|e| unavailable(Operation::List, None, e))?;

        let entries = output
            .contents()
            .iter()
            .filter_map(|object| {
                Some(ObjectSummary {
                    key: object.key()?.to_string(),
                    size: to_size(object.size()),
                    last_modified: object.last_modified().and_then(to_chrono),
                    etag: object.e_tag().map(str::to_string),
                })
            })
            .collect();

        Ok(ObjectListing::new(
            entries,
            output.is_truncated().unwrap_or(false),
        ))
    }

    #[instrument(skip(self), fields(bucket = %self.bucket))]
    async fn delete_object(&self, key: &str) -> Result<Option<StorageReceipt>> {
        match self
            .client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(output) => Ok(Some(StorageReceipt {
                key: key.to_string(),
                etag: None,
                version_id: output.version_id().map(str::to_string),
            })),
            Err(e) if is_missing_key(&e) => Ok(None),
            Err(e) => Err(unavailable(Operation::Delete, Some(key), e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, path_regex, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const BUCKET: &str = "test-bucket";

    async fn store_for(server: &MockServer) -> S3ObjectStore {
        let config = S3Config::new(BUCKET, "us-east-1")
            .with_credentials("test-access-key", "test-secret-key")
            .with_endpoint(server.uri());
        S3ObjectStore::new(config).await.unwrap()
    }

    fn error_xml(code: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<Error>
    <Code>{}</Code>
    <Message>error from mock</Message>
    <RequestId>mock-request</RequestId>
</Error>"#,
            code
        )
    }

    #[tokio::test]
    async fn test_empty_bucket_is_rejected() {
        let result = S3ObjectStore::new(S3Config::new("  ", "us-east-1")).await;
        assert!(matches!(result, Err(StorageError::Configuration(_))));
    }

    #[test]
    fn test_credentials_debug_is_redacted() {
        let config = S3Config::new(BUCKET, "us-east-1").with_credentials("AKIA", "super-secret");
        let rendered = format!("{:?}", config);
        assert!(rendered.contains("AKIA"));
        assert!(!rendered.contains("super-secret"));
    }

    #[tokio::test]
    async fn test_get_object_streams_content() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/test-bucket/report.pdf"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("Content-Type", "application/pdf")
                    .insert_header("ETag", "\"abc123\"")
                    .set_body_bytes(b"0123456789".to_vec()),
            )
            .expect(1)
            .mount(&server)
            .await;

        let store = store_for(&server).await;
        let object = store.get_object("report.pdf").await.unwrap().unwrap();

        assert_eq!(object.key, "report.pdf");
        assert_eq!(object.metadata.size, Some(10));
        assert_eq!(object.metadata.content_type.as_deref(), Some("application/pdf"));
        assert_eq!(object.metadata.etag.as_deref(), Some("\"abc123\""));
        assert_eq!(object.into_bytes().await.unwrap().as_ref(), b"0123456789");
    }

    #[tokio::test]
    async fn test_get_object_no_such_key_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/test-bucket/missing.txt"))
            .respond_with(
                ResponseTemplate::new(404)
                    .insert_header("Content-Type", "application/xml")
                    .set_body_string(error_xml("NoSuchKey")),
            )
            .mount(&server)
            .await;

        let store = store_for(&server).await;
        assert!(store.get_object("missing.txt").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_object_no_such_bucket_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/test-bucket/a.txt"))
            .respond_with(
                ResponseTemplate::new(404)
                    .insert_header("Content-Type", "application/xml")
                    .set_body_string(error_xml("NoSuchBucket")),
            )
            .mount(&server)
            .await;

        let store = store_for(&server).await;
        let err = store.get_object("a.txt").await.unwrap_err();
        assert_eq!(err.operation(), Some(Operation::Get));
        assert_eq!(err.key(), Some("a.txt"));
    }

    #[tokio::test]
    async fn test_get_object_foreign_404_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/test-bucket/a.txt"))
            .respond_with(
                ResponseTemplate::new(404)
                    .insert_header("Content-Type", "text/html")
                    .set_body_string("<html>nginx 404</html>"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let store = store_for(&server).await;
        let result = store.get_object("a.txt").await;
        assert!(matches!(
            result,
            Err(StorageError::Unavailable { operation: Operation::Get, .. })
        ));
    }

    #[tokio::test]
    async fn test_server_error_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/test-bucket/a.txt"))
            .respond_with(
                ResponseTemplate::new(500)
                    .insert_header("Content-Type", "application/xml")
                    .set_body_string(error_xml("InternalError")),
            )
            .expect(1)
            .mount(&server)
            .await;

        let store = store_for(&server).await;
        let result = store.get_object("a.txt").await;
        assert!(matches!(result, Err(StorageError::Unavailable { .. })));
    }

    #[tokio::test]
    async fn test_put_object_returns_receipt() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/test-bucket/a.txt"))
            .respond_with(ResponseTemplate::new(200).insert_header("ETag", "\"etag-1\""))
            .expect(1)
            .mount(&server)
            .await;

        let store = store_for(&server).await;
        let receipt = store
            .put_object("a.txt", b"hello".as_slice().into(), Some("text/plain"))
            .await
            .unwrap();

        assert_eq!(receipt.key, "a.txt");
        assert_eq!(receipt.etag.as_deref(), Some("\"etag-1\""));
    }

    #[tokio::test]
    async fn test_put_object_access_denied_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/test-bucket/a.txt"))
            .respond_with(
                ResponseTemplate::new(403)
                    .insert_header("Content-Type", "application/xml")
                    .set_body_string(error_xml("AccessDenied")),
            )
            .mount(&server)
            .await;

        let store = store_for(&server).await;
        let err = store
            .put_object("a.txt", b"hello".as_slice().into(), None)
            .await
            .unwrap_err();
        assert_eq!(err.operation(), Some(Operation::Put));
    }

    #[tokio::test]
    async fn test_list_objects_single_page() {
        let server = MockServer::start().await;
        let body = r#"<?xml version="1.0" encoding="UTF-8"?>
<ListBucketResult xmlns="http://s3.amazonaws.com/doc/2006-03-01/">
    <Name>test-bucket</Name>
    <Prefix></Prefix>
    <KeyCount>2</KeyCount>
    <MaxKeys>1000</MaxKeys>
    <IsTruncated>true</IsTruncated>
    <Contents>
        <Key>a.txt</Key>
        <LastModified>2024-01-01T00:00:00.000Z</LastModified>
        <ETag>"aaa"</ETag>
        <Size>5</Size>
        <StorageClass>STANDARD</StorageClass>
    </Contents>
    <Contents>
        <Key>report.pdf</Key>
        <LastModified>2024-01-02T00:00:00.000Z</LastModified>
        <ETag>"bbb"</ETag>
        <Size>10</Size>
        <StorageClass>STANDARD</StorageClass>
    </Contents>
</ListBucketResult>"#;

        Mock::given(method("GET"))
            .and(path_regex(r"^/test-bucket/?$"))
            .and(query_param("list-type", "2"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("Content-Type", "application/xml")
                    .set_body_string(body),
            )
            .expect(1)
            .mount(&server)
            .await;

        let store = store_for(&server).await;
        let listing = store.list_objects().await.unwrap();
        assert!(listing.is_truncated());

        let summaries: Vec<ObjectSummary> = listing.collect();
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].key, "a.txt");
        assert_eq!(summaries[0].size, Some(5));
        assert_eq!(summaries[1].key, "report.pdf");
        assert!(summaries[1].last_modified.is_some());
    }

    #[tokio::test]
    async fn test_delete_object() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/test-bucket/a.txt"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/test-bucket/missing.txt"))
            .respond_with(
                ResponseTemplate::new(404)
                    .insert_header("Content-Type", "application/xml")
                    .set_body_string(error_xml("NoSuchKey")),
            )
            .mount(&server)
            .await;

        let store = store_for(&server).await;
        assert!(store.delete_object("a.txt").await.unwrap().is_some());
        assert!(store.delete_object("missing.txt").await.unwrap().is_none());
    }
}
