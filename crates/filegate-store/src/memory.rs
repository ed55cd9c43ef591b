//! In-memory object store for testing and development

use crate::{
    ObjectBody, ObjectListing, ObjectMetadata, ObjectStore, ObjectSummary, Operation, Result,
    StorageError, StorageReceipt, StoredObject,
};
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Size of the chunks served from `get_object`
const READ_CHUNK_SIZE: usize = 64 * 1024;

/// Maximum keys returned by one listing, mirroring S3's page size
const LIST_PAGE_SIZE: usize = 1000;

#[derive(Clone, Debug)]
struct MemoryObject {
    data: Bytes,
    content_type: Option<String>,
    last_modified: DateTime<Utc>,
    etag: String,
}

impl MemoryObject {
    fn metadata(&self) -> ObjectMetadata {
        ObjectMetadata {
            size: Some(self.data.len() as u64),
            content_type: self.content_type.clone(),
            last_modified: Some(self.last_modified),
            etag: Some(self.etag.clone()),
        }
    }
}

/// An in-memory object store.
///
/// Same overwrite semantics as S3: a put replaces whatever the key held.
#[derive(Clone, Default)]
pub struct MemoryObjectStore {
    objects: Arc<DashMap<String, MemoryObject>>,
    calls: Arc<AtomicU64>,
}

impl MemoryObjectStore {
    /// Create a new empty memory store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of objects stored
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Check for a key without counting as a store call
    pub fn contains(&self, key: &str) -> bool {
        self.objects.contains_key(key)
    }

    /// Number of `ObjectStore` operations served so far
    pub fn call_count(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }

    fn record_call(&self) {
        self.calls.fetch_add(1, Ordering::Relaxed);
    }
}

/// Content-derived entity tag (first 128 bits of the BLAKE3 digest)
fn etag_for(data: &[u8]) -> String {
    let hash = blake3::hash(data);
    hex::encode(&hash.as_bytes()[..16])
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn is_persistent(&self) -> bool {
        false
    }

    async fn put_object(
        &self,
        key: &str,
        body: ObjectBody,
        content_type: Option<&str>,
    ) -> Result<StorageReceipt> {
        self.record_call();

        let data = match body {
            ObjectBody::Bytes(data) => data,
            ObjectBody::File { path, .. } => tokio::fs::read(&path)
                .await
                .map(Bytes::from)
                .map_err(|e| StorageError::unavailable(Operation::Put, Some(key), e))?,
        };

        let etag = etag_for(&data);
        self.objects.insert(
            key.to_string(),
            MemoryObject {
                data,
                content_type: content_type.map(str::to_string),
                last_modified: Utc::now(),
                etag: etag.clone(),
            },
        );

        Ok(StorageReceipt {
            key: key.to_string(),
            etag: Some(etag),
            version_id: None,
        })
    }

    async fn get_object(&self, key: &str) -> Result<Option<StoredObject>> {
        self.record_call();

        let Some(object) = self.objects.get(key).map(|entry| entry.value().clone()) else {
            return Ok(None);
        };

        let metadata = object.metadata();
        let chunks: Vec<Result<Bytes>> = object
            .data
            .chunks(READ_CHUNK_SIZE)
            .map(|chunk| Ok(object.data.slice_ref(chunk)))
            .collect();

        Ok(Some(StoredObject {
            key: key.to_string(),
            metadata,
            content: Box::pin(futures::stream::iter(chunks)),
        }))
    }

    async fn list_objects(&self) -> Result<ObjectListing> {
        self.record_call();

        let mut entries: Vec<ObjectSummary> = self
            .objects
            .iter()
            .map(|entry| ObjectSummary {
                key: entry.key().clone(),
                size: Some(entry.data.len() as u64),
                last_modified: Some(entry.last_modified),
                etag: Some(entry.etag.clone()),
            })
            .collect();
        entries.sort_by(|a, b| a.key.cmp(&b.key));

        let truncated = entries.len() > LIST_PAGE_SIZE;
        entries.truncate(LIST_PAGE_SIZE);

        Ok(ObjectListing::new(entries, truncated))
    }

    async fn delete_object(&self, key: &str) -> Result<Option<StorageReceipt>> {
        self.record_call();

        Ok(self.objects.remove(key).map(|(key, object)| StorageReceipt {
            key,
            etag: Some(object.etag),
            version_id: None,
        }))
    }
}
