//! Object, metadata and listing types shared by all backends

use crate::Result;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::Stream;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::pin::Pin;

/// Streamed object content
pub type ObjectStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>;

/// Source bytes for a put
#[derive(Debug, Clone)]
pub enum ObjectBody {
    /// Content already held in memory
    Bytes(Bytes),
    /// Content staged on local disk, streamed to the store
    File { path: PathBuf, size: u64 },
}

impl ObjectBody {
    /// Number of bytes that will be written
    pub fn len(&self) -> u64 {
        match self {
            Self::Bytes(data) => data.len() as u64,
            Self::File { size, .. } => *size,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Bytes> for ObjectBody {
    fn from(data: Bytes) -> Self {
        Self::Bytes(data)
    }
}

impl From<&'static [u8]> for ObjectBody {
    fn from(data: &'static [u8]) -> Self {
        Self::Bytes(Bytes::from_static(data))
    }
}

/// Store-defined metadata for an object
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMetadata {
    /// Content length in bytes, when the store reports it
    pub size: Option<u64>,
    /// MIME type recorded at upload
    pub content_type: Option<String>,
    /// Last modification time
    pub last_modified: Option<DateTime<Utc>>,
    /// Entity tag
    pub etag: Option<String>,
}

/// An object fetched from the store: metadata plus streamed content
pub struct StoredObject {
    pub key: String,
    pub metadata: ObjectMetadata,
    pub content: ObjectStream,
}

impl StoredObject {
    /// Drain the content stream into a single buffer.
    ///
    /// Only for small objects and tests; downloads should forward `content`.
    pub async fn into_bytes(self) -> Result<Bytes> {
        use futures::TryStreamExt;

        let chunks: Vec<Bytes> = self.content.try_collect().await?;
        Ok(chunks.concat().into())
    }
}

impl fmt::Debug for StoredObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredObject")
            .field("key", &self.key)
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}

/// Summary of one object in a listing
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectSummary {
    pub key: String,
    pub size: Option<u64>,
    pub last_modified: Option<DateTime<Utc>>,
    pub etag: Option<String>,
}

/// Acknowledgement of a completed write or delete
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StorageReceipt {
    pub key: String,
    pub etag: Option<String>,
    pub version_id: Option<String>,
}

impl StorageReceipt {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            etag: None,
            version_id: None,
        }
    }
}

/// A single page of object summaries.
///
/// Consumed once; only the first page the store returns is fetched.
#[derive(Debug)]
pub struct ObjectListing {
    entries: std::vec::IntoIter<ObjectSummary>,
    truncated: bool,
}

impl ObjectListing {
    pub fn new(entries: Vec<ObjectSummary>, truncated: bool) -> Self {
        Self {
            entries: entries.into_iter(),
            truncated,
        }
    }

    /// Whether the store holds more keys than this page
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }
}

impl Iterator for ObjectListing {
    type Item = ObjectSummary;

    fn next(&mut self) -> Option<Self::Item> {
        self.entries.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.entries.size_hint()
    }
}

impl ExactSizeIterator for ObjectListing {}
