//! # Filegate Store
//!
//! Object storage access layer for the Filegate file gateway.
//!
//! This crate provides:
//! - **ObjectStore trait**: put, get, list and delete by key
//! - **S3 backend**: any S3-compatible bucket via the AWS SDK
//! - **Memory backend**: an in-process fake for tests and development
//! - **Uniform errors**: a missing key is `Ok(None)`, every other failure is
//!   `StorageError::Unavailable`
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │             Gateway Protocol            │
//! ├─────────────────────────────────────────┤
//! │            ObjectStore Trait            │
//! ├────────────────────┬────────────────────┤
//! │   S3ObjectStore    │ MemoryObjectStore  │
//! ├────────────────────┴────────────────────┤
//! │        S3 bucket / process memory       │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use filegate_store::{ObjectStore, S3Config, S3ObjectStore};
//!
//! let store = S3ObjectStore::new(S3Config::new("my-bucket", "eu-west-1")).await?;
//! store.put_object("report.pdf", data.into(), Some("application/pdf")).await?;
//! let object = store.get_object("report.pdf").await?;
//! ```

pub mod error;
pub mod memory;
pub mod object;
pub mod s3;

pub use error::{BoxError, Operation, Result, StorageError};
pub use memory::MemoryObjectStore;
pub use object::{
    ObjectBody, ObjectListing, ObjectMetadata, ObjectStream, ObjectSummary, StorageReceipt,
    StoredObject,
};
pub use s3::{S3Config, S3Credentials, S3ObjectStore};

use async_trait::async_trait;

/// Trait for object storage backends.
///
/// Each call is a single round trip to the store with no retries. Writes
/// silently replace an existing object with the same key; uniqueness is
/// not enforced here.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Short backend name for logs
    fn name(&self) -> &'static str;

    /// Whether stored objects survive a process restart
    fn is_persistent(&self) -> bool;

    /// Store `body` under `key`, replacing any existing object
    async fn put_object(
        &self,
        key: &str,
        body: ObjectBody,
        content_type: Option<&str>,
    ) -> Result<StorageReceipt>;

    /// Fetch an object, or `None` if no object has this key
    async fn get_object(&self, key: &str) -> Result<Option<StoredObject>>;

    /// List the first page of stored objects
    async fn list_objects(&self) -> Result<ObjectListing>;

    /// Remove an object, or `None` if no object has this key
    async fn delete_object(&self, key: &str) -> Result<Option<StorageReceipt>>;
}
