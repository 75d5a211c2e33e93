//! Object-store client: paginated listing, public uploads, deletion.

mod memory;
mod s3;

pub use memory::{MemoryObject, MemoryObjectStore};
pub use s3::S3ObjectStore;

use async_trait::async_trait;

use crate::error::ObjectStoreError;

/// One stored object as reported by a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub key: String,
    /// Size in bytes.
    pub size: i64,
}

/// One page of listing results.
///
/// `next_token` is an opaque continuation token; `None` means the listing is
/// exhausted. Callers resume by passing the token back to
/// [`ObjectStore::list_page`], so a listing can be restarted mid-way.
#[derive(Debug, Clone, Default)]
pub struct ObjectPage {
    pub objects: Vec<StoredObject>,
    pub next_token: Option<String>,
}

/// Trait for object-store clients, enabling an in-memory fake in tests.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetch one page of objects under `prefix`, resuming from `continuation`
    /// if given.
    async fn list_page(
        &self,
        prefix: &str,
        continuation: Option<String>,
    ) -> Result<ObjectPage, ObjectStoreError>;

    /// Upload `bytes` under `key` as a world-readable object and return its
    /// public URL.
    async fn upload(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
        cache_control: &str,
    ) -> Result<String, ObjectStoreError>;

    /// Delete the object under `key`. Unconditional and irreversible.
    async fn delete(&self, key: &str) -> Result<(), ObjectStoreError>;
}

/// Drain every page under `prefix` into one vector.
pub async fn list_all(
    store: &dyn ObjectStore,
    prefix: &str,
) -> Result<Vec<StoredObject>, ObjectStoreError> {
    let mut objects = Vec::new();
    let mut continuation = None;
    loop {
        let page = store.list_page(prefix, continuation).await?;
        objects.extend(page.objects);
        continuation = page.next_token;
        if continuation.is_none() {
            break;
        }
    }
    Ok(objects)
}
