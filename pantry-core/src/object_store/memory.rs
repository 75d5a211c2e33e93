//! In-memory object store for testing.

use std::collections::{BTreeMap, HashSet};
use std::sync::RwLock;

use async_trait::async_trait;

use crate::error::ObjectStoreError;

use super::{ObjectPage, ObjectStore, StoredObject};

/// URL base the fake reports for uploads.
const URL_BASE: &str = "https://objects.test";

/// One object held by the fake, with the metadata uploads carry.
#[derive(Debug, Clone)]
pub struct MemoryObject {
    pub bytes: Vec<u8>,
    pub content_type: String,
    pub cache_control: String,
}

/// An in-memory [`ObjectStore`].
///
/// Keys list in lexicographic order with a configurable page size, so
/// pagination behaves like the real store's continuation tokens.
#[derive(Debug)]
pub struct MemoryObjectStore {
    objects: RwLock<BTreeMap<String, MemoryObject>>,
    failing_keys: HashSet<String>,
    page_size: usize,
}

impl Default for MemoryObjectStore {
    fn default() -> Self {
        Self {
            objects: RwLock::new(BTreeMap::new()),
            failing_keys: HashSet::new(),
            page_size: 1000,
        }
    }
}

#[allow(dead_code)]
impl MemoryObjectStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the listing page size, builder-style.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Pre-load an object, builder-style.
    pub fn with_object(self, key: &str, bytes: Vec<u8>) -> Self {
        self.objects.write().unwrap().insert(
            key.to_string(),
            MemoryObject {
                bytes,
                content_type: "application/octet-stream".to_string(),
                cache_control: String::new(),
            },
        );
        self
    }

    /// Make uploads to `key` fail, builder-style.
    pub fn with_upload_failure(mut self, key: &str) -> Self {
        self.failing_keys.insert(key.to_string());
        self
    }

    /// Snapshot one object for assertions.
    pub fn get(&self, key: &str) -> Option<MemoryObject> {
        self.objects.read().unwrap().get(key).cloned()
    }

    /// All stored keys, in listing order.
    pub fn keys(&self) -> Vec<String> {
        self.objects.read().unwrap().keys().cloned().collect()
    }

    /// Number of stored objects.
    pub fn len(&self) -> usize {
        self.objects.read().unwrap().len()
    }

    /// Whether the store holds no objects.
    pub fn is_empty(&self) -> bool {
        self.objects.read().unwrap().is_empty()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn list_page(
        &self,
        prefix: &str,
        continuation: Option<String>,
    ) -> Result<ObjectPage, ObjectStoreError> {
        let objects = self.objects.read().unwrap();
        // Continuation token is the last key of the previous page.
        let matching = objects
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .filter(|(key, _)| match &continuation {
                Some(after) => key.as_str() > after.as_str(),
                None => true,
            });

        let mut page = Vec::new();
        let mut remaining = false;
        for (key, object) in matching {
            if page.len() == self.page_size {
                remaining = true;
                break;
            }
            page.push(StoredObject {
                key: key.clone(),
                size: object.bytes.len() as i64,
            });
        }

        let next_token = if remaining {
            page.last().map(|o| o.key.clone())
        } else {
            None
        };
        Ok(ObjectPage {
            objects: page,
            next_token,
        })
    }

    async fn upload(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
        cache_control: &str,
    ) -> Result<String, ObjectStoreError> {
        if self.failing_keys.contains(key) {
            return Err(ObjectStoreError::Backend(format!(
                "upload failure injected for key: {}",
                key
            )));
        }
        self.objects.write().unwrap().insert(
            key.to_string(),
            MemoryObject {
                bytes,
                content_type: content_type.to_string(),
                cache_control: cache_control.to_string(),
            },
        );
        Ok(format!("{}/{}", URL_BASE, key))
    }

    async fn delete(&self, key: &str) -> Result<(), ObjectStoreError> {
        self.objects.write().unwrap().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object_store::list_all;

    #[tokio::test]
    async fn test_upload_stores_metadata_and_reports_url() {
        let store = MemoryObjectStore::new();
        let url = store
            .upload(
                "img/saltibarsciai.jpg",
                vec![1, 2, 3],
                "image/jpeg",
                "public, max-age=31536000",
            )
            .await
            .unwrap();
        assert_eq!(url, "https://objects.test/img/saltibarsciai.jpg");

        let object = store.get("img/saltibarsciai.jpg").unwrap();
        assert_eq!(object.content_type, "image/jpeg");
        assert_eq!(object.cache_control, "public, max-age=31536000");
        assert_eq!(object.bytes, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_pagination_drains_every_key_once() {
        let mut store = MemoryObjectStore::new().with_page_size(2);
        for i in 0..5 {
            store = store.with_object(&format!("img/photo-{}.jpg", i), vec![0; i + 1]);
        }
        // an object outside the prefix must not appear
        store = store.with_object("misc/readme.txt", vec![0]);

        let first = store.list_page("img/", None).await.unwrap();
        assert_eq!(first.objects.len(), 2);
        let second = store
            .list_page("img/", first.next_token.clone())
            .await
            .unwrap();
        assert_eq!(second.objects.len(), 2);
        let third = store
            .list_page("img/", second.next_token.clone())
            .await
            .unwrap();
        assert_eq!(third.objects.len(), 1);
        assert!(third.next_token.is_none());

        let drained = list_all(&store, "img/").await.unwrap();
        let mut keys: Vec<&str> = drained.iter().map(|o| o.key.as_str()).collect();
        let paged: Vec<&str> = first
            .objects
            .iter()
            .chain(&second.objects)
            .chain(&third.objects)
            .map(|o| o.key.as_str())
            .collect();
        assert_eq!(keys, paged);
        keys.dedup();
        assert_eq!(keys.len(), 5);
    }

    #[tokio::test]
    async fn test_injected_upload_failure() {
        let store = MemoryObjectStore::new().with_upload_failure("img/cepelinai.jpg");
        let err = store
            .upload("img/cepelinai.jpg", vec![1], "image/jpeg", "")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("img/cepelinai.jpg"));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_delete_removes_object() {
        let store = MemoryObjectStore::new().with_object("img/tinginys.jpg", vec![9]);
        store.delete("img/tinginys.jpg").await.unwrap();
        assert!(store.is_empty());
        // deleting a missing key is not an error
        store.delete("img/tinginys.jpg").await.unwrap();
    }
}
