//! In-memory object store.
//!
//! Backs tests and local development. Tracks per-method call counts and can
//! be told to fail puts for keys containing a marker substring, so tests can
//! assert call-count and partial-failure behavior.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::anyhow;
use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{ObjectBody, ObjectEntry, ObjectStore, StoreError};

#[derive(Debug, Clone)]
struct StoredObject {
    bytes: Vec<u8>,
    content_type: String,
}

/// In-memory [`ObjectStore`] implementation.
#[derive(Default)]
pub struct MemoryStore {
    objects: Mutex<HashMap<String, StoredObject>>,
    list_calls: AtomicUsize,
    get_calls: AtomicUsize,
    put_calls: AtomicUsize,
    fail_marker: Mutex<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an object directly, without touching the call counters.
    pub async fn insert(&self, key: &str, bytes: &[u8], content_type: &str) {
        self.objects.lock().await.insert(
            key.to_string(),
            StoredObject {
                bytes: bytes.to_vec(),
                content_type: content_type.to_string(),
            },
        );
    }

    /// Look up an object as (bytes, content type).
    pub async fn object(&self, key: &str) -> Option<(Vec<u8>, String)> {
        self.objects
            .lock()
            .await
            .get(key)
            .map(|o| (o.bytes.clone(), o.content_type.clone()))
    }

    /// All stored keys, sorted.
    pub async fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.objects.lock().await.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub async fn len(&self) -> usize {
        self.objects.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.lock().await.is_empty()
    }

    /// Make subsequent puts fail for any key containing `marker`.
    pub async fn fail_puts_containing(&self, marker: &str) {
        *self.fail_marker.lock().await = Some(marker.to_string());
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn get_calls(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }

    pub fn put_calls(&self) -> usize {
        self.put_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn list(&self, prefix: &str) -> Result<Vec<ObjectEntry>, StoreError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);

        let objects = self.objects.lock().await;
        let mut entries: Vec<ObjectEntry> = objects
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(key, object)| ObjectEntry {
                key: key.clone(),
                size: object.bytes.len() as u64,
            })
            .collect();
        entries.sort_by(|a, b| a.key.cmp(&b.key));

        Ok(entries)
    }

    async fn get(&self, key: &str) -> Result<ObjectBody, StoreError> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);

        let objects = self.objects.lock().await;
        match objects.get(key) {
            Some(object) => Ok(ObjectBody {
                bytes: object.bytes.clone(),
                content_type: Some(object.content_type.clone()),
            }),
            None => Err(StoreError::NotFound {
                key: key.to_string(),
            }),
        }
    }

    async fn put(&self, key: &str, body: &[u8], content_type: &str) -> Result<(), StoreError> {
        self.put_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(marker) = self.fail_marker.lock().await.as_deref() {
            if key.contains(marker) {
                return Err(StoreError::Backend(anyhow!(
                    "injected put failure for key '{key}'"
                )));
            }
        }

        self.objects.lock().await.insert(
            key.to_string(),
            StoredObject {
                bytes: body.to_vec(),
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }
}
