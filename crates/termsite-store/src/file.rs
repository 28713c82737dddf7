//! Document store persisted to a directory
//!
//! Wraps an [`InMemoryDocumentStore`] and mirrors every collection to
//! `<dir>/<collection>.json` after each successful write. The whole
//! directory is read back on [`FileDocumentStore::open`], so a nickname
//! registered in one process is there for the next one.
//!
//! # Example
//!
//! ```rust
//! use termsite_store::{DocumentStore, FileDocumentStore};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let dir = tempfile::tempdir().unwrap();
//! let store = FileDocumentStore::open(dir.path()).unwrap();
//! store.create("users", "d1", serde_json::json!({"nickname": "alice"})).await.unwrap();
//!
//! let reopened = FileDocumentStore::open(dir.path()).unwrap();
//! assert!(reopened.get("users", "d1").await.unwrap().is_some());
//! # });
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::document::{Document, DocumentStore, Mutator, Subscription};
use crate::error::StoreError;
use crate::memory::InMemoryDocumentStore;

/// Extension of persisted collection files
pub const COLLECTION_FILE_EXT: &str = "json";

type CollectionFile = BTreeMap<String, Document>;

fn is_valid_collection(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-'))
}

/// [`DocumentStore`] that survives restarts
#[derive(Debug)]
pub struct FileDocumentStore {
    dir: PathBuf,
    inner: InMemoryDocumentStore,
    // Serializes snapshot-and-write so files never go back in time.
    flush: Mutex<()>,
}

impl FileDocumentStore {
    /// Open (or create) a store directory and load every collection in it
    ///
    /// # Errors
    /// - `StoreError::Io` if the directory cannot be created or read
    /// - `StoreError::Codec` if a collection file is not a JSON object of
    ///   documents
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;

        let inner = InMemoryDocumentStore::new();
        let mut loaded = 0usize;
        for entry in std::fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(COLLECTION_FILE_EXT) {
                continue;
            }
            let Some(collection) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if !is_valid_collection(collection) {
                tracing::warn!("skipping unexpected file {}", path.display());
                continue;
            }
            let docs: CollectionFile = serde_json::from_str(&std::fs::read_to_string(&path)?)?;
            for (key, doc) in docs {
                inner.load(collection, &key, doc);
                loaded += 1;
            }
        }
        tracing::info!("opened document store at {} ({loaded} documents)", dir.display());

        Ok(Self {
            dir,
            inner,
            flush: Mutex::new(()),
        })
    }

    /// Directory the collections live in
    #[inline]
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn collection_path(&self, collection: &str) -> Result<PathBuf, StoreError> {
        if !is_valid_collection(collection) {
            return Err(StoreError::Unavailable(format!(
                "collection name cannot be persisted: {collection}"
            )));
        }
        Ok(self
            .dir
            .join(format!("{collection}.{COLLECTION_FILE_EXT}")))
    }

    async fn persist(&self, collection: &str) -> Result<(), StoreError> {
        let path = self.collection_path(collection)?;
        let _guard = self.flush.lock().await;
        let docs: CollectionFile = self.inner.list(collection).await?.into_iter().collect();
        let raw = serde_json::to_string_pretty(&docs)?;

        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, raw).await?;
        tokio::fs::rename(&tmp, &path).await?;
        tracing::debug!("persisted {collection} ({} documents)", docs.len());
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for FileDocumentStore {
    async fn get(&self, collection: &str, key: &str) -> Result<Option<Document>, StoreError> {
        self.inner.get(collection, key).await
    }

    async fn list(&self, collection: &str) -> Result<Vec<(String, Document)>, StoreError> {
        self.inner.list(collection).await
    }

    async fn create(&self, collection: &str, key: &str, doc: Document) -> Result<(), StoreError> {
        self.collection_path(collection)?;
        self.inner.create(collection, key, doc).await?;
        self.persist(collection).await
    }

    async fn upsert(
        &self,
        collection: &str,
        key: &str,
        fields: Document,
    ) -> Result<Document, StoreError> {
        self.collection_path(collection)?;
        let merged = self.inner.upsert(collection, key, fields).await?;
        self.persist(collection).await?;
        Ok(merged)
    }

    async fn transact(
        &self,
        collection: &str,
        key: &str,
        mutator: Mutator,
    ) -> Result<Option<Document>, StoreError> {
        self.collection_path(collection)?;
        let after = self.inner.transact(collection, key, mutator).await?;
        self.persist(collection).await?;
        Ok(after)
    }

    async fn subscribe(&self, collection: &str, key: &str) -> Result<Subscription, StoreError> {
        self.inner.subscribe(collection, key).await
    }

    async fn delete(&self, collection: &str, key: &str) -> Result<(), StoreError> {
        self.collection_path(collection)?;
        self.inner.delete(collection, key).await?;
        self.persist(collection).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Mutation;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[tokio::test]
    async fn writes_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileDocumentStore::open(dir.path()).unwrap();
        store.create("rooms", "A", json!({"version": 1})).await.unwrap();
        store
            .upsert("users", "d1", json!({"nickname": "alice"}))
            .await
            .unwrap();
        store
            .transact("rooms", "A", Box::new(|_| Ok(Mutation::Write(json!({"version": 2})))))
            .await
            .unwrap();
        drop(store);

        let reopened = FileDocumentStore::open(dir.path()).unwrap();
        assert_eq!(
            reopened.get("rooms", "A").await.unwrap(),
            Some(json!({"version": 2}))
        );
        assert_eq!(
            reopened.get("users", "d1").await.unwrap(),
            Some(json!({"nickname": "alice"}))
        );
        assert!(reopened.create("rooms", "A", json!({})).await.is_err());
    }

    #[tokio::test]
    async fn deletes_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileDocumentStore::open(dir.path()).unwrap();
        store.create("rooms", "A", json!({})).await.unwrap();
        store.create("rooms", "B", json!({})).await.unwrap();
        store.delete("rooms", "A").await.unwrap();

        let reopened = FileDocumentStore::open(dir.path()).unwrap();
        let keys: Vec<_> = reopened
            .list("rooms")
            .await
            .unwrap()
            .into_iter()
            .map(|(key, _)| key)
            .collect();
        assert_eq!(keys, vec!["B"]);
    }

    #[tokio::test]
    async fn odd_collection_names_are_refused() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileDocumentStore::open(dir.path()).unwrap();
        assert!(matches!(
            store.create("../escape", "k", json!({})).await,
            Err(StoreError::Unavailable(_))
        ));
        assert!(store.get("../escape", "k").await.unwrap().is_none());
    }

    #[test]
    fn corrupt_collection_file_fails_open() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("users.json"), "[1, 2").unwrap();
        assert!(matches!(
            FileDocumentStore::open(dir.path()),
            Err(StoreError::Codec(_))
        ));
    }

    #[test]
    fn stray_files_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("notes.txt"), "hello").unwrap();
        std::fs::write(dir.path().join("device_id"), "abc").unwrap();
        assert!(FileDocumentStore::open(dir.path()).unwrap().dir().exists());
    }
}
