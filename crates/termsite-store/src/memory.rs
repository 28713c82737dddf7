//! In-process document store
//!
//! Every document address owns a slot holding the current value and a watch
//! channel. Deleting a document leaves an empty slot behind so existing
//! subscribers observe `None` instead of a closed channel.

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::watch;

use crate::document::{merge_fields, Document, DocumentStore, Mutation, Mutator, Subscription};
use crate::error::StoreError;

type SlotKey = (String, String);

fn slot_key(collection: &str, key: &str) -> SlotKey {
    (collection.to_string(), key.to_string())
}

#[derive(Debug)]
struct Slot {
    value: Option<Document>,
    tx: watch::Sender<Option<Document>>,
}

impl Slot {
    fn empty() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { value: None, tx }
    }

    fn set(&mut self, value: Option<Document>) {
        self.value.clone_from(&value);
        self.tx.send_replace(value);
    }
}

/// [`DocumentStore`] backed by a concurrent map
///
/// Operations on one document are serialized by the map's shard lock, which
/// makes `transact` atomic.
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    slots: DashMap<SlotKey, Slot>,
}

impl InMemoryDocumentStore {
    /// Empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live documents across all collections
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.value.is_some()).count()
    }

    /// Whether no documents are stored
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Put a document in place, skipping the create conflict check
    pub(crate) fn load(&self, collection: &str, key: &str, doc: Document) {
        self.slots
            .entry(slot_key(collection, key))
            .or_insert_with(Slot::empty)
            .set(Some(doc));
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn get(&self, collection: &str, key: &str) -> Result<Option<Document>, StoreError> {
        Ok(self
            .slots
            .get(&slot_key(collection, key))
            .and_then(|slot| slot.value.clone()))
    }

    async fn list(&self, collection: &str) -> Result<Vec<(String, Document)>, StoreError> {
        Ok(self
            .slots
            .iter()
            .filter(|entry| entry.key().0 == collection)
            .filter_map(|entry| {
                let value = entry.value().value.clone()?;
                Some((entry.key().1.clone(), value))
            })
            .collect())
    }

    async fn create(&self, collection: &str, key: &str, doc: Document) -> Result<(), StoreError> {
        let mut slot = self
            .slots
            .entry(slot_key(collection, key))
            .or_insert_with(Slot::empty);
        if slot.value.is_some() {
            return Err(StoreError::already_exists(collection, key));
        }
        slot.set(Some(doc));
        tracing::debug!("created {collection}/{key}");
        Ok(())
    }

    async fn upsert(
        &self,
        collection: &str,
        key: &str,
        fields: Document,
    ) -> Result<Document, StoreError> {
        let mut slot = self
            .slots
            .entry(slot_key(collection, key))
            .or_insert_with(Slot::empty);
        let merged = merge_fields(slot.value.as_ref(), fields);
        slot.set(Some(merged.clone()));
        Ok(merged)
    }

    async fn transact(
        &self,
        collection: &str,
        key: &str,
        mutator: Mutator,
    ) -> Result<Option<Document>, StoreError> {
        let mut slot = self
            .slots
            .entry(slot_key(collection, key))
            .or_insert_with(Slot::empty);
        match mutator(slot.value.as_ref()).map_err(StoreError::Aborted)? {
            Mutation::Keep => Ok(slot.value.clone()),
            Mutation::Write(doc) => {
                slot.set(Some(doc.clone()));
                Ok(Some(doc))
            }
            Mutation::Delete => {
                slot.set(None);
                Ok(None)
            }
        }
    }

    async fn subscribe(&self, collection: &str, key: &str) -> Result<Subscription, StoreError> {
        let slot = self
            .slots
            .entry(slot_key(collection, key))
            .or_insert_with(Slot::empty);
        Ok(Subscription::new(slot.tx.subscribe()))
    }

    async fn delete(&self, collection: &str, key: &str) -> Result<(), StoreError> {
        let Some(mut slot) = self.slots.get_mut(&slot_key(collection, key)) else {
            return Err(StoreError::not_found(collection, key));
        };
        if slot.value.is_none() {
            return Err(StoreError::not_found(collection, key));
        }
        slot.set(None);
        tracing::debug!("deleted {collection}/{key}");
        Ok(())
    }
}
