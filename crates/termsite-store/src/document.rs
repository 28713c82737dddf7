//! Document store contract
//!
//! Documents are JSON values grouped into named collections and addressed by
//! string keys. Typed records go through [`encode`] and [`decode`].
//!
//! # Core Concepts
//!
//! - `create` fails if the key is taken
//! - `upsert` merges top-level fields into whatever is there
//! - `transact` runs a [`Mutator`] atomically against the current value
//! - `subscribe` hands out a [`Subscription`] that always holds the latest
//!   value (`None` once the document is deleted)

use std::fmt::Debug;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::watch;

use crate::error::{AbortReason, StoreError};

/// A stored document
pub type Document = Value;

/// What a transaction does with the document it saw
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    /// Leave the document as it is
    Keep,
    /// Replace the document
    Write(Document),
    /// Remove the document
    Delete,
}

/// Transaction body
///
/// Receives the current document (`None` if absent). Runs while the store
/// holds the document exclusively, so it must not call back into the store.
pub type Mutator = Box<dyn FnOnce(Option<&Document>) -> Result<Mutation, AbortReason> + Send>;

/// Latest-value view of one document
#[derive(Debug, Clone)]
pub struct Subscription {
    rx: watch::Receiver<Option<Document>>,
}

impl Subscription {
    /// Wrap a watch receiver
    #[must_use]
    pub fn new(rx: watch::Receiver<Option<Document>>) -> Self {
        Self { rx }
    }

    /// Value right now
    #[must_use]
    pub fn current(&self) -> Option<Document> {
        self.rx.borrow().clone()
    }

    /// Wait for the next change and return the new value
    ///
    /// Intermediate values may be skipped; the one returned is always the
    /// newest. Returns `None` once the store has gone away.
    pub async fn next(&mut self) -> Option<Option<Document>> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }
}

/// Hosted document database contract
#[async_trait]
pub trait DocumentStore: Send + Sync + Debug {
    /// Read one document
    async fn get(&self, collection: &str, key: &str) -> Result<Option<Document>, StoreError>;

    /// All documents of a collection, in no particular order
    async fn list(&self, collection: &str) -> Result<Vec<(String, Document)>, StoreError>;

    /// Insert a new document
    ///
    /// # Errors
    /// `StoreError::AlreadyExists` if the key is taken.
    async fn create(&self, collection: &str, key: &str, doc: Document) -> Result<(), StoreError>;

    /// Merge `fields` into the document, creating it if needed
    ///
    /// Returns the merged document.
    async fn upsert(
        &self,
        collection: &str,
        key: &str,
        fields: Document,
    ) -> Result<Document, StoreError>;

    /// Read-then-conditional-write
    ///
    /// Returns the document after the transaction.
    ///
    /// # Errors
    /// `StoreError::Aborted` carrying the mutator's reason if it aborts; the
    /// document is then untouched.
    async fn transact(
        &self,
        collection: &str,
        key: &str,
        mutator: Mutator,
    ) -> Result<Option<Document>, StoreError>;

    /// Watch one document
    async fn subscribe(&self, collection: &str, key: &str) -> Result<Subscription, StoreError>;

    /// Remove a document
    ///
    /// # Errors
    /// `StoreError::NotFound` if there is nothing to delete.
    async fn delete(&self, collection: &str, key: &str) -> Result<(), StoreError>;
}

/// Serialize a record into a document
///
/// # Errors
/// `StoreError::Codec` if serialization fails.
pub fn encode<T: Serialize>(value: &T) -> Result<Document, StoreError> {
    Ok(serde_json::to_value(value)?)
}

/// Deserialize a document into a record
///
/// # Errors
/// `StoreError::Codec` if the document has the wrong shape.
pub fn decode<T: DeserializeOwned>(doc: Document) -> Result<T, StoreError> {
    Ok(serde_json::from_value(doc)?)
}

/// Merge top-level fields; non-object values replace outright
#[must_use]
pub fn merge_fields(existing: Option<&Document>, fields: Document) -> Document {
    match (existing, fields) {
        (Some(Value::Object(base)), Value::Object(fields)) => {
            let mut merged = base.clone();
            merged.extend(fields);
            Value::Object(merged)
        }
        (_, fields) => fields,
    }
}
