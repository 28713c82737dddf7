//! termsite store
//!
//! The hosted document database as seen by the site, plus the records kept
//! in it.
//!
//! # Core Concepts
//!
//! - [`DocumentStore`]: create / upsert / transact / subscribe / delete
//! - [`InMemoryDocumentStore`]: the in-process implementation
//! - [`FileDocumentStore`]: the same, mirrored to a directory
//! - [`DeviceId`]: who a returning visitor is, without authentication
//! - [`NicknameRegistry`] and [`CommentBoard`]: typed collections on top
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use termsite_store::{DeviceId, InMemoryDocumentStore, NicknameRegistry};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let registry = NicknameRegistry::new(Arc::new(InMemoryDocumentStore::new()));
//! let device = DeviceId::new("device-1");
//! registry.register(&device, "alice").await.unwrap();
//! assert_eq!(registry.lookup(&device).await.unwrap().unwrap().nickname, "alice");
//! # });
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod comments;
pub mod document;
mod error;
mod file;
mod identity;
mod memory;
mod users;

pub use comments::{CommentBoard, StoredComment, COMMENTS_COLLECTION};
pub use document::{decode, encode, Document, DocumentStore, Mutation, Mutator, Subscription};
pub use error::{AbortReason, IdentityError, StoreError};
pub use file::{FileDocumentStore, COLLECTION_FILE_EXT};
pub use identity::{
    ClientMetadata, DeviceId, DeviceStorage, FileDeviceStorage, MemoryDeviceStorage,
    DEVICE_ID_FILE,
};
pub use memory::InMemoryDocumentStore;
pub use users::{NicknameRegistry, UserRecord, USERS_COLLECTION};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
