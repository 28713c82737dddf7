//! termsite core
//!
//! Wires the shell, the store and the chess rooms into one visitor session
//! and carries the site configuration.
//!
//! # Core Concepts
//!
//! - [`SiteConfig`]: TOML configuration with defaults for every field
//! - [`PasswordGate`]: the shared password in front of everything
//! - [`SiteSession`]: gate → nickname → shell, per device
//! - [`StoreCommentSink`]: background replication of `comment`
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use termsite_core::{SiteConfig, SiteSession, Stage};
//! use termsite_store::{DeviceId, InMemoryDocumentStore};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let store = Arc::new(InMemoryDocumentStore::new());
//! let mut site = SiteSession::open(SiteConfig::new(), store, DeviceId::new("d1")).unwrap();
//! site.unlock("letmein");
//! site.choose_nickname("alice").await.unwrap();
//! assert_eq!(site.stage(), Stage::Shell);
//! # });
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod config;
mod error;
mod gate;
mod site;
mod sink;

pub use config::{ChessConfig, ConfigError, SiteConfig, DOCUMENTS_DIR};
pub use error::SiteError;
pub use gate::PasswordGate;
pub use site::{SiteSession, Stage};
pub use sink::StoreCommentSink;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
