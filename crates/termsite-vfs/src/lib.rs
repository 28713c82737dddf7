//! termsite virtual filesystem
//!
//! In-memory tree of files and directories walked by the shell.
//!
//! # Core Concepts
//!
//! - [`PathResolver`]: turns user-typed targets into absolute paths
//! - [`FileSystemNode`]: a named file or directory
//! - [`VirtualFileSystem`]: the mutable tree with lookup and creation
//! - [`build_tree`]: the skeleton every session starts from
//!
//! # Example
//!
//! ```rust
//! use termsite_vfs::{build_tree, PathResolver};
//!
//! let mut fs = build_tree("alice", &[]).unwrap();
//! let resolver = PathResolver::for_nickname("alice");
//!
//! let target = resolver.resolve("/home/alice", "notes");
//! fs.create_directory("/home/alice", "notes").unwrap();
//! assert!(fs.is_directory(&target));
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod fs;
mod node;
pub mod path;
mod seed;

pub use fs::{FsError, VirtualFileSystem, WriteOutcome};
pub use node::{FileSystemNode, NodeKind};
pub use path::{is_syntactically_valid, is_valid_name, parent_of, PathResolver};
pub use seed::{build_tree, default_entries, SeedEntry};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
