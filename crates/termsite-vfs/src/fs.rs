//! In-memory virtual filesystem
//!
//! The session owns exactly one tree and mutates it in place; every change is
//! visible to the next lookup.

use crate::node::{FileSystemNode, NodeKind};
use crate::path::{self, components};

/// Errors from filesystem mutations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FsError {
    /// A sibling with this name exists
    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// The parent directory does not exist
    #[error("parent directory missing: {0}")]
    ParentMissing(String),

    /// A path component is a file
    #[error("not a directory: {0}")]
    NotADirectory(String),

    /// Nothing at this path
    #[error("no such file or directory: {0}")]
    NotFound(String),

    /// Target is a directory where a file was expected
    #[error("is a directory: {0}")]
    IsADirectory(String),

    /// Name outside the allowed charset
    #[error("invalid name: {0} (letters, digits, '.', '_' and '-' only)")]
    InvalidName(String),
}

/// Result of an upsert-style write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// File did not exist and was created
    Created,
    /// Existing file content was replaced
    Updated,
}

/// Tree of named nodes rooted at `/`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualFileSystem {
    root: FileSystemNode,
}

impl VirtualFileSystem {
    /// Filesystem holding only the root directory
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            root: FileSystemNode::root(),
        }
    }

    /// Root node
    #[inline]
    #[must_use]
    pub fn root(&self) -> &FileSystemNode {
        &self.root
    }

    /// Walk `path` from the root
    ///
    /// Returns `None` if any component is missing, or if a file sits where
    /// further components remain.
    #[must_use]
    pub fn node_at(&self, path: &str) -> Option<&FileSystemNode> {
        components(path).try_fold(&self.root, |node, seg| {
            if node.is_directory() {
                node.child(seg)
            } else {
                None
            }
        })
    }

    fn node_at_mut(&mut self, path: &str) -> Option<&mut FileSystemNode> {
        let mut node = &mut self.root;
        for seg in components(path) {
            node = node.child_mut(seg)?;
        }
        Some(node)
    }

    /// Whether `path` names an existing directory
    #[inline]
    #[must_use]
    pub fn is_directory(&self, path: &str) -> bool {
        self.node_at(path).is_some_and(FileSystemNode::is_directory)
    }

    /// Create an empty directory `name` under `parent_path`
    ///
    /// # Errors
    /// - `FsError::InvalidName` if `name` fails [`path::is_valid_name`]
    /// - `FsError::ParentMissing` / `FsError::NotADirectory` for a bad parent
    /// - `FsError::AlreadyExists` if any sibling has the same name
    pub fn create_directory(&mut self, parent_path: &str, name: &str) -> Result<(), FsError> {
        self.insert(parent_path, FileSystemNode::directory(name))
    }

    /// Create a file `name` under `parent_path`
    ///
    /// # Errors
    /// Same as [`Self::create_directory`]; duplicates are rejected, not overwritten.
    pub fn create_file(
        &mut self,
        parent_path: &str,
        name: &str,
        content: impl Into<String>,
    ) -> Result<(), FsError> {
        self.insert(parent_path, FileSystemNode::file(name, content))
    }

    /// Replace the content of an existing file
    ///
    /// # Errors
    /// - `FsError::NotFound` if the file does not exist
    /// - `FsError::IsADirectory` if the target is a directory
    pub fn update_file_content(
        &mut self,
        parent_path: &str,
        name: &str,
        content: impl Into<String>,
    ) -> Result<(), FsError> {
        let full = path::join(parent_path, name);
        let node = self
            .node_at_mut(&full)
            .ok_or_else(|| FsError::NotFound(full.clone()))?;
        if node.set_content(content) {
            Ok(())
        } else {
            Err(FsError::IsADirectory(full))
        }
    }

    /// Create the file or replace its content
    ///
    /// # Errors
    /// - `FsError::IsADirectory` if a directory holds the name
    /// - any error from [`Self::create_file`]
    pub fn write_file(
        &mut self,
        parent_path: &str,
        name: &str,
        content: impl Into<String>,
    ) -> Result<WriteOutcome, FsError> {
        let full = path::join(parent_path, name);
        match self.node_at(&full).map(FileSystemNode::kind) {
            Some(NodeKind::File) => self
                .update_file_content(parent_path, name, content)
                .map(|()| WriteOutcome::Updated),
            Some(NodeKind::Directory) => Err(FsError::IsADirectory(full)),
            None => self
                .create_file(parent_path, name, content)
                .map(|()| WriteOutcome::Created),
        }
    }

    /// Content of the file at `path` (`None` when missing or a directory)
    #[must_use]
    pub fn read_file_content(&self, path: &str) -> Option<&str> {
        self.node_at(path).and_then(FileSystemNode::content)
    }

    /// Create `path` and any missing ancestors
    ///
    /// # Errors
    /// - `FsError::NotADirectory` if a file is in the way
    /// - `FsError::InvalidName` for a bad component
    pub fn ensure_directory(&mut self, path: &str) -> Result<(), FsError> {
        let mut current = path::ROOT.to_string();
        for seg in components(path) {
            let next = path::join(&current, seg);
            match self.node_at(&next).map(FileSystemNode::kind) {
                Some(NodeKind::Directory) => {}
                Some(NodeKind::File) => return Err(FsError::NotADirectory(next)),
                None => self.create_directory(&current, seg)?,
            }
            current = next;
        }
        Ok(())
    }

    fn insert(&mut self, parent_path: &str, node: FileSystemNode) -> Result<(), FsError> {
        if !path::is_valid_name(node.name()) {
            return Err(FsError::InvalidName(node.name().to_string()));
        }
        let parent = self
            .node_at_mut(parent_path)
            .ok_or_else(|| FsError::ParentMissing(parent_path.to_string()))?;
        if !parent.is_directory() {
            return Err(FsError::NotADirectory(parent_path.to_string()));
        }
        let full = path::join(parent_path, node.name());
        if parent.push_child(node) {
            tracing::debug!("created {}", full);
            Ok(())
        } else {
            Err(FsError::AlreadyExists(full))
        }
    }
}

impl Default for VirtualFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> VirtualFileSystem {
        let mut fs = VirtualFileSystem::new();
        fs.ensure_directory("/home/alice").unwrap();
        fs.create_file("/home/alice", "about.txt", "hello").unwrap();
        fs
    }

    #[test]
    fn node_at_walks_components() {
        let fs = sample();
        assert!(fs.node_at("/").unwrap().is_directory());
        assert_eq!(fs.node_at("/home/alice").unwrap().name(), "alice");
        assert!(fs.node_at("/home/bob").is_none());
    }

    #[test]
    fn node_at_stops_at_files() {
        let fs = sample();
        assert!(fs.node_at("/home/alice/about.txt/more").is_none());
    }

    #[test]
    fn create_directory_errors() {
        let mut fs = sample();
        assert_eq!(
            fs.create_directory("/home/alice", "about.txt"),
            Err(FsError::AlreadyExists("/home/alice/about.txt".into()))
        );
        assert_eq!(
            fs.create_directory("/nowhere", "x"),
            Err(FsError::ParentMissing("/nowhere".into()))
        );
        assert_eq!(
            fs.create_directory("/home/alice/about.txt", "x"),
            Err(FsError::NotADirectory("/home/alice/about.txt".into()))
        );
        assert_eq!(
            fs.create_directory("/home", "bad name"),
            Err(FsError::InvalidName("bad name".into()))
        );
    }

    #[test]
    fn create_file_rejects_duplicates() {
        let mut fs = sample();
        let err = fs.create_file("/home/alice", "about.txt", "again").unwrap_err();
        assert!(matches!(err, FsError::AlreadyExists(_)));
        assert_eq!(fs.read_file_content("/home/alice/about.txt"), Some("hello"));
    }

    #[test]
    fn update_file_content_in_place() {
        let mut fs = sample();
        fs.update_file_content("/home/alice", "about.txt", "bye").unwrap();
        assert_eq!(fs.read_file_content("/home/alice/about.txt"), Some("bye"));
        assert!(matches!(
            fs.update_file_content("/home/alice", "missing", "x"),
            Err(FsError::NotFound(_))
        ));
        assert!(matches!(
            fs.update_file_content("/home", "alice", "x"),
            Err(FsError::IsADirectory(_))
        ));
    }

    #[test]
    fn write_file_creates_then_updates() {
        let mut fs = sample();
        assert_eq!(fs.write_file("/home/alice", "n.txt", "1"), Ok(WriteOutcome::Created));
        assert_eq!(fs.write_file("/home/alice", "n.txt", "2"), Ok(WriteOutcome::Updated));
        assert_eq!(fs.read_file_content("/home/alice/n.txt"), Some("2"));
        assert!(matches!(
            fs.write_file("/home", "alice", "x"),
            Err(FsError::IsADirectory(_))
        ));
    }

    #[test]
    fn read_file_content_absent_for_directories() {
        let fs = sample();
        assert_eq!(fs.read_file_content("/home/alice"), None);
        assert_eq!(fs.read_file_content("/home/alice/nope"), None);
    }

    #[test]
    fn ensure_directory_is_idempotent() {
        let mut fs = sample();
        fs.ensure_directory("/home/alice/a/b").unwrap();
        fs.ensure_directory("/home/alice/a/b").unwrap();
        assert!(fs.is_directory("/home/alice/a/b"));
        assert!(matches!(
            fs.ensure_directory("/home/alice/about.txt/x"),
            Err(FsError::NotADirectory(_))
        ));
    }
}
