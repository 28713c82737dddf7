//! Filesystem tree nodes

use std::fmt::{self, Display, Formatter};

use crate::path::ROOT;

/// Node kind, fixed when the node is created
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Regular file with text content
    File,
    /// Directory with ordered children
    Directory,
}

impl Display for NodeKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::File => f.write_str("file"),
            Self::Directory => f.write_str("directory"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum NodeBody {
    Directory(Vec<FileSystemNode>),
    File(String),
}

/// A named file or directory
///
/// Only directories hold children, only files hold content. The body is
/// chosen at construction, so a node's kind can never change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSystemNode {
    name: String,
    body: NodeBody,
}

impl FileSystemNode {
    /// Empty directory
    #[inline]
    #[must_use]
    pub fn directory(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            body: NodeBody::Directory(Vec::new()),
        }
    }

    /// File with content
    #[inline]
    #[must_use]
    pub fn file(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            body: NodeBody::File(content.into()),
        }
    }

    /// Root directory, named after the separator
    #[inline]
    #[must_use]
    pub fn root() -> Self {
        Self::directory(ROOT)
    }

    /// Node name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Node kind
    #[inline]
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        match self.body {
            NodeBody::Directory(_) => NodeKind::Directory,
            NodeBody::File(_) => NodeKind::File,
        }
    }

    /// Whether this node is a directory
    #[inline]
    #[must_use]
    pub fn is_directory(&self) -> bool {
        matches!(self.body, NodeBody::Directory(_))
    }

    /// Children in insertion order (empty for files)
    #[inline]
    #[must_use]
    pub fn children(&self) -> &[FileSystemNode] {
        match &self.body {
            NodeBody::Directory(children) => children,
            NodeBody::File(_) => &[],
        }
    }

    /// File content (`None` for directories)
    #[inline]
    #[must_use]
    pub fn content(&self) -> Option<&str> {
        match &self.body {
            NodeBody::File(content) => Some(content),
            NodeBody::Directory(_) => None,
        }
    }

    /// Direct child by name
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&FileSystemNode> {
        self.children().iter().find(|c| c.name == name)
    }

    pub(crate) fn child_mut(&mut self, name: &str) -> Option<&mut FileSystemNode> {
        match &mut self.body {
            NodeBody::Directory(children) => children.iter_mut().find(|c| c.name == name),
            NodeBody::File(_) => None,
        }
    }

    /// Append a child; `false` if this is a file or the name is taken
    pub(crate) fn push_child(&mut self, node: FileSystemNode) -> bool {
        match &mut self.body {
            NodeBody::Directory(children) if !children.iter().any(|c| c.name == node.name) => {
                children.push(node);
                true
            }
            _ => false,
        }
    }

    /// Replace file content; `false` for directories
    pub(crate) fn set_content(&mut self, content: impl Into<String>) -> bool {
        match &mut self.body {
            NodeBody::File(existing) => {
                *existing = content.into();
                true
            }
            NodeBody::Directory(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_is_directory_named_separator() {
        let root = FileSystemNode::root();
        assert_eq!(root.name(), "/");
        assert_eq!(root.kind(), NodeKind::Directory);
        assert!(root.children().is_empty());
    }

    #[test]
    fn files_have_content_and_no_children() {
        let file = FileSystemNode::file("a.txt", "hi");
        assert_eq!(file.kind(), NodeKind::File);
        assert_eq!(file.content(), Some("hi"));
        assert!(file.children().is_empty());
    }

    #[test]
    fn push_child_rejects_duplicates_of_any_kind() {
        let mut dir = FileSystemNode::directory("d");
        assert!(dir.push_child(FileSystemNode::file("x", "")));
        assert!(!dir.push_child(FileSystemNode::directory("x")));
        assert_eq!(dir.children().len(), 1);
    }

    #[test]
    fn files_cannot_hold_children() {
        let mut file = FileSystemNode::file("f", "");
        assert!(!file.push_child(FileSystemNode::directory("x")));
    }

    #[test]
    fn set_content_only_on_files() {
        let mut dir = FileSystemNode::directory("d");
        assert!(!dir.set_content("nope"));
        let mut file = FileSystemNode::file("f", "old");
        assert!(file.set_content("new"));
        assert_eq!(file.content(), Some("new"));
    }
}
