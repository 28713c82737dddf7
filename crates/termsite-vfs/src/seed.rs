//! Initial tree for a new session
//!
//! Every session starts from the same skeleton with the visitor's home
//! directory, followed by any extra entries from configuration.

use serde::{Deserialize, Serialize};

use crate::fs::{FsError, VirtualFileSystem};
use crate::path::{self, home_path, HOME_ALIAS};

const ABOUT: &str = "Hi, I'm the owner of this site. Poke around with `ls`, `cd` and `open`.";
const CONTACT: &str = "Leave a note with `comment <text>` and I'll read it.";
const PROJECTS_README: &str = "Things I have built live here. `open` a file to read it.";

/// Extra file or directory to create at session start
///
/// A missing `content` means a directory. Paths may start with `~`, which
/// expands to the visitor's home.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedEntry {
    /// Absolute or `~`-relative path
    pub path: String,
    /// File content; `None` for directories
    #[serde(default)]
    pub content: Option<String>,
}

impl SeedEntry {
    /// Directory entry
    #[must_use]
    pub fn directory(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: None,
        }
    }

    /// File entry
    #[must_use]
    pub fn file(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: Some(content.into()),
        }
    }

    fn expanded_path(&self, home: &str) -> String {
        match self.path.strip_prefix(HOME_ALIAS) {
            Some("") => home.to_string(),
            Some(rest) if rest.starts_with(path::SEPARATOR) => format!("{home}{rest}"),
            _ => self.path.clone(),
        }
    }
}

/// Default skeleton, relative to the home directory
#[must_use]
pub fn default_entries() -> Vec<SeedEntry> {
    vec![
        SeedEntry::file("~/about.txt", ABOUT),
        SeedEntry::file("~/contact.txt", CONTACT),
        SeedEntry::file("~/projects/README.txt", PROJECTS_README),
    ]
}

/// Build the tree for a session
///
/// Creates `/home/<nickname>`, the default skeleton, then `extra` in order.
/// File entries overwrite earlier content at the same path.
///
/// # Errors
/// Returns `FsError` if an entry's path is unusable (invalid names, or a
/// file sitting where a directory is needed).
pub fn build_tree(nickname: &str, extra: &[SeedEntry]) -> Result<VirtualFileSystem, FsError> {
    let home = home_path(nickname);
    let mut fs = VirtualFileSystem::new();
    fs.ensure_directory(&home)?;

    for entry in default_entries().iter().chain(extra) {
        apply(&mut fs, &home, entry)?;
    }
    Ok(fs)
}

fn apply(fs: &mut VirtualFileSystem, home: &str, entry: &SeedEntry) -> Result<(), FsError> {
    let target = entry.expanded_path(home);
    if !path::is_syntactically_valid(&target) {
        return Err(FsError::InvalidName(entry.path.clone()));
    }
    match &entry.content {
        None => fs.ensure_directory(&target),
        Some(content) => {
            let parent = path::parent_of(&target);
            let name = path::file_name(&target)
                .ok_or_else(|| FsError::InvalidName(entry.path.clone()))?;
            fs.ensure_directory(&parent)?;
            fs.write_file(&parent, name, content.as_str()).map(|_| ())
        }
    }
}
