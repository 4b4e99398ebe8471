//! Local vault access
//!
//! Commands reach notes only through the [`ContentStore`] and
//! [`EditorContext`] seams. Paths are vault-relative, `/`-separated and
//! never absolute.

pub mod editor;
pub mod fs;
pub mod links;
pub mod markdown;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use editor::{
    ActiveFile, BufferEditor, Confidence, EditOutcome, EditorContext, HeadlessEditor, Selection,
    SelectionSource,
};
pub use fs::FsVault;
pub use links::LinkIndex;
pub use markdown::{NoteMetadata, TaskItem};

use crate::{Error, Result};

/// Kind of vault entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Folder,
}

/// One file or folder in the vault
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub path: String,
    pub kind: EntryKind,
    /// Byte size for files
    pub size: u64,
    /// Direct child count for folders
    pub children: usize,
}

impl Entry {
    /// Whether this is a file
    #[must_use]
    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }

    /// File extension without the dot, lowercase
    #[must_use]
    pub fn extension(&self) -> Option<String> {
        extension_of(&self.path)
    }
}

/// Line/column position in a note (both zero-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Position {
    pub line: usize,
    pub ch: usize,
}

/// Storage backend holding the notes
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Entry at `path`, or `None` if nothing exists there
    async fn stat(&self, path: &str) -> Result<Option<Entry>>;

    /// Full text of the file at `path`
    async fn read(&self, path: &str) -> Result<String>;

    /// Overwrite an existing file
    async fn write(&self, path: &str, content: &str) -> Result<()>;

    /// Create a new file; fails with `Error::AlreadyExists` if present
    async fn create(&self, path: &str, content: &str) -> Result<()>;

    /// Create a folder (and its parents); succeeds if it already exists
    async fn create_folder(&self, path: &str) -> Result<()>;

    /// Every visible file and folder in the vault, in no particular order
    async fn list_entries(&self) -> Result<Vec<Entry>>;
}

/// Normalize a vault-relative path
///
/// Strips surrounding slashes, `.` segments and empty segments. The empty
/// string denotes the vault root.
///
/// # Errors
///
/// Returns `Error::InvalidPath` for absolute paths or `..` segments
pub fn normalize_path(path: &str) -> Result<String> {
    let trimmed = path.trim();
    let bytes = trimmed.as_bytes();
    let drive = bytes.len() >= 2 && bytes[1] == b':' && bytes[0].is_ascii_alphabetic();
    if trimmed.starts_with('/') || trimmed.starts_with('\\') || drive {
        return Err(Error::InvalidPath(format!("absolute path not allowed: {path}")));
    }

    let mut segments = Vec::new();
    for segment in trimmed.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => return Err(Error::InvalidPath(format!("path escapes vault: {path}"))),
            other => segments.push(other),
        }
    }
    Ok(segments.join("/"))
}

/// Parent folder of a normalized path (`""` for top-level entries)
#[must_use]
pub fn parent_of(path: &str) -> &str {
    path.rfind('/').map_or("", |i| &path[..i])
}

/// Final path segment
#[must_use]
pub fn file_name(path: &str) -> &str {
    path.rfind('/').map_or(path, |i| &path[i + 1..])
}

/// File name without its extension
#[must_use]
pub fn basename(path: &str) -> &str {
    let name = file_name(path);
    match name.rfind('.') {
        Some(0) | None => name,
        Some(i) => &name[..i],
    }
}

/// Lowercase extension of a path
#[must_use]
pub fn extension_of(path: &str) -> Option<String> {
    let name = file_name(path);
    match name.rfind('.') {
        Some(0) | None => None,
        Some(i) => Some(name[i + 1..].to_ascii_lowercase()),
    }
}

/// Whether a path names a markdown note
#[must_use]
pub fn is_markdown(path: &str) -> bool {
    matches!(extension_of(path).as_deref(), Some("md" | "markdown"))
}

/// Whether `path` is `prefix` itself or lies beneath it
#[must_use]
pub fn is_under(path: &str, prefix: &str) -> bool {
    prefix.is_empty()
        || path == prefix
        || (path.starts_with(prefix) && path.as_bytes().get(prefix.len()) == Some(&b'/'))
}
