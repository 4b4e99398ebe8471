//! Filesystem-backed vault

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use super::{ContentStore, Entry, EntryKind, normalize_path};
use crate::{Error, Result};

/// Vault rooted at a directory on disk
///
/// Dot-prefixed entries (`.obsidian`, `.git`, `.trash`) are invisible.
#[derive(Debug, Clone)]
pub struct FsVault {
    root: PathBuf,
}

impl FsVault {
    /// Open a vault at `root`
    ///
    /// # Errors
    ///
    /// Returns error if `root` is not an existing directory
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(Error::Config(format!(
                "vault root is not a directory: {}",
                root.display()
            )));
        }
        tracing::debug!(root = %root.display(), "opened vault");
        Ok(Self { root })
    }

    /// Vault root directory
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> Result<(String, PathBuf)> {
        let normalized = normalize_path(path)?;
        if normalized.split('/').any(|s| s.starts_with('.')) {
            return Err(Error::InvalidPath(format!("hidden path not accessible: {path}")));
        }
        let full = if normalized.is_empty() {
            self.root.clone()
        } else {
            self.root.join(&normalized)
        };
        Ok((normalized, full))
    }
}

fn map_io(path: &str, e: std::io::Error) -> Error {
    match e.kind() {
        ErrorKind::NotFound => Error::NotFound(path.to_string()),
        ErrorKind::AlreadyExists => Error::AlreadyExists(path.to_string()),
        _ => Error::Io(e),
    }
}

async fn count_children(dir: &Path) -> std::io::Result<usize> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut count = 0;
    while let Some(entry) = entries.next_entry().await? {
        if !entry.file_name().to_string_lossy().starts_with('.') {
            count += 1;
        }
    }
    Ok(count)
}

#[async_trait]
impl ContentStore for FsVault {
    async fn stat(&self, path: &str) -> Result<Option<Entry>> {
        let (normalized, full) = self.resolve(path)?;
        let metadata = match tokio::fs::metadata(&full).await {
            Ok(m) => m,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let entry = if metadata.is_dir() {
            Entry {
                path: normalized,
                kind: EntryKind::Folder,
                size: 0,
                children: count_children(&full).await?,
            }
        } else {
            Entry {
                path: normalized,
                kind: EntryKind::File,
                size: metadata.len(),
                children: 0,
            }
        };
        Ok(Some(entry))
    }

    async fn read(&self, path: &str) -> Result<String> {
        let (normalized, full) = self.resolve(path)?;
        let bytes = tokio::fs::read(&full)
            .await
            .map_err(|e| map_io(&normalized, e))?;
        Ok(String::from_utf8(bytes)
            .unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned()))
    }

    async fn write(&self, path: &str, content: &str) -> Result<()> {
        let (normalized, full) = self.resolve(path)?;
        if !tokio::fs::try_exists(&full).await? {
            return Err(Error::NotFound(normalized));
        }
        tokio::fs::write(&full, content)
            .await
            .map_err(|e| map_io(&normalized, e))?;
        tracing::debug!(path = %normalized, bytes = content.len(), "wrote note");
        Ok(())
    }

    async fn create(&self, path: &str, content: &str) -> Result<()> {
        let (normalized, full) = self.resolve(path)?;
        if normalized.is_empty() {
            return Err(Error::InvalidPath("cannot create the vault root".to_string()));
        }
        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&full)
            .await
            .map_err(|e| map_io(&normalized, e))?;
        file.write_all(content.as_bytes()).await?;
        file.flush().await?;
        tracing::debug!(path = %normalized, bytes = content.len(), "created note");
        Ok(())
    }

    async fn create_folder(&self, path: &str) -> Result<()> {
        let (_, full) = self.resolve(path)?;
        tokio::fs::create_dir_all(&full).await?;
        Ok(())
    }

    async fn list_entries(&self) -> Result<Vec<Entry>> {
        let mut out = Vec::new();
        let mut stack = vec![(String::new(), self.root.clone())];

        while let Some((prefix, dir)) = stack.pop() {
            let mut entries = tokio::fs::read_dir(&dir).await?;
            while let Some(entry) = entries.next_entry().await? {
                let name = entry.file_name().to_string_lossy().into_owned();
                if name.starts_with('.') {
                    continue;
                }
                let path = if prefix.is_empty() {
                    name
                } else {
                    format!("{prefix}/{name}")
                };

                let file_type = entry.file_type().await?;
                if file_type.is_dir() {
                    let full = entry.path();
                    out.push(Entry {
                        path: path.clone(),
                        kind: EntryKind::Folder,
                        size: 0,
                        children: count_children(&full).await?,
                    });
                    stack.push((path, full));
                } else if file_type.is_file() {
                    let size = entry.metadata().await.map(|m| m.len()).unwrap_or(0);
                    out.push(Entry {
                        path,
                        kind: EntryKind::File,
                        size,
                        children: 0,
                    });
                }
            }
        }

        Ok(out)
    }
}
