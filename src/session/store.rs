//! Local persistence for the session: the history slot and the last
//! shareable link.
//!
//! Both are best-effort caches. Reads never fail (missing or unreadable data
//! is treated as absent) and write failures are reported to the caller, which
//! logs them and carries on.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;

use super::history::TextPair;
use super::share::ShareLink;

/// History file name inside the data directory.
pub const HISTORY_FILE_NAME: &str = "promptHistory.json";

/// Last share link file name inside the data directory.
pub const LINK_FILE_NAME: &str = "current_link";

/// Local storage could not be written.
#[derive(Error, Debug)]
pub enum StorageError {
    /// IO error during file operations.
    #[error("storage unavailable: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization error.
    #[error("storage unavailable: {0}")]
    Json(#[from] serde_json::Error),

    /// In-memory store poisoned by a panicking writer.
    #[error("storage unavailable: lock poisoned")]
    Poisoned,
}

/// The single history slot.
pub trait HistoryStore: Send + Sync {
    /// Stored history, oldest first. Empty when absent or unreadable.
    fn load(&self) -> Vec<TextPair>;

    /// Overwrite the slot with `entries`.
    fn save(&self, entries: &[TextPair]) -> Result<(), StorageError>;
}

/// Where the current input/output are mirrored so a later load can restore
/// the same view.
pub trait AddressBar: Send + Sync {
    /// The current link, if one has been recorded.
    fn current(&self) -> Option<ShareLink>;

    /// Replace the current link without any other side effect.
    fn replace(&self, link: &ShareLink) -> Result<(), StorageError>;
}

/// History stored as a JSON array in one file.
#[derive(Debug, Clone)]
pub struct FileHistoryStore {
    path: PathBuf,
}

impl FileHistoryStore {
    /// Store history in `dir`/[`HISTORY_FILE_NAME`].
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::at(dir.as_ref().join(HISTORY_FILE_NAME))
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HistoryStore for FileHistoryStore {
    fn load(&self) -> Vec<TextPair> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Vec::new(),
            Err(err) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %err,
                    "history unreadable; starting empty"
                );
                return Vec::new();
            }
        };

        match serde_json::from_str(&content) {
            Ok(entries) => entries,
            Err(err) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %err,
                    "history corrupt; starting empty"
                );
                Vec::new()
            }
        }
    }

    fn save(&self, entries: &[TextPair]) -> Result<(), StorageError> {
        let json = serde_json::to_string_pretty(entries)?;
        write_atomic(&self.path, json.as_bytes())
    }
}

/// Share link stored as a single line in one file.
#[derive(Debug, Clone)]
pub struct FileAddressBar {
    path: PathBuf,
}

impl FileAddressBar {
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(LINK_FILE_NAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AddressBar for FileAddressBar {
    fn current(&self) -> Option<ShareLink> {
        let content = fs::read_to_string(&self.path).ok()?;
        ShareLink::parse(content.trim()).ok()
    }

    fn replace(&self, link: &ShareLink) -> Result<(), StorageError> {
        write_atomic(&self.path, link.as_str().as_bytes())
    }
}

/// Write to a temporary sibling and rename it into place.
fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let temp_path = path.with_file_name(format!("{}.tmp", file_name));

    let mut file = fs::File::create(&temp_path)?;
    file.write_all(contents)?;
    file.sync_all()?;
    fs::rename(&temp_path, path)?;

    Ok(())
}

/// History kept in memory.
#[derive(Debug, Default)]
pub struct MemoryHistoryStore {
    entries: Mutex<Vec<TextPair>>,
}

impl MemoryHistoryStore {
    pub fn with_entries(entries: Vec<TextPair>) -> Self {
        Self {
            entries: Mutex::new(entries),
        }
    }
}

impl HistoryStore for MemoryHistoryStore {
    fn load(&self) -> Vec<TextPair> {
        self.entries.lock().map(|e| e.clone()).unwrap_or_default()
    }

    fn save(&self, entries: &[TextPair]) -> Result<(), StorageError> {
        let mut stored = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        *stored = entries.to_vec();
        Ok(())
    }
}

/// Share link kept in memory.
#[derive(Debug, Default)]
pub struct MemoryAddressBar {
    link: Mutex<Option<ShareLink>>,
}

impl MemoryAddressBar {
    pub fn with_link(link: ShareLink) -> Self {
        Self {
            link: Mutex::new(Some(link)),
        }
    }
}

impl AddressBar for MemoryAddressBar {
    fn current(&self) -> Option<ShareLink> {
        self.link.lock().ok().and_then(|link| link.clone())
    }

    fn replace(&self, link: &ShareLink) -> Result<(), StorageError> {
        let mut current = self.link.lock().map_err(|_| StorageError::Poisoned)?;
        *current = Some(link.clone());
        Ok(())
    }
}
