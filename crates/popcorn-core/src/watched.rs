use anyhow::Result;
use popcorn_models::{WatchedEntry, WatchedSummary};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

/// Durable home for the serialized watched list
pub trait WatchedStorage: Send + Sync {
    /// Stored contents, or `None` if nothing was ever written
    fn read(&self) -> Result<Option<String>>;

    /// Replace the stored contents wholesale
    fn write(&self, contents: &str) -> Result<()>;

    /// Set aside contents that could not be decoded
    fn quarantine(&self) {}
}

/// Single JSON file on disk
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl WatchedStorage for JsonFileStorage {
    fn read(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }
        Ok(Some(std::fs::read_to_string(&self.path)?))
    }

    fn write(&self, contents: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        // Atomic write: write to temp file, then rename
        let temp_path = self.path.with_extension("json.tmp");
        std::fs::write(&temp_path, contents)?;
        std::fs::rename(&temp_path, &self.path)?;
        Ok(())
    }

    fn quarantine(&self) {
        let backup_path = self.path.with_extension("json.bak");
        match std::fs::copy(&self.path, &backup_path) {
            Ok(_) => info!("Backed up unreadable watched list to {:?}", backup_path),
            Err(e) => warn!("Failed to back up unreadable watched list: {}", e),
        }
    }
}

/// In-process storage; clones share the same contents
#[derive(Clone, Default)]
pub struct MemoryStorage {
    contents: Arc<Mutex<Option<String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contents(contents: &str) -> Self {
        Self {
            contents: Arc::new(Mutex::new(Some(contents.to_string()))),
        }
    }

    pub fn contents(&self) -> Option<String> {
        self.contents.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }
}

impl WatchedStorage for MemoryStorage {
    fn read(&self) -> Result<Option<String>> {
        Ok(self.contents())
    }

    fn write(&self, contents: &str) -> Result<()> {
        *self.contents.lock().unwrap_or_else(|p| p.into_inner()) = Some(contents.to_string());
        Ok(())
    }
}

/// The user's append-only watched list, mirrored to storage on every change
pub struct WatchedStore {
    storage: Box<dyn WatchedStorage>,
    entries: Vec<WatchedEntry>,
}

impl WatchedStore {
    /// Read the persisted list; anything unreadable degrades to an empty list
    pub fn load(storage: impl WatchedStorage + 'static) -> Self {
        let entries = match storage.read() {
            Ok(None) => {
                debug!("No watched list stored yet");
                Vec::new()
            }
            Ok(Some(content)) => match serde_json::from_str::<Vec<WatchedEntry>>(&content) {
                Ok(entries) => {
                    info!("Loaded watched list ({} entries)", entries.len());
                    entries
                }
                Err(e) => {
                    warn!("Watched list is corrupt ({}), starting with an empty list", e);
                    storage.quarantine();
                    Vec::new()
                }
            },
            Err(e) => {
                // Unreadable bytes get replaced by the next append
                warn!("Failed to read watched list ({}), starting with an empty list", e);
                storage.quarantine();
                Vec::new()
            }
        };

        Self {
            storage: Box::new(storage),
            entries,
        }
    }

    pub fn entries(&self) -> &[WatchedEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Add to the end and persist the whole list
    ///
    /// Duplicate ids are allowed. A failed write is logged; the entry stays
    /// in memory and the next successful write carries it.
    pub fn append(&mut self, entry: WatchedEntry) {
        info!(id = %entry.id, title = %entry.title, user_rating = entry.user_rating, "Adding to watched list");
        self.entries.push(entry);
        self.persist();
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.persist();
    }

    pub fn summary(&self) -> WatchedSummary {
        compute_averages(&self.entries)
    }

    fn persist(&self) {
        let content = match serde_json::to_string(&self.entries) {
            Ok(content) => content,
            Err(e) => {
                warn!("Failed to serialize watched list: {}", e);
                return;
            }
        };
        if let Err(e) = self.storage.write(&content) {
            warn!("Failed to persist watched list: {}", e);
        }
    }
}

/// Mean IMDb rating, user rating and runtime; all zero for an empty list
pub fn compute_averages(entries: &[WatchedEntry]) -> WatchedSummary {
    WatchedSummary::compute(entries)
}
