//! Durable storage for the local cart.
//!
//! The whole line sequence lives in one named slot and is rewritten after
//! every mutation. [`CartStorage`] is the seam the store is built against;
//! [`JsonFileStorage`] is the on-disk slot and [`MemoryStorage`] keeps the
//! slot in process for tests and throwaway carts.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use shopfront_core::LineItem;
use thiserror::Error;
use tracing::debug;

use crate::config::CartStorageConfig;

/// Errors raised by a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the slot failed.
    #[error("Storage I/O error: {0}")]
    Io(#[from] io::Error),

    /// The slot contents could not be encoded or decoded.
    #[error("Storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The backend refused the operation (disabled, quota exceeded).
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Load/save interface for the persisted cart slot.
pub trait CartStorage {
    /// Read the persisted lines. `Ok(None)` means nothing has been saved yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the slot exists but cannot be read or decoded.
    fn load(&self) -> Result<Option<Vec<LineItem>>, StorageError>;

    /// Replace the persisted lines.
    ///
    /// # Errors
    ///
    /// Returns an error if the slot cannot be written.
    fn save(&self, items: &[LineItem]) -> Result<(), StorageError>;
}

impl<T: CartStorage + ?Sized> CartStorage for &T {
    fn load(&self) -> Result<Option<Vec<LineItem>>, StorageError> {
        (**self).load()
    }

    fn save(&self, items: &[LineItem]) -> Result<(), StorageError> {
        (**self).save(items)
    }
}

// =============================================================================
// JsonFileStorage
// =============================================================================

/// A slot stored as `<dir>/<slot>.json`.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    /// Storage for `slot` inside `dir`. Nothing touches the disk until the
    /// first load or save.
    #[must_use]
    pub fn new(dir: impl AsRef<Path>, slot: &str) -> Self {
        Self {
            path: dir.as_ref().join(format!("{slot}.json")),
        }
    }

    /// Storage described by a [`CartStorageConfig`].
    #[must_use]
    pub fn from_config(config: &CartStorageConfig) -> Self {
        Self::new(&config.dir, &config.slot)
    }

    /// Path of the slot file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CartStorage for JsonFileStorage {
    fn load(&self) -> Result<Option<Vec<LineItem>>, StorageError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No persisted cart");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };
        let items = serde_json::from_slice(&bytes)?;
        Ok(Some(items))
    }

    fn save(&self, items: &[LineItem]) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let body = serde_json::to_vec_pretty(items)?;

        // Write then rename so readers never see a partial slot
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, body)?;
        fs::rename(&tmp, &self.path)?;

        debug!(path = %self.path.display(), lines = items.len(), "Persisted cart");
        Ok(())
    }
}

// =============================================================================
// MemoryStorage
// =============================================================================

/// In-process slot.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    slot: Mutex<Option<Vec<LineItem>>>,
    unavailable: Mutex<bool>,
}

impl MemoryStorage {
    /// An empty slot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A slot pre-filled with `items`, as if saved by an earlier run.
    #[must_use]
    pub fn with_items(items: Vec<LineItem>) -> Self {
        Self {
            slot: Mutex::new(Some(items)),
            unavailable: Mutex::new(false),
        }
    }

    /// Make every subsequent load and save fail with [`StorageError::Unavailable`].
    pub fn set_unavailable(&self, unavailable: bool) {
        *self.unavailable.lock().unwrap_or_else(PoisonError::into_inner) = unavailable;
    }

    /// The currently persisted lines, bypassing the unavailable flag.
    #[must_use]
    pub fn snapshot(&self) -> Option<Vec<LineItem>> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn check_available(&self) -> Result<(), StorageError> {
        if *self.unavailable.lock().unwrap_or_else(PoisonError::into_inner) {
            return Err(StorageError::Unavailable(
                "memory storage disabled".to_string(),
            ));
        }
        Ok(())
    }
}

impl CartStorage for MemoryStorage {
    fn load(&self) -> Result<Option<Vec<LineItem>>, StorageError> {
        self.check_available()?;
        Ok(self.snapshot())
    }

    fn save(&self, items: &[LineItem]) -> Result<(), StorageError> {
        self.check_available()?;
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(items.to_vec());
        Ok(())
    }
}
