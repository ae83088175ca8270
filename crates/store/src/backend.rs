//! Storage backends for the shipment-status document.
//!
//! Mirrors the usual split: a file-backed store for deployment and an
//! in-memory store for tests. Both are whole-document read-modify-write;
//! there is no record-level locking, so concurrent writers race under
//! last-write-wins (documented limitation of this low-volume tool).

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use chrono::Utc;
use tracing::warn;

use crate::{ShipmentStatus, StatusDocument, StatusRecord, StatusStore, StoreError};

/// Configuration for selecting and building a status-store backend.
///
/// # Example
/// ```
/// use store::StoreConfig;
///
/// // In-memory (for testing)
/// let config = StoreConfig::in_memory();
///
/// // JSON file (deployment)
/// let config = StoreConfig::json_file("data/fulfillment-status.json");
/// ```
#[derive(Clone, Debug, Default)]
pub enum StoreConfig {
    /// Persist the document as a single JSON file at `path`. The file and
    /// its parent directory are created lazily on first write.
    JsonFile { path: PathBuf },
    /// Keep the document in memory. Useful for tests; nothing survives the
    /// process.
    #[default]
    InMemory,
}

impl StoreConfig {
    /// Create an in-memory backend configuration.
    pub fn in_memory() -> Self {
        StoreConfig::InMemory
    }

    /// Create a JSON-file backend configuration.
    pub fn json_file<P: Into<PathBuf>>(path: P) -> Self {
        StoreConfig::JsonFile { path: path.into() }
    }

    /// Build the backend described by this configuration.
    pub fn build(&self) -> Result<Box<dyn StatusStore>, StoreError> {
        match self {
            StoreConfig::InMemory => Ok(Box::new(InMemoryStore::new())),
            StoreConfig::JsonFile { path } => Ok(Box::new(JsonFileStore::new(path))),
        }
    }
}

/// File-backed store: one pretty-printed JSON document, read and written
/// whole.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_document(&self, document: &StatusDocument) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|source| StoreError::CreateDir {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        let encoded = serde_json::to_string_pretty(document)?;
        std::fs::write(&self.path, encoded).map_err(|source| StoreError::Write {
            path: self.path.clone(),
            source,
        })
    }
}

impl StatusStore for JsonFileStore {
    fn read_all(&self) -> Result<StatusDocument, StoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(data) => match serde_json::from_str(&data) {
                Ok(document) => Ok(document),
                Err(err) => {
                    warn!(
                        path = %self.path.display(),
                        error = %err,
                        "status_document_corrupt"
                    );
                    Ok(StatusDocument::empty())
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(StatusDocument::empty()),
            Err(err) => {
                warn!(
                    path = %self.path.display(),
                    error = %err,
                    "status_document_unreadable"
                );
                Ok(StatusDocument::empty())
            }
        }
    }

    fn mark_shipped(
        &self,
        parcel_id: &str,
        transaction_ids: &[String],
        tracking_number: Option<&str>,
    ) -> Result<(), StoreError> {
        let mut document = self.read_all()?;
        let now = Utc::now();

        document.parcels.insert(
            parcel_id.to_string(),
            StatusRecord {
                status: ShipmentStatus::Shipped,
                transaction_ids: transaction_ids.to_vec(),
                shipped_at: Some(now),
                tracking_number: tracking_number.map(str::to_string),
                updated_at: now,
            },
        );
        document.last_updated = now;

        self.write_document(&document)
    }
}

/// In-memory store backed by a `RwLock`.
pub struct InMemoryStore {
    document: RwLock<StatusDocument>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            document: RwLock::new(StatusDocument::empty()),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusStore for InMemoryStore {
    fn read_all(&self) -> Result<StatusDocument, StoreError> {
        let guard = self.document.read().map_err(|_| StoreError::Poisoned)?;
        Ok(guard.clone())
    }

    fn mark_shipped(
        &self,
        parcel_id: &str,
        transaction_ids: &[String],
        tracking_number: Option<&str>,
    ) -> Result<(), StoreError> {
        let mut guard = self.document.write().map_err(|_| StoreError::Poisoned)?;
        let now = Utc::now();

        guard.parcels.insert(
            parcel_id.to_string(),
            StatusRecord {
                status: ShipmentStatus::Shipped,
                transaction_ids: transaction_ids.to_vec(),
                shipped_at: Some(now),
                tracking_number: tracking_number.map(str::to_string),
                updated_at: now,
            },
        );
        guard.last_updated = now;
        Ok(())
    }
}
