//! Settings persistence.
//!
//! The record is stored as a small JSON document carrying a format version
//! and a crc32c checksum over the serialized settings. A missing or
//! invalid file is replaced with defaults; the store remembers that as its
//! sticky last error so the application can surface it.

use crate::error::StoreError;
use crate::settings::Settings;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Format version written into every record.
const FORMAT_VERSION: u32 = 1;

/// Settings record as stored on disk.
#[derive(Debug, Serialize, Deserialize)]
struct StoredRecord {
    version: u32,
    settings: Settings,
    checksum: String,
}

/// File-backed settings store owning the working copy of the record.
pub struct SettingsStore {
    path: PathBuf,
    settings: Settings,
    last_error: Option<StoreError>,
}

impl SettingsStore {
    /// Creates a store for the given file path with default settings.
    /// Call [`SettingsStore::load`] to pick up a persisted record.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            settings: Settings::default(),
            last_error: None,
        }
    }

    /// Loads the persisted record.
    ///
    /// Returns `Ok(true)` when a valid record was read. A missing file, a
    /// version mismatch, or a checksum failure falls back to defaults,
    /// rewrites the file, records [`StoreError::InvalidRecord`] as the
    /// sticky error, and returns `Ok(false)`. Only an unwritable defaults
    /// file is an `Err`.
    pub fn load(&mut self) -> Result<bool, StoreError> {
        match self.try_read() {
            Ok(settings) => {
                self.settings = settings;
                tracing::info!(path = %self.path.display(), "settings loaded");
                Ok(true)
            }
            Err(err) => {
                tracing::warn!(
                    path = %self.path.display(),
                    %err,
                    "settings record not usable, writing defaults"
                );
                self.settings = Settings::default();
                self.write_record()?;
                self.last_error = Some(StoreError::InvalidRecord);
                Ok(false)
            }
        }
    }

    fn try_read(&self) -> Result<Settings, StoreError> {
        let data = fs::read(&self.path)?;
        let record: StoredRecord = serde_json::from_slice(&data)?;

        if record.version != FORMAT_VERSION {
            return Err(StoreError::InvalidRecord);
        }
        let payload = serde_json::to_vec(&record.settings)?;
        let checksum = format!("{:08x}", crc32c::crc32c(&payload));
        if checksum != record.checksum {
            return Err(StoreError::InvalidRecord);
        }

        Ok(record.settings)
    }

    /// Persists the working copy.
    pub fn save(&mut self) -> Result<(), StoreError> {
        match self.write_record() {
            Ok(()) => {
                tracing::info!(path = %self.path.display(), "settings saved");
                Ok(())
            }
            Err(err) => {
                self.last_error = Some(err.clone());
                Err(err)
            }
        }
    }

    fn write_record(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let payload = serde_json::to_vec(&self.settings)?;
        let record = StoredRecord {
            version: FORMAT_VERSION,
            settings: self.settings.clone(),
            checksum: format!("{:08x}", crc32c::crc32c(&payload)),
        };

        let data = serde_json::to_vec_pretty(&record)?;
        let mut file = File::create(&self.path)?;
        file.write_all(&data)?;
        file.sync_all()?;
        Ok(())
    }

    /// Restores factory defaults and persists them.
    pub fn reset_defaults(&mut self) -> Result<(), StoreError> {
        self.settings = Settings::default();
        tracing::info!("settings reset to defaults");
        self.save()
    }

    /// The working copy of the record.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Mutable access to the working copy; changes are not persisted
    /// until [`SettingsStore::save`].
    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    /// The sticky last error, if any.
    pub fn last_error(&self) -> Option<&StoreError> {
        self.last_error.as_ref()
    }

    /// Clears the sticky last error.
    pub fn clear_error(&mut self) {
        self.last_error = None;
    }
}
