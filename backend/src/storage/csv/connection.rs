//! File-system connection shared by all repositories.
//!
//! Each property gets its own directory under the base data directory:
//!
//! ```text
//! data/
//! └── {property_id}/
//!     ├── property.yaml
//!     ├── units.yaml
//!     ├── tenants.yaml
//!     ├── tenancies.csv
//!     ├── billing_cycles.csv
//!     ├── service_rules.yaml
//!     └── expenses.csv
//! ```

use anyhow::Result;
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

/// Manages file paths for property-scoped storage and serializes
/// read-modify-write sequences through a single write lock.
#[derive(Clone)]
pub struct CsvConnection {
    base_directory: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl CsvConnection {
    /// Create a new connection rooted at `base_directory`, creating the
    /// directory if needed.
    pub fn new<P: AsRef<Path>>(base_directory: P) -> Result<Self> {
        let base_path = base_directory.as_ref().to_path_buf();

        if !base_path.exists() {
            fs::create_dir_all(&base_path)?;
        }

        Ok(Self {
            base_directory: base_path,
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    pub fn base_directory(&self) -> &Path {
        &self.base_directory
    }

    /// Serialize a read-modify-write sequence. Repositories hold this
    /// guard across their constraint re-checks and the following write.
    pub fn write_lock(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().unwrap()
    }

    pub fn property_directory(&self, property_id: &str) -> PathBuf {
        self.base_directory.join(property_id)
    }

    /// Ensure the property's directory exists and return it.
    pub fn ensure_property_directory(&self, property_id: &str) -> Result<PathBuf> {
        let dir = self.property_directory(property_id);
        if !dir.exists() {
            fs::create_dir_all(&dir)?;
            debug!("Created property directory {:?}", dir);
        }
        Ok(dir)
    }

    pub fn property_file(&self, property_id: &str, file_name: &str) -> PathBuf {
        self.property_directory(property_id).join(file_name)
    }

    /// IDs of all property directories currently on disk.
    pub fn list_property_directories(&self) -> Result<Vec<String>> {
        if !self.base_directory.exists() {
            return Ok(Vec::new());
        }

        let mut ids = Vec::new();
        for entry in fs::read_dir(&self.base_directory)? {
            let entry = entry?;
            if !entry.path().is_dir() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                ids.push(name.to_string());
            }
        }
        ids.sort();
        Ok(ids)
    }

    /// Write a whole document with the temp-file-then-rename pattern so
    /// readers never observe a partially written file.
    pub fn write_atomic(&self, path: &Path, content: &str) -> Result<()> {
        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, content)?;
        fs::rename(&temp_path, path)?;
        Ok(())
    }
}
