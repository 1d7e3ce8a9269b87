//! Session persistence as a JSON file.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::debug;

use crate::error::StoreError;
use crate::services::{SessionSnapshot, SessionStore};

pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl SessionStore for JsonFileStore {
    /// Replaces the file through a sibling temp file and a rename.
    fn save(&self, snapshot: &SessionSnapshot) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(snapshot)?;
        let temp = self.temp_path();

        fs::write(&temp, json)?;
        fs::rename(&temp, &self.path)?;

        debug!("Saved session to {}", self.path.display());
        Ok(())
    }

    fn load(&self) -> Result<Option<SessionSnapshot>, StoreError> {
        let json = match fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        Ok(Some(serde_json::from_str(&json)?))
    }
}
