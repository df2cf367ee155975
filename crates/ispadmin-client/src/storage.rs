//! File-backed session persistence.
//!
//! Keys and values live in a single JSON object on disk. Every write
//! replaces the file atomically, so a crash never leaves a half-written
//! session behind.

use std::collections::BTreeMap;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use ispadmin_core::error::{AdminError, AdminResult};
use ispadmin_core::repository::SessionPersistence;
use tempfile::NamedTempFile;
use tracing::debug;

#[derive(Debug)]
pub struct FileSessionPersistence {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileSessionPersistence {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> AdminResult<BTreeMap<String, String>> {
        match std::fs::read(&self.path) {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                AdminError::Persistence(format!("corrupt session file {}: {e}", self.path.display()))
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(persistence_err(e)),
        }
    }

    fn write_map(&self, map: &BTreeMap<String, String>) -> AdminResult<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let bytes = serde_json::to_vec(map).map_err(|e| AdminError::Persistence(e.to_string()))?;

        let mut tmp = NamedTempFile::new_in(dir).map_err(persistence_err)?;
        tmp.write_all(&bytes).map_err(persistence_err)?;
        tmp.persist(&self.path)
            .map_err(|e| persistence_err(e.error))?;
        Ok(())
    }

    fn locked<T>(&self, op: impl FnOnce() -> AdminResult<T>) -> AdminResult<T> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| AdminError::Persistence("session file lock poisoned".into()))?;
        op()
    }
}

fn persistence_err(e: std::io::Error) -> AdminError {
    AdminError::Persistence(e.to_string())
}

impl SessionPersistence for FileSessionPersistence {
    fn get(&self, key: &str) -> AdminResult<Option<String>> {
        self.locked(|| Ok(self.read_map()?.remove(key)))
    }

    fn set(&self, key: &str, value: &str) -> AdminResult<()> {
        self.locked(|| {
            let mut map = self.read_map()?;
            map.insert(key.to_string(), value.to_string());
            self.write_map(&map)
        })
    }

    fn clear(&self) -> AdminResult<()> {
        self.locked(|| match std::fs::remove_file(&self.path) {
            Ok(()) => {
                debug!(path = %self.path.display(), "Session file removed");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(persistence_err(e)),
        })
    }
}
