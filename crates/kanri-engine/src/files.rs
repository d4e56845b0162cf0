use std::path::PathBuf;

use crate::EngineError;

/// Attachment blob storage. The engine is indifferent to the backend:
/// local disk in development, object storage in production.
pub trait FileStorage: Send + Sync {
    /// Persist the bytes under `folder/name` and return the stored path.
    fn store(&self, bytes: &[u8], folder: &str, name: &str) -> Result<String, EngineError>;

    /// Remove a previously stored blob. Returns whether it existed.
    fn delete(&self, path: &str) -> Result<bool, EngineError>;
}

pub struct LocalFileStorage {
    root: PathBuf,
}

impl LocalFileStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl FileStorage for LocalFileStorage {
    fn store(&self, bytes: &[u8], folder: &str, name: &str) -> Result<String, EngineError> {
        let dir = self.root.join(folder);
        std::fs::create_dir_all(&dir).map_err(|e| EngineError::Upload(e.to_string()))?;
        let path = dir.join(name);
        std::fs::write(&path, bytes).map_err(|e| EngineError::Upload(e.to_string()))?;
        Ok(path.to_string_lossy().into_owned())
    }

    fn delete(&self, path: &str) -> Result<bool, EngineError> {
        let path = std::path::Path::new(path);
        if !path.exists() {
            return Ok(false);
        }
        std::fs::remove_file(path).map_err(|e| EngineError::Upload(e.to_string()))?;
        Ok(true)
    }
}
