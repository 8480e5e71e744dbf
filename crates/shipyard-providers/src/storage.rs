//! Filesystem-backed project storage.

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use shipyard_core::{Error, FileStorage, ProjectFilePath, Result};
use tokio::fs;
use tracing::info;

/// Stores project files under a root directory.
pub struct LocalFileStorage {
    /// Root directory to constrain file access (for sandboxing)
    root_dir: PathBuf,
}

impl LocalFileStorage {
    /// Create a new `LocalFileStorage` with the given root directory.
    ///
    /// All project paths will be resolved relative to this root directory.
    #[must_use]
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    /// Resolve a project path relative to the root directory.
    ///
    /// Paths are checked lexically since the file may not exist yet.
    ///
    /// # Errors
    /// Returns error if path is absolute or escapes the root directory
    fn resolve_path(&self, path: &ProjectFilePath) -> Result<PathBuf> {
        let key = path.to_string();
        let relative = Path::new(&key);

        let escapes = relative.components().any(|component| {
            matches!(
                component,
                Component::ParentDir | Component::RootDir | Component::Prefix(_)
            )
        });
        if escapes {
            return Err(Error::InvalidInput(format!(
                "Path '{key}' is outside the allowed directory"
            )));
        }

        Ok(self.root_dir.join(relative))
    }
}

#[async_trait]
impl FileStorage for LocalFileStorage {
    async fn write(&self, path: &ProjectFilePath, content: &str) -> Result<()> {
        let full_path = self.resolve_path(path)?;

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        fs::write(&full_path, content).await?;
        info!("Wrote {} bytes to {:?}", content.len(), full_path);
        Ok(())
    }

    async fn read(&self, path: &ProjectFilePath) -> Result<String> {
        let full_path = self.resolve_path(path)?;

        fs::read_to_string(&full_path).await.map_err(|err| {
            if err.kind() == ErrorKind::NotFound {
                Error::NotFound(path.to_string())
            } else {
                Error::Io(err)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn write_creates_parents_and_reads_back() {
        let dir = TempDir::new().unwrap();
        let storage = LocalFileStorage::new(dir.path());
        let path = ProjectFilePath::new("bakery", "src/components/Hero.jsx");

        storage.write(&path, "// hero section").await.unwrap();

        assert!(dir.path().join("bakery/src/components/Hero.jsx").is_file());
        assert_eq!(storage.read(&path).await.unwrap(), "// hero section");
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let storage = LocalFileStorage::new(dir.path());

        let err = storage
            .read(&ProjectFilePath::new("bakery", "absent.js"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(ref key) if key == "bakery/absent.js"));
    }

    #[tokio::test]
    async fn parent_traversal_rejected() {
        let dir = TempDir::new().unwrap();
        let storage = LocalFileStorage::new(dir.path().join("root"));

        let err = storage
            .write(&ProjectFilePath::new("bakery", "../../escape.txt"), "x")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert!(!dir.path().join("escape.txt").exists());
    }
}
