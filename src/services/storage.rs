use anyhow::{Context, Result};
use std::path::{Component, Path, PathBuf};

/// Subdirectory of the upload root holding codec output.
pub const PROCESSED_DIR: &str = "processed";

/// Local filesystem storage for originals and their derivatives.
///
/// Directories are created on demand by the write paths, never up front.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root: PathBuf,
    processed: PathBuf,
}

impl LocalStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let processed = root.join(PROCESSED_DIR);
        Self { root, processed }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn processed_dir(&self) -> &Path {
        &self.processed
    }

    /// Writes an original upload as `<root>/<file_name>`.
    pub async fn save_original(&self, file_name: &str, data: &[u8]) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .with_context(|| format!("Failed to create {}", self.root.display()))?;

        let path = self.root.join(file_name);
        tokio::fs::write(&path, data)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }

    /// Writes a derivative as `<root>/processed/<file_name>`.
    pub async fn save_processed(&self, file_name: &str, data: &[u8]) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.processed)
            .await
            .with_context(|| format!("Failed to create {}", self.processed.display()))?;

        let path = self.processed.join(file_name);
        tokio::fs::write(&path, data)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }

    /// Path of `path` relative to the root, always `/`-separated.
    ///
    /// This is the form handed back to clients and accepted by [`Self::resolve`].
    pub fn relative_path(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.root).ok()?;
        let parts: Vec<_> = relative
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part.to_string_lossy()),
                _ => None,
            })
            .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join("/"))
        }
    }

    /// Resolves a client supplied relative path against the root.
    ///
    /// The path is cleaned lexically first. Returns `None` when the result would
    /// escape the root, is absolute, or names the root itself.
    pub fn resolve(&self, requested: &str) -> Option<PathBuf> {
        let mut cleaned = PathBuf::new();

        for component in Path::new(requested).components() {
            match component {
                Component::Normal(part) => cleaned.push(part),
                Component::CurDir => {}
                Component::ParentDir => {
                    if !cleaned.pop() {
                        tracing::warn!("Path traversal attempt detected: {}", requested);
                        return None;
                    }
                }
                Component::RootDir | Component::Prefix(_) => return None,
            }
        }

        if cleaned.as_os_str().is_empty() {
            return None;
        }

        Some(self.root.join(cleaned))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_plain_paths() {
        let storage = LocalStorage::new("./uploads");
        assert_eq!(
            storage.resolve("processed/abc.png"),
            Some(PathBuf::from("./uploads/processed/abc.png"))
        );
        assert_eq!(
            storage.resolve("./processed/../abc.jpg"),
            Some(PathBuf::from("./uploads/abc.jpg"))
        );
    }

    #[test]
    fn test_resolve_rejects_traversal() {
        let storage = LocalStorage::new("./uploads");
        assert_eq!(storage.resolve("../../etc/passwd"), None);
        assert_eq!(storage.resolve("processed/../../secret"), None);
        assert_eq!(storage.resolve("/etc/passwd"), None);
        assert_eq!(storage.resolve("."), None);
        assert_eq!(storage.resolve(""), None);
    }

    #[test]
    fn test_relative_path() {
        let storage = LocalStorage::new("./uploads");
        let path = storage.processed_dir().join("abc.png");
        assert_eq!(
            storage.relative_path(&path).as_deref(),
            Some("processed/abc.png")
        );
        assert_eq!(storage.relative_path(Path::new("/elsewhere/abc.png")), None);
    }

    #[tokio::test]
    async fn test_saves_create_directories() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path().join("uploads"));

        let original = storage.save_original("a.png", b"orig").await.unwrap();
        let processed = storage.save_processed("b.png", b"out").await.unwrap();

        assert_eq!(tokio::fs::read(&original).await.unwrap(), b"orig");
        assert_eq!(tokio::fs::read(&processed).await.unwrap(), b"out");
        assert!(processed.starts_with(storage.processed_dir()));
    }
}
