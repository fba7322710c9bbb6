use std::path::{Path, PathBuf};

use anyhow::Result;
use uuid::Uuid;

/// Local-disk file store for menu item images. Names are generated on save
/// so clients can never address a path outside the root.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub async fn ensure_root(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.root).await?;
        Ok(())
    }

    /// Writes the bytes under a generated name and returns the public URL path.
    pub async fn save(&self, original_name: &str, bytes: &[u8]) -> Result<String> {
        let ext = Path::new(original_name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("bin");
        let filename = format!("{}.{}", Uuid::new_v4(), ext);
        tokio::fs::write(self.root.join(&filename), bytes).await?;
        Ok(format!("/uploads/{filename}"))
    }

    pub async fn delete(&self, filename: &str) -> Result<bool> {
        let Some(path) = self.resolve(filename) else {
            return Ok(false);
        };
        match tokio::fs::remove_file(path).await {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    /// Deletes the file behind an `/uploads/...` URL, ignoring foreign URLs.
    pub async fn delete_url(&self, image_url: &str) -> Result<bool> {
        match image_url.strip_prefix("/uploads/") {
            Some(filename) => self.delete(filename).await,
            None => Ok(false),
        }
    }

    fn resolve(&self, filename: &str) -> Option<PathBuf> {
        // Reject anything that is not a bare file name.
        if filename.contains('/') || filename.contains('\\') || filename.contains("..") {
            return None;
        }
        Some(self.root.join(filename))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_rejects_path_traversal() {
        let store = FileStore::new("uploads");
        assert!(store.resolve("../etc/passwd").is_none());
        assert!(store.resolve("a/b.png").is_none());
        assert!(store.resolve("image.png").is_some());
    }
}
