//! File storage backend.
//!
//! Attachment rows reference their bytes through `local://` URIs; the
//! storage trait resolves those URIs to disk paths and public URLs.

use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

/// File storage backend trait.
#[async_trait]
pub trait FileStorage: Send + Sync {
    /// Write data to storage at the given URI.
    async fn write(&self, uri: &str, data: &[u8]) -> Result<()>;

    /// Read data from storage at the given URI.
    async fn read(&self, uri: &str) -> Result<Vec<u8>>;

    /// Delete a file from storage.
    async fn delete(&self, uri: &str) -> Result<()>;

    /// Check if a file exists.
    async fn exists(&self, uri: &str) -> Result<bool>;

    /// Get the public URL for a file.
    fn public_url(&self, uri: &str) -> String;
}

/// Local filesystem storage.
pub struct LocalFileStorage {
    /// Base path for file storage.
    base_path: PathBuf,
    /// Base URL for public file access.
    base_url: String,
}

impl LocalFileStorage {
    /// Create a new local file storage.
    pub fn new(base_path: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            base_path: base_path.into(),
            base_url: base_url.into(),
        }
    }

    /// Parse a local:// URI to get the on-disk path.
    ///
    /// Rejects paths containing `..` components to prevent directory
    /// traversal.
    fn parse_uri(&self, uri: &str) -> Result<PathBuf> {
        let path = uri
            .strip_prefix("local://")
            .context("invalid local URI, must start with local://")?;
        for component in std::path::Path::new(path).components() {
            if matches!(component, std::path::Component::ParentDir) {
                anyhow::bail!("directory traversal not allowed in storage URI");
            }
        }
        Ok(self.base_path.join(path))
    }

    /// Generate a storage URI for a new file, partitioned by year/month
    /// and prefixed with a unique id to avoid collisions.
    pub fn generate_uri(&self, filename: &str) -> String {
        let now = chrono::Utc::now();
        let year = now.format("%Y");
        let month = now.format("%m");
        let unique_id = uuid::Uuid::now_v7().simple().to_string();
        let safe_filename = sanitize_filename(filename);

        format!(
            "local://{}/{}/{}_{}",
            year,
            month,
            &unique_id[..8],
            safe_filename
        )
    }
}

#[async_trait]
impl FileStorage for LocalFileStorage {
    async fn write(&self, uri: &str, data: &[u8]) -> Result<()> {
        let path = self.parse_uri(uri)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .context("failed to create directories")?;
        }

        let mut file = fs::File::create(&path)
            .await
            .context("failed to create file")?;

        file.write_all(data).await.context("failed to write file")?;
        file.flush().await.context("failed to flush file")?;

        debug!(uri = %uri, size = data.len(), "file written");
        Ok(())
    }

    async fn read(&self, uri: &str) -> Result<Vec<u8>> {
        let path = self.parse_uri(uri)?;
        let data = fs::read(&path).await.context("failed to read file")?;
        Ok(data)
    }

    async fn delete(&self, uri: &str) -> Result<()> {
        let path = self.parse_uri(uri)?;

        if path.exists() {
            fs::remove_file(&path)
                .await
                .context("failed to delete file")?;
            debug!(uri = %uri, "file deleted");
        } else {
            warn!(uri = %uri, "file not found for deletion");
        }

        Ok(())
    }

    async fn exists(&self, uri: &str) -> Result<bool> {
        let path = self.parse_uri(uri)?;
        Ok(path.exists())
    }

    fn public_url(&self, uri: &str) -> String {
        let path = uri.strip_prefix("local://").unwrap_or(uri);
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }
}

/// Replace characters that are unsafe in stored filenames.
pub fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn storage() -> LocalFileStorage {
        LocalFileStorage::new("/var/lib/atelier/uploads", "/files")
    }

    #[test]
    fn parse_uri_rejects_traversal() {
        let storage = storage();
        assert!(storage.parse_uri("local://2026/08/../../etc/passwd").is_err());
        assert!(storage.parse_uri("2026/08/file.pdf").is_err());
        assert!(storage.parse_uri("local://2026/08/file.pdf").is_ok());
    }

    #[test]
    fn generated_uris_are_partitioned_and_unique() {
        let storage = storage();
        let a = storage.generate_uri("fiche atelier.pdf");
        let b = storage.generate_uri("fiche atelier.pdf");

        assert!(a.starts_with("local://"));
        assert!(a.ends_with("_fiche_atelier.pdf"));
        assert_ne!(a, b);
    }

    #[test]
    fn public_url_strips_scheme() {
        let storage = storage();
        assert_eq!(
            storage.public_url("local://2026/08/ab_fiche.pdf"),
            "/files/2026/08/ab_fiche.pdf"
        );
    }

    #[test]
    fn sanitize_replaces_unsafe_characters() {
        assert_eq!(sanitize_filename("fiche atelier (v2).pdf"), "fiche_atelier__v2_.pdf");
        assert_eq!(sanitize_filename("ok-file_1.png"), "ok-file_1.png");
    }

    #[tokio::test]
    async fn write_read_delete_round_trip() {
        let dir = std::env::temp_dir().join(format!("atelier-test-{}", uuid::Uuid::now_v7()));
        let storage = LocalFileStorage::new(&dir, "/files");

        let uri = storage.generate_uri("notes.txt");
        storage.write(&uri, b"bonjour").await.unwrap();
        assert!(storage.exists(&uri).await.unwrap());
        assert_eq!(storage.read(&uri).await.unwrap(), b"bonjour");

        storage.delete(&uri).await.unwrap();
        assert!(!storage.exists(&uri).await.unwrap());

        tokio::fs::remove_dir_all(&dir).await.ok();
    }
}
