use anyhow::{Result, bail};
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

/// Local-disk object storage behind `storage.upload`.
///
/// Objects live at `{dir}/{path}` and are served back under
/// `{public_base}/files/{path}`.
pub struct Storage {
    dir: PathBuf,
    public_base: String,
}

impl Storage {
    pub async fn new(dir: PathBuf, public_base: impl Into<String>) -> Result<Self> {
        fs::create_dir_all(&dir).await?;
        info!("Object storage directory: {}", dir.display());
        Ok(Self {
            dir,
            public_base: public_base.into().trim_end_matches('/').to_string(),
        })
    }

    /// Resolve an object path inside the storage root, rejecting anything
    /// that could escape it.
    pub fn object_path(&self, path: &str) -> Result<PathBuf> {
        let relative = Path::new(path);
        if path.is_empty()
            || relative
                .components()
                .any(|c| !matches!(c, Component::Normal(_)))
        {
            bail!("Invalid object path '{}'", path);
        }
        Ok(self.dir.join(relative))
    }

    pub fn public_url(&self, path: &str) -> String {
        format!("{}/files/{}", self.public_base, path)
    }

    /// Store `bytes` at `path` and return its public URL. Without `upsert`,
    /// an existing object is an error.
    pub async fn put(&self, path: &str, bytes: &[u8], upsert: bool) -> Result<String> {
        let target = self.object_path(path)?;

        if !upsert && fs::try_exists(&target).await? {
            bail!("Object '{}' already exists", path);
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).await?;
        }

        let mut file = fs::File::create(&target).await?;
        file.write_all(bytes).await?;
        file.flush().await?;

        info!("Stored object {} ({} bytes)", path, bytes.len());
        Ok(self.public_url(path))
    }

    pub async fn read(&self, path: &str) -> Result<Vec<u8>> {
        let target = self.object_path(path)?;
        Ok(fs::read(&target).await?)
    }

    pub async fn delete(&self, path: &str) -> Result<()> {
        let target = self.object_path(path)?;
        match fs::remove_file(&target).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("Object {} already gone", path);
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn scratch(name: &str) -> Storage {
        let dir = std::env::temp_dir().join(format!("autsai_storage_test_{}_{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir).await;
        Storage::new(dir, "http://localhost:3000/").await.unwrap()
    }

    #[tokio::test]
    async fn put_returns_public_url_and_round_trips() {
        let storage = scratch("put").await;
        let url = storage
            .put("facilities/fac_001/court.jpg", b"jpeg bytes", true)
            .await
            .unwrap();

        assert_eq!(url, "http://localhost:3000/files/facilities/fac_001/court.jpg");
        assert_eq!(storage.read("facilities/fac_001/court.jpg").await.unwrap(), b"jpeg bytes");
    }

    #[tokio::test]
    async fn upsert_controls_overwrite() {
        let storage = scratch("upsert").await;
        storage.put("a.txt", b"one", false).await.unwrap();

        assert!(storage.put("a.txt", b"two", false).await.is_err());
        storage.put("a.txt", b"two", true).await.unwrap();
        assert_eq!(storage.read("a.txt").await.unwrap(), b"two");

        storage.delete("a.txt").await.unwrap();
        storage.delete("a.txt").await.unwrap();
    }

    #[tokio::test]
    async fn traversal_is_rejected() {
        let storage = scratch("traversal").await;
        assert!(storage.object_path("../etc/passwd").is_err());
        assert!(storage.object_path("/etc/passwd").is_err());
        assert!(storage.object_path("").is_err());
        assert!(storage.object_path("facilities/x/y.png").is_ok());
    }
}
