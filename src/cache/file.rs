use super::ResultCache;
use crate::Result;
use async_trait::async_trait;
use std::fs;
use std::path::PathBuf;
use tracing::info;

/// One file per key under a root directory.
///
/// Keys arrive already filesystem-safe (values truncated, `/` replaced), so
/// the key is used as the file name directly.
pub struct FileCache {
    root: PathBuf,
}

impl FileCache {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }
}

#[async_trait]
impl ResultCache for FileCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path_for(key);
        if !path.is_file() {
            return Ok(None);
        }
        info!("Using cached file {}", path.display());
        Ok(Some(fs::read(&path)?))
    }

    async fn put(&self, key: &str, value: &[u8]) -> Result<()> {
        fs::write(self.path_for(key), value)?;
        Ok(())
    }
}
