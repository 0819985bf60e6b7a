//! Pluggable result cache for cacheable endpoint calls.
//!
//! Keys are built by the API client from the endpoint name and its
//! parameters; values are the JSON-serialized parse results. The cache is
//! not protected against concurrent writers racing on the same key.

pub mod file;
pub mod memory;

pub use file::FileCache;
pub use memory::MemoryCache;

use crate::Result;
use async_trait::async_trait;

#[async_trait]
pub trait ResultCache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;
    async fn put(&self, key: &str, value: &[u8]) -> Result<()>;
}
