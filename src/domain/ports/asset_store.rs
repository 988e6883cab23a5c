//! Filesystem port used by asset staging.

use async_trait::async_trait;
use std::path::Path;

#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Whether the build output directory exists.
    async fn assets_exist(&self, path: &Path) -> bool;

    /// Remove `destination` if present, then copy `source` into its place.
    async fn replace_directory(&self, source: &Path, destination: &Path) -> std::io::Result<()>;
}
