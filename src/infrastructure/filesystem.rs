//! Local filesystem adapter for asset staging.

use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::domain::ports::AssetStore;

/// [`AssetStore`] over the local disk. Copies run on the blocking pool.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalAssetStore;

impl LocalAssetStore {
    pub fn new() -> Self {
        Self
    }

    fn copy_tree(source: &Path, destination: &Path) -> io::Result<u64> {
        let mut copied = 0;
        for entry in WalkDir::new(source).follow_links(true) {
            let entry = entry.map_err(io::Error::other)?;
            let relative = entry
                .path()
                .strip_prefix(source)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
            let target = destination.join(relative);

            if entry.file_type().is_dir() {
                std::fs::create_dir_all(&target)?;
            } else {
                if let Some(parent) = target.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::copy(entry.path(), &target)?;
                copied += 1;
            }
        }
        Ok(copied)
    }

    fn replace_blocking(source: &Path, destination: &Path) -> io::Result<()> {
        if destination.exists() {
            tracing::debug!(path = %destination.display(), "Removing previous staged assets");
            std::fs::remove_dir_all(destination)?;
        }
        let copied = Self::copy_tree(source, destination)?;
        tracing::info!(
            source = %source.display(),
            destination = %destination.display(),
            files = copied,
            "Staged assets"
        );
        Ok(())
    }
}

#[async_trait]
impl AssetStore for LocalAssetStore {
    async fn assets_exist(&self, path: &Path) -> bool {
        tokio::fs::metadata(path)
            .await
            .map(|meta| meta.is_dir())
            .unwrap_or(false)
    }

    async fn replace_directory(&self, source: &Path, destination: &Path) -> io::Result<()> {
        let source: PathBuf = source.to_path_buf();
        let destination: PathBuf = destination.to_path_buf();
        tokio::task::spawn_blocking(move || Self::replace_blocking(&source, &destination))
            .await
            .map_err(io::Error::other)?
    }
}
