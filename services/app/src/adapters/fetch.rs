//! services/app/src/adapters/fetch.rs
//!
//! Downloads a derived asset image to disk. When the fetch-and-save path
//! fails the caller falls back to surfacing the raw URL for direct opening.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::AppError;

#[derive(Clone, Default)]
pub struct AssetFetcher {
    http: reqwest::Client,
}

impl AssetFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetches `url` and writes the bytes to `dir/file_name`.
    pub async fn download_to(
        &self,
        url: &str,
        dir: &Path,
        file_name: &str,
    ) -> Result<PathBuf, AppError> {
        let bytes = self
            .http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;

        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(file_name);
        tokio::fs::write(&path, &bytes).await?;
        info!(path = %path.display(), "asset downloaded");
        Ok(path)
    }
}
