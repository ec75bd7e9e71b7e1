//! Filesystem output for finished pages.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::application::repos::{OutputSink, SinkError};

/// Name of the directory, inside the output directory, that receives assets.
pub const ASSETS_DIR: &str = "assets";

/// Writes `<directory>/<filename>.html`.
#[derive(Debug, Clone)]
pub struct FsOutputSink {
    directory: PathBuf,
}

impl FsOutputSink {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn page_path(&self, filename: &str) -> PathBuf {
        self.directory.join(format!("{filename}.html"))
    }

    /// Create the output directory, optionally emptying it first, and copy
    /// `assets` (when given) to `<directory>/assets`. Returns the number of
    /// asset files copied.
    pub async fn prepare(&self, clean: bool, assets: Option<&Path>) -> Result<usize, SinkError> {
        if clean && fs::try_exists(&self.directory).await.unwrap_or(false) {
            fs::remove_dir_all(&self.directory)
                .await
                .map_err(|err| SinkError::io(self.directory.display().to_string(), err))?;
            debug!(
                target = "infra::output",
                directory = %self.directory.display(),
                "output directory cleaned"
            );
        }

        fs::create_dir_all(&self.directory)
            .await
            .map_err(|err| SinkError::io(self.directory.display().to_string(), err))?;

        let Some(assets) = assets else {
            return Ok(0);
        };
        let copied = copy_dir(assets, &self.directory.join(ASSETS_DIR)).await?;
        info!(
            target = "infra::output",
            source = %assets.display(),
            files = copied,
            "assets copied"
        );
        Ok(copied)
    }
}

#[async_trait]
impl OutputSink for FsOutputSink {
    async fn write(&self, filename: &str, html: &str) -> Result<(), SinkError> {
        let path = self.page_path(filename);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|err| SinkError::io(parent.display().to_string(), err))?;
        }
        fs::write(&path, html)
            .await
            .map_err(|err| SinkError::io(path.display().to_string(), err))?;

        debug!(
            target = "infra::output",
            path = %path.display(),
            bytes = html.len(),
            "page written"
        );
        Ok(())
    }
}

async fn copy_dir(src: &Path, dest: &Path) -> Result<usize, SinkError> {
    let mut copied = 0;

    for entry in WalkDir::new(src).sort_by_file_name() {
        let entry = entry.map_err(|err| {
            let target = err
                .path()
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| src.display().to_string());
            SinkError::io(target, std::io::Error::other(err.to_string()))
        })?;

        let relative = entry
            .path()
            .strip_prefix(src)
            .map_err(|err| {
                SinkError::io(
                    entry.path().display().to_string(),
                    std::io::Error::other(err.to_string()),
                )
            })?;
        let target = dest.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)
                .await
                .map_err(|err| SinkError::io(target.display().to_string(), err))?;
        } else if entry.file_type().is_file() {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)
                    .await
                    .map_err(|err| SinkError::io(parent.display().to_string(), err))?;
            }
            fs::copy(entry.path(), &target)
                .await
                .map_err(|err| SinkError::io(target.display().to_string(), err))?;
            copied += 1;
        }
    }

    Ok(copied)
}
