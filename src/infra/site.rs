//! Wires the filesystem adapters to a site build.

use std::path::Path;

use tracing::{info, warn};

use crate::application::build::{BuildError, BuildReport, SiteBuilder};
use crate::application::error::AppError;
use crate::application::render::BlockRenderer;
use crate::cache::{CacheFile, RenderCache};
use crate::config::Settings;
use crate::presentation::views::AskamaPageRenderer;

use super::error::InfraError;
use super::output::{ASSETS_DIR, FsOutputSink};
use super::snapshot::SnapshotSource;

const STYLESHEET: &str = "style.css";

/// Build every configured document from the snapshot directory into the
/// output directory, reading and updating the cache file when enabled.
pub async fn build_site(settings: &Settings) -> Result<BuildReport, AppError> {
    if settings.documents.is_empty() {
        return Err(BuildError::NoDocuments.into());
    }
    if !settings.source.snapshot_dir.is_dir() {
        return Err(InfraError::configuration(format!(
            "snapshot directory `{}` does not exist",
            settings.source.snapshot_dir.display()
        ))
        .into());
    }

    // Read before the output directory is cleaned: the cache file may live
    // inside it.
    let cache_file = CacheFile::new(&settings.cache.path);
    let mut cache = if settings.cache.enabled {
        cache_file.load().await
    } else {
        info!(target = "infra::site", "render cache disabled");
        RenderCache::new()
    };

    let source = SnapshotSource::new(&settings.source.snapshot_dir);
    let sink = FsOutputSink::new(&settings.output.directory);
    sink.prepare(settings.output.clean, settings.output.assets_dir.as_deref())
        .await
        .map_err(BuildError::from)?;

    let mut templates = AskamaPageRenderer::new(&settings.site.title);
    if settings
        .output
        .assets_dir
        .as_deref()
        .is_some_and(has_stylesheet)
    {
        templates = templates.with_stylesheet(format!("{ASSETS_DIR}/{STYLESHEET}"));
    }

    let renderer = BlockRenderer::new();
    let report = SiteBuilder::new(&source, &renderer, &templates, &sink)
        .with_naming(settings.output.naming)
        .build(&settings.documents, &mut cache)
        .await?;

    if settings.cache.enabled {
        let pruned = cache.prune(&settings.documents);
        match cache_file.save(&cache).await {
            Ok(()) => info!(
                target = "infra::site",
                path = %cache_file.path().display(),
                entries = cache.len(),
                pruned,
                "render cache saved"
            ),
            Err(err) => warn!(
                target = "infra::site",
                error = %err,
                "failed to save render cache; next build renders from scratch"
            ),
        }
    }

    info!(
        target = "infra::site",
        output = %sink.directory().display(),
        pages = report.pages.len(),
        rendered = report.rendered,
        reused = report.reused,
        failed = report.failures.len(),
        "site written"
    );
    Ok(report)
}

fn has_stylesheet(assets: &Path) -> bool {
    assets.join(STYLESHEET).is_file()
}
