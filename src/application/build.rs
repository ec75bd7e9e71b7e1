//! Two-phase site assembly.
//!
//! Phase 1 walks the configured documents in order: it fetches metadata,
//! consults the cache, renders on a miss and writes a provisional page with
//! empty navigation. Phase 2 starts only once every document is settled; it
//! builds navigation from the successful pages and writes each page again in
//! its final form. No HTML is re-derived in phase 2.

use std::time::Instant;

use metrics::{counter, histogram};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::application::materialize::TreeMaterializer;
use crate::application::render::{RenderError, RenderService};
use crate::application::repos::{ContentSource, OutputSink, SinkError, SourceError};
use crate::cache::RenderCache;
use crate::domain::pages::{
    DocumentId, FilenameAllocator, NavigationModel, PageNaming, PageRecord,
};
use crate::presentation::views::{PageContext, PageTemplateRenderer, TemplateRenderError};

pub(crate) const METRIC_CACHE_HIT_TOTAL: &str = "blocksite_cache_hit_total";
pub(crate) const METRIC_CACHE_MISS_TOTAL: &str = "blocksite_cache_miss_total";
pub(crate) const METRIC_DOCUMENTS_FAILED_TOTAL: &str = "blocksite_documents_failed_total";
pub(crate) const METRIC_PAGES_WRITTEN_TOTAL: &str = "blocksite_pages_written_total";
pub(crate) const METRIC_RENDER_MS: &str = "blocksite_render_ms";

/// Why a single document was left out of a build.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Render(#[from] RenderError),
}

#[derive(Debug)]
pub struct DocumentFailure {
    pub document_id: DocumentId,
    pub error: DocumentError,
}

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("no documents configured")]
    NoDocuments,
    #[error("all {failed} documents failed to build")]
    AllDocumentsFailed { failed: usize },
    #[error(transparent)]
    Template(#[from] TemplateRenderError),
    #[error(transparent)]
    Sink(#[from] SinkError),
}

/// Outcome of a successful build.
#[derive(Debug)]
pub struct BuildReport {
    /// Pages in input order, as written in phase 2.
    pub pages: Vec<PageRecord>,
    pub rendered: usize,
    pub reused: usize,
    pub failures: Vec<DocumentFailure>,
}

impl BuildReport {
    pub fn navigation(&self) -> NavigationModel {
        NavigationModel::from_records(&self.pages)
    }
}

/// Drives a build against its collaborators.
pub struct SiteBuilder<'a> {
    source: &'a dyn ContentSource,
    renderer: &'a dyn RenderService,
    templates: &'a dyn PageTemplateRenderer,
    sink: &'a dyn OutputSink,
    naming: PageNaming,
}

impl<'a> SiteBuilder<'a> {
    pub fn new(
        source: &'a dyn ContentSource,
        renderer: &'a dyn RenderService,
        templates: &'a dyn PageTemplateRenderer,
        sink: &'a dyn OutputSink,
    ) -> Self {
        Self {
            source,
            renderer,
            templates,
            sink,
            naming: PageNaming::default(),
        }
    }

    pub fn with_naming(mut self, naming: PageNaming) -> Self {
        self.naming = naming;
        self
    }

    pub async fn build(
        &self,
        documents: &[DocumentId],
        cache: &mut RenderCache,
    ) -> Result<BuildReport, BuildError> {
        if documents.is_empty() {
            return Err(BuildError::NoDocuments);
        }

        let mut allocator = FilenameAllocator::new(self.naming);
        let mut pages = Vec::with_capacity(documents.len());
        let mut failures = Vec::new();
        let mut rendered = 0;
        let mut reused = 0;

        for (position, document) in documents.iter().enumerate() {
            match self
                .prepare_page(position, document, cache, &mut allocator)
                .await
            {
                Ok((page, was_cached)) => {
                    if was_cached {
                        reused += 1;
                    } else {
                        rendered += 1;
                    }
                    self.write_page(&page, &NavigationModel::default()).await?;
                    pages.push(page);
                }
                Err(error) => {
                    warn!(
                        target = "application::build",
                        document = %document,
                        error = %error,
                        "document excluded from build"
                    );
                    counter!(METRIC_DOCUMENTS_FAILED_TOTAL).increment(1);
                    failures.push(DocumentFailure {
                        document_id: document.clone(),
                        error,
                    });
                }
            }
        }

        if pages.is_empty() {
            return Err(BuildError::AllDocumentsFailed {
                failed: failures.len(),
            });
        }

        let navigation = NavigationModel::from_records(&pages);
        for page in &pages {
            self.write_page(page, &navigation).await?;
            counter!(METRIC_PAGES_WRITTEN_TOTAL).increment(1);
        }

        info!(
            target = "application::build",
            pages = pages.len(),
            rendered,
            reused,
            failed = failures.len(),
            "site build complete"
        );

        Ok(BuildReport {
            pages,
            rendered,
            reused,
            failures,
        })
    }

    /// Phase 1 for one document. Returns the page and whether it came from
    /// the cache.
    async fn prepare_page(
        &self,
        position: usize,
        document: &DocumentId,
        cache: &mut RenderCache,
        allocator: &mut FilenameAllocator,
    ) -> Result<(PageRecord, bool), DocumentError> {
        let metadata = self.source.fetch_metadata(document).await?;

        let cached = cache
            .should_skip(document, &metadata.last_modified)
            .then(|| cache.lookup(document))
            .flatten();
        if let Some(cached) = cached {
            debug!(
                target = "application::build",
                document = %document,
                "last-modified unchanged; reusing cached page"
            );
            counter!(METRIC_CACHE_HIT_TOTAL).increment(1);
            let mut page = cached.clone();
            page.filename = allocator.filename_for(position, &page.title);
            return Ok((page, true));
        }
        counter!(METRIC_CACHE_MISS_TOTAL).increment(1);

        let blocks = TreeMaterializer::new(self.source)
            .materialize(document.as_str())
            .await?;

        let started_at = Instant::now();
        let result = self.renderer.render(&blocks)?;
        histogram!(METRIC_RENDER_MS).record(started_at.elapsed().as_secs_f64() * 1000.0);

        // Failed documents never reserve a filename.
        let filename = allocator.filename_for(position, &metadata.title);
        let page = PageRecord {
            document_id: document.clone(),
            title: metadata.title,
            filename,
            last_modified: metadata.last_modified,
            html: result.to_html(),
            toc: result.toc_entries,
        };
        cache.store(page.clone());

        debug!(
            target = "application::build",
            document = %document,
            filename = %page.filename,
            headings = page.toc.len(),
            "document rendered"
        );

        Ok((page, false))
    }

    async fn write_page(
        &self,
        page: &PageRecord,
        navigation: &NavigationModel,
    ) -> Result<(), BuildError> {
        let toc_html = self.templates.render_toc(&page.toc)?;
        let navigation_html = self.templates.render_navigation(navigation, &page.filename)?;
        let html = self.templates.render_page(PageContext {
            title: &page.title,
            toc_html: &toc_html,
            content_html: &page.html,
            navigation_html: &navigation_html,
        })?;

        self.sink.write(&page.filename, &html).await?;
        Ok(())
    }
}
