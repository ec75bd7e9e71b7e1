use askama::{Error as AskamaError, Template};
use thiserror::Error;

use crate::domain::pages::NavigationModel;
use crate::domain::toc::{TocEntry, TocEvent, build_toc, toc_events};

#[derive(Debug, Error)]
#[error("failed to render template `{template}`")]
pub struct TemplateRenderError {
    pub(crate) template: &'static str,
    #[source]
    pub(crate) error: AskamaError,
}

impl TemplateRenderError {
    pub fn new(template: &'static str, error: AskamaError) -> Self {
        Self { template, error }
    }
}

pub fn render_template<T: Template>(
    name: &'static str,
    template: T,
) -> Result<String, TemplateRenderError> {
    template
        .render()
        .map_err(|err| TemplateRenderError::new(name, err))
}

/// Everything the page layout needs for one output file.
#[derive(Debug, Clone, Copy)]
pub struct PageContext<'a> {
    pub title: &'a str,
    pub toc_html: &'a str,
    pub content_html: &'a str,
    pub navigation_html: &'a str,
}

/// Turns rendered content into complete HTML documents.
///
/// Content and partial HTML are inserted verbatim; only plain values such
/// as titles are escaped by the implementation.
pub trait PageTemplateRenderer: Send + Sync {
    fn render_toc(&self, entries: &[TocEntry]) -> Result<String, TemplateRenderError>;

    /// Navigation partial with the link to `current` (a filename) marked.
    fn render_navigation(
        &self,
        navigation: &NavigationModel,
        current: &str,
    ) -> Result<String, TemplateRenderError>;

    fn render_page(&self, page: PageContext<'_>) -> Result<String, TemplateRenderError>;
}

#[derive(Template)]
#[template(path = "partials/toc.html")]
pub struct TocTemplate {
    pub events: Vec<TocEvent>,
}

#[derive(Clone)]
pub struct NavigationLinkView {
    pub title: String,
    pub href: String,
    pub is_current: bool,
}

#[derive(Template)]
#[template(path = "partials/navigation.html")]
pub struct NavigationTemplate {
    pub links: Vec<NavigationLinkView>,
}

#[derive(Template)]
#[template(path = "page.html")]
pub struct PageTemplate<'a> {
    pub site_title: &'a str,
    pub title: &'a str,
    pub toc_html: &'a str,
    pub content_html: &'a str,
    pub navigation_html: &'a str,
    pub stylesheet: Option<&'a str>,
}

/// Askama-backed renderer using the compiled templates under `templates/`.
#[derive(Debug, Clone, Default)]
pub struct AskamaPageRenderer {
    site_title: String,
    stylesheet: Option<String>,
}

impl AskamaPageRenderer {
    pub fn new(site_title: impl Into<String>) -> Self {
        Self {
            site_title: site_title.into(),
            stylesheet: None,
        }
    }

    /// Link a stylesheet (relative to the output directory) from every page.
    pub fn with_stylesheet(mut self, href: impl Into<String>) -> Self {
        self.stylesheet = Some(href.into());
        self
    }
}

impl PageTemplateRenderer for AskamaPageRenderer {
    fn render_toc(&self, entries: &[TocEntry]) -> Result<String, TemplateRenderError> {
        let events = toc_events(&build_toc(entries));
        if events.is_empty() {
            return Ok(String::new());
        }
        render_template("partials/toc.html", TocTemplate { events })
    }

    fn render_navigation(
        &self,
        navigation: &NavigationModel,
        current: &str,
    ) -> Result<String, TemplateRenderError> {
        if navigation.is_empty() {
            return Ok(String::new());
        }

        let links = navigation
            .links()
            .iter()
            .map(|link| NavigationLinkView {
                title: link.title.clone(),
                href: link.href(),
                is_current: link.filename == current,
            })
            .collect();
        render_template("partials/navigation.html", NavigationTemplate { links })
    }

    fn render_page(&self, page: PageContext<'_>) -> Result<String, TemplateRenderError> {
        render_template(
            "page.html",
            PageTemplate {
                site_title: &self.site_title,
                title: page.title,
                toc_html: page.toc_html,
                content_html: page.content_html,
                navigation_html: page.navigation_html,
                stylesheet: self.stylesheet.as_deref(),
            },
        )
    }
}
