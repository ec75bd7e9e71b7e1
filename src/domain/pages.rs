//! Pages produced by a build and the navigation that links them.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::slug::generate_unique_slug;
use super::toc::TocEntry;

/// Title used when the source has none.
pub const UNTITLED: &str = "Untitled";

/// Identifier of a source document as understood by the content source.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Metadata fetched before any content, used for cache validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocumentMetadata {
    pub title: String,
    /// Opaque server-supplied stamp; only equality is meaningful.
    pub last_modified: String,
}

impl DocumentMetadata {
    pub fn new(title: Option<String>, last_modified: impl Into<String>) -> Self {
        let title = title
            .map(|title| title.trim().to_string())
            .filter(|title| !title.is_empty())
            .unwrap_or_else(|| UNTITLED.to_string());
        Self {
            title,
            last_modified: last_modified.into(),
        }
    }
}

/// Rendered content plus metadata for one source document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRecord {
    pub document_id: DocumentId,
    pub title: String,
    pub filename: String,
    pub last_modified: String,
    pub html: String,
    pub toc: Vec<TocEntry>,
}

/// How output filenames are derived for the pages of a run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PageNaming {
    /// `index` for the first input document, `page_<n>` for the n-th.
    #[default]
    Positional,
    /// Slug of the page title, suffixed on collision.
    Title,
}

/// Hands out filenames for one run. Positional names depend only on the
/// input position, so a document keeps its filename when others fail.
#[derive(Debug)]
pub struct FilenameAllocator {
    naming: PageNaming,
    issued: HashSet<String>,
}

impl FilenameAllocator {
    pub fn new(naming: PageNaming) -> Self {
        Self {
            naming,
            issued: HashSet::new(),
        }
    }

    pub fn filename_for(&mut self, position: usize, title: &str) -> String {
        let candidate = match self.naming {
            PageNaming::Positional => positional_filename(position),
            PageNaming::Title => {
                let issued = &self.issued;
                generate_unique_slug(title, |candidate| !issued.contains(candidate))
                    .unwrap_or_else(|_| positional_filename(position))
            }
        };
        self.issued.insert(candidate.clone());
        candidate
    }
}

fn positional_filename(position: usize) -> String {
    if position == 0 {
        "index".to_string()
    } else {
        format!("page_{}", position + 1)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NavLink {
    pub title: String,
    pub filename: String,
}

impl NavLink {
    pub fn href(&self) -> String {
        format!("{}.html", self.filename)
    }
}

/// Ordered links to every page of a run, in input order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NavigationModel {
    links: Vec<NavLink>,
}

impl NavigationModel {
    pub fn from_records(records: &[PageRecord]) -> Self {
        let links = records
            .iter()
            .map(|record| NavLink {
                title: record.title.clone(),
                filename: record.filename.clone(),
            })
            .collect();
        Self { links }
    }

    pub fn links(&self) -> &[NavLink] {
        &self.links
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}
