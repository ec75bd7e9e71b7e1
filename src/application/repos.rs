//! Traits describing the collaborators a build talks to.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::blocks::Block;
use crate::domain::pages::{DocumentId, DocumentMetadata};

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("`{id}` was not found in the content source")]
    NotFound { id: String },
    #[error("failed to read `{path}`: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed content in `{path}`: {message}")]
    Malformed { path: String, message: String },
    #[error("block `{block_id}` is nested deeper than {max_depth} levels")]
    TooDeep { block_id: String, max_depth: usize },
}

impl SourceError {
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    pub fn malformed(path: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::Malformed {
            path: path.into(),
            message: message.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("failed to write `{target}`: {source}")]
    Io {
        target: String,
        #[source]
        source: std::io::Error,
    },
}

impl SinkError {
    pub fn io(target: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            target: target.into(),
            source,
        }
    }
}

/// Where blocks and page metadata come from.
///
/// `fetch_children` returns the complete child list of a parent, already
/// assembled across every page of the remote listing. Children of the
/// returned blocks are not populated.
#[async_trait]
pub trait ContentSource: Send + Sync {
    async fn fetch_children(&self, parent_id: &str) -> Result<Vec<Block>, SourceError>;

    async fn fetch_metadata(&self, document: &DocumentId)
    -> Result<DocumentMetadata, SourceError>;
}

/// Destination for finished pages.
#[async_trait]
pub trait OutputSink: Send + Sync {
    /// Write `html` under `filename`. Filenames carry no extension.
    async fn write(&self, filename: &str, html: &str) -> Result<(), SinkError>;
}
