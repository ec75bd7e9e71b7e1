use thiserror::Error;

use crate::{
    application::build::BuildError, cache::CacheError, config::LoadError,
    infra::error::InfraError,
};

/// Errors surfaced at the binary boundary.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Build(#[from] BuildError),
    #[error(transparent)]
    Cache(#[from] CacheError),
    #[error("failed to load configuration: {0}")]
    Config(#[from] LoadError),
    #[error(transparent)]
    Infra(#[from] InfraError),
}

impl AppError {
    /// Messages for this error and every source beneath it, outermost first.
    pub fn chain(&self) -> Vec<String> {
        let mut messages = vec![self.to_string()];
        let mut current = std::error::Error::source(self);
        while let Some(inner) = current {
            messages.push(inner.to_string());
            current = inner.source();
        }
        messages
    }
}
