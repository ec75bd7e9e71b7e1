//! Utilities for generating deterministic, human-friendly slugs.
//!
//! Slugs are ASCII: input is transliterated (`slug` crate, via `deunicode`),
//! lowercased, and every run of characters outside `[a-z0-9]` collapses into a
//! single `-` with no leading or trailing hyphen. Headings such as
//! `"Getting Started!"` become `getting-started` and `"Введение"` becomes
//! `vvedenie`.

use std::collections::{HashMap, HashSet};

use slug::slugify;
use thiserror::Error;

const MAX_SUFFIX_ATTEMPTS: usize = 32;

/// Base used for headings whose text produces no slug characters at all.
pub const FALLBACK_ANCHOR: &str = "section";

/// Errors that can occur while generating a slug.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SlugError {
    #[error("slug source text is empty")]
    EmptyInput,
    #[error("failed to derive slug from `{input}`")]
    Unrepresentable { input: String },
    #[error("exhausted attempts to find a unique slug for `{base}`")]
    Exhausted { base: String },
}

/// Derive a base slug from the provided human-readable text.
pub fn derive_slug(input: &str) -> Result<String, SlugError> {
    if input.trim().is_empty() {
        return Err(SlugError::EmptyInput);
    }

    let candidate = slugify(input);

    if candidate.is_empty() {
        return Err(SlugError::Unrepresentable {
            input: input.to_string(),
        });
    }

    Ok(candidate)
}

/// Produce a slug that does not collide according to the supplied predicate.
///
/// The `is_unique` closure must return `true` when the provided slug is not
/// taken yet. The helper will retry by suffixing a monotonic counter
/// (`-2`, `-3`, …).
pub fn generate_unique_slug<F>(input: &str, mut is_unique: F) -> Result<String, SlugError>
where
    F: FnMut(&str) -> bool,
{
    let base = derive_slug(input)?;

    if is_unique(&base) {
        return Ok(base);
    }

    for attempt in 2..=MAX_SUFFIX_ATTEMPTS + 1 {
        let candidate = format!("{base}-{attempt}");
        if is_unique(&candidate) {
            return Ok(candidate);
        }
    }

    Err(SlugError::Exhausted { base })
}

/// Deterministically generate unique anchor slugs within a single page.
///
/// Headings processed in order receive monotonic suffixes when duplicates
/// occur (`overview`, `overview-2`, `overview-3`). Headings without any
/// sluggable text share the [`FALLBACK_ANCHOR`] base.
#[derive(Default, Debug)]
pub struct AnchorSlugger {
    occurrences: HashMap<String, usize>,
    issued: HashSet<String>,
}

impl AnchorSlugger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Anchor for the given heading text, unique within this slugger.
    ///
    /// A suffixed candidate that collides with an anchor issued earlier
    /// (a heading literally titled `Overview 2`) moves on to the next counter.
    pub fn anchor_for(&mut self, heading: &str) -> String {
        let base = derive_slug(heading).unwrap_or_else(|_| FALLBACK_ANCHOR.to_string());
        let count = self.occurrences.entry(base.clone()).or_insert(0);

        loop {
            *count += 1;
            let candidate = if *count == 1 {
                base.clone()
            } else {
                format!("{base}-{}", *count)
            };
            if self.issued.insert(candidate.clone()) {
                return candidate;
            }
        }
    }
}
