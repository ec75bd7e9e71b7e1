//! Domain layer types and invariants.

pub mod blocks;
pub mod pages;
pub mod slug;
pub mod toc;
