//! Application services: materialising, rendering and assembling pages.

pub mod build;
pub mod error;
pub mod materialize;
pub mod render;
pub mod repos;
