//! Render trees of Notion-style content blocks into static HTML pages.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
pub mod presentation;
