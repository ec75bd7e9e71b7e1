//! HTML layout around rendered content.

pub mod views;
