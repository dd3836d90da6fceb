//! Core modules for scrivener's editing pipeline.
//!
//! Segmentation, rule machinery, target gating, and reporting live here;
//! the command policies built on top of them live in [`crate::policies`].

pub mod assets;
pub mod config;
pub mod document;
pub mod editor;
pub mod error;
pub mod output;
pub mod prose;
pub mod references;
pub mod report;
pub mod rules;
pub mod target;
