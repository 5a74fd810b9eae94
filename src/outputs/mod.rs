//! Output generation for the presentation layer.
//!
//! # Submodules
//!
//! - [`json`]: Writes notices, statistics and failure diagnostics as JSON

pub mod json;
