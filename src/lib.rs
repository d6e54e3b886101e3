//! Shupai - Vertical Chinese Typesetting for EPUB
//!
//! This crate converts EPUB books from horizontal, left-to-right typesetting into
//! vertical, right-to-left Traditional Chinese typesetting suitable for e-ink readers.
//! Stylesheets get writing-mode and font rules injected, inline font declarations are
//! stripped from body markup, and the package descriptor is patched to declare the
//! new language and page progression.
//!
//! # Getting Started
//!
//! Configure a conversion with `ShupaiConfig::builder()`, then run it with
//! `convert` (or `convert_async` from async code).
//!
//! ```rust,no_run
//! use shupai::prelude::*;
//!
//! fn main() -> shupai::error::Result<()> {
//!     let config = ShupaiConfig::builder()
//!         .input_path(PathBuf::from("./books/novel.epub"))
//!         // Optional: defaults to ./books/novel_vertical.epub
//!         .output_path(PathBuf::from("./converted/novel.epub"))
//!         .build()?;
//!
//!     // Optional: validate paths before converting
//!     config.preflight_check()?;
//!
//!     let report = config.convert()?;
//!     for finding in &report.findings {
//!         println!("Warning: {}", finding);
//!     }
//!     println!("Written to {:?}", report.output_path);
//!     Ok(())
//! }
//! ```
//!
//! The individual rewriters are usable on their own through the [`rewriter`] module,
//! and [`archive::ArchivePipeline`] converts archives held in memory.

pub mod archive;
pub mod error;
pub mod locator;
pub mod path_utils;
pub mod profile;
pub mod rewriter;
pub mod shupai;
pub mod types;
pub mod xml;

// Publicly expose the main `ShupaiConfig` struct and its builder
pub use shupai::ShupaiConfig;
pub use shupai::ShupaiConfigBuilder;

// Re-export core types for direct access
pub use archive::{ArchiveEntry, ArchivePipeline};
pub use locator::{DescriptorLocator, LocateStrategy};
pub use profile::VerticalProfile;
pub use types::{ConversionFinding, ConversionReport, EntryKind};

/// Prelude module for convenient imports.
///
/// This module re-exports the most commonly used types and traits, allowing you to
/// import everything you need with a single `use shupai::prelude::*;` statement.
pub mod prelude {
    pub use super::{
        ArchiveEntry, ArchivePipeline, ConversionFinding, ConversionReport, DescriptorLocator,
        EntryKind, LocateStrategy, ShupaiConfig, ShupaiConfigBuilder, VerticalProfile, error,
        rewriter, types,
    };
    pub use crate::rewriter::{
        DescriptorRewriter, MarkupRewriter, Rewriter, RewriterSet, StylesheetRewriter,
    };
    pub use std::path::{Path, PathBuf};
}
