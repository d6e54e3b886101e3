//! Core data types, enums, and reports for the Shupai conversion library.
//!
//! This module defines the fundamental data structures used throughout Shupai:
//! - Entry routing (`EntryKind`)
//! - Reporting types (`ConversionReport`, `ConversionFinding`)

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Extensions routed to the markup rewriter.
const MARKUP_EXTENSIONS: [&str; 3] = ["xhtml", "html", "htm"];

/// Which rewriter, if any, an archive entry is routed through.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum EntryKind {
    Stylesheet,  // `.css`
    Markup,      // `.xhtml`, `.html`, `.htm`
    Descriptor,  // the located package descriptor
    Passthrough, // everything else, copied untouched
}

impl EntryKind {
    /// Classifies an entry by name. `descriptor` is the located package descriptor path, if any.
    ///
    /// Extension matching is case-insensitive; the descriptor comparison is exact.
    pub fn classify(name: &str, descriptor: Option<&str>) -> Self {
        if descriptor == Some(name) {
            return EntryKind::Descriptor;
        }
        let lower = name.to_ascii_lowercase();
        match lower.rsplit_once('.') {
            Some((_, "css")) => EntryKind::Stylesheet,
            Some((_, ext)) if MARKUP_EXTENSIONS.contains(&ext) => EntryKind::Markup,
            _ => EntryKind::Passthrough,
        }
    }

    /// Whether entries of this kind are decoded as text.
    pub fn is_text(&self) -> bool {
        !matches!(self, EntryKind::Passthrough)
    }
}

/// A non-fatal observation made while converting a book.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ConversionFinding {
    /// No package descriptor could be located; metadata was left untouched.
    DescriptorNotFound,
    /// The container pointed at a descriptor path that has no entry in the archive.
    DescriptorEntryMissing(String),
    /// An entry used a compression method other than stored/deflated and was re-deflated.
    CompressionNormalized(String),
}

impl fmt::Display for ConversionFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversionFinding::DescriptorNotFound => write!(f, "No OPF file found in EPUB"),
            ConversionFinding::DescriptorEntryMissing(path) => {
                write!(f, "No OPF file found in EPUB (missing entry '{}')", path)
            }
            ConversionFinding::CompressionNormalized(name) => {
                write!(f, "Entry '{}' was recompressed with deflate", name)
            }
        }
    }
}

/// Summary of a finished conversion.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ConversionReport {
    pub output_path: Option<PathBuf>, // Set once the archive is persisted to disk
    pub descriptor_path: Option<String>, // Entry name of the rewritten descriptor
    pub stylesheets_rewritten: usize,
    pub markup_rewritten: usize,
    pub entries_passed_through: usize,
    pub findings: Vec<ConversionFinding>,
}

impl ConversionReport {
    /// Whether the descriptor was located and rewritten.
    pub fn descriptor_rewritten(&self) -> bool {
        self.descriptor_path.is_some()
    }

    /// Total number of entries written to the output archive.
    pub fn total_entries(&self) -> usize {
        self.stylesheets_rewritten
            + self.markup_rewritten
            + self.entries_passed_through
            + usize::from(self.descriptor_rewritten())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_by_extension() {
        assert_eq!(EntryKind::classify("OEBPS/style.css", None), EntryKind::Stylesheet);
        assert_eq!(EntryKind::classify("Styles/MAIN.CSS", None), EntryKind::Stylesheet);
        assert_eq!(EntryKind::classify("ch1.xhtml", None), EntryKind::Markup);
        assert_eq!(EntryKind::classify("ch1.HTML", None), EntryKind::Markup);
        assert_eq!(EntryKind::classify("ch1.htm", None), EntryKind::Markup);
        assert_eq!(EntryKind::classify("cover.jpg", None), EntryKind::Passthrough);
        assert_eq!(EntryKind::classify("mimetype", None), EntryKind::Passthrough);
        assert_eq!(EntryKind::classify("content.opf", None), EntryKind::Passthrough);
    }

    #[test]
    fn test_classify_descriptor() {
        assert_eq!(
            EntryKind::classify("OEBPS/content.opf", Some("OEBPS/content.opf")),
            EntryKind::Descriptor
        );
        assert_eq!(
            EntryKind::classify("other.opf", Some("OEBPS/content.opf")),
            EntryKind::Passthrough
        );
    }

    #[test]
    fn test_descriptor_not_found_message() {
        assert_eq!(
            ConversionFinding::DescriptorNotFound.to_string(),
            "No OPF file found in EPUB"
        );
    }
}
