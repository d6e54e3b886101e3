//! Custom error types and result handling for Shupai operations.
//!
//! This module defines the error handling system used throughout Shupai.
//! All operations return a [`Result<T>`] which is a type alias for `std::result::Result<T, Error>`.
//!
use std::path::PathBuf;

/// Type alias for Results with Shupai errors.
pub type Result<T> = std::result::Result<T, Error>;

/// Comprehensive error type for all Shupai operations.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// I/O errors from the standard library
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// ZIP archive errors (corrupt input, failed writes)
    #[error(transparent)]
    Zip(#[from] zip::result::ZipError),
    /// XML tokenizer errors
    #[error(transparent)]
    Xml(#[from] quick_xml::Error),
    /// Malformed XML attribute lists
    #[error(transparent)]
    XmlAttribute(#[from] quick_xml::events::attributes::AttrError),
    /// Async task join errors
    #[error(transparent)]
    Join(#[from] tokio::task::JoinError),
    #[error(transparent)]
    ShupaiBuilder(#[from] crate::shupai::ShupaiConfigBuilderError),
    /// A text entry was not valid UTF-8
    #[error("Entry '{entry}' is not valid UTF-8: {source}")]
    Decode {
        entry: String,
        #[source]
        source: std::str::Utf8Error,
    },
    /// The package descriptor has no `<metadata>` element
    #[error("No <metadata> element found in OPF file")]
    MissingMetadata,
    /// XML that tokenizes but does not form a usable tree
    #[error("Malformed XML: {0}")]
    MalformedXml(String),
    /// Input and output resolve to the same file
    #[error("Output path must differ from input path: {0:?}")]
    SamePath(PathBuf),
    /// Error for invalid file or directory paths
    #[error("The given path '{0:?}' is invalid: {1}")]
    InvalidPath(PathBuf, String),
    /// Error for unsupported operations or formats
    #[error("Unsupported: {0}")]
    Unsupported(String),
    /// Error for resources that couldn't be found
    #[error("Not found: {0}")]
    NotFound(String),
}

#[cfg(feature = "serde")]
impl serde::Serialize for Error {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.to_string().as_ref())
    }
}
