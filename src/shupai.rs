use std::fs::File;
use std::path::PathBuf;

use tempfile::NamedTempFile;

use crate::archive::ArchivePipeline;
use crate::error::{Error, Result};
use crate::path_utils::{
    default_output_path, has_extension, output_directory, path_to_string_lossy, same_path,
};
use crate::types::ConversionReport;

/// The main Shupai conversion configuration, built declaratively using the builder pattern.
///
/// This struct holds the input book and where the converted book goes. The
/// typesetting itself (fonts, language, writing mode) is fixed; see [`crate::profile`].
/// Once configured, a conversion runs with:
///
/// - [`convert`](ShupaiConfig::convert): Synchronous conversion
/// - [`convert_async`](ShupaiConfig::convert_async): The same conversion on Tokio's blocking pool
///
/// ## Builder Pattern
///
/// Use [`ShupaiConfig::builder()`](ShupaiConfig::builder) to create a new configuration:
///
/// ```rust,no_run
/// # use shupai::prelude::*;
/// let config = ShupaiConfig::builder()
///     .input_path(PathBuf::from("./novel.epub"))
///     .build()
///     .expect("Invalid configuration");
/// ```
#[derive(Debug, Clone, derive_builder::Builder)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ShupaiConfig {
    /// Path of the EPUB to convert.
    pub input_path: PathBuf,

    /// Where the converted EPUB is written.
    ///
    /// Defaults to `<input stem>_vertical.epub` next to the input. Must not resolve
    /// to the input path.
    #[builder(default, setter(strip_option))]
    pub output_path: Option<PathBuf>,

    /// Whether the input must carry an `.epub` extension (case-insensitive).
    #[builder(default = "true")]
    pub require_epub_extension: bool,

    /// Whether an existing file at the output path may be replaced.
    #[builder(default = "true")]
    pub overwrite: bool,
}

impl ShupaiConfig {
    /// Creates a new builder for configuring `ShupaiConfig`.
    pub fn builder() -> ShupaiConfigBuilder {
        ShupaiConfigBuilder::default()
    }

    /// The output path this configuration writes to, derived from the input when unset.
    pub fn resolved_output_path(&self) -> Result<PathBuf> {
        match &self.output_path {
            Some(path) => Ok(path.clone()),
            None => default_output_path(&self.input_path),
        }
    }

    /// Performs validation checks before any archive is opened.
    ///
    /// # Returns
    ///
    /// * `Ok(&self)` - The configuration can be converted
    /// * `Err(Error)` - The input is missing, not a file, not an EPUB (when required),
    ///   the output resolves to the input, or the output exists and `overwrite` is off
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// # use shupai::prelude::*;
    /// # fn main() -> shupai::error::Result<()> {
    /// let config = ShupaiConfig::builder()
    ///     .input_path(PathBuf::from("./novel.epub"))
    ///     .output_path(PathBuf::from("./novel.epub"))
    ///     .build()?;
    ///
    /// // Rejected: output and input are the same file
    /// assert!(config.preflight_check().is_err());
    /// # Ok(())
    /// # }
    /// ```
    pub fn preflight_check(&self) -> Result<&Self> {
        if !self.input_path.exists() {
            return Err(Error::NotFound(format!(
                "Input file not found: {}",
                path_to_string_lossy(&self.input_path)
            )));
        }
        if !self.input_path.is_file() {
            return Err(Error::InvalidPath(
                self.input_path.clone(),
                "Input path is not a file.".to_string(),
            ));
        }
        if self.require_epub_extension && !has_extension(&self.input_path, "epub") {
            return Err(Error::Unsupported(format!(
                "Input file is not an EPUB: {}",
                path_to_string_lossy(&self.input_path)
            )));
        }

        let output = self.resolved_output_path()?;
        if same_path(&self.input_path, &output)? {
            return Err(Error::SamePath(output));
        }
        if !self.overwrite && output.exists() {
            return Err(Error::InvalidPath(
                output,
                "Output file already exists.".to_string(),
            ));
        }

        Ok(self)
    }

    /// Converts the input book to vertical typesetting and writes the output book.
    ///
    /// The archive is assembled in a temporary file next to the output and only moved
    /// into place once it is complete, so a failed run never leaves a partial book at
    /// the output path.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// # use shupai::prelude::*;
    /// # fn main() -> shupai::error::Result<()> {
    /// let report = ShupaiConfig::builder()
    ///     .input_path(PathBuf::from("./novel.epub"))
    ///     .build()?
    ///     .convert()?;
    ///
    /// for finding in &report.findings {
    ///     println!("Warning: {}", finding);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub fn convert(&self) -> Result<ConversionReport> {
        self.preflight_check()?;
        let output = self.resolved_output_path()?;

        let input = File::open(&self.input_path)?;
        let mut staging = NamedTempFile::new_in(output_directory(&output))?;
        let (_, mut report) = ArchivePipeline::default().run(input, staging.as_file_mut())?;
        staging.as_file().sync_all()?;
        staging.persist(&output).map_err(|e| Error::Io(e.error))?;

        log::info!("Written to {}", path_to_string_lossy(&output));
        report.output_path = Some(output);
        Ok(report)
    }

    /// Runs [`convert`](ShupaiConfig::convert) on Tokio's blocking thread pool.
    ///
    /// The conversion itself is synchronous; this only keeps it off async worker threads.
    pub async fn convert_async(self) -> Result<ConversionReport> {
        tokio::task::spawn_blocking(move || self.convert()).await?
    }
}

impl ShupaiConfigBuilder {
    fn validate(&self) -> std::result::Result<(), String> {
        if let Some(path) = &self.input_path {
            if path.as_os_str().is_empty() {
                return Err("Input path must not be empty".to_string());
            }
        }
        if let Some(Some(path)) = &self.output_path {
            if path.as_os_str().is_empty() {
                return Err("Output path must not be empty".to_string());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_requires_input() {
        assert!(ShupaiConfig::builder().build().is_err());
    }

    #[test]
    fn test_builder_rejects_empty_input() {
        let result = ShupaiConfig::builder().input_path(PathBuf::new()).build();
        assert!(result.unwrap_err().to_string().contains("Input path must not be empty"));
    }

    #[test]
    fn test_builder_defaults() {
        let config = ShupaiConfig::builder()
            .input_path(PathBuf::from("dir/book.epub"))
            .build()
            .unwrap();
        assert!(config.require_epub_extension);
        assert!(config.overwrite);
        assert_eq!(
            config.resolved_output_path().unwrap(),
            PathBuf::from("dir/book_vertical.epub")
        );
    }
}
