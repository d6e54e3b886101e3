//! EPUB archive reading, routing and re-packaging.
//!
//! The whole input archive is read into memory before anything is rewritten, because
//! locating the package descriptor needs the complete entry listing. On output the
//! `mimetype` entry is written first and stored uncompressed, as the EPUB container
//! format requires; every other entry keeps its original position and compression.
//! Only a method the writer cannot produce (Deflate64, for one) is re-encoded as Deflated.

use std::io::{Cursor, Read, Seek, Write};

use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipArchive, ZipWriter};

use crate::error::{Error, Result};
use crate::locator::DescriptorLocator;
use crate::rewriter::RewriterSet;
use crate::types::{ConversionFinding, ConversionReport, EntryKind};

/// Name of the entry that must lead the archive uncompressed.
pub const MIMETYPE_ENTRY: &str = "mimetype";

/// Entries at or above this size need ZIP64 extensions.
const ZIP64_THRESHOLD: u64 = 0xFFFF_FFFF;

/// One archive entry, fully materialized in memory.
#[derive(Debug, Clone, PartialEq)]
pub struct ArchiveEntry {
    pub name: String,
    pub data: Vec<u8>,
    pub compression: CompressionMethod,
    pub last_modified: Option<DateTime>,
    pub unix_mode: Option<u32>,
    pub is_dir: bool,
}

impl ArchiveEntry {
    /// Creates a deflated file entry without timestamp or permissions.
    pub fn new(name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
            compression: CompressionMethod::Deflated,
            last_modified: None,
            unix_mode: None,
            is_dir: false,
        }
    }

    /// Decodes the entry as UTF-8 text. A leading byte order mark is kept.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] naming the entry when its bytes are not valid UTF-8.
    pub fn text(&self) -> Result<&str> {
        let text = std::str::from_utf8(&self.data).map_err(|source| Error::Decode {
            entry: self.name.clone(),
            source,
        })?;
        Ok(text)
    }

    fn options(&self, compression: CompressionMethod) -> SimpleFileOptions {
        let mut options = SimpleFileOptions::default()
            .compression_method(compression)
            .large_file(self.data.len() as u64 >= ZIP64_THRESHOLD);
        if let Some(modified) = self.last_modified {
            options = options.last_modified_time(modified);
        }
        if let Some(mode) = self.unix_mode {
            options = options.unix_permissions(mode);
        }
        options
    }
}

/// Reads every entry of `archive`, in archive order.
pub fn read_entries<R: Read + Seek>(archive: &mut ZipArchive<R>) -> Result<Vec<ArchiveEntry>> {
    let mut entries = Vec::with_capacity(archive.len());
    for index in 0..archive.len() {
        let mut file = archive.by_index(index)?;
        // the declared size is untrusted; let the buffer grow with the real data
        let mut data = Vec::new();
        file.read_to_end(&mut data)?;
        entries.push(ArchiveEntry {
            name: file.name().to_string(),
            data,
            compression: file.compression(),
            last_modified: file.last_modified(),
            unix_mode: file.unix_mode(),
            is_dir: file.is_dir(),
        });
    }
    Ok(entries)
}

/// Writes `entries` as a new archive: `mimetype` first and stored, the rest in order.
///
/// Returns the underlying writer and any compression methods that had to be normalized.
pub fn write_entries<W: Write + Seek>(
    entries: &[ArchiveEntry],
    writer: W,
) -> Result<(W, Vec<ConversionFinding>)> {
    let mut zip = ZipWriter::new(writer);
    let mut findings = Vec::new();

    if let Some(mimetype) = entries.iter().find(|e| e.name == MIMETYPE_ENTRY) {
        zip.start_file(mimetype.name.as_str(), mimetype.options(CompressionMethod::Stored))?;
        zip.write_all(&mimetype.data)?;
    }

    for entry in entries.iter().filter(|e| e.name != MIMETYPE_ENTRY) {
        let compression = if is_writable(entry.compression)? {
            entry.compression
        } else {
            log::warn!(
                "Entry '{}' uses {:?}, which cannot be written; writing it deflated instead",
                entry.name,
                entry.compression
            );
            findings.push(ConversionFinding::CompressionNormalized(entry.name.clone()));
            CompressionMethod::Deflated
        };
        let options = entry.options(compression);
        if entry.is_dir {
            zip.add_directory(entry.name.as_str(), options)?;
        } else {
            zip.start_file(entry.name.as_str(), options)?;
            zip.write_all(&entry.data)?;
        }
    }

    let writer = zip.finish()?;
    Ok((writer, findings))
}

/// Whether the zip writer can compress with `method`.
///
/// Checked against a scratch in-memory archive so a rejected method never leaves a
/// half-started entry in the real output.
fn is_writable(method: CompressionMethod) -> Result<bool> {
    if matches!(method, CompressionMethod::Stored | CompressionMethod::Deflated) {
        return Ok(true);
    }
    let mut scratch = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(method);
    match scratch.start_file("scratch", options) {
        Ok(()) => Ok(true),
        Err(ZipError::UnsupportedArchive(_)) => Ok(false),
        Err(e) => Err(e.into()),
    }
}

/// The full conversion of one archive: locate, read, rewrite, write.
#[derive(Debug, Clone, Default)]
pub struct ArchivePipeline {
    locator: DescriptorLocator,
    rewriters: RewriterSet,
}

impl ArchivePipeline {
    pub fn new(locator: DescriptorLocator, rewriters: RewriterSet) -> Self {
        Self { locator, rewriters }
    }

    /// Converts the archive read from `reader` and writes the result to `writer`.
    ///
    /// # Returns
    ///
    /// * `Ok((W, ConversionReport))` - The writer, positioned after the finished archive,
    ///   and a report of what was rewritten
    /// * `Err(Error)` - The input is not a readable archive, a text entry is not UTF-8,
    ///   or the descriptor cannot be patched. Nothing usable has been written in that case.
    pub fn run<R, W>(&self, reader: R, writer: W) -> Result<(W, ConversionReport)>
    where
        R: Read + Seek,
        W: Write + Seek,
    {
        log::debug!("Opening input archive");
        let mut archive = ZipArchive::new(reader)?;

        let names: Vec<String> = archive.file_names().map(str::to_string).collect();
        let descriptor = self.locator.locate(&names, |name| {
            let mut file = archive.by_name(name)?;
            let mut data = Vec::new();
            file.read_to_end(&mut data)?;
            Ok(data)
        })?;

        log::debug!("Reading {} entries", names.len());
        let mut entries = read_entries(&mut archive)?;

        let mut report = ConversionReport::default();
        self.rewrite_kind(&mut entries, EntryKind::Stylesheet, descriptor.as_deref())?;
        self.rewrite_kind(&mut entries, EntryKind::Markup, descriptor.as_deref())?;
        match descriptor.as_deref() {
            Some(path) if entries.iter().any(|e| e.name == path) => {
                self.rewrite_kind(&mut entries, EntryKind::Descriptor, Some(path))?;
                report.descriptor_path = Some(path.to_string());
            }
            Some(path) => {
                log::warn!("Package descriptor '{}' is not in the archive", path);
                report
                    .findings
                    .push(ConversionFinding::DescriptorEntryMissing(path.to_string()));
            }
            None => {
                log::warn!("No OPF file found in EPUB; continuing without descriptor changes");
                report.findings.push(ConversionFinding::DescriptorNotFound);
            }
        }

        for entry in entries.iter().filter(|e| !e.is_dir) {
            match EntryKind::classify(&entry.name, report.descriptor_path.as_deref()) {
                EntryKind::Stylesheet => report.stylesheets_rewritten += 1,
                EntryKind::Markup => report.markup_rewritten += 1,
                EntryKind::Descriptor => {}
                EntryKind::Passthrough => report.entries_passed_through += 1,
            }
        }
        report.entries_passed_through += entries.iter().filter(|e| e.is_dir).count();

        log::debug!("Writing {} entries", entries.len());
        let (writer, findings) = write_entries(&entries, writer)?;
        report.findings.extend(findings);
        Ok((writer, report))
    }

    /// Converts an in-memory archive.
    pub fn convert_bytes(&self, input: &[u8]) -> Result<(Vec<u8>, ConversionReport)> {
        let (cursor, report) = self.run(Cursor::new(input), Cursor::new(Vec::new()))?;
        Ok((cursor.into_inner(), report))
    }

    fn rewrite_kind(
        &self,
        entries: &mut [ArchiveEntry],
        kind: EntryKind,
        descriptor: Option<&str>,
    ) -> Result<()> {
        let Some(rewriter) = self.rewriters.for_kind(kind) else {
            return Ok(());
        };
        for entry in entries
            .iter_mut()
            .filter(|e| !e.is_dir && EntryKind::classify(&e.name, descriptor) == kind)
        {
            log::debug!("Rewriting {:?} entry '{}'", kind, entry.name);
            let rewritten = rewriter.rewrite(entry.text()?)?;
            entry.data = rewritten.into_bytes();
        }
        Ok(())
    }
}
