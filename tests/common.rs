//! Common test utilities and fixtures for the Shupai crate.
//!
//! Provides functions for building EPUB archives on disk, reading entries back,
//! and the fixture documents shared by the integration tests.

use std::io::{Read, Write};
use std::path::Path;

use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

#[allow(dead_code)]
pub const MIMETYPE: &[u8] = b"application/epub+zip";

#[allow(dead_code)]
pub const CONTAINER_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="content.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>"#;

#[allow(dead_code)]
pub const CONTENT_OPF: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<package xmlns="http://www.idpf.org/2007/opf" version="3.0" unique-identifier="uid">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/"></metadata>
  <manifest>
    <item id="css" href="style.css" media-type="text/css"/>
    <item id="ch1" href="chapter1.xhtml" media-type="application/xhtml+xml"/>
  </manifest>
  <spine>
    <itemref idref="ch1"/>
  </spine>
</package>"#;

#[allow(dead_code)]
pub const STYLE_CSS: &str = "p {\n  font-family: Arial;\n  color: black;\n}\n";

#[allow(dead_code)]
pub const CHAPTER_XHTML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<html xmlns="http://www.w3.org/1999/xhtml">
<head><title>Chapter 1</title><link rel="stylesheet" href="style.css"/></head>
<body>
<h1 style="font-family: Arial;">Title</h1>
<p style="font-family: Arial; color:red;">text</p>
</body>
</html>"#;

/// Creates a fresh temporary directory, removed when the returned guard drops.
#[allow(dead_code)]
pub fn setup_test_dir() -> TempDir {
    tempfile::Builder::new()
        .prefix("shupai-test-")
        .tempdir()
        .unwrap()
}

/// Writes a ZIP archive with the given entries, in order.
#[allow(dead_code)]
pub fn write_archive(path: &Path, entries: &[(&str, &[u8], CompressionMethod)]) {
    let file = std::fs::File::create(path).unwrap();
    let mut zip = ZipWriter::new(file);
    for (name, data, method) in entries {
        let options = SimpleFileOptions::default().compression_method(*method);
        zip.start_file(*name, options).unwrap();
        zip.write_all(data).unwrap();
    }
    zip.finish().unwrap();
}

/// Writes the standard fixture book: mimetype, container, descriptor, stylesheet, chapter.
#[allow(dead_code)]
pub fn write_fixture_epub(path: &Path) {
    write_archive(
        path,
        &[
            ("mimetype", MIMETYPE, CompressionMethod::Stored),
            (
                "META-INF/container.xml",
                CONTAINER_XML.as_bytes(),
                CompressionMethod::Deflated,
            ),
            ("content.opf", CONTENT_OPF.as_bytes(), CompressionMethod::Deflated),
            ("style.css", STYLE_CSS.as_bytes(), CompressionMethod::Deflated),
            (
                "chapter1.xhtml",
                CHAPTER_XHTML.as_bytes(),
                CompressionMethod::Deflated,
            ),
        ],
    );
}

/// Lists entry names and compression methods in archive order.
#[allow(dead_code)]
pub fn entry_listing(path: &Path) -> Vec<(String, CompressionMethod)> {
    let file = std::fs::File::open(path).unwrap();
    let mut archive = ZipArchive::new(file).unwrap();
    (0..archive.len())
        .map(|i| {
            let entry = archive.by_index(i).unwrap();
            (entry.name().to_string(), entry.compression())
        })
        .collect()
}

/// Reads one entry's bytes.
#[allow(dead_code)]
pub fn read_entry_bytes(path: &Path, name: &str) -> Vec<u8> {
    let file = std::fs::File::open(path).unwrap();
    let mut archive = ZipArchive::new(file).unwrap();
    let mut entry = archive.by_name(name).unwrap();
    let mut data = Vec::new();
    entry.read_to_end(&mut data).unwrap();
    data
}

/// Reads one entry as UTF-8 text.
#[allow(dead_code)]
pub fn read_entry(path: &Path, name: &str) -> String {
    String::from_utf8(read_entry_bytes(path, name)).unwrap()
}
