//! Package descriptor location.
//!
//! The descriptor (`.opf`) is found by trying an ordered list of strategies; the
//! first one that yields a path wins. By default the container pointer
//! (`META-INF/container.xml`) is consulted first, then the archive listing is
//! scanned by extension.

use quick_xml::escape::unescape;

use crate::error::{Error, Result};
use crate::xml::XmlDocument;

/// Fixed location of the container pointer inside an EPUB.
pub const CONTAINER_PATH: &str = "META-INF/container.xml";
/// Namespace of the container pointer document.
pub const CONTAINER_NAMESPACE: &str = "urn:oasis:names:tc:opendocument:xmlns:container";
/// File extension of package descriptors.
pub const DESCRIPTOR_EXTENSION: &str = ".opf";

/// One way of finding the package descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocateStrategy {
    /// First `rootfile` of the container pointer whose path ends in `.opf`.
    ContainerPointer,
    /// First archive entry whose name ends in `.opf`.
    ExtensionScan,
}

impl LocateStrategy {
    /// Attempts this strategy against an archive listing.
    ///
    /// # Arguments
    ///
    /// * `names` - Every entry name in the archive, in archive order
    /// * `read` - Reads the full content of one entry by name
    ///
    /// # Returns
    ///
    /// * `Ok(Some(path))` - The descriptor path this strategy found
    /// * `Ok(None)` - This strategy found nothing
    /// * `Err(Error)` - Reading an entry failed
    pub fn resolve<F>(&self, names: &[String], read: &mut F) -> Result<Option<String>>
    where
        F: FnMut(&str) -> Result<Vec<u8>>,
    {
        match self {
            LocateStrategy::ContainerPointer => {
                if !names.iter().any(|n| n == CONTAINER_PATH) {
                    return Ok(None);
                }
                let bytes = read(CONTAINER_PATH)?;
                match parse_container_pointer(&bytes) {
                    Ok(paths) => Ok(paths.into_iter().find(|p| p.ends_with(DESCRIPTOR_EXTENSION))),
                    Err(e) => {
                        log::warn!("Ignoring unreadable {}: {}", CONTAINER_PATH, e);
                        Ok(None)
                    }
                }
            }
            LocateStrategy::ExtensionScan => Ok(names
                .iter()
                .find(|n| n.ends_with(DESCRIPTOR_EXTENSION))
                .cloned()),
        }
    }
}

/// Resolves the package descriptor path by trying strategies in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptorLocator {
    strategies: Vec<LocateStrategy>,
}

impl DescriptorLocator {
    pub fn new(strategies: Vec<LocateStrategy>) -> Self {
        Self { strategies }
    }

    pub fn strategies(&self) -> &[LocateStrategy] {
        &self.strategies
    }

    /// Returns the first path any strategy yields, or `None` when the archive has no descriptor.
    pub fn locate<F>(&self, names: &[String], mut read: F) -> Result<Option<String>>
    where
        F: FnMut(&str) -> Result<Vec<u8>>,
    {
        for strategy in &self.strategies {
            if let Some(path) = strategy.resolve(names, &mut read)? {
                log::debug!("Located package descriptor '{}' via {:?}", path, strategy);
                return Ok(Some(path));
            }
        }
        Ok(None)
    }
}

impl Default for DescriptorLocator {
    fn default() -> Self {
        Self::new(vec![
            LocateStrategy::ContainerPointer,
            LocateStrategy::ExtensionScan,
        ])
    }
}

/// Lists the `full-path` of every `rootfile` in a container pointer document.
pub fn parse_container_pointer(bytes: &[u8]) -> Result<Vec<String>> {
    let text = std::str::from_utf8(bytes).map_err(|source| Error::Decode {
        entry: CONTAINER_PATH.to_string(),
        source,
    })?;
    let document = XmlDocument::parse(text)?;

    let mut paths = Vec::new();
    for rootfile in document
        .root
        .descendants()
        .into_iter()
        .filter(|e| e.matches(CONTAINER_NAMESPACE, "rootfile"))
    {
        if let Some(raw) = rootfile.attribute("full-path") {
            let path = unescape(raw).map_err(|e| Error::MalformedXml(e.to_string()))?;
            paths.push(path.into_owned());
        }
    }
    Ok(paths)
}
