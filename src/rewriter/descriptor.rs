//! Package descriptor (OPF) rewriting.
//!
//! Sets the book language, declares the primary writing mode and flips the spine's
//! page progression. Every mutation finds-or-creates its target, so running the
//! rewriter over its own output leaves the document unchanged.

use crate::error::{Error, Result};
use crate::profile::VerticalProfile;
use crate::rewriter::Rewriter;
use crate::types::EntryKind;
use crate::xml::{Element, XmlDocument};

/// Namespace of OPF package documents.
pub const OPF_NAMESPACE: &str = "http://www.idpf.org/2007/opf";
/// Dublin Core elements namespace used for `dc:language`.
pub const DC_NAMESPACE: &str = "http://purl.org/dc/elements/1.1/";
/// Spine attribute controlling page turn direction.
pub const PAGE_PROGRESSION_DIRECTION: &str = "page-progression-direction";

/// Rewrites package descriptors to declare vertical right-to-left reading.
#[derive(Debug, Clone, Default)]
pub struct DescriptorRewriter {
    profile: VerticalProfile,
}

impl DescriptorRewriter {
    pub fn new(profile: VerticalProfile) -> Self {
        Self { profile }
    }

    /// Applies the language, writing-mode and spine mutations to a parsed descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingMetadata`] when the package has no `metadata` element.
    pub fn patch(&self, document: &mut XmlDocument) -> Result<()> {
        let root = &mut document.root;
        let root_dc_prefix = root.declared_prefix(DC_NAMESPACE).map(str::to_string);
        let root_prefixes: Vec<String> = declared_prefixes(root);

        let metadata = root
            .find_child_mut(OPF_NAMESPACE, "metadata")
            .ok_or(Error::MissingMetadata)?;
        self.set_language(metadata, root_dc_prefix, &root_prefixes);
        self.set_writing_mode(metadata);

        if let Some(spine) = root.find_child_mut(OPF_NAMESPACE, "spine") {
            spine.set_attribute(
                PAGE_PROGRESSION_DIRECTION,
                self.profile.page_progression_direction,
            );
        }
        Ok(())
    }

    fn set_language(
        &self,
        metadata: &mut Element,
        root_dc_prefix: Option<String>,
        root_prefixes: &[String],
    ) {
        keep_first(metadata, |e| e.matches(DC_NAMESPACE, "language"));
        if let Some(language) = metadata.find_child_mut(DC_NAMESPACE, "language") {
            language.set_text(self.profile.language);
            return;
        }

        let prefix = match metadata
            .declared_prefix(DC_NAMESPACE)
            .map(str::to_string)
            .or(root_dc_prefix)
        {
            Some(prefix) => prefix,
            None => {
                let taken = |p: &str| {
                    metadata.declares_prefix(p) || root_prefixes.iter().any(|r| r == p)
                };
                let prefix = std::iter::once("dc".to_string())
                    .chain((1..).map(|i| format!("dc{}", i)))
                    .find(|p| !taken(p))
                    .unwrap_or_else(|| "dc".to_string());
                metadata.set_attribute(&format!("xmlns:{}", prefix), DC_NAMESPACE);
                prefix
            }
        };

        let mut language = Element::new(format!("{}:language", prefix), Some(DC_NAMESPACE));
        language.set_text(self.profile.language);
        metadata.push_child(language);
    }

    fn set_writing_mode(&self, metadata: &mut Element) {
        let key = self.profile.writing_mode_key;
        let is_writing_mode =
            |e: &Element| e.matches(OPF_NAMESPACE, "meta") && e.attribute("name") == Some(key);

        keep_first(metadata, is_writing_mode);
        if let Some(meta) = metadata.child_elements_mut().find(|e| is_writing_mode(e)) {
            meta.set_attribute("content", self.profile.writing_mode);
            return;
        }

        let name = match metadata.prefix() {
            Some(prefix) => format!("{}:meta", prefix),
            None => "meta".to_string(),
        };
        let mut meta = Element::new(name, metadata.namespace.as_deref());
        meta.set_attribute("name", key);
        meta.set_attribute("content", self.profile.writing_mode);
        metadata.push_child(meta);
    }
}

impl Rewriter for DescriptorRewriter {
    fn kind(&self) -> EntryKind {
        EntryKind::Descriptor
    }

    fn rewrite(&self, content: &str) -> Result<String> {
        let mut document = XmlDocument::parse(content)?;
        self.patch(&mut document)?;
        Ok(document.to_xml_string())
    }
}

/// Removes all but the first child element matching `predicate`.
fn keep_first<F>(parent: &mut Element, predicate: F)
where
    F: Fn(&Element) -> bool,
{
    let mut seen = false;
    parent.remove_child_elements(|e| {
        if !predicate(e) {
            return false;
        }
        let duplicate = seen;
        seen = true;
        duplicate
    });
}

fn declared_prefixes(element: &Element) -> Vec<String> {
    element
        .attributes
        .iter()
        .filter_map(|(key, _)| key.strip_prefix("xmlns:").map(str::to_string))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rewrite(opf: &str) -> String {
        DescriptorRewriter::default().rewrite(opf).unwrap()
    }

    const MINIMAL: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<package xmlns="http://www.idpf.org/2007/opf" version="3.0" unique-identifier="uid">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/"></metadata>
  <manifest/>
  <spine></spine>
</package>"#;

    #[test]
    fn test_minimal_descriptor() {
        let out = rewrite(MINIMAL);
        assert!(out.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<package"));
        assert!(out.contains("<dc:language>zh-tw</dc:language>"));
        assert!(out.contains(r#"<meta name="primary-writing-mode" content="vertical-rl"/>"#));
        assert!(out.contains(r#"<spine page-progression-direction="rtl">"#));
        assert!(out.contains("<manifest/>"));
    }

    #[test]
    fn test_existing_language_is_replaced_and_deduplicated() {
        let out = rewrite(
            r#"<package xmlns="http://www.idpf.org/2007/opf" xmlns:dc="http://purl.org/dc/elements/1.1/"><metadata><dc:title>T</dc:title><dc:language>en</dc:language><dc:language>fr</dc:language></metadata></package>"#,
        );
        assert_eq!(out.matches("language>zh-tw<").count(), 1);
        assert!(!out.contains(">en<"));
        assert!(!out.contains(">fr<"));
        assert!(out.contains("<dc:title>T</dc:title>"));
    }

    #[test]
    fn test_existing_writing_mode_meta_is_updated() {
        let out = rewrite(
            r#"<package xmlns="http://www.idpf.org/2007/opf"><metadata><meta content="horizontal-lr" name="primary-writing-mode"/><meta name="cover" content="img"/></metadata></package>"#,
        );
        assert!(out.contains(r#"<meta content="vertical-rl" name="primary-writing-mode"/>"#));
        assert!(out.contains(r#"<meta name="cover" content="img"/>"#));
        assert_eq!(out.matches("primary-writing-mode").count(), 1);
    }

    #[test]
    fn test_undeclared_dc_prefix_is_declared_on_metadata() {
        let out = rewrite("<package><metadata/><spine toc=\"ncx\"/></package>");
        assert!(out.contains(
            r#"<metadata xmlns:dc="http://purl.org/dc/elements/1.1/"><dc:language>zh-tw</dc:language>"#
        ));
        assert!(out.contains(r#"<spine toc="ncx" page-progression-direction="rtl"/>"#));
    }

    #[test]
    fn test_root_declared_dc_prefix_is_reused() {
        let out = rewrite(
            r#"<package xmlns="http://www.idpf.org/2007/opf" xmlns:purl="http://purl.org/dc/elements/1.1/"><metadata></metadata></package>"#,
        );
        assert!(out.contains("<metadata><purl:language>zh-tw</purl:language>"));
    }

    #[test]
    fn test_prefixed_package() {
        let out = rewrite(
            r#"<opf:package xmlns:opf="http://www.idpf.org/2007/opf" xmlns:dc="http://purl.org/dc/elements/1.1/"><opf:metadata><dc:language>ja</dc:language></opf:metadata><opf:spine page-progression-direction="ltr"/></opf:package>"#,
        );
        assert!(out.contains("<dc:language>zh-tw</dc:language>"));
        assert!(out.contains(r#"<opf:meta name="primary-writing-mode" content="vertical-rl"/>"#));
        assert!(out.contains(r#"<opf:spine page-progression-direction="rtl"/>"#));
    }

    #[test]
    fn test_missing_metadata_is_fatal() {
        let result = DescriptorRewriter::default()
            .rewrite(r#"<package xmlns="http://www.idpf.org/2007/opf"><spine/></package>"#);
        assert!(matches!(result, Err(Error::MissingMetadata)));
    }

    #[test]
    fn test_missing_spine_is_not_fatal() {
        let out = rewrite(r#"<package xmlns="http://www.idpf.org/2007/opf"><metadata/></package>"#);
        assert!(!out.contains(PAGE_PROGRESSION_DIRECTION));
        assert!(out.contains("zh-tw"));
    }

    #[test]
    fn test_profile_values_drive_the_mutations() {
        let profile = VerticalProfile {
            language: "ja",
            page_progression_direction: "ltr",
            ..VerticalProfile::TRADITIONAL_CHINESE
        };
        let out = DescriptorRewriter::new(profile).rewrite(MINIMAL).unwrap();
        assert!(out.contains("<dc:language>ja</dc:language>"));
        assert!(out.contains(r#"<spine page-progression-direction="ltr">"#));
        assert!(!out.contains("zh-tw"));
    }

    #[test]
    fn test_rewrite_is_idempotent() {
        let once = rewrite(MINIMAL);
        let twice = rewrite(&once);
        assert_eq!(once, twice);
    }
}
