//! Rewriter module provides the trait and implementations for content rewriters.
//!
//! Each rewriter takes the decoded text of one archive entry and produces its
//! replacement. The archive pipeline picks a rewriter per entry through
//! [`RewriterSet::for_kind`].

use crate::error::Result;
use crate::types::EntryKind;

pub mod descriptor;
pub mod inline_style;
pub mod markup;
pub mod stylesheet;

pub use descriptor::DescriptorRewriter;
pub use markup::MarkupRewriter;
pub use stylesheet::StylesheetRewriter;

/// Common interface for all entry rewriters.
///
/// Implementations are pure text-to-text transforms: they never see the archive,
/// only the content of the entry routed to them.
pub trait Rewriter {
    /// The kind of entry this rewriter is applied to.
    fn kind(&self) -> EntryKind;

    /// Rewrites the decoded content of a single entry.
    ///
    /// # Parameters
    /// * `content` - The entry's text, already decoded as UTF-8
    ///
    /// # Returns
    /// * `Result<String>` - The replacement text, or an error if the content cannot be transformed
    fn rewrite(&self, content: &str) -> Result<String>;
}

/// The rewriters applied by one conversion run.
#[derive(Debug, Clone, Default)]
pub struct RewriterSet {
    pub stylesheet: StylesheetRewriter,
    pub markup: MarkupRewriter,
    pub descriptor: DescriptorRewriter,
}

impl RewriterSet {
    /// Returns the rewriter responsible for `kind`, or `None` for pass-through entries.
    pub fn for_kind(&self, kind: EntryKind) -> Option<&dyn Rewriter> {
        match kind {
            EntryKind::Stylesheet => Some(&self.stylesheet),
            EntryKind::Markup => Some(&self.markup),
            EntryKind::Descriptor => Some(&self.descriptor),
            EntryKind::Passthrough => None,
        }
    }
}
