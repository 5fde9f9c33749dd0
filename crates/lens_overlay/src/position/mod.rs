//! Position tracking across document edits.

use lens_ir::{CharRange, Revision};

/// Maps ranges from an earlier document revision to the current one.
///
/// Implemented by the document host, which knows every edit since `since`.
pub trait PositionMap {
    /// The current revision.
    fn revision(&self) -> Revision;

    /// Where `range`, taken at revision `since`, lies now.
    ///
    /// Returns `None` when an edit since then touched the text of `range`
    /// itself, or when `since` is too old to be mapped.
    fn map_range(&self, range: CharRange, since: Revision) -> Option<CharRange>;
}

/// A document that has not changed since the entries were computed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Unchanged(pub Revision);

impl PositionMap for Unchanged {
    fn revision(&self) -> Revision {
        self.0
    }

    fn map_range(&self, range: CharRange, since: Revision) -> Option<CharRange> {
        (since == self.0).then_some(range)
    }
}
