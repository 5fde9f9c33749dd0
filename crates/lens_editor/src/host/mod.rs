//! Collaborator interfaces: the document host and the widget.

use lens_ir::{CharRange, Fingerprint};
use lens_overlay::{PositionMap, Transaction};

/// Read access to the live document.
///
/// The orchestrator only reads; the widget owns all mutation.
pub trait DocumentHost: PositionMap {
    /// Current full text.
    fn text(&self) -> String;

    /// Fingerprint of the current text and revision.
    fn fingerprint(&self) -> Fingerprint;

    /// Current length in characters.
    fn char_len(&self) -> usize;
}

/// What the orchestrator tells the widget to do.
pub trait EditorWidget {
    /// Apply a batch of layer changes.
    fn dispatch(&self, transaction: Transaction);

    /// Move the trace cursor. `None` hides it.
    fn set_step_index(&self, index: Option<usize>);

    /// Fold away `range`. Sent once per range.
    fn hide_range(&self, range: CharRange);
}
