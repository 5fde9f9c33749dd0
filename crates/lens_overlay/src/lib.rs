//! Lens Overlay - Annotation Layers
//!
//! Analysis results are shown as decorations on character ranges of the
//! document. Each kind of result lives in its own [`LayerId`]; the
//! [`OverlayStore`] replaces or clears one layer at a time and reports every
//! change as an [`OverlayEffect`] for the widget.

mod layer;
mod position;
mod store;

pub use layer::{Annotation, Decoration, LayerId};
pub use position::{PositionMap, Unchanged};
pub use store::{OverlayEffect, OverlayStore, Transaction};
