//! Lens IR - Shared Location Types
//!
//! The small vocabulary every other trace-lens crate speaks:
//! - [`CharRange`] for character ranges inside a document
//! - [`LineIndex`] for converting between lines and character offsets
//! - [`Revision`] and [`Fingerprint`] for identifying a document version
//! - [`ensure_sufficient_stack`] for recursive walks over value graphs
//!
//! All positions are measured in characters (Unicode scalar values), not
//! bytes, because that is the unit the analysis backend reports.

mod fingerprint;
mod lines;
mod range;
mod stack;

pub use fingerprint::{Fingerprint, Revision};
pub use lines::{LineIndex, LinePos};
pub use range::{CharRange, RangeError};
pub use stack::ensure_sufficient_stack;
