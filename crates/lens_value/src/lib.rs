//! Lens Value - Runtime Value Model
//!
//! Decoded program state as the interpreter reports it:
//! - [`Value`]: tagged union of primitives, aggregates and pointers
//! - [`Abbreviated`]: sequences truncated for transport, carrying their true length
//! - [`Path`]: opaque route to a value, the only way values refer to each other
//! - [`resolve`]: path lookup against a [`Snapshot`]
//!
//! The wire format is JSON, adjacently tagged as `{"type", "value"}`. See
//! [`wire`] for the codec.

mod abbreviated;
mod path;
mod resolve;
mod value;
pub mod wire;

pub use abbreviated::{Abbreviated, AbbreviatedError};
pub use path::Path;
pub use resolve::{resolve, DanglingReason, ResolveError, Snapshot, Target};
pub use value::Value;
pub use wire::{decode, encode, CodecError};
