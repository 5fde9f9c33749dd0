//! Lens Trace - Execution Trace Model
//!
//! An interpreter run arrives as a [`RawTrace`]: every step with its stack
//! frames and live heap, plus how the program finished. [`build_trace`]
//! validates it against the document it was computed for, [`TracePlayer`]
//! carries the cursor the widget displays, and [`view`] turns a step into
//! something a person can read.

mod player;
mod step;
mod trace;
pub mod view;

pub use player::TracePlayer;
pub use step::{Frame, Local, RawStep, Step};
pub use trace::{build_trace, DanglingPointer, RawTrace, Trace, TraceError, TraceResult};
