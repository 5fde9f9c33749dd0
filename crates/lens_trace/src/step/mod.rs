//! One step of an execution.

use lens_ir::CharRange;
use lens_value::{Snapshot, Value};
use serde::{Deserialize, Serialize};

/// A named binding in a frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Local {
    pub name: String,
    pub value: Value,
}

/// One stack frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Function name.
    pub name: String,
    /// Range of the function body.
    pub body_range: CharRange,
    /// Range the frame is currently executing.
    pub location: CharRange,
    /// Locals in declaration order.
    pub locals: Vec<Local>,
}

impl Frame {
    pub fn local(&self, name: &str) -> Option<&Value> {
        self.locals.iter().find(|l| l.name == name).map(|l| &l.value)
    }
}

/// A step as the backend reports it, before validation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawStep {
    /// Outermost frame first.
    pub frames: Vec<Frame>,
    /// Heap allocations live at this step.
    #[serde(default)]
    pub heap: Vec<Value>,
}

impl RawStep {
    /// Range of the innermost frame's location.
    pub fn range(&self) -> Option<CharRange> {
        self.frames.last().map(|f| f.location)
    }
}

/// A validated step: its range fit the document at request time.
#[derive(Clone, Debug, PartialEq)]
pub struct Step {
    /// Position in the raw trace.
    pub index: usize,
    pub range: CharRange,
    pub frames: Vec<Frame>,
    pub heap: Vec<Value>,
}

impl Step {
    pub(crate) fn from_raw(index: usize, range: CharRange, raw: RawStep) -> Self {
        Step {
            index,
            range,
            frames: raw.frames,
            heap: raw.heap,
        }
    }

    /// The frame currently executing.
    pub fn innermost(&self) -> Option<&Frame> {
        self.frames.last()
    }

    /// Every value in the snapshot: locals of every frame, then the heap.
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.frames
            .iter()
            .flat_map(|f| f.locals.iter().map(|l| &l.value))
            .chain(self.heap.iter())
    }
}

impl Snapshot for Step {
    fn frame_count(&self) -> usize {
        self.frames.len()
    }

    fn local(&self, frame: usize, name: &str) -> Option<&Value> {
        self.frames.get(frame)?.local(name)
    }

    fn heap(&self, index: usize) -> Option<&Value> {
        self.heap.get(index)
    }
}
