//! Ordered execution traces.
//!
//! [`build_trace`] turns the interpreter's raw output into a [`Trace`].
//! Validation happens per step: a step that cannot be placed in the document
//! is rejected and recorded, and the remaining steps are kept.

use lens_ir::CharRange;
use lens_value::{resolve, Path, ResolveError};
use serde::{Deserialize, Serialize};

use crate::{RawStep, Step};

/// How the interpreted program finished.
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum TraceResult {
    #[default]
    Success,
    /// The program faulted, e.g. on undefined behavior.
    Error {
        message: String,
        #[serde(default)]
        range: Option<CharRange>,
    },
}

/// The interpreter payload as it arrives on the wire.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct RawTrace {
    pub steps: Vec<RawStep>,
    #[serde(default)]
    pub result: TraceResult,
}

/// A step that could not be kept.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TraceError {
    #[error("step {step} covers {range}, outside a document of {document_len} characters")]
    OutOfBounds {
        step: usize,
        range: CharRange,
        document_len: usize,
    },
    #[error("step {step} has no stack frames")]
    EmptyStack { step: usize },
}

impl TraceError {
    /// Index of the offending step in the raw trace.
    pub fn step(&self) -> usize {
        match self {
            TraceError::OutOfBounds { step, .. } | TraceError::EmptyStack { step } => *step,
        }
    }
}

/// A pointer that does not resolve within its own step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DanglingPointer {
    /// Index of the step in the raw trace.
    pub step: usize,
    pub error: ResolveError,
}

/// Validated steps in execution order.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Trace {
    steps: Vec<Step>,
    result: TraceResult,
    rejected: Vec<TraceError>,
}

/// Validate `raw` against the document length it was requested with.
#[tracing::instrument(level = "debug", skip_all, fields(steps = raw.steps.len(), document_len = document_len))]
pub fn build_trace(raw: RawTrace, document_len: usize) -> Trace {
    let mut steps = Vec::with_capacity(raw.steps.len());
    let mut rejected = Vec::new();

    for (index, step) in raw.steps.into_iter().enumerate() {
        let Some(range) = step.range() else {
            tracing::warn!(step = index, "rejecting step with an empty stack");
            rejected.push(TraceError::EmptyStack { step: index });
            continue;
        };
        if !range.fits_within(document_len) {
            tracing::warn!(step = index, %range, "rejecting out-of-bounds step");
            rejected.push(TraceError::OutOfBounds {
                step: index,
                range,
                document_len,
            });
            continue;
        }
        steps.push(Step::from_raw(index, range, step));
    }

    Trace {
        steps,
        result: raw.result,
        rejected,
    }
}

impl Trace {
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Step> {
        self.steps.get(index)
    }

    pub fn result(&self) -> &TraceResult {
        &self.result
    }

    /// Steps dropped by [`build_trace`].
    pub fn rejected(&self) -> &[TraceError] {
        &self.rejected
    }

    /// Pointers in each step that do not resolve against that step.
    pub fn dangling_references(&self) -> Vec<DanglingPointer> {
        let mut out = Vec::new();
        for step in &self.steps {
            let paths: Vec<&Path> = step.values().flat_map(lens_value::Value::pointers).collect();
            for path in paths {
                if let Err(error) = resolve(step, path) {
                    out.push(DanglingPointer {
                        step: step.index,
                        error,
                    });
                }
            }
        }
        out
    }

    /// Positions (into [`Trace::steps`]) of steps still inside a document of `current_len` characters.
    pub fn renderable(&self, current_len: usize) -> Vec<usize> {
        self.steps
            .iter()
            .enumerate()
            .filter(|(_, step)| step.range.fits_within(current_len))
            .map(|(pos, _)| pos)
            .collect()
    }
}
