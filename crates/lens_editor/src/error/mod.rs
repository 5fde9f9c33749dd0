//! Errors surfaced to the user.
//!
//! Every failure the orchestrator recovers from is reported through an
//! [`ErrorSink`] as one [`EditorError`]. Reporting never fails and never
//! interrupts the render.

use lens_protocol::{BackendError, Command, InfraError};
use lens_trace::TraceError;
use lens_value::ResolveError;

/// A reported failure, tagged by where it was recovered.
#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    /// No usable response; nothing was applied.
    #[error("backend unavailable: {0}")]
    Infrastructure(#[source] InfraError),
    /// The backend could not build the document.
    #[error("{0}")]
    Build(#[source] BackendError),
    /// One unit failed; the others were applied.
    #[error("{command} unit {unit}: {error}")]
    Unit {
        command: Command,
        unit: usize,
        #[source]
        error: BackendError,
    },
    /// A pointer in a trace step has no target.
    #[error("step {step}: {error}")]
    DanglingReference {
        step: usize,
        #[source]
        error: ResolveError,
    },
    /// A trace step could not be placed in the document.
    #[error(transparent)]
    RejectedStep(TraceError),
}

impl EditorError {
    /// Stable tag for logs and UI styling.
    pub fn kind(&self) -> &'static str {
        match self {
            EditorError::Infrastructure(_) => "infrastructure",
            EditorError::Build(_) => "build",
            EditorError::Unit { .. } => "unit",
            EditorError::DanglingReference { .. } => "dangling-reference",
            EditorError::RejectedStep(_) => "rejected-step",
        }
    }
}

/// Receives reported errors.
pub trait ErrorSink {
    fn report(&self, error: EditorError);
}

impl<F: Fn(EditorError)> ErrorSink for F {
    fn report(&self, error: EditorError) {
        self(error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn test_closures_are_sinks() {
        let seen = RefCell::new(Vec::new());
        let sink = |e: EditorError| seen.borrow_mut().push(e.kind());
        sink.report(EditorError::Build(BackendError::Analysis {
            msg: "x".to_string(),
        }));
        sink.report(EditorError::RejectedStep(TraceError::EmptyStack { step: 3 }));
        assert_eq!(*seen.borrow(), vec!["build", "rejected-step"]);
    }

    #[test]
    fn test_unit_message_names_command_and_unit() {
        let err = EditorError::Unit {
            command: Command::Permissions,
            unit: 1,
            error: BackendError::Analysis {
                msg: "unsupported body".to_string(),
            },
        };
        assert_eq!(err.to_string(), "permissions unit 1: analysis failed: unsupported body");
    }
}
