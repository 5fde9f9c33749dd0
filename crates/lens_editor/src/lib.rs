//! Lens Editor - Render Orchestration
//!
//! Connects a document, an analysis [`Backend`](lens_protocol::Backend) and an
//! editor widget. The [`Orchestrator`] sends the document to the backend,
//! checks the answer still describes the document, turns it into overlay
//! decorations or a trace, and reports every recoverable failure to an
//! [`ErrorSink`].
//!
//! [`TextDocument`] is a reference [`DocumentHost`] for hosts without their
//! own text model, such as the replay tool and tests.

mod config;
mod convert;
mod document;
mod error;
mod host;
mod orchestrator;

pub use config::{EditorConfig, InterpreterConfig, PermissionsConfig, DEADLINE_ENV};
pub use document::{DocumentError, SharedDocument, TextDocument, TextEdit};
pub use error::{EditorError, ErrorSink};
pub use host::{DocumentHost, EditorWidget};
pub use orchestrator::{
    Annotations, Orchestrator, OrchestratorBuilder, Phase, RenderOutcome, RenderRequest, RenderSummary,
};
