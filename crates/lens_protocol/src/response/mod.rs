//! Backend responses.
//!
//! A response is either one top-level [`BackendError`] (the document did not
//! build) or a [`CommandResult`] whose shape is fixed by the command. For
//! multi-unit commands every unit is its own `Result`, so one failing body
//! never hides another's output.
//!
//! # Wire Format
//!
//! ```text
//! {"Ok": [{"Ok": {...}}, {"Err": {"type": "AnalysisError", "msg": "..."}}]}
//! {"Err": {"type": "BuildError", "msg": "...", "range": {...}}}
//! ```

use lens_ir::CharRange;
use lens_trace::RawTrace;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::{AnalysisOutput, BodyBoundaries, Command, ProtocolError};

/// How serious a backend error is.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ErrorClass {
    /// The program failed before analysis could start.
    Build,
    /// The analysis itself failed.
    Analysis,
}

/// A failure reported by the backend, at request or unit level.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "type")]
pub enum BackendError {
    #[error("build failed: {msg}")]
    #[serde(rename = "BuildError")]
    Build {
        msg: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        range: Option<CharRange>,
    },
    #[error("analysis failed: {msg}")]
    #[serde(rename = "AnalysisError")]
    Analysis { msg: String },
}

impl BackendError {
    pub fn classification(&self) -> ErrorClass {
        match self {
            BackendError::Build { .. } => ErrorClass::Build,
            BackendError::Analysis { .. } => ErrorClass::Analysis,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            BackendError::Build { msg, .. } | BackendError::Analysis { msg } => msg,
        }
    }
}

/// Outcome of one analyzed unit.
pub type UnitResult<T> = Result<T, BackendError>;

/// A successful response, keyed by the command that produced it.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CommandResult {
    Permissions(Vec<UnitResult<AnalysisOutput>>),
    Boundaries(Vec<UnitResult<BodyBoundaries>>),
    Interpreter(RawTrace),
}

impl CommandResult {
    pub fn command(&self) -> Command {
        match self {
            CommandResult::Permissions(_) => Command::Permissions,
            CommandResult::Boundaries(_) => Command::Boundaries,
            CommandResult::Interpreter(_) => Command::Interpreter,
        }
    }
}

/// A complete backend response.
pub type Response = Result<CommandResult, BackendError>;

/// Parse the raw response to `command`.
pub fn decode_response(command: Command, raw: &str) -> Result<Response, ProtocolError> {
    fn parse<T: DeserializeOwned>(command: Command, raw: &str) -> Result<Result<T, BackendError>, ProtocolError> {
        serde_json::from_str(raw).map_err(|source| ProtocolError::Malformed { command, source })
    }

    Ok(match command {
        Command::Permissions => parse(command, raw)?.map(CommandResult::Permissions),
        Command::Boundaries => parse(command, raw)?.map(CommandResult::Boundaries),
        Command::Interpreter => parse(command, raw)?.map(CommandResult::Interpreter),
    })
}

/// Serialize a response in the wire format `decode_response` reads.
pub fn encode_response(response: &Response) -> Result<String, ProtocolError> {
    serde_json::to_string(response).map_err(ProtocolError::Encode)
}
