//! Lens Protocol - Editor/Backend Command Protocol
//!
//! The editor asks the analysis backend to run one of a closed set of
//! [`Command`]s on the full document text. Each command fixes its options
//! ([`CommandOptions`]) and its payload ([`CommandResult`]), and receivers
//! match on the result exhaustively.
//!
//! Two error layers are kept apart:
//! - [`BackendError`]: a well-formed answer saying the build or one unit failed
//! - [`InfraError`]: no well-formed answer at all (transport, timeout, garbage)

mod analysis;
mod backend;
mod command;
mod request;
mod response;

pub use analysis::{
    AnalysisOutput, BodyBoundaries, LoanRegion, MissingPermReason, MissingPermsInfo, Permissions,
    PermissionsBoundary, PermissionsDataDiff, PermissionsDiff, PermissionsStateStep, RefinementRegion,
    Refiner, ValueStep,
};
pub use backend::{issue, Backend, InfraError, TransportError};
pub use command::Command;
pub use request::{
    BoundariesOptions, CommandOptions, IncludeMode, InterpreterOptions, PermissionsOptions, Request,
};
pub use response::{
    decode_response, encode_response, BackendError, CommandResult, ErrorClass, Response, UnitResult,
};

/// Protocol-level failure: bad command names and undecodable payloads.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("unknown command `{0}`")]
    UnknownCommand(String),
    #[error("malformed `{command}` response: {source}")]
    Malformed {
        command: Command,
        source: serde_json::Error,
    },
    #[error("failed to encode: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("`{found}` payload for a `{expected}` request")]
    Mismatch { expected: Command, found: Command },
}
