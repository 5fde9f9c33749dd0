//! Requests sent to the backend.
//!
//! A request carries the full document text and the options of exactly one
//! command. The command is implied by the options variant, so a request can
//! never pair one command with another command's options.

use serde::{Deserialize, Serialize};

use crate::{Command, ProtocolError};

/// Which permission steps the backend reports.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum IncludeMode {
    /// Only steps where some permission changed.
    #[default]
    Changes,
    /// Every step.
    All,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionsOptions {
    pub include_mode: IncludeMode,
    /// The program is expected not to compile.
    pub should_fail: bool,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundariesOptions {
    pub should_fail: bool,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterpreterOptions {
    /// The program is expected to fault at runtime.
    pub should_fail: bool,
}

/// Options for one command.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CommandOptions {
    Permissions(PermissionsOptions),
    Boundaries(BoundariesOptions),
    Interpreter(InterpreterOptions),
}

impl CommandOptions {
    pub fn command(&self) -> Command {
        match self {
            CommandOptions::Permissions(_) => Command::Permissions,
            CommandOptions::Boundaries(_) => Command::Boundaries,
            CommandOptions::Interpreter(_) => Command::Interpreter,
        }
    }

    /// Default options for `command`.
    pub fn default_for(command: Command) -> Self {
        match command {
            Command::Permissions => CommandOptions::Permissions(PermissionsOptions::default()),
            Command::Boundaries => CommandOptions::Boundaries(BoundariesOptions::default()),
            Command::Interpreter => CommandOptions::Interpreter(InterpreterOptions::default()),
        }
    }
}

impl From<PermissionsOptions> for CommandOptions {
    fn from(options: PermissionsOptions) -> Self {
        CommandOptions::Permissions(options)
    }
}

impl From<BoundariesOptions> for CommandOptions {
    fn from(options: BoundariesOptions) -> Self {
        CommandOptions::Boundaries(options)
    }
}

impl From<InterpreterOptions> for CommandOptions {
    fn from(options: InterpreterOptions) -> Self {
        CommandOptions::Interpreter(options)
    }
}

/// One backend call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Request {
    text: String,
    options: CommandOptions,
}

#[derive(Serialize)]
struct WireRequest<'a> {
    command: Command,
    code: &'a str,
    options: &'a CommandOptions,
}

impl Request {
    pub fn new(text: impl Into<String>, options: impl Into<CommandOptions>) -> Self {
        Request {
            text: text.into(),
            options: options.into(),
        }
    }

    pub fn command(&self) -> Command {
        self.options.command()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn options(&self) -> &CommandOptions {
        &self.options
    }

    /// `{"command", "code", "options"}` as JSON.
    pub fn to_wire(&self) -> Result<String, ProtocolError> {
        let wire = WireRequest {
            command: self.command(),
            code: &self.text,
            options: &self.options,
        };
        serde_json::to_string(&wire).map_err(ProtocolError::Encode)
    }
}
