//! The closed set of analysis commands.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ProtocolError;

/// An analysis the backend can run.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Command {
    /// Per-body permission facts: boundaries, state steps and loans.
    Permissions,
    /// Per-body permission boundaries only.
    Boundaries,
    /// A full execution trace.
    Interpreter,
}

impl Command {
    pub const ALL: [Command; 3] = [Command::Permissions, Command::Boundaries, Command::Interpreter];

    /// Wire name of the command.
    pub fn name(self) -> &'static str {
        match self {
            Command::Permissions => "permissions",
            Command::Boundaries => "boundaries",
            Command::Interpreter => "interpreter",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Command {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Command::ALL
            .into_iter()
            .find(|c| c.name() == s)
            .ok_or_else(|| ProtocolError::UnknownCommand(s.to_string()))
    }
}
