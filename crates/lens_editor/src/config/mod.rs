//! Orchestrator configuration.

use std::time::Duration;

use lens_protocol::{IncludeMode, InterpreterOptions, PermissionsOptions};

/// Environment variable overriding [`EditorConfig::deadline`], in milliseconds.
pub const DEADLINE_ENV: &str = "LENS_DEADLINE_MS";

/// Session-wide settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EditorConfig {
    /// How long to wait for the backend before giving up.
    pub deadline: Duration,
    /// Forward hidden-line annotations to the widget.
    pub hide_range_on_annotations: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        EditorConfig {
            deadline: Duration::from_millis(5000),
            hide_range_on_annotations: true,
        }
    }
}

impl EditorConfig {
    /// Defaults, with the deadline read from `LENS_DEADLINE_MS` when set.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`EditorConfig::from_env`] with a custom variable source.
    ///
    /// Unparseable values are ignored with a warning.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = EditorConfig::default();
        if let Some(raw) = lookup(DEADLINE_ENV) {
            match raw.trim().parse::<u64>() {
                Ok(ms) => config.deadline = Duration::from_millis(ms),
                Err(_) => tracing::warn!(value = %raw, "ignoring invalid {DEADLINE_ENV}"),
            }
        }
        config
    }
}

/// Which permission layers a `permissions` render fills.
///
/// Loan facts are always filled.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PermissionsConfig {
    pub boundaries: bool,
    pub stepper: bool,
    pub include_mode: IncludeMode,
    pub should_fail: bool,
}

impl Default for PermissionsConfig {
    fn default() -> Self {
        PermissionsConfig {
            boundaries: true,
            stepper: true,
            include_mode: IncludeMode::default(),
            should_fail: false,
        }
    }
}

impl PermissionsConfig {
    pub(crate) fn options(self) -> PermissionsOptions {
        PermissionsOptions {
            include_mode: self.include_mode,
            should_fail: self.should_fail,
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct InterpreterConfig {
    pub should_fail: bool,
}

impl InterpreterConfig {
    pub(crate) fn options(self) -> InterpreterOptions {
        InterpreterOptions {
            should_fail: self.should_fail,
        }
    }
}
