//! Lens Replay CLI
//!
//! Runs the editor pipeline against a recorded backend response:
//!
//! ```text
//! lens-replay permissions src/main.rs response.json --hide 3
//! ```
//!
//! Layers are printed as the widget would receive them, trace steps one by
//! one, and every reported error as a source diagnostic.

mod report;
mod widget;

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::rc::Rc;
use std::sync::Once;

use lens_editor::{
    Annotations, EditorConfig, EditorError, InterpreterConfig, Orchestrator, PermissionsConfig, RenderOutcome,
    RenderRequest, SharedDocument, TextDocument,
};
use lens_ir::LinePos;
use lens_protocol::{Backend, Command, IncludeMode, ProtocolError, Request, TransportError};

use crate::widget::PrintWidget;

static TRACING_INIT: Once = Once::new();

/// Enable with `RUST_LOG=lens_editor=debug` or similar.
fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{prelude::*, EnvFilter};

        // Only initialize if RUST_LOG is set
        if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::registry()
                .with(EnvFilter::from_default_env())
                .with(
                    tracing_tree::HierarchicalLayer::new(2)
                        .with_targets(true)
                        .with_writer(std::io::stderr),
                )
                .init();
        }
    });
}

#[derive(Debug, thiserror::Error)]
enum ReplayError {
    #[error("usage: lens-replay <command> <source-file> <response.json> [options]")]
    Usage,
    #[error("unknown option `{0}`")]
    UnknownOption(String),
    #[error("`{0}` is not a line number (lines start at 1)")]
    InvalidLine(String),
    #[error(transparent)]
    Command(#[from] ProtocolError),
    #[error("cannot read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
}

#[derive(Debug, PartialEq, Eq)]
struct Args {
    command: Command,
    source: PathBuf,
    response: PathBuf,
    hidden_lines: Vec<LinePos>,
    permissions: PermissionsConfig,
    interpreter: InterpreterConfig,
}

impl Args {
    fn request(&self) -> RenderRequest {
        let request = match self.command {
            Command::Permissions => RenderRequest::permissions(self.permissions),
            Command::Boundaries => RenderRequest::boundaries(),
            Command::Interpreter => RenderRequest::interpreter(self.interpreter),
        };
        request.with_annotations(Annotations {
            hidden_lines: self.hidden_lines.clone(),
        })
    }
}

fn parse_args(args: &[String]) -> Result<Args, ReplayError> {
    let [command, source, response, rest @ ..] = args else {
        return Err(ReplayError::Usage);
    };
    let mut parsed = Args {
        command: command.parse()?,
        source: PathBuf::from(source),
        response: PathBuf::from(response),
        hidden_lines: Vec::new(),
        permissions: PermissionsConfig::default(),
        interpreter: InterpreterConfig::default(),
    };

    let mut rest = rest.iter();
    while let Some(arg) = rest.next() {
        match arg.as_str() {
            "--hide" => {
                let Some(line) = rest.next() else {
                    return Err(ReplayError::Usage);
                };
                let line = line
                    .parse::<usize>()
                    .ok()
                    .and_then(|n| n.checked_sub(1))
                    .ok_or_else(|| ReplayError::InvalidLine(line.clone()))?;
                parsed.hidden_lines.push(LinePos { line });
            }
            "--all" => parsed.permissions.include_mode = IncludeMode::All,
            "--no-boundaries" => parsed.permissions.boundaries = false,
            "--no-stepper" => parsed.permissions.stepper = false,
            "--should-fail" => {
                parsed.permissions.should_fail = true;
                parsed.interpreter.should_fail = true;
            }
            other => return Err(ReplayError::UnknownOption(other.to_string())),
        }
    }
    Ok(parsed)
}

fn read(path: &Path) -> Result<String, ReplayError> {
    std::fs::read_to_string(path).map_err(|source| ReplayError::Read {
        path: path.display().to_string(),
        source,
    })
}

/// Answers every request with one recorded response.
struct Recorded {
    response: String,
}

impl Backend for Recorded {
    async fn call(&self, request: &Request) -> Result<String, TransportError> {
        tracing::debug!(command = %request.command(), bytes = request.text().len(), "replaying recorded response");
        Ok(self.response.clone())
    }
}

async fn replay(args: &Args) -> Result<bool, ReplayError> {
    let text = read(&args.source)?;
    let response = read(&args.response)?;
    let name = args.source.display().to_string();

    let reports: Rc<RefCell<Vec<EditorError>>> = Rc::default();
    let sink = reports.clone();
    let orch = Orchestrator::builder(Recorded { response }, SharedDocument::new(TextDocument::new(text.as_str())))
        .widget(PrintWidget::new(&text))
        .error_sink(move |e: EditorError| sink.borrow_mut().push(e))
        .config(EditorConfig::from_env())
        .build();

    let outcome = orch.render(args.request()).await;
    tracing::debug!(?outcome, "render finished");

    for index in 0..orch.step_count() {
        if let Some(view) = orch.seek_step(index) {
            print!("{view}");
        }
    }
    if let Some(result) = orch.trace_result() {
        report::print_result(&name, &text, &result);
    }

    let reports = reports.borrow();
    for error in reports.iter() {
        report::print_error(&name, &text, error);
    }
    Ok(matches!(outcome, RenderOutcome::Applied(_)) && reports.is_empty())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let result = match parse_args(&args) {
        Ok(args) => replay(&args).await,
        Err(err) => Err(err),
    };
    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("error: {err}");
            if matches!(err, ReplayError::Usage | ReplayError::UnknownOption(_)) {
                eprintln!();
                eprintln!("Commands: permissions, boundaries, interpreter");
                eprintln!("Options:");
                eprintln!("  --hide <line>      Fold a line once the render lands (repeatable)");
                eprintln!("  --all              Show every permission step, not only changes");
                eprintln!("  --no-boundaries    Skip the boundaries layer");
                eprintln!("  --no-stepper       Skip the permission steps layer");
                eprintln!("  --should-fail      The program is expected to fail");
            }
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_parse_options() {
        let Ok(parsed) = parse_args(&args(&["permissions", "a.rs", "r.json", "--hide", "2", "--all", "--no-stepper"]))
        else {
            panic!("arguments should parse");
        };
        assert_eq!(parsed.command, Command::Permissions);
        assert_eq!(parsed.hidden_lines, vec![LinePos { line: 1 }]);
        assert_eq!(parsed.permissions.include_mode, IncludeMode::All);
        assert!(!parsed.permissions.stepper);
        assert!(parsed.permissions.boundaries);
    }

    #[test]
    fn test_parse_rejects_unknown_command() {
        let result = parse_args(&args(&["borrowck", "a.rs", "r.json"]));
        assert!(matches!(result, Err(ReplayError::Command(ProtocolError::UnknownCommand(name))) if name == "borrowck"));
    }

    #[test]
    fn test_parse_rejects_line_zero() {
        let result = parse_args(&args(&["boundaries", "a.rs", "r.json", "--hide", "0"]));
        assert!(matches!(result, Err(ReplayError::InvalidLine(_))));
    }

    #[test]
    fn test_parse_requires_three_arguments() {
        assert!(matches!(parse_args(&args(&["interpreter", "a.rs"])), Err(ReplayError::Usage)));
    }
}
