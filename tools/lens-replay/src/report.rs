//! Diagnostics for reported errors.

use ariadne::{Label, Report, ReportKind, Source};
use lens_editor::EditorError;
use lens_ir::CharRange;
use lens_protocol::BackendError;
use lens_trace::TraceResult;

/// Source range the error points at, when it has one inside the document.
fn error_range(error: &EditorError, len: usize) -> Option<CharRange> {
    let range = match error {
        EditorError::Build(BackendError::Build { range, .. })
        | EditorError::Unit {
            error: BackendError::Build { range, .. },
            ..
        } => *range,
        _ => None,
    };
    range.filter(|r| r.fits_within(len))
}

pub(crate) fn print_error(name: &str, text: &str, error: &EditorError) {
    let range = error_range(error, text.chars().count());
    let offset = range.map_or(0, |r| r.char_start);
    let mut report = Report::build(ReportKind::Error, name, offset).with_message(error.to_string());
    if let Some(range) = range {
        report = report.with_label(Label::new((name, range.to_range())).with_message(error.kind()));
    }
    if report.finish().eprint((name, Source::from(text.to_string()))).is_err() {
        eprintln!("error[{}]: {error}", error.kind());
    }
}

fn fault_range(result: &TraceResult, len: usize) -> Option<CharRange> {
    match result {
        TraceResult::Error { range, .. } => range.filter(|r| r.fits_within(len)),
        TraceResult::Success => None,
    }
}

/// How the program finished, printed after its last step.
pub(crate) fn print_result(name: &str, text: &str, result: &TraceResult) {
    let TraceResult::Error { message, .. } = result else {
        println!("program finished");
        return;
    };
    let range = fault_range(result, text.chars().count());
    let offset = range.map_or(0, |r| r.char_start);
    let mut report =
        Report::build(ReportKind::Error, name, offset).with_message(format!("program faulted: {message}"));
    if let Some(range) = range {
        report = report.with_label(Label::new((name, range.to_range())).with_message("faulted here"));
    }
    if report.finish().eprint((name, Source::from(text.to_string()))).is_err() {
        eprintln!("program faulted: {message}");
    }
}
