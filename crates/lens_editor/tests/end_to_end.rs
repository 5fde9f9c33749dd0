//! Full renders against scripted backends.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use lens_editor::{
    EditorConfig, EditorError, EditorWidget, InterpreterConfig, Orchestrator, PermissionsConfig, Phase,
    RenderOutcome, RenderRequest, SharedDocument, TextDocument,
};
use lens_ir::CharRange;
use lens_overlay::{LayerId, OverlayEffect, OverlayStore, Transaction};
use lens_protocol::{
    encode_response, AnalysisOutput, Backend, BackendError, CommandResult, LoanRegion, MissingPermsInfo,
    Permissions, PermissionsBoundary, Request, TransportError,
};
use lens_trace::view::ValueView;
use lens_trace::{Frame, Local, RawStep, RawTrace, TraceError, TraceResult};
use lens_value::{Path, Value};
use pretty_assertions::assert_eq;
use tokio::sync::Notify;

const SOURCE: &str = "fn main(){ let mut v=vec![1,2,3]; let n=&v[0]; v.push(0); let x=*n; }";

fn at(needle: &str) -> usize {
    let Some(offset) = SOURCE.find(needle) else {
        panic!("`{needle}` not in source");
    };
    offset
}

fn span(needle: &str) -> CharRange {
    CharRange::new(at(needle), at(needle) + needle.len())
}

fn analysis() -> AnalysisOutput {
    AnalysisOutput {
        body_range: CharRange::new(0, SOURCE.len()),
        boundaries: vec![PermissionsBoundary {
            location: at("v.push"),
            expected: Permissions::READ | Permissions::WRITE,
            actual: Permissions::READ,
            was_copied: false,
            explanations: MissingPermsInfo::default(),
        }],
        steps: vec![],
        loans: vec![LoanRegion {
            key: 0,
            issued_at: span("&v[0]"),
            start: at("&v[0]"),
            end: at("let x"),
            refined_ranges: vec![],
        }],
    }
}

fn encoded(result: CommandResult) -> String {
    let Ok(raw) = encode_response(&Ok(result)) else {
        panic!("response should encode");
    };
    raw
}

fn raw_step(location: CharRange, locals: Vec<(&str, Value)>) -> RawStep {
    RawStep {
        frames: vec![Frame {
            name: "main".to_string(),
            body_range: CharRange::new(0, SOURCE.len()),
            location,
            locals: locals
                .into_iter()
                .map(|(name, value)| Local {
                    name: name.to_string(),
                    value,
                })
                .collect(),
        }],
        heap: vec![],
    }
}

fn trace_reply() -> String {
    let step = |needle: &str, locals: Vec<(&str, Value)>| raw_step(span(needle), locals);
    encoded(CommandResult::Interpreter(RawTrace {
        steps: vec![
            step("let mut v", vec![]),
            step("let n", vec![("v", Value::list(vec![Value::int(1), Value::int(2), Value::int(3)]))]),
            step("v.push(0)", vec![("v", Value::list(vec![Value::int(1), Value::int(2), Value::int(3)]))]),
        ],
        ..RawTrace::default()
    }))
}

/// Answers from a script, one reply per call; hangs once the script runs out.
struct Scripted {
    replies: RefCell<Vec<String>>,
}

impl Scripted {
    fn new(replies: Vec<String>) -> Self {
        Scripted {
            replies: RefCell::new(replies),
        }
    }
}

impl Backend for Scripted {
    async fn call(&self, _request: &Request) -> Result<String, TransportError> {
        let next = {
            let mut replies = self.replies.borrow_mut();
            (!replies.is_empty()).then(|| replies.remove(0))
        };
        match next {
            Some(reply) => Ok(reply),
            None => std::future::pending().await,
        }
    }
}

/// Holds the reply until the gate opens.
struct Gated {
    gate: Rc<Notify>,
    reply: String,
}

impl Backend for Gated {
    async fn call(&self, _request: &Request) -> Result<String, TransportError> {
        self.gate.notified().await;
        Ok(self.reply.clone())
    }
}

#[derive(Clone, Default)]
struct Widget {
    transactions: Rc<RefCell<Vec<Transaction>>>,
    step_index: Rc<Cell<Option<usize>>>,
}

impl EditorWidget for Widget {
    fn dispatch(&self, transaction: Transaction) {
        self.transactions.borrow_mut().push(transaction);
    }

    fn set_step_index(&self, index: Option<usize>) {
        self.step_index.set(index);
    }

    fn hide_range(&self, _range: CharRange) {}
}

type Reports = Rc<RefCell<Vec<EditorError>>>;

fn build<B: Backend>(backend: B, document: SharedDocument, config: EditorConfig) -> (Orchestrator<B, SharedDocument>, Widget, Reports) {
    let widget = Widget::default();
    let reports: Reports = Rc::default();
    let sink = reports.clone();
    let orch = Orchestrator::builder(backend, document)
        .widget(widget.clone())
        .error_sink(move |e: EditorError| sink.borrow_mut().push(e))
        .config(config)
        .build();
    (orch, widget, reports)
}

fn document() -> SharedDocument {
    SharedDocument::new(TextDocument::new(SOURCE))
}

async fn wait_until_requesting<B: Backend>(orch: &Orchestrator<B, SharedDocument>) {
    while !matches!(orch.phase(), Phase::Requesting(_)) {
        tokio::task::yield_now().await;
    }
}

#[tokio::test]
async fn test_single_ok_unit_fills_boundaries() {
    let reply = encoded(CommandResult::Permissions(vec![Ok(analysis())]));
    let (orch, widget, reports) = build(Scripted::new(vec![reply]), document(), EditorConfig::default());

    let outcome = orch.render(RenderRequest::permissions(PermissionsConfig::default())).await;

    let RenderOutcome::Applied(summary) = outcome else {
        panic!("expected an applied render, got {outcome:?}");
    };
    assert_eq!((summary.applied, summary.failed), (1, 0));
    assert_eq!(orch.with_overlays(|s| s.units(LayerId::Boundaries)), vec![0]);
    assert_eq!(
        orch.with_overlays(|s| s.layer(LayerId::Boundaries)[0].range),
        CharRange::point(at("v.push"))
    );
    assert_eq!(orch.with_overlays(|s| s.units(LayerId::LoanFacts)), vec![0]);
    assert!(reports.borrow().is_empty());
    assert_eq!(widget.transactions.borrow().len(), 1);
}

#[tokio::test]
async fn test_failed_unit_does_not_block_others() {
    let reply = encoded(CommandResult::Permissions(vec![
        Ok(analysis()),
        Err(BackendError::Analysis {
            msg: "closure bodies are not supported".to_string(),
        }),
    ]));
    let (orch, _widget, reports) = build(Scripted::new(vec![reply]), document(), EditorConfig::default());

    let outcome = orch.render(RenderRequest::permissions(PermissionsConfig::default())).await;

    assert!(matches!(outcome, RenderOutcome::Applied(s) if s.applied == 1 && s.failed == 1));
    let reports = reports.borrow();
    assert_eq!(reports.len(), 1);
    let EditorError::Unit { unit, .. } = &reports[0] else {
        panic!("expected a unit error, got {:?}", reports[0]);
    };
    assert_eq!(*unit, 1);
    assert_eq!(orch.with_overlays(|s| s.units(LayerId::Boundaries)), vec![0]);
}

#[tokio::test]
async fn test_edit_during_interpreter_render_discards_trace() {
    let gate = Rc::new(Notify::new());
    let document = document();
    let backend = Gated {
        gate: gate.clone(),
        reply: trace_reply(),
    };
    let (orch, widget, reports) = build(backend, document.clone(), EditorConfig::default());

    let edit = async {
        wait_until_requesting(&orch).await;
        let Ok(_) = document.edit(|doc| doc.insert(0, "// ")) else {
            panic!("edit should apply");
        };
        orch.document_changed();
        gate.notify_one();
    };
    let (outcome, ()) = tokio::join!(orch.render(RenderRequest::interpreter(InterpreterConfig::default())), edit);

    assert_eq!(outcome, RenderOutcome::Stale);
    assert_eq!(orch.step_count(), 0);
    assert_eq!(orch.current_step(), None);
    assert_eq!(widget.step_index.get(), None);
    assert!(orch.with_overlays(OverlayStore::is_empty));
    assert!(reports.borrow().is_empty());

    let transactions = widget.transactions.borrow();
    assert_eq!(transactions.len(), 1);
    assert!(transactions[0]
        .effects
        .iter()
        .all(|e| matches!(e, OverlayEffect::Cleared { .. })));
    assert_eq!(transactions[0].effects.len(), LayerId::ALL.len());
}

#[tokio::test]
async fn test_interpreter_render_marks_steps() {
    let (orch, widget, reports) = build(Scripted::new(vec![trace_reply()]), document(), EditorConfig::default());

    let outcome = orch.render(RenderRequest::interpreter(InterpreterConfig::default())).await;

    assert!(matches!(outcome, RenderOutcome::Applied(s) if s.applied == 3));
    assert_eq!(orch.step_count(), 3);
    assert_eq!(widget.step_index.get(), Some(0));
    assert_eq!(orch.with_overlays(|s| s.layer(LayerId::InterpMarkers).len()), 3);
    assert!(reports.borrow().is_empty());
}

#[tokio::test]
async fn test_timeout_reported_once_and_overlays_kept() {
    let reply = encoded(CommandResult::Permissions(vec![Ok(analysis())]));
    let config = EditorConfig {
        deadline: Duration::from_millis(20),
        ..EditorConfig::default()
    };
    let (orch, _widget, reports) = build(Scripted::new(vec![reply]), document(), config);

    orch.render(RenderRequest::permissions(PermissionsConfig::default())).await;
    let outcome = orch.render(RenderRequest::permissions(PermissionsConfig::default())).await;

    assert_eq!(outcome, RenderOutcome::Failed);
    assert_eq!(orch.phase(), Phase::Idle);
    let reports = reports.borrow();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].kind(), "infrastructure");
    assert_eq!(orch.with_overlays(|s| s.units(LayerId::Boundaries)), vec![0]);
}

#[tokio::test]
async fn test_render_while_requesting_is_dropped() {
    let gate = Rc::new(Notify::new());
    let backend = Gated {
        gate: gate.clone(),
        reply: encoded(CommandResult::Permissions(vec![Ok(analysis())])),
    };
    let (orch, _widget, reports) = build(backend, document(), EditorConfig::default());

    let second = async {
        wait_until_requesting(&orch).await;
        let busy = orch.render(RenderRequest::boundaries()).await;
        gate.notify_one();
        busy
    };
    let (first, second) = tokio::join!(orch.render(RenderRequest::permissions(PermissionsConfig::default())), second);

    assert_eq!(second, RenderOutcome::Busy);
    assert!(matches!(first, RenderOutcome::Applied(s) if s.applied == 1));
    assert_eq!(orch.with_overlays(|s| s.units(LayerId::Boundaries)), vec![0]);
    assert!(reports.borrow().is_empty());
}

#[tokio::test]
async fn test_dangling_pointer_is_reported_and_shown() {
    let reply = encoded(CommandResult::Interpreter(RawTrace {
        steps: vec![
            raw_step(span("let mut v"), vec![]),
            raw_step(span("let x"), vec![("n", Value::pointer(Path::heap(0)))]),
            raw_step(span("v.push(0)"), vec![]),
        ],
        ..RawTrace::default()
    }));
    let (orch, _widget, reports) = build(Scripted::new(vec![reply]), document(), EditorConfig::default());

    let outcome = orch.render(RenderRequest::interpreter(InterpreterConfig::default())).await;

    assert!(matches!(outcome, RenderOutcome::Applied(s) if s.applied == 3 && s.failed == 0));
    assert_eq!(orch.step_count(), 3);
    {
        let reports = reports.borrow();
        assert_eq!(reports.len(), 1);
        let EditorError::DanglingReference { step, .. } = &reports[0] else {
            panic!("expected a dangling reference, got {:?}", reports[0]);
        };
        assert_eq!(*step, 1);
    }

    let Some(view) = orch.seek_step(1) else {
        panic!("step 1 should be renderable");
    };
    let (name, local) = &view.frames[0].locals[0];
    assert_eq!(name, "n");
    assert!(matches!(local, ValueView::Dangling { path, .. } if *path == Path::heap(0)));
}

#[tokio::test]
async fn test_out_of_bounds_step_is_rejected() {
    let past_end = CharRange::new(SOURCE.len(), SOURCE.len() + 5);
    let reply = encoded(CommandResult::Interpreter(RawTrace {
        steps: vec![
            raw_step(span("let mut v"), vec![]),
            raw_step(past_end, vec![]),
            raw_step(span("v.push(0)"), vec![]),
        ],
        ..RawTrace::default()
    }));
    let (orch, _widget, reports) = build(Scripted::new(vec![reply]), document(), EditorConfig::default());

    let outcome = orch.render(RenderRequest::interpreter(InterpreterConfig::default())).await;

    assert!(matches!(outcome, RenderOutcome::Applied(s) if s.applied == 2 && s.failed == 1));
    assert_eq!(orch.step_count(), 2);
    assert_eq!(orch.with_overlays(|s| s.layer(LayerId::InterpMarkers).len()), 2);
    let reports = reports.borrow();
    assert_eq!(reports.len(), 1);
    let EditorError::RejectedStep(error) = &reports[0] else {
        panic!("expected a rejected step, got {:?}", reports[0]);
    };
    assert!(matches!(error, TraceError::OutOfBounds { step: 1, .. }));
}

#[tokio::test]
async fn test_faulting_program_keeps_its_result() {
    let fault = TraceResult::Error {
        message: "Undefined Behavior: pointer to alloc1 was dereferenced after this allocation got freed"
            .to_string(),
        range: Some(span("*n")),
    };
    let reply = encoded(CommandResult::Interpreter(RawTrace {
        steps: vec![raw_step(span("let mut v"), vec![]), raw_step(span("v.push(0)"), vec![])],
        result: fault.clone(),
    }));
    let (orch, _widget, reports) = build(Scripted::new(vec![reply]), document(), EditorConfig::default());

    let outcome = orch.render(RenderRequest::interpreter(InterpreterConfig::default())).await;

    assert!(matches!(outcome, RenderOutcome::Applied(s) if s.applied == 2));
    assert_eq!(orch.trace_result(), Some(fault));
    assert!(reports.borrow().is_empty());

    orch.document_changed();
    assert_eq!(orch.trace_result(), None);
}

#[tokio::test]
async fn test_disabled_layer_is_emptied_by_next_render() {
    let reply = || encoded(CommandResult::Permissions(vec![Ok(analysis())]));
    let (orch, _widget, _reports) = build(Scripted::new(vec![reply(), reply()]), document(), EditorConfig::default());

    orch.render(RenderRequest::permissions(PermissionsConfig::default())).await;
    assert_eq!(orch.with_overlays(|s| s.layer(LayerId::Boundaries).len()), 1);

    let config = PermissionsConfig {
        boundaries: false,
        ..PermissionsConfig::default()
    };
    let outcome = orch.render(RenderRequest::permissions(config)).await;

    assert!(matches!(outcome, RenderOutcome::Applied(_)));
    assert!(orch.with_overlays(|s| s.layer(LayerId::Boundaries).is_empty()));
    assert_eq!(orch.with_overlays(|s| s.units(LayerId::LoanFacts)), vec![0]);
}
