//! Render orchestration.
//!
//! # Design
//!
//! One render walks **Idle → Requesting → Applying → Idle**. The only
//! suspension point is the backend call; state lives behind a mutex that is
//! never held across it, so [`Orchestrator::document_changed`] can run while a
//! render is waiting. Each document change bumps an epoch, and a render whose
//! epoch or fingerprint no longer matches on return is discarded before it
//! touches any overlay.
//!
//! Widget and sink callbacks run after the state lock is released.

use std::fmt;

use lens_ir::{CharRange, LineIndex, LinePos, Revision};
use lens_overlay::{LayerId, OverlayStore, Transaction};
use lens_protocol::{
    issue, Backend, BoundariesOptions, Command, CommandOptions, CommandResult, InfraError, ProtocolError, Request,
};
use lens_trace::view::{render_step, StepView};
use lens_trace::{build_trace, RawTrace, TracePlayer, TraceResult};
use parking_lot::Mutex;
use rustc_hash::FxHashSet;

use crate::convert::{self, Converted};
use crate::{DocumentHost, EditorConfig, EditorError, EditorWidget, ErrorSink, InterpreterConfig, PermissionsConfig};

/// Where the orchestrator is in a render.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    Requesting(Command),
    Applying(Command),
    /// An infrastructure error is being reported.
    Failed(Command),
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Idle => f.write_str("idle"),
            Phase::Requesting(c) => write!(f, "requesting {c}"),
            Phase::Applying(c) => write!(f, "applying {c}"),
            Phase::Failed(c) => write!(f, "failed {c}"),
        }
    }
}

/// Lines to fold away once a render lands.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Annotations {
    pub hidden_lines: Vec<LinePos>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum RenderKind {
    Permissions(PermissionsConfig),
    Boundaries,
    Interpreter(InterpreterConfig),
}

impl RenderKind {
    fn command(&self) -> Command {
        match self {
            RenderKind::Permissions(_) => Command::Permissions,
            RenderKind::Boundaries => Command::Boundaries,
            RenderKind::Interpreter(_) => Command::Interpreter,
        }
    }
}

/// A command to run plus what to do with its result.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderRequest {
    kind: RenderKind,
    annotations: Annotations,
}

impl RenderRequest {
    pub fn permissions(config: PermissionsConfig) -> Self {
        Self::of(RenderKind::Permissions(config))
    }

    pub fn boundaries() -> Self {
        Self::of(RenderKind::Boundaries)
    }

    pub fn interpreter(config: InterpreterConfig) -> Self {
        Self::of(RenderKind::Interpreter(config))
    }

    fn of(kind: RenderKind) -> Self {
        RenderRequest {
            kind,
            annotations: Annotations::default(),
        }
    }

    #[must_use]
    pub fn with_annotations(mut self, annotations: Annotations) -> Self {
        self.annotations = annotations;
        self
    }

    pub fn command(&self) -> Command {
        self.kind.command()
    }

    fn options(&self) -> CommandOptions {
        match &self.kind {
            RenderKind::Permissions(config) => config.options().into(),
            RenderKind::Boundaries => BoundariesOptions::default().into(),
            RenderKind::Interpreter(config) => config.options().into(),
        }
    }
}

/// What an applied render produced.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RenderSummary {
    /// Revision the result was computed and applied at.
    pub revision: Revision,
    /// Units (or trace steps) that made it into the overlays.
    pub applied: usize,
    /// Units (or trace steps) reported and skipped.
    pub failed: usize,
}

/// How a call to [`Orchestrator::render`] ended.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RenderOutcome {
    Applied(RenderSummary),
    /// Another render was in flight; this one was dropped.
    Busy,
    /// The document changed while waiting; the result was discarded.
    Stale,
    /// The backend could not build the document; reported, nothing applied.
    BuildFailed,
    /// No usable response; reported, nothing applied.
    Failed,
}

#[derive(Default)]
struct State {
    phase: Phase,
    epoch: u64,
    store: OverlayStore,
    player: TracePlayer,
    /// How the last applied trace ended.
    result: Option<TraceResult>,
    hidden: FxHashSet<CharRange>,
}

/// Widget calls and reports collected under the lock, delivered after it.
#[derive(Default)]
struct Delivery {
    transaction: Option<Transaction>,
    step_index: Option<Option<usize>>,
    hide: Vec<CharRange>,
    errors: Vec<EditorError>,
}

/// Builder for [`Orchestrator`].
pub struct OrchestratorBuilder<B, D> {
    backend: B,
    document: D,
    widget: Option<Box<dyn EditorWidget>>,
    sink: Option<Box<dyn ErrorSink>>,
    config: EditorConfig,
}

impl<B: Backend, D: DocumentHost> OrchestratorBuilder<B, D> {
    pub fn new(backend: B, document: D) -> Self {
        OrchestratorBuilder {
            backend,
            document,
            widget: None,
            sink: None,
            config: EditorConfig::default(),
        }
    }

    /// Set the widget receiving transactions. Defaults to one that ignores them.
    #[must_use]
    pub fn widget(mut self, widget: impl EditorWidget + 'static) -> Self {
        self.widget = Some(Box::new(widget));
        self
    }

    /// Set where errors go. Defaults to a `tracing::warn!` per error.
    #[must_use]
    pub fn error_sink(mut self, sink: impl ErrorSink + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    #[must_use]
    pub fn config(mut self, config: EditorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Orchestrator<B, D> {
        Orchestrator {
            backend: self.backend,
            document: self.document,
            widget: self.widget.unwrap_or_else(|| Box::new(NullWidget)),
            sink: self.sink.unwrap_or_else(|| Box::new(LogSink)),
            config: self.config,
            state: Mutex::new(State::default()),
        }
    }
}

struct NullWidget;

impl EditorWidget for NullWidget {
    fn dispatch(&self, _transaction: Transaction) {}
    fn set_step_index(&self, _index: Option<usize>) {}
    fn hide_range(&self, _range: CharRange) {}
}

struct LogSink;

impl ErrorSink for LogSink {
    fn report(&self, error: EditorError) {
        tracing::warn!(kind = error.kind(), "{error}");
    }
}

/// Drives backend renders into the overlay layers of one document.
pub struct Orchestrator<B, D> {
    backend: B,
    document: D,
    widget: Box<dyn EditorWidget>,
    sink: Box<dyn ErrorSink>,
    config: EditorConfig,
    state: Mutex<State>,
}

impl<B: Backend, D: DocumentHost> Orchestrator<B, D> {
    pub fn builder(backend: B, document: D) -> OrchestratorBuilder<B, D> {
        OrchestratorBuilder::new(backend, document)
    }

    pub fn phase(&self) -> Phase {
        self.state.lock().phase
    }

    pub fn document(&self) -> &D {
        &self.document
    }

    /// Run `f` on the current overlay contents.
    pub fn with_overlays<R>(&self, f: impl FnOnce(&OverlayStore) -> R) -> R {
        f(&self.state.lock().store)
    }

    /// Run one command and apply its result.
    #[tracing::instrument(level = "debug", skip_all, fields(command = %request.command()))]
    pub async fn render(&self, request: RenderRequest) -> RenderOutcome {
        let command = request.command();
        let epoch = {
            let mut state = self.state.lock();
            if let Phase::Requesting(inflight) = state.phase {
                tracing::debug!(inflight = %inflight, "render in flight, dropping request");
                return RenderOutcome::Busy;
            }
            state.phase = Phase::Requesting(command);
            state.epoch
        };

        let text = self.document.text();
        let fingerprint = self.document.fingerprint();
        let document_len = text.chars().count();
        let hidden = self.hidden_ranges(&request.annotations, &text);
        let wire = Request::new(text, request.options());

        let result = issue(&self.backend, &wire, self.config.deadline).await;

        let mut delivery = Delivery::default();
        let outcome = {
            let mut state = self.state.lock();
            if state.epoch != epoch {
                tracing::debug!("document changed while requesting, discarding result");
                return RenderOutcome::Stale;
            }
            if !fingerprint.matches(&self.document.fingerprint()) {
                tracing::debug!(requested = %fingerprint.revision, "fingerprint mismatch, discarding result");
                state.phase = Phase::Idle;
                return RenderOutcome::Stale;
            }

            match result {
                Err(error) => {
                    state.phase = Phase::Failed(command);
                    delivery.errors.push(EditorError::Infrastructure(error));
                    RenderOutcome::Failed
                }
                Ok(Err(error)) => {
                    state.phase = Phase::Applying(command);
                    delivery.errors.push(EditorError::Build(error));
                    RenderOutcome::BuildFailed
                }
                Ok(Ok(payload)) => {
                    state.phase = Phase::Applying(command);
                    match self.apply(
                        &mut state,
                        &request.kind,
                        payload,
                        fingerprint.revision,
                        document_len,
                        &mut delivery,
                    ) {
                        Ok(summary) => {
                            for range in hidden {
                                if state.hidden.insert(range) {
                                    delivery.hide.push(range);
                                }
                            }
                            RenderOutcome::Applied(summary)
                        }
                        Err(error) => {
                            state.phase = Phase::Failed(command);
                            delivery.errors.push(EditorError::Infrastructure(InfraError::Malformed(error)));
                            RenderOutcome::Failed
                        }
                    }
                }
            }
        };

        self.deliver(delivery);
        self.state.lock().phase = Phase::Idle;
        outcome
    }

    fn apply(
        &self,
        state: &mut State,
        kind: &RenderKind,
        payload: CommandResult,
        computed_at: Revision,
        document_len: usize,
        delivery: &mut Delivery,
    ) -> Result<RenderSummary, ProtocolError> {
        let command = payload.command();
        let mut transaction = Transaction::new(computed_at);
        let (applied, failed) = match (kind, payload) {
            (RenderKind::Permissions(config), CommandResult::Permissions(units)) => {
                let converted = convert::permissions(units, *config);
                self.apply_units(state, command, converted, computed_at, &mut transaction, delivery)
            }
            (RenderKind::Boundaries, CommandResult::Boundaries(units)) => {
                let converted = convert::boundaries(units);
                self.apply_units(state, command, converted, computed_at, &mut transaction, delivery)
            }
            (RenderKind::Interpreter(_), CommandResult::Interpreter(raw)) => {
                self.apply_trace(state, raw, computed_at, document_len, &mut transaction, delivery)
            }
            (kind, other) => {
                tracing::warn!(expected = %kind.command(), found = %other.command(), "payload does not match request");
                return Err(ProtocolError::Mismatch {
                    expected: kind.command(),
                    found: other.command(),
                });
            }
        };
        if !transaction.is_empty() {
            delivery.transaction = Some(transaction);
        }
        Ok(RenderSummary {
            revision: computed_at,
            applied,
            failed,
        })
    }

    fn apply_units(
        &self,
        state: &mut State,
        command: Command,
        converted: Converted,
        computed_at: Revision,
        transaction: &mut Transaction,
        delivery: &mut Delivery,
    ) -> (usize, usize) {
        let failed = converted.failed.len();
        for (unit, error) in converted.failed {
            delivery.errors.push(EditorError::Unit { command, unit, error });
        }
        for (layer, decorations) in converted.layers {
            transaction.push(state.store.replace_all(layer, decorations, computed_at, &self.document));
        }
        (converted.applied, failed)
    }

    fn apply_trace(
        &self,
        state: &mut State,
        raw: RawTrace,
        computed_at: Revision,
        document_len: usize,
        transaction: &mut Transaction,
        delivery: &mut Delivery,
    ) -> (usize, usize) {
        let trace = build_trace(raw, document_len);
        let failed = trace.rejected().len();
        delivery
            .errors
            .extend(trace.rejected().iter().cloned().map(EditorError::RejectedStep));
        delivery.errors.extend(
            trace
                .dangling_references()
                .into_iter()
                .map(|d| EditorError::DanglingReference {
                    step: d.step,
                    error: d.error,
                }),
        );

        let renderable = trace.renderable(self.document.char_len());
        let markers = convert::markers(&trace, &renderable);
        transaction.push(state.store.replace_all(LayerId::InterpMarkers, markers, computed_at, &self.document));

        state.result = Some(trace.result().clone());
        let first = renderable.first().copied();
        // Nothing fits the current document: keep no trace rather than a hidden cursor.
        state.player = match first {
            Some(first) => {
                let mut player = TracePlayer::new(trace);
                player.seek(first);
                player
            }
            None => TracePlayer::default(),
        };
        delivery.step_index = Some(first);
        (renderable.len(), failed)
    }

    fn hidden_ranges(&self, annotations: &Annotations, text: &str) -> Vec<CharRange> {
        if !self.config.hide_range_on_annotations || annotations.hidden_lines.is_empty() {
            return Vec::new();
        }
        let lines = LineIndex::new(text);
        annotations
            .hidden_lines
            .iter()
            .filter_map(|&line| {
                let range = lines.line_range(line);
                if range.is_none() {
                    tracing::debug!(line = line.line, "hidden line outside document");
                }
                range
            })
            .collect()
    }

    fn deliver(&self, delivery: Delivery) {
        if let Some(transaction) = delivery.transaction {
            self.widget.dispatch(transaction);
        }
        if let Some(index) = delivery.step_index {
            self.widget.set_step_index(index);
        }
        for range in delivery.hide {
            self.widget.hide_range(range);
        }
        for error in delivery.errors {
            self.sink.report(error);
        }
    }

    /// The document was edited: clear every layer and forget the trace.
    ///
    /// A render in flight is not cancelled, its result is discarded on return.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn document_changed(&self) {
        let mut transaction = Transaction::new(self.document.revision());
        {
            let mut state = self.state.lock();
            state.epoch += 1;
            state.phase = Phase::Idle;
            state.player.reset();
            state.result = None;
            state.hidden.clear();
            for effect in state.store.clear_all() {
                transaction.push(effect);
            }
        }
        self.widget.dispatch(transaction);
        self.widget.set_step_index(None);
    }

    /// Index of the trace step on display.
    pub fn current_step(&self) -> Option<usize> {
        self.state.lock().player.current()
    }

    /// How the program in the current trace finished, shown after its last step.
    pub fn trace_result(&self) -> Option<TraceResult> {
        self.state.lock().result.clone()
    }

    /// Number of steps in the current trace.
    pub fn step_count(&self) -> usize {
        self.state.lock().player.len()
    }

    /// Show step `index`.
    pub fn seek_step(&self, index: usize) -> Option<StepView> {
        self.move_cursor(|player| {
            player.seek(index);
        })
    }

    pub fn next_step(&self) -> Option<StepView> {
        self.move_cursor(|player| {
            player.next();
        })
    }

    pub fn prev_step(&self) -> Option<StepView> {
        self.move_cursor(|player| {
            player.prev();
        })
    }

    fn move_cursor(&self, f: impl FnOnce(&mut TracePlayer)) -> Option<StepView> {
        let (index, view) = {
            let mut state = self.state.lock();
            f(&mut state.player);
            let view = state.player.current_step().map(|step| render_step(step).0);
            (state.player.current(), view)
        };
        self.widget.set_step_index(index);
        view
    }
}
