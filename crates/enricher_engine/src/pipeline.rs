use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use enricher_core::{
    apply_result, update, AcceptancePattern, Effect, EnrichmentResult, FetchError, FieldNames,
    FormState, Generation, Msg, Notice, PipelineState, Ticket,
};
use enricher_logging::{enrich_debug, enrich_error, enrich_info, enrich_trace, enrich_warn};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::client::EnrichmentClient;
use crate::scope::{bind_scope, Scope, ScopeGuard};

/// Form storage shared between the owning form and the pipeline.
pub type SharedForm = Arc<Mutex<dyn FormState + Send>>;

pub trait NotificationSink: Send + Sync {
    fn notify(&self, notice: Notice);
}

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub debounce: Duration,
    pub pattern: AcceptancePattern,
    pub fields: FieldNames,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(1000),
            pattern: AcceptancePattern::default(),
            fields: FieldNames::default(),
        }
    }
}

enum Command {
    Edited(String),
    FetchNow(String),
    TimerElapsed(Ticket),
    Settled {
        generation: Generation,
        result: Result<EnrichmentResult, FetchError>,
    },
}

/// Handle to a running enrichment pipeline.
///
/// All pipeline state lives in one task; edits, timer expiries and request
/// settlements are queued to it and handled one at a time. Dropping the
/// handle tears the pipeline down.
pub struct EnrichmentPipeline {
    cmd_tx: mpsc::UnboundedSender<Command>,
    in_flight: Arc<AtomicBool>,
    form: SharedForm,
    guard: ScopeGuard,
}

impl EnrichmentPipeline {
    /// Start the pipeline on the current tokio runtime.
    pub fn spawn(
        settings: PipelineSettings,
        client: Arc<dyn EnrichmentClient>,
        form: SharedForm,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        let guard = bind_scope();
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let in_flight = Arc::new(AtomicBool::new(false));

        let worker = Worker {
            state: PipelineState::new(settings.pattern.clone()),
            settings,
            client,
            form: form.clone(),
            sink,
            scope: guard.scope().clone(),
            cmd_tx: cmd_tx.clone(),
            in_flight: in_flight.clone(),
            timer: None,
            request: None,
        };
        tokio::spawn(worker.run(cmd_rx));

        Self {
            cmd_tx,
            in_flight,
            form,
            guard,
        }
    }

    /// The trigger field changed. The form must already hold `value`.
    pub fn on_trigger_edited(&self, value: impl Into<String>) {
        self.send(Command::Edited(value.into()));
    }

    /// Fetch immediately, without waiting for the quiet period.
    pub fn fetch_now(&self, value: impl Into<String>) {
        self.send(Command::FetchNow(value.into()));
    }

    pub fn in_flight(&self) -> bool {
        self.is_live() && self.in_flight.load(Ordering::Acquire)
    }

    pub fn is_live(&self) -> bool {
        self.guard.is_live()
    }

    pub fn scope(&self) -> &Scope {
        self.guard.scope()
    }

    /// Cancel the pending timer and the active request. Idempotent.
    ///
    /// Waits for a merge already writing to the form; once this returns the
    /// form is not touched again.
    pub fn teardown(&self) {
        if !self.guard.is_live() {
            return;
        }
        enrich_debug!("Tearing down enrichment pipeline");
        let _form = self.form.lock().unwrap_or_else(PoisonError::into_inner);
        self.guard.teardown();
    }

    fn send(&self, command: Command) {
        if self.cmd_tx.send(command).is_err() {
            enrich_debug!("Enrichment pipeline already stopped; input ignored");
        }
    }
}

impl Drop for EnrichmentPipeline {
    fn drop(&mut self) {
        self.teardown();
    }
}

struct Worker {
    state: PipelineState,
    settings: PipelineSettings,
    client: Arc<dyn EnrichmentClient>,
    form: SharedForm,
    sink: Arc<dyn NotificationSink>,
    scope: Scope,
    cmd_tx: mpsc::UnboundedSender<Command>,
    in_flight: Arc<AtomicBool>,
    timer: Option<(Ticket, CancellationToken)>,
    request: Option<(Generation, CancellationToken)>,
}

impl Worker {
    async fn run(mut self, mut cmd_rx: mpsc::UnboundedReceiver<Command>) {
        let scope = self.scope.clone();
        loop {
            tokio::select! {
                biased;
                _ = scope.ended() => break,
                command = cmd_rx.recv() => match command {
                    Some(command) => self.handle(command),
                    None => break,
                },
            }
        }
        scope.teardown();
        self.step(Msg::TornDown);
        enrich_debug!("Enrichment pipeline stopped");
    }

    fn handle(&mut self, command: Command) {
        let msg = match command {
            Command::Edited(value) => {
                if !self.settings.pattern.matches(&value) {
                    enrich_debug!("Edit is not a recognized link (len={})", value.len());
                }
                Msg::TriggerEdited(value)
            }
            Command::FetchNow(value) => Msg::FetchRequested(value),
            Command::TimerElapsed(ticket) => {
                if self.timer.as_ref().is_some_and(|(t, _)| *t == ticket) {
                    self.timer = None;
                }
                Msg::DebounceElapsed {
                    ticket,
                    current: self.read_trigger(),
                }
            }
            Command::Settled { generation, result } => {
                if let Err(err) = &result {
                    if !err.is_cancelled() {
                        enrich_warn!("Enrichment generation={} failed: {}", generation, err);
                    }
                }
                if self.request.as_ref().is_some_and(|(g, _)| *g == generation) {
                    self.request = None;
                }
                Msg::RequestSettled { generation, result }
            }
        };
        self.step(msg);
    }

    fn step(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;
        enrich_trace!("Running {} effect(s)", effects.len());
        for effect in effects {
            self.run_effect(effect);
        }
        self.in_flight.store(self.state.in_flight(), Ordering::Release);
    }

    fn run_effect(&mut self, effect: Effect) {
        match effect {
            Effect::ScheduleDebounce { ticket } => self.schedule_timer(ticket),
            Effect::CancelDebounce { ticket } => {
                if let Some((pending, token)) = self.timer.take() {
                    if pending != ticket {
                        enrich_warn!("Cancelling timer {} while {} was requested", pending, ticket);
                    }
                    token.cancel();
                }
            }
            Effect::StartRequest { generation, value } => self.start_request(generation, value),
            Effect::CancelRequest { generation } => {
                if let Some((active, token)) = self.request.take() {
                    enrich_debug!("Cancelling request generation={}", active);
                    if active != generation {
                        enrich_warn!(
                            "Cancelled generation {} while {} was requested",
                            active,
                            generation
                        );
                    }
                    token.cancel();
                }
            }
            Effect::ApplyResult { generation, result } => self.apply(generation, &result),
            Effect::Notify(notice) => self.notify(notice),
        }
    }

    fn schedule_timer(&mut self, ticket: Ticket) {
        let token = self.scope.child_token();
        if let Some((_, previous)) = self.timer.replace((ticket, token.clone())) {
            previous.cancel();
        }
        let delay = self.settings.debounce;
        let cmd_tx = self.cmd_tx.clone();
        enrich_debug!("Debounce timer {} scheduled for {:?}", ticket, delay);

        tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = token.cancelled() => {}
                _ = tokio::time::sleep(delay) => {
                    let _ = cmd_tx.send(Command::TimerElapsed(ticket));
                }
            }
        });
    }

    fn start_request(&mut self, generation: Generation, value: String) {
        let token = self.scope.child_token();
        self.request = Some((generation, token.clone()));
        let client = self.client.clone();
        let cmd_tx = self.cmd_tx.clone();
        enrich_info!(
            "Dispatching enrichment generation={} trigger_len={}",
            generation,
            value.len()
        );

        tokio::spawn(async move {
            let result = client.fetch(&value, &token).await;
            let _ = cmd_tx.send(Command::Settled { generation, result });
        });
    }

    fn apply(&mut self, generation: Generation, result: &EnrichmentResult) {
        // Liveness is checked under the form lock that `teardown` also takes.
        let outcome = match self.form.lock() {
            Ok(_) if !self.scope.is_live() => {
                enrich_debug!("Scope ended; dropping result of generation {}", generation);
                return;
            }
            Ok(mut form) => apply_result(result, &mut *form, &self.settings.fields),
            Err(_) => {
                enrich_error!(
                    "Form state is poisoned; dropping result of generation {}",
                    generation
                );
                return;
            }
        };
        enrich_info!("Enrichment generation={} settled: {:?}", generation, outcome);
        if let Some(notice) = outcome.notice() {
            self.notify(notice);
        }
    }

    fn notify(&self, notice: Notice) {
        if self.scope.is_live() {
            self.sink.notify(notice);
        }
    }

    fn read_trigger(&self) -> Option<String> {
        match self.form.lock() {
            Ok(form) => form
                .get_field(&self.settings.fields.trigger)
                .map(ToOwned::to_owned),
            Err(_) => {
                enrich_error!("Form state is poisoned; treating trigger as empty");
                None
            }
        }
    }
}
