use crate::AcceptancePattern;

/// Monotonic request identifier; only the current generation may apply effects.
pub type Generation = u64;
/// Identifier of one debounce timer.
pub type Ticket = u64;

/// A qualifying edit waiting out the quiet period.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingDispatch {
    pub ticket: Ticket,
    pub captured: String,
}

/// Everything the pipeline remembers between callbacks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineState {
    pattern: AcceptancePattern,
    last_handled: Option<String>,
    pending: Option<PendingDispatch>,
    next_ticket: Ticket,
    generation: Generation,
    active: Option<Generation>,
    in_flight: bool,
    live: bool,
}

impl Default for PipelineState {
    fn default() -> Self {
        Self::new(AcceptancePattern::default())
    }
}

impl PipelineState {
    pub fn new(pattern: AcceptancePattern) -> Self {
        Self {
            pattern,
            last_handled: None,
            pending: None,
            next_ticket: 1,
            generation: 0,
            active: None,
            in_flight: false,
            live: true,
        }
    }

    pub fn pattern(&self) -> &AcceptancePattern {
        &self.pattern
    }

    pub fn last_handled(&self) -> Option<&str> {
        self.last_handled.as_deref()
    }

    pub fn pending(&self) -> Option<&PendingDispatch> {
        self.pending.as_ref()
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Generation of the request still awaiting settlement, if any.
    pub fn active(&self) -> Option<Generation> {
        self.active
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn is_live(&self) -> bool {
        self.live
    }

    pub(crate) fn set_last_handled(&mut self, value: String) {
        self.last_handled = Some(value);
    }

    pub(crate) fn take_pending(&mut self) -> Option<PendingDispatch> {
        self.pending.take()
    }

    pub(crate) fn start_pending(&mut self, captured: String) -> Ticket {
        let ticket = self.next_ticket;
        self.next_ticket += 1;
        self.pending = Some(PendingDispatch { ticket, captured });
        ticket
    }

    /// Advance to a fresh generation, returning it with the one it supersedes.
    pub(crate) fn begin_request(&mut self) -> (Generation, Option<Generation>) {
        self.generation += 1;
        let superseded = self.active.replace(self.generation);
        self.in_flight = true;
        (self.generation, superseded)
    }

    /// True when `generation` is the unsettled current request of a live scope.
    pub(crate) fn accepts_settlement(&self, generation: Generation) -> bool {
        self.live && generation == self.generation && self.active == Some(generation)
    }

    pub(crate) fn finish_request(&mut self) {
        self.active = None;
        self.in_flight = false;
    }

    pub(crate) fn shut_down(&mut self) -> (Option<PendingDispatch>, Option<Generation>) {
        self.live = false;
        self.in_flight = false;
        (self.pending.take(), self.active.take())
    }
}
