use crate::{EnrichmentResult, FetchError, Generation, Ticket};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// The trigger field changed to this value.
    TriggerEdited(String),
    /// User asked for an immediate fetch, skipping the quiet period.
    FetchRequested(String),
    /// A debounce timer elapsed. `current` is the trigger field re-read at fire time.
    DebounceElapsed {
        ticket: Ticket,
        current: Option<String>,
    },
    /// The enrichment client settled a request.
    RequestSettled {
        generation: Generation,
        result: Result<EnrichmentResult, FetchError>,
    },
    /// The owning scope ended.
    TornDown,
}
