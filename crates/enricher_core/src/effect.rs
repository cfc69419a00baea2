use crate::{EnrichmentResult, Generation, Notice, Ticket};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    ScheduleDebounce { ticket: Ticket },
    CancelDebounce { ticket: Ticket },
    StartRequest { generation: Generation, value: String },
    CancelRequest { generation: Generation },
    /// Merge into the target record and report, if the scope is still live.
    ApplyResult {
        generation: Generation,
        result: EnrichmentResult,
    },
    Notify(Notice),
}
