//! Enricher core: link matching, merge policy and the pure pipeline state machine.
mod effect;
mod fields;
mod matcher;
mod merge;
mod msg;
mod outcome;
mod state;
mod update;

pub use effect::Effect;
pub use fields::{
    EnrichedFields, EnrichmentResult, Field, FieldNames, ImageRef, MANUAL_EXTRACT_PREFIX,
};
pub use matcher::AcceptancePattern;
pub use merge::{apply_result, merge_fields, FormRecord, FormState, MergeReport};
pub use msg::Msg;
pub use outcome::{FailureKind, FetchError, Notice, NoticeKind, Outcome};
pub use state::{Generation, PendingDispatch, PipelineState, Ticket};
pub use update::update;
