use std::sync::Once;

use enricher_core::{
    update, EnrichedFields, EnrichmentResult, Effect, FailureKind, FetchError, Msg, Notice,
    NoticeKind, PipelineState,
};
use pretty_assertions::assert_eq;

const LINK_A: &str = "https://myfigurecollection.net/item/100";
const LINK_B: &str = "https://www.myfigurecollection.net/item/200";

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(enricher_logging::initialize_for_tests);
}

fn fetch(state: PipelineState, value: &str) -> (PipelineState, Vec<Effect>) {
    update(state, Msg::FetchRequested(value.to_string()))
}

fn settle(
    state: PipelineState,
    generation: u64,
    result: Result<EnrichmentResult, FetchError>,
) -> (PipelineState, Vec<Effect>) {
    update(state, Msg::RequestSettled { generation, result })
}

fn miku() -> EnrichmentResult {
    EnrichmentResult::populated(EnrichedFields {
        manufacturer: Some("Good Smile".to_string()),
        name: Some("Miku".to_string()),
        ..EnrichedFields::default()
    })
}

#[test]
fn new_dispatch_cancels_previous_request() {
    init_logging();
    let (state, _) = fetch(PipelineState::default(), LINK_A);
    let (state, effects) = fetch(state, LINK_B);

    assert_eq!(
        effects,
        vec![
            Effect::CancelRequest { generation: 1 },
            Effect::StartRequest {
                generation: 2,
                value: LINK_B.to_string(),
            },
        ]
    );
    assert_eq!(state.active(), Some(2));
    assert!(state.in_flight());
}

#[test]
fn current_settlement_is_applied_and_clears_in_flight() {
    init_logging();
    let (state, _) = fetch(PipelineState::default(), LINK_A);
    let (state, effects) = settle(state, 1, Ok(miku()));

    assert_eq!(
        effects,
        vec![Effect::ApplyResult {
            generation: 1,
            result: miku(),
        }]
    );
    assert!(!state.in_flight());
    assert_eq!(state.active(), None);
}

#[test]
fn late_settlement_of_superseded_request_is_discarded() {
    init_logging();
    let (state, _) = fetch(PipelineState::default(), LINK_A);
    let (state, _) = fetch(state, LINK_B);

    // D2 settles first, then D1 arrives late.
    let (state, effects) = settle(state, 2, Ok(EnrichmentResult::populated(EnrichedFields {
        name: Some("Rin".to_string()),
        ..EnrichedFields::default()
    })));
    assert_eq!(effects.len(), 1);

    let (state, effects) = settle(state, 1, Ok(miku()));
    assert!(effects.is_empty());
    assert!(!state.in_flight());
}

#[test]
fn stale_settlement_keeps_newer_request_in_flight() {
    init_logging();
    let (state, _) = fetch(PipelineState::default(), LINK_A);
    let (state, _) = fetch(state, LINK_B);

    let (state, effects) = settle(state, 1, Ok(miku()));
    assert!(effects.is_empty());
    assert!(state.in_flight());
    assert_eq!(state.active(), Some(2));
}

#[test]
fn duplicate_settlement_is_ignored() {
    init_logging();
    let (state, _) = fetch(PipelineState::default(), LINK_A);
    let (state, _) = settle(state, 1, Ok(miku()));
    let (_state, effects) = settle(state, 1, Ok(miku()));
    assert!(effects.is_empty());
}

#[test]
fn transport_failure_notifies_error() {
    init_logging();
    let (state, _) = fetch(PipelineState::default(), LINK_A);
    let (state, effects) = settle(
        state,
        1,
        Err(FetchError::new(FailureKind::Network, "connection refused")),
    );

    assert_eq!(effects.len(), 1);
    match &effects[0] {
        Effect::Notify(Notice { kind, .. }) => assert_eq!(*kind, NoticeKind::Error),
        other => panic!("unexpected effect {other:?}"),
    }
    assert!(!state.in_flight());
}

#[test]
fn cancelled_settlement_is_silent() {
    init_logging();
    let (state, _) = fetch(PipelineState::default(), LINK_A);
    let (state, effects) = settle(state, 1, Err(FetchError::cancelled()));

    assert!(effects.is_empty());
    assert!(!state.in_flight());
}

#[test]
fn teardown_cancels_pending_and_active() {
    init_logging();
    let (state, _) = fetch(PipelineState::default(), LINK_A);
    let (state, _) = update(state, Msg::TriggerEdited(LINK_B.to_string()));
    let (state, effects) = update(state, Msg::TornDown);

    assert_eq!(
        effects,
        vec![
            Effect::CancelDebounce { ticket: 1 },
            Effect::CancelRequest { generation: 1 },
        ]
    );
    assert!(!state.is_live());
    assert!(!state.in_flight());

    // Idempotent, and nothing applies afterwards.
    let (state, effects) = update(state, Msg::TornDown);
    assert!(effects.is_empty());
    let (state, effects) = settle(state, 1, Ok(miku()));
    assert!(effects.is_empty());
    let (_state, effects) = update(state, Msg::TriggerEdited(LINK_A.to_string()));
    assert!(effects.is_empty());
}

#[test]
fn teardown_with_nothing_pending_is_quiet() {
    init_logging();
    let (state, effects) = update(PipelineState::default(), Msg::TornDown);
    assert!(effects.is_empty());
    assert!(!state.is_live());
}
