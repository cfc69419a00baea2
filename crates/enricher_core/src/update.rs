use crate::{Effect, Msg, Outcome, PipelineState};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: PipelineState, msg: Msg) -> (PipelineState, Vec<Effect>) {
    if !state.is_live() {
        // Nothing survives teardown, including a repeated teardown.
        return (state, Vec::new());
    }

    let effects = match msg {
        Msg::TriggerEdited(value) => {
            if state.last_handled() == Some(value.as_str()) {
                return (state, Vec::new());
            }
            state.set_last_handled(value.clone());

            let mut effects = Vec::with_capacity(2);
            if let Some(pending) = state.take_pending() {
                effects.push(Effect::CancelDebounce {
                    ticket: pending.ticket,
                });
            }
            if state.pattern().matches(&value) {
                let ticket = state.start_pending(value);
                effects.push(Effect::ScheduleDebounce { ticket });
            }
            effects
        }
        Msg::FetchRequested(value) => {
            let mut effects = Vec::with_capacity(3);
            if let Some(pending) = state.take_pending() {
                effects.push(Effect::CancelDebounce {
                    ticket: pending.ticket,
                });
            }
            if state.pattern().matches(&value) {
                state.set_last_handled(value.clone());
                effects.extend(dispatch(&mut state, value));
            }
            effects
        }
        Msg::DebounceElapsed { ticket, current } => {
            let is_current_timer = state.pending().is_some_and(|p| p.ticket == ticket);
            if !is_current_timer {
                return (state, Vec::new());
            }
            match state.take_pending() {
                Some(pending) if current.as_deref() == Some(pending.captured.as_str()) => {
                    dispatch(&mut state, pending.captured)
                }
                _ => Vec::new(),
            }
        }
        Msg::RequestSettled { generation, result } => {
            if !state.accepts_settlement(generation) {
                return (state, Vec::new());
            }
            let effects = match result {
                Ok(result) => vec![Effect::ApplyResult { generation, result }],
                Err(err) => Outcome::from_fetch_error(&err)
                    .notice()
                    .map(Effect::Notify)
                    .into_iter()
                    .collect(),
            };
            state.finish_request();
            effects
        }
        Msg::TornDown => {
            let (pending, active) = state.shut_down();
            let mut effects = Vec::with_capacity(2);
            if let Some(pending) = pending {
                effects.push(Effect::CancelDebounce {
                    ticket: pending.ticket,
                });
            }
            if let Some(generation) = active {
                effects.push(Effect::CancelRequest { generation });
            }
            effects
        }
    };

    (state, effects)
}

fn dispatch(state: &mut PipelineState, value: String) -> Vec<Effect> {
    let (generation, superseded) = state.begin_request();
    let mut effects = Vec::with_capacity(2);
    if let Some(previous) = superseded {
        effects.push(Effect::CancelRequest {
            generation: previous,
        });
    }
    effects.push(Effect::StartRequest { generation, value });
    effects
}
