use crate::{Effect, FinishReason, HarvestState, Msg};

/// Pure update function: applies a message to the harvest state and returns
/// the effects the driver must perform, in order.
pub fn update(mut state: HarvestState, msg: Msg) -> (HarvestState, Vec<Effect>) {
    if !state.is_running() {
        return (state, Vec::new());
    }

    let effects = match msg {
        Msg::BatchQueried(batch) => {
            let stalled = state.observe_batch(batch);
            let mut effects = vec![Effect::Scroll];
            if stalled {
                state.finish(FinishReason::Stalled);
                effects.push(Effect::Finish {
                    reason: FinishReason::Stalled,
                });
            }
            effects
        }
        Msg::BatchStale => {
            // Staleness is not a growth signal: no scroll, no counter change.
            state.note_stale();
            Vec::new()
        }
        Msg::QueryFailed(message) => {
            let reason = FinishReason::QueryFailed(message);
            state.finish(reason.clone());
            vec![Effect::Finish { reason }]
        }
        Msg::CancelRequested => {
            state.finish(FinishReason::Cancelled);
            vec![Effect::Finish {
                reason: FinishReason::Cancelled,
            }]
        }
    };

    (state, effects)
}
