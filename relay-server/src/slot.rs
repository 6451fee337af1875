//! Per-actor policy delivery.
use relay_core::Env;
use std::sync::{Arc, Condvar, Mutex};

/// A pending inference request: the actor's current observation plus the
/// slot the policy must be delivered to.
pub(crate) struct PredictionRequest<E: Env> {
    pub observation: E::Obs,
    pub slot: Arc<PolicySlot<E>>,
}

struct SlotState<E: Env> {
    observation: Option<E::Obs>,
    policy: Vec<f32>,
    stop: bool,
}

/// Blocks an actor between submitting an observation and receiving its
/// policy vector.
///
/// The actor moves its observation into the prediction request; the
/// predictor returns it here together with the policy, so ownership makes a
/// round trip instead of the observation being cloned or borrowed across
/// threads.
pub(crate) struct PolicySlot<E: Env> {
    state: Mutex<SlotState<E>>,
    cond: Condvar,
}

impl<E: Env> PolicySlot<E> {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SlotState {
                observation: None,
                policy: Vec::new(),
                stop: false,
            }),
            cond: Condvar::new(),
        }
    }

    /// Delivers a policy vector and hands the observation back to the actor.
    pub fn deliver(&self, observation: E::Obs, policy: &[f32]) {
        let mut state = self.state.lock().unwrap();
        debug_assert!(state.observation.is_none());
        state.policy.clear();
        state.policy.extend_from_slice(policy);
        state.observation = Some(observation);
        drop(state);
        self.cond.notify_one();
    }

    /// Blocks until a policy arrives, copying it into `policy` and returning
    /// the observation it was computed for.
    ///
    /// Returns `None` on stop.
    pub fn await_policy(&self, policy: &mut Vec<f32>) -> Option<E::Obs> {
        let mut state = self.state.lock().unwrap();
        loop {
            if state.stop {
                return None;
            }
            if let Some(observation) = state.observation.take() {
                policy.clear();
                policy.extend_from_slice(&state.policy);
                return Some(observation);
            }
            state = self.cond.wait(state).unwrap();
        }
    }

    /// Stops the slot, releasing a blocked actor.
    pub fn stop(&self) {
        let mut state = self.state.lock().unwrap();
        state.stop = true;
        drop(state);
        self.cond.notify_one();
    }
}
