//! Parking slot between a batching worker and the coordinator.
use std::sync::{Condvar, Mutex};

struct GateState<J> {
    completed: Option<J>,
    stop: bool,
}

/// Hands a job's buffers back to their owning worker when the agent call
/// completes.
///
/// A predictor or trainer publishes its batch to the coordinator and parks
/// here; the completion callback of the agent call posts the batch back and
/// wakes the worker, which reuses the buffers for its next iteration. The
/// gate doubles as the worker's shutdown wake-up point while parked.
pub(crate) struct JobGate<J> {
    state: Mutex<GateState<J>>,
    cond: Condvar,
}

impl<J> JobGate<J> {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(GateState {
                completed: None,
                stop: false,
            }),
            cond: Condvar::new(),
        }
    }

    /// Posts the completed job and wakes the parked worker.
    pub fn complete(&self, job: J) {
        let mut state = self.state.lock().unwrap();
        debug_assert!(state.completed.is_none());
        state.completed = Some(job);
        drop(state);
        self.cond.notify_one();
    }

    /// Blocks until the job comes back or the gate is stopped.
    ///
    /// Returns `None` on stop.
    pub fn park(&self) -> Option<J> {
        let mut state = self.state.lock().unwrap();
        loop {
            if state.stop {
                return None;
            }
            if let Some(job) = state.completed.take() {
                return Some(job);
            }
            state = self.cond.wait(state).unwrap();
        }
    }

    /// Stops the gate, releasing a parked worker.
    pub fn stop(&self) {
        let mut state = self.state.lock().unwrap();
        state.stop = true;
        drop(state);
        self.cond.notify_one();
    }
}
