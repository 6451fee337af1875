//! Work published to the coordinator.
use crate::gate::JobGate;
use relay_core::{Env, PredictionBatch, TrainingBatch};
use std::sync::{Arc, Condvar, Mutex};

/// A prediction batch ready for the agent, with the gate of its worker.
pub(crate) type ReadyPrediction<E> = (PredictionBatch<E>, Arc<JobGate<PredictionBatch<E>>>);

/// A training batch ready for the agent, with the gate of its worker.
pub(crate) type ReadyTraining<E> = (TrainingBatch<E>, Arc<JobGate<TrainingBatch<E>>>);

struct Published<E: Env> {
    predictions: Vec<ReadyPrediction<E>>,
    trainings: Vec<ReadyTraining<E>>,
}

/// The two published-work lists, under a single lock, plus the condition
/// variable that wakes the coordinator when either becomes non-empty.
pub(crate) struct ReadyLists<E: Env> {
    published: Mutex<Published<E>>,
    cond: Condvar,
}

impl<E: Env> ReadyLists<E> {
    pub fn new() -> Self {
        Self {
            published: Mutex::new(Published {
                predictions: Vec::new(),
                trainings: Vec::new(),
            }),
            cond: Condvar::new(),
        }
    }

    pub fn publish_prediction(&self, batch: PredictionBatch<E>, gate: Arc<JobGate<PredictionBatch<E>>>) {
        let mut published = self.published.lock().unwrap();
        published.predictions.push((batch, gate));
        drop(published);
        self.cond.notify_one();
    }

    pub fn publish_training(&self, batch: TrainingBatch<E>, gate: Arc<JobGate<TrainingBatch<E>>>) {
        let mut published = self.published.lock().unwrap();
        published.trainings.push((batch, gate));
        drop(published);
        self.cond.notify_one();
    }

    /// Blocks until work is available, then moves both lists into the given
    /// buffers in one atomic take.
    pub fn take(
        &self,
        trainings: &mut Vec<ReadyTraining<E>>,
        predictions: &mut Vec<ReadyPrediction<E>>,
    ) {
        let mut published = self.published.lock().unwrap();
        while published.trainings.is_empty() && published.predictions.is_empty() {
            published = self.cond.wait(published).unwrap();
        }
        std::mem::swap(&mut published.trainings, trainings);
        std::mem::swap(&mut published.predictions, predictions);
    }
}
