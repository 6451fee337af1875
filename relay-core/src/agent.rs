//! Agent.
use crate::{Env, Loss, PredictionBatch, TrainingBatch};
use anyhow::Result;

/// Completion callback of a prediction call, receiving the batch back with
/// `policies` populated.
pub type PredictCallback<E> = Box<dyn FnOnce(PredictionBatch<E>)>;

/// Completion callback of a training call, receiving the batch back together
/// with the loss of the update.
pub type TrainCallback<E, L> = Box<dyn FnOnce(TrainingBatch<E>, L)>;

/// A neural-network collaborator serving batched inference and accepting
/// batched training updates.
///
/// The trait is object-safe: the server holds a `Box<dyn Agent<E, Loss = L>>`
/// and invokes it from a single thread, so implementations need no internal
/// locking.
///
/// # Completion contract
///
/// `predict` and `train` take their batch by value and must eventually pass
/// it back through the completion callback with the outputs filled in. A
/// synchronous agent invokes the callback before returning. An agent that
/// pipelines device work may instead hold the batch and callback and complete
/// them during a *later* `predict`, `train` or `sync` call; [`Agent::sync`]
/// must complete every outstanding call before returning. Batches are never
/// dropped without their callback being invoked.
///
/// # Errors
///
/// Any error returned from these methods is fatal to the training run; the
/// server does not retry.
pub trait Agent<E: Env> {
    /// The loss value reported by training updates.
    type Loss: Loss;

    /// Computes policy vectors for a batch of observations.
    fn predict(&mut self, batch: PredictionBatch<E>, on_complete: PredictCallback<E>)
        -> Result<()>;

    /// Performs one gradient update on a batch of trajectory fragments.
    fn train(
        &mut self,
        batch: TrainingBatch<E>,
        on_complete: TrainCallback<E, Self::Loss>,
    ) -> Result<()>;

    /// Blocks until all prior `predict` and `train` callbacks have fired.
    fn sync(&mut self) -> Result<()>;

    /// Saves the model, tagged with the given step index.
    fn save(&mut self, index: i64) -> Result<()>;

    /// Loads the model tagged with the given step index.
    fn load(&mut self, index: i64) -> Result<()>;
}
