//! Deterministic agent stubs for tests, docs and demos.
//!
//! None of these learn anything: they stand in for the neural-network
//! collaborator so the batching machinery can be exercised and observed.
use crate::{
    Agent, DiscreteAction, Env, PredictCallback, PredictionBatch, ScalarLoss, TrainCallback,
    TrainingBatch,
};
use anyhow::Result;
use std::{
    cell::RefCell,
    marker::PhantomData,
    rc::Rc,
    sync::{Arc, Mutex},
};

/// A synchronous agent returning the same policy vector for every sample.
///
/// Training reports a constant loss. Callbacks fire before the call returns.
pub struct FixedPolicyAgent {
    /// The policy vector returned for every sample; its length must equal
    /// the action-space cardinality of the environment it is used with.
    pub policy: Vec<f32>,

    /// The loss reported by every training call.
    pub loss: f64,
}

impl FixedPolicyAgent {
    /// Creates an agent answering every prediction with `policy`.
    pub fn new(policy: Vec<f32>) -> Self {
        Self { policy, loss: 0.0 }
    }

    /// Creates an agent answering with the uniform policy over `n` actions.
    pub fn uniform(n: usize) -> Self {
        Self::new(vec![1.0 / n as f32; n])
    }
}

impl<E: Env> Agent<E> for FixedPolicyAgent {
    type Loss = ScalarLoss;

    fn predict(
        &mut self,
        mut batch: PredictionBatch<E>,
        on_complete: PredictCallback<E>,
    ) -> Result<()> {
        assert_eq!(self.policy.len(), E::Act::NUM_ACTIONS);
        for row in batch.policies.chunks_mut(E::Act::NUM_ACTIONS) {
            row.copy_from_slice(&self.policy);
        }
        on_complete(batch);
        Ok(())
    }

    fn train(
        &mut self,
        batch: TrainingBatch<E>,
        on_complete: TrainCallback<E, Self::Loss>,
    ) -> Result<()> {
        on_complete(batch, ScalarLoss(self.loss));
        Ok(())
    }

    fn sync(&mut self) -> Result<()> {
        Ok(())
    }

    fn save(&mut self, _index: i64) -> Result<()> {
        Ok(())
    }

    fn load(&mut self, _index: i64) -> Result<()> {
        Ok(())
    }
}

/// The contents of one training call, with observations omitted.
#[derive(Clone, Debug)]
pub struct TrainingRecord {
    /// Action ids, `(t, b)` row-major.
    pub actions: Vec<i64>,

    /// Rewards.
    pub rewards: Vec<f32>,

    /// Behaviour policies.
    pub behaviour_policies: Vec<f32>,

    /// Discounts.
    pub discounts: Vec<f32>,

    /// Loss coefficients.
    pub loss_coefs: Vec<f32>,

    /// Non-padding counts per time step.
    pub data_sizes: Vec<i64>,

    /// The number of fragments in the batch.
    pub batch_size: usize,
}

/// A synchronous agent that captures every call it receives.
///
/// Like [`FixedPolicyAgent`] it answers predictions with one fixed policy
/// vector, but it additionally records prediction batch sizes, the scalar
/// columns of every training batch and the indices of every save. The
/// records are behind `Arc`s so a test can keep reading them while the
/// server owns the agent.
pub struct RecordingAgent {
    /// The policy vector returned for every sample.
    pub policy: Vec<f32>,

    /// Captured training calls, in invocation order.
    pub trainings: Arc<Mutex<Vec<TrainingRecord>>>,

    /// Captured prediction batch sizes, in invocation order.
    pub prediction_sizes: Arc<Mutex<Vec<usize>>>,

    /// Step indices passed to `save`.
    pub saved_indices: Arc<Mutex<Vec<i64>>>,
}

impl RecordingAgent {
    /// Creates an agent answering every prediction with `policy`.
    pub fn new(policy: Vec<f32>) -> Self {
        Self {
            policy,
            trainings: Arc::new(Mutex::new(Vec::new())),
            prediction_sizes: Arc::new(Mutex::new(Vec::new())),
            saved_indices: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl<E: Env<Reward = f32>> Agent<E> for RecordingAgent {
    type Loss = ScalarLoss;

    fn predict(
        &mut self,
        mut batch: PredictionBatch<E>,
        on_complete: PredictCallback<E>,
    ) -> Result<()> {
        assert_eq!(self.policy.len(), E::Act::NUM_ACTIONS);
        self.prediction_sizes
            .lock()
            .unwrap()
            .push(batch.batch_size());
        for row in batch.policies.chunks_mut(E::Act::NUM_ACTIONS) {
            row.copy_from_slice(&self.policy);
        }
        on_complete(batch);
        Ok(())
    }

    fn train(
        &mut self,
        batch: TrainingBatch<E>,
        on_complete: TrainCallback<E, Self::Loss>,
    ) -> Result<()> {
        self.trainings.lock().unwrap().push(TrainingRecord {
            actions: batch.actions.clone(),
            rewards: batch.rewards.clone(),
            behaviour_policies: batch.behaviour_policies.clone(),
            discounts: batch.discounts.clone(),
            loss_coefs: batch.loss_coefs.clone(),
            data_sizes: batch.data_sizes.clone(),
            batch_size: batch.batch_size(),
        });
        on_complete(batch, ScalarLoss(0.0));
        Ok(())
    }

    fn sync(&mut self) -> Result<()> {
        Ok(())
    }

    fn save(&mut self, index: i64) -> Result<()> {
        self.saved_indices.lock().unwrap().push(index);
        Ok(())
    }

    fn load(&mut self, _index: i64) -> Result<()> {
        Ok(())
    }
}

enum Deferred<E: Env, L> {
    Prediction(PredictionBatch<E>, PredictCallback<E>),
    Training(TrainingBatch<E>, L, TrainCallback<E, L>),
}

impl<E: Env, L> Deferred<E, L> {
    fn fire(self) {
        match self {
            Deferred::Prediction(batch, on_complete) => on_complete(batch),
            Deferred::Training(batch, loss, on_complete) => on_complete(batch, loss),
        }
    }
}

/// Wraps a synchronous agent and defers every completion by one call.
///
/// The wrapped agent computes its outputs immediately, but the completion
/// callback of call `N` only fires during call `N + 1` (or during `sync`),
/// mimicking an agent that overlaps device work across calls. Useful for
/// exercising the coordinator's handling of deferred completions.
pub struct PipelinedAgent<E: Env, A: Agent<E>> {
    inner: A,
    pending: Option<Deferred<E, A::Loss>>,
    phantom: PhantomData<E>,
}

impl<E: Env, A: Agent<E>> PipelinedAgent<E, A> {
    /// Wraps `inner`, which must complete its callbacks synchronously.
    pub fn new(inner: A) -> Self {
        Self {
            inner,
            pending: None,
            phantom: PhantomData,
        }
    }
}

impl<E: Env, A: Agent<E>> Agent<E> for PipelinedAgent<E, A> {
    type Loss = A::Loss;

    fn predict(
        &mut self,
        batch: PredictionBatch<E>,
        on_complete: PredictCallback<E>,
    ) -> Result<()> {
        let previous = self.pending.take();
        let done = Rc::new(RefCell::new(None));
        let slot = done.clone();
        self.inner
            .predict(batch, Box::new(move |b| *slot.borrow_mut() = Some(b)))?;
        let batch = done
            .borrow_mut()
            .take()
            .expect("inner agent must complete synchronously");
        self.pending = Some(Deferred::Prediction(batch, on_complete));
        if let Some(previous) = previous {
            previous.fire();
        }
        Ok(())
    }

    fn train(
        &mut self,
        batch: TrainingBatch<E>,
        on_complete: TrainCallback<E, Self::Loss>,
    ) -> Result<()> {
        let previous = self.pending.take();
        let done = Rc::new(RefCell::new(None));
        let slot = done.clone();
        self.inner
            .train(batch, Box::new(move |b, l| *slot.borrow_mut() = Some((b, l))))?;
        let (batch, loss) = done
            .borrow_mut()
            .take()
            .expect("inner agent must complete synchronously");
        self.pending = Some(Deferred::Training(batch, loss, on_complete));
        if let Some(previous) = previous {
            previous.fire();
        }
        Ok(())
    }

    fn sync(&mut self) -> Result<()> {
        if let Some(pending) = self.pending.take() {
            pending.fire();
        }
        self.inner.sync()
    }

    fn save(&mut self, index: i64) -> Result<()> {
        self.inner.save(index)
    }

    fn load(&mut self, index: i64) -> Result<()> {
        self.inner.load(index)
    }
}
