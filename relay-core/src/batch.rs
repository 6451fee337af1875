//! Reusable batch buffers exchanged with the agent.
use crate::{DiscreteAction, Env};

/// A batch of observations awaiting inference.
///
/// The buffer travels a full cycle: a predictor fills it, the coordinator
/// moves it into [`Agent::predict`](crate::Agent::predict), the completion
/// callback hands it back to the predictor with `policies` populated, and
/// the predictor reuses it for the next batch. Capacity is retained across
/// iterations.
pub struct PredictionBatch<E: Env> {
    /// Packed observations.
    pub states: E::ObsBatch,

    /// Flat `batch_size x NUM_ACTIONS` policy output buffer.
    pub policies: Vec<f32>,

    batch_size: usize,
}

impl<E: Env> Default for PredictionBatch<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Env> PredictionBatch<E> {
    /// Creates an empty batch.
    pub fn new() -> Self {
        Self {
            states: E::ObsBatch::default(),
            policies: Vec::new(),
            batch_size: 0,
        }
    }

    /// Prepares the batch for `batch_size` samples, zeroing the policy buffer.
    pub fn reset(&mut self, batch_size: usize) {
        self.batch_size = batch_size;
        self.policies.clear();
        self.policies
            .resize(batch_size * E::Act::NUM_ACTIONS, 0.0);
    }

    /// The number of samples in the batch.
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// The policy vector of the `i`-th sample.
    pub fn policy(&self, i: usize) -> &[f32] {
        let k = E::Act::NUM_ACTIONS;
        &self.policies[i * k..(i + 1) * k]
    }
}

/// A batch of trajectory fragments packed for one training call.
///
/// All per-step columns are flat `t_max x batch_size` in `(t, b)` row-major
/// order; `states` additionally carries the `t_max + 1`-th column of terminal
/// observations. `data_sizes[t]` counts the non-padding samples of time step
/// `t` so the agent can mask its losses.
pub struct TrainingBatch<E: Env> {
    /// Packed observations, time-major, `(t_max + 1) x batch_size` of them.
    pub states: E::ObsBatch,

    /// Action ids.
    pub actions: Vec<i64>,

    /// Rewards.
    pub rewards: Vec<E::Reward>,

    /// Behaviour policies, strictly positive for non-padding steps.
    pub behaviour_policies: Vec<f32>,

    /// Per-step discount: the configured discount, or `0` on terminal steps.
    pub discounts: Vec<f32>,

    /// `1` for real steps, `0` for padding.
    pub loss_coefs: Vec<f32>,

    /// Non-padding sample count per time step, `t_max` entries.
    pub data_sizes: Vec<i64>,

    batch_size: usize,
}

impl<E: Env> Default for TrainingBatch<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Env> TrainingBatch<E> {
    /// Creates an empty batch.
    pub fn new() -> Self {
        Self {
            states: E::ObsBatch::default(),
            actions: Vec::new(),
            rewards: Vec::new(),
            behaviour_policies: Vec::new(),
            discounts: Vec::new(),
            loss_coefs: Vec::new(),
            data_sizes: Vec::new(),
            batch_size: 0,
        }
    }

    /// Creates an empty batch with room for `max_batch_size` fragments of
    /// `t_max` steps.
    pub fn with_capacity(t_max: usize, max_batch_size: usize) -> Self {
        let n = t_max * max_batch_size;
        Self {
            states: E::ObsBatch::default(),
            actions: Vec::with_capacity(n),
            rewards: Vec::with_capacity(n),
            behaviour_policies: Vec::with_capacity(n),
            discounts: Vec::with_capacity(n),
            loss_coefs: Vec::with_capacity(n),
            data_sizes: Vec::with_capacity(t_max),
            batch_size: 0,
        }
    }

    /// Clears all columns, retaining capacity.
    pub fn clear(&mut self) {
        self.actions.clear();
        self.rewards.clear();
        self.behaviour_policies.clear();
        self.discounts.clear();
        self.loss_coefs.clear();
        self.data_sizes.clear();
        self.batch_size = 0;
    }

    /// Sets the number of fragments in the batch.
    pub fn set_batch_size(&mut self, batch_size: usize) {
        self.batch_size = batch_size;
    }

    /// The number of fragments in the batch.
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// The fragment length of the batch.
    pub fn t_max(&self) -> usize {
        self.data_sizes.len()
    }

    /// Total number of non-padding samples in the batch.
    pub fn num_samples(&self) -> i64 {
        self.data_sizes.iter().sum()
    }
}
