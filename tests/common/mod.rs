//! Scripted environment and recording agents shared by the scenario tests.
#![allow(dead_code)]
use anyhow::Result;
use relay_core::{
    Agent, DiscreteAction, Env, EnvStatus, PredictCallback, PredictionBatch, ScalarLoss,
    TrainCallback, TrainingBatch,
};
use std::sync::{Arc, Mutex};

/// A four-way discrete action identified by its id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Act4(pub usize);

impl DiscreteAction for Act4 {
    const NUM_ACTIONS: usize = 4;

    fn to_id(&self) -> usize {
        self.0
    }

    fn from_id(id: usize) -> Self {
        assert!(id < Self::NUM_ACTIONS, "invalid action id: {}", id);
        Act4(id)
    }
}

/// Configuration of [`ProbeEnv`].
#[derive(Clone, Debug)]
pub struct ProbeEnvConfig {
    /// The episode finishes on this step, if set.
    pub episode_len: Option<u64>,

    /// Action ids the environment rejects.
    pub invalid_actions: Vec<usize>,
}

impl Default for ProbeEnvConfig {
    fn default() -> Self {
        Self {
            episode_len: None,
            invalid_actions: Vec::new(),
        }
    }
}

/// A scripted environment whose observations identify themselves.
///
/// Each observation encodes `(actor, episode, step)` into a `u64`, so a
/// test can trace exactly which transition ended up where. Every step
/// yields reward `1.0`. Episodes are numbered from 1.
pub struct ProbeEnv {
    config: ProbeEnvConfig,
    actor: u64,
    episode: u64,
    step: u64,
}

/// Packs an observation id.
pub fn encode(actor: u64, episode: u64, step: u64) -> u64 {
    (actor << 40) | (episode << 20) | step
}

/// Unpacks an observation id into `(actor, episode, step)`.
pub fn decode(obs: u64) -> (u64, u64, u64) {
    (obs >> 40, (obs >> 20) & 0xf_ffff, obs & 0xf_ffff)
}

impl Env for ProbeEnv {
    type Config = ProbeEnvConfig;
    type Obs = u64;
    type ObsBatch = Vec<u64>;
    type Act = Act4;
    type Reward = f32;

    fn build(config: &Self::Config, seed: i64) -> Result<Self> {
        Ok(Self {
            config: config.clone(),
            actor: seed as u64,
            episode: 0,
            step: 0,
        })
    }

    fn reset(&mut self) -> Self::Obs {
        self.episode += 1;
        self.step = 0;
        encode(self.actor, self.episode, self.step)
    }

    fn step(&mut self, _act: &Self::Act) -> (Self::Obs, Self::Reward, EnvStatus) {
        self.step += 1;
        let status = match self.config.episode_len {
            Some(len) if self.step >= len => EnvStatus::Finished,
            _ => EnvStatus::Running,
        };
        (encode(self.actor, self.episode, self.step), 1.0, status)
    }

    fn is_valid_action(&self, act: &Self::Act) -> bool {
        !self.config.invalid_actions.contains(&act.to_id())
    }

    fn make_batch<'a, I>(obs: I, batch: &mut Self::ObsBatch)
    where
        I: Iterator<Item = &'a Self::Obs>,
    {
        batch.clear();
        batch.extend(obs.copied());
    }
}

/// One captured training call, observations included.
#[derive(Clone, Debug)]
pub struct ProbeTraining {
    pub states: Vec<u64>,
    pub actions: Vec<i64>,
    pub rewards: Vec<f32>,
    pub behaviour_policies: Vec<f32>,
    pub discounts: Vec<f32>,
    pub loss_coefs: Vec<f32>,
    pub data_sizes: Vec<i64>,
    pub batch_size: usize,
}

impl ProbeTraining {
    /// The step observations (the terminal column stripped), `(t, b)`
    /// row-major.
    pub fn step_states(&self) -> &[u64] {
        &self.states[..self.data_sizes.len() * self.batch_size]
    }
}

/// A synchronous agent over [`ProbeEnv`] capturing everything it is called
/// with, answering every prediction with one fixed policy vector.
pub struct ProbeAgent {
    pub policy: Vec<f32>,
    pub predictions: Arc<Mutex<Vec<Vec<u64>>>>,
    pub trainings: Arc<Mutex<Vec<ProbeTraining>>>,
}

impl ProbeAgent {
    pub fn new(policy: Vec<f32>) -> Self {
        Self {
            policy,
            predictions: Arc::new(Mutex::new(Vec::new())),
            trainings: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn uniform() -> Self {
        Self::new(vec![0.25; 4])
    }
}

impl Agent<ProbeEnv> for ProbeAgent {
    type Loss = ScalarLoss;

    fn predict(
        &mut self,
        mut batch: PredictionBatch<ProbeEnv>,
        on_complete: PredictCallback<ProbeEnv>,
    ) -> Result<()> {
        self.predictions.lock().unwrap().push(batch.states.clone());
        for row in batch.policies.chunks_mut(Act4::NUM_ACTIONS) {
            row.copy_from_slice(&self.policy);
        }
        on_complete(batch);
        Ok(())
    }

    fn train(
        &mut self,
        batch: TrainingBatch<ProbeEnv>,
        on_complete: TrainCallback<ProbeEnv, Self::Loss>,
    ) -> Result<()> {
        self.trainings.lock().unwrap().push(ProbeTraining {
            states: batch.states.clone(),
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

    fn save(&mut self, _index: i64) -> Result<()> {
        Ok(())
    }

    fn load(&mut self, _index: i64) -> Result<()> {
        Ok(())
    }
}

/// A server configuration with one worker of each kind and batch sizes of
/// one, the most deterministic setup the server offers.
pub fn minimal_config(t_max: usize) -> relay_server::ServerConfig {
    relay_server::ServerConfig {
        num_actors: 1,
        num_predictors: 1,
        num_trainers: 1,
        min_prediction_batch_size: 1,
        max_prediction_batch_size: 1,
        min_training_batch_size: 1,
        max_training_batch_size: 1,
        t_max,
        max_episode_length: None,
        discount: 0.99,
        average_loss_decay: 0.99,
        log_interval_steps: None,
        save_interval_steps: None,
    }
}
