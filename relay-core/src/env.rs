//! Environment.
use crate::DiscreteAction;
use anyhow::Result;
use num_traits::Zero;
use std::{
    fmt::{Debug, Display},
    ops::AddAssign,
};

/// State of an episode after a step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnvStatus {
    /// The episode continues.
    Running,
    /// The episode has ended.
    Finished,
}

/// A scalar reward: addition and a zero identity are all the server needs.
pub trait Reward: Copy + Debug + Display + Zero + AddAssign + Send + 'static {}

impl<T: Copy + Debug + Display + Zero + AddAssign + Send + 'static> Reward for T {}

/// Represents an environment, typically an MDP with a discrete action space.
///
/// The server never inspects observations; it moves them between actors and
/// batch buffers and relies on [`Env::make_batch`] to pack a range of them
/// into the environment-specific [`Env::ObsBatch`].
pub trait Env: Sized + 'static {
    /// Configuration used to build the environment.
    type Config: Clone + Send + 'static;

    /// Observation of the environment.
    type Obs: Clone + Debug + Send + 'static;

    /// Packed batch of observations, default-constructible and reusable.
    type ObsBatch: Default + Send + 'static;

    /// Action of the environment.
    type Act: DiscreteAction;

    /// Reward of the environment.
    type Reward: Reward;

    /// Builds an environment.
    fn build(config: &Self::Config, seed: i64) -> Result<Self>;

    /// Starts a new episode and returns the initial observation.
    fn reset(&mut self) -> Self::Obs;

    /// Performs an environment step.
    fn step(&mut self, act: &Self::Act) -> (Self::Obs, Self::Reward, EnvStatus);

    /// Returns `true` if the action is applicable in the current state.
    fn is_valid_action(&self, act: &Self::Act) -> bool;

    /// Renders the current state. A no-op by default.
    fn render(&self) {}

    /// Packs a range of observations into a pre-allocated batch.
    ///
    /// Implementations must reset `batch` before filling it; the same batch
    /// object is reused across calls with its capacity retained.
    fn make_batch<'a, I>(obs: I, batch: &mut Self::ObsBatch)
    where
        I: Iterator<Item = &'a Self::Obs>,
        Self::Obs: 'a;
}
