//! Steps and trajectory fragments.
use crate::Env;

/// One environment transition as recorded by an actor.
pub struct StepRecord<E: Env> {
    /// Observation before the step.
    pub observation: E::Obs,

    /// Action taken.
    pub action: E::Act,

    /// Reward received.
    pub reward: E::Reward,

    /// Behaviour policy: probability of `action` at the time it was sampled.
    pub behaviour_policy: f32,

    /// The step ended the episode.
    pub next_is_terminal: bool,

    /// The record only pads the fragment to its fixed length and must not
    /// contribute to the loss.
    pub is_padding: bool,
}

/// A fixed-length slice of one actor's trajectory, ready for training.
///
/// `steps` always holds exactly `t_max` records when submitted; artificially
/// truncated episodes are rounded up with padding records.
pub struct TrajectoryFragment<E: Env> {
    /// The recorded steps, in temporal order.
    pub steps: Vec<StepRecord<E>>,

    /// Observation after the last step in `steps`.
    pub terminal_observation: E::Obs,
}

impl<E: Env> TrajectoryFragment<E> {
    /// The number of steps in the fragment.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Returns `true` if the fragment holds no steps.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}
