#![warn(missing_docs)]
//! Core abstractions for an IMPALA-style training service.
//!
//! # Environment and actions
//!
//! [`Env`] is the contract simulated environments implement: building with a
//! seed, stepping with a [`DiscreteAction`], validity checks, and a
//! `make_batch` operation packing a range of observations into the
//! environment-specific `ObsBatch` type. The library moves observations
//! around but never looks inside them.
//!
//! # Agent
//!
//! [`Agent`] is the neural-network collaborator, reduced to five operations:
//! `predict`, `train`, `sync`, `save` and `load`. Prediction and training
//! receive their batch buffers by value and hand them back through
//! completion callbacks, which an agent may defer until a later call to
//! overlap device work; `sync` drains whatever is outstanding. [`Loss`] is
//! the value training reports, combinable with an exponential moving
//! average.
//!
//! # Trajectory data
//!
//! Actors record transitions as [`StepRecord`]s and submit them in
//! fixed-length [`TrajectoryFragment`]s. Workers pack those into the
//! reusable [`PredictionBatch`] and [`TrainingBatch`] buffers exchanged with
//! the agent.
pub mod dummy;
pub mod error;

mod action;
mod agent;
mod batch;
mod env;
mod loss;
mod step;

pub use action::{Dir4, DiscreteAction};
pub use agent::{Agent, PredictCallback, TrainCallback};
pub use batch::{PredictionBatch, TrainingBatch};
pub use env::{Env, EnvStatus, Reward};
pub use error::RelayError;
pub use loss::{A3cLoss, Loss, ScalarLoss};
pub use step::{StepRecord, TrajectoryFragment};
