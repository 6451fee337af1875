#![warn(missing_docs)]
//! Relay is an IMPALA-style distributed reinforcement-learning driver: a
//! pool of actor threads plays environment episodes, batching workers
//! assemble their observations and trajectory fragments, and a single
//! coordinator thread feeds the batches to a neural-network agent for
//! inference and gradient updates.
//!
//! The workspace splits into three crates, re-exported here:
//!
//! * [`relay_core`]: the [`Env`], [`Agent`], [`DiscreteAction`] and
//!   [`Loss`] contracts, the step/fragment data model, and deterministic
//!   agent stubs under [`dummy`].
//! * [`relay_server`]: the batching [`Server`] with its configuration and
//!   statistics.
//! * [`relay_g2048_env`]: a complete 2048 environment and a runnable demo
//!   binary.
//!
//! A training run wires the three together:
//!
//! ```ignore
//! use relay::{ScalarLoss, Server, ServerConfig};
//! use relay_g2048_env::{G2048Env, G2048EnvConfig};
//!
//! let mut server: Server<G2048Env, ScalarLoss> =
//!     Server::build(ServerConfig::default(), G2048EnvConfig::default(), agent)?;
//! let stat = server.train(100_000_000)?;
//! println!("{}", stat.fmt());
//! ```
pub use relay_core::{
    dummy, A3cLoss, Agent, Dir4, DiscreteAction, Env, EnvStatus, Loss, PredictCallback,
    PredictionBatch, RelayError, Reward, ScalarLoss, StepRecord, TrainCallback, TrainingBatch,
    TrajectoryFragment,
};
pub use relay_g2048_env::{G2048Env, G2048EnvConfig};
pub use relay_server::{actor_stats_fmt, ActorStat, Server, ServerConfig, TrainStat};
