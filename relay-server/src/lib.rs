#![warn(missing_docs)]
//! A three-tier batching server for IMPALA-style training.
//!
//! The server connects thousands of actor threads, each driving one
//! environment episode, to a single [`Agent`](relay_core::Agent) through two
//! small pools of batching workers:
//!
//! * **Actors** submit their current observation to the observation queue
//!   and block until a policy vector comes back, then sample an action,
//!   step their environment, and append the transition to a fixed-length
//!   trajectory fragment.
//! * **Predictors** drain the observation queue into batches bounded by the
//!   configured minimum and maximum sizes, pack them, and hand them to the
//!   coordinator; once the agent answers, they fan the policy vectors back
//!   out to the submitting actors in FIFO order.
//! * **Trainers** do the same for completed trajectory fragments, packing
//!   time-major training batches with per-step discounts and padding masks.
//! * The **coordinator**, the thread calling [`Server::train`], owns the
//!   agent and serially issues every `predict` and `train` call, tracking
//!   trained-step progress, the loss average, periodic logging and
//!   checkpoints.
//!
//! Control flow between the tiers is condition-variable signalling on queue
//! sizes: a producer signals one consumer when a queue reaches the
//! consumer's minimum batch size, and a consumer that leaves enough behind
//! re-signals the next. Shutdown is a flag observed at every blocking
//! point.
mod actor;
mod config;
mod gate;
mod predictor;
mod queue;
mod ready;
mod server;
mod slot;
mod stat;
mod trainer;

pub use config::ServerConfig;
pub use server::Server;
pub use stat::{actor_stats_fmt, ActorStat, TrainStat};
