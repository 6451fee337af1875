//! Trains on 2048 with a uniform-policy stand-in for the neural agent.
//!
//! The point of the binary is to exercise the full actor/predictor/trainer
//! pipeline end to end; plug in a real [`relay_core::Agent`] to learn
//! anything. Run with `RUST_LOG=info` to see episode summaries and the
//! periodic loss line.
use anyhow::Result;
use relay_core::{dummy::FixedPolicyAgent, ScalarLoss};
use relay_g2048_env::{G2048Env, G2048EnvConfig};
use relay_server::{Server, ServerConfig};

const TRAINING_STEPS: usize = 1_000_000;

fn main() -> Result<()> {
    env_logger::init();

    let config = ServerConfig {
        num_actors: 512,
        num_predictors: 2,
        num_trainers: 2,
        min_prediction_batch_size: 128,
        max_prediction_batch_size: 256,
        min_training_batch_size: 32,
        max_training_batch_size: 64,
        t_max: 12,
        max_episode_length: None,
        discount: 0.99,
        average_loss_decay: 0.99,
        log_interval_steps: Some(100_000),
        save_interval_steps: None,
    };

    let agent = FixedPolicyAgent::uniform(4);
    let mut server: Server<G2048Env, ScalarLoss> =
        Server::build(config, G2048EnvConfig::default(), Box::new(agent))?;
    let stat = server.train(TRAINING_STEPS)?;
    println!("{}", stat.fmt());
    Ok(())
}
