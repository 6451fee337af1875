//! No step is duplicated or invented on its way from actors to trainers.
mod common;

use common::{decode, ProbeAgent, ProbeEnv, ProbeEnvConfig};
use relay_core::ScalarLoss;
use relay_server::{Server, ServerConfig};
use std::collections::{HashMap, HashSet};

const T_MAX: usize = 2;

fn conservation_config(num_trainers: usize) -> ServerConfig {
    ServerConfig {
        num_actors: 4,
        num_predictors: 2,
        num_trainers,
        min_prediction_batch_size: 1,
        max_prediction_batch_size: 8,
        min_training_batch_size: 1,
        max_training_batch_size: 4,
        t_max: T_MAX,
        max_episode_length: None,
        discount: 0.99,
        average_loss_decay: 0.99,
        log_interval_steps: None,
        save_interval_steps: None,
    }
}

fn collect_trained_steps(num_trainers: usize, training_steps: usize) -> HashMap<(u64, u64), Vec<u64>> {
    let agent = ProbeAgent::uniform();
    let trainings = agent.trainings.clone();
    let env_config = ProbeEnvConfig {
        episode_len: Some(7),
        ..Default::default()
    };
    let mut server: Server<ProbeEnv, ScalarLoss> =
        Server::build(conservation_config(num_trainers), env_config, Box::new(agent)).unwrap();
    let stat = server.train(training_steps).unwrap();
    assert!(stat.trained_steps >= training_steps);

    let mut seen: HashSet<u64> = HashSet::new();
    let mut by_episode: HashMap<(u64, u64), Vec<u64>> = HashMap::new();
    let trainings = trainings.lock().unwrap();
    for training in trainings.iter() {
        for &obs in training.step_states() {
            assert!(seen.insert(obs), "step trained twice: {:?}", decode(obs));
            let (actor, episode, step) = decode(obs);
            by_episode.entry((actor, episode)).or_default().push(step);
        }
    }
    by_episode
}

#[test]
fn trained_steps_are_unique_and_fragment_aligned() {
    // Four actors feed two predictors and two trainers. Every step that
    // reaches training must appear exactly once, in whole fragments: with
    // an episode length of 7 and fragments of 2, the trained steps of an
    // episode are aligned pairs from 0..=5, and step 6 is always discarded
    // with the episode.
    for ((actor, episode), steps) in collect_trained_steps(2, 3000) {
        let steps: HashSet<u64> = steps.into_iter().collect();
        for &step in &steps {
            assert!(step < 6, "actor {} episode {} trained step {}", actor, episode, step);
            assert!(
                steps.contains(&(step ^ 1)),
                "actor {} episode {} trained a torn fragment at step {}",
                actor,
                episode,
                step
            );
        }
    }
}

#[test]
fn a_single_trainer_trains_a_gapless_prefix_of_each_episode() {
    // With one trainer the global FIFO preserves each actor's submission
    // order, so anything dropped at shutdown is a suffix: the trained
    // steps of each episode form a gapless prefix of whole fragments.
    for ((actor, episode), mut steps) in collect_trained_steps(1, 2000) {
        steps.sort_unstable();
        let expected: Vec<u64> = (0..steps.len() as u64).collect();
        assert_eq!(
            steps, expected,
            "actor {} episode {} trained a gapped prefix",
            actor, episode
        );
        assert_eq!(
            steps.len() % T_MAX,
            0,
            "actor {} episode {} trained a partial fragment",
            actor, episode
        );
        assert!(steps.len() <= 6);
    }
}
