//! Actors: one thread per environment episode loop.
use crate::{
    queue::SignalQueue,
    slot::{PolicySlot, PredictionRequest},
    stat::ActorStat,
};
use crossbeam_channel::Sender;
use log::{error, info};
use num_traits::Zero;
use rand::{
    distributions::{Distribution, WeightedIndex},
    rngs::StdRng,
    SeedableRng,
};
use relay_core::{DiscreteAction, Env, EnvStatus, RelayError, StepRecord, TrajectoryFragment};
use std::{
    sync::Arc,
    thread::{self, JoinHandle},
    time::Instant,
};

/// Behaviour parameters shared by all actors of one server.
#[derive(Clone)]
pub(crate) struct ActorParams {
    pub t_max: usize,
    pub max_episode_length: Option<usize>,
    pub min_prediction_batch_size: usize,
    pub min_training_batch_size: usize,
}

/// Everything an actor thread needs: its identity, environment config, and
/// non-owning handles into the server's queues and its own policy slot.
pub(crate) struct ActorContext<E: Env> {
    pub id: usize,
    pub env_config: E::Config,
    pub params: ActorParams,
    pub prediction_queue: Arc<SignalQueue<PredictionRequest<E>>>,
    pub training_queue: Arc<SignalQueue<TrajectoryFragment<E>>>,
    pub slot: Arc<PolicySlot<E>>,
    pub stats: Sender<ActorStat>,
}

impl<E: Env> ActorContext<E> {
    /// The first actor additionally renders and logs episode summaries.
    fn is_main(&self) -> bool {
        self.id == 0
    }
}

pub(crate) fn spawn_actor<E: Env>(ctx: ActorContext<E>) -> JoinHandle<()> {
    thread::Builder::new()
        .name(format!("relay-actor-{}", ctx.id))
        .spawn(move || run(ctx))
        .expect("failed to spawn actor thread")
}

/// Samples an action from the policy, redrawing until the environment
/// accepts it.
///
/// The returned probability is the policy's value at the accepted action,
/// not renormalised over the valid subset. Returns `None` when no valid
/// action carries positive mass, in which case resampling could never
/// terminate.
pub(crate) fn sample_valid_action<E: Env>(
    env: &E,
    policy: &[f32],
    rng: &mut StdRng,
) -> Option<(E::Act, f32)> {
    let mut valid_mass = 0.0f32;
    for (id, &p) in policy.iter().enumerate() {
        if p > 0.0 && env.is_valid_action(&E::Act::from_id(id)) {
            valid_mass += p;
        }
    }
    if valid_mass <= 0.0 {
        return None;
    }
    let dist = WeightedIndex::new(policy.iter().copied()).ok()?;
    loop {
        let id = dist.sample(rng);
        let action = E::Act::from_id(id);
        if env.is_valid_action(&action) {
            return Some((action, policy[id]));
        }
    }
}

fn submit_fragment<E: Env>(
    ctx: &ActorContext<E>,
    pending: &mut Vec<StepRecord<E>>,
    terminal_observation: E::Obs,
) {
    debug_assert_eq!(pending.len(), ctx.params.t_max);
    let steps = std::mem::take(pending);
    pending.reserve(ctx.params.t_max);
    let len = ctx.training_queue.push(TrajectoryFragment {
        steps,
        terminal_observation,
    });
    if len >= ctx.params.min_training_batch_size {
        ctx.training_queue.notify_one();
    }
}

fn run<E: Env>(ctx: ActorContext<E>) {
    let mut env = match E::build(&ctx.env_config, ctx.id as i64) {
        Ok(env) => env,
        Err(e) => {
            error!("actor {}: failed to build environment: {:#}", ctx.id, e);
            return;
        }
    };
    let mut rng = StdRng::seed_from_u64(ctx.id as u64);
    let mut policy = vec![0.0f32; E::Act::NUM_ACTIONS];
    let mut pending: Vec<StepRecord<E>> = Vec::with_capacity(ctx.params.t_max);
    let started = Instant::now();
    let mut env_steps = 0;
    let mut episodes = 0;

    'run: loop {
        let mut sum_reward = E::Reward::zero();
        let mut t = 0;
        let mut observation = env.reset();
        // A fragment never crosses an episode boundary: leftovers of the
        // previous episode are discarded.
        pending.clear();
        episodes += 1;
        loop {
            let len = ctx.prediction_queue.push(PredictionRequest {
                observation,
                slot: ctx.slot.clone(),
            });
            if len >= ctx.params.min_prediction_batch_size {
                ctx.prediction_queue.notify_one();
            }
            observation = match ctx.slot.await_policy(&mut policy) {
                Some(observation) => observation,
                None => break 'run,
            };
            let (action, behaviour_policy) =
                match sample_valid_action::<E>(&env, &policy, &mut rng) {
                    Some(sampled) => sampled,
                    None => {
                        error!("actor {}: {}", ctx.id, RelayError::NoValidAction);
                        break 'run;
                    }
                };
            if ctx.is_main() {
                env.render();
            }
            let (next_obs, reward, status) = env.step(&action);
            t += 1;
            env_steps += 1;
            sum_reward += reward;
            pending.push(StepRecord {
                observation,
                action,
                reward,
                behaviour_policy,
                next_is_terminal: status == EnvStatus::Finished,
                is_padding: false,
            });
            if pending.len() == ctx.params.t_max {
                submit_fragment(&ctx, &mut pending, next_obs.clone());
            }
            if status == EnvStatus::Finished {
                break;
            }
            if let Some(max_len) = ctx.params.max_episode_length {
                if t >= max_len {
                    if !pending.is_empty() {
                        pending.push(StepRecord {
                            observation: next_obs.clone(),
                            action: E::Act::from_id(0),
                            reward: E::Reward::zero(),
                            behaviour_policy: 1.0,
                            next_is_terminal: true,
                            is_padding: true,
                        });
                        if pending.len() == ctx.params.t_max {
                            submit_fragment(&ctx, &mut pending, next_obs.clone());
                        }
                    }
                    break;
                }
            }
            observation = next_obs;
        }
        if ctx.is_main() {
            info!("finish episode : {} {}", t, sum_reward);
        }
    }

    let _ = ctx.stats.send(ActorStat {
        env_steps,
        episodes,
        duration: started.elapsed(),
    });
}
