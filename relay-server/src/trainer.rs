//! Trainers: workers assembling fixed-horizon training batches.
use crate::{
    gate::JobGate,
    queue::{SignalQueue, StopFlag},
    ready::ReadyLists,
};
use relay_core::{DiscreteAction, Env, TrainingBatch, TrajectoryFragment};
use std::{
    sync::Arc,
    thread::{self, JoinHandle},
};

pub(crate) struct TrainerContext<E: Env> {
    pub id: usize,
    pub t_max: usize,
    pub discount: f32,
    pub min_batch_size: usize,
    pub max_batch_size: usize,
    pub queue: Arc<SignalQueue<TrajectoryFragment<E>>>,
    pub ready: Arc<ReadyLists<E>>,
    pub gate: Arc<JobGate<TrainingBatch<E>>>,
    pub stop: StopFlag,
}

pub(crate) fn spawn_trainer<E: Env>(ctx: TrainerContext<E>) -> JoinHandle<()> {
    thread::Builder::new()
        .name(format!("relay-trainer-{}", ctx.id))
        .spawn(move || run(ctx))
        .expect("failed to spawn trainer thread")
}

fn run<E: Env>(ctx: TrainerContext<E>) {
    let mut fragments: Vec<TrajectoryFragment<E>> = Vec::with_capacity(ctx.max_batch_size);
    let mut batch = TrainingBatch::<E>::with_capacity(ctx.t_max, ctx.max_batch_size);
    loop {
        fragments.clear();
        if !ctx
            .queue
            .pop_batch(ctx.min_batch_size, ctx.max_batch_size, &ctx.stop, &mut fragments)
        {
            break;
        }
        fill_training_batch(&mut batch, &fragments, ctx.discount);
        ctx.ready.publish_training(batch, ctx.gate.clone());
        batch = match ctx.gate.park() {
            Some(batch) => batch,
            None => break,
        };
    }
}

/// Packs fragments into a training batch, time-major.
///
/// For each time step `t`, the scalars of all fragments are appended in
/// fragment order; `states` receives the `t_max x B` step observations in
/// the same order followed by the `B` terminal observations. Terminal steps
/// get a zero discount, padding steps a zero loss coefficient and no
/// contribution to `data_sizes`.
pub(crate) fn fill_training_batch<E: Env>(
    batch: &mut TrainingBatch<E>,
    fragments: &[TrajectoryFragment<E>],
    discount: f32,
) {
    batch.clear();
    batch.set_batch_size(fragments.len());
    let t_max = fragments.first().map(TrajectoryFragment::len).unwrap_or(0);
    debug_assert!(fragments.iter().all(|f| f.len() == t_max));
    for t in 0..t_max {
        let mut num_datas = 0;
        for fragment in fragments {
            let step = &fragment.steps[t];
            batch.actions.push(step.action.to_id() as i64);
            batch.rewards.push(step.reward);
            batch.behaviour_policies.push(step.behaviour_policy);
            batch
                .discounts
                .push(if step.next_is_terminal { 0.0 } else { discount });
            batch.loss_coefs.push(if step.is_padding { 0.0 } else { 1.0 });
            if !step.is_padding {
                num_datas += 1;
            }
        }
        batch.data_sizes.push(num_datas);
    }
    let step_obs =
        (0..t_max).flat_map(|t| fragments.iter().map(move |f| &f.steps[t].observation));
    let terminal_obs = fragments.iter().map(|f| &f.terminal_observation);
    E::make_batch(step_obs.chain(terminal_obs), &mut batch.states);
}
