//! Predictors: workers assembling inference batches.
use crate::{
    gate::JobGate,
    queue::{SignalQueue, StopFlag},
    ready::ReadyLists,
    slot::PredictionRequest,
};
use relay_core::{Env, PredictionBatch};
use std::{
    sync::Arc,
    thread::{self, JoinHandle},
};

pub(crate) struct PredictorContext<E: Env> {
    pub id: usize,
    pub min_batch_size: usize,
    pub max_batch_size: usize,
    pub queue: Arc<SignalQueue<PredictionRequest<E>>>,
    pub ready: Arc<ReadyLists<E>>,
    pub gate: Arc<JobGate<PredictionBatch<E>>>,
    pub stop: StopFlag,
}

pub(crate) fn spawn_predictor<E: Env>(ctx: PredictorContext<E>) -> JoinHandle<()> {
    thread::Builder::new()
        .name(format!("relay-predictor-{}", ctx.id))
        .spawn(move || run(ctx))
        .expect("failed to spawn predictor thread")
}

fn run<E: Env>(ctx: PredictorContext<E>) {
    let mut requests: Vec<PredictionRequest<E>> = Vec::with_capacity(ctx.max_batch_size);
    let mut batch = PredictionBatch::<E>::new();
    loop {
        requests.clear();
        if !ctx
            .queue
            .pop_batch(ctx.min_batch_size, ctx.max_batch_size, &ctx.stop, &mut requests)
        {
            break;
        }
        batch.reset(requests.len());
        E::make_batch(requests.iter().map(|r| &r.observation), &mut batch.states);
        ctx.ready.publish_prediction(batch, ctx.gate.clone());
        batch = match ctx.gate.park() {
            Some(batch) => batch,
            None => break,
        };
        // Policies come back in request order: row i answers observation i.
        for (i, request) in requests.drain(..).enumerate() {
            let PredictionRequest { observation, slot } = request;
            slot.deliver(observation, batch.policy(i));
        }
    }
}
