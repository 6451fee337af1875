//! The batching server.
use crate::{
    actor::{spawn_actor, ActorContext, ActorParams},
    config::ServerConfig,
    gate::JobGate,
    predictor::{spawn_predictor, PredictorContext},
    queue::{SignalQueue, StopFlag},
    ready::ReadyLists,
    slot::PolicySlot,
    stat::{actor_stats_fmt, ActorStat, TrainStat},
    trainer::{spawn_trainer, TrainerContext},
};
use anyhow::Result;
use log::info;
use relay_core::{Agent, Env, Loss};
use std::{
    sync::{Arc, Mutex},
    time::Instant,
};

struct Progress<L> {
    trained_steps: usize,
    average_loss: L,
    pending_save: Option<i64>,
}

/// Connects a pool of actors to a single agent through batching workers.
///
/// Three tiers run on OS threads: actors drive environment episodes and
/// submit observations for inference, predictors assemble observation
/// batches, and trainers assemble fixed-horizon trajectory batches. The
/// calling thread becomes the coordinator, which owns the agent and serially
/// issues every `predict` and `train` call, so the agent needs no internal
/// synchronisation.
///
/// ```ignore
/// let mut server: Server<MyEnv, ScalarLoss> =
///     Server::build(ServerConfig::default(), env_config, Box::new(agent))?;
/// let stat = server.train(100_000_000)?;
/// println!("{}", stat.fmt());
/// ```
pub struct Server<E: Env, L: Loss> {
    config: ServerConfig,
    env_config: E::Config,
    agent: Box<dyn Agent<E, Loss = L>>,
}

impl<E: Env, L: Loss> Server<E, L> {
    /// Builds a server after validating its configuration.
    pub fn build(
        config: ServerConfig,
        env_config: E::Config,
        agent: Box<dyn Agent<E, Loss = L>>,
    ) -> Result<Self> {
        config.check()?;
        Ok(Self {
            config,
            env_config,
            agent,
        })
    }

    /// Runs the training loop until `training_steps` samples have been
    /// trained on, then shuts every worker down and joins the threads.
    ///
    /// Whatever is still queued or in flight at that point is discarded.
    /// Errors raised by the agent are fatal: the workers are shut down and
    /// the error is returned.
    pub fn train(&mut self, training_steps: usize) -> Result<TrainStat> {
        let started = Instant::now();
        let stop = StopFlag::new();
        let prediction_queue = Arc::new(SignalQueue::new());
        let training_queue = Arc::new(SignalQueue::new());
        let ready = Arc::new(ReadyLists::new());
        let progress = Arc::new(Mutex::new(Progress {
            trained_steps: 0,
            average_loss: L::default(),
            pending_save: None,
        }));
        let (stat_tx, stat_rx) = crossbeam_channel::unbounded();

        let mut predictor_gates = Vec::with_capacity(self.config.num_predictors);
        let mut predictor_threads = Vec::with_capacity(self.config.num_predictors);
        for id in 0..self.config.num_predictors {
            let gate = Arc::new(JobGate::new());
            predictor_gates.push(gate.clone());
            predictor_threads.push(spawn_predictor(PredictorContext::<E> {
                id,
                min_batch_size: self.config.min_prediction_batch_size,
                max_batch_size: self.config.max_prediction_batch_size,
                queue: prediction_queue.clone(),
                ready: ready.clone(),
                gate,
                stop: stop.clone(),
            }));
        }

        let mut trainer_gates = Vec::with_capacity(self.config.num_trainers);
        let mut trainer_threads = Vec::with_capacity(self.config.num_trainers);
        for id in 0..self.config.num_trainers {
            let gate = Arc::new(JobGate::new());
            trainer_gates.push(gate.clone());
            trainer_threads.push(spawn_trainer(TrainerContext::<E> {
                id,
                t_max: self.config.t_max,
                discount: self.config.discount,
                min_batch_size: self.config.min_training_batch_size,
                max_batch_size: self.config.max_training_batch_size,
                queue: training_queue.clone(),
                ready: ready.clone(),
                gate,
                stop: stop.clone(),
            }));
        }

        let params = ActorParams {
            t_max: self.config.t_max,
            max_episode_length: self.config.max_episode_length,
            min_prediction_batch_size: self.config.min_prediction_batch_size,
            min_training_batch_size: self.config.min_training_batch_size,
        };
        let mut actor_slots = Vec::with_capacity(self.config.num_actors);
        let mut actor_threads = Vec::with_capacity(self.config.num_actors);
        for id in 0..self.config.num_actors {
            let slot = Arc::new(PolicySlot::new());
            actor_slots.push(slot.clone());
            actor_threads.push(spawn_actor(ActorContext::<E> {
                id,
                env_config: self.env_config.clone(),
                params: params.clone(),
                prediction_queue: prediction_queue.clone(),
                training_queue: training_queue.clone(),
                slot,
                stats: stat_tx.clone(),
            }));
        }

        info!("starts training loop");
        let result = self.coordinate(&ready, &progress, training_steps);

        // Shutdown order: predictors, then trainers, then actors. Anything
        // left in the queues is dropped with them.
        stop.set();
        prediction_queue.wake_all();
        for gate in &predictor_gates {
            gate.stop();
        }
        for thread in predictor_threads {
            let _ = thread.join();
        }
        training_queue.wake_all();
        for gate in &trainer_gates {
            gate.stop();
        }
        for thread in trainer_threads {
            let _ = thread.join();
        }
        for slot in &actor_slots {
            slot.stop();
        }
        for thread in actor_threads {
            let _ = thread.join();
        }

        drop(stat_tx);
        let stats: Vec<ActorStat> = stat_rx.try_iter().collect();
        if !stats.is_empty() {
            info!("stats of actor sampling loops");
            info!("{}", actor_stats_fmt(&stats));
        }

        result?;
        let trained_steps = progress.lock().unwrap().trained_steps;
        let duration = started.elapsed();
        Ok(TrainStat {
            trained_steps,
            duration,
            steps_per_sec: trained_steps as f32 / duration.as_secs_f32(),
        })
    }

    /// The coordinator loop: waits for published work, hands it to the
    /// agent, and tracks training progress through the completion
    /// callbacks.
    fn coordinate(
        &mut self,
        ready: &ReadyLists<E>,
        progress: &Arc<Mutex<Progress<L>>>,
        training_steps: usize,
    ) -> Result<()> {
        let decay = self.config.average_loss_decay;
        let log_interval = self.config.log_interval_steps;
        let save_interval = self.config.save_interval_steps;
        let mut trainings = Vec::new();
        let mut predictions = Vec::new();

        while progress.lock().unwrap().trained_steps < training_steps {
            ready.take(&mut trainings, &mut predictions);
            for (batch, gate) in trainings.drain(..) {
                let num_datas = batch.num_samples();
                let shared = progress.clone();
                self.agent.train(
                    batch,
                    Box::new(move |batch, loss| {
                        let mut p = shared.lock().unwrap();
                        p.average_loss =
                            L::exponential_moving_average(&p.average_loss, &loss, decay);
                        let prev_steps = p.trained_steps;
                        p.trained_steps += num_datas as usize;
                        if let Some(interval) = log_interval {
                            if p.trained_steps / interval != prev_steps / interval {
                                info!("steps {} , loss {}", p.trained_steps, p.average_loss);
                            }
                        }
                        if let Some(interval) = save_interval {
                            if p.trained_steps / interval != prev_steps / interval {
                                p.pending_save = Some(p.trained_steps as i64);
                            }
                        }
                        drop(p);
                        gate.complete(batch);
                    }),
                )?;
                self.save_if_pending(progress)?;
            }
            for (batch, gate) in predictions.drain(..) {
                self.agent
                    .predict(batch, Box::new(move |batch| gate.complete(batch)))?;
                self.save_if_pending(progress)?;
            }
        }

        info!("training finished");
        // Deferred completions may still hold worker batches; drain them so
        // every parked worker is released before the threads are joined.
        self.agent.sync()?;
        self.save_if_pending(progress)?;
        Ok(())
    }

    /// Checkpoints the agent if a completion callback crossed a save
    /// boundary.
    ///
    /// Callbacks cannot call `save` themselves: they would need the agent
    /// that is currently executing them. They record the crossing instead
    /// and the coordinator saves as soon as the agent call returns.
    fn save_if_pending(&mut self, progress: &Arc<Mutex<Progress<L>>>) -> Result<()> {
        let pending = progress.lock().unwrap().pending_save.take();
        if let Some(index) = pending {
            self.agent.save(index)?;
        }
        Ok(())
    }
}
