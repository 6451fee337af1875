//! Statistics of training runs.
use std::time::Duration;

/// Stats of the sampling loop of one actor.
#[derive(Clone, Debug)]
pub struct ActorStat {
    /// The number of environment steps taken.
    pub env_steps: usize,

    /// The number of episodes started.
    pub episodes: usize,

    /// Duration of the sampling loop.
    pub duration: Duration,
}

/// Returns a formatted string of a set of [`ActorStat`]s for reporting.
pub fn actor_stats_fmt(stats: &[ActorStat]) -> String {
    let mut s = "actor id, env steps, episodes, duration [sec], steps per sec\n".to_string();
    for (i, stat) in stats.iter().enumerate() {
        let n = stat.env_steps;
        let d = stat.duration.as_secs_f32();
        let p = (n as f32) / d;
        s += format!("{}, {}, {}, {}, {}\n", i, n, stat.episodes, d, p).as_str();
    }
    s
}

/// Stats of [`Server`](crate::Server)`::train()`.
#[derive(Clone, Debug)]
pub struct TrainStat {
    /// The number of steps trained on.
    pub trained_steps: usize,

    /// Duration of training.
    pub duration: Duration,

    /// Trained steps per second.
    pub steps_per_sec: f32,
}

impl TrainStat {
    /// Returns a formatted string.
    pub fn fmt(&self) -> String {
        let mut s = "trained steps, steps/sec, duration\n".to_string();
        s += format!(
            "{}, {}, {}\n",
            self.trained_steps,
            self.steps_per_sec,
            self.duration.as_secs_f32()
        )
        .as_str();
        s
    }
}
