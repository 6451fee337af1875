//! Server configuration.
use anyhow::Result;
use relay_core::RelayError;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`Server`](crate::Server).
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ServerConfig {
    /// The number of actor threads, each driving one environment episode.
    pub num_actors: usize,

    /// The number of predictor threads assembling inference batches.
    pub num_predictors: usize,

    /// The number of trainer threads assembling training batches.
    pub num_trainers: usize,

    /// A predictor only wakes once this many observations are queued.
    pub min_prediction_batch_size: usize,

    /// Upper bound on the size of one inference batch.
    pub max_prediction_batch_size: usize,

    /// A trainer only wakes once this many fragments are queued.
    pub min_training_batch_size: usize,

    /// Upper bound on the number of fragments in one training batch.
    pub max_training_batch_size: usize,

    /// Fragment length: every submitted fragment holds exactly this many
    /// steps.
    pub t_max: usize,

    /// Truncates episodes after this many steps, padding the last fragment.
    pub max_episode_length: Option<usize>,

    /// Discount factor, in `(0, 1]`.
    pub discount: f32,

    /// Decay of the exponential moving average over training losses,
    /// in `[0, 1)`.
    pub average_loss_decay: f64,

    /// Interval, in trained steps, of the periodic loss log line.
    pub log_interval_steps: Option<usize>,

    /// Interval, in trained steps, of agent checkpoints.
    pub save_interval_steps: Option<usize>,
}

impl ServerConfig {
    /// Constructs [`ServerConfig`] from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let config = serde_yaml::from_reader(rdr)?;
        Ok(config)
    }

    /// Saves [`ServerConfig`] as YAML.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }

    /// Validates the configuration.
    pub fn check(&self) -> Result<()> {
        if self.num_actors == 0 {
            return Err(RelayError::InvalidConfig("num_actors must be positive".into()).into());
        }
        if self.num_predictors == 0 {
            return Err(
                RelayError::InvalidConfig("num_predictors must be positive".into()).into(),
            );
        }
        if self.num_trainers == 0 {
            return Err(
                RelayError::InvalidConfig("num_trainers must be positive".into()).into(),
            );
        }
        if self.t_max == 0 {
            return Err(RelayError::InvalidConfig("t_max must be positive".into()).into());
        }
        if self.min_prediction_batch_size == 0 || self.min_training_batch_size == 0 {
            return Err(
                RelayError::InvalidConfig("batch size minimums must be positive".into()).into(),
            );
        }
        if self.min_prediction_batch_size > self.max_prediction_batch_size {
            return Err(RelayError::InvalidConfig(
                "min_prediction_batch_size must not exceed max_prediction_batch_size".into(),
            )
            .into());
        }
        if self.min_training_batch_size > self.max_training_batch_size {
            return Err(RelayError::InvalidConfig(
                "min_training_batch_size must not exceed max_training_batch_size".into(),
            )
            .into());
        }
        if !(self.discount > 0.0 && self.discount <= 1.0) {
            return Err(
                RelayError::InvalidConfig("discount must be in (0, 1]".into()).into(),
            );
        }
        if !(0.0..1.0).contains(&self.average_loss_decay) {
            return Err(
                RelayError::InvalidConfig("average_loss_decay must be in [0, 1)".into()).into(),
            );
        }
        if self.log_interval_steps == Some(0) || self.save_interval_steps == Some(0) {
            return Err(
                RelayError::InvalidConfig("intervals must be positive when set".into()).into(),
            );
        }
        if self.max_episode_length == Some(0) {
            return Err(RelayError::InvalidConfig(
                "max_episode_length must be positive when set".into(),
            )
            .into());
        }
        Ok(())
    }
}

impl Default for ServerConfig {
    /// Defaults sized for a large actor pool feeding a GPU-backed agent.
    fn default() -> Self {
        Self {
            num_actors: 2048,
            num_predictors: 2,
            num_trainers: 2,
            min_prediction_batch_size: 512,
            max_prediction_batch_size: 1024,
            min_training_batch_size: 512,
            max_training_batch_size: 1024,
            t_max: 5,
            max_episode_length: None,
            discount: 0.99,
            average_loss_decay: 0.99,
            log_interval_steps: Some(10_000),
            save_interval_steps: Some(1_000_000),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(ServerConfig::default().check().is_ok());
    }

    #[test]
    fn rejects_zero_worker_counts() {
        let config = ServerConfig {
            num_actors: 0,
            ..Default::default()
        };
        assert!(config.check().is_err());
        let config = ServerConfig {
            num_predictors: 0,
            ..Default::default()
        };
        assert!(config.check().is_err());
        let config = ServerConfig {
            num_trainers: 0,
            ..Default::default()
        };
        assert!(config.check().is_err());
    }

    #[test]
    fn rejects_inverted_batch_bounds() {
        let config = ServerConfig {
            min_prediction_batch_size: 8,
            max_prediction_batch_size: 4,
            ..Default::default()
        };
        assert!(config.check().is_err());
    }

    #[test]
    fn rejects_out_of_range_discount() {
        let config = ServerConfig {
            discount: 0.0,
            ..Default::default()
        };
        assert!(config.check().is_err());
        let config = ServerConfig {
            discount: 1.5,
            ..Default::default()
        };
        assert!(config.check().is_err());
    }

    #[test]
    fn yaml_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("server.yaml");
        let config = ServerConfig {
            num_actors: 16,
            max_episode_length: Some(100),
            ..Default::default()
        };
        config.save(&path).unwrap();
        let loaded = ServerConfig::load(&path).unwrap();
        assert_eq!(loaded.num_actors, 16);
        assert_eq!(loaded.max_episode_length, Some(100));
        assert_eq!(loaded.t_max, config.t_max);
    }
}
