//! Environment implementation.
use crate::{
    board::Board,
    obs::{self, G2048ObsBatch},
};
use anyhow::Result;
use log::debug;
use rand::{rngs::StdRng, SeedableRng};
use relay_core::{Dir4, Env, EnvStatus};
use serde::{Deserialize, Serialize};

/// Configuration of [`G2048Env`].
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct G2048EnvConfig {}

/// The 2048 game as a training environment.
///
/// Rewards: `+1` for a move that changes the board, `-11` for one that does
/// not (the board stays as it was and no tile spawns), and `-10` for the
/// move after which no further move is possible, which ends the episode.
pub struct G2048Env {
    board: Board,
    rng: StdRng,
}

impl Env for G2048Env {
    type Config = G2048EnvConfig;
    type Obs = Board;
    type ObsBatch = G2048ObsBatch;
    type Act = Dir4;
    type Reward = f32;

    fn build(_config: &Self::Config, seed: i64) -> Result<Self> {
        Ok(Self {
            board: Board::default(),
            rng: StdRng::seed_from_u64(seed as u64),
        })
    }

    fn reset(&mut self) -> Self::Obs {
        self.board = Board::default();
        self.board.spawn(&mut self.rng);
        self.board.spawn(&mut self.rng);
        self.board.clone()
    }

    fn step(&mut self, act: &Self::Act) -> (Self::Obs, Self::Reward, EnvStatus) {
        let prev = self.board.clone();
        self.board.apply(*act);
        if self.board == prev {
            return (self.board.clone(), -11.0, EnvStatus::Running);
        }
        self.board.spawn(&mut self.rng);
        if self.board.is_dead() {
            (self.board.clone(), -10.0, EnvStatus::Finished)
        } else {
            (self.board.clone(), 1.0, EnvStatus::Running)
        }
    }

    fn is_valid_action(&self, act: &Self::Act) -> bool {
        self.board.changes_under(*act)
    }

    fn render(&self) {
        for row in self.board.cells() {
            debug!(
                "|{}|",
                row.iter()
                    .map(|&cell| {
                        if cell == 0 {
                            format!("{:>5}", ".")
                        } else {
                            format!("{:>5}", 1u32 << cell)
                        }
                    })
                    .collect::<String>()
            );
        }
        debug!("");
    }

    fn make_batch<'a, I>(observations: I, batch: &mut Self::ObsBatch)
    where
        I: Iterator<Item = &'a Self::Obs>,
    {
        obs::pack(observations, batch);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relay_core::DiscreteAction;

    #[test]
    fn reset_places_two_tiles() {
        let mut env = G2048Env::build(&G2048EnvConfig::default(), 0).unwrap();
        let board = env.reset();
        assert_eq!(board.count_empty(), 14);
    }

    #[test]
    fn ineffective_move_is_penalised_and_spawns_nothing() {
        let mut env = G2048Env::build(&G2048EnvConfig::default(), 0).unwrap();
        env.reset();
        let invalid = (0..4)
            .map(Dir4::from_id)
            .find(|a| !env.is_valid_action(a));
        // Two random tiles rarely block every direction, but if each move is
        // valid there is nothing to test here.
        if let Some(action) = invalid {
            let empty_before = env.board.count_empty();
            let (board, reward, status) = env.step(&action);
            assert_eq!(reward, -11.0);
            assert_eq!(status, EnvStatus::Running);
            assert_eq!(board.count_empty(), empty_before);
        }
    }

    #[test]
    fn valid_move_rewards_and_spawns() {
        let mut env = G2048Env::build(&G2048EnvConfig::default(), 7).unwrap();
        env.reset();
        let action = (0..4)
            .map(Dir4::from_id)
            .find(|a| env.is_valid_action(a))
            .unwrap();
        let before = env.board.clone();
        let (board, reward, status) = env.step(&action);
        assert_eq!(reward, 1.0);
        assert_eq!(status, EnvStatus::Running);
        assert_ne!(board, before);
    }

    #[test]
    fn same_seed_reproduces_the_same_game() {
        let play = |seed: i64| {
            let mut env = G2048Env::build(&G2048EnvConfig::default(), seed).unwrap();
            let mut boards = vec![env.reset()];
            for id in [0, 1, 2, 3, 0, 1, 2, 3] {
                let action = Dir4::from_id(id);
                let (board, _, status) = env.step(&action);
                boards.push(board);
                if status == EnvStatus::Finished {
                    break;
                }
            }
            boards
        };
        assert_eq!(play(42), play(42));
        assert_ne!(play(42), play(43));
    }

    #[test]
    fn finishing_move_ends_the_episode() {
        let mut env = G2048Env::build(&G2048EnvConfig::default(), 0).unwrap();
        // Sliding right frees exactly one cell, and whatever tile spawns
        // there (a 2 or a 4), no neighbour matches it: the board is dead.
        env.board = Board::from_cells([
            [1, 2, 1, 2],
            [2, 1, 2, 1],
            [3, 4, 3, 4],
            [5, 4, 5, 0],
        ]);
        assert!(env.is_valid_action(&Dir4::Right));
        let (board, reward, status) = env.step(&Dir4::Right);
        assert_eq!(reward, -10.0);
        assert_eq!(status, EnvStatus::Finished);
        assert_eq!(board.count_empty(), 0);
        assert!(board.is_dead());
    }
}
