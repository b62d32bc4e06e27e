//! Random automatic player.

use std::time::Duration;

use async_trait::async_trait;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tracing::{debug, info};

use noughts_core::{Board, GameOutcome, Role, SessionEvent};

use crate::config::AutoplayConfig;
use crate::player::Player;

/// Plays a uniformly random free cell after a fixed pause.
pub struct AutoPlayer {
    delay: Duration,
    rematch: bool,
    rng: StdRng,
}

impl AutoPlayer {
    pub fn new(config: &AutoplayConfig) -> Self {
        Self {
            delay: config.move_delay(),
            rematch: config.rematch,
            rng: StdRng::from_entropy(),
        }
    }

    /// Same player with a fixed seed, for reproducible games.
    pub fn with_seed(config: &AutoplayConfig, seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            ..Self::new(config)
        }
    }

    /// A random free cell, or `None` on a full board.
    pub fn pick(&mut self, board: &Board) -> Option<u8> {
        board.empty_cells().choose(&mut self.rng).copied()
    }
}

#[async_trait]
impl Player for AutoPlayer {
    async fn choose_cell(&mut self, board: &Board) -> Option<u8> {
        tokio::time::sleep(self.delay).await;
        let cell = self.pick(board);
        debug!("autoplay picked {cell:?}");
        cell
    }

    async fn rematch(&mut self, outcome: GameOutcome) -> bool {
        debug!("autoplay game over: {outcome:?}");
        self.rematch
    }

    fn show(&mut self, role: Role, event: &SessionEvent) {
        if let SessionEvent::Started { .. } = event {
            info!("autoplaying as {role} ({})", role.symbol());
        }
    }
}
