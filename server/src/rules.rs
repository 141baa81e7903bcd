//! Scoring, win detection and round restart

use crate::config::GameConfig;
use crate::world::World;
use log::info;
use shared::Player;

/// True when a score moving from `before` to `after` reaches the threshold
/// for the first time.
pub fn crosses_win_threshold(before: u32, after: u32, winning_score: u32) -> bool {
    before < winning_score && after >= winning_score
}

/// Records the first winner of a tick. Later crossings in the same tick are
/// ignored.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WinTracker {
    winner: Option<u32>,
}

impl WinTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Awards `points` to `player` and notes a win if the threshold was
    /// crossed. Returns true when this award crossed it.
    pub fn award(&mut self, player: &mut Player, points: u32, winning_score: u32) -> bool {
        let before = player.score;
        player.score = player.score.saturating_add(points);

        let crossed = crosses_win_threshold(before, player.score, winning_score);
        if crossed && self.winner.is_none() {
            info!(
                "Player {} reached the winning score ({})",
                player.id, player.score
            );
            self.winner = Some(player.id);
        }
        crossed
    }

    /// Convenience for awarding to a player that may have disconnected.
    pub fn award_by_id(&mut self, world: &mut World, id: u32, points: u32, winning_score: u32) {
        if let Some(player) = world.players.get_mut(id) {
            self.award(player, points, winning_score);
        }
    }

    pub fn winner(&self) -> Option<u32> {
        self.winner
    }
}

/// Starts a fresh round in the same world: scores back to zero and lives back
/// to the starting count. Positions and the asteroid field are kept.
pub fn reset_round(world: &mut World, config: &GameConfig) {
    for player in world.players.values_mut() {
        player.score = 0;
        player.lives = config.player_start_lives;
    }
    info!("New round started with {} players", world.players.len());
}
