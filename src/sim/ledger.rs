//! Checkpoint & respawn ledger
//!
//! Tracks which checkpoints have been found, where the player respawns, and
//! which blocks have been pushed around since the last checkpoint so a death
//! only undoes the current stretch of the puzzle.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::block::MovableBlock;
use super::player::Player;
use super::query::BlockId;
use super::state::RunStats;
use crate::consts::OCCUPANCY_TOLERANCE;
use crate::settings::Settings;
use crate::within_cell;

/// Player must be within this height of a checkpoint to trigger it
const TRIGGER_HEIGHT: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub position: Vec3,
    pub discovered: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointLedger {
    /// All checkpoints in declaration order
    checkpoints: Vec<Checkpoint>,
    /// Index of the current respawn anchor
    current: Option<usize>,
    /// Respawn point before any checkpoint is found
    player_start: Vec3,
    /// Blocks moved since the last checkpoint (insertion order, no duplicates)
    moved_since_checkpoint: Vec<BlockId>,
}

impl CheckpointLedger {
    pub fn new(positions: impl IntoIterator<Item = Vec3>, player_start: Vec3) -> Self {
        Self {
            checkpoints: positions
                .into_iter()
                .map(|position| Checkpoint {
                    position,
                    discovered: false,
                })
                .collect(),
            current: None,
            player_start,
            moved_since_checkpoint: Vec::new(),
        }
    }

    pub fn checkpoints(&self) -> &[Checkpoint] {
        &self.checkpoints
    }

    pub fn current(&self) -> Option<usize> {
        self.current
    }

    pub fn discovered_count(&self) -> usize {
        self.checkpoints.iter().filter(|c| c.discovered).count()
    }

    pub fn moved_blocks(&self) -> &[BlockId] {
        &self.moved_since_checkpoint
    }

    /// Where the player comes back after dying
    pub fn respawn_anchor(&self) -> Vec3 {
        self.current
            .and_then(|i| self.checkpoints.get(i))
            .map_or(self.player_start, |c| c.position)
    }

    /// Checkpoint whose trigger volume contains `position`
    pub fn checkpoint_at(&self, position: Vec3) -> Option<usize> {
        self.checkpoints.iter().position(|c| {
            within_cell(position, c.position, OCCUPANCY_TOLERANCE)
                && (position.y - c.position.y).abs() < TRIGGER_HEIGHT
        })
    }

    /// Mark a checkpoint as reached. Returns false (and changes nothing) if
    /// it was already discovered or does not exist.
    pub fn record_checkpoint(&mut self, index: usize) -> bool {
        let Some(checkpoint) = self.checkpoints.get_mut(index) else {
            return false;
        };
        if checkpoint.discovered {
            return false;
        }
        checkpoint.discovered = true;
        self.current = Some(index);
        self.moved_since_checkpoint.clear();
        log::info!("Checkpoint {} reached", index);
        true
    }

    pub fn record_block_moved(&mut self, block: BlockId) {
        if !self.moved_since_checkpoint.contains(&block) {
            self.moved_since_checkpoint.push(block);
        }
    }

    /// Next checkpoint to skip to: the first undiscovered one in
    /// declaration order
    pub fn next_checkpoint(&self) -> Option<usize> {
        if self.discovered_count() >= self.checkpoints.len() {
            return None;
        }
        self.checkpoints.iter().position(|c| !c.discovered)
    }

    /// Reach the next checkpoint and move the player onto it
    pub fn advance_to_next_checkpoint(&mut self, player: &mut Player) -> Option<usize> {
        let index = self.next_checkpoint()?;
        self.record_checkpoint(index);
        player.current_checkpoint = Some(index);
        player.teleport(self.checkpoints[index].position);
        Some(index)
    }

    /// Undo the current stretch after the player dies.
    ///
    /// Blocks moved since the last checkpoint go back to spawn, the player is
    /// healed and queued for relocation to the respawn anchor. The moved set
    /// is kept, so repeating this only re-confirms spawn positions.
    pub fn apply_death(
        &self,
        blocks: &mut [MovableBlock],
        player: &mut Player,
        stats: &mut RunStats,
        settings: &Settings,
    ) -> Vec3 {
        for block in blocks
            .iter_mut()
            .filter(|b| self.moved_since_checkpoint.contains(&b.id))
        {
            block.reset_to_spawn();
        }

        player.reset_player(settings);
        stats.gold = stats.gold.saturating_sub(1);
        stats.deaths += 1;

        let anchor = self.respawn_anchor();
        player.schedule_relocation(anchor, settings.respawn_delay);
        log::info!(
            "Player died ({} deaths), respawning at {} in {}s",
            stats.deaths,
            anchor,
            settings.respawn_delay
        );
        anchor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::block::BlockState;

    fn ledger() -> CheckpointLedger {
        CheckpointLedger::new(
            [
                Vec3::new(5.0, 1.0, 0.0),
                Vec3::new(10.0, 1.0, 0.0),
                Vec3::new(15.0, 1.0, 0.0),
            ],
            Vec3::new(0.0, 1.0, 0.0),
        )
    }

    #[test]
    fn test_record_checkpoint_twice_clears_once() {
        let mut ledger = ledger();
        ledger.record_block_moved(1);
        assert!(ledger.record_checkpoint(0));
        assert!(ledger.moved_blocks().is_empty());

        ledger.record_block_moved(2);
        assert!(!ledger.record_checkpoint(0));
        assert_eq!(ledger.moved_blocks(), &[2]);
        assert_eq!(ledger.current(), Some(0));
    }

    #[test]
    fn test_record_block_moved_is_idempotent() {
        let mut ledger = ledger();
        ledger.record_block_moved(4);
        ledger.record_block_moved(4);
        ledger.record_block_moved(7);
        assert_eq!(ledger.moved_blocks(), &[4, 7]);
    }

    #[test]
    fn test_unknown_checkpoint_is_ignored() {
        let mut ledger = ledger();
        assert!(!ledger.record_checkpoint(9));
        assert_eq!(ledger.current(), None);
    }

    #[test]
    fn test_respawn_anchor_defaults_to_start() {
        let mut ledger = ledger();
        assert_eq!(ledger.respawn_anchor(), Vec3::new(0.0, 1.0, 0.0));
        ledger.record_checkpoint(1);
        assert_eq!(ledger.respawn_anchor(), Vec3::new(10.0, 1.0, 0.0));
    }

    #[test]
    fn test_checkpoint_trigger_volume() {
        let ledger = ledger();
        assert_eq!(ledger.checkpoint_at(Vec3::new(10.4, 1.0, -0.2)), Some(1));
        assert_eq!(ledger.checkpoint_at(Vec3::new(10.0, 3.0, 0.0)), None);
        assert_eq!(ledger.checkpoint_at(Vec3::new(7.0, 1.0, 0.0)), None);
    }

    #[test]
    fn test_advance_in_order_and_out_of_order() {
        let settings = Settings::default();
        let mut ledger = ledger();
        let mut player = Player::new(Vec3::new(0.0, 1.0, 0.0), &settings);

        assert_eq!(ledger.advance_to_next_checkpoint(&mut player), Some(0));
        assert_eq!(player.position, Vec3::new(5.0, 1.0, 0.0));

        // Checkpoint 2 found before 1: skipping goes to 1, not 2 again
        ledger.record_checkpoint(2);
        assert_eq!(ledger.advance_to_next_checkpoint(&mut player), Some(1));
        assert_eq!(player.current_checkpoint, Some(1));

        // All discovered: no-op
        assert_eq!(ledger.advance_to_next_checkpoint(&mut player), None);
        assert_eq!(player.position, Vec3::new(10.0, 1.0, 0.0));
    }

    #[test]
    fn test_apply_death_resets_moved_blocks_only() {
        let settings = Settings::default();
        let mut ledger = ledger();
        let mut blocks = vec![
            MovableBlock::new(1, Vec3::new(1.0, 1.0, 0.0)),
            MovableBlock::new(2, Vec3::new(2.0, 1.0, 0.0)),
        ];
        blocks[0].position = Vec3::new(1.0, 1.0, 3.0);
        blocks[0].state = BlockState::Falling;
        blocks[1].position = Vec3::new(2.0, 1.0, 3.0);
        ledger.record_block_moved(1);

        let mut player = Player::new(Vec3::new(4.0, 1.0, 4.0), &settings);
        player.health = 0;
        let mut stats = RunStats { gold: 0, deaths: 0 };

        let anchor = ledger.apply_death(&mut blocks, &mut player, &mut stats, &settings);
        assert_eq!(anchor, Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(blocks[0].position, Vec3::new(1.0, 1.0, 0.0));
        assert!(blocks[0].is_resting());
        assert_eq!(blocks[1].position, Vec3::new(2.0, 1.0, 3.0));
        assert_eq!(player.health, settings.max_health);
        assert_eq!(stats.gold, 0);
        assert_eq!(stats.deaths, 1);
        // Relocation is deferred
        assert_eq!(player.position, Vec3::new(4.0, 1.0, 4.0));
        assert!(player.is_busy());

        // Second death: nothing new to reset
        stats.gold = 5;
        ledger.apply_death(&mut blocks, &mut player, &mut stats, &settings);
        assert_eq!(blocks[0].position, Vec3::new(1.0, 1.0, 0.0));
        assert_eq!(blocks[1].position, Vec3::new(2.0, 1.0, 3.0));
        assert_eq!(stats.gold, 4);
        assert_eq!(stats.deaths, 2);
    }
}
