//! Gameplay events
//!
//! The simulation never talks to rendering or audio directly. It queues
//! events on the session; the host drains them after each tick and fires
//! whatever presentation it likes.

use glam::{IVec3, Vec3};
use serde::{Deserialize, Serialize};

use super::block::ShoveRejection;
use super::query::BlockId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    // Blocks
    ShoveStarted { block: BlockId, charged: bool },
    ShoveRejected { block: BlockId, reason: ShoveRejection },
    WallCleared { cell: IVec3 },
    BlockLanded { block: BlockId, position: Vec3 },
    /// Charged shove ended over a drop; the block hangs for `delay` seconds
    BlockOverhang { block: BlockId, delay: f32 },
    BlockFalling { block: BlockId },
    BlockReset { block: BlockId, position: Vec3 },
    BlockBroken { block: BlockId },
    BlockRestored { block: BlockId, position: Vec3 },

    // Player
    Footstep,
    SwingCharged,
    Swung { charged: bool },
    Dug { cell: IVec3 },
    DigFinished,
    TreasureRevealed { id: u32, position: Vec3 },
    TreasureCollected { id: u32, gold: u32 },
    Jumped { target: Vec3 },
    JumpLanded { position: Vec3 },
    PlayerDamaged { health: u8 },
    PlayerDied { deaths: u32 },
    PlayerRespawned { position: Vec3 },
    CheckpointReached { index: usize },

    // Enemies
    CannonFired { enemy: u32, ball: usize },
    ProjectileReflected { ball: usize },
    ProjectileImpact { ball: usize, position: Vec3 },
    EnemyStunned { enemy: u32 },
    EnemyRecovered { enemy: u32 },

    // Session
    Paused,
    Resumed,
}
