//! Session state and the player-driven gameplay actions
//!
//! Everything the simulation owns lives on [`Session`]. Static level geometry
//! stays outside and is passed in to each operation that needs it.

use glam::{IVec3, Vec3};
use serde::{Deserialize, Serialize};

use super::block::{BlockState, MovableBlock, ShoveRejection, ShoveRequest, check_shove_path};
use super::enemy::{CannonballPool, Enemy};
use super::events::GameEvent;
use super::grid::{Cardinal, GridCell, cell_in_front};
use super::ledger::CheckpointLedger;
use super::player::{Damage, Player, PlayerStep, Tool};
use super::query::{BlockBox, BlockId, Collider, SceneGeometry, SceneView, SpatialQuery, SurfaceTag};
use crate::consts::{HALF_CELL, OCCUPANCY_TOLERANCE};
use crate::{horizontal_distance, within_cell};
use crate::settings::Settings;

/// Per-run counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    pub gold: u32,
    pub deaths: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TreasureState {
    Buried,
    Revealed,
    Collected,
}

/// Gold buried under a ground tile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Treasure {
    pub id: u32,
    /// Ground tile it is buried under
    pub cell: IVec3,
    /// Where it sits once dug up
    pub position: Vec3,
    pub gold: u32,
    pub state: TreasureState,
}

/// Complete simulation state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub settings: Settings,
    pub paused: bool,
    /// Multiplier on every timer and motion (0 freezes the world)
    pub time_scale: f32,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub player: Player,
    /// Movable blocks (sorted by id for determinism)
    pub blocks: Vec<MovableBlock>,
    pub enemies: Vec<Enemy>,
    pub cannonballs: CannonballPool,
    pub ledger: CheckpointLedger,
    pub treasures: Vec<Treasure>,
    /// Ground tiles that have already been dug
    pub dug_cells: Vec<IVec3>,
    pub stats: RunStats,
    /// Events waiting for the host (not persisted)
    #[serde(skip)]
    pub events: Vec<GameEvent>,
    next_id: u32,
}

impl Session {
    pub fn new(settings: Settings, player_start: Vec3, checkpoints: impl IntoIterator<Item = Vec3>) -> Self {
        Self {
            player: Player::new(player_start, &settings),
            cannonballs: CannonballPool::new(settings.cannonball_pool_size),
            ledger: CheckpointLedger::new(checkpoints, player_start),
            settings,
            paused: false,
            time_scale: 1.0,
            time_ticks: 0,
            blocks: Vec::new(),
            enemies: Vec::new(),
            treasures: Vec::new(),
            dug_cells: Vec::new(),
            stats: RunStats::default(),
            events: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn add_block(&mut self, spawn: Vec3) -> BlockId {
        let id = self.next_entity_id();
        self.blocks.push(MovableBlock::new(id, spawn));
        id
    }

    pub fn add_enemy(&mut self, position: Vec3, facing: Cardinal) -> u32 {
        let id = self.next_entity_id();
        self.enemies.push(Enemy::new(id, position, facing));
        id
    }

    /// Bury `gold` under the ground tile at `cell`
    pub fn add_treasure(&mut self, cell: IVec3, gold: u32) -> u32 {
        let id = self.next_entity_id();
        self.treasures.push(Treasure {
            id,
            cell,
            position: cell.as_vec3(),
            gold,
            state: TreasureState::Buried,
        });
        id
    }

    /// Ensure entities are sorted by ID for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.blocks.sort_by_key(|b| b.id);
        self.enemies.sort_by_key(|e| e.id);
        self.treasures.sort_by_key(|t| t.id);
    }

    pub fn block(&self, id: BlockId) -> Option<&MovableBlock> {
        self.blocks.iter().find(|b| b.id == id)
    }

    /// Collision boxes of every collidable block
    pub fn block_boxes(&self) -> Vec<BlockBox> {
        self.blocks.iter().filter_map(MovableBlock::collision_box).collect()
    }

    /// Hand the queued events to the host
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Mark a checkpoint reached and make it the player's respawn anchor
    pub fn record_checkpoint(&mut self, index: usize) -> bool {
        if !self.ledger.record_checkpoint(index) {
            return false;
        }
        self.player.current_checkpoint = Some(index);
        self.events.push(GameEvent::CheckpointReached { index });
        true
    }

    /// Skip ahead to the next undiscovered checkpoint
    pub fn advance_to_next_checkpoint(&mut self) -> Option<usize> {
        let index = self.ledger.advance_to_next_checkpoint(&mut self.player)?;
        self.events.push(GameEvent::CheckpointReached { index });
        Some(index)
    }

    /// Undo the current stretch of the level and queue the respawn
    pub fn apply_death(&mut self) -> Vec3 {
        let anchor = self
            .ledger
            .apply_death(&mut self.blocks, &mut self.player, &mut self.stats, &self.settings);
        self.events.push(GameEvent::PlayerDied {
            deaths: self.stats.deaths,
        });
        anchor
    }

    pub fn damage_player(&mut self) -> Damage {
        let damage = self.player.take_damage(&self.settings);
        if damage != Damage::Ignored {
            self.events.push(GameEvent::PlayerDamaged {
                health: self.player.health,
            });
        }
        damage
    }

    /// Shove one block. On success the breakable walls on its path are
    /// switched off and the block joins the ledger's moved set.
    pub fn shove_block<W: SceneGeometry + ?Sized>(
        &mut self,
        id: BlockId,
        request: &ShoveRequest,
        world: &mut W,
    ) -> Result<(), ShoveRejection> {
        let boxes = self.block_boxes();
        // Cells other blocks are already sliding into count as taken
        let claimed = self.blocks.iter().any(|b| {
            b.id != id
                && matches!(b.state, BlockState::BeingShoved(m)
                    if within_cell(request.target, m.target, OCCUPANCY_TOLERANCE))
        });
        let Some(block) = self.blocks.iter_mut().find(|b| b.id == id) else {
            return Err(ShoveRejection::Unavailable);
        };

        let scene = SceneView::new(&*world, &boxes).excluding(id);
        let outcome = if claimed {
            Err(ShoveRejection::ObstacleInPath)
        } else {
            block.try_shove(request, &scene)
        };
        let accepted = match outcome {
            Ok(accepted) => accepted,
            Err(reason) => {
                log::debug!("Shove of block {} rejected: {}", id, reason);
                self.events.push(GameEvent::ShoveRejected { block: id, reason });
                return Err(reason);
            }
        };

        for cell in accepted.cleared_walls {
            world.set_active(cell, false);
            self.events.push(GameEvent::WallCleared { cell });
        }
        self.ledger.record_block_moved(id);
        self.events.push(GameEvent::ShoveStarted {
            block: id,
            charged: request.charged,
        });
        Ok(())
    }

    /// Build the shove a swing held for `charge_secs` would give `block`
    pub fn shove_request<Q: SpatialQuery + ?Sized>(
        &self,
        block: &MovableBlock,
        direction: Cardinal,
        charge_secs: f32,
        scene: &Q,
    ) -> ShoveRequest {
        let s = &self.settings;
        // A block caught mid-slide is shoved from the cell it is passing through
        let base = GridCell::from_world(block.position);
        let cell_ahead = |k: u32| base.step(direction, k as i32).to_world();

        if charge_secs < s.charge_threshold {
            return ShoveRequest {
                direction,
                target: cell_ahead(s.shove_cells),
                travel_distance: s.shove_cells as f32,
                speed: s.shove_speed,
                min_snap_distance: s.min_snap_distance,
                charged: false,
            };
        }

        let ratio = s.charge_ratio(charge_secs);
        let extra = s.max_charged_cells.saturating_sub(s.shove_cells) as f32;
        let cells = s.shove_cells + (ratio * extra).round() as u32;

        // Stop in front of whatever is in the way
        let reachable = (1..=cells)
            .rev()
            .find(|&k| check_shove_path(block.position, direction, cell_ahead(k), scene).is_ok())
            .unwrap_or(cells);

        ShoveRequest {
            direction,
            target: cell_ahead(reachable),
            travel_distance: cells as f32,
            speed: s.shove_speed + (s.charged_shove_speed - s.shove_speed) * ratio,
            min_snap_distance: s.min_snap_distance,
            charged: true,
        }
    }

    /// Release a swing held for `charge_secs`. Reflects a nearby cannonball
    /// if there is one, otherwise shoves the block in front.
    pub fn swing<W: SceneGeometry + ?Sized>(&mut self, world: &mut W, charge_secs: f32) -> bool {
        if self.player.held_tool != Some(Tool::Shovel) || self.player.is_busy() {
            return false;
        }
        let charged = charge_secs >= self.settings.charge_threshold;
        self.events.push(GameEvent::Swung { charged });

        let facing = self.player.cardinal();
        if let Some(ball) = self.cannonballs.reflect_nearest(
            self.player.position,
            self.settings.reflect_radius,
            facing.unit(),
            &self.settings,
        ) {
            self.events.push(GameEvent::ProjectileReflected { ball });
            return true;
        }

        let boxes = self.block_boxes();
        let request = {
            let scene = SceneView::new(&*world, &boxes);
            let target = scene
                .raycast_all(self.player.position, facing.unit(), self.settings.interaction_reach)
                .into_iter()
                .find(|hit| hit.tag.blocks_player() && hit.distance > 0.0);
            match target.map(|hit| hit.collider) {
                Some(Collider::Block(id)) => self
                    .block(id)
                    .map(|block| (id, self.shove_request(block, facing, charge_secs, &scene.excluding(id)))),
                _ => None,
            }
        };

        match request {
            Some((id, request)) => self.shove_block(id, &request, world).is_ok(),
            None => false,
        }
    }

    /// Dig the ground tile under the player
    pub fn dig<Q: SpatialQuery + ?Sized>(&mut self, scene: &Q) -> Option<IVec3> {
        if self.player.held_tool != Some(Tool::Shovel) || self.player.is_busy() {
            return None;
        }
        let ground = scene.ground_below(self.player.position, self.settings.ground_probe_distance)?;
        let (SurfaceTag::Ground, Collider::Static(cell)) = (ground.tag, ground.collider) else {
            return None;
        };
        if self.dug_cells.contains(&cell) {
            return None;
        }

        self.dug_cells.push(cell);
        self.player
            .begin_action(self.settings.dig_duration, PlayerStep::FinishDig);
        self.events.push(GameEvent::Dug { cell });

        let reveal_at = cell_in_front(self.player.position, self.player.facing, 1.0);
        for treasure in self
            .treasures
            .iter_mut()
            .filter(|t| t.cell == cell && t.state == TreasureState::Buried)
        {
            treasure.state = TreasureState::Revealed;
            treasure.position = reveal_at;
            self.events.push(GameEvent::TreasureRevealed {
                id: treasure.id,
                position: reveal_at,
            });
        }
        Some(cell)
    }

    /// Pick up the nearest revealed treasure in reach
    pub fn collect_treasure(&mut self) -> Option<u32> {
        let reach = self.settings.interaction_reach + HALF_CELL;
        let player = self.player.position;
        let treasure = self
            .treasures
            .iter_mut()
            .filter(|t| t.state == TreasureState::Revealed)
            .filter(|t| horizontal_distance(t.position, player) <= reach)
            .min_by(|a, b| {
                horizontal_distance(a.position, player).total_cmp(&horizontal_distance(b.position, player))
            })?;

        treasure.state = TreasureState::Collected;
        self.stats.gold += treasure.gold;
        self.events.push(GameEvent::TreasureCollected {
            id: treasure.id,
            gold: treasure.gold,
        });
        Some(treasure.gold)
    }

    /// Start a pogo hop if there is somewhere to land
    pub fn jump<Q: SpatialQuery + ?Sized>(&mut self, scene: &Q) -> Option<Vec3> {
        if self.player.held_tool != Some(Tool::PogoStick) || self.player.is_busy() {
            return None;
        }
        let target = self.player.jump_target(scene, &self.settings)?;
        self.player
            .begin_action(self.settings.jump_duration, PlayerStep::Land(target));
        self.events.push(GameEvent::Jumped { target });
        Some(target)
    }
}
