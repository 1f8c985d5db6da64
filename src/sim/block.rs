//! Movable blocks: shove resolution and the fall/landing state machine

use glam::{IVec3, Vec3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::events::GameEvent;
use super::grid::Cardinal;
use super::query::{BlockBox, BlockId, Collider, SpatialQuery, SurfaceTag};
use super::timer::{Sequence, advance_slot};
use crate::consts::*;
use crate::settings::Settings;
use crate::{horizontal_distance, smooth_damp, within_cell};

/// Why a shove was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ShoveRejection {
    #[error("obstacle in path")]
    ObstacleInPath,
    #[error("ramp in path")]
    RampInPath,
    #[error("block is falling or broken")]
    Unavailable,
}

/// Parameters of a shove
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShoveRequest {
    pub direction: Cardinal,
    /// Cell the block should end up in
    pub target: Vec3,
    /// Distance the shove was meant to cover (may exceed the distance to
    /// `target` when the path was cut short)
    pub travel_distance: f32,
    /// Damping time of the approach
    pub speed: f32,
    pub min_snap_distance: f32,
    pub charged: bool,
}

/// A shove that passed its checks
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShoveAccepted {
    /// Breakable walls the block will pass through; the caller deactivates them
    pub cleared_walls: Vec<IVec3>,
}

/// In-flight shove
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShoveMotion {
    pub direction: Cardinal,
    pub origin: Vec3,
    pub target: Vec3,
    pub travel_distance: f32,
    pub speed: f32,
    pub min_snap_distance: f32,
    pub charged: bool,
    /// Damping state
    pub velocity: Vec3,
}

impl ShoveMotion {
    /// Fraction of the intended travel that was actually covered
    pub fn completion_ratio(&self) -> f32 {
        if self.travel_distance <= 0.0 {
            return 1.0;
        }
        (horizontal_distance(self.origin, self.target) / self.travel_distance).clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BlockState {
    Resting,
    BeingShoved(ShoveMotion),
    Falling,
    /// Hidden and non-colliding until it respawns
    Broken,
}

/// Deferred follow-ups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockStep {
    /// Overhang grace period ended
    BeginFall,
    /// Broken block respawns
    Restore,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovableBlock {
    pub id: BlockId,
    pub position: Vec3,
    spawn_location: Vec3,
    pub state: BlockState,
    pub pending: Option<Sequence<BlockStep>>,
    pub visible: bool,
    pub collidable: bool,
}

impl MovableBlock {
    pub fn new(id: BlockId, spawn_location: Vec3) -> Self {
        Self {
            id,
            position: spawn_location,
            spawn_location,
            state: BlockState::Resting,
            pending: None,
            visible: true,
            collidable: true,
        }
    }

    pub fn spawn_location(&self) -> Vec3 {
        self.spawn_location
    }

    pub fn is_resting(&self) -> bool {
        self.state == BlockState::Resting
    }

    pub fn is_falling(&self) -> bool {
        self.state == BlockState::Falling
    }

    pub fn is_being_shoved(&self) -> bool {
        matches!(self.state, BlockState::BeingShoved(_))
    }

    /// Collision box for scene queries (None while broken)
    pub fn collision_box(&self) -> Option<BlockBox> {
        self.collidable.then_some(BlockBox {
            id: self.id,
            centre: self.position,
        })
    }

    /// Validate and start a shove.
    ///
    /// `scene` must not contain this block. Rejections leave the block as
    /// it was; an accepted shove overwrites any shove or pending step.
    pub fn try_shove<Q: SpatialQuery + ?Sized>(
        &mut self,
        request: &ShoveRequest,
        scene: &Q,
    ) -> Result<ShoveAccepted, ShoveRejection> {
        if matches!(self.state, BlockState::Falling | BlockState::Broken) {
            return Err(ShoveRejection::Unavailable);
        }

        let cleared_walls = check_shove_path(self.position, request.direction, request.target, scene)?;

        self.pending = None;
        self.state = BlockState::BeingShoved(ShoveMotion {
            direction: request.direction,
            origin: self.position,
            target: request.target,
            travel_distance: request.travel_distance,
            speed: request.speed,
            min_snap_distance: request.min_snap_distance,
            charged: request.charged,
            velocity: Vec3::ZERO,
        });
        Ok(ShoveAccepted { cleared_walls })
    }

    /// Advance one tick.
    ///
    /// `scene` must not contain this block; `player_position` is used when
    /// the block has to respawn.
    pub fn step<Q: SpatialQuery + ?Sized>(
        &mut self,
        dt: f32,
        scene: &Q,
        player_position: Vec3,
        settings: &Settings,
        events: &mut Vec<GameEvent>,
    ) {
        if let Some(step) = advance_slot(&mut self.pending, dt) {
            match step {
                BlockStep::BeginFall => {
                    if self.state == BlockState::Resting {
                        self.state = BlockState::Falling;
                        events.push(GameEvent::BlockFalling { block: self.id });
                    }
                }
                BlockStep::Restore => {
                    let position = self.reset_object(player_position, scene, settings);
                    events.push(GameEvent::BlockRestored {
                        block: self.id,
                        position,
                    });
                    return;
                }
            }
        }

        match self.state {
            BlockState::Resting | BlockState::Broken => {}
            BlockState::BeingShoved(mut motion) => {
                self.position = smooth_damp(
                    self.position,
                    motion.target,
                    &mut motion.velocity,
                    motion.speed,
                    dt,
                );
                if self.position.distance(motion.target) < motion.min_snap_distance {
                    self.finish_shove(&motion, scene, settings, events);
                } else {
                    self.state = BlockState::BeingShoved(motion);
                }
            }
            BlockState::Falling => {
                self.position.y -= settings.gravity_speed * dt;

                if self.position.y < settings.fall_floor {
                    let position = self.reset_object(player_position, scene, settings);
                    log::debug!("Block {} fell off the level, reset to {}", self.id, position);
                    events.push(GameEvent::BlockReset {
                        block: self.id,
                        position,
                    });
                    return;
                }

                if let Some(ground) = scene.ground_below(self.position, settings.ground_probe_distance) {
                    self.land_on(ground.anchor);
                    events.push(GameEvent::BlockLanded {
                        block: self.id,
                        position: self.position,
                    });
                }
            }
        }
    }

    fn finish_shove<Q: SpatialQuery + ?Sized>(
        &mut self,
        motion: &ShoveMotion,
        scene: &Q,
        settings: &Settings,
        events: &mut Vec<GameEvent>,
    ) {
        self.position = motion.target;
        self.state = BlockState::Resting;

        match scene.ground_below(self.position, settings.ground_probe_distance) {
            Some(ground) => {
                self.land_on(ground.anchor);
                events.push(GameEvent::BlockLanded {
                    block: self.id,
                    position: self.position,
                });
            }
            None if motion.charged => {
                let delay = settings.overhang_delay(motion.completion_ratio());
                self.pending = Some(Sequence::new(delay, BlockStep::BeginFall));
                events.push(GameEvent::BlockOverhang {
                    block: self.id,
                    delay,
                });
            }
            None => {
                self.state = BlockState::Falling;
                events.push(GameEvent::BlockFalling { block: self.id });
            }
        }
    }

    fn land_on(&mut self, ground_anchor: Vec3) {
        self.position.y = ground_anchor.y + LAYER_HEIGHT;
        self.state = BlockState::Resting;
    }

    /// Hide the block and schedule its respawn. No-op if already broken.
    pub fn begin_break(&mut self, settings: &Settings) -> bool {
        if self.state == BlockState::Broken {
            return false;
        }
        self.state = BlockState::Broken;
        self.visible = false;
        self.collidable = false;
        self.pending = Some(Sequence::new(settings.break_duration, BlockStep::Restore));
        true
    }

    /// Put the block back at its spawn cell, or next to it if the player is
    /// standing there. Cancels anything in flight. Returns the new position.
    pub fn reset_object<Q: SpatialQuery + ?Sized>(
        &mut self,
        player_position: Vec3,
        scene: &Q,
        settings: &Settings,
    ) -> Vec3 {
        let spawn = self.spawn_location;
        let destination = if within_cell(player_position, spawn, OCCUPANCY_TOLERANCE) {
            relocation_candidate(spawn, scene, settings).unwrap_or_else(|| {
                log::warn!("Block {} has no free cell beside its spawn, using spawn", self.id);
                spawn
            })
        } else {
            spawn
        };
        self.place_at(destination);
        destination
    }

    /// Unconditional return to the spawn cell
    pub fn reset_to_spawn(&mut self) {
        self.place_at(self.spawn_location);
    }

    fn place_at(&mut self, position: Vec3) {
        self.position = position;
        self.state = BlockState::Resting;
        self.pending = None;
        self.visible = true;
        self.collidable = true;
    }
}

/// Check the path of a shove from `position` to `target`.
/// Returns the breakable walls that would be cleared on the way.
pub fn check_shove_path<Q: SpatialQuery + ?Sized>(
    position: Vec3,
    direction: Cardinal,
    target: Vec3,
    scene: &Q,
) -> Result<Vec<IVec3>, ShoveRejection> {
    let drop = Vec3::Y * SHOVE_CAST_DROP;
    let mut cleared = Vec::new();

    for hit in scene.linecast_all(position - drop, target - drop) {
        if hit.tag.passable_for_shove() {
            if let (SurfaceTag::BreakableWall, Collider::Static(cell)) = (hit.tag, hit.collider) {
                cleared.push(cell);
            }
            continue;
        }
        return Err(if hit.tag == SurfaceTag::Ramp {
            ShoveRejection::RampInPath
        } else {
            ShoveRejection::ObstacleInPath
        });
    }

    let low = position - Vec3::Y * RAMP_PROBE_DROP;
    if scene
        .raycast_all(low, direction.unit(), RAMP_PROBE_RANGE)
        .iter()
        .any(|hit| hit.tag == SurfaceTag::Ramp)
    {
        return Err(ShoveRejection::RampInPath);
    }

    Ok(cleared)
}

/// First cell beside `spawn` (in fixed cardinal order) that is reachable and
/// has ground under it
fn relocation_candidate<Q: SpatialQuery + ?Sized>(
    spawn: Vec3,
    scene: &Q,
    settings: &Settings,
) -> Option<Vec3> {
    Cardinal::SEARCH_ORDER
        .iter()
        .map(|dir| spawn + dir.unit() * settings.reset_search_offset)
        .find(|&candidate| {
            scene.linecast_all(spawn, candidate).iter().all(|hit| !hit.tag.is_solid())
                && scene
                    .ground_below(candidate, settings.ground_probe_distance)
                    .is_some()
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::sim::query::{GridWorld, SceneView};
    use proptest::prelude::*;

    const FAR_AWAY: Vec3 = Vec3::new(100.0, 1.0, 100.0);

    fn floor(min: (i32, i32), max: (i32, i32)) -> GridWorld {
        let mut world = GridWorld::new();
        world.fill_ground(min, max, 0);
        world
    }

    fn request(direction: Cardinal, target: Vec3, charged: bool) -> ShoveRequest {
        ShoveRequest {
            direction,
            target,
            travel_distance: 3.0,
            speed: 0.3,
            min_snap_distance: 0.01,
            charged,
        }
    }

    /// Tick until the block leaves BeingShoved; returns ticks taken
    fn run_shove(block: &mut MovableBlock, world: &GridWorld, events: &mut Vec<GameEvent>) -> usize {
        let settings = Settings::default();
        for i in 0..2000 {
            if !block.is_being_shoved() {
                return i;
            }
            block.step(SIM_DT, world, FAR_AWAY, &settings, events);
        }
        panic!("shove never finished");
    }

    #[test]
    fn test_shove_three_cells_east() {
        let world = floor((-2, -2), (5, 2));
        let mut block = MovableBlock::new(1, Vec3::new(0.0, 1.0, 0.0));
        let mut events = Vec::new();

        let accepted = block
            .try_shove(&request(Cardinal::PosX, Vec3::new(3.0, 1.0, 0.0), false), &world)
            .unwrap();
        assert!(accepted.cleared_walls.is_empty());
        run_shove(&mut block, &world, &mut events);

        assert_eq!(block.position, Vec3::new(3.0, 1.0, 0.0));
        assert_eq!(block.state, BlockState::Resting);
        assert!(matches!(events.last(), Some(GameEvent::BlockLanded { block: 1, .. })));
    }

    #[test]
    fn test_rejected_shove_has_no_side_effects() {
        let mut world = floor((-2, -2), (5, 2));
        world.insert(IVec3::new(2, 1, 0), SurfaceTag::Wall);
        let mut block = MovableBlock::new(1, Vec3::new(0.0, 1.0, 0.0));
        block.pending = Some(Sequence::new(1.0, BlockStep::BeginFall));
        let before = block.clone();

        let result = block.try_shove(&request(Cardinal::PosX, Vec3::new(3.0, 1.0, 0.0), false), &world);
        assert_eq!(result, Err(ShoveRejection::ObstacleInPath));
        assert_eq!(block.position, before.position);
        assert_eq!(block.state, before.state);
        assert_eq!(block.pending, before.pending);
    }

    #[test]
    fn test_ramp_blocks_shove() {
        let mut world = floor((-2, -2), (5, 2));
        world.insert(IVec3::new(1, 1, 0), SurfaceTag::Ramp);
        let mut block = MovableBlock::new(1, Vec3::new(0.0, 1.0, 0.0));
        let result = block.try_shove(&request(Cardinal::PosX, Vec3::new(1.0, 1.0, 0.0), false), &world);
        assert_eq!(result, Err(ShoveRejection::RampInPath));
        assert!(block.is_resting());
    }

    #[test]
    fn test_passable_tags_and_breakable_walls() {
        let mut world = floor((-2, -2), (5, 2));
        world.insert(IVec3::new(1, 1, 0), SurfaceTag::Checkpoint);
        world.insert(IVec3::new(2, 1, 0), SurfaceTag::BreakableWall);
        world.insert(IVec3::new(3, 1, 0), SurfaceTag::BoundaryWall);
        let mut block = MovableBlock::new(1, Vec3::new(0.0, 1.0, 0.0));
        let accepted = block
            .try_shove(&request(Cardinal::PosX, Vec3::new(3.0, 1.0, 0.0), false), &world)
            .unwrap();
        assert_eq!(accepted.cleared_walls, vec![IVec3::new(2, 1, 0)]);
        assert!(block.is_being_shoved());
    }

    #[test]
    fn test_other_block_obstructs() {
        let world = floor((-2, -2), (5, 2));
        let boxes = [BlockBox { id: 2, centre: Vec3::new(2.0, 1.0, 0.0) }];
        let scene = SceneView::new(&world, &boxes).excluding(1);
        let mut block = MovableBlock::new(1, Vec3::new(0.0, 1.0, 0.0));
        let result = block.try_shove(&request(Cardinal::PosX, Vec3::new(3.0, 1.0, 0.0), false), &scene);
        assert_eq!(result, Err(ShoveRejection::ObstacleInPath));
    }

    #[test]
    fn test_off_ledge_falls_immediately() {
        // Floor ends at x = 1
        let world = floor((-2, -2), (1, 2));
        let mut block = MovableBlock::new(1, Vec3::new(0.0, 1.0, 0.0));
        let mut events = Vec::new();
        block
            .try_shove(&request(Cardinal::PosX, Vec3::new(3.0, 1.0, 0.0), false), &world)
            .unwrap();
        run_shove(&mut block, &world, &mut events);
        assert_eq!(block.state, BlockState::Falling);
        assert_eq!(block.pending, None);
        assert_eq!(block.position, Vec3::new(3.0, 1.0, 0.0));
    }

    #[test]
    fn test_charged_overhang_delay() {
        let world = floor((-2, -2), (1, 2));
        let settings = Settings::default();
        let mut block = MovableBlock::new(1, Vec3::new(0.0, 1.0, 0.0));
        let mut events = Vec::new();

        // 2.75 of a planned 3.0 cells, past the 90% mark
        let mut req = request(Cardinal::PosX, Vec3::new(2.75, 1.0, 0.0), true);
        req.travel_distance = 3.0;
        block.try_shove(&req, &world).unwrap();
        run_shove(&mut block, &world, &mut events);

        assert!(block.is_resting());
        let pending = block.pending.expect("overhang pending");
        assert!((pending.remaining - 0.6).abs() < 1e-6);

        // Still hanging just before the delay runs out
        for _ in 0..30 {
            block.step(SIM_DT, &world, FAR_AWAY, &settings, &mut events);
        }
        assert!(block.is_resting());
        for _ in 0..10 {
            block.step(SIM_DT, &world, FAR_AWAY, &settings, &mut events);
        }
        assert!(block.position.y < 1.0 || block.is_falling());
    }

    #[test]
    fn test_partial_charged_overhang_uses_clamped_delay() {
        let world = floor((-2, -2), (0, 2));
        let mut block = MovableBlock::new(1, Vec3::new(0.0, 1.0, 0.0));
        let mut events = Vec::new();
        let mut req = request(Cardinal::PosX, Vec3::new(1.0, 1.0, 0.0), true);
        req.travel_distance = 4.0;
        block.try_shove(&req, &world).unwrap();
        run_shove(&mut block, &world, &mut events);
        // 0.2 * 0.25 = 0.05, clamped to 0.07
        let pending = block.pending.expect("overhang pending");
        assert!((pending.remaining - 0.07).abs() < 1e-6);
    }

    #[test]
    fn test_falling_lands_on_lower_layer() {
        let mut world = floor((-2, -2), (1, 2));
        world.fill_ground((2, -2), (5, 2), -3);
        let settings = Settings::default();
        let mut block = MovableBlock::new(1, Vec3::new(3.0, 1.0, 0.0));
        block.state = BlockState::Falling;
        let mut events = Vec::new();
        for _ in 0..200 {
            block.step(SIM_DT, &world, FAR_AWAY, &settings, &mut events);
            if block.is_resting() {
                break;
            }
        }
        assert!(block.is_resting());
        assert_eq!(block.position.y, -2.0);
    }

    #[test]
    fn test_fall_off_level_resets_to_spawn() {
        let world = floor((-2, -2), (1, 2));
        let settings = Settings::default();
        let mut block = MovableBlock::new(1, Vec3::new(0.0, 1.0, 0.0));
        block.position = Vec3::new(5.0, 1.0, 0.0);
        block.state = BlockState::Falling;
        let mut events = Vec::new();
        for _ in 0..600 {
            block.step(SIM_DT, &world, FAR_AWAY, &settings, &mut events);
            if block.is_resting() {
                break;
            }
        }
        assert_eq!(block.position, Vec3::new(0.0, 1.0, 0.0));
        assert!(events.iter().any(|e| matches!(e, GameEvent::BlockReset { block: 1, .. })));
    }

    #[test]
    fn test_reset_with_player_on_spawn_search_order() {
        let settings = Settings::default();
        let spawn = Vec3::new(0.0, 1.0, 0.0);
        let player = Vec3::new(0.2, 1.0, -0.3);

        // Everything open: +x wins
        let world = floor((-3, -3), (3, 3));
        let mut block = MovableBlock::new(1, spawn);
        assert_eq!(block.reset_object(player, &world, &settings), Vec3::new(2.0, 1.0, 0.0));

        // Wall on +x: -x next
        let mut world = floor((-3, -3), (3, 3));
        world.insert(IVec3::new(1, 1, 0), SurfaceTag::Wall);
        assert_eq!(block.reset_object(player, &world, &settings), Vec3::new(-2.0, 1.0, 0.0));

        // -x has no ground: +z next
        world.remove(IVec3::new(-2, 0, 0));
        assert_eq!(block.reset_object(player, &world, &settings), Vec3::new(0.0, 1.0, 2.0));

        // +z blocked too: -z last
        world.insert(IVec3::new(0, 1, 2), SurfaceTag::Wall);
        assert_eq!(block.reset_object(player, &world, &settings), Vec3::new(0.0, 1.0, -2.0));

        // Nothing left: spawn regardless
        world.insert(IVec3::new(0, 1, -1), SurfaceTag::Wall);
        assert_eq!(block.reset_object(player, &world, &settings), spawn);

        // Triggers and boundary walls in the way don't count
        let mut world = floor((-3, -3), (3, 3));
        world.insert(IVec3::new(1, 1, 0), SurfaceTag::Checkpoint);
        assert_eq!(block.reset_object(player, &world, &settings), Vec3::new(2.0, 1.0, 0.0));
        world.insert(IVec3::new(1, 1, 0), SurfaceTag::BoundaryWall);
        assert_eq!(block.reset_object(player, &world, &settings), Vec3::new(2.0, 1.0, 0.0));
    }

    #[test]
    fn test_reset_cancels_in_flight_work() {
        let world = floor((-3, -3), (3, 3));
        let settings = Settings::default();
        let mut block = MovableBlock::new(1, Vec3::new(0.0, 1.0, 0.0));
        block
            .try_shove(&request(Cardinal::PosZ, Vec3::new(0.0, 1.0, 2.0), false), &world)
            .unwrap();
        block.step(SIM_DT, &world, FAR_AWAY, &settings, &mut Vec::new());
        block.reset_object(FAR_AWAY, &world, &settings);
        assert_eq!(block.state, BlockState::Resting);
        assert_eq!(block.position, Vec3::new(0.0, 1.0, 0.0));
        assert!(block.pending.is_none());
    }

    #[test]
    fn test_break_and_restore() {
        let world = floor((-3, -3), (3, 3));
        let settings = Settings::default();
        let mut block = MovableBlock::new(1, Vec3::new(0.0, 1.0, 0.0));
        block.position = Vec3::new(2.0, 1.0, 0.0);
        let mut events = Vec::new();

        assert!(block.begin_break(&settings));
        assert!(!block.begin_break(&settings));
        assert!(block.collision_box().is_none());
        assert!(block.try_shove(&request(Cardinal::PosX, Vec3::new(3.0, 1.0, 0.0), false), &world).is_err());

        // 4 seconds at 60 Hz
        for _ in 0..239 {
            block.step(SIM_DT, &world, FAR_AWAY, &settings, &mut events);
        }
        assert_eq!(block.state, BlockState::Broken);
        for _ in 0..2 {
            block.step(SIM_DT, &world, FAR_AWAY, &settings, &mut events);
        }
        assert!(block.is_resting());
        assert!(block.visible && block.collidable);
        assert_eq!(block.position, Vec3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_reshove_overwrites_motion() {
        let world = floor((-3, -3), (5, 5));
        let settings = Settings::default();
        let mut block = MovableBlock::new(1, Vec3::new(0.0, 1.0, 0.0));
        block
            .try_shove(&request(Cardinal::PosX, Vec3::new(3.0, 1.0, 0.0), false), &world)
            .unwrap();
        block.step(SIM_DT, &world, FAR_AWAY, &settings, &mut Vec::new());
        let here = block.position;
        block
            .try_shove(&request(Cardinal::PosZ, here + Vec3::Z * 2.0, false), &world)
            .unwrap();
        match block.state {
            BlockState::BeingShoved(m) => {
                assert_eq!(m.direction, Cardinal::PosZ);
                assert_eq!(m.origin, here);
            }
            other => panic!("unexpected state {other:?}"),
        }
    }

    proptest! {
        #[test]
        fn prop_shove_always_terminates(
            cells in 1i32..6,
            speed in 0.05f32..1.0,
            edge in -1i32..7,
            charged in any::<bool>(),
        ) {
            let world = floor((-2, -2), (edge, 2));
            let settings = Settings::default();
            let mut block = MovableBlock::new(1, Vec3::new(0.0, 1.0, 0.0));
            let target = Vec3::new(cells as f32, 1.0, 0.0);
            let req = ShoveRequest {
                direction: Cardinal::PosX,
                target,
                travel_distance: cells as f32,
                speed,
                min_snap_distance: 0.01,
                charged,
            };
            block.try_shove(&req, &world).unwrap();

            let mut last = block.position.distance(target);
            let mut finished = false;
            for _ in 0..5000 {
                block.step(SIM_DT, &world, FAR_AWAY, &settings, &mut Vec::new());
                if !block.is_being_shoved() {
                    finished = true;
                    break;
                }
                let d = block.position.distance(target);
                prop_assert!(d < last);
                last = d;
            }
            prop_assert!(finished);
            prop_assert!(block.is_resting() || block.is_falling());
        }
    }
}
