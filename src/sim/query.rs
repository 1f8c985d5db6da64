//! Spatial queries against level geometry
//!
//! Blocks, the player and projectiles only see the level through
//! [`SpatialQuery`]. [`GridWorld`] is the in-memory implementation used by
//! the headless runner and tests; [`SceneView`] layers the live movable
//! blocks over any static geometry.

use glam::{IVec3, Vec3};
use serde::{Deserialize, Serialize};

use crate::consts::{HALF_CELL, RAMP_HEIGHT};

/// Identifier of a movable block
pub type BlockId = u32;

/// Closed set of surface kinds a query can report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SurfaceTag {
    /// Walkable, diggable floor tile
    Ground,
    /// Solid wall
    Wall,
    /// Invisible level boundary (stops the player only)
    BoundaryWall,
    /// Checkpoint trigger volume
    Checkpoint,
    /// Wall that gives way when a block is shoved through it
    BreakableWall,
    /// Low ramp lip
    Ramp,
    /// A movable block
    Movable,
}

impl SurfaceTag {
    /// Shoves travel through these (breakable walls are cleared on the way)
    pub fn passable_for_shove(self) -> bool {
        matches!(
            self,
            SurfaceTag::BoundaryWall | SurfaceTag::Checkpoint | SurfaceTag::BreakableWall
        )
    }

    /// Triggers and boundary walls are not solid
    pub fn is_solid(self) -> bool {
        !matches!(self, SurfaceTag::BoundaryWall | SurfaceTag::Checkpoint)
    }

    /// Whether something can rest on top of this surface
    pub fn supports(self) -> bool {
        self.is_solid()
    }

    /// Whether the player's movement is stopped by this surface
    pub fn blocks_player(self) -> bool {
        self != SurfaceTag::Checkpoint
    }

    /// Whether projectiles collide with this surface
    pub fn stops_projectiles(self) -> bool {
        self.is_solid()
    }
}

/// What a query hit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Collider {
    /// Static tile at a lattice cell
    Static(IVec3),
    /// Movable block
    Block(BlockId),
}

/// Result of a ray or line cast
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    /// Entry point on the collider surface
    pub position: Vec3,
    /// Distance from the cast origin
    pub distance: f32,
    pub tag: SurfaceTag,
    pub collider: Collider,
    /// Centre of the hit collider's cell (ground height for landing)
    pub anchor: Vec3,
}

/// Read-only spatial query surface
pub trait SpatialQuery {
    /// Every hit along the ray within `max_distance`, nearest first.
    /// `direction` need not be normalized.
    fn raycast_all(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Vec<Hit>;

    /// Nearest hit along the ray
    fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<Hit> {
        self.raycast_all(origin, direction, max_distance).into_iter().next()
    }

    /// Every hit on the segment `a -> b`, nearest first
    fn linecast_all(&self, a: Vec3, b: Vec3) -> Vec<Hit> {
        let delta = b - a;
        let length = delta.length();
        if length <= f32::EPSILON {
            return Vec::new();
        }
        self.raycast_all(a, delta / length, length)
    }

    /// Nearest hit on the segment `a -> b`
    fn linecast(&self, a: Vec3, b: Vec3) -> Option<Hit> {
        self.linecast_all(a, b).into_iter().next()
    }

    /// Nearest surface below `origin` that can carry a resting object
    fn ground_below(&self, origin: Vec3, max_distance: f32) -> Option<Hit> {
        self.raycast_all(origin, Vec3::NEG_Y, max_distance)
            .into_iter()
            .find(|hit| hit.tag.supports())
    }
}

/// Geometry that can also switch static tiles on and off
pub trait SceneGeometry: SpatialQuery {
    /// Enable or disable the static tile at `cell`. Returns false if there is
    /// no tile there.
    fn set_active(&mut self, cell: IVec3, active: bool) -> bool;
}

/// Slab intersection of a ray with an axis-aligned box.
/// Returns the entry distance (0 when starting inside).
pub(crate) fn ray_box(origin: Vec3, dir: Vec3, min: Vec3, max: Vec3, max_distance: f32) -> Option<f32> {
    let mut t_near = 0.0f32;
    let mut t_far = max_distance;

    for axis in 0..3 {
        let o = origin[axis];
        let d = dir[axis];
        if d.abs() < 1e-8 {
            // Parallel to this slab
            if o < min[axis] || o > max[axis] {
                return None;
            }
            continue;
        }
        let inv = 1.0 / d;
        let mut t0 = (min[axis] - o) * inv;
        let mut t1 = (max[axis] - o) * inv;
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
        }
        t_near = t_near.max(t0);
        t_far = t_far.min(t1);
        if t_near > t_far {
            return None;
        }
    }

    Some(t_near)
}

/// A static lattice tile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tile {
    pub cell: IVec3,
    pub tag: SurfaceTag,
    /// Collider height from the bottom of the cell (1.0 = full cube)
    pub height: f32,
    pub active: bool,
}

impl Tile {
    pub fn new(cell: IVec3, tag: SurfaceTag) -> Self {
        let height = if tag == SurfaceTag::Ramp { RAMP_HEIGHT } else { 1.0 };
        Self {
            cell,
            tag,
            height,
            active: true,
        }
    }

    pub fn centre(&self) -> Vec3 {
        self.cell.as_vec3()
    }

    fn bounds(&self) -> (Vec3, Vec3) {
        let c = self.centre();
        let min = c - Vec3::splat(HALF_CELL);
        let max = Vec3::new(c.x + HALF_CELL, min.y + self.height, c.z + HALF_CELL);
        (min, max)
    }
}

/// In-memory static level geometry
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GridWorld {
    tiles: Vec<Tile>,
}

impl GridWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) the tile at `cell`
    pub fn insert(&mut self, cell: IVec3, tag: SurfaceTag) {
        self.tiles.retain(|t| t.cell != cell);
        self.tiles.push(Tile::new(cell, tag));
    }

    /// Fill a rectangle of ground tiles at layer `y` (inclusive bounds)
    pub fn fill_ground(&mut self, min: (i32, i32), max: (i32, i32), y: i32) {
        for x in min.0..=max.0 {
            for z in min.1..=max.1 {
                self.insert(IVec3::new(x, y, z), SurfaceTag::Ground);
            }
        }
    }

    pub fn remove(&mut self, cell: IVec3) -> Option<Tile> {
        let idx = self.tiles.iter().position(|t| t.cell == cell)?;
        Some(self.tiles.remove(idx))
    }

    pub fn tile(&self, cell: IVec3) -> Option<&Tile> {
        self.tiles.iter().find(|t| t.cell == cell)
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn is_active(&self, cell: IVec3) -> bool {
        self.tile(cell).is_some_and(|t| t.active)
    }
}

impl SpatialQuery for GridWorld {
    fn raycast_all(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Vec<Hit> {
        let dir = direction.normalize_or_zero();
        if dir == Vec3::ZERO {
            return Vec::new();
        }

        let mut hits: Vec<(Hit, IVec3)> = self
            .tiles
            .iter()
            .filter(|t| t.active)
            .filter_map(|t| {
                let (min, max) = t.bounds();
                ray_box(origin, dir, min, max, max_distance).map(|d| {
                    let hit = Hit {
                        position: origin + dir * d,
                        distance: d,
                        tag: t.tag,
                        collider: Collider::Static(t.cell),
                        anchor: t.centre(),
                    };
                    (hit, t.cell)
                })
            })
            .collect();

        // Stable order: distance, then cell coordinates
        hits.sort_by(|(a, ca), (b, cb)| {
            a.distance
                .total_cmp(&b.distance)
                .then_with(|| ca.to_array().cmp(&cb.to_array()))
        });
        hits.into_iter().map(|(h, _)| h).collect()
    }
}

impl SceneGeometry for GridWorld {
    fn set_active(&mut self, cell: IVec3, active: bool) -> bool {
        match self.tiles.iter_mut().find(|t| t.cell == cell) {
            Some(tile) => {
                tile.active = active;
                true
            }
            None => false,
        }
    }
}

/// Collision box of a live movable block
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockBox {
    pub id: BlockId,
    pub centre: Vec3,
}

/// Static geometry with the live blocks layered on top
pub struct SceneView<'a, Q: SpatialQuery + ?Sized> {
    statics: &'a Q,
    blocks: &'a [BlockBox],
    exclude: Option<BlockId>,
}

impl<'a, Q: SpatialQuery + ?Sized> SceneView<'a, Q> {
    pub fn new(statics: &'a Q, blocks: &'a [BlockBox]) -> Self {
        Self {
            statics,
            blocks,
            exclude: None,
        }
    }

    /// Ignore one block (the one doing the querying)
    pub fn excluding(mut self, id: BlockId) -> Self {
        self.exclude = Some(id);
        self
    }
}

impl<Q: SpatialQuery + ?Sized> SpatialQuery for SceneView<'_, Q> {
    fn raycast_all(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Vec<Hit> {
        let dir = direction.normalize_or_zero();
        if dir == Vec3::ZERO {
            return Vec::new();
        }

        let mut hits = self.statics.raycast_all(origin, dir, max_distance);
        for b in self.blocks.iter().filter(|b| Some(b.id) != self.exclude) {
            let min = b.centre - Vec3::splat(HALF_CELL);
            let max = b.centre + Vec3::splat(HALF_CELL);
            if let Some(d) = ray_box(origin, dir, min, max, max_distance) {
                hits.push(Hit {
                    position: origin + dir * d,
                    distance: d,
                    tag: SurfaceTag::Movable,
                    collider: Collider::Block(b.id),
                    anchor: b.centre,
                });
            }
        }
        // sort_by is stable, so statics stay ahead of blocks on ties
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn floor_world() -> GridWorld {
        let mut world = GridWorld::new();
        world.fill_ground((-3, -3), (6, 3), 0);
        world
    }

    #[test]
    fn test_ground_below_block_centre() {
        let world = floor_world();
        let hit = world.ground_below(Vec3::new(2.0, 1.0, 0.0), 1.0).expect("ground");
        assert_eq!(hit.tag, SurfaceTag::Ground);
        assert!((hit.distance - 0.5).abs() < 1e-5);
        assert_eq!(hit.anchor, Vec3::new(2.0, 0.0, 0.0));
    }

    #[test]
    fn test_no_ground_past_edge() {
        let world = floor_world();
        assert!(world.ground_below(Vec3::new(7.0, 1.0, 0.0), 1.0).is_none());
    }

    #[test]
    fn test_linecast_hits_nearest_wall() {
        let mut world = floor_world();
        world.insert(IVec3::new(3, 1, 0), SurfaceTag::Wall);
        world.insert(IVec3::new(5, 1, 0), SurfaceTag::Wall);
        let hit = world
            .linecast(Vec3::new(0.0, 0.9, 0.0), Vec3::new(6.0, 0.9, 0.0))
            .expect("hit");
        assert_eq!(hit.collider, Collider::Static(IVec3::new(3, 1, 0)));
        assert!((hit.position.x - 2.5).abs() < 1e-5);
    }

    #[test]
    fn test_linecast_stops_short_of_target() {
        let mut world = floor_world();
        world.insert(IVec3::new(4, 1, 0), SurfaceTag::Wall);
        assert!(world.linecast(Vec3::new(0.0, 0.9, 0.0), Vec3::new(3.0, 0.9, 0.0)).is_none());
    }

    #[test]
    fn test_ramp_is_low() {
        let mut world = floor_world();
        world.insert(IVec3::new(1, 1, 0), SurfaceTag::Ramp);
        // Passes over the lip
        assert!(world.linecast(Vec3::new(0.0, 0.9, 0.0), Vec3::new(2.0, 0.9, 0.0)).is_none());
        // Low probe catches it
        let hit = world.raycast(Vec3::new(0.0, 0.55, 0.0), Vec3::X, 1.0).expect("ramp");
        assert_eq!(hit.tag, SurfaceTag::Ramp);
    }

    #[test]
    fn test_inactive_tiles_are_ignored() {
        let mut world = floor_world();
        let cell = IVec3::new(2, 0, 0);
        assert!(world.set_active(cell, false));
        assert!(world.ground_below(Vec3::new(2.0, 1.0, 0.0), 1.0).is_none());
        assert!(!world.set_active(IVec3::new(99, 0, 0), false));
    }

    #[test]
    fn test_scene_view_layers_blocks() {
        let world = floor_world();
        let blocks = [
            BlockBox { id: 1, centre: Vec3::new(0.0, 1.0, 0.0) },
            BlockBox { id: 2, centre: Vec3::new(2.0, 1.0, 0.0) },
        ];
        let view = SceneView::new(&world, &blocks).excluding(1);
        let hit = view
            .linecast(Vec3::new(0.0, 0.9, 0.0), Vec3::new(3.0, 0.9, 0.0))
            .expect("block hit");
        assert_eq!(hit.collider, Collider::Block(2));
        assert_eq!(hit.tag, SurfaceTag::Movable);

        // A block can stand on another block
        let stacked = view.ground_below(Vec3::new(2.0, 2.0, 0.0), 1.0).expect("support");
        assert_eq!(stacked.anchor.y, 1.0);
    }

    #[test]
    fn test_ground_below_skips_triggers() {
        let mut world = floor_world();
        world.insert(IVec3::new(1, 1, 0), SurfaceTag::Checkpoint);
        let hit = world.ground_below(Vec3::new(1.0, 1.6, 0.0), 2.0).expect("floor");
        assert_eq!(hit.tag, SurfaceTag::Ground);
    }
}
