//! Grid cells and facing-relative cell resolution
//!
//! The level is a lattice of unit cubes. Horizontal coordinates of anything
//! at rest are integers; height is a continuous layer value.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// One of the four horizontal grid directions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cardinal {
    PosX,
    NegX,
    PosZ,
    NegZ,
}

impl Cardinal {
    /// Fixed search order used when relocating displaced blocks
    pub const SEARCH_ORDER: [Cardinal; 4] =
        [Cardinal::PosX, Cardinal::NegX, Cardinal::PosZ, Cardinal::NegZ];

    /// Resolve a continuous facing vector to its dominant horizontal axis.
    ///
    /// Ties between `|x|` and `|z|` (including the zero vector) take the z
    /// axis. A zero component counts as positive.
    pub fn from_facing(facing: Vec3) -> Self {
        if facing.x.abs() > facing.z.abs() {
            if facing.x < 0.0 { Cardinal::NegX } else { Cardinal::PosX }
        } else if facing.z < 0.0 {
            Cardinal::NegZ
        } else {
            Cardinal::PosZ
        }
    }

    /// Unit vector for this direction
    pub fn unit(self) -> Vec3 {
        match self {
            Cardinal::PosX => Vec3::X,
            Cardinal::NegX => Vec3::NEG_X,
            Cardinal::PosZ => Vec3::Z,
            Cardinal::NegZ => Vec3::NEG_Z,
        }
    }
}

/// Right-hand vector for a facing (x right of +z, -z right of +x)
#[inline]
pub fn right_of_facing(facing: Vec3) -> Vec3 {
    Vec3::new(facing.z, 0.0, -facing.x)
}

/// Position `units` ahead of `base` along the dominant axis of `facing`.
/// The other horizontal axis and the height are left untouched.
pub fn cell_in_front(base: Vec3, facing: Vec3, units: f32) -> Vec3 {
    base + Cardinal::from_facing(facing).unit() * units
}

/// Position `units` behind `base` relative to `facing`
pub fn cell_behind(base: Vec3, facing: Vec3, units: f32) -> Vec3 {
    cell_in_front(base, -facing, units)
}

/// Position `units` to the right of `base` relative to `facing`
pub fn cell_right_of(base: Vec3, facing: Vec3, units: f32) -> Vec3 {
    cell_in_front(base, right_of_facing(facing), units)
}

/// Integer horizontal position plus a continuous height layer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridCell {
    pub x: i32,
    pub y: f32,
    pub z: i32,
}

impl GridCell {
    pub fn new(x: i32, y: f32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Quantize a world position (rounds x and z, keeps y)
    pub fn from_world(pos: Vec3) -> Self {
        Self {
            x: pos.x.round() as i32,
            y: pos.y,
            z: pos.z.round() as i32,
        }
    }

    pub fn to_world(self) -> Vec3 {
        Vec3::new(self.x as f32, self.y, self.z as f32)
    }

    /// Neighbour `steps` cells away in `dir`, same layer
    pub fn step(self, dir: Cardinal, steps: i32) -> Self {
        match dir {
            Cardinal::PosX => Self::new(self.x + steps, self.y, self.z),
            Cardinal::NegX => Self::new(self.x - steps, self.y, self.z),
            Cardinal::PosZ => Self::new(self.x, self.y, self.z + steps),
            Cardinal::NegZ => Self::new(self.x, self.y, self.z - steps),
        }
    }
}

impl From<GridCell> for Vec3 {
    fn from(cell: GridCell) -> Self {
        cell.to_world()
    }
}
