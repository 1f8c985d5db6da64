//! Shovelstone - grid-aligned dig/shove puzzle simulation
//!
//! Core modules:
//! - `sim`: Deterministic simulation (blocks, player, enemies, checkpoints)
//! - `settings`: Data-driven gameplay tuning and audio volumes
//! - `level`: JSON level descriptions
//! - `audio`: Mapping of gameplay events to sound effects

pub mod audio;
pub mod level;
pub mod settings;
pub mod sim;

pub use level::LevelDesc;
pub use settings::Settings;

use glam::Vec3;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Half the edge length of a grid cube
    pub const HALF_CELL: f32 = 0.5;
    /// Resting objects sit exactly this far above the ground they stand on
    pub const LAYER_HEIGHT: f32 = 1.0;

    /// Shove linecast starts this far below the block centre
    pub const SHOVE_CAST_DROP: f32 = 0.1;
    /// Ramp probe starts this far below the block centre
    pub const RAMP_PROBE_DROP: f32 = 0.45;
    /// Range of the ramp probe
    pub const RAMP_PROBE_RANGE: f32 = 1.0;
    /// Height of the low ramp collider
    pub const RAMP_HEIGHT: f32 = 0.35;

    /// Player counts as standing on a cell within this horizontal tolerance
    pub const OCCUPANCY_TOLERANCE: f32 = 0.5;
}

/// Horizontal (x/z) distance between two points, ignoring height
#[inline]
pub fn horizontal_distance(a: Vec3, b: Vec3) -> f32 {
    let d = a - b;
    (d.x * d.x + d.z * d.z).sqrt()
}

/// True if `point` lies within `tolerance` of `cell` on both horizontal axes
#[inline]
pub fn within_cell(point: Vec3, cell: Vec3, tolerance: f32) -> bool {
    point.x >= cell.x - tolerance
        && point.x <= cell.x + tolerance
        && point.z >= cell.z - tolerance
        && point.z <= cell.z + tolerance
}

/// Critically damped approach of `current` toward `target`.
///
/// `smooth_time` is roughly the time to reach the target; `velocity` carries
/// the damping state between calls. Never overshoots.
pub fn smooth_damp(
    current: Vec3,
    target: Vec3,
    velocity: &mut Vec3,
    smooth_time: f32,
    dt: f32,
) -> Vec3 {
    let smooth_time = smooth_time.max(0.0001);
    let omega = 2.0 / smooth_time;
    let x = omega * dt;
    let exp = 1.0 / (1.0 + x + 0.48 * x * x + 0.235 * x * x * x);

    let change = current - target;
    let temp = (*velocity + omega * change) * dt;
    *velocity = (*velocity - omega * temp) * exp;
    let mut output = target + (change + temp) * exp;

    // Clamp if we passed the target
    if (target - current).dot(output - target) > 0.0 {
        output = target;
        *velocity = Vec3::ZERO;
    }
    output
}
