//! Level descriptions
//!
//! A level is a JSON document listing the static tiles and the entities that
//! start on them. [`LevelDesc::build`] turns it into a fresh [`Session`] plus
//! the [`GridWorld`] it plays in.

use std::fs;
use std::path::Path;

use glam::{IVec3, Vec3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::settings::{Settings, SettingsError};
use crate::sim::grid::{Cardinal, GridCell};
use crate::sim::query::{GridWorld, SurfaceTag};
use crate::sim::state::Session;

#[derive(Debug, Error)]
pub enum LevelError {
    #[error("failed to read level: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid level JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid level: {0}")]
    Invalid(String),
    #[error(transparent)]
    Settings(#[from] SettingsError),
}

/// Rectangle of ground tiles (inclusive) at height `y`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundRect {
    pub min: [i32; 2],
    pub max: [i32; 2],
    pub y: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnemyDesc {
    pub cell: IVec3,
    pub facing: Cardinal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreasureDesc {
    /// Ground tile the treasure is buried under
    pub cell: IVec3,
    pub gold: u32,
}

/// Serializable level layout. Entity cells are the cells they occupy, one
/// layer above the tile they stand on.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelDesc {
    pub name: String,
    pub player_start: IVec3,
    pub ground: Vec<GroundRect>,
    pub walls: Vec<IVec3>,
    pub ramps: Vec<IVec3>,
    pub boundary_walls: Vec<IVec3>,
    pub breakable_walls: Vec<IVec3>,
    pub blocks: Vec<IVec3>,
    /// In discovery order
    pub checkpoints: Vec<IVec3>,
    pub enemies: Vec<EnemyDesc>,
    pub treasures: Vec<TreasureDesc>,
}

impl LevelDesc {
    pub fn from_json(json: &str) -> Result<Self, LevelError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, LevelError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, LevelError> {
        let path = path.as_ref();
        let level = Self::from_json(&fs::read_to_string(path)?)?;
        log::info!("Loaded level '{}' from {}", level.name, path.display());
        Ok(level)
    }

    /// Static geometry only
    pub fn world(&self) -> GridWorld {
        let mut world = GridWorld::new();
        for rect in &self.ground {
            world.fill_ground(
                (rect.min[0], rect.min[1]),
                (rect.max[0], rect.max[1]),
                rect.y,
            );
        }
        let tagged = [
            (&self.walls, SurfaceTag::Wall),
            (&self.ramps, SurfaceTag::Ramp),
            (&self.boundary_walls, SurfaceTag::BoundaryWall),
            (&self.breakable_walls, SurfaceTag::BreakableWall),
            (&self.checkpoints, SurfaceTag::Checkpoint),
        ];
        for (cells, tag) in tagged {
            for &cell in cells {
                world.insert(cell, tag);
            }
        }
        world
    }

    /// Build a fresh session and its world
    pub fn build(&self, settings: Settings) -> Result<(Session, GridWorld), LevelError> {
        settings.validate()?;
        let world = self.world();
        self.validate(&world)?;

        let mut session = Session::new(
            settings,
            cell_centre(self.player_start),
            self.checkpoints.iter().copied().map(cell_centre),
        );
        for &cell in &self.blocks {
            session.add_block(cell_centre(cell));
        }
        for enemy in &self.enemies {
            session.add_enemy(cell_centre(enemy.cell), enemy.facing);
        }
        for treasure in &self.treasures {
            session.add_treasure(treasure.cell, treasure.gold);
        }
        session.normalize_order();

        log::info!(
            "Built level '{}': {} tiles, {} blocks, {} checkpoints, {} enemies",
            self.name,
            world.tiles().len(),
            session.blocks.len(),
            self.checkpoints.len(),
            session.enemies.len()
        );
        Ok((session, world))
    }

    fn validate(&self, world: &GridWorld) -> Result<(), LevelError> {
        if self.ground.is_empty() {
            return Err(LevelError::Invalid("level has no ground".into()));
        }
        for &cell in self.blocks.iter().chain([&self.player_start]) {
            if let Some(tile) = world.tile(cell) {
                if tile.tag != SurfaceTag::Checkpoint {
                    return Err(LevelError::Invalid(format!(
                        "cell {cell} is inside a {:?} tile",
                        tile.tag
                    )));
                }
            }
        }
        for (i, &cell) in self.blocks.iter().enumerate() {
            if self.blocks[..i].contains(&cell) {
                return Err(LevelError::Invalid(format!("two blocks share cell {cell}")));
            }
        }
        for treasure in &self.treasures {
            if world.tile(treasure.cell).map(|t| t.tag) != Some(SurfaceTag::Ground) {
                return Err(LevelError::Invalid(format!(
                    "treasure at {} is not buried under ground",
                    treasure.cell
                )));
            }
        }
        Ok(())
    }

    /// Small built-in level exercising every mechanic
    pub fn demo() -> Self {
        let cell = IVec3::new;
        Self {
            name: "demo".into(),
            player_start: cell(0, 1, 0),
            ground: vec![
                GroundRect { min: [-2, -3], max: [8, 3], y: 0 },
                // Lower shelf past the drop
                GroundRect { min: [10, -3], max: [14, 3], y: -2 },
            ],
            walls: vec![cell(4, 1, 2), cell(4, 1, 3)],
            ramps: vec![cell(6, 1, -2)],
            boundary_walls: (-3..=3).map(|z| cell(-3, 1, z)).collect(),
            breakable_walls: vec![cell(5, 1, 0)],
            blocks: vec![cell(2, 1, 0), cell(2, 1, 2), cell(5, 1, -2)],
            checkpoints: vec![cell(3, 1, -2), cell(12, -1, 0)],
            enemies: vec![EnemyDesc {
                cell: cell(8, 1, 3),
                facing: Cardinal::NegX,
            }],
            treasures: vec![TreasureDesc {
                cell: cell(1, 0, 0),
                gold: 3,
            }],
        }
    }
}

fn cell_centre(cell: IVec3) -> Vec3 {
    GridCell::new(cell.x, cell.y as f32, cell.z).to_world()
}
