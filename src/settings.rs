//! Gameplay tuning and audio preferences
//!
//! Loaded from a JSON file next to the level; every field falls back to its
//! default when missing.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid settings JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid settings: {0}")]
    Invalid(String),
}

/// Game settings/tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Player ===
    /// Walk speed (units/s)
    pub move_speed: f32,
    pub max_health: u8,
    /// Invulnerability window after taking damage
    pub invulnerability_secs: f32,
    /// How far in front of the player swings, digs and pickups reach
    pub interaction_reach: f32,
    /// Input lock while digging
    pub dig_duration: f32,
    /// Airtime of a pogo hop
    pub jump_duration: f32,

    // === Swing / shove ===
    /// Charge needed before a swing counts as charged
    pub charge_threshold: f32,
    /// Charge stops accumulating here
    pub max_charge_secs: f32,
    /// Cells travelled by an uncharged shove
    pub shove_cells: u32,
    /// Cells travelled by a fully charged shove
    pub max_charged_cells: u32,
    /// Damping time of an uncharged shove
    pub shove_speed: f32,
    /// Damping time of a fully charged shove
    pub charged_shove_speed: f32,
    /// Shoves snap to their target below this distance
    pub min_snap_distance: f32,

    // === Blocks ===
    /// Fall speed (units/s)
    pub gravity_speed: f32,
    /// Range of the downward ground probe
    pub ground_probe_distance: f32,
    /// Below this height an object has fallen off the level
    pub fall_floor: f32,
    /// Distance from spawn searched when the player blocks a respawning block
    pub reset_search_offset: f32,
    /// Time a broken block stays hidden before respawning
    pub break_duration: f32,
    /// Completion ratio at which a charged shove gets the full overhang
    pub full_overhang_ratio: f32,
    pub full_overhang_delay: f32,
    pub partial_overhang_factor: f32,
    pub min_overhang_delay: f32,
    pub max_overhang_delay: f32,

    // === Respawn ===
    /// Delay before the player is moved to the respawn anchor
    pub respawn_delay: f32,

    // === Enemies ===
    pub fire_rate: f32,
    pub enemy_range: f32,
    pub stun_duration: f32,
    pub cannonball_speed: f32,
    pub cannonball_lifespan: f32,
    pub cannonball_radius: f32,
    pub cannonball_pool_size: usize,
    /// Swings reflect cannonballs within this distance
    pub reflect_radius: f32,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Music volume (0.0 - 1.0)
    pub music_volume: f32,
    pub muted: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            // Player
            move_speed: 5.0,
            max_health: 3,
            invulnerability_secs: 1.0,
            interaction_reach: 1.0,
            dig_duration: 2.0,
            jump_duration: 0.5,

            // Swing / shove
            charge_threshold: 0.25,
            max_charge_secs: 1.5,
            shove_cells: 1,
            max_charged_cells: 4,
            shove_speed: 0.3,
            charged_shove_speed: 0.2,
            min_snap_distance: 0.01,

            // Blocks
            gravity_speed: 10.0,
            ground_probe_distance: 1.0,
            fall_floor: -20.0,
            reset_search_offset: 2.0,
            break_duration: 4.0,
            full_overhang_ratio: 0.9,
            full_overhang_delay: 0.6,
            partial_overhang_factor: 0.2,
            min_overhang_delay: 0.07,
            max_overhang_delay: 0.3,

            // Respawn
            respawn_delay: 0.1,

            // Enemies
            fire_rate: 4.0,
            enemy_range: 15.0,
            stun_duration: 3.0,
            cannonball_speed: 3.0,
            cannonball_lifespan: 8.0,
            cannonball_radius: 0.5,
            cannonball_pool_size: 8,
            reflect_radius: 1.5,

            // Audio
            master_volume: 0.8,
            sfx_volume: 1.0,
            music_volume: 0.7,
            muted: false,
        }
    }
}

impl Settings {
    /// Delay before a charged shove that ended over a drop starts falling
    pub fn overhang_delay(&self, completion_ratio: f32) -> f32 {
        if completion_ratio >= self.full_overhang_ratio {
            self.full_overhang_delay
        } else {
            (self.partial_overhang_factor * completion_ratio)
                .clamp(self.min_overhang_delay, self.max_overhang_delay)
        }
    }

    /// Normalized charge in [0, 1]
    pub fn charge_ratio(&self, charge_secs: f32) -> f32 {
        if self.max_charge_secs <= 0.0 {
            return 1.0;
        }
        (charge_secs / self.max_charge_secs).clamp(0.0, 1.0)
    }

    /// Effective sound effect volume (respects mute)
    pub fn effective_sfx_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            (self.master_volume * self.sfx_volume).clamp(0.0, 1.0)
        }
    }

    /// Effective music volume (respects mute)
    pub fn effective_music_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            (self.master_volume * self.music_volume).clamp(0.0, 1.0)
        }
    }

    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject tunings the simulation can't run with
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.max_health == 0 {
            return Err(SettingsError::Invalid("max_health must be at least 1".into()));
        }
        Ok(())
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Load settings, falling back to defaults on any failure
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::warn!("Using default settings ({e})");
                Self::default()
            }
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SettingsError> {
        fs::write(path.as_ref(), self.to_json()?)?;
        log::info!("Settings saved");
        Ok(())
    }
}
