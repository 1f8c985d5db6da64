//! The player: movement, tools, health and timed actions

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use super::events::GameEvent;
use super::grid::Cardinal;
use super::query::SpatialQuery;
use super::timer::{Sequence, advance_slot};
use crate::consts::LAYER_HEIGHT;
use crate::settings::Settings;

/// Collision radius used for walking and projectile hits
pub const PLAYER_RADIUS: f32 = 0.4;
/// Distance walked between footstep events
const STRIDE: f32 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tool {
    Shovel,
    PogoStick,
}

/// Timed player actions. Input is locked while one is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PlayerStep {
    FinishDig,
    Land(Vec3),
    Relocate(Vec3),
}

/// Result of taking a hit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Damage {
    Ignored,
    Hurt,
    Died,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub position: Vec3,
    /// Unit facing vector (horizontal)
    pub facing: Vec3,
    pub velocity: Vec3,
    pub held_tool: Option<Tool>,
    pub health: u8,
    invulnerable_secs: f32,
    pub current_checkpoint: Option<usize>,
    /// Seconds the swing button has been held (None when released)
    pub charge: Option<f32>,
    pub action: Option<Sequence<PlayerStep>>,
    stride: f32,
}

impl Player {
    pub fn new(position: Vec3, settings: &Settings) -> Self {
        Self {
            position,
            facing: Vec3::Z,
            velocity: Vec3::ZERO,
            held_tool: None,
            health: settings.max_health,
            invulnerable_secs: 0.0,
            current_checkpoint: None,
            charge: None,
            action: None,
            stride: 0.0,
        }
    }

    pub fn is_invulnerable(&self) -> bool {
        self.invulnerable_secs > 0.0
    }

    /// True while a dig, hop or respawn is in progress
    pub fn is_busy(&self) -> bool {
        self.action.is_some()
    }

    pub fn cardinal(&self) -> Cardinal {
        Cardinal::from_facing(self.facing)
    }

    /// Select a tool; selecting the held tool puts it away
    pub fn equip(&mut self, tool: Tool) {
        self.held_tool = if self.held_tool == Some(tool) { None } else { Some(tool) };
        self.charge = None;
    }

    /// Stick input (x = right, y = forward) to ground velocity
    pub fn set_movement(&mut self, input: Vec2) {
        self.velocity = Vec3::new(input.x, 0.0, input.y);
    }

    /// Walk along the current velocity. Refuses to enter blocking geometry or
    /// step off a ledge. Returns true if the player moved.
    pub fn walk<Q: SpatialQuery + ?Sized>(
        &mut self,
        dt: f32,
        scene: &Q,
        settings: &Settings,
        events: &mut Vec<GameEvent>,
    ) -> bool {
        if self.velocity.length_squared() <= f32::EPSILON {
            return false;
        }
        self.facing = self.velocity.normalize();

        let step = self.velocity * settings.move_speed * dt;
        let distance = step.length();
        if distance <= f32::EPSILON {
            return false;
        }

        // Hits at distance 0 are things we already overlap; let the player out
        let blocked = scene
            .raycast_all(self.position, step / distance, distance + PLAYER_RADIUS)
            .iter()
            .any(|hit| hit.tag.blocks_player() && hit.distance > 0.0);
        if blocked {
            return false;
        }

        let next = self.position + step;
        if scene.ground_below(next, settings.ground_probe_distance).is_none() {
            return false;
        }

        self.position = next;
        self.stride += distance;
        if self.stride >= STRIDE {
            self.stride -= STRIDE;
            events.push(GameEvent::Footstep);
        }
        true
    }

    /// Find a landing spot for a pogo hop: up onto the cell ahead, or failing
    /// that, over the cell ahead onto the one beyond.
    pub fn jump_target<Q: SpatialQuery + ?Sized>(&self, scene: &Q, settings: &Settings) -> Option<Vec3> {
        let ahead = self.cardinal().unit();
        let apex = self.position + Vec3::Y * LAYER_HEIGHT;

        let clear = |a: Vec3, b: Vec3| !scene.linecast_all(a, b).iter().any(|h| h.tag.blocks_player());
        if !clear(self.position, apex) {
            return None;
        }

        [apex + ahead, self.position + ahead * 2.0]
            .into_iter()
            .filter(|&target| clear(apex, Vec3::new(target.x, apex.y, target.z)))
            .find_map(|target| {
                scene
                    .ground_below(target, settings.ground_probe_distance)
                    .map(|ground| Vec3::new(target.x, ground.anchor.y + LAYER_HEIGHT, target.z))
            })
    }

    /// Start a timed action, overwriting any in flight
    pub fn begin_action(&mut self, delay: f32, step: PlayerStep) {
        self.velocity = Vec3::ZERO;
        self.charge = None;
        self.action = Some(Sequence::new(delay, step));
    }

    pub fn schedule_relocation(&mut self, anchor: Vec3, delay: f32) {
        self.begin_action(delay, PlayerStep::Relocate(anchor));
    }

    /// Advance invulnerability and the pending action
    pub fn advance_timers(&mut self, dt: f32, events: &mut Vec<GameEvent>) {
        self.invulnerable_secs = (self.invulnerable_secs - dt).max(0.0);

        match advance_slot(&mut self.action, dt) {
            Some(PlayerStep::FinishDig) => events.push(GameEvent::DigFinished),
            Some(PlayerStep::Land(target)) => {
                self.position = target;
                events.push(GameEvent::JumpLanded { position: target });
            }
            Some(PlayerStep::Relocate(anchor)) => {
                self.position = anchor;
                events.push(GameEvent::PlayerRespawned { position: anchor });
            }
            None => {}
        }
    }

    pub fn take_damage(&mut self, settings: &Settings) -> Damage {
        if self.is_invulnerable() || self.health == 0 {
            return Damage::Ignored;
        }
        self.health -= 1;
        self.invulnerable_secs = settings.invulnerability_secs;
        if self.health == 0 { Damage::Died } else { Damage::Hurt }
    }

    /// Move immediately (checkpoint skip)
    pub fn teleport(&mut self, position: Vec3) {
        self.position = position;
        self.velocity = Vec3::ZERO;
    }

    /// Cancel anything in flight and restore full health
    pub fn reset_player(&mut self, settings: &Settings) {
        self.action = None;
        self.charge = None;
        self.velocity = Vec3::ZERO;
        self.health = settings.max_health;
        self.invulnerable_secs = 0.0;
    }
}
