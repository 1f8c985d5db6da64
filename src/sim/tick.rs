//! Fixed timestep simulation tick
//!
//! Advances the whole session by one frame in a fixed order: player, then
//! checkpoints, blocks, enemies and projectiles, and finally the death check.

use glam::{Vec2, Vec3};

use super::events::GameEvent;
use super::player::{PLAYER_RADIUS, Tool};
use super::query::{BlockId, Collider, SceneGeometry, SceneView, SpatialQuery};
use super::state::Session;
use crate::consts::HALF_CELL;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Stick direction (x = right, y = forward)
    pub movement: Vec2,
    /// Swing button held; releasing it swings
    pub swing: bool,
    pub dig: bool,
    pub jump: bool,
    /// Pick up treasure
    pub interact: bool,
    /// Switch tool (selecting the held one puts it away)
    pub equip: Option<Tool>,
    /// Pause toggle
    pub pause: bool,
    /// Skip to next checkpoint (debug/testing)
    pub next_checkpoint: bool,
}

/// What a cannonball ran into this tick
enum Impact {
    Enemy(usize),
    Player,
    Block(BlockId),
    Scenery(Vec3),
}

/// Advance the session by one timestep
pub fn tick<W: SceneGeometry + ?Sized>(session: &mut Session, world: &mut W, input: &TickInput, dt: f32) {
    if input.pause {
        session.paused = !session.paused;
        session.events.push(if session.paused {
            GameEvent::Paused
        } else {
            GameEvent::Resumed
        });
    }
    if session.paused {
        return;
    }

    session.time_ticks += 1;
    let dt = dt * session.time_scale.max(0.0);
    // Frozen world
    if dt <= 0.0 {
        return;
    }

    update_player(session, world, input, dt);

    if let Some(index) = session.ledger.checkpoint_at(session.player.position) {
        session.record_checkpoint(index);
    }

    update_blocks(session, &*world, dt);
    update_enemies(session, &*world, dt);

    if session.player.health == 0 {
        session.apply_death();
    }
}

fn update_player<W: SceneGeometry + ?Sized>(session: &mut Session, world: &mut W, input: &TickInput, dt: f32) {
    session.player.advance_timers(dt, &mut session.events);

    // Digging, hopping and respawning lock input
    if session.player.is_busy() {
        session.player.set_movement(Vec2::ZERO);
        return;
    }

    if let Some(tool) = input.equip {
        session.player.equip(tool);
    }
    if input.next_checkpoint {
        session.advance_to_next_checkpoint();
    }

    let boxes = session.block_boxes();
    {
        let scene = SceneView::new(&*world, &boxes);
        session.player.set_movement(input.movement);
        session
            .player
            .walk(dt, &scene, &session.settings, &mut session.events);

        if input.dig {
            session.dig(&scene);
        } else if input.jump {
            session.jump(&scene);
        }
    }
    if input.interact {
        session.collect_treasure();
    }

    update_swing(session, world, input.swing, dt);
}

/// Hold to charge, release to swing
fn update_swing<W: SceneGeometry + ?Sized>(session: &mut Session, world: &mut W, held: bool, dt: f32) {
    if session.player.held_tool != Some(Tool::Shovel) || session.player.is_busy() {
        session.player.charge = None;
        return;
    }

    match (held, session.player.charge) {
        (true, charge) => {
            let threshold = session.settings.charge_threshold;
            let before = charge.unwrap_or(0.0);
            let after = (before + dt).min(session.settings.max_charge_secs);
            session.player.charge = Some(after);
            if before < threshold && after >= threshold {
                session.events.push(GameEvent::SwingCharged);
            }
        }
        (false, Some(charge)) => {
            session.player.charge = None;
            session.swing(world, charge);
        }
        (false, None) => {}
    }
}

fn update_blocks<W: SpatialQuery + ?Sized>(session: &mut Session, world: &W, dt: f32) {
    // Every block sees where the others were at the start of the pass
    let boxes = session.block_boxes();
    let player_position = session.player.position;

    for block in session.blocks.iter_mut() {
        let scene = SceneView::new(world, &boxes).excluding(block.id);
        block.step(dt, &scene, player_position, &session.settings, &mut session.events);
    }
}

fn update_enemies<W: SpatialQuery + ?Sized>(session: &mut Session, world: &W, dt: f32) {
    let player_position = session.player.position;
    for enemy in session.enemies.iter_mut() {
        if enemy.advance_stun(dt) {
            session.events.push(GameEvent::EnemyRecovered { enemy: enemy.id });
        }
        if enemy.ready_to_fire(dt, player_position, &session.settings) {
            let ball = session
                .cannonballs
                .fire(enemy.fire_point(), enemy.facing.unit(), &session.settings);
            log::debug!("Enemy {} fired cannonball {}", enemy.id, ball);
            session.events.push(GameEvent::CannonFired { enemy: enemy.id, ball });
        }
    }

    let boxes = session.block_boxes();
    let scene = SceneView::new(world, &boxes);

    for index in 0..session.cannonballs.len() {
        let Some(ball) = session.cannonballs.get_mut(index) else {
            continue;
        };
        if !ball.active {
            continue;
        }
        let start = ball.position;
        if !ball.advance(dt, &session.settings) {
            continue;
        }
        let (end, reflected) = (ball.position, ball.reflected);

        let Some(impact) = find_impact(session, &scene, start, end, reflected) else {
            continue;
        };
        if let Some(ball) = session.cannonballs.get_mut(index) {
            ball.deactivate();
        }

        match impact {
            Impact::Enemy(i) => {
                let enemy = &mut session.enemies[i];
                if enemy.stun(&session.settings) {
                    session.events.push(GameEvent::EnemyStunned { enemy: enemy.id });
                }
            }
            Impact::Player => {
                session.damage_player();
            }
            Impact::Block(id) => {
                if let Some(block) = session.blocks.iter_mut().find(|b| b.id == id) {
                    if block.begin_break(&session.settings) {
                        log::debug!("Block {} broken by cannonball {}", id, index);
                        session.events.push(GameEvent::BlockBroken { block: id });
                    }
                }
            }
            Impact::Scenery(position) => {
                session
                    .events
                    .push(GameEvent::ProjectileImpact { ball: index, position });
            }
        }
    }
}

/// First thing a cannonball moving `start -> end` touches: an enemy, the
/// player (unless reflected), then blocks and level geometry on the segment.
fn find_impact<Q: SpatialQuery + ?Sized>(
    session: &Session,
    scene: &Q,
    start: Vec3,
    end: Vec3,
    reflected: bool,
) -> Option<Impact> {
    let radius = session.settings.cannonball_radius;

    if let Some(i) = session
        .enemies
        .iter()
        .position(|e| e.position.distance(end) < radius + HALF_CELL)
    {
        return Some(Impact::Enemy(i));
    }
    if !reflected && session.player.position.distance(end) < radius + PLAYER_RADIUS {
        return Some(Impact::Player);
    }

    let hit = scene
        .linecast_all(start, end)
        .into_iter()
        .find(|hit| hit.tag.stops_projectiles())?;
    Some(match hit.collider {
        Collider::Block(id) => Impact::Block(id),
        Collider::Static(_) => Impact::Scenery(hit.position),
    })
}
