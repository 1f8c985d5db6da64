//! Cannon enemies and the shared cannonball pool

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::grid::Cardinal;
use super::timer::{Sequence, advance_slot};
use crate::consts::HALF_CELL;
use crate::settings::Settings;

/// Gap between the enemy's cell and a freshly fired cannonball
const MUZZLE_CLEARANCE: f32 = 0.6;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub position: Vec3,
    pub facing: Cardinal,
    /// Seconds until the next shot may be taken
    pub cooldown: f32,
    pub stun: Option<Sequence<()>>,
}

impl Enemy {
    pub fn new(id: u32, position: Vec3, facing: Cardinal) -> Self {
        Self {
            id,
            position,
            facing,
            cooldown: 0.0,
            stun: None,
        }
    }

    pub fn is_stunned(&self) -> bool {
        self.stun.is_some()
    }

    /// Where cannonballs leave the barrel
    pub fn fire_point(&self) -> Vec3 {
        self.position + self.facing.unit() * (HALF_CELL + MUZZLE_CLEARANCE)
    }

    /// Stun the enemy. No-op (returns false) if already stunned.
    pub fn stun(&mut self, settings: &Settings) -> bool {
        if self.is_stunned() {
            return false;
        }
        self.stun = Some(Sequence::new(settings.stun_duration, ()));
        true
    }

    /// Advance the stun timer; true on the tick the enemy recovers
    pub fn advance_stun(&mut self, dt: f32) -> bool {
        advance_slot(&mut self.stun, dt).is_some()
    }

    /// Count down the cooldown; true when the enemy should fire this tick
    pub fn ready_to_fire(&mut self, dt: f32, player_position: Vec3, settings: &Settings) -> bool {
        self.cooldown -= dt;
        if self.cooldown > 0.0 || self.is_stunned() {
            return false;
        }
        if self.position.distance(player_position) > settings.enemy_range {
            return false;
        }
        self.cooldown = settings.fire_rate;
        true
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cannonball {
    pub position: Vec3,
    /// Unit direction of travel
    pub velocity: Vec3,
    pub lifespan: f32,
    pub active: bool,
    /// Sent back by the player's swing
    pub reflected: bool,
}

impl Default for Cannonball {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            lifespan: 0.0,
            active: false,
            reflected: false,
        }
    }
}

impl Cannonball {
    /// Move one tick; returns false if the ball expired
    pub fn advance(&mut self, dt: f32, settings: &Settings) -> bool {
        self.lifespan -= dt;
        if self.lifespan <= 0.0 {
            self.deactivate();
            return false;
        }
        self.position += self.velocity * settings.cannonball_speed * dt;
        true
    }

    pub fn deactivate(&mut self) {
        self.velocity = Vec3::ZERO;
        self.active = false;
    }
}

/// Fixed set of cannonballs shared by every enemy, handed out round-robin
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CannonballPool {
    balls: Vec<Cannonball>,
    next: usize,
}

impl CannonballPool {
    pub fn new(size: usize) -> Self {
        Self {
            balls: vec![Cannonball::default(); size.max(1)],
            next: 0,
        }
    }

    pub fn balls(&self) -> &[Cannonball] {
        &self.balls
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Cannonball> {
        self.balls.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.balls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.balls.is_empty()
    }

    pub fn active_count(&self) -> usize {
        self.balls.iter().filter(|b| b.active).count()
    }

    /// Launch the next ball in the pool (recycling it if still in flight)
    pub fn fire(&mut self, origin: Vec3, direction: Vec3, settings: &Settings) -> usize {
        let index = self.next;
        self.balls[index] = Cannonball {
            position: origin,
            velocity: direction.normalize_or_zero(),
            lifespan: settings.cannonball_lifespan,
            active: true,
            reflected: false,
        };
        self.next = (self.next + 1) % self.balls.len();
        index
    }

    /// Send the closest un-reflected ball within `radius` of `point` off along
    /// `direction`
    pub fn reflect_nearest(
        &mut self,
        point: Vec3,
        radius: f32,
        direction: Vec3,
        settings: &Settings,
    ) -> Option<usize> {
        let (index, _) = self
            .balls
            .iter()
            .enumerate()
            .filter(|(_, b)| b.active && !b.reflected)
            .map(|(i, b)| (i, b.position.distance(point)))
            .filter(|&(_, d)| d <= radius)
            .min_by(|a, b| a.1.total_cmp(&b.1))?;

        let ball = &mut self.balls[index];
        ball.velocity = direction.normalize_or_zero();
        ball.reflected = true;
        ball.lifespan = settings.cannonball_lifespan;
        Some(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_only_in_range_on_cooldown() {
        let settings = Settings::default();
        let mut enemy = Enemy::new(1, Vec3::new(0.0, 1.0, 0.0), Cardinal::PosX);
        let near = Vec3::new(10.0, 1.0, 0.0);
        let far = Vec3::new(20.0, 1.0, 0.0);

        assert!(!enemy.ready_to_fire(0.1, far, &settings));
        assert!(enemy.ready_to_fire(0.1, near, &settings));
        // Cooling down
        assert!(!enemy.ready_to_fire(3.9, near, &settings));
        assert!(enemy.ready_to_fire(0.2, near, &settings));
    }

    #[test]
    fn test_stunned_enemy_holds_fire() {
        let settings = Settings::default();
        let mut enemy = Enemy::new(1, Vec3::ZERO, Cardinal::PosX);
        assert!(enemy.stun(&settings));
        assert!(!enemy.stun(&settings));
        assert!(!enemy.ready_to_fire(0.1, Vec3::X, &settings));
        assert!(!enemy.advance_stun(settings.stun_duration - 0.5));
        assert!(enemy.advance_stun(0.6));
        assert!(!enemy.is_stunned());
        assert!(enemy.ready_to_fire(0.1, Vec3::X, &settings));
    }

    #[test]
    fn test_pool_round_robin() {
        let settings = Settings::default();
        let mut pool = CannonballPool::new(2);
        assert_eq!(pool.fire(Vec3::ZERO, Vec3::X, &settings), 0);
        assert_eq!(pool.fire(Vec3::ZERO, Vec3::X, &settings), 1);
        assert_eq!(pool.fire(Vec3::Z, Vec3::Z, &settings), 0);
        assert_eq!(pool.balls()[0].position, Vec3::Z);
        assert_eq!(pool.active_count(), 2);
    }

    #[test]
    fn test_cannonball_expires() {
        let settings = Settings::default();
        let mut pool = CannonballPool::new(1);
        pool.fire(Vec3::ZERO, Vec3::X, &settings);
        let ball = pool.get_mut(0).unwrap();
        assert!(ball.advance(1.0, &settings));
        assert_eq!(ball.position, Vec3::new(3.0, 0.0, 0.0));
        assert!(!ball.advance(settings.cannonball_lifespan, &settings));
        assert!(!ball.active);
    }

    #[test]
    fn test_reflect_nearest() {
        let settings = Settings::default();
        let mut pool = CannonballPool::new(3);
        pool.fire(Vec3::new(1.0, 1.0, 0.0), Vec3::NEG_X, &settings);
        pool.fire(Vec3::new(0.5, 1.0, 0.0), Vec3::NEG_X, &settings);
        pool.fire(Vec3::new(9.0, 1.0, 0.0), Vec3::NEG_X, &settings);

        let hit = pool.reflect_nearest(Vec3::new(0.0, 1.0, 0.0), 1.5, Vec3::X, &settings);
        assert_eq!(hit, Some(1));
        assert!(pool.balls()[1].reflected);
        assert_eq!(pool.balls()[1].velocity, Vec3::X);

        // Already reflected ones are skipped
        assert_eq!(
            pool.reflect_nearest(Vec3::new(0.0, 1.0, 0.0), 1.5, Vec3::X, &settings),
            Some(0)
        );
        assert_eq!(
            pool.reflect_nearest(Vec3::new(0.0, 1.0, 0.0), 1.5, Vec3::X, &settings),
            None
        );
    }
}
