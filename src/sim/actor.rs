//! The falling actor
//!
//! Only vertical motion is integrated; the world scrolls past the actor.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Rect;
use crate::settings::Settings;

/// Animation pose shown for the actor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Pose {
    /// Looping flap animation
    Flying,
    /// Single dead frame, flipped
    Dead,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
    /// Top-left corner of the body
    pub pos: Vec2,
    pub vel: Vec2,
    /// Collision body size
    pub size: Vec2,
    pub alive: bool,
    /// Set on death: no horizontal motion from then on, vertical motion continues
    pub horizontal_lock: bool,
    pub pose: Pose,
}

impl Actor {
    pub fn new(settings: &Settings) -> Self {
        Self {
            pos: Vec2::new(
                settings.screen_width * settings.actor_start_x,
                settings.screen_height * settings.actor_start_y,
            ),
            vel: Vec2::ZERO,
            size: Vec2::new(settings.actor_width, settings.actor_height),
            alive: true,
            horizontal_lock: false,
            pose: Pose::Flying,
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect {
            min: self.pos,
            size: self.size,
        }
    }

    pub fn apply_gravity(&mut self, gravity: f32, dt: f32) {
        self.vel.y += gravity * dt;
    }

    /// Replace vertical velocity with the flap impulse (not additive)
    pub fn flap(&mut self, impulse: f32) {
        self.vel.y = impulse;
    }

    pub fn integrate(&mut self, dt: f32) {
        if self.horizontal_lock {
            self.vel.x = 0.0;
        }
        self.pos += self.vel * dt;
    }

    /// Touching or crossing the top or bottom edge while alive
    pub fn out_of_bounds(&self, screen_height: f32) -> bool {
        let body = self.bounds();
        body.bottom() >= screen_height || body.top() <= 0.0
    }

    /// Fully left the visible range (below the screen, or above it by its own height)
    pub fn left_visible_range(&self, screen_height: f32) -> bool {
        self.pos.y > screen_height || self.pos.y < -self.size.y
    }

    /// Stop scrolling, switch to the dead pose
    pub fn kill(&mut self) {
        self.alive = false;
        self.horizontal_lock = true;
        self.vel.x = 0.0;
        self.pose = Pose::Dead;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gravity_accumulates() {
        let mut actor = Actor::new(&Settings::default());
        actor.apply_gravity(600.0, 0.5);
        actor.apply_gravity(600.0, 0.5);
        assert!((actor.vel.y - 600.0).abs() < 1e-4);
    }

    #[test]
    fn test_flap_overrides_velocity() {
        let mut actor = Actor::new(&Settings::default());
        actor.vel.y = 450.0;
        actor.flap(-300.0);
        assert_eq!(actor.vel.y, -300.0);
        actor.flap(-300.0);
        assert_eq!(actor.vel.y, -300.0);
    }

    #[test]
    fn test_bounds_checks() {
        let settings = Settings::default();
        let mut actor = Actor::new(&settings);
        assert!(!actor.out_of_bounds(settings.screen_height));

        actor.pos.y = settings.screen_height - actor.size.y;
        assert!(actor.out_of_bounds(settings.screen_height));
        assert!(!actor.left_visible_range(settings.screen_height));

        actor.pos.y = 0.0;
        assert!(actor.out_of_bounds(settings.screen_height));

        actor.pos.y = settings.screen_height + 1.0;
        assert!(actor.left_visible_range(settings.screen_height));
        actor.pos.y = -actor.size.y - 1.0;
        assert!(actor.left_visible_range(settings.screen_height));
    }

    #[test]
    fn test_kill_locks_horizontal() {
        let mut actor = Actor::new(&Settings::default());
        actor.vel = Vec2::new(50.0, 10.0);
        actor.kill();
        actor.integrate(1.0);
        assert!(!actor.alive);
        assert_eq!(actor.pose, Pose::Dead);
        assert_eq!(actor.vel.x, 0.0);
        assert!((actor.pos.y - (Actor::new(&Settings::default()).pos.y + 10.0)).abs() < 1e-4);
    }
}
