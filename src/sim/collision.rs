//! Collision detection and response for axis-aligned bodies
//!
//! Every body in a run is an axis-aligned rectangle in screen space
//! (origin top-left, y grows downward). Obstacle segments are derived from
//! their pair's gap so there is never a stored rectangle to drift out of sync.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::actor::Actor;
use super::obstacles::{ObstacleField, Side};

/// Slack for treating a body as already sitting on a surface
const LAND_TOLERANCE: f32 = 0.5;

/// Axis-aligned rectangle (top-left corner + size)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            min: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.min.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.min.x + self.size.x
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.min.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.min.y + self.size.y
    }

    pub fn center(&self) -> Vec2 {
        self.min + self.size * 0.5
    }

    /// Strict overlap; touching edges do not count
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }

    /// Horizontal spans overlap (ignores y)
    pub fn overlaps_x(&self, other: &Rect) -> bool {
        self.left() < other.right() && self.right() > other.left()
    }
}

/// Result of an obstacle contact check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObstacleHit {
    /// Pool index of the pair that was hit
    pub pair: usize,
    /// Which segment of the pair
    pub side: Side,
}

/// First obstacle segment the actor overlaps, in pool order
pub fn actor_obstacle_hit(actor: &Actor, field: &ObstacleField) -> Option<ObstacleHit> {
    let body = actor.bounds();
    field.pairs().iter().enumerate().find_map(|(pair, obstacle)| {
        if !body.overlaps_x(&obstacle.upper_rect()) {
            return None;
        }
        if body.overlaps(&obstacle.upper_rect()) {
            Some(ObstacleHit { pair, side: Side::Upper })
        } else if body.overlaps(&obstacle.lower_rect(field.screen_height())) {
            Some(ObstacleHit { pair, side: Side::Lower })
        } else {
            None
        }
    })
}

/// Rest a falling dead actor on top of a lower segment it just dropped onto.
///
/// `prev_bottom` is the actor's bottom edge before this step's integration.
/// Returns true if the actor was stopped.
pub fn land_on_obstacles(actor: &mut Actor, field: &ObstacleField, prev_bottom: f32) -> bool {
    if actor.vel.y <= 0.0 {
        return false;
    }
    let body = actor.bounds();
    let screen_height = field.screen_height();
    for pair in field.pairs() {
        let lower = pair.lower_rect(screen_height);
        if body.overlaps_x(&lower) && prev_bottom <= lower.top() + LAND_TOLERANCE && body.bottom() > lower.top() {
            actor.pos.y = lower.top() - actor.size.y;
            actor.vel.y = 0.0;
            return true;
        }
    }
    false
}
