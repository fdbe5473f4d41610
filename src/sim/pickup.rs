//! Collectible pickups and the informational message feed
//!
//! At most one pickup is live at a time. It is held by direct ownership so
//! the collision pass checks exactly that instance instead of scanning
//! entities by sprite.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Rect;
use crate::assets;

/// A collectible anchored to the gap of an obstacle pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pickup {
    /// Center position
    pub pos: Vec2,
    pub vel_x: f32,
    pub size: f32,
    /// Pool index of the pair it was spawned with
    pub pair: usize,
}

impl Pickup {
    pub const SPRITE: &'static str = assets::PICKUP_SPRITE;

    pub fn bounds(&self) -> Rect {
        let half = self.size * 0.5;
        Rect::new(self.pos.x - half, self.pos.y - half, self.size, self.size)
    }
}

/// Owns the single live pickup
#[derive(Debug, Clone)]
pub struct PickupSpawner {
    active: Option<Pickup>,
    size: f32,
    scroll_speed: f32,
}

impl PickupSpawner {
    pub fn new(size: f32, scroll_speed: f32) -> Self {
        Self {
            active: None,
            size,
            scroll_speed,
        }
    }

    /// Place a pickup at (x, y) scrolling with the obstacles.
    ///
    /// An unconsumed pickup still on screen is replaced.
    pub fn spawn(&mut self, x: f32, y: f32, pair: usize) {
        if let Some(old) = &self.active {
            log::debug!("Replacing unconsumed pickup at x={:.1}", old.pos.x);
        }
        self.active = Some(Pickup {
            pos: Vec2::new(x, y),
            vel_x: -self.scroll_speed,
            size: self.size,
            pair,
        });
        log::debug!("Pickup spawned at ({:.1}, {:.1}) for pair {}", x, y, pair);
    }

    pub fn active(&self) -> Option<&Pickup> {
        self.active.as_ref()
    }

    pub fn advance(&mut self, dt: f32) {
        if let Some(pickup) = &mut self.active {
            pickup.pos.x += pickup.vel_x * dt;
        }
    }

    /// Drop the pickup once it has fully scrolled off the left edge
    pub fn cull_offscreen(&mut self) {
        if self.active.as_ref().is_some_and(|p| p.bounds().right() <= 0.0) {
            log::debug!("Pickup left the screen uncollected");
            self.active = None;
        }
    }

    /// Stop the pickup in place (it stays visible)
    pub fn freeze(&mut self) {
        if let Some(pickup) = &mut self.active {
            pickup.vel_x = 0.0;
        }
    }

    /// Remove and return the pickup if it overlaps `body`
    pub fn collect(&mut self, body: &Rect) -> Option<Pickup> {
        if self.active.as_ref().is_some_and(|p| p.bounds().overlaps(body)) {
            self.active.take()
        } else {
            None
        }
    }
}

/// Fixed sequence of messages, each shown at most once
#[derive(Debug, Clone, Default)]
pub struct MessageFeed {
    messages: Vec<String>,
    next: usize,
}

impl MessageFeed {
    pub fn new(messages: Vec<String>) -> Self {
        Self { messages, next: 0 }
    }

    /// Take the next unseen message; `None` once exhausted
    pub fn next_message(&mut self) -> Option<(usize, &str)> {
        let index = self.next;
        let message = self.messages.get(index)?;
        self.next += 1;
        Some((index, message.as_str()))
    }

    /// Index of the next message to show
    pub fn position(&self) -> usize {
        self.next
    }

    pub fn is_exhausted(&self) -> bool {
        self.next >= self.messages.len()
    }
}
