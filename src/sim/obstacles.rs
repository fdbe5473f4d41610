//! Fixed pool of obstacle pairs
//!
//! Pairs are never destroyed. When both segments of a pair have scrolled
//! fully past the left edge they are queued and placed again to the right
//! of the rightmost pair with fresh geometry from the active tier.
//!
//! Recycle queue invariant: segments are queued in scan order (upper, then
//! lower) and drained two at a time, so between calls the queue holds zero
//! segments. A pair is therefore either fully on the field or fully queued.

use std::collections::VecDeque;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::Rect;
use super::difficulty::TierProfile;
use super::pickup::PickupSpawner;
use crate::assets;
use crate::settings::Settings;

/// Which half of a pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Upper,
    Lower,
}

/// Handle to one segment in the pool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentRef {
    pub pair: usize,
    pub side: Side,
}

/// Upper and lower segment sharing one x and one gap.
///
/// The upper segment spans `[0, gap_top]`, the lower `[gap_top + gap_height, screen_height]`,
/// so `upper.bottom + gap_height == lower.top` holds by construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObstaclePair {
    /// Left edge shared by both segments
    pub x: f32,
    /// Bottom edge of the upper segment
    pub gap_top: f32,
    pub gap_height: f32,
    pub vel_x: f32,
    pub width: f32,
}

impl ObstaclePair {
    /// Sprite both segments are drawn with
    pub const SPRITE: &'static str = assets::OBSTACLE_SPRITE;

    fn placeholder(width: f32) -> Self {
        Self {
            x: 0.0,
            gap_top: 0.0,
            gap_height: 0.0,
            vel_x: 0.0,
            width,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn gap_center(&self) -> f32 {
        self.gap_top + self.gap_height * 0.5
    }

    pub fn upper_rect(&self) -> Rect {
        Rect::new(self.x, 0.0, self.width, self.gap_top)
    }

    pub fn lower_rect(&self, screen_height: f32) -> Rect {
        let top = self.gap_top + self.gap_height;
        Rect::new(self.x, top, self.width, (screen_height - top).max(0.0))
    }
}

/// Geometry chosen for one placement
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub pair: usize,
    pub x: f32,
    pub gap_top: f32,
    pub gap_height: f32,
    /// A pickup was spawned in this pair's gap
    pub pickup: bool,
}

/// Owns every obstacle pair and the live pickup
#[derive(Debug, Clone)]
pub struct ObstacleField {
    pairs: Vec<ObstaclePair>,
    recycle_queue: VecDeque<SegmentRef>,
    /// Placements so far this run, including the initial fill
    placements: u32,
    pickups: PickupSpawner,
    screen_height: f32,
    edge_margin: f32,
    scroll_speed: f32,
    obstacle_width: f32,
    pickup_every: u32,
}

impl ObstacleField {
    pub fn new(settings: &Settings) -> Self {
        Self {
            pairs: Vec::with_capacity(settings.pool_size),
            recycle_queue: VecDeque::with_capacity(2),
            placements: 0,
            pickups: PickupSpawner::new(settings.pickup_size, settings.scroll_speed),
            screen_height: settings.screen_height,
            edge_margin: settings.edge_margin,
            scroll_speed: settings.scroll_speed,
            obstacle_width: settings.obstacle_width,
            pickup_every: settings.pickup_every.max(1),
        }
    }

    /// Create `n` pairs, each placed to the right of the previous one
    pub fn initialize<R: Rng>(&mut self, n: usize, profile: TierProfile, rng: &mut R) -> Vec<Placement> {
        (0..n)
            .map(|_| {
                let pair = self.pairs.len();
                self.pairs.push(ObstaclePair::placeholder(self.obstacle_width));
                self.place_pair(
                    SegmentRef { pair, side: Side::Upper },
                    SegmentRef { pair, side: Side::Lower },
                    profile,
                    rng,
                )
            })
            .collect()
    }

    pub fn pairs(&self) -> &[ObstaclePair] {
        &self.pairs
    }

    pub fn pairs_mut(&mut self) -> &mut [ObstaclePair] {
        &mut self.pairs
    }

    pub fn pickups(&self) -> &PickupSpawner {
        &self.pickups
    }

    pub fn pickups_mut(&mut self) -> &mut PickupSpawner {
        &mut self.pickups
    }

    pub fn placements(&self) -> u32 {
        self.placements
    }

    pub fn screen_height(&self) -> f32 {
        self.screen_height
    }

    /// Segments queued but not yet placed (0 between ticks)
    pub fn pending_recycle(&self) -> usize {
        self.recycle_queue.len()
    }

    /// Largest left edge in the pool (0 when empty)
    pub fn rightmost_x(&self) -> f32 {
        self.pairs.iter().map(|p| p.x).fold(0.0, f32::max)
    }

    /// Reposition a pair to the right of the field with fresh geometry
    pub fn place_pair<R: Rng>(
        &mut self,
        upper: SegmentRef,
        lower: SegmentRef,
        profile: TierProfile,
        rng: &mut R,
    ) -> Placement {
        debug_assert_eq!(upper.pair, lower.pair, "segments of one placement must share a pair");
        debug_assert_eq!((upper.side, lower.side), (Side::Upper, Side::Lower));

        let rightmost = self.rightmost_x();

        let vertical_gap = rng.random_range(profile.vertical.min..=profile.vertical.max);
        // Integer bounds stay inside a fractional margin on both edges
        let min_top = self.edge_margin.ceil() as i32;
        let max_top = (self.screen_height - self.edge_margin).floor() as i32 - vertical_gap;
        let gap_top = rng.random_range(min_top..=max_top);
        let horizontal_gap = rng.random_range(profile.horizontal.min..=profile.horizontal.max);

        let index = upper.pair;
        let pair = &mut self.pairs[index];
        pair.x = rightmost + horizontal_gap as f32;
        pair.gap_top = gap_top as f32;
        pair.gap_height = vertical_gap as f32;
        pair.vel_x = -self.scroll_speed;

        let placement = Placement {
            pair: index,
            x: pair.x,
            gap_top: pair.gap_top,
            gap_height: pair.gap_height,
            pickup: self.placements % self.pickup_every == 0,
        };
        if placement.pickup {
            self.pickups.spawn(
                placement.x + self.obstacle_width * 0.5,
                placement.gap_top + placement.gap_height * 0.5,
                index,
            );
        }
        self.placements += 1;

        log::debug!(
            "Placed pair {} at x={:.0} gap=[{:.0}, {:.0}]",
            index,
            placement.x,
            placement.gap_top,
            placement.gap_top + placement.gap_height
        );
        placement
    }

    /// Move every pair and the pickup by its own velocity
    pub fn advance(&mut self, dt: f32) {
        for pair in &mut self.pairs {
            pair.x += pair.vel_x * dt;
        }
        self.pickups.advance(dt);
        self.pickups.cull_offscreen();
    }

    /// Queue segments whose right edge is at or past the left screen edge.
    ///
    /// Returns matched (upper, lower) couples, each ready for one `place_pair` call.
    pub fn recycle(&mut self) -> Vec<(SegmentRef, SegmentRef)> {
        let mut ready = Vec::new();
        for (pair, obstacle) in self.pairs.iter().enumerate() {
            // Both segments share the pair's x, so they leave the screen together
            for side in [Side::Upper, Side::Lower] {
                if obstacle.right() <= 0.0 {
                    self.recycle_queue.push_back(SegmentRef { pair, side });
                }
                if self.recycle_queue.len() == 2 {
                    if let (Some(upper), Some(lower)) =
                        (self.recycle_queue.pop_front(), self.recycle_queue.pop_front())
                    {
                        ready.push((upper, lower));
                    }
                }
            }
        }
        debug_assert!(self.recycle_queue.is_empty());
        ready
    }

    /// Stop every obstacle and the pickup where they are
    pub fn freeze(&mut self) {
        for pair in &mut self.pairs {
            pair.vel_x = 0.0;
        }
        self.pickups.freeze();
    }
}
