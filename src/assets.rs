//! Asset handles provided by the loader
//!
//! The core only ever refers to assets by these names.

use std::ops::RangeInclusive;

pub const OBSTACLE_SPRITE: &str = "pipe";
pub const ACTOR_SHEET: &str = "bird";
pub const PICKUP_SPRITE: &str = "star";

pub const AMBIENT_LOOP: &str = "backgroundMusic";
pub const PICKUP_CHIME: &str = "powerUp";
pub const IMPACT_SOUND: &str = "hit";

/// A spritesheet animation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Animation {
    pub key: &'static str,
    pub sheet: &'static str,
    pub frames: RangeInclusive<u32>,
    pub frame_rate: u32,
    pub looping: bool,
}

/// Looping flight animation
pub fn fly() -> Animation {
    Animation {
        key: "fly",
        sheet: ACTOR_SHEET,
        frames: 8..=15,
        frame_rate: 8,
        looping: true,
    }
}

/// Single dead frame
pub fn dead() -> Animation {
    Animation {
        key: "dead",
        sheet: ACTOR_SHEET,
        frames: 16..=16,
        frame_rate: 1,
        looping: false,
    }
}

/// Animation for an actor pose
pub fn for_pose(pose: crate::sim::Pose) -> Animation {
    match pose {
        crate::sim::Pose::Flying => fly(),
        crate::sim::Pose::Dead => dead(),
    }
}
