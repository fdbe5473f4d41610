//! Deterministic run simulation
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (pool index order)
//! - No rendering, audio or storage dependencies; side effects leave as `GameEvent`s

pub mod actor;
pub mod collision;
pub mod difficulty;
pub mod obstacles;
pub mod pickup;
pub mod state;
pub mod tick;
pub mod timer;

pub use actor::{Actor, Pose};
pub use collision::Rect;
pub use difficulty::{DifficultyController, DifficultyTable, DifficultyTier, GapRange, TierProfile};
pub use obstacles::{ObstacleField, ObstaclePair, SegmentRef, Side};
pub use pickup::{MessageFeed, Pickup, PickupSpawner};
pub use state::{CountdownPhase, DeathCause, GameEvent, RunSession, RunState};
pub use tick::{TickInput, fire_timer, tick};
pub use timer::{Scheduler, TimerEvent};
