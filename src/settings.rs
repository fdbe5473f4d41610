//! Run tuning and geometry
//!
//! Loaded from a JSON file on native, defaults everywhere else.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sim::DifficultyTable;

/// Errors raised while loading or validating settings
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("failed to read settings: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed settings: {0}")]
    Parse(#[from] serde_json::Error),

    /// A vertical gap this tall cannot fit between the two edge margins
    #[error("vertical gap {gap} does not fit a {height} high screen with {margin} margins")]
    GapTooLarge { gap: i32, height: f32, margin: f32 },

    #[error("invalid setting: {0}")]
    Invalid(&'static str),
}

/// Run settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Screen ===
    pub screen_width: f32,
    pub screen_height: f32,
    /// Minimum distance between a gap and the top/bottom edge
    pub edge_margin: f32,

    // === Physics (units per second) ===
    pub gravity: f32,
    /// Upward flap velocity (negative = up)
    pub flap_velocity: f32,
    /// Leftward scroll speed of obstacles and pickups
    pub scroll_speed: f32,

    // === Actor ===
    /// Start position as a fraction of the screen size
    pub actor_start_x: f32,
    pub actor_start_y: f32,
    pub actor_width: f32,
    pub actor_height: f32,

    // === Obstacles ===
    /// Number of obstacle pairs in the pool
    pub pool_size: usize,
    pub obstacle_width: f32,
    pub difficulty: DifficultyTable,

    // === Pickups ===
    pub pickup_size: f32,
    /// A pickup accompanies every Nth placed pair
    pub pickup_every: u32,
    /// Shown one after another on each pickup, never repeated
    pub messages: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            screen_width: 800.0,
            screen_height: 600.0,
            edge_margin: 20.0,

            gravity: 600.0,
            flap_velocity: -300.0,
            scroll_speed: 200.0,

            actor_start_x: 0.1,
            actor_start_y: 0.5,
            actor_width: 48.0,
            actor_height: 40.0,

            pool_size: 4,
            obstacle_width: 50.0,
            difficulty: DifficultyTable::default(),

            pickup_size: 24.0,
            pickup_every: 4,
            messages: vec![
                "Frontend Developer - 3 Years Experience".to_string(),
                "Expert in React, Next.js, and React Native".to_string(),
                "QA Advocate - Implemented Playwright Tests".to_string(),
                "Built Reusable Components with Bit".to_string(),
                "Integrated Figma Designs into Apps".to_string(),
                "Experience with Phaser for Game Dev".to_string(),
            ],
        }
    }
}

impl Settings {
    /// Check that every difficulty profile can be placed on this screen
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.pool_size == 0 {
            return Err(SettingsError::Invalid("pool_size must be at least 1"));
        }
        if self.pickup_every == 0 {
            return Err(SettingsError::Invalid("pickup_every must be at least 1"));
        }
        if self.screen_width <= 0.0 || self.screen_height <= 0.0 {
            return Err(SettingsError::Invalid("screen size must be positive"));
        }
        if self.edge_margin < 0.0 {
            return Err(SettingsError::Invalid("edge_margin must not be negative"));
        }
        // Gap tops are whole units, so only whole units inside the margins count
        let room = (self.screen_height - self.edge_margin).floor() - self.edge_margin.ceil();
        for profile in self.difficulty.profiles() {
            if profile.vertical.min > profile.vertical.max
                || profile.horizontal.min > profile.horizontal.max
            {
                return Err(SettingsError::Invalid("difficulty range min exceeds max"));
            }
            if profile.vertical.min < 0 {
                return Err(SettingsError::Invalid("vertical gap must not be negative"));
            }
            if profile.vertical.max as f32 > room {
                return Err(SettingsError::GapTooLarge {
                    gap: profile.vertical.max,
                    height: self.screen_height,
                    margin: self.edge_margin,
                });
            }
        }
        Ok(())
    }

    /// Load and validate settings from a JSON file
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let settings: Settings = serde_json::from_str(&json)?;
        settings.validate()?;
        log::info!("Loaded settings from {}", path.as_ref().display());
        Ok(settings)
    }

    /// Load settings from `path` if given, falling back to defaults
    pub fn load(path: Option<&Path>) -> Self {
        match path.map(Self::load_from) {
            Some(Ok(settings)) => settings,
            Some(Err(e)) => {
                log::warn!("Ignoring settings file: {}", e);
                Self::default()
            }
            None => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }
}
