//! Score-driven obstacle spacing

use serde::{Deserialize, Serialize};

use crate::consts::{HARD_SCORE, MEDIUM_SCORE};

/// Difficulty bracket selected by cumulative score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DifficultyTier {
    Easy,
    Medium,
    Hard,
}

impl DifficultyTier {
    pub fn for_score(score: u32) -> Self {
        if score >= HARD_SCORE {
            DifficultyTier::Hard
        } else if score >= MEDIUM_SCORE {
            DifficultyTier::Medium
        } else {
            DifficultyTier::Easy
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DifficultyTier::Easy => "Easy",
            DifficultyTier::Medium => "Medium",
            DifficultyTier::Hard => "Hard",
        }
    }
}

/// Inclusive integer range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GapRange {
    pub min: i32,
    pub max: i32,
}

impl GapRange {
    pub const fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: i32) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

/// Spacing profile for one tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierProfile {
    /// Distance from the rightmost pair to the next one
    pub horizontal: GapRange,
    /// Height of the opening between upper and lower segments
    pub vertical: GapRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifficultyTable {
    pub easy: TierProfile,
    pub medium: TierProfile,
    pub hard: TierProfile,
}

impl Default for DifficultyTable {
    fn default() -> Self {
        Self {
            easy: TierProfile {
                horizontal: GapRange::new(400, 450),
                vertical: GapRange::new(150, 250),
            },
            medium: TierProfile {
                horizontal: GapRange::new(350, 400),
                vertical: GapRange::new(140, 210),
            },
            hard: TierProfile {
                horizontal: GapRange::new(300, 350),
                vertical: GapRange::new(120, 170),
            },
        }
    }
}

impl DifficultyTable {
    pub fn profile(&self, tier: DifficultyTier) -> TierProfile {
        match tier {
            DifficultyTier::Easy => self.easy,
            DifficultyTier::Medium => self.medium,
            DifficultyTier::Hard => self.hard,
        }
    }

    pub fn profiles(&self) -> [TierProfile; 3] {
        [self.easy, self.medium, self.hard]
    }
}

/// Tracks the active tier for one run; only ever escalates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DifficultyController {
    tier: DifficultyTier,
}

impl Default for DifficultyController {
    fn default() -> Self {
        Self {
            tier: DifficultyTier::Easy,
        }
    }
}

impl DifficultyController {
    pub fn tier(&self) -> DifficultyTier {
        self.tier
    }

    /// Re-evaluate against the current score. Returns the new tier on escalation.
    pub fn update(&mut self, score: u32) -> Option<DifficultyTier> {
        let next = self.tier.max(DifficultyTier::for_score(score));
        if next != self.tier {
            self.tier = next;
            Some(next)
        } else {
            None
        }
    }
}
