//! Sound cues
//!
//! The simulation never plays audio itself. It emits `SoundCue`s naming the
//! asset the loader registered; the presentation layer owns mixing.

use serde::{Deserialize, Serialize};

use crate::assets;

/// Sound effect and music commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoundCue {
    /// Start the ambient loop (run start)
    AmbientPlay,
    /// Pause the ambient loop (pause request)
    AmbientPause,
    /// Continue the ambient loop (resume)
    AmbientResume,
    /// Stop the ambient loop (run ended)
    AmbientStop,
    /// Pickup collected
    PickupChime,
    /// Actor hit an obstacle
    Impact,
}

impl SoundCue {
    /// Name of the sound asset this cue refers to
    pub fn asset_key(&self) -> &'static str {
        match self {
            SoundCue::AmbientPlay
            | SoundCue::AmbientPause
            | SoundCue::AmbientResume
            | SoundCue::AmbientStop => assets::AMBIENT_LOOP,
            SoundCue::PickupChime => assets::PICKUP_CHIME,
            SoundCue::Impact => assets::IMPACT_SOUND,
        }
    }

    /// Whether the referenced sound loops
    pub fn looping(&self) -> bool {
        self.asset_key() == assets::AMBIENT_LOOP
    }

    /// Playback volume (0.0 - 1.0)
    pub fn volume(&self) -> f32 {
        if self.looping() { 0.5 } else { 1.0 }
    }
}
