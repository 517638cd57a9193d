//! Playback defaults read from a rig's `[playback]` table

use serde::{Deserialize, Serialize};

/// Initial player settings.
///
/// ```toml
/// [playback]
/// clip = "walk"
/// speed = 1.0
/// loop = true
/// autoplay = false
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Clip to select; the first clip when absent
    pub clip: Option<String>,
    /// Playback speed multiplier (1.0 = normal, negative = reverse)
    pub speed: f64,
    /// Whether the clip wraps at its end
    #[serde(rename = "loop")]
    pub looping: bool,
    /// Start playing as soon as the player is created
    pub autoplay: bool,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            clip: None,
            speed: 1.0,
            looping: true,
            autoplay: false,
        }
    }
}
