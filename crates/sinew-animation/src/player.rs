//! Clip registry and playback state machine

use crate::clip::AnimationClip;
use crate::config::PlaybackConfig;
use crate::skeleton::Skeleton;
use sinew_core::{Result, SinewError};

/// Where the player is in its lifecycle.
///
/// A non-looping clip that reaches its end moves to `Paused` with the time
/// held at the end; `play` then restarts it from the beginning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

/// Holds a model's clips and drives one of them over a skeleton.
///
/// The skeleton is passed into every call that poses it, so the player
/// stores no reference to it. `tick` and `set_progress` rewrite the
/// skeleton's final matrices in place without allocating.
#[derive(Debug, Clone)]
pub struct AnimationPlayer {
    clips: Vec<AnimationClip>,
    current: Option<usize>,
    /// Current playback time in clip ticks
    time_ticks: f64,
    state: PlaybackState,
    looping: bool,
    /// Playback speed multiplier (1.0 = normal, negative = reverse)
    speed: f64,
}

impl AnimationPlayer {
    /// Create a stopped, looping player. The first clip, if any, is selected.
    pub fn new(clips: Vec<AnimationClip>) -> Self {
        let current = if clips.is_empty() { None } else { Some(0) };
        Self {
            clips,
            current,
            time_ticks: 0.0,
            state: PlaybackState::Stopped,
            looping: true,
            speed: 1.0,
        }
    }

    /// Create a player and apply `config`. Fails if the configured clip
    /// name is unknown.
    pub fn with_config(clips: Vec<AnimationClip>, config: &PlaybackConfig) -> Result<Self> {
        let mut player = Self::new(clips);
        player.speed = config.speed;
        player.looping = config.looping;
        if let Some(name) = &config.clip {
            player.set_clip_by_name(name)?;
        }
        if config.autoplay {
            player.play();
        }
        Ok(player)
    }

    /// Register another clip and return its index. Selects it when no clip
    /// is current.
    ///
    /// The clip is not checked against any skeleton; when the player belongs
    /// to an [`AnimatedModel`](crate::model::AnimatedModel), add clips through
    /// the model instead.
    pub(crate) fn add_clip(&mut self, clip: AnimationClip) -> usize {
        self.clips.push(clip);
        let index = self.clips.len() - 1;
        if self.current.is_none() {
            self.current = Some(index);
        }
        index
    }

    /// Select a clip by index. Time resets to 0; play/pause state is kept.
    /// On failure the current clip is unchanged.
    pub fn set_clip(&mut self, index: usize) -> Result<()> {
        let Some(clip) = self.clips.get(index) else {
            return Err(SinewError::ClipNotFound(format!(
                "index {} ({} clips loaded)",
                index,
                self.clips.len()
            )));
        };
        log::debug!("Switching to clip '{}'", clip.name());
        self.current = Some(index);
        self.time_ticks = 0.0;
        Ok(())
    }

    /// Select a clip by name. See [`set_clip`](Self::set_clip).
    pub fn set_clip_by_name(&mut self, name: &str) -> Result<()> {
        let index = self
            .clips
            .iter()
            .position(|c| c.name() == name)
            .ok_or_else(|| SinewError::ClipNotFound(name.to_string()))?;
        self.set_clip(index)
    }

    /// Start or resume playback. A non-looping clip sitting at its end
    /// (or at its start, when playing in reverse) is rewound first.
    pub fn play(&mut self) {
        let Some(duration) = self.current_clip().map(AnimationClip::duration_ticks) else {
            log::debug!("play() ignored: no clip selected");
            return;
        };

        if !self.looping {
            if self.speed >= 0.0 && self.time_ticks >= duration {
                self.time_ticks = 0.0;
            } else if self.speed < 0.0 && self.time_ticks <= 0.0 {
                self.time_ticks = duration;
            }
        }
        self.state = PlaybackState::Playing;
    }

    /// Freeze playback at the current time.
    pub fn pause(&mut self) {
        if self.state == PlaybackState::Playing {
            self.state = PlaybackState::Paused;
        }
    }

    /// Stop, rewind to 0 and put the skeleton back in its bind pose.
    pub fn stop(&mut self, skeleton: &mut Skeleton) {
        self.state = PlaybackState::Stopped;
        self.time_ticks = 0.0;
        skeleton.reset_to_bind_pose();
    }

    /// Advance by `dt` seconds and re-pose the skeleton.
    ///
    /// Does nothing unless playing. Looping clips wrap; others clamp at the
    /// end (or at 0 in reverse) and pause.
    pub fn tick(&mut self, dt: f64, skeleton: &mut Skeleton) {
        if self.state != PlaybackState::Playing {
            return;
        }
        let Some(clip) = self.current.and_then(|i| self.clips.get(i)) else {
            return;
        };

        let duration = clip.duration_ticks();
        self.time_ticks += dt * self.speed * clip.ticks_per_second();

        if self.looping {
            if duration > 0.0 {
                if self.time_ticks >= duration || self.time_ticks < 0.0 {
                    self.time_ticks = self.time_ticks.rem_euclid(duration);
                    // rem_euclid may round up to `duration` for tiny negatives
                    if self.time_ticks >= duration {
                        self.time_ticks = 0.0;
                    }
                }
            } else {
                self.time_ticks = 0.0;
            }
        } else if self.time_ticks >= duration {
            self.time_ticks = duration;
            self.state = PlaybackState::Paused;
            log::debug!("Clip '{}' finished", clip.name());
        } else if self.time_ticks < 0.0 {
            self.time_ticks = 0.0;
            self.state = PlaybackState::Paused;
            log::debug!("Clip '{}' finished (reverse)", clip.name());
        }

        clip.evaluate(self.time_ticks, skeleton);
    }

    /// Scrub to `progress` in `[0, 1]` (clamped) and re-pose immediately,
    /// whatever the playback state.
    pub fn set_progress(&mut self, progress: f64, skeleton: &mut Skeleton) {
        let Some(clip) = self.current.and_then(|i| self.clips.get(i)) else {
            return;
        };
        let progress = if progress.is_nan() {
            0.0
        } else {
            progress.clamp(0.0, 1.0)
        };
        self.time_ticks = progress * clip.duration_ticks();
        clip.evaluate(self.time_ticks, skeleton);
    }

    /// Re-pose the skeleton at the current time without advancing.
    pub fn evaluate(&self, skeleton: &mut Skeleton) {
        if let Some(clip) = self.current_clip() {
            clip.evaluate(self.time_ticks, skeleton);
        }
    }

    pub fn clips(&self) -> &[AnimationClip] {
        &self.clips
    }

    pub fn current_clip(&self) -> Option<&AnimationClip> {
        self.current.and_then(|i| self.clips.get(i))
    }

    pub fn current_clip_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current_clip_name(&self) -> Option<&str> {
        self.current_clip().map(AnimationClip::name)
    }

    pub fn clip_count(&self) -> usize {
        self.clips.len()
    }

    pub fn clip_name(&self, index: usize) -> Option<&str> {
        self.clips.get(index).map(AnimationClip::name)
    }

    pub fn clip_names(&self) -> impl Iterator<Item = &str> {
        self.clips.iter().map(AnimationClip::name)
    }

    /// Position within the current clip, 0 when the clip has no length
    pub fn progress(&self) -> f64 {
        match self.current_clip() {
            Some(clip) if clip.duration_ticks() > 0.0 => self.time_ticks / clip.duration_ticks(),
            _ => 0.0,
        }
    }

    /// Length of the current clip in seconds
    pub fn duration_seconds(&self) -> f64 {
        self.current_clip()
            .map(AnimationClip::duration_seconds)
            .unwrap_or(0.0)
    }

    pub fn time_ticks(&self) -> f64 {
        self.time_ticks
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn set_speed(&mut self, speed: f64) {
        self.speed = speed;
    }

    pub fn looping(&self) -> bool {
        self.looping
    }

    pub fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
    }
}

impl Default for AnimationPlayer {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}
