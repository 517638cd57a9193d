//! Animation clips: per-bone keyframe tracks plus the hierarchy they drive

use crate::bone::BoneTracks;
use crate::hierarchy::{self, HierarchyNode};
use crate::skeleton::Skeleton;
use sinew_core::{Result, SinewError};

/// Playback rate used when the source format does not specify one
pub const DEFAULT_TICKS_PER_SECOND: f64 = 25.0;

/// A complete skeletal animation clip.
///
/// Times inside a clip are in ticks; `ticks_per_second` converts to real
/// time. `tracks[id]` holds the channels for bone `id`; bones past the end
/// of `tracks` are unanimated in this clip.
#[derive(Debug, Clone)]
pub struct AnimationClip {
    name: String,
    duration_ticks: f64,
    ticks_per_second: f64,
    root: HierarchyNode,
    tracks: Vec<BoneTracks>,
}

impl AnimationClip {
    /// Create a clip; the duration is the latest keyframe among the bones the
    /// hierarchy references.
    ///
    /// Fails when `ticks_per_second` is not a positive finite number or the
    /// hierarchy references a bone twice.
    pub fn new(
        name: impl Into<String>,
        ticks_per_second: f64,
        root: HierarchyNode,
        tracks: Vec<BoneTracks>,
    ) -> Result<Self> {
        let name = name.into();

        if !(ticks_per_second.is_finite() && ticks_per_second > 0.0) {
            return Err(SinewError::InvalidClip(format!(
                "Clip '{}' has invalid ticks_per_second: {}",
                name, ticks_per_second
            )));
        }

        let referenced = root.bone_indices();
        let max_bone = referenced.iter().copied().max().map_or(0, |m| m + 1);
        root.validate(max_bone)?;

        let duration_ticks = referenced
            .iter()
            .filter_map(|&i| tracks.get(i).and_then(BoneTracks::end_time))
            .fold(0.0, f64::max);

        if duration_ticks == 0.0 {
            log::warn!("Clip '{}' has zero duration", name);
        }

        Ok(Self {
            name,
            duration_ticks,
            ticks_per_second,
            root,
            tracks,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn duration_ticks(&self) -> f64 {
        self.duration_ticks
    }

    pub fn ticks_per_second(&self) -> f64 {
        self.ticks_per_second
    }

    pub fn duration_seconds(&self) -> f64 {
        self.duration_ticks / self.ticks_per_second
    }

    pub fn root(&self) -> &HierarchyNode {
        &self.root
    }

    pub fn tracks(&self) -> &[BoneTracks] {
        &self.tracks
    }

    /// Channels for one bone, if this clip animates it
    pub fn bone_tracks(&self, bone_id: usize) -> Option<&BoneTracks> {
        self.tracks.get(bone_id)
    }

    /// Check the hierarchy against a skeleton this clip will drive.
    pub fn validate_for(&self, skeleton: &Skeleton) -> Result<()> {
        self.root.validate(skeleton.bone_count()).map_err(|e| {
            SinewError::InvalidClip(format!("Clip '{}' does not fit skeleton: {}", self.name, e))
        })
    }

    /// Pose `skeleton` at `time_ticks`.
    pub fn evaluate(&self, time_ticks: f64, skeleton: &mut Skeleton) {
        hierarchy::evaluate(&self.root, &self.tracks, time_ticks, skeleton);
    }
}
