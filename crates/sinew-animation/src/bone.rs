//! Bones and their per-clip keyframe channels

use crate::track::KeyframeTrack;
use glam::{Mat4, Quat, Vec3};
use sinew_core::Transform;

/// A single bone: identity plus its inverse bind matrix.
///
/// `id` is the bone's slot in both `Skeleton::bones` and the final matrix
/// array. It is assigned once by the skeleton and never changes.
#[derive(Debug, Clone, PartialEq)]
pub struct Bone {
    pub name: String,
    pub id: usize,
    /// Model space → bone space at bind time
    pub offset_matrix: Mat4,
}

impl Bone {
    pub fn new(name: impl Into<String>, id: usize, offset_matrix: Mat4) -> Self {
        Self {
            name: name.into(),
            id,
            offset_matrix,
        }
    }
}

/// The three animated channels of one bone within one clip.
#[derive(Debug, Clone, PartialEq)]
pub struct BoneTracks {
    pub positions: KeyframeTrack<Vec3>,
    pub rotations: KeyframeTrack<Quat>,
    pub scales: KeyframeTrack<Vec3>,
}

impl Default for BoneTracks {
    fn default() -> Self {
        Self {
            positions: KeyframeTrack::positions(Vec::new()),
            rotations: KeyframeTrack::rotations(Vec::new()),
            scales: KeyframeTrack::scales(Vec::new()),
        }
    }
}

impl BoneTracks {
    pub fn new(
        positions: KeyframeTrack<Vec3>,
        rotations: KeyframeTrack<Quat>,
        scales: KeyframeTrack<Vec3>,
    ) -> Self {
        Self {
            positions,
            rotations,
            scales,
        }
    }

    /// True when no channel carries a keyframe
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty() && self.rotations.is_empty() && self.scales.is_empty()
    }

    /// Latest timestamp across the three channels
    pub fn end_time(&self) -> Option<f64> {
        [
            self.positions.end_time(),
            self.rotations.end_time(),
            self.scales.end_time(),
        ]
        .into_iter()
        .flatten()
        .reduce(f64::max)
    }

    /// Sampled translation/rotation/scale at `time`
    pub fn pose_at(&self, time: f64) -> Transform {
        Transform {
            translation: self.positions.sample_at(time),
            rotation: self.rotations.sample_at(time),
            scale: self.scales.sample_at(time),
        }
    }

    /// Local transform at `time`: `T * R * S`.
    pub fn local_transform_at(&self, time: f64) -> Mat4 {
        self.pose_at(time).to_matrix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::KeyframeSample;

    #[test]
    fn unanimated_bone_is_identity() {
        let tracks = BoneTracks::default();
        assert!(tracks.is_empty());
        assert_eq!(tracks.local_transform_at(12.0), Mat4::IDENTITY);
        assert_eq!(tracks.end_time(), None);
    }

    #[test]
    fn local_transform_applies_scale_then_rotation_then_translation() {
        let tracks = BoneTracks::new(
            KeyframeTrack::positions(vec![KeyframeSample::new(0.0, Vec3::new(0.0, 0.0, 5.0))]),
            KeyframeTrack::rotations(vec![KeyframeSample::new(
                0.0,
                Quat::from_rotation_z(std::f32::consts::FRAC_PI_2),
            )]),
            KeyframeTrack::scales(vec![KeyframeSample::new(0.0, Vec3::splat(3.0))]),
        );
        let p = tracks.local_transform_at(0.0).transform_point3(Vec3::X);
        assert!((p - Vec3::new(0.0, 3.0, 5.0)).length() < 1e-5, "got {p:?}");
    }

    #[test]
    fn end_time_is_max_over_channels() {
        let tracks = BoneTracks::new(
            KeyframeTrack::positions(vec![KeyframeSample::new(4.0, Vec3::ZERO)]),
            KeyframeTrack::rotations(vec![
                KeyframeSample::new(0.0, Quat::IDENTITY),
                KeyframeSample::new(9.0, Quat::IDENTITY),
            ]),
            KeyframeTrack::scales(vec![]),
        );
        assert_eq!(tracks.end_time(), Some(9.0));
    }

    #[test]
    fn evaluation_is_pure() {
        let tracks = BoneTracks::new(
            KeyframeTrack::positions(vec![
                KeyframeSample::new(0.0, Vec3::ZERO),
                KeyframeSample::new(1.0, Vec3::ONE),
            ]),
            KeyframeTrack::rotations(vec![]),
            KeyframeTrack::scales(vec![]),
        );
        assert_eq!(tracks.local_transform_at(0.3), tracks.local_transform_at(0.3));
    }
}
