//! A skeleton paired with the player that poses it

use crate::clip::AnimationClip;
use crate::config::PlaybackConfig;
use crate::player::AnimationPlayer;
use crate::skeleton::Skeleton;
use glam::Mat4;
use sinew_core::Result;

/// One animated model: its skeleton and clip playback.
///
/// Owning both lets `update` hand the player a mutable skeleton without
/// the caller juggling borrows.
#[derive(Debug, Clone)]
pub struct AnimatedModel {
    skeleton: Skeleton,
    player: AnimationPlayer,
}

impl AnimatedModel {
    /// Fails if any clip references bones the skeleton does not have, or if
    /// `config` names an unknown clip.
    ///
    /// The new model is posed at the selected clip's first frame even though
    /// the player starts out `Stopped` (unless `config.autoplay` is set).
    /// [`stop`](Self::stop) instead resets to the bind pose, so a stopped
    /// model shows frame 0 only until it is first stopped.
    pub fn new(skeleton: Skeleton, clips: Vec<AnimationClip>, config: &PlaybackConfig) -> Result<Self> {
        for clip in &clips {
            clip.validate_for(&skeleton)?;
        }
        let player = AnimationPlayer::with_config(clips, config)?;
        let mut model = Self { skeleton, player };
        // Start from the selected clip's first frame rather than the bind pose
        model.player.evaluate(&mut model.skeleton);
        Ok(model)
    }

    /// Register another clip after checking it against the skeleton.
    /// Returns the clip's index in the player.
    pub fn add_clip(&mut self, clip: AnimationClip) -> Result<usize> {
        clip.validate_for(&self.skeleton)?;
        Ok(self.player.add_clip(clip))
    }

    /// Advance playback by `dt` seconds.
    pub fn update(&mut self, dt: f64) {
        self.player.tick(dt, &mut self.skeleton);
    }

    pub fn play(&mut self) {
        self.player.play();
    }

    pub fn pause(&mut self) {
        self.player.pause();
    }

    /// Stop playback and reset the skeleton to its bind pose.
    pub fn stop(&mut self) {
        self.player.stop(&mut self.skeleton);
    }

    pub fn set_progress(&mut self, progress: f64) {
        self.player.set_progress(progress, &mut self.skeleton);
    }

    /// Switch clips and show the new clip's first frame.
    pub fn set_clip_by_name(&mut self, name: &str) -> Result<()> {
        self.player.set_clip_by_name(name)?;
        self.player.evaluate(&mut self.skeleton);
        Ok(())
    }

    /// Skinning matrices for the skeleton's bones, ready for upload
    pub fn bone_matrices(&self) -> &[Mat4] {
        self.skeleton.bone_matrices()
    }

    pub fn has_animations(&self) -> bool {
        self.player.clip_count() > 0
    }

    pub fn skeleton(&self) -> &Skeleton {
        &self.skeleton
    }

    pub fn player(&self) -> &AnimationPlayer {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut AnimationPlayer {
        &mut self.player
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bone::BoneTracks;
    use crate::hierarchy::HierarchyNode;
    use crate::player::PlaybackState;
    use crate::track::{KeyframeSample, KeyframeTrack};
    use glam::Vec3;
    use sinew_core::SinewError;

    fn rig() -> (Skeleton, AnimationClip) {
        let mut skel = Skeleton::new();
        skel.add_bone("hip", Mat4::IDENTITY).unwrap();
        let tracks = vec![BoneTracks {
            positions: KeyframeTrack::positions(vec![
                KeyframeSample::new(0.0, Vec3::new(1.0, 0.0, 0.0)),
                KeyframeSample::new(10.0, Vec3::new(3.0, 0.0, 0.0)),
            ]),
            ..Default::default()
        }];
        let root = HierarchyNode::new("hip", Mat4::IDENTITY).with_bone(0);
        let clip = AnimationClip::new("walk", 10.0, root, tracks).unwrap();
        (skel, clip)
    }

    #[test]
    fn new_poses_first_frame() {
        let (skel, clip) = rig();
        let model = AnimatedModel::new(skel, vec![clip], &PlaybackConfig::default()).unwrap();
        assert!(model.has_animations());
        assert_eq!(model.bone_matrices().len(), 1);
        assert!((model.bone_matrices()[0].w_axis.x - 1.0).abs() < 1e-6);
    }

    #[test]
    fn update_advances_when_playing() {
        let (skel, clip) = rig();
        let mut model = AnimatedModel::new(skel, vec![clip], &PlaybackConfig::default()).unwrap();
        model.update(0.5);
        assert!((model.bone_matrices()[0].w_axis.x - 1.0).abs() < 1e-6);

        model.play();
        model.update(0.5);
        assert!((model.bone_matrices()[0].w_axis.x - 2.0).abs() < 1e-5);

        model.stop();
        assert_eq!(model.bone_matrices()[0], Mat4::IDENTITY);
    }

    #[test]
    fn rejects_clip_for_larger_skeleton() {
        let skel = Skeleton::new();
        let (_, clip) = rig();
        let res = AnimatedModel::new(skel, vec![clip], &PlaybackConfig::default());
        assert!(matches!(res, Err(SinewError::InvalidClip(_))));
    }

    #[test]
    fn add_clip_checks_skeleton() {
        let (skel, clip) = rig();
        let mut model = AnimatedModel::new(skel, vec![clip], &PlaybackConfig::default()).unwrap();

        let far = AnimationClip::new(
            "far",
            10.0,
            HierarchyNode::new("far", Mat4::IDENTITY).with_bone(5),
            vec![],
        )
        .unwrap();
        assert!(matches!(model.add_clip(far), Err(SinewError::InvalidClip(_))));
        assert_eq!(model.player().clip_count(), 1);

        let (_, again) = rig();
        assert_eq!(model.add_clip(again).unwrap(), 1);
        model.player_mut().set_clip(1).unwrap();
        model.set_progress(0.5);
        assert!((model.bone_matrices()[0].w_axis.x - 2.0).abs() < 1e-5);
    }

    #[test]
    fn fresh_model_shows_first_frame_but_stop_shows_bind_pose() {
        let (skel, clip) = rig();
        let mut model = AnimatedModel::new(skel, vec![clip], &PlaybackConfig::default()).unwrap();
        assert_eq!(model.player().state(), PlaybackState::Stopped);
        assert!((model.bone_matrices()[0].w_axis.x - 1.0).abs() < 1e-6);

        model.stop();
        assert_eq!(model.player().state(), PlaybackState::Stopped);
        assert_eq!(model.bone_matrices()[0], Mat4::IDENTITY);
    }

    #[test]
    fn model_without_clips_stays_in_bind_pose() {
        let (skel, _) = rig();
        let mut model = AnimatedModel::new(skel, vec![], &PlaybackConfig::default()).unwrap();
        assert!(!model.has_animations());
        model.play();
        model.update(1.0);
        assert_eq!(model.bone_matrices()[0], Mat4::IDENTITY);
    }
}
