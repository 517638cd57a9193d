//! Registry of animated model instances
//!
//! Advances every registered model once per frame and hands out bone
//! matrices by instance id.

use crate::model::AnimatedModel;
use glam::Mat4;
use sinew_core::{InstanceId, Result, SinewError};
use std::collections::HashMap;

/// All animated models in a scene, keyed by instance
#[derive(Debug, Default)]
pub struct AnimationSystem {
    models: HashMap<InstanceId, AnimatedModel>,
}

impl AnimationSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a model and return the id it was stored under.
    pub fn add(&mut self, model: AnimatedModel) -> InstanceId {
        let id = InstanceId::new();
        self.insert(id, model);
        id
    }

    /// Register a model under a caller-chosen id, replacing any previous one.
    pub fn insert(&mut self, id: InstanceId, model: AnimatedModel) {
        log::debug!(
            "Registered instance {} ({} bones, {} clips)",
            id,
            model.skeleton().bone_count(),
            model.player().clip_count()
        );
        self.models.insert(id, model);
    }

    pub fn remove(&mut self, id: InstanceId) -> Option<AnimatedModel> {
        self.models.remove(&id)
    }

    pub fn get(&self, id: InstanceId) -> Option<&AnimatedModel> {
        self.models.get(&id)
    }

    pub fn get_mut(&mut self, id: InstanceId) -> Option<&mut AnimatedModel> {
        self.models.get_mut(&id)
    }

    /// Advance every model by `dt` seconds.
    pub fn update(&mut self, dt: f64) {
        for model in self.models.values_mut() {
            model.update(dt);
        }
    }

    /// Skinning matrices for one instance.
    pub fn bone_matrices(&self, id: InstanceId) -> Result<&[Mat4]> {
        self.models
            .get(&id)
            .map(AnimatedModel::bone_matrices)
            .ok_or_else(|| SinewError::InstanceNotFound(id.to_string()))
    }

    /// Number of registered instances
    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Number of instances currently playing
    pub fn active_count(&self) -> usize {
        self.models.values().filter(|m| m.player().is_playing()).count()
    }

    /// Drop every instance, e.g. on scene change.
    pub fn clear(&mut self) {
        self.models.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bone::BoneTracks;
    use crate::clip::AnimationClip;
    use crate::config::PlaybackConfig;
    use crate::hierarchy::HierarchyNode;
    use crate::skeleton::Skeleton;
    use crate::track::{KeyframeSample, KeyframeTrack};
    use glam::Vec3;

    fn model(autoplay: bool) -> AnimatedModel {
        let mut skel = Skeleton::new();
        skel.add_bone("root", Mat4::IDENTITY).unwrap();
        let tracks = vec![BoneTracks {
            positions: KeyframeTrack::positions(vec![
                KeyframeSample::new(0.0, Vec3::ZERO),
                KeyframeSample::new(4.0, Vec3::new(0.0, 4.0, 0.0)),
            ]),
            ..Default::default()
        }];
        let root = HierarchyNode::new("root", Mat4::IDENTITY).with_bone(0);
        let clip = AnimationClip::new("bob", 4.0, root, tracks).unwrap();
        let config = PlaybackConfig {
            autoplay,
            ..Default::default()
        };
        AnimatedModel::new(skel, vec![clip], &config).unwrap()
    }

    #[test]
    fn update_advances_only_playing_models() {
        let mut system = AnimationSystem::new();
        let a = system.add(model(true));
        let b = system.add(model(false));
        assert_eq!(system.len(), 2);
        assert_eq!(system.active_count(), 1);

        system.update(0.5);
        assert!((system.bone_matrices(a).unwrap()[0].w_axis.y - 2.0).abs() < 1e-5);
        assert_eq!(system.bone_matrices(b).unwrap()[0].w_axis.y, 0.0);
    }

    #[test]
    fn unknown_instance_is_an_error() {
        let system = AnimationSystem::new();
        let res = system.bone_matrices(InstanceId::from_raw(u64::MAX));
        assert!(matches!(res, Err(SinewError::InstanceNotFound(_))));
    }

    #[test]
    fn remove_and_clear() {
        let mut system = AnimationSystem::new();
        let a = system.add(model(false));
        let id = InstanceId::from_raw(7);
        system.insert(id, model(false));

        assert!(system.remove(a).is_some());
        assert!(system.get(a).is_none());
        assert!(system.get_mut(id).is_some());

        system.clear();
        assert!(system.is_empty());
    }
}
