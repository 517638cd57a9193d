//! Runtime skeleton: bones, name lookup, and the skinning matrix array

use crate::bone::Bone;
use glam::Mat4;
use sinew_core::{Result, SinewError};
use std::collections::HashMap;

/// Hard cap on bones per skeleton; matches the skinning shader's uniform array.
pub const MAX_BONES: usize = 100;

/// Bones plus the GPU-ready skinning matrices they drive.
///
/// The bone matrix pipeline:
/// 1. A clip's hierarchy is walked root-to-leaf (`hierarchy::evaluate`)
/// 2. Each node's global transform accumulates `parent_global * local`
/// 3. Bone nodes write `final_matrices[id] = global * offset_matrix`
/// 4. `bone_matrices()` is uploaded verbatim for vertex skinning
///
/// `final_matrices` always holds `MAX_BONES` entries; slots past
/// `bone_count()` stay identity.
#[derive(Debug, Clone)]
pub struct Skeleton {
    bones: Vec<Bone>,
    name_to_index: HashMap<String, usize>,
    final_matrices: Vec<Mat4>,
}

impl Skeleton {
    pub fn new() -> Self {
        Self {
            bones: Vec::new(),
            name_to_index: HashMap::new(),
            final_matrices: vec![Mat4::IDENTITY; MAX_BONES],
        }
    }

    /// Append a bone and assign it the next dense id.
    pub fn add_bone(&mut self, name: impl Into<String>, offset_matrix: Mat4) -> Result<usize> {
        let name = name.into();
        let id = self.bones.len();
        if id >= MAX_BONES {
            return Err(SinewError::BoneLimitExceeded { id, max: MAX_BONES });
        }
        if self.name_to_index.contains_key(&name) {
            return Err(SinewError::DuplicateBone(name));
        }

        self.name_to_index.insert(name.clone(), id);
        self.bones.push(Bone::new(name, id, offset_matrix));
        Ok(id)
    }

    /// Build from producer-supplied bones whose ids must already be dense
    /// (`bones[i].id == i`) and below `MAX_BONES`.
    pub fn from_bones(bones: Vec<Bone>) -> Result<Self> {
        let mut skeleton = Self::new();
        for (i, bone) in bones.into_iter().enumerate() {
            if bone.id >= MAX_BONES {
                return Err(SinewError::BoneLimitExceeded {
                    id: bone.id,
                    max: MAX_BONES,
                });
            }
            if bone.id != i {
                return Err(SinewError::ParseError(format!(
                    "Bone '{}' has id {} but is stored at index {}",
                    bone.name, bone.id, i
                )));
            }
            skeleton.add_bone(bone.name, bone.offset_matrix)?;
        }
        Ok(skeleton)
    }

    pub fn bone_count(&self) -> usize {
        self.bones.len()
    }

    pub fn bones(&self) -> &[Bone] {
        &self.bones
    }

    pub fn bone(&self, id: usize) -> Option<&Bone> {
        self.bones.get(id)
    }

    /// Look up a bone id by name
    pub fn bone_index(&self, name: &str) -> Option<usize> {
        self.name_to_index.get(name).copied()
    }

    /// All `MAX_BONES` skinning matrices
    pub fn final_matrices(&self) -> &[Mat4] {
        &self.final_matrices
    }

    /// Skinning matrices for the bones that exist, in id order (for GPU upload)
    pub fn bone_matrices(&self) -> &[Mat4] {
        &self.final_matrices[..self.bones.len()]
    }

    /// Reset every skinning matrix to identity (bind pose).
    pub fn reset_to_bind_pose(&mut self) {
        self.final_matrices.fill(Mat4::IDENTITY);
    }

    /// Write one skinning matrix. Only hierarchy evaluation calls this.
    ///
    /// Ids past `bone_count()` are ignored; clips are validated against the
    /// skeleton before they can reach here.
    pub(crate) fn set_final_matrix(&mut self, id: usize, global: Mat4) {
        let Some(bone) = self.bones.get(id) else {
            return;
        };
        self.final_matrices[id] = global * bone.offset_matrix;
    }
}

impl Default for Skeleton {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn bones_get_dense_ids_and_name_lookup() {
        let mut skel = Skeleton::new();
        assert_eq!(skel.add_bone("root", Mat4::IDENTITY).unwrap(), 0);
        assert_eq!(skel.add_bone("child", Mat4::IDENTITY).unwrap(), 1);

        assert_eq!(skel.bone_count(), 2);
        assert_eq!(skel.bone_index("child"), Some(1));
        assert_eq!(skel.bone_index("missing"), None);
        assert_eq!(skel.bone(1).map(|b| b.name.as_str()), Some("child"));
    }

    #[test]
    fn final_matrices_start_as_identity() {
        let skel = Skeleton::new();
        assert_eq!(skel.final_matrices().len(), MAX_BONES);
        assert!(skel.final_matrices().iter().all(|m| *m == Mat4::IDENTITY));
        assert!(skel.bone_matrices().is_empty());
    }

    #[test]
    fn rejects_bone_past_limit() {
        let mut skel = Skeleton::new();
        for i in 0..MAX_BONES {
            skel.add_bone(format!("b{}", i), Mat4::IDENTITY).unwrap();
        }
        let err = skel.add_bone("one_too_many", Mat4::IDENTITY).unwrap_err();
        assert!(matches!(
            err,
            SinewError::BoneLimitExceeded { id: 100, max: 100 }
        ));
    }

    #[test]
    fn rejects_duplicate_names() {
        let mut skel = Skeleton::new();
        skel.add_bone("hand", Mat4::IDENTITY).unwrap();
        assert!(matches!(
            skel.add_bone("hand", Mat4::IDENTITY),
            Err(SinewError::DuplicateBone(_))
        ));
    }

    #[test]
    fn from_bones_checks_ids() {
        let ok = Skeleton::from_bones(vec![
            Bone::new("a", 0, Mat4::IDENTITY),
            Bone::new("b", 1, Mat4::IDENTITY),
        ]);
        assert!(ok.is_ok());

        let too_high = Skeleton::from_bones(vec![Bone::new("a", 150, Mat4::IDENTITY)]);
        assert!(matches!(
            too_high,
            Err(SinewError::BoneLimitExceeded { id: 150, .. })
        ));

        let sparse = Skeleton::from_bones(vec![Bone::new("a", 1, Mat4::IDENTITY)]);
        assert!(sparse.is_err());
    }

    #[test]
    fn set_final_matrix_applies_offset_and_reset_clears() {
        let mut skel = Skeleton::new();
        let offset = Mat4::from_translation(Vec3::new(0.0, -1.0, 0.0));
        skel.add_bone("root", offset).unwrap();

        let global = Mat4::from_translation(Vec3::new(2.0, 0.0, 0.0));
        skel.set_final_matrix(0, global);
        assert_eq!(skel.bone_matrices()[0], global * offset);

        skel.reset_to_bind_pose();
        assert_eq!(skel.bone_matrices()[0], Mat4::IDENTITY);
    }

    #[test]
    fn set_final_matrix_ignores_unknown_bone() {
        let mut skel = Skeleton::new();
        skel.add_bone("root", Mat4::IDENTITY).unwrap();
        skel.set_final_matrix(5, Mat4::from_translation(Vec3::X));
        assert!(skel.final_matrices().iter().all(|m| *m == Mat4::IDENTITY));
    }
}
