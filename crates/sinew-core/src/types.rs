//! Spatial types

use glam::{Mat4, Quat, Vec3};

/// A decomposed affine transform: translation, rotation and scale.
///
/// `to_matrix` composes `T * R * S`, so a column vector is scaled first,
/// then rotated, then translated.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    /// Build from raw arrays; rotation is `[x, y, z, w]` and is normalized.
    ///
    /// A zero-length quaternion falls back to identity.
    pub fn from_arrays(translation: [f32; 3], rotation: [f32; 4], scale: [f32; 3]) -> Self {
        let q = Quat::from_array(rotation);
        let rotation = if q.length_squared() > 1e-12 {
            q.normalize()
        } else {
            Quat::IDENTITY
        };
        Self {
            translation: Vec3::from_array(translation),
            rotation,
            scale: Vec3::from_array(scale),
        }
    }

    /// Decompose an affine matrix. Shear is lost.
    pub fn from_matrix(m: &Mat4) -> Self {
        let (scale, rotation, translation) = m.to_scale_rotation_translation();
        Self {
            translation,
            rotation,
            scale,
        }
    }

    /// Convert to a 4x4 column-major matrix (`T * R * S`)
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_is_identity_matrix() {
        assert_eq!(Transform::default().to_matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn composition_order_is_trs() {
        let t = Transform {
            translation: Vec3::new(1.0, 0.0, 0.0),
            rotation: Quat::from_rotation_z(std::f32::consts::FRAC_PI_2),
            scale: Vec3::splat(2.0),
        };
        // Scale (2,0,0), rotate to (0,2,0), translate to (1,2,0)
        let p = t.to_matrix().transform_point3(Vec3::X);
        assert!((p - Vec3::new(1.0, 2.0, 0.0)).length() < 1e-5, "got {p:?}");
    }

    #[test]
    fn from_arrays_normalizes_rotation() {
        let t = Transform::from_arrays([0.0; 3], [0.0, 2.0, 0.0, 0.0], [1.0; 3]);
        assert!((t.rotation.length() - 1.0).abs() < 1e-6);

        let degenerate = Transform::from_arrays([0.0; 3], [0.0; 4], [1.0; 3]);
        assert_eq!(degenerate.rotation, Quat::IDENTITY);
    }

    #[test]
    fn matrix_round_trip_keeps_components() {
        let t = Transform {
            translation: Vec3::new(3.0, -1.0, 2.0),
            rotation: Quat::from_rotation_y(0.7),
            scale: Vec3::new(1.0, 2.0, 3.0),
        };
        let back = Transform::from_matrix(&t.to_matrix());
        assert!((back.translation - t.translation).length() < 1e-5);
        assert!(back.rotation.dot(t.rotation).abs() > 0.9999);
        assert!((back.scale - t.scale).length() < 1e-5);
    }
}
