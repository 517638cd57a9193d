//! Per-vertex bone influences (up to four weighted bones per vertex)

use glam::Mat4;

/// Influence slots per vertex; matches the shader's `ivec4`/`vec4` attributes.
pub const MAX_INFLUENCES: usize = 4;

/// Bone ids and weights skinning one vertex.
///
/// Unused slots hold id `-1` and weight `0`. Influences are added one at a
/// time with [`add`](Self::add); once every influence for the vertex is in,
/// call [`normalize`](Self::normalize) exactly once. Normalizing early
/// rescales the retained weights and skews which later influences win a
/// slot, so [`collect_influences`] is the preferred way to build these.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexBoneInfluence {
    pub bone_ids: [i32; MAX_INFLUENCES],
    pub weights: [f32; MAX_INFLUENCES],
}

impl Default for VertexBoneInfluence {
    fn default() -> Self {
        Self {
            bone_ids: [-1; MAX_INFLUENCES],
            weights: [0.0; MAX_INFLUENCES],
        }
    }
}

impl VertexBoneInfluence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one influence.
    ///
    /// Fills the first empty (zero-weight) slot. When all four slots are
    /// taken, the smallest weight is replaced only if `weight` beats it;
    /// otherwise the influence is dropped.
    pub fn add(&mut self, bone_id: i32, weight: f32) {
        if let Some(slot) = self.weights.iter().position(|&w| w == 0.0) {
            self.bone_ids[slot] = bone_id;
            self.weights[slot] = weight;
            return;
        }

        let mut min_slot = 0;
        for i in 1..MAX_INFLUENCES {
            if self.weights[i] < self.weights[min_slot] {
                min_slot = i;
            }
        }

        if weight > self.weights[min_slot] {
            self.bone_ids[min_slot] = bone_id;
            self.weights[min_slot] = weight;
        }
    }

    /// Scale weights to sum to 1. A vertex with no weight stays all-zero
    /// (rigid, follows the bind pose).
    pub fn normalize(&mut self) {
        let sum = self.weight_sum();
        if sum > 0.0 {
            let inv = 1.0 / sum;
            for w in &mut self.weights {
                *w *= inv;
            }
        }
    }

    pub fn weight_sum(&self) -> f32 {
        self.weights.iter().sum()
    }

    /// True when no slot carries weight
    pub fn is_empty(&self) -> bool {
        self.weights.iter().all(|&w| w == 0.0)
    }

    /// Occupied `(bone_id, weight)` slots
    pub fn influences(&self) -> impl Iterator<Item = (i32, f32)> + '_ {
        self.bone_ids
            .iter()
            .zip(self.weights.iter())
            .filter(|&(_, &w)| w != 0.0)
            .map(|(&id, &w)| (id, w))
    }

    /// Weighted sum of skinning matrices, as the vertex shader computes it.
    ///
    /// Vertices without influence, or whose bones fall outside `matrices`,
    /// get identity for the missing share.
    pub fn skinning_matrix(&self, matrices: &[Mat4]) -> Mat4 {
        if self.is_empty() {
            return Mat4::IDENTITY;
        }

        let mut out = Mat4::ZERO;
        let mut covered = 0.0;
        for (id, w) in self.influences() {
            let Some(m) = usize::try_from(id).ok().and_then(|i| matrices.get(i)) else {
                continue;
            };
            out += *m * w;
            covered += w;
        }

        let remainder = self.weight_sum() - covered;
        if remainder != 0.0 {
            out += Mat4::IDENTITY * remainder;
        }
        out
    }
}

/// Build normalized influences for `vertex_count` vertices from
/// `(vertex, bone_id, weight)` triples.
///
/// Every triple is added before any vertex is normalized. Triples naming a
/// vertex past `vertex_count` are ignored.
pub fn collect_influences<I>(vertex_count: usize, triples: I) -> Vec<VertexBoneInfluence>
where
    I: IntoIterator<Item = (usize, i32, f32)>,
{
    let mut out = vec![VertexBoneInfluence::default(); vertex_count];
    for (vertex, bone_id, weight) in triples {
        if let Some(influence) = out.get_mut(vertex) {
            influence.add(bone_id, weight);
        }
    }
    for influence in &mut out {
        influence.normalize();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn sum_is_valid(inf: &VertexBoneInfluence) -> bool {
        let s = inf.weight_sum();
        s == 0.0 || (0.999..=1.001).contains(&s)
    }

    #[test]
    fn defaults_are_empty_slots() {
        let inf = VertexBoneInfluence::new();
        assert_eq!(inf.bone_ids, [-1; 4]);
        assert_eq!(inf.weights, [0.0; 4]);
        assert!(inf.is_empty());
    }

    #[test]
    fn fills_free_slots_in_order() {
        let mut inf = VertexBoneInfluence::new();
        inf.add(7, 0.5);
        inf.add(3, 0.25);
        assert_eq!(inf.bone_ids, [7, 3, -1, -1]);
        assert_eq!(inf.weights, [0.5, 0.25, 0.0, 0.0]);
    }

    #[test]
    fn fifth_influence_replaces_smallest() {
        let mut inf = VertexBoneInfluence::new();
        inf.add(1, 0.1);
        inf.add(2, 0.2);
        inf.add(3, 0.3);
        inf.add(4, 0.4);
        inf.add(5, 0.5);
        inf.normalize();

        let mut ids = inf.bone_ids;
        ids.sort();
        assert_eq!(ids, [2, 3, 4, 5]);
        assert!((inf.weight_sum() - 1.0).abs() < 1e-5);
        // 0.2 / 1.4
        let slot = inf.bone_ids.iter().position(|&id| id == 2).unwrap();
        assert!((inf.weights[slot] - 0.2 / 1.4).abs() < 1e-5);
    }

    #[test]
    fn weaker_influence_is_dropped() {
        let mut inf = VertexBoneInfluence::new();
        for (id, w) in [(1, 0.4), (2, 0.3), (3, 0.2), (4, 0.1)] {
            inf.add(id, w);
        }
        inf.add(9, 0.05);
        assert!(!inf.bone_ids.contains(&9));
        assert!((inf.weight_sum() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn normalize_leaves_empty_vertex_alone() {
        let mut inf = VertexBoneInfluence::new();
        inf.normalize();
        assert_eq!(inf.weights, [0.0; 4]);
        assert!(sum_is_valid(&inf));
    }

    #[test]
    fn collected_influences_are_normalized() {
        let triples = vec![
            (0, 0, 2.0),
            (0, 1, 2.0),
            (1, 1, 0.3),
            (2, 0, 0.1),
            (2, 1, 0.2),
            (2, 2, 0.3),
            (2, 3, 0.4),
            (2, 4, 0.5),
            (9, 0, 1.0), // out of range, ignored
        ];
        let infs = collect_influences(4, triples);
        assert_eq!(infs.len(), 4);
        for inf in &infs {
            assert!(sum_is_valid(inf), "sum {}", inf.weight_sum());
        }
        assert!((infs[0].weights[0] - 0.5).abs() < 1e-6);
        assert!((infs[1].weights[0] - 1.0).abs() < 1e-6);
        assert!(infs[3].is_empty());
    }

    #[test]
    fn skinning_matrix_blends_bones() {
        let mats = [
            Mat4::from_translation(Vec3::new(2.0, 0.0, 0.0)),
            Mat4::from_translation(Vec3::new(0.0, 4.0, 0.0)),
        ];
        let mut inf = VertexBoneInfluence::new();
        inf.add(0, 0.5);
        inf.add(1, 0.5);
        inf.normalize();

        let p = inf.skinning_matrix(&mats).transform_point3(Vec3::ZERO);
        assert!((p - Vec3::new(1.0, 2.0, 0.0)).length() < 1e-5);

        assert_eq!(VertexBoneInfluence::new().skinning_matrix(&mats), Mat4::IDENTITY);
    }
}
