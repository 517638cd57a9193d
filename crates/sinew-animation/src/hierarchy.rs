//! Bone hierarchy (skeleton node tree) and top-down transform propagation
//!
//! Each clip owns a snapshot of the source scene graph as a tree of
//! `HierarchyNode`s. Children are owned by their parent, so the tree cannot
//! contain cycles or shared nodes once built; `from_flat` enforces this when
//! converting an index-linked node list.

use crate::bone::BoneTracks;
use crate::skeleton::Skeleton;
use glam::Mat4;
use sinew_core::{Result, SinewError};

/// A node in the skeleton hierarchy.
///
/// `bone_index` is `None` for purely structural nodes (armature roots,
/// mesh nodes) which contribute only their static bind transform.
#[derive(Debug, Clone, PartialEq)]
pub struct HierarchyNode {
    pub name: String,
    pub bone_index: Option<usize>,
    pub local_bind_transform: Mat4,
    pub children: Vec<HierarchyNode>,
}

/// An index-linked node, as produced by scene-graph importers.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatNode {
    pub name: String,
    pub transform: Mat4,
    /// Indices into the same node list
    pub children: Vec<usize>,
}

impl HierarchyNode {
    pub fn new(name: impl Into<String>, local_bind_transform: Mat4) -> Self {
        Self {
            name: name.into(),
            bone_index: None,
            local_bind_transform,
            children: Vec::new(),
        }
    }

    pub fn with_bone(mut self, bone_index: usize) -> Self {
        self.bone_index = Some(bone_index);
        self
    }

    pub fn with_child(mut self, child: HierarchyNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn add_child(&mut self, child: HierarchyNode) {
        self.children.push(child);
    }

    /// Build an owned tree from `nodes`, starting at `root`.
    ///
    /// Fails if a child index is out of range or if any node is reachable
    /// twice (a cycle or a child shared between parents).
    pub fn from_flat(nodes: &[FlatNode], root: usize) -> Result<Self> {
        let mut visited = vec![false; nodes.len()];
        Self::build_flat(nodes, root, &mut visited)
    }

    fn build_flat(nodes: &[FlatNode], index: usize, visited: &mut [bool]) -> Result<Self> {
        let flat = nodes.get(index).ok_or_else(|| {
            SinewError::InvalidHierarchy(format!(
                "node index {} out of range ({} nodes)",
                index,
                nodes.len()
            ))
        })?;

        if visited[index] {
            return Err(SinewError::InvalidHierarchy(format!(
                "node '{}' is reachable more than once (cycle or shared child)",
                flat.name
            )));
        }
        visited[index] = true;

        let mut node = HierarchyNode::new(flat.name.clone(), flat.transform);
        for &child in &flat.children {
            node.children.push(Self::build_flat(nodes, child, visited)?);
        }
        Ok(node)
    }

    /// Assign `bone_index` on every node by name; unmatched names become
    /// structural nodes.
    pub fn resolve_bone_indices(&mut self, skeleton: &Skeleton) {
        self.bone_index = skeleton.bone_index(&self.name);
        for child in &mut self.children {
            child.resolve_bone_indices(skeleton);
        }
    }

    /// Check that every referenced bone exists and appears only once.
    pub fn validate(&self, bone_count: usize) -> Result<()> {
        let mut seen = vec![false; bone_count];
        for (_, node) in self.iter() {
            let Some(index) = node.bone_index else {
                continue;
            };
            if index >= bone_count {
                return Err(SinewError::InvalidHierarchy(format!(
                    "node '{}' references bone {} but the skeleton has {} bones",
                    node.name, index, bone_count
                )));
            }
            if seen[index] {
                return Err(SinewError::InvalidHierarchy(format!(
                    "bone {} is referenced by more than one node (again at '{}')",
                    index, node.name
                )));
            }
            seen[index] = true;
        }
        Ok(())
    }

    /// Depth-first search by node name
    pub fn find(&self, name: &str) -> Option<&HierarchyNode> {
        self.iter().map(|(_, node)| node).find(|node| node.name == name)
    }

    pub fn node_count(&self) -> usize {
        self.iter().count()
    }

    /// Number of levels; a lone root has depth 1
    pub fn depth(&self) -> usize {
        1 + self.children.iter().map(|c| c.depth()).max().unwrap_or(0)
    }

    /// Bone indices in traversal order
    pub fn bone_indices(&self) -> Vec<usize> {
        self.iter().filter_map(|(_, node)| node.bone_index).collect()
    }

    /// Pre-order traversal yielding `(depth, node)`, children in stored order.
    pub fn iter(&self) -> Preorder<'_> {
        Preorder {
            stack: vec![(0, self)],
        }
    }
}

/// Pre-order iterator over a hierarchy
pub struct Preorder<'a> {
    stack: Vec<(usize, &'a HierarchyNode)>,
}

impl<'a> Iterator for Preorder<'a> {
    type Item = (usize, &'a HierarchyNode);

    fn next(&mut self) -> Option<Self::Item> {
        let (depth, node) = self.stack.pop()?;
        self.stack
            .extend(node.children.iter().rev().map(|child| (depth + 1, child)));
        Some((depth, node))
    }
}

/// Propagate transforms from `root` down and refresh the skeleton's
/// skinning matrices for every bone referenced by the tree.
///
/// `tracks` is indexed by bone id. A bone with no entry, or with no
/// keyframes in any channel, uses the node's `local_bind_transform` like a
/// structural node. The tree must have passed `validate` for this skeleton.
pub fn evaluate(root: &HierarchyNode, tracks: &[BoneTracks], time: f64, skeleton: &mut Skeleton) {
    evaluate_node(root, &Mat4::IDENTITY, tracks, time, skeleton);
}

fn evaluate_node(
    node: &HierarchyNode,
    parent_global: &Mat4,
    tracks: &[BoneTracks],
    time: f64,
    skeleton: &mut Skeleton,
) {
    // Bones this clip does not animate hold their bind transform
    let local = match node.bone_index.and_then(|i| tracks.get(i)) {
        Some(t) if !t.is_empty() => t.local_transform_at(time),
        _ => node.local_bind_transform,
    };

    let global = *parent_global * local;

    if let Some(i) = node.bone_index {
        skeleton.set_final_matrix(i, global);
    }

    for child in &node.children {
        evaluate_node(child, &global, tracks, time, skeleton);
    }
}
