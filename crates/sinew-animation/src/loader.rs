//! TOML-based rig loading
//!
//! A rig file carries everything one animated model needs: bones with their
//! offset matrices, the node hierarchy, clips with per-bone keyframes,
//! vertex influences and playback defaults.

use crate::bone::{Bone, BoneTracks};
use crate::clip::{AnimationClip, DEFAULT_TICKS_PER_SECOND};
use crate::config::PlaybackConfig;
use crate::hierarchy::{FlatNode, HierarchyNode};
use crate::influence::{collect_influences, VertexBoneInfluence};
use crate::model::AnimatedModel;
use crate::skeleton::Skeleton;
use crate::track::{KeyframeSample, KeyframeTrack};
use glam::{Mat4, Vec3};
use serde::Deserialize;
use sinew_core::{Result, SinewError, Transform};
use std::collections::HashMap;
use std::path::Path;

/// Everything parsed from one rig file.
#[derive(Debug, Clone)]
pub struct RigAsset {
    pub name: String,
    pub skeleton: Skeleton,
    pub clips: Vec<AnimationClip>,
    /// One normalized entry per vertex
    pub influences: Vec<VertexBoneInfluence>,
    pub playback: PlaybackConfig,
}

impl RigAsset {
    /// Build a fresh model instance from this rig. The asset itself is left
    /// untouched so it can spawn several instances.
    pub fn instantiate(&self) -> Result<AnimatedModel> {
        AnimatedModel::new(self.skeleton.clone(), self.clips.clone(), &self.playback)
    }

    pub fn clip(&self, name: &str) -> Option<&AnimationClip> {
        self.clips.iter().find(|c| c.name() == name)
    }
}

/// Load a rig from a `.rig.toml` file.
///
/// ```toml
/// name = "walker"
///
/// [[bones]]
/// name = "Hips"
///
/// [[nodes]]
/// name = "Hips"
///
/// [[clips]]
/// name = "walk"
///
/// [[clips.channels]]
/// bone = "Hips"
/// positions = [{ time = 0.0, value = [0.0, 0.0, 0.0] }]
/// ```
pub fn load_rig_from_file(path: &Path) -> Result<RigAsset> {
    let content = std::fs::read_to_string(path)?;
    load_rig_from_str(&content, path)
}

/// Parse a rig from a TOML string. `path` is only used in messages.
pub fn load_rig_from_str(content: &str, path: &Path) -> Result<RigAsset> {
    let file: RigFile = toml::from_str(content).map_err(|e| {
        SinewError::TomlParseError(format!("Failed to parse {}: {}", path.display(), e))
    })?;

    let skeleton = build_skeleton(&file.bones)?;
    let nodes = build_nodes(&file)?;
    let clips = file
        .clips
        .iter()
        .map(|def| build_clip(def, &nodes, &skeleton))
        .collect::<Result<Vec<_>>>()?;
    let influences = build_influences(&file, &skeleton)?;

    if let Some(name) = &file.playback.clip {
        if !clips.iter().any(|c| c.name() == name) {
            return Err(SinewError::ClipNotFound(format!(
                "{} (named by [playback] in {})",
                name,
                path.display()
            )));
        }
    }

    if skeleton.bone_count() == 0 {
        log::warn!("Rig '{}' has no bones", file.name);
    }
    log::info!(
        "Loaded rig '{}' from {} ({} bones, {} clips, {} vertices)",
        file.name,
        path.display(),
        skeleton.bone_count(),
        clips.len(),
        influences.len()
    );

    Ok(RigAsset {
        name: file.name,
        skeleton,
        clips,
        influences,
        playback: file.playback,
    })
}

#[derive(Debug, Deserialize)]
struct RigFile {
    name: String,
    #[serde(default)]
    playback: PlaybackConfig,
    #[serde(default)]
    bones: Vec<BoneDef>,
    #[serde(default)]
    nodes: Vec<NodeDef>,
    #[serde(default)]
    clips: Vec<ClipDef>,
    /// Exact vertex count; influences must name vertices below it
    #[serde(default)]
    vertex_count: Option<usize>,
    #[serde(default)]
    influences: Vec<InfluenceDef>,
}

#[derive(Debug, Deserialize)]
struct BoneDef {
    name: String,
    /// Column-major inverse bind matrix
    #[serde(default)]
    offset: Option<[[f32; 4]; 4]>,
}

#[derive(Debug, Deserialize)]
struct NodeDef {
    name: String,
    #[serde(default)]
    children: Vec<String>,
    #[serde(default)]
    translation: Option<[f32; 3]>,
    #[serde(default)]
    rotation: Option<[f32; 4]>,
    #[serde(default)]
    scale: Option<[f32; 3]>,
}

#[derive(Debug, Deserialize)]
struct ClipDef {
    name: String,
    #[serde(default)]
    ticks_per_second: Option<f64>,
    #[serde(default)]
    root: Option<String>,
    #[serde(default)]
    channels: Vec<ChannelDef>,
}

#[derive(Debug, Deserialize)]
struct ChannelDef {
    bone: String,
    #[serde(default)]
    positions: Vec<KeyDef<[f32; 3]>>,
    #[serde(default)]
    rotations: Vec<KeyDef<[f32; 4]>>,
    #[serde(default)]
    scales: Vec<KeyDef<[f32; 3]>>,
}

#[derive(Debug, Deserialize)]
struct KeyDef<T> {
    time: f64,
    value: T,
}

#[derive(Debug, Deserialize)]
struct InfluenceDef {
    vertex: usize,
    bone: String,
    weight: f32,
}

fn build_skeleton(bones: &[BoneDef]) -> Result<Skeleton> {
    let bones = bones
        .iter()
        .enumerate()
        .map(|(id, def)| {
            let offset = def
                .offset
                .map(|cols| Mat4::from_cols_array_2d(&cols))
                .unwrap_or(Mat4::IDENTITY);
            Bone::new(def.name.clone(), id, offset)
        })
        .collect();
    Skeleton::from_bones(bones)
}

/// Resolve the flat node list. A rig without nodes gets a synthetic root
/// named after the rig with every bone as a direct child.
fn build_nodes(file: &RigFile) -> Result<Vec<FlatNode>> {
    if file.nodes.is_empty() {
        let mut nodes = vec![FlatNode {
            name: file.name.clone(),
            transform: Mat4::IDENTITY,
            children: (1..=file.bones.len()).collect(),
        }];
        nodes.extend(file.bones.iter().map(|b| FlatNode {
            name: b.name.clone(),
            transform: Mat4::IDENTITY,
            children: Vec::new(),
        }));
        return Ok(nodes);
    }

    let mut index = HashMap::new();
    for (i, node) in file.nodes.iter().enumerate() {
        if index.insert(node.name.as_str(), i).is_some() {
            return Err(SinewError::InvalidHierarchy(format!(
                "duplicate node name '{}'",
                node.name
            )));
        }
    }

    file.nodes
        .iter()
        .map(|node| {
            let children = node
                .children
                .iter()
                .map(|child| {
                    index.get(child.as_str()).copied().ok_or_else(|| {
                        SinewError::InvalidHierarchy(format!(
                            "node '{}' lists unknown child '{}'",
                            node.name, child
                        ))
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            let transform = Transform::from_arrays(
                node.translation.unwrap_or([0.0; 3]),
                node.rotation.unwrap_or([0.0, 0.0, 0.0, 1.0]),
                node.scale.unwrap_or([1.0; 3]),
            );
            Ok(FlatNode {
                name: node.name.clone(),
                transform: transform.to_matrix(),
                children,
            })
        })
        .collect()
}

fn build_clip(def: &ClipDef, nodes: &[FlatNode], skeleton: &Skeleton) -> Result<AnimationClip> {
    let root_index = match &def.root {
        Some(name) => nodes.iter().position(|n| &n.name == name).ok_or_else(|| {
            SinewError::InvalidClip(format!("Clip '{}' has unknown root '{}'", def.name, name))
        })?,
        None => 0,
    };
    let mut root = HierarchyNode::from_flat(nodes, root_index)?;
    root.resolve_bone_indices(skeleton);

    let mut tracks = vec![BoneTracks::default(); skeleton.bone_count()];
    let mut seen = vec![false; skeleton.bone_count()];
    for channel in &def.channels {
        let id = skeleton.bone_index(&channel.bone).ok_or_else(|| {
            SinewError::BoneNotFound(format!("{} (channel in clip '{}')", channel.bone, def.name))
        })?;
        if seen[id] {
            return Err(SinewError::InvalidClip(format!(
                "Clip '{}' has more than one channel for bone '{}'",
                def.name, channel.bone
            )));
        }
        seen[id] = true;

        tracks[id] = BoneTracks::new(
            KeyframeTrack::positions(keys(&def.name, &channel.positions, |v| Vec3::from_array(*v))?),
            KeyframeTrack::rotations(keys(&def.name, &channel.rotations, |v| {
                Transform::from_arrays([0.0; 3], *v, [1.0; 3]).rotation
            })?),
            KeyframeTrack::scales(keys(&def.name, &channel.scales, |v| Vec3::from_array(*v))?),
        );
    }

    AnimationClip::new(
        def.name.clone(),
        def.ticks_per_second.unwrap_or(DEFAULT_TICKS_PER_SECOND),
        root,
        tracks,
    )
}

/// Convert keyframes, rejecting timestamps that go backwards.
fn keys<A, T>(clip: &str, defs: &[KeyDef<A>], convert: impl Fn(&A) -> T) -> Result<Vec<KeyframeSample<T>>> {
    let mut out = Vec::with_capacity(defs.len());
    let mut last = f64::NEG_INFINITY;
    for key in defs {
        if !key.time.is_finite() || key.time < last {
            return Err(SinewError::InvalidClip(format!(
                "Clip '{}' has keyframe time {} after {}",
                clip, key.time, last
            )));
        }
        last = key.time;
        out.push(KeyframeSample::new(key.time, convert(&key.value)));
    }
    Ok(out)
}

/// Largest vertex count a rig may declare or imply through its influences
pub const MAX_VERTICES: usize = 1 << 24;

fn build_influences(file: &RigFile, skeleton: &Skeleton) -> Result<Vec<VertexBoneInfluence>> {
    if let Some(count) = file.vertex_count {
        if count > MAX_VERTICES {
            return Err(SinewError::ParseError(format!(
                "vertex_count {} exceeds the limit of {}",
                count, MAX_VERTICES
            )));
        }
    }
    let limit = file.vertex_count.unwrap_or(MAX_VERTICES);

    let triples = file
        .influences
        .iter()
        .map(|inf| {
            if inf.vertex >= limit {
                return Err(SinewError::ParseError(format!(
                    "influence vertex {} is out of range (vertex_count {})",
                    inf.vertex, limit
                )));
            }
            if !(inf.weight.is_finite() && inf.weight >= 0.0) {
                return Err(SinewError::ParseError(format!(
                    "influence on vertex {} has invalid weight {}",
                    inf.vertex, inf.weight
                )));
            }
            let id = skeleton.bone_index(&inf.bone).ok_or_else(|| {
                SinewError::BoneNotFound(format!("{} (influence on vertex {})", inf.bone, inf.vertex))
            })?;
            // MAX_BONES keeps ids well inside i32
            Ok((inf.vertex, id as i32, inf.weight))
        })
        .collect::<Result<Vec<_>>>()?;

    let highest = triples.iter().map(|&(v, _, _)| v + 1).max().unwrap_or(0);
    let vertex_count = file.vertex_count.unwrap_or(highest);
    Ok(collect_influences(vertex_count, triples))
}
