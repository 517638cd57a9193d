//! Skeletal animation core for Sinew
//!
//! Keyframe tracks are sampled per bone, composed down a node hierarchy and
//! written into a fixed-size array of skinning matrices:
//! - [`track`]: keyframe sampling (lerp for vectors, slerp for rotations)
//! - [`skeleton`] and [`hierarchy`]: bones, offsets and top-down evaluation
//! - [`clip`] and [`player`]: clips and the play/pause/stop state machine
//! - [`influence`]: up to four weighted bones per vertex
//! - [`model`] and [`system`]: per-instance playback for a host renderer
//! - [`loader`]: TOML rig files

pub mod bone;
pub mod clip;
pub mod config;
pub mod hierarchy;
pub mod influence;
pub mod loader;
pub mod model;
pub mod player;
pub mod skeleton;
pub mod system;
pub mod track;

pub use bone::{Bone, BoneTracks};
pub use clip::{AnimationClip, DEFAULT_TICKS_PER_SECOND};
pub use config::PlaybackConfig;
pub use hierarchy::{FlatNode, HierarchyNode};
pub use influence::{collect_influences, VertexBoneInfluence, MAX_INFLUENCES};
pub use loader::{load_rig_from_file, load_rig_from_str, RigAsset, MAX_VERTICES};
pub use model::AnimatedModel;
pub use player::{AnimationPlayer, PlaybackState};
pub use skeleton::{Skeleton, MAX_BONES};
pub use system::AnimationSystem;
pub use track::{Interpolate, KeyframeSample, KeyframeTrack};
