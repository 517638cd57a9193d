//! CLI command implementations

pub mod inspect;
pub mod play;
pub mod sample;

use anyhow::{Context, Result};
use sinew_animation::{load_rig_from_file, AnimatedModel, RigAsset};
use std::path::Path;

/// Load a rig and build a model with `clip` selected, if given.
pub(crate) fn load_model(rig_path: &str, clip: Option<&str>) -> Result<(RigAsset, AnimatedModel)> {
    let rig = load_rig_from_file(Path::new(rig_path))
        .with_context(|| format!("Failed to load rig {}", rig_path))?;
    let mut model = rig.instantiate().context("Failed to instantiate rig")?;

    if let Some(name) = clip {
        model
            .set_clip_by_name(name)
            .with_context(|| format!("Rig '{}' has no clip named '{}'", rig.name, name))?;
    }

    Ok((rig, model))
}
