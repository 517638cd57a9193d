//! Rig introspection command

use anyhow::{Context, Result};
use sinew_animation::load_rig_from_file;
use std::path::Path;

pub fn run(rig_path: &str) -> Result<()> {
    let rig = load_rig_from_file(Path::new(rig_path))
        .with_context(|| format!("Failed to load rig {}", rig_path))?;

    println!("Rig: {}", rig.name);
    println!();

    println!("Bones ({}):", rig.skeleton.bone_count());
    for bone in rig.skeleton.bones() {
        println!("  [{:>3}] {}", bone.id, bone.name);
    }

    if let Some(clip) = rig.clips.first() {
        let root = clip.root();
        println!();
        println!("Hierarchy ({} nodes, depth {}):", root.node_count(), root.depth());
        for (depth, node) in root.iter() {
            let marker = match node.bone_index {
                Some(id) => format!(" (bone {})", id),
                None => String::new(),
            };
            println!("  {}{}{}", "  ".repeat(depth), node.name, marker);
        }
    }

    println!();
    println!("Clips ({}):", rig.clips.len());
    for clip in &rig.clips {
        let animated = clip.tracks().iter().filter(|t| !t.is_empty()).count();
        println!(
            "  {} : {:.2} ticks @ {} tps = {:.3}s, {} animated bone(s)",
            clip.name(),
            clip.duration_ticks(),
            clip.ticks_per_second(),
            clip.duration_seconds(),
            animated
        );
    }

    let weighted = rig.influences.iter().filter(|i| !i.is_empty()).count();
    println!();
    println!(
        "Influences: {} vertices ({} weighted)",
        rig.influences.len(),
        weighted
    );

    let playback = &rig.playback;
    println!(
        "Playback: clip={} speed={} loop={} autoplay={}",
        playback.clip.as_deref().unwrap_or("<first>"),
        playback.speed,
        playback.looping,
        playback.autoplay
    );

    Ok(())
}
