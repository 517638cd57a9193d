//! Single-pose sampling command

use super::load_model;
use anyhow::Result;
use serde::Serialize;
use sinew_core::Transform;

pub struct SampleArgs {
    pub rig: String,
    pub clip: Option<String>,
    pub progress: Option<f64>,
    pub time: Option<f64>,
    pub format: String,
}

#[derive(Serialize)]
struct PoseReport<'a> {
    clip: Option<&'a str>,
    progress: f64,
    time_ticks: f64,
    bones: Vec<BoneReport<'a>>,
}

#[derive(Serialize)]
struct BoneReport<'a> {
    id: usize,
    name: &'a str,
    /// Column-major
    matrix: [f32; 16],
}

pub fn run(args: SampleArgs) -> Result<()> {
    let (rig, mut model) = load_model(&args.rig, args.clip.as_deref())?;

    let progress = match (args.progress, args.time) {
        (Some(p), _) => p,
        (None, Some(seconds)) => {
            let duration = model.player().duration_seconds();
            if duration > 0.0 {
                seconds / duration
            } else {
                0.0
            }
        }
        (None, None) => anyhow::bail!("Either --progress or --time is required"),
    };
    model.set_progress(progress);

    let player = model.player();
    let report = PoseReport {
        clip: player.current_clip_name(),
        progress: player.progress(),
        time_ticks: player.time_ticks(),
        bones: rig
            .skeleton
            .bones()
            .iter()
            .zip(model.bone_matrices())
            .map(|(bone, m)| BoneReport {
                id: bone.id,
                name: &bone.name,
                matrix: m.to_cols_array(),
            })
            .collect(),
    };

    match args.format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&report)?),
        "text" => print_text(&report, model.bone_matrices()),
        _ => anyhow::bail!("Unknown format: {}", args.format),
    }

    Ok(())
}

fn print_text(report: &PoseReport<'_>, matrices: &[glam::Mat4]) {
    println!(
        "Clip: {}  progress {:.3}  ({:.2} ticks)",
        report.clip.unwrap_or("<none>"),
        report.progress,
        report.time_ticks
    );
    for (bone, m) in report.bones.iter().zip(matrices) {
        println!();
        println!("[{:>3}] {}", bone.id, bone.name);
        for r in 0..4 {
            let row = m.row(r);
            println!(
                "  {:>9.4} {:>9.4} {:>9.4} {:>9.4}",
                row.x, row.y, row.z, row.w
            );
        }
        let t = Transform::from_matrix(m);
        let (axis, angle) = t.rotation.to_axis_angle();
        println!(
            "  T {:.4?}  R {:.2} deg about {:.3?}  S {:.4?}",
            t.translation.to_array(),
            angle.to_degrees(),
            axis.to_array(),
            t.scale.to_array()
        );
    }
}
