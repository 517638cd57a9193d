//! Fixed-step playback simulation command

use super::load_model;
use anyhow::Result;

pub struct PlayArgs {
    pub rig: String,
    pub clip: Option<String>,
    pub seconds: f64,
    pub fps: f64,
    pub speed: Option<f64>,
    pub no_loop: bool,
}

pub fn run(args: PlayArgs) -> Result<()> {
    if !(args.fps.is_finite() && args.fps > 0.0) {
        anyhow::bail!("--fps must be a positive number, got {}", args.fps);
    }
    if !(args.seconds.is_finite() && args.seconds >= 0.0) {
        anyhow::bail!("--seconds must be non-negative, got {}", args.seconds);
    }

    let (_rig, mut model) = load_model(&args.rig, args.clip.as_deref())?;
    if !model.has_animations() {
        println!("Rig has no clips; nothing to play.");
        return Ok(());
    }

    {
        let player = model.player_mut();
        if let Some(speed) = args.speed {
            player.set_speed(speed);
        }
        if args.no_loop {
            player.set_looping(false);
        }
    }
    model.play();

    let player = model.player();
    println!(
        "Playing '{}' ({:.3}s, speed {}, {})",
        player.current_clip_name().unwrap_or("<none>"),
        player.duration_seconds(),
        player.speed(),
        if player.looping() { "looping" } else { "once" }
    );

    let dt = 1.0 / args.fps;
    let frames = (args.seconds * args.fps).ceil() as usize;
    log::info!("Simulating {} frame(s) at {} fps", frames, args.fps);
    for frame in 1..=frames {
        model.update(dt);
        let player = model.player();
        println!(
            "frame {:>5}  t={:>8.3}s  ticks={:>9.3}  progress={:.3}  {:?}",
            frame,
            frame as f64 * dt,
            player.time_ticks(),
            player.progress(),
            player.state()
        );
        if !player.is_playing() {
            println!("Clip finished after {} frame(s)", frame);
            break;
        }
    }

    Ok(())
}
