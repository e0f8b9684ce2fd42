use std::{
    cell::RefCell,
    io::{BufWriter, Write as _},
    path::{Path, PathBuf},
    rc::Rc,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "fluxstage", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate a scene configuration and list what it declares.
    Validate(ValidateArgs),
    /// Play one transition script headlessly, printing target properties per frame.
    Play(PlayArgs),
    /// Sample the noise field at one point.
    Noise(NoiseArgs),
}

#[derive(Parser, Debug)]
struct ValidateArgs {
    /// Scene configuration JSON.
    #[arg(long)]
    config: PathBuf,
}

#[derive(Parser, Debug)]
struct PlayArgs {
    /// Scene configuration JSON.
    #[arg(long)]
    config: PathBuf,

    /// Name of the transition script to play.
    #[arg(long)]
    script: String,

    /// Simulated frames per second.
    #[arg(long, default_value_t = 60.0)]
    fps: f64,

    /// Stop after this many frames even if the transition is still running.
    #[arg(long, default_value_t = 100_000)]
    max_frames: u64,
}

#[derive(Parser, Debug)]
struct NoiseArgs {
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    x: f32,
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    y: f32,
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    z: f32,
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    t: f32,

    /// Permutation seed; the built-in seed when omitted.
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Validate(args) => cmd_validate(args),
        Command::Play(args) => cmd_play(args),
        Command::Noise(args) => cmd_noise(args),
    }
}

fn read_scene_config(path: &Path) -> anyhow::Result<fluxstage::SceneConfig> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("read scene config '{}'", path.display()))?;
    fluxstage::SceneConfig::from_json(&json)
        .with_context(|| format!("load scene config '{}'", path.display()))
}

fn cmd_validate(args: ValidateArgs) -> anyhow::Result<()> {
    let config = read_scene_config(&args.config)?;
    let scene = fluxstage::Scene::from_config(&config)?;

    for slot in scene.surfaces() {
        println!(
            "surface {} ({} vertices)",
            slot.name(),
            slot.surface().mesh().vertex_count()
        );
    }
    for slot in scene.morphs() {
        println!(
            "morph {} ({} shapes, {} slots)",
            slot.name(),
            slot.morph().meshes().len(),
            slot.vertices().len()
        );
    }
    for name in scene.controller().script_names() {
        let duration = scene
            .controller()
            .script(name)
            .map(|s| s.duration())
            .transpose()?
            .unwrap_or_default();
        println!("script {name} ({duration:.3}s)");
    }
    println!("ok");
    Ok(())
}

#[derive(serde::Serialize)]
struct FrameLine<'a> {
    frame: u64,
    time: f64,
    targets: &'a std::collections::BTreeMap<String, std::collections::BTreeMap<String, f64>>,
    events: &'a [String],
}

fn cmd_play(args: PlayArgs) -> anyhow::Result<()> {
    if !(args.fps.is_finite() && args.fps > 0.0) {
        anyhow::bail!("--fps must be finite and > 0");
    }
    let config = read_scene_config(&args.config)?;
    let mut scene = fluxstage::Scene::from_config(&config)?;

    let seen = Rc::new(RefCell::new(Vec::<String>::new()));
    let sink = Rc::clone(&seen);
    scene
        .events_mut()
        .on_any(move |e| sink.borrow_mut().push(e.name().to_owned()));

    let handle = scene
        .play(&args.script, fluxstage::PlayCallbacks::new())
        .with_context(|| format!("play script '{}'", args.script))?;

    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let camera = fluxstage::Vec3::new(0.0, 0.0, 5.0);

    let mut index = 0u64;
    while scene.controller().status(handle) == Some(fluxstage::TransitionStatus::Running) {
        if index >= args.max_frames {
            tracing::warn!(frames = index, "frame limit reached; completing early");
            scene.complete_now(handle)?;
            break;
        }
        index += 1;
        let time = index as f64 / args.fps;
        scene.frame(fluxstage::FrameInput {
            elapsed: time,
            camera,
        });
        let events = std::mem::take(&mut *seen.borrow_mut());
        let line = FrameLine {
            frame: index,
            time,
            targets: &scene.targets().snapshot(),
            events: &events,
        };
        serde_json::to_writer(&mut out, &line)?;
        writeln!(out)?;
    }

    for report in scene.drain_reports() {
        serde_json::to_writer(&mut out, &serde_json::json!({ "report": report }))?;
        writeln!(out)?;
    }
    out.flush()?;
    Ok(())
}

fn cmd_noise(args: NoiseArgs) -> anyhow::Result<()> {
    let field = args
        .seed
        .map(fluxstage::NoiseField::new)
        .unwrap_or_default();
    let value = field.evaluate(fluxstage::Vec3::new(args.x, args.y, args.z), args.t);
    println!("{value}");
    Ok(())
}
