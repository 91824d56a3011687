use std::{
    error::Error,
    fs,
    path::PathBuf,
    thread,
    time::Duration,
};

use clap::Parser;
use log::{debug, error, info};
use siteview::{
    config::EngineConfig,
    focus::FocusEvent,
    label::{LabelHandle, LabelProvider, LabelRequest},
    node::NodeKind,
    picker::SurfaceRect,
    Engine, EngineHandle,
};
use siteview_asset::loader::json;

/// Drive a site scene headless and log what a renderer would draw.
#[derive(Parser, Debug)]
#[command(name = "siteview", version, about)]
struct Args {
    /// Site model as JSON
    #[arg(long, value_name = "PATH")]
    site: PathBuf,

    /// Engine configuration as JSON, missing fields use defaults
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    #[arg(long, default_value = "1280")]
    width: f32,

    #[arg(long, default_value = "720")]
    height: f32,

    /// Number of frames to simulate
    #[arg(long, default_value = "120")]
    frames: u32,

    #[arg(long, default_value = "16")]
    frame_ms: u64,

    /// Click at client coordinates on a given frame, as FRAME:X,Y
    #[arg(long, value_parser = parse_click)]
    click: Vec<Click>,

    /// Focus a building by id before the first frame
    #[arg(long, value_name = "ID")]
    focus: Option<String>,
}

#[derive(Debug, Clone, Copy)]
struct Click {
    frame: u32,
    x: f32,
    y: f32,
}

fn parse_click(value: &str) -> Result<Click, String> {
    let (frame, point) = value
        .split_once(':')
        .ok_or_else(|| format!("expected FRAME:X,Y, got {}", value))?;
    let (x, y) = point
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y, got {}", point))?;
    Ok(Click {
        frame: frame.trim().parse().map_err(|e| format!("frame: {}", e))?,
        x: x.trim().parse().map_err(|e| format!("x: {}", e))?,
        y: y.trim().parse().map_err(|e| format!("y: {}", e))?,
    })
}

/// Pretends to build label meshes on a worker thread and hands them back
/// through the engine's action queue.
struct ThreadedLabels {
    handle: EngineHandle,
    next: u64,
}

impl LabelProvider for ThreadedLabels {
    fn request_label(&mut self, request: LabelRequest) {
        let handle = self.handle.clone();
        let mesh = LabelHandle(self.next);
        self.next += 1;
        thread::spawn(move || {
            info!(
                "Label \"{}\" for {} at {:?}, size {}",
                request.text, request.parent, request.position, request.style.size
            );
            let _ = handle.label_ready(request.key, mesh);
        });
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<EngineConfig, Box<dyn Error>> {
    let config = match path {
        Some(path) => serde_json::from_slice(&fs::read(path)?)?,
        None => EngineConfig::default(),
    };
    config.validate()?;
    Ok(config)
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let config = load_config(args.config.as_ref())?;
    let site = json::load_from_path(&args.site)?;

    let engine = Engine::new(config, SurfaceRect::from_size(args.width, args.height))?;
    let labels = ThreadedLabels {
        handle: engine.handle(),
        next: 1,
    };
    let mut engine = engine.with_label_provider(labels);
    engine.subscribe(|event: &FocusEvent| {
        info!(
            "In view: {:?} ({} -> {})",
            event.in_view(),
            event.previous,
            event.current
        );
    });
    engine.load_site(&site)?;

    if let Some(id) = &args.focus {
        engine.focus_building(id);
    }

    let frame_time = Duration::from_millis(args.frame_ms);
    for frame in 0..args.frames {
        for click in args.click.iter().filter(|click| click.frame == frame) {
            let transition = engine.click(click.x, click.y);
            info!(
                "Frame {}: click at ({}, {}) -> {:?}",
                frame, click.x, click.y, transition
            );
        }
        let pose = engine.advance(frame_time);
        for index in engine.take_updated() {
            if let Some(node) = engine.graph().and_then(|graph| graph.node(index)) {
                info!(
                    "Frame {}: {} {} opacity {}",
                    frame,
                    node.kind(),
                    node.id(),
                    node.opacity()
                );
            }
        }
        debug!("Frame {}: camera {:?} -> {:?}", frame, pose.position, pose.look_at);
    }

    let pose = engine.camera().pose;
    info!(
        "Finished in {} with camera at {:?} looking at {:?}, {} of {} labels ready",
        engine.focus(),
        pose.position,
        pose.look_at,
        engine.labels().len() - engine.labels().pending(),
        engine.labels().len()
    );
    if let Some(graph) = engine.graph() {
        for (_, node) in graph.iter().filter(|(_, node)| node.kind() == NodeKind::Building) {
            info!("{} opacity {}", node.id(), node.opacity());
        }
    }
    Ok(())
}

fn main() {
    env_logger::init();

    if let Err(err) = run(Args::parse()) {
        error!("{}", err);
        std::process::exit(1);
    }
}
