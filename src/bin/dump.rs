//! Runs the tracker over a detections dump and writes the per-frame and
//! per-track JSON.
//!
//! Input lines look like `<frame>:<json detections>`, for example
//! `15:[{"box":[10,10,50,50],"p":0.91}]`. Frames without a line are
//! treated as frames without detections.

use anyhow::{anyhow, bail, Context};
use keytrack::dump::{frame_count, read_detections};
use keytrack::scene::Scene;
use keytrack::{TrackerConfig, VideoInfo};
use log::info;

struct Args {
    detections: String,
    output: String,
    config: Option<String>,
    info: VideoInfo,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut args = std::env::args().skip(1);
    let mut positional = Vec::new();
    let mut config = None;
    let mut info = VideoInfo::default();

    while let Some(arg) = args.next() {
        let mut value = |name: &str| {
            args.next()
                .ok_or_else(|| anyhow!("expected a value after `{}`", name))
        };

        match arg.as_str() {
            "--config" => config = Some(value("--config")?),
            "--name" => info.name = value("--name")?,
            "--width" => info.width = value("--width")?.parse()?,
            "--height" => info.height = value("--height")?.parse()?,
            "--fps" => info.fps = value("--fps")?.parse()?,
            "--total-frames" => info.total_frames = value("--total-frames")?.parse()?,
            flag if flag.starts_with("--") => bail!("unknown option `{}`", flag),
            other => positional.push(other.to_string()),
        }
    }

    let mut positional = positional.into_iter();
    let detections = positional
        .next()
        .ok_or_else(|| anyhow!("expected detections file name"))?;
    let output = positional
        .next()
        .ok_or_else(|| anyhow!("expected output file name"))?;

    if info.name.is_empty() {
        info.name = detections.clone();
    }

    Ok(Args {
        detections,
        output,
        config,
        info,
    })
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = parse_args()?;
    let config = match &args.config {
        Some(path) => TrackerConfig::from_file(path)?,
        None => TrackerConfig::default(),
    };

    let file = std::fs::File::open(&args.detections)
        .with_context(|| format!("opening {}", args.detections))?;
    let mut detections = read_detections(std::io::BufReader::new(file))?;

    let mut info = args.info;
    let known = Some(info.total_frames).filter(|&total| total > 0);
    info.total_frames = frame_count(&mut detections, known)?;
    let total_frames = info.total_frames;

    info!("Processing video: {}", info.name);
    info!("Total frames: {}", total_frames);

    let mut scene = Scene::new(info, config)?;
    for frame in 0..total_frames {
        let dets = detections.get(&frame).map(Vec::as_slice).unwrap_or(&[]);
        scene.process(frame, dets)?;
    }

    let tracks = scene.tracker().len();
    let file = std::fs::File::create(&args.output)
        .with_context(|| format!("creating {}", args.output))?;
    scene.export().write_json(std::io::BufWriter::new(file))?;

    info!("{} tracks, bounding boxes data saved to: {}", tracks, args.output);

    Ok(())
}
