use std::path::PathBuf;

use anyhow::Context as _;
use indicatif::ProgressBar;

use arraypath::{Camera, Preset, RenderSettings, geometry::WorldPoint, render};

struct Args {
    settings_path: Option<PathBuf>,
    scene: Preset,
    output: PathBuf,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut args = Args {
        settings_path: None,
        scene: Preset::default(),
        output: PathBuf::from("render.png"),
    };

    let mut remaining = std::env::args().skip(1);
    while let Some(argument) = remaining.next() {
        match argument.as_str() {
            "--scene" => {
                let name = remaining.next().context("--scene needs a value")?;
                args.scene = name.parse().map_err(|message: String| anyhow::anyhow!(message))?;
            }
            "--output" => {
                args.output = remaining.next().context("--output needs a value")?.into();
            }
            "--help" => {
                eprintln!(
                    "usage: arraypath [settings.toml] [--scene {}] [--output render.png]",
                    Preset::NAMES.join("|")
                );
                std::process::exit(0);
            }
            path if args.settings_path.is_none() => {
                args.settings_path = Some(PathBuf::from(path));
            }
            other => anyhow::bail!("unexpected argument {other:?}"),
        }
    }
    Ok(args)
}

fn main() -> anyhow::Result<()> {
    let args = parse_args()?;

    let settings = match &args.settings_path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading settings from {}", path.display()))?;
            toml::from_str(&text)
                .with_context(|| format!("parsing settings from {}", path.display()))?
        }
        None => RenderSettings::default(),
    };

    let camera = Camera::builder()
        .aspect_ratio(settings.aspect_ratio)
        .viewport_height(settings.viewport_height)
        .focal_length(settings.focal_length)
        .origin(WorldPoint::from(settings.camera_origin))
        .build();
    let scene = args.scene.build();

    let bar = ProgressBar::new(settings.samples_per_pixel as u64);
    let image = render(&scene, &camera, &settings, |done, _total| {
        bar.set_position(done as u64)
    })?;
    bar.finish();

    image
        .save(&args.output)
        .with_context(|| format!("writing image to {}", args.output.display()))?;
    Ok(())
}
