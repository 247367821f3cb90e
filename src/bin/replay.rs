use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use serde::Serialize;

use motion_cues_rs::controller::{GateDecision, OverlayController, OverlayFrame};
use motion_cues_rs::settings::{OverlaySettings, VisualStyle};
use motion_cues_rs::types::RawMotionSample;

/// Feed a recorded motion log through the overlay offline.
#[derive(Parser, Debug)]
#[command(name = "replay")]
struct Args {
    /// JSON array or JSON-lines file of raw motion samples
    #[arg(long)]
    log: PathBuf,

    /// Settings JSON to start from (defaults used if omitted)
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Override sensitivity (0..1)
    #[arg(long)]
    sensitivity: Option<f64>,

    /// Override visual style (edge_lines, corner_dots, center_circle)
    #[arg(long)]
    style: Option<String>,

    /// Enable auto-activate gating
    #[arg(long, default_value_t = false)]
    auto_activate: bool,

    /// Print only a summary, not one frame per sample
    #[arg(long, default_value_t = false)]
    summary_only: bool,
}

#[derive(Serialize)]
struct ReplayLine<'a> {
    index: usize,
    gate: &'static str,
    frame: &'a OverlayFrame,
}

#[derive(Serialize, Default)]
struct Summary {
    samples: usize,
    stale_samples: usize,
    incomplete_samples: usize,
    shows: usize,
    hides: usize,
    peak_x: f64,
    peak_y: f64,
    peak_z: f64,
}

fn load_samples(path: &Path) -> anyhow::Result<Vec<RawMotionSample>> {
    let content =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    if content.trim_start().starts_with('[') {
        return Ok(serde_json::from_str(&content)?);
    }

    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            serde_json::from_str(line).with_context(|| format!("line {}", i + 1))
        })
        .collect()
}

fn load_settings(args: &Args) -> anyhow::Result<OverlaySettings> {
    let mut settings = match &args.settings {
        Some(path) => {
            let content = fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            serde_json::from_str(&content)?
        }
        None => OverlaySettings::default(),
    };
    if let Some(s) = args.sensitivity {
        anyhow::ensure!((0.0..=1.0).contains(&s), "sensitivity must be within 0..1");
        settings.sensitivity = s;
    }
    if let Some(style) = &args.style {
        settings.visual_style = VisualStyle::from_tag(style);
    }
    if args.auto_activate {
        settings.auto_activate = true;
    }
    // Replay always renders, whatever the stored toggle says.
    settings.enabled = true;
    Ok(settings)
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let settings = load_settings(&args)?;
    let samples = load_samples(&args.log)?;
    log::info!(
        "Replaying {} samples from {} (style={}, sensitivity={:.2})",
        samples.len(),
        args.log.display(),
        settings.visual_style,
        settings.sensitivity
    );

    let auto_activate = settings.auto_activate;
    let mut controller = OverlayController::new(settings);
    if !auto_activate {
        // Manual mode: the overlay is simply switched on.
        controller.set_visible(true);
    }
    let mut summary = Summary::default();

    for (index, sample) in samples.iter().enumerate() {
        summary.samples += 1;
        if !sample.fresh {
            summary.stale_samples += 1;
        }
        if !sample.complete {
            summary.incomplete_samples += 1;
        }

        let was_visible = controller.is_visible();
        let gate = controller.ingest(sample);
        let frame = controller.frame();
        match (was_visible, frame.visible) {
            (false, true) => summary.shows += 1,
            (true, false) => summary.hides += 1,
            _ => {}
        }
        summary.peak_x = summary.peak_x.max(frame.smoothed_x);
        summary.peak_y = summary.peak_y.max(frame.smoothed_y);
        summary.peak_z = summary.peak_z.max(frame.smoothed_z);

        if !args.summary_only {
            let line = ReplayLine {
                index,
                gate: match gate {
                    GateDecision::Show => "show",
                    GateDecision::Hide => "hide",
                    GateDecision::Skip => "skip",
                },
                frame,
            };
            println!("{}", serde_json::to_string(&line)?);
        }
    }

    eprintln!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
