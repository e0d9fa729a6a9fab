//! Command-line separation driver.
//!
//! Loads a polyphonic recording, runs the mask pipeline, and writes the
//! melody and accompaniment next to the input as
//! `<stem>_melody.wav` / `<stem>_accomp.wav`.

use clap::{Parser, ValueEnum};
use descant::io;
use descant::mask::MaskPreset;
use descant::pipeline::{separate, RefinedMask, SeparatorConfig};
use descant::window::WindowType;
use log::info;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Pick {
    Hits,
    Dilated,
    Combined,
}

impl From<Pick> for RefinedMask {
    fn from(pick: Pick) -> Self {
        match pick {
            Pick::Hits => RefinedMask::Hits,
            Pick::Dilated => RefinedMask::Dilated,
            Pick::Combined => RefinedMask::Combined,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "descant", version, about = "Separate a recording into melody and accompaniment")]
struct Args {
    /// Input audio file (any format symphonia can decode).
    input: PathBuf,

    /// Output path stem; defaults to the input path without extension.
    #[arg(short, long)]
    output_stem: Option<PathBuf>,

    /// Mask preset: 1 = fundamentals only, 2 = with harmonics,
    /// 3 = with harmonics, widened band.
    #[arg(short = 't', long, default_value_t = 3)]
    preset: u8,

    /// Enable onset-aware novelty dilation of the mask.
    #[arg(long)]
    novelty: bool,

    /// Disable hit-or-miss refinement.
    #[arg(long)]
    no_hit_miss: bool,

    /// Which refinement output to separate on.
    #[arg(long, value_enum, default_value_t = Pick::Combined)]
    pick: Pick,

    /// Minimum fundamental in Hz passed to the pitch tracker.
    #[arg(long, default_value_t = 100.0)]
    fmin: f32,

    /// Maximum fundamental in Hz passed to the pitch tracker.
    #[arg(long, default_value_t = 800.0)]
    fmax: f32,

    /// Analysis window: hann, hamming, or cosine.
    #[arg(long, default_value = "cosine")]
    window: String,

    /// Sample rate the pipeline runs at; the input is resampled to it.
    #[arg(long, default_value_t = 44100)]
    sample_rate: u32,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let preset = MaskPreset::from_selector(args.preset)
        .ok_or_else(|| format!("preset {} is not valid (use 1, 2, or 3)", args.preset))?;
    let window = WindowType::parse(&args.window)
        .ok_or_else(|| format!("unknown window `{}`", args.window))?;

    let mut config = SeparatorConfig::default().with_preset(preset);
    config.sample_rate = args.sample_rate;
    config.window = window;
    config.novelty_dilation = args.novelty;
    config.hit_miss = !args.no_hit_miss;
    config.refined = args.pick.into();
    config.pitch.fmin = args.fmin;
    config.pitch.fmax = args.fmax;

    info!("loading {}", args.input.display());
    let signal = io::load_audio(&args.input, config.sample_rate)?;
    info!(
        "loaded {} samples ({:.1} s at {} Hz)",
        signal.len(),
        signal.len() as f32 / config.sample_rate as f32,
        config.sample_rate
    );

    info!("separating");
    let result = separate(&signal, &config)?;

    let stem = args
        .output_stem
        .unwrap_or_else(|| args.input.with_extension(""));
    let name = stem
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .ok_or("output stem has no file name")?;
    let melody_path = stem.with_file_name(format!("{name}_melody.wav"));
    let accomp_path = stem.with_file_name(format!("{name}_accomp.wav"));

    io::save_wav(&melody_path, &result.melody, config.sample_rate)?;
    info!("wrote {}", melody_path.display());
    io::save_wav(&accomp_path, &result.accompaniment, config.sample_rate)?;
    info!("wrote {}", accomp_path.display());

    Ok(())
}
