use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "onbeat",
    version,
    about = "Measure how closely a performance follows a quantized reference"
)]
pub struct Cli {
    #[command(subcommand)]
    pub mode: Mode,

    #[command(flatten)]
    pub tuning: Tuning,
}

#[derive(Subcommand, Debug)]
pub enum Mode {
    /// Analyse one performance file (MIDI or WAV) and print the report.
    Analyze {
        /// Quantized reference MIDI file.
        #[arg(short, long)]
        reference: PathBuf,

        /// Performance to analyse.
        performance: PathBuf,
    },
    /// Analyse each new file that settles in a directory until Ctrl-C.
    Watch {
        /// Quantized reference MIDI file.
        #[arg(short, long)]
        reference: PathBuf,

        /// Directory the host records into.
        #[arg(short, long)]
        dir: PathBuf,

        /// Poll interval; defaults to the stored setting.
        #[arg(long)]
        interval_ms: Option<u64>,
    },
}

/// Per-run overrides of the stored session settings.
#[derive(Args, Debug, Default)]
pub struct Tuning {
    /// Tempo in beats per minute.
    #[arg(long, global = true)]
    pub bpm: Option<f64>,

    /// Deviation in ms still counted as on time.
    #[arg(long = "threshold-ms", global = true)]
    pub threshold_ms: Option<f64>,

    /// Grid lines per beat.
    #[arg(long, global = true)]
    pub subdivisions: Option<u32>,

    /// Measure at which the performance recording started.
    #[arg(long = "record-start", global = true)]
    pub record_start: Option<f64>,

    /// Onset threshold for audio, in dBFS.
    #[arg(long = "db-threshold", global = true, allow_hyphen_values = true)]
    pub db_threshold: Option<f32>,

    /// Minimum spacing between two audio onsets.
    #[arg(long = "hit-distance-ms", global = true)]
    pub hit_distance_ms: Option<f64>,

    /// Watch for WAV recordings instead of MIDI files.
    #[arg(long, global = true)]
    pub audio: bool,

    /// Write the projected grid scene as JSON to this file after each analysis.
    #[arg(long = "scene-json", global = true)]
    pub scene_json: Option<PathBuf>,

    /// Write settings, reference, analysis and report into this directory.
    #[arg(long, global = true)]
    pub export: Option<PathBuf>,

    /// Keep the overrides as the new stored settings.
    #[arg(long, global = true)]
    pub save: bool,
}
