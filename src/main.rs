//! musicxml2jianpu: convert MusicXML/MXL files to Jianpu text.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use jianpulib::output::{self, Mode};
use jianpulib::RenderOptions;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    Jianpu99,
    Byguitar,
    Jcx,
    Json,
}

impl From<ModeArg> for Mode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Jianpu99 => Mode::Jianpu99,
            ModeArg::Byguitar => Mode::Byguitar,
            ModeArg::Jcx => Mode::Jcx,
            ModeArg::Json => Mode::Json,
        }
    }
}

/// Convert a MusicXML score into Jianpu text
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Input file in MusicXML (.musicxml, .xml) or MXL (.mxl) format
    input_file: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "jcx")]
    mode: ModeArg,

    /// Tempo for the jcx Q: line, instead of the score's own
    #[arg(short, long)]
    tempo: Option<f64>,

    /// Measures per line instead of the format's default
    #[arg(long)]
    measures_per_system: Option<usize>,

    /// JSON file with render options
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory for output files (defaults to the input's directory)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut options = RenderOptions {
        tempo: args.tempo,
        measures_per_system: args.measures_per_system,
    };
    if let Some(ref path) = args.config {
        let file = RenderOptions::from_json_file(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        options = options.or(file);
    }

    let score = jianpulib::parse_file(&args.input_file)
        .with_context(|| format!("parsing {}", args.input_file.display()))?;
    info!(
        title = ?score.title,
        parts = score.parts.len(),
        measures = score.measure_count(),
        "parsed score"
    );

    let outputs = output::convert(
        &score,
        args.mode.into(),
        &args.input_file,
        args.output_dir.as_deref(),
        &options,
    )
    .context("rendering score")?;

    let stdout = output::write_outputs(&outputs).context("writing output")?;
    if !stdout.is_empty() {
        println!("{stdout}");
    }
    Ok(())
}
