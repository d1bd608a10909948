//! Output file naming and writing for each conversion mode.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::RenderOptions;
use crate::error::Result;
use crate::model::Score;
use crate::renderer;

/// Conversion mode, one per output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// `<stem>.txt` with header and all voices
    Jianpu99,
    /// `<stem>-<index>.txt` per voice
    Byguitar,
    /// Combined multi-voice text on stdout
    Jcx,
    /// Parsed model as JSON on stdout
    Json,
}

/// Where a conversion's text goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    File(PathBuf),
    Stdout,
}

/// One piece of converted text and where to put it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Output {
    pub destination: Destination,
    pub text: String,
}

/// `dir/<stem><suffix>.txt`, where `dir` defaults to the input's directory.
pub fn output_path(input: &Path, output_dir: Option<&Path>, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "score".to_string());
    let dir = output_dir
        .map(Path::to_path_buf)
        .or_else(|| input.parent().map(Path::to_path_buf))
        .unwrap_or_default();
    dir.join(format!("{stem}{suffix}.txt"))
}

/// Render `score` for `mode`.
pub fn convert(
    score: &Score,
    mode: Mode,
    input: &Path,
    output_dir: Option<&Path>,
    options: &RenderOptions,
) -> Result<Vec<Output>> {
    let outputs = match mode {
        Mode::Jianpu99 => vec![Output {
            destination: Destination::File(output_path(input, output_dir, "")),
            text: renderer::render_classic(score, options)?,
        }],
        Mode::Byguitar => renderer::render_guitar_parts(score, options)?
            .into_iter()
            .enumerate()
            .map(|(i, part)| Output {
                destination: Destination::File(output_path(input, output_dir, &format!("-{i}"))),
                text: part.text,
            })
            .collect(),
        Mode::Jcx => vec![Output {
            destination: Destination::Stdout,
            text: renderer::render_jcx(score, options)?,
        }],
        Mode::Json => vec![Output {
            destination: Destination::Stdout,
            text: crate::score_to_json(score)?,
        }],
    };
    Ok(outputs)
}

/// Write file outputs and return stdout outputs joined.
pub fn write_outputs(outputs: &[Output]) -> Result<String> {
    let mut stdout = Vec::new();
    for output in outputs {
        match &output.destination {
            Destination::File(path) => {
                std::fs::write(path, &output.text)?;
                info!(path = %path.display(), bytes = output.text.len(), "wrote output");
            }
            Destination::Stdout => stdout.push(output.text.as_str()),
        }
    }
    Ok(stdout.join("\n"))
}
