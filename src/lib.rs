//! jianpulib: MusicXML to Jianpu (numbered musical notation) text.
//!
//! Supports both uncompressed MusicXML (.musicxml) and compressed MXL (.mxl) files,
//! and renders the jianpu99, byguitar and jcx text formats.
//!
//! # Example
//! ```no_run
//! use jianpulib::{parse_file, render_classic, RenderOptions};
//!
//! let score = parse_file("path/to/score.musicxml").unwrap();
//! println!("Title: {:?}", score.title);
//! println!("{}", render_classic(&score, &RenderOptions::default()).unwrap());
//! ```

pub mod config;
pub mod error;
pub mod model;
pub mod mxl;
pub mod output;
pub mod parser;
pub mod renderer;
pub mod theory;

use std::path::Path;

pub use config::RenderOptions;
pub use error::{AttributeField, ConvertError, RenderError, Result};
pub use model::*;
pub use mxl::parse_mxl;
pub use parser::parse_musicxml;
pub use renderer::{
    render_classic, render_guitar_part, render_guitar_parts, render_jcx, Dialect, RenderedPart,
};
pub use theory::{Key, NoteName, Step};

/// Parse a MusicXML file from a file path.
/// Automatically detects format based on file extension:
/// - `.musicxml` or `.xml` → uncompressed MusicXML
/// - `.mxl` → compressed MXL (ZIP archive)
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Score> {
    let path = path.as_ref();
    let data = std::fs::read(path)?;
    parse_bytes(&data, path.extension().and_then(|e| e.to_str()))
}

/// Parse MusicXML from raw bytes with an optional format hint.
/// If `extension` is None, tries to auto-detect the format.
pub fn parse_bytes(data: &[u8], extension: Option<&str>) -> Result<Score> {
    match extension {
        Some("mxl") => parse_mxl(data),
        Some("musicxml") | Some("xml") if !mxl::is_zip(data) => parse_musicxml(utf8(data)?),
        _ => {
            if mxl::is_zip(data) {
                return parse_mxl(data);
            }
            parse_musicxml(utf8(data)?)
        }
    }
}

fn utf8(data: &[u8]) -> Result<&str> {
    std::str::from_utf8(data)
        .map_err(|e| ConvertError::Parse(format!("Invalid UTF-8 in MusicXML file: {e}")))
}

/// Convert a parsed score to a JSON string.
pub fn score_to_json(score: &Score) -> Result<String> {
    Ok(serde_json::to_string_pretty(score)?)
}

/// Parse a MusicXML file and render it as jianpu99 text.
pub fn render_file_to_classic<P: AsRef<Path>>(path: P, options: &RenderOptions) -> Result<String> {
    let score = parse_file(path)?;
    render_classic(&score, options)
}

/// Parse MusicXML bytes and render them as a jcx score.
pub fn render_bytes_to_jcx(
    data: &[u8],
    extension: Option<&str>,
    options: &RenderOptions,
) -> Result<String> {
    let score = parse_bytes(data, extension)?;
    render_jcx(&score, options)
}
