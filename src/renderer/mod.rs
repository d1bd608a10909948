//! Jianpu text renderer: converts a parsed Score into notation text.
//!
//! One algorithm serves both dialects: staff splitting, then systems of
//! measures rendered note by note through a [`Dialect`] that supplies
//! symbols, duration style, bracket placement and whether to transpose.

mod dialect;
mod duration;
mod header;
mod layout;
mod lyrics;
mod notes;
mod staff;

use tracing::debug;

use crate::config::RenderOptions;
use crate::error::{RenderError, Result};
use crate::model::Score;

pub use dialect::{AccidentalPosition, Dialect, DurationStyle, PitchSymbols};
pub use duration::{Marker, Suffix, MAX_QUARTERS};
pub use layout::{render_body, render_line, render_measure, right_barline};
pub use lyrics::{lyric_text, render_lyrics_line};
pub use notes::{render_basic_note, render_note};
pub use staff::{split_staves, Voice};

/// Text rendered for one voice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPart {
    pub id: String,
    pub text: String,
}

/// jianpu99 document: header block followed by every voice, five
/// measures per system.
pub fn render_classic(score: &Score, options: &RenderOptions) -> Result<String> {
    let dialect = Dialect::CLASSIC;
    let voices = split_staves(score);
    let header = header::classic_header(score)?;
    let body = render_body(
        &voices,
        None,
        &dialect,
        options.measures_per_system_or(dialect.measures_per_system),
    )?;
    debug!(voices = voices.len(), "rendered jianpu99");
    Ok(format!("{header}{body}"))
}

/// byguitar body for every voice, in voice order.
pub fn render_guitar_parts(score: &Score, options: &RenderOptions) -> Result<Vec<RenderedPart>> {
    let dialect = Dialect::GUITAR;
    let voices = split_staves(score);
    let per_system = options.measures_per_system_or(dialect.measures_per_system);

    voices
        .iter()
        .enumerate()
        .map(|(index, voice)| -> Result<RenderedPart> {
            Ok(RenderedPart {
                id: voice.id.clone(),
                text: render_body(&voices, Some(index), &dialect, per_system)?,
            })
        })
        .collect()
}

/// byguitar body for the voice at `index` (after staff splitting).
pub fn render_guitar_part(score: &Score, index: usize, options: &RenderOptions) -> Result<String> {
    let dialect = Dialect::GUITAR;
    let voices = split_staves(score);
    if index >= voices.len() {
        return Err(RenderError::PartIndexOutOfRange { index, count: voices.len() }.into());
    }
    render_body(
        &voices,
        Some(index),
        &dialect,
        options.measures_per_system_or(dialect.measures_per_system),
    )
}

/// Multi-voice jcx document: header, voice declarations, then each
/// voice's byguitar body under its `[V:id]` marker.
pub fn render_jcx(score: &Score, options: &RenderOptions) -> Result<String> {
    let voices = split_staves(score);
    let mut lines = header::jcx_header(score, &voices, options.tempo)?;
    lines.push(String::new());

    for part in render_guitar_parts(score, options)? {
        lines.push(format!("[V:{}]", part.id));
        lines.push(part.text);
    }
    debug!(voices = voices.len(), "rendered jcx");
    Ok(lines.join("\n"))
}
