//! Measures, lines and systems.

use super::dialect::Dialect;
use super::lyrics::render_lyrics_line;
use super::notes::render_note;
use super::staff::Voice;
use crate::error::Result;
use crate::model::{BarlineType, Measure};

/// Space-separated note tokens of one measure.
pub fn render_measure(voice: &Voice, measure: &Measure, dialect: &Dialect) -> Result<String> {
    let tokens = voice
        .rendered_notes(measure)
        .map(|n| render_note(n, dialect))
        .collect::<Result<Vec<_>>>()?;
    Ok(tokens.join(" "))
}

pub fn right_barline(barline: BarlineType) -> &'static str {
    match barline {
        BarlineType::Repeat => ":|",
        BarlineType::Double => "||/",
        BarlineType::Final => "||",
        BarlineType::Normal => "|",
    }
}

/// A run of measures on one line. A left repeat opens with `|:` at the
/// start of the line and with `:` after a preceding barline.
pub fn render_line(voice: &Voice, measures: &[Measure], dialect: &Dialect) -> Result<String> {
    let mut line = String::new();
    for (i, measure) in measures.iter().enumerate() {
        if measure.left_barline == BarlineType::Repeat {
            line.push_str(if i == 0 { "|:" } else { ":" });
        }
        line.push(' ');
        line.push_str(&render_measure(voice, measure, dialect)?);
        line.push(' ');
        line.push_str(right_barline(measure.right_barline));
    }
    Ok(line.trim().to_string())
}

/// Systems of `measures_per_system` measures across the longest voice.
/// Each voice (or only `only`) contributes one line per system, plus a
/// lyric line when the dialect has lyrics; a blank line ends each system.
pub fn render_body(
    voices: &[Voice],
    only: Option<usize>,
    dialect: &Dialect,
    measures_per_system: usize,
) -> Result<String> {
    let per_system = measures_per_system.max(1);
    let measure_count = voices.iter().map(|v| v.measures.len()).max().unwrap_or(0);

    let mut lines = Vec::new();
    for begin in (0..measure_count).step_by(per_system) {
        let end = (begin + per_system).min(measure_count);
        for (index, voice) in voices.iter().enumerate() {
            if only.is_some_and(|o| o != index) {
                continue;
            }
            let span = voice.span(begin, end);
            lines.push(render_line(voice, span, dialect)?);
            if dialect.lyrics {
                if let Some(lyrics) = render_lyrics_line(voice, span) {
                    lines.push(lyrics);
                }
            }
        }
        lines.push(String::new());
    }
    Ok(lines.join("\n"))
}
