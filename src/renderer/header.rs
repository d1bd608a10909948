//! Header blocks for the jianpu99 and jcx outputs.

use super::staff::Voice;
use crate::error::{RenderError, Result};
use crate::model::Score;

const JIANPU99_VERSION: &str = "1.0";

/// `V:`/`B:`/`D:`/`P:`/`Z:` lines, each newline-terminated.
/// Flats in the key name are written as `$`.
pub fn classic_header(score: &Score) -> Result<String> {
    let attrs = score.initial_attributes().ok_or(RenderError::NoMeasures)?;

    let mut header = format!("V: {JIANPU99_VERSION}\n");
    if let Some(ref title) = score.title {
        header.push_str(&format!("B: {title}\n"));
    }
    header.push_str(&format!("D: {}\n", attrs.key.name().replace('b', "$")));
    header.push_str(&format!("P: {}\n", attrs.time));
    if let Some(ref composer) = score.composer {
        header.push_str(&format!("Z: {composer}\n"));
    }
    Ok(header)
}

/// `T:`/`K:`/`M:`/`L:`/`Q:` lines followed by one `V:` line per voice.
pub fn jcx_header(score: &Score, voices: &[Voice], tempo: Option<f64>) -> Result<Vec<String>> {
    let attrs = score.initial_attributes().ok_or(RenderError::NoMeasures)?;
    let tempo = tempo
        .or_else(|| score.initial_tempo())
        .ok_or(RenderError::MissingTempo)?;
    let beat_type = attrs.time.beat_type;

    let mut lines = vec![
        format!("T: {}", score.title.as_deref().unwrap_or("")),
        format!("K: {}", attrs.key),
        format!("M: {}", attrs.time),
        format!("L: 1/{beat_type}"),
        format!("Q: 1/{beat_type}={tempo}"),
    ];
    lines.extend(voices.iter().map(|v| {
        format!("V:{} name={} style=jianpu ins=100 vol=100", v.id, v.name)
    }));
    Ok(lines)
}
