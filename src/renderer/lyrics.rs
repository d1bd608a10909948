//! `W:` lyric lines under each system.

use super::staff::Voice;
use crate::model::{Lyric, Measure};

/// Placeholder for a sung note without a syllable.
pub const MISSING_SYLLABLE: &str = "*";

/// Syllable text, with `-` when the word continues; typographic
/// apostrophes become plain ones.
pub fn lyric_text(lyric: &Lyric) -> String {
    let mut text = lyric.text.replace(&['\u{2018}', '\u{2019}'][..], "'");
    if lyric.is_continued() {
        text.push('-');
    }
    text
}

/// Lyric line for a span of measures, or `None` when nothing would be
/// sung on it.
pub fn render_lyrics_line(voice: &Voice, measures: &[Measure]) -> Option<String> {
    let pieces: Vec<String> = measures
        .iter()
        .flat_map(|m| voice.notes(m))
        .filter(|n| !n.grace)
        .filter_map(|n| match &n.lyric {
            Some(lyric) => Some(lyric_text(lyric)),
            None if !n.rest && !n.chord => Some(MISSING_SYLLABLE.to_string()),
            None => None,
        })
        .filter(|p| !p.is_empty())
        .collect();

    if pieces.is_empty() {
        None
    } else {
        Some(format!("W: {}", pieces.join(" ")))
    }
}
