//! Data model for a parsed MusicXML score.
//!
//! Only the information needed for Jianpu text output is kept: attribute
//! context per measure, note events with pitch/duration/tie/tuplet/lyric
//! data, and barline types.

use std::sync::Arc;

use num_rational::Ratio;
use serde::{Deserialize, Serialize};

use crate::error::{ConvertError, Result};
use crate::theory::{Alter, Key, NoteName, Step};

/// A complete musical score parsed from MusicXML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Score {
    /// `work/work-title`, falling back to the first `credit/credit-words`
    pub title: Option<String>,
    /// `identification/creator[@type=composer]`
    pub composer: Option<String>,
    /// Parts in part-list order
    pub parts: Vec<Part>,
}

/// A musical part (one instrument or voice).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Part {
    /// Part identifier (e.g., "P1")
    pub id: String,
    /// Part name (e.g., "Voice")
    pub name: String,
    /// Abbreviated name (e.g., "Vo.")
    pub abbreviation: Option<String>,
    /// Ordered list of measures
    pub measures: Vec<Measure>,
}

/// Effective divisions, key and time signature at a measure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attributes {
    /// Ticks per quarter note
    pub divisions: u32,
    pub key: Key,
    pub time: TimeSignature,
}

/// Time signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSignature {
    /// Numerator (e.g., 3 in 3/4)
    pub beats: u32,
    /// Denominator (e.g., 4 in 3/4)
    pub beat_type: u32,
}

impl std::fmt::Display for TimeSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.beats, self.beat_type)
    }
}

/// Barline style at either end of a measure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BarlineType {
    #[default]
    Normal,
    Double,
    Final,
    Repeat,
}

/// A single measure (bar) of music.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Measure {
    /// Measure number as written; implicit measures may use labels like "X1"
    pub number: String,
    pub left_barline: BarlineType,
    pub right_barline: BarlineType,
    /// Tempo from the first `direction/sound@tempo`, if any
    pub tempo: Option<f64>,
    /// Own or inherited attribute context, shared with the notes
    pub attributes: Arc<Attributes>,
    /// Notes, rests and chord tones in document order
    pub notes: Vec<Note>,
}

/// Tie flags of a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Tie {
    #[default]
    None,
    Start,
    Stop,
    /// Tied from the previous note and to the next one
    Both,
}

impl Tie {
    pub fn from_flags(start: bool, stop: bool) -> Tie {
        match (start, stop) {
            (true, true) => Tie::Both,
            (true, false) => Tie::Start,
            (false, true) => Tie::Stop,
            (false, false) => Tie::None,
        }
    }

    pub fn is_start(self) -> bool {
        matches!(self, Tie::Start | Tie::Both)
    }

    pub fn is_stop(self) -> bool {
        matches!(self, Tie::Stop | Tie::Both)
    }
}

/// Position of a note within a tuplet group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Tuplet {
    /// Not under a time modification
    #[default]
    None,
    Start,
    Stop,
    /// Time-modified note between the start and stop
    Inner,
    /// A group made of a single note
    Both,
}

impl Tuplet {
    pub fn is_start(self) -> bool {
        matches!(self, Tuplet::Start | Tuplet::Both)
    }

    pub fn is_stop(self) -> bool {
        matches!(self, Tuplet::Stop | Tuplet::Both)
    }
}

/// Accidental as notated on the note itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Accidental {
    Sharp,
    Flat,
    Natural,
}

/// `<time-modification>` ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeModification {
    pub actual_notes: u32,
    pub normal_notes: u32,
}

impl Default for TimeModification {
    fn default() -> Self {
        Self { actual_notes: 1, normal_notes: 1 }
    }
}

/// Pitch of a note as written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pitch {
    pub step: Step,
    /// Octave number (middle C = C4)
    pub octave: i32,
}

/// First lyric syllable of a note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lyric {
    pub text: String,
    /// "single", "begin", "middle" or "end"
    pub syllabic: Option<String>,
}

impl Lyric {
    /// Whether the word continues on the next note.
    pub fn is_continued(&self) -> bool {
        matches!(self.syllabic.as_deref(), Some("begin") | Some("middle"))
    }
}

/// A single note or rest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    /// Measure number, for error reporting
    pub measure: String,
    /// Whether this is a rest
    pub rest: bool,
    /// Duration in divisions (0 for grace notes)
    pub duration: u32,
    /// Whether this note is part of a chord with the previous note
    pub chord: bool,
    pub grace: bool,
    pub tie: Tie,
    pub tuplet: Tuplet,
    pub time_modification: TimeModification,
    pub pitch: Option<Pitch>,
    pub accidental: Option<Accidental>,
    pub lyric: Option<Lyric>,
    /// Staff number as written (for multi-staff parts like piano)
    pub staff: Option<String>,
    pub attributes: Arc<Attributes>,
}

impl Note {
    /// Duration in quarter notes.
    pub fn duration(&self) -> Ratio<i64> {
        Ratio::new(i64::from(self.duration), i64::from(self.attributes.divisions))
    }

    /// Duration as notated: the sounding duration scaled back up by
    /// the tuplet ratio, e.g. a triplet eighth displays as an eighth.
    pub fn displayed_duration(&self) -> Ratio<i64> {
        let tm = self.time_modification;
        if tm.actual_notes == tm.normal_notes {
            return self.duration();
        }
        self.duration() * Ratio::new(i64::from(tm.actual_notes), i64::from(tm.normal_notes))
    }

    /// Written pitch name and octave after applying the key signature.
    ///
    /// A letter altered by the key keeps the key's accidental unless the
    /// note carries a natural sign; other letters take a notated sharp
    /// or flat.
    pub fn written_pitch(&self) -> Result<(NoteName, i32)> {
        let pitch = self
            .pitch
            .ok_or_else(|| ConvertError::Pitch { measure: self.measure.clone() })?;
        let (key_alter, key_steps) = self.attributes.key.accidentals();

        let alter = if self.accidental != Some(Accidental::Natural)
            && key_steps.contains(&pitch.step)
        {
            Some(key_alter)
        } else {
            match self.accidental {
                Some(Accidental::Sharp) => Some(Alter::Sharp),
                Some(Accidental::Flat) => Some(Alter::Flat),
                _ => None,
            }
        };

        Ok((NoteName { step: pitch.step, alter }, pitch.octave))
    }

    pub fn key(&self) -> Key {
        self.attributes.key
    }
}

impl Measure {
    /// Staff ids named by this measure's notes, in order of appearance.
    pub fn staves(&self) -> Vec<String> {
        let mut staves: Vec<String> = Vec::new();
        for staff in self.notes.iter().filter_map(|n| n.staff.as_ref()) {
            if !staves.contains(staff) {
                staves.push(staff.clone());
            }
        }
        staves
    }
}

impl Score {
    /// Create a new empty score.
    pub fn new() -> Self {
        Self {
            title: None,
            composer: None,
            parts: Vec::new(),
        }
    }

    /// First measure of the first part; initial key, time and tempo come from it.
    pub fn first_measure(&self) -> Option<&Measure> {
        self.parts.first().and_then(|p| p.measures.first())
    }

    pub fn initial_attributes(&self) -> Option<&Attributes> {
        self.first_measure().map(|m| m.attributes.as_ref())
    }

    pub fn initial_tempo(&self) -> Option<f64> {
        self.first_measure().and_then(|m| m.tempo)
    }

    /// Get the total number of measures in the longest part.
    pub fn measure_count(&self) -> usize {
        self.parts.iter().map(|p| p.measures.len()).max().unwrap_or(0)
    }
}

impl Default for Score {
    fn default() -> Self {
        Self::new()
    }
}
