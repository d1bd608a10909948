//! Fixed music-theory tables: key signatures, key accidentals,
//! 12-tone degrees, transposition to C and octave marks.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Diatonic note letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Step {
    C,
    D,
    E,
    F,
    G,
    A,
    B,
}

impl Step {
    pub const ALL: [Step; 7] = [Step::C, Step::D, Step::E, Step::F, Step::G, Step::A, Step::B];

    pub fn from_letter(s: &str) -> Option<Step> {
        match s {
            "C" => Some(Step::C),
            "D" => Some(Step::D),
            "E" => Some(Step::E),
            "F" => Some(Step::F),
            "G" => Some(Step::G),
            "A" => Some(Step::A),
            "B" => Some(Step::B),
            _ => None,
        }
    }

    pub fn letter(self) -> char {
        match self {
            Step::C => 'C',
            Step::D => 'D',
            Step::E => 'E',
            Step::F => 'F',
            Step::G => 'G',
            Step::A => 'A',
            Step::B => 'B',
        }
    }

    /// Scale number in C major (C = 1 … B = 7).
    pub fn number(self) -> char {
        match self {
            Step::C => '1',
            Step::D => '2',
            Step::E => '3',
            Step::F => '4',
            Step::G => '5',
            Step::A => '6',
            Step::B => '7',
        }
    }
}

/// Written chromatic alteration of a note name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Alter {
    Sharp,
    Flat,
}

/// A written note name such as `C`, `F#` or `Bb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NoteName {
    pub step: Step,
    pub alter: Option<Alter>,
}

impl NoteName {
    pub const fn natural(step: Step) -> Self {
        Self { step, alter: None }
    }

    pub const fn sharp(step: Step) -> Self {
        Self { step, alter: Some(Alter::Sharp) }
    }

    pub const fn flat(step: Step) -> Self {
        Self { step, alter: Some(Alter::Flat) }
    }

    /// Semitone degree above C, in `0..12`.
    ///
    /// Enharmonic aliases share a degree: `B#` and `C` are both 0,
    /// `Fb` and `E` are both 4, `E#` and `F` are both 5, `Cb` and `B`
    /// are both 11.
    pub fn degree(self) -> u8 {
        use Alter::*;
        use Step::*;
        match (self.step, self.alter) {
            (C, None) | (B, Some(Sharp)) => 0,
            (C, Some(Sharp)) | (D, Some(Flat)) => 1,
            (D, None) => 2,
            (D, Some(Sharp)) | (E, Some(Flat)) => 3,
            (E, None) | (F, Some(Flat)) => 4,
            (F, None) | (E, Some(Sharp)) => 5,
            (F, Some(Sharp)) | (G, Some(Flat)) => 6,
            (G, None) => 7,
            (G, Some(Sharp)) | (A, Some(Flat)) => 8,
            (A, None) => 9,
            (A, Some(Sharp)) | (B, Some(Flat)) => 10,
            (B, None) | (C, Some(Flat)) => 11,
        }
    }

    /// Canonical sharp-spelled name for a degree in `0..12`.
    pub fn from_degree(degree: u8) -> NoteName {
        DEGREE_NAMES[usize::from(degree % 12)]
    }
}

impl fmt::Display for NoteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.step.letter())?;
        match self.alter {
            Some(Alter::Sharp) => f.write_str("#"),
            Some(Alter::Flat) => f.write_str("b"),
            None => Ok(()),
        }
    }
}

const DEGREE_NAMES: [NoteName; 12] = [
    NoteName::natural(Step::C),
    NoteName::sharp(Step::C),
    NoteName::natural(Step::D),
    NoteName::sharp(Step::D),
    NoteName::natural(Step::E),
    NoteName::natural(Step::F),
    NoteName::sharp(Step::F),
    NoteName::natural(Step::G),
    NoteName::sharp(Step::G),
    NoteName::natural(Step::A),
    NoteName::sharp(Step::A),
    NoteName::natural(Step::B),
];

// ─── Key signatures ──────────────────────────────────────────────────

/// Major key named by a key signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    C,
    G,
    D,
    A,
    E,
    B,
    FSharp,
    F,
    BFlat,
    EFlat,
    AFlat,
    DFlat,
    GFlat,
}

/// `<fifths>` value to key, for every supported key signature.
pub const FIFTHS_TABLE: [(i32, Key); 13] = [
    (0, Key::C),
    (1, Key::G),
    (2, Key::D),
    (3, Key::A),
    (4, Key::E),
    (5, Key::B),
    (6, Key::FSharp),
    (-1, Key::F),
    (-2, Key::BFlat),
    (-3, Key::EFlat),
    (-4, Key::AFlat),
    (-5, Key::DFlat),
    (-6, Key::GFlat),
];

static SHARP_ORDER: [Step; 6] = [Step::F, Step::C, Step::G, Step::D, Step::A, Step::E];
static FLAT_ORDER: [Step; 6] = [Step::B, Step::E, Step::A, Step::D, Step::G, Step::C];

impl Key {
    pub fn from_fifths(fifths: i32) -> Option<Key> {
        FIFTHS_TABLE
            .iter()
            .find(|(f, _)| *f == fifths)
            .map(|(_, key)| *key)
    }

    pub fn fifths(self) -> i32 {
        FIFTHS_TABLE
            .iter()
            .find(|(_, key)| *key == self)
            .map_or(0, |(f, _)| *f)
    }

    pub fn name(self) -> &'static str {
        match self {
            Key::C => "C",
            Key::G => "G",
            Key::D => "D",
            Key::A => "A",
            Key::E => "E",
            Key::B => "B",
            Key::FSharp => "F#",
            Key::F => "F",
            Key::BFlat => "Bb",
            Key::EFlat => "Eb",
            Key::AFlat => "Ab",
            Key::DFlat => "Db",
            Key::GFlat => "Gb",
        }
    }

    pub fn tonic(self) -> NoteName {
        match self {
            Key::C => NoteName::natural(Step::C),
            Key::G => NoteName::natural(Step::G),
            Key::D => NoteName::natural(Step::D),
            Key::A => NoteName::natural(Step::A),
            Key::E => NoteName::natural(Step::E),
            Key::B => NoteName::natural(Step::B),
            Key::FSharp => NoteName::sharp(Step::F),
            Key::F => NoteName::natural(Step::F),
            Key::BFlat => NoteName::flat(Step::B),
            Key::EFlat => NoteName::flat(Step::E),
            Key::AFlat => NoteName::flat(Step::A),
            Key::DFlat => NoteName::flat(Step::D),
            Key::GFlat => NoteName::flat(Step::G),
        }
    }

    /// The alteration the key applies and the letters it applies to.
    pub fn accidentals(self) -> (Alter, &'static [Step]) {
        let fifths = self.fifths();
        let count = fifths.unsigned_abs() as usize;
        if fifths >= 0 {
            (Alter::Sharp, &SHARP_ORDER[..count])
        } else {
            (Alter::Flat, &FLAT_ORDER[..count])
        }
    }

    /// Semitone offset that moves this key's tonic to C, in `-6..=5`.
    pub fn offset_to_c(self) -> i32 {
        let degree = i32::from(self.tonic().degree());
        if degree <= 6 {
            -degree
        } else {
            12 - degree
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ─── Transposition ───────────────────────────────────────────────────

/// Shift a written pitch by `offset` semitones. The result is spelled
/// with sharps; the octave follows the degree across the C boundary.
pub fn transpose(name: NoteName, octave: i32, offset: i32) -> (NoteName, i32) {
    let shifted = i32::from(name.degree()) + offset;
    let octave = octave + shifted.div_euclid(12);
    // rem_euclid(12) is always in 0..12
    let degree = shifted.rem_euclid(12) as u8;
    (NoteName::from_degree(degree), octave)
}

// ─── Octave marks ────────────────────────────────────────────────────

pub const OCTAVE_UP: char = '\'';
pub const OCTAVE_DOWN: char = ',';

/// Octave 4 has no mark; each octave above adds `'`, each below adds `,`.
pub fn octave_mark(octave: i32) -> String {
    if octave >= 4 {
        std::iter::repeat(OCTAVE_UP).take((octave - 4) as usize).collect()
    } else {
        std::iter::repeat(OCTAVE_DOWN).take((4 - octave) as usize).collect()
    }
}

/// Inverse of [`octave_mark`]. Returns `None` for mixed or foreign marks.
pub fn octave_from_mark(mark: &str) -> Option<i32> {
    let count = mark.chars().count() as i32;
    if mark.chars().all(|c| c == OCTAVE_UP) {
        Some(4 + count)
    } else if mark.chars().all(|c| c == OCTAVE_DOWN) {
        Some(4 - count)
    } else {
        None
    }
}
