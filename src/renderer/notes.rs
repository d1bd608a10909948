//! Note and rest tokens.

use super::dialect::{AccidentalPosition, Dialect};
use crate::error::Result;
use crate::model::Note;
use crate::theory::{octave_mark, transpose, Alter, Key};

/// Pitch (or rest) symbol with accidental, octave mark and duration.
pub fn render_basic_note(note: &Note, dialect: &Dialect) -> Result<String> {
    let suffix = dialect.duration_suffix(note.displayed_duration())?;
    if note.rest {
        return Ok(format!("{}{}", dialect.rest, suffix));
    }

    let (mut name, mut octave) = note.written_pitch()?;
    let key = note.key();
    if dialect.transpose_to_c && key != Key::C {
        (name, octave) = transpose(name, octave, key.offset_to_c());
    }

    let accidental = match name.alter {
        Some(Alter::Sharp) => dialect.sharp,
        Some(Alter::Flat) => dialect.flat,
        None => "",
    };

    let mut token = String::new();
    if dialect.accidental_position == AccidentalPosition::BeforePitch {
        token.push_str(accidental);
    }
    token.push(dialect.pitch_symbol(name.step));
    if dialect.accidental_position == AccidentalPosition::AfterPitch {
        token.push_str(accidental);
    }
    token.push_str(&octave_mark(octave));
    token.push_str(&suffix);
    Ok(token)
}

/// Full note token including tie and tuplet brackets.
///
/// A tie stop closes right before the first sustain marker, so a tied
/// note reads as closed at its first continuation.
pub fn render_note(note: &Note, dialect: &Dialect) -> Result<String> {
    let mut token = render_basic_note(note, dialect)?;
    if note.tie.is_start() {
        token.insert(0, '(');
    }
    if note.tuplet.is_start() {
        token.insert_str(0, dialect.tuplet_open);
    }
    if note.tuplet.is_stop() {
        if let Some(close) = dialect.tuplet_close {
            token.push_str(close);
        }
    }
    if note.tie.is_stop() {
        match token.find('-') {
            Some(idx) => token.insert_str(idx, ") "),
            None => token.push(')'),
        }
    }
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::*;
    use crate::theory::Step;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn note(step: Step, octave: i32, duration: u32, key: Key) -> Note {
        Note {
            measure: "1".into(),
            rest: false,
            duration,
            chord: false,
            grace: false,
            tie: Tie::None,
            tuplet: Tuplet::None,
            time_modification: TimeModification::default(),
            pitch: Some(Pitch { step, octave }),
            accidental: None,
            lyric: None,
            staff: None,
            attributes: Arc::new(Attributes {
                divisions: 4,
                key,
                time: TimeSignature { beats: 4, beat_type: 4 },
            }),
        }
    }

    #[test]
    fn classic_tokens() {
        let d = Dialect::CLASSIC;
        assert_eq!(render_note(&note(Step::C, 4, 4, Key::C), &d).unwrap(), "1");
        assert_eq!(render_note(&note(Step::G, 5, 2, Key::C), &d).unwrap(), "5'/");
        assert_eq!(render_note(&note(Step::A, 3, 8, Key::C), &d).unwrap(), "6, -");

        let mut sharp = note(Step::F, 4, 6, Key::C);
        sharp.accidental = Some(Accidental::Sharp);
        assert_eq!(render_note(&sharp, &d).unwrap(), "4#.");

        let mut rest = note(Step::C, 4, 2, Key::C);
        rest.rest = true;
        rest.pitch = None;
        assert_eq!(render_note(&rest, &d).unwrap(), "0/");
    }

    #[test]
    fn classic_keeps_written_pitch_in_other_keys() {
        let d = Dialect::CLASSIC;
        // B in F major is written Bb
        assert_eq!(render_note(&note(Step::B, 4, 4, Key::F), &d).unwrap(), "7$");
    }

    #[test]
    fn guitar_transposes_to_c() {
        let d = Dialect::GUITAR;
        // D major: D4 is the tonic, F#4 the third
        assert_eq!(render_note(&note(Step::D, 4, 4, Key::D), &d).unwrap(), "C1");
        assert_eq!(render_note(&note(Step::F, 4, 2, Key::D), &d).unwrap(), "E1/2");
        // F major: Bb4 becomes F4
        assert_eq!(render_note(&note(Step::B, 4, 4, Key::F), &d).unwrap(), "F1");

        let mut sharp = note(Step::C, 5, 4, Key::C);
        sharp.accidental = Some(Accidental::Sharp);
        assert_eq!(render_note(&sharp, &d).unwrap(), "^C'1");
        let mut flat = note(Step::E, 4, 4, Key::C);
        flat.accidental = Some(Accidental::Flat);
        assert_eq!(render_note(&flat, &d).unwrap(), "_E1");
    }

    #[test]
    fn tie_stop_closes_before_first_sustain_marker() {
        let mut n = note(Step::C, 4, 12, Key::C);
        n.tie = Tie::Stop;
        assert_eq!(render_note(&n, &Dialect::CLASSIC).unwrap(), "1 ) - -");

        let mut dotted = note(Step::C, 4, 6, Key::C);
        dotted.tie = Tie::Stop;
        assert_eq!(render_note(&dotted, &Dialect::CLASSIC).unwrap(), "1.)");
    }

    #[test]
    fn tie_start_and_tuplets() {
        let mut n = note(Step::E, 4, 2, Key::C);
        n.tie = Tie::Start;
        n.tuplet = Tuplet::Start;
        n.time_modification = TimeModification { actual_notes: 3, normal_notes: 2 };
        // 2 ticks at 4 divisions under 3:2 displays as a dotted eighth
        assert_eq!(render_note(&n, &Dialect::CLASSIC).unwrap(), "(y(3./");

        let mut last = note(Step::G, 4, 2, Key::C);
        last.tuplet = Tuplet::Stop;
        last.time_modification = TimeModification { actual_notes: 3, normal_notes: 2 };
        assert_eq!(render_note(&last, &Dialect::CLASSIC).unwrap(), "5./)");
        assert_eq!(render_note(&last, &Dialect::GUITAR).unwrap(), "G3/4");
    }

    #[test]
    fn missing_pitch_is_an_error() {
        let mut n = note(Step::C, 4, 4, Key::C);
        n.pitch = None;
        assert!(render_note(&n, &Dialect::CLASSIC).is_err());
    }
}
