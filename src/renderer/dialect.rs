//! Output dialects. Both share one rendering algorithm and differ only
//! in the symbol tables and flags held here.

use num_rational::Ratio;

use super::duration::Suffix;
use crate::error::RenderError;
use crate::theory::Step;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PitchSymbols {
    /// `1`–`7` for C–B
    Numbers,
    /// `C`–`B`
    Letters,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccidentalPosition {
    BeforePitch,
    AfterPitch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationStyle {
    /// `/` halves, `.` for a dotted quarter, ` -` adds a quarter
    Markers,
    /// Reduced fraction of quarter notes, e.g. `1/2` or `3`
    Fraction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dialect {
    pub name: &'static str,
    pub pitch_symbols: PitchSymbols,
    pub rest: &'static str,
    pub sharp: &'static str,
    pub flat: &'static str,
    pub accidental_position: AccidentalPosition,
    /// Rewrite every key as C before picking symbols
    pub transpose_to_c: bool,
    pub duration: DurationStyle,
    pub tuplet_open: &'static str,
    pub tuplet_close: Option<&'static str>,
    /// Emit a `W:` lyric line under each system
    pub lyrics: bool,
    pub measures_per_system: usize,
}

impl Dialect {
    /// jianpu99 text format.
    pub const CLASSIC: Dialect = Dialect {
        name: "jianpu99",
        pitch_symbols: PitchSymbols::Numbers,
        rest: "0",
        sharp: "#",
        flat: "$",
        accidental_position: AccidentalPosition::AfterPitch,
        transpose_to_c: false,
        duration: DurationStyle::Markers,
        tuplet_open: "(y",
        tuplet_close: Some(")"),
        lyrics: false,
        measures_per_system: 5,
    };

    /// byguitar text format, also used for each voice of a jcx score.
    pub const GUITAR: Dialect = Dialect {
        name: "byguitar",
        pitch_symbols: PitchSymbols::Letters,
        rest: "z",
        sharp: "^",
        flat: "_",
        accidental_position: AccidentalPosition::BeforePitch,
        transpose_to_c: true,
        duration: DurationStyle::Fraction,
        tuplet_open: "(3",
        tuplet_close: None,
        lyrics: true,
        measures_per_system: 2,
    };

    pub fn pitch_symbol(&self, step: Step) -> char {
        match self.pitch_symbols {
            PitchSymbols::Numbers => step.number(),
            PitchSymbols::Letters => step.letter(),
        }
    }

    pub fn duration_suffix(&self, quarters: Ratio<i64>) -> Result<String, RenderError> {
        match self.duration {
            DurationStyle::Markers => Ok(Suffix::for_duration(quarters)?.to_string()),
            DurationStyle::Fraction => {
                if quarters <= Ratio::from_integer(0) {
                    return Err(RenderError::UnrepresentableDuration {
                        numer: *quarters.numer(),
                        denom: *quarters.denom(),
                    });
                }
                Ok(quarters.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fraction_suffixes_are_reduced() {
        let d = Dialect::GUITAR;
        assert_eq!(d.duration_suffix(Ratio::new(2, 4)).unwrap(), "1/2");
        assert_eq!(d.duration_suffix(Ratio::new(4, 4)).unwrap(), "1");
        assert_eq!(d.duration_suffix(Ratio::new(6, 2)).unwrap(), "3");
        assert_eq!(d.duration_suffix(Ratio::new(3, 2)).unwrap(), "3/2");
        assert!(d.duration_suffix(Ratio::new(0, 2)).is_err());
    }

    #[test]
    fn pitch_symbols() {
        assert_eq!(Dialect::CLASSIC.pitch_symbol(Step::A), '6');
        assert_eq!(Dialect::GUITAR.pitch_symbol(Step::A), 'A');
    }
}
