//! Duration suffix grammar for the marker dialect.
//!
//! ```text
//! d <  1    suffix(2d) "/"
//! d == 1    ""
//! d == 3/2  "."
//! d >  1    " -" suffix(d - 1)
//! ```
//!
//! The grammar only terminates for dyadic durations (power-of-two
//! denominator) and writes one marker per quarter, so non-dyadic
//! durations and those over [`MAX_QUARTERS`] are rejected up front.

use std::fmt;

use num_rational::Ratio;

use crate::error::RenderError;

/// Longest duration, in quarters, the marker grammar will spell out.
pub const MAX_QUARTERS: i64 = 4096;

/// One step of the grammar, applied around everything after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    /// Half of the rest, written as a trailing `/`
    Halve,
    /// One quarter followed by the rest, written as a leading ` -`
    Sustain,
}

/// A derivation of the grammar: markers outermost first, ending in a
/// plain or dotted quarter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suffix {
    markers: Vec<Marker>,
    dotted: bool,
}

impl Suffix {
    pub fn for_duration(quarters: Ratio<i64>) -> Result<Suffix, RenderError> {
        let dyadic = u64::try_from(*quarters.denom()).is_ok_and(u64::is_power_of_two);
        let in_range = *quarters.numer() > 0 && quarters <= Ratio::from_integer(MAX_QUARTERS);
        if !in_range || !dyadic {
            return Err(RenderError::UnrepresentableDuration {
                numer: *quarters.numer(),
                denom: *quarters.denom(),
            });
        }
        Ok(Self::build(quarters))
    }

    fn build(mut quarters: Ratio<i64>) -> Suffix {
        let one = Ratio::from_integer(1);
        let mut markers = Vec::new();
        loop {
            if quarters < one {
                markers.push(Marker::Halve);
                quarters *= 2;
            } else if quarters == one {
                return Suffix { markers, dotted: false };
            } else if quarters == Ratio::new(3, 2) {
                return Suffix { markers, dotted: true };
            } else {
                markers.push(Marker::Sustain);
                quarters -= one;
            }
        }
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    /// Duration in quarter notes this suffix stands for.
    pub fn quarters(&self) -> Ratio<i64> {
        let base = if self.dotted { Ratio::new(3, 2) } else { Ratio::from_integer(1) };
        self.markers.iter().rev().fold(base, |q, marker| match marker {
            Marker::Halve => q / 2,
            Marker::Sustain => q + 1,
        })
    }

    fn count(&self, marker: Marker) -> usize {
        self.markers.iter().filter(|m| **m == marker).count()
    }
}

// Sustains always lead and halvings always trail, whatever their nesting.
impl fmt::Display for Suffix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&" -".repeat(self.count(Marker::Sustain)))?;
        if self.dotted {
            f.write_str(".")?;
        }
        f.write_str(&"/".repeat(self.count(Marker::Halve)))
    }
}
