//! Voices: parts, or single staves of multi-staff parts.

use tracing::debug;

use crate::model::{Measure, Note, Score};

/// A part as rendered, optionally restricted to one staff.
#[derive(Debug, Clone)]
pub struct Voice<'a> {
    /// Part id, or `{partId}-{staff}` for a split staff
    pub id: String,
    pub name: String,
    pub measures: &'a [Measure],
    pub staff: Option<String>,
}

impl<'a> Voice<'a> {
    /// Notes of `measure` on this voice's staff, chords and grace notes included.
    pub fn notes<'m>(&'m self, measure: &'m Measure) -> impl Iterator<Item = &'m Note> + 'm {
        measure
            .notes
            .iter()
            .filter(move |n| match &self.staff {
                Some(staff) => n.staff.as_ref() == Some(staff),
                None => true,
            })
    }

    /// Notes that produce a token: no chord tones, no grace notes.
    pub fn rendered_notes<'m>(&'m self, measure: &'m Measure) -> impl Iterator<Item = &'m Note> + 'm {
        self.notes(measure).filter(|n| !n.chord && !n.grace)
    }

    /// Measures `begin..end`, clamped to what this voice has.
    pub fn span(&self, begin: usize, end: usize) -> &'a [Measure] {
        let len = self.measures.len();
        &self.measures[begin.min(len)..end.min(len)]
    }
}

/// One voice per part; a part whose first measure names more than one
/// staff becomes one voice per staff.
pub fn split_staves(score: &Score) -> Vec<Voice<'_>> {
    let mut voices = Vec::new();
    for part in &score.parts {
        let staves = part
            .measures
            .first()
            .map(Measure::staves)
            .unwrap_or_default();

        if staves.len() > 1 {
            debug!(part = %part.id, staves = ?staves, "splitting part by staff");
            for staff in staves {
                voices.push(Voice {
                    id: format!("{}-{}", part.id, staff),
                    name: part.name.clone(),
                    measures: &part.measures,
                    staff: Some(staff),
                });
            }
        } else {
            voices.push(Voice {
                id: part.id.clone(),
                name: part.name.clone(),
                measures: &part.measures,
                staff: None,
            });
        }
    }
    voices
}
