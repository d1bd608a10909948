//! MusicXML parser: converts MusicXML XML into the Score data model.
//!
//! Measures of a part are built in order: each one resolves its
//! attribute context from its own `<attributes>` and the context of the
//! measure before it.

use std::sync::Arc;

use roxmltree::{Document, Node};
use tracing::{debug, warn};

use crate::error::{AttributeField, ConvertError, Result};
use crate::model::*;
use crate::theory::{Key, Step};

/// Parse a MusicXML XML string into a Score.
pub fn parse_musicxml(xml: &str) -> Result<Score> {
    // MusicXML files include a DOCTYPE declaration, so we must allow DTDs
    let options = roxmltree::ParsingOptions {
        allow_dtd: true,
        ..Default::default()
    };
    let doc = Document::parse_with_options(xml, options)
        .map_err(|e| ConvertError::Parse(format!("XML parse error: {e}")))?;
    let root = doc.root_element();

    // Verify this is a score-partwise document
    if root.tag_name().name() != "score-partwise" {
        return Err(ConvertError::Parse(format!(
            "Unsupported root element: '{}'. Only 'score-partwise' is supported.",
            root.tag_name().name()
        )));
    }

    let mut score = Score::new();
    score.title = parse_title(&root);
    score.composer = parse_composer(&root);

    if let Some(part_list) = child(&root, "part-list") {
        parse_part_list(&part_list, &mut score)?;
    }

    for part_node in children(&root, "part") {
        parse_part(&part_node, &mut score)?;
    }

    debug!(
        parts = score.parts.len(),
        measures = score.measure_count(),
        "parsed MusicXML score"
    );
    Ok(score)
}

// ─── Work ────────────────────────────────────────────────────────────

fn parse_title(root: &Node) -> Option<String> {
    let work_title = child(root, "work")
        .and_then(|work| child_text(&work, "work-title"))
        .filter(|t| !t.is_empty());
    // <credit> is only a fallback here
    work_title
        .or_else(|| {
            children(root, "credit")
                .find_map(|credit| child_text(&credit, "credit-words"))
                .filter(|t| !t.is_empty())
        })
        .map(String::from)
}

fn parse_composer(root: &Node) -> Option<String> {
    let identification = child(root, "identification")?;
    children(&identification, "creator")
        .find(|c| c.attribute("type") == Some("composer"))
        .and_then(|c| c.text())
        .map(|t| t.trim().to_string())
}

// ─── Part List ───────────────────────────────────────────────────────

fn parse_part_list(node: &Node, score: &mut Score) -> Result<()> {
    for sp in children(node, "score-part") {
        let part = Part {
            id: required_id(&sp)?.to_string(),
            name: child_text(&sp, "part-name").unwrap_or("").to_string(),
            abbreviation: child_text(&sp, "part-abbreviation").map(String::from),
            measures: Vec::new(),
        };
        score.parts.push(part);
    }
    Ok(())
}

fn required_id<'a, 'input: 'a>(node: &Node<'a, 'input>) -> Result<&'a str> {
    node.attribute("id")
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| {
            ConvertError::Parse(format!("<{}> without an id attribute", node.tag_name().name()))
        })
}

// ─── Part (measures) ─────────────────────────────────────────────────

fn parse_part(node: &Node, score: &mut Score) -> Result<()> {
    let part_id = required_id(node)?;

    // Find the matching part from the part-list
    let part = score
        .parts
        .iter_mut()
        .find(|p| p.id == part_id)
        .ok_or_else(|| {
            ConvertError::Parse(format!("Part '{part_id}' is not declared in <part-list>"))
        })?;

    let (measures, _) = children(node, "measure").try_fold(
        (Vec::new(), None::<Arc<Attributes>>),
        |(mut measures, prev), measure_node| -> Result<_> {
            let measure = parse_measure(&measure_node, prev.as_ref())?;
            let attributes = Arc::clone(&measure.attributes);
            measures.push(measure);
            Ok((measures, Some(attributes)))
        },
    )?;

    debug!(part = %part.id, measures = measures.len(), "parsed part");
    part.measures = measures;
    Ok(())
}

// ─── Measure ─────────────────────────────────────────────────────────

fn parse_measure(node: &Node, prev: Option<&Arc<Attributes>>) -> Result<Measure> {
    let number = node
        .attribute("number")
        .map(|n| n.trim().to_string())
        .ok_or_else(|| ConvertError::Parse("<measure> without a number attribute".into()))?;

    let attributes = resolve_attributes(child(node, "attributes").as_ref(), prev, &number)?;

    let notes = children(node, "note")
        .map(|n| parse_note(&n, &number, &attributes))
        .collect::<Result<Vec<_>>>()?;

    Ok(Measure {
        number,
        left_barline: parse_barline(node, "left"),
        right_barline: parse_barline(node, "right"),
        tempo: parse_tempo(node),
        attributes,
        notes,
    })
}

/// `<sound tempo>` inside a `<direction>`, or directly in the measure.
fn parse_tempo(node: &Node) -> Option<f64> {
    let in_direction = children(node, "direction").flat_map(|d| children_vec(&d, "sound"));
    in_direction
        .chain(children(node, "sound"))
        .find_map(|s| s.attribute("tempo"))
        .and_then(|t| t.trim().parse::<f64>().ok())
}

// ─── Attributes ──────────────────────────────────────────────────────

/// Resolve a measure's attribute context. Fields the measure does not
/// declare are inherited from `prev`; the first measure of a part must
/// declare all of them.
fn resolve_attributes(
    node: Option<&Node>,
    prev: Option<&Arc<Attributes>>,
    measure: &str,
) -> Result<Arc<Attributes>> {
    let Some(node) = node else {
        return prev.cloned().ok_or(ConvertError::MissingAttribute {
            field: AttributeField::Divisions,
            measure: measure.to_string(),
        });
    };

    let divisions = parse_divisions(node)?;
    let key = parse_key(node)?;
    let time = parse_time(node)?;

    if divisions.is_none() && key.is_none() && time.is_none() {
        if let Some(prev) = prev {
            return Ok(Arc::clone(prev));
        }
    }

    let missing = |field| ConvertError::MissingAttribute {
        field,
        measure: measure.to_string(),
    };
    let resolved = Attributes {
        divisions: divisions
            .or(prev.map(|p| p.divisions))
            .ok_or_else(|| missing(AttributeField::Divisions))?,
        key: key
            .or(prev.map(|p| p.key))
            .ok_or_else(|| missing(AttributeField::Key))?,
        time: time
            .or(prev.map(|p| p.time))
            .ok_or_else(|| missing(AttributeField::Time))?,
    };
    Ok(Arc::new(resolved))
}

fn parse_divisions(node: &Node) -> Result<Option<u32>> {
    let Some(text) = child_text(node, "divisions") else {
        return Ok(None);
    };
    match text.parse::<u32>() {
        Ok(d) if d > 0 => Ok(Some(d)),
        _ => Err(ConvertError::Parse(format!("Invalid divisions: '{text}'"))),
    }
}

fn parse_key(node: &Node) -> Result<Option<Key>> {
    let Some(text) = child(node, "key").and_then(|k| child_text(&k, "fifths")) else {
        return Ok(None);
    };
    let fifths = text
        .parse::<i32>()
        .map_err(|_| ConvertError::Parse(format!("Invalid fifths: '{text}'")))?;
    Key::from_fifths(fifths)
        .map(Some)
        .ok_or(ConvertError::InvalidKey(fifths))
}

fn parse_time(node: &Node) -> Result<Option<TimeSignature>> {
    let Some(time) = child(node, "time") else {
        return Ok(None);
    };
    let (Some(beats), Some(beat_type)) = (child_text(&time, "beats"), child_text(&time, "beat-type"))
    else {
        return Ok(None);
    };
    let parse = |text: &str| match text.parse::<u32>() {
        Ok(v) if v > 0 => Ok(v),
        _ => Err(ConvertError::Parse(format!("Invalid time signature value: '{text}'"))),
    };
    Ok(Some(TimeSignature {
        beats: parse(beats)?,
        beat_type: parse(beat_type)?,
    }))
}

// ─── Note ────────────────────────────────────────────────────────────

fn parse_note(node: &Node, measure: &str, attributes: &Arc<Attributes>) -> Result<Note> {
    let grace = child(node, "grace").is_some();
    let duration = match child_text(node, "duration") {
        Some(text) => text.parse::<u32>().map_err(|_| {
            ConvertError::Parse(format!("Measure {measure}: invalid note duration '{text}'"))
        })?,
        None if grace => 0,
        None => {
            return Err(ConvertError::Parse(format!(
                "Measure {measure}: note without <duration>"
            )))
        }
    };

    let ties: Vec<Option<&str>> = children(node, "tie").map(|t| t.attribute("type")).collect();
    let tie = Tie::from_flags(ties.contains(&Some("start")), ties.contains(&Some("stop")));

    let time_modification = child(node, "time-modification")
        .map(|tm| parse_time_modification(&tm, measure))
        .transpose()?;
    let tuplet = match time_modification {
        Some(_) => parse_tuplet(node),
        None => Tuplet::None,
    };

    let note = Note {
        measure: measure.to_string(),
        rest: child(node, "rest").is_some(),
        duration,
        chord: child(node, "chord").is_some(),
        grace,
        tie,
        tuplet,
        time_modification: time_modification.unwrap_or_default(),
        pitch: child(node, "pitch").map(|p| parse_pitch(&p)).transpose()?.flatten(),
        accidental: parse_accidental(node),
        lyric: child(node, "lyric").and_then(|l| parse_lyric(&l)),
        staff: child_text(node, "staff").map(String::from),
        attributes: Arc::clone(attributes),
    };

    if note.grace {
        debug!(measure, "grace note will not be rendered");
    }
    Ok(note)
}

fn parse_time_modification(node: &Node, measure: &str) -> Result<TimeModification> {
    let value = |name: &str| {
        child_text(node, name)
            .and_then(|t| t.parse::<u32>().ok())
            .filter(|v| *v > 0)
            .ok_or_else(|| {
                ConvertError::Parse(format!(
                    "Measure {measure}: <time-modification> needs a positive <{name}>"
                ))
            })
    };
    Ok(TimeModification {
        actual_notes: value("actual-notes")?,
        normal_notes: value("normal-notes")?,
    })
}

fn parse_tuplet(node: &Node) -> Tuplet {
    let types: Vec<&str> = children(node, "notations")
        .flat_map(|n| children_vec(&n, "tuplet"))
        .filter_map(|t| t.attribute("type"))
        .collect();
    match (types.contains(&"start"), types.contains(&"stop")) {
        (true, true) => Tuplet::Both,
        (true, false) => Tuplet::Start,
        (false, true) => Tuplet::Stop,
        (false, false) => Tuplet::Inner,
    }
}

/// A pitch without `<step>` or `<octave>` is kept as no pitch; asking
/// for it later is a pitch error.
fn parse_pitch(node: &Node) -> Result<Option<Pitch>> {
    let (Some(step), Some(octave)) = (child_text(node, "step"), child_text(node, "octave")) else {
        return Ok(None);
    };
    let step = Step::from_letter(step)
        .ok_or_else(|| ConvertError::Parse(format!("Invalid pitch step: '{step}'")))?;
    let octave = octave
        .parse::<i32>()
        .map_err(|_| ConvertError::Parse(format!("Invalid octave: '{octave}'")))?;
    Ok(Some(Pitch { step, octave }))
}

fn parse_accidental(node: &Node) -> Option<Accidental> {
    match child_text(node, "accidental")? {
        "sharp" => Some(Accidental::Sharp),
        "flat" => Some(Accidental::Flat),
        "natural" => Some(Accidental::Natural),
        other => {
            warn!(accidental = other, "unsupported accidental ignored");
            None
        }
    }
}

fn parse_lyric(node: &Node) -> Option<Lyric> {
    let text = child_text(node, "text").filter(|t| !t.is_empty())?;
    Some(Lyric {
        text: text.to_string(),
        syllabic: child_text(node, "syllabic").map(String::from),
    })
}

// ─── Barline ─────────────────────────────────────────────────────────

/// Barline type at `location`. A barline without `<bar-style>` counts
/// as normal even when it carries a repeat.
fn parse_barline(node: &Node, location: &str) -> BarlineType {
    let barlines: Vec<Node> = children(node, "barline")
        .filter(|b| b.attribute("location").unwrap_or("right") == location)
        .collect();

    let Some(bar_style) = barlines.iter().find_map(|b| child_text(b, "bar-style")) else {
        return BarlineType::Normal;
    };
    if barlines.iter().any(|b| child(b, "repeat").is_some()) {
        return BarlineType::Repeat;
    }
    match bar_style {
        "light-light" => BarlineType::Double,
        "light-heavy" => BarlineType::Final,
        _ => BarlineType::Normal,
    }
}

// ─── Helpers ─────────────────────────────────────────────────────────

fn children<'a, 'input: 'a>(
    node: &Node<'a, 'input>,
    name: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.children()
        .filter(move |n| n.is_element() && n.tag_name().name() == name)
}

fn children_vec<'a, 'input: 'a>(node: &Node<'a, 'input>, name: &str) -> Vec<Node<'a, 'input>> {
    node.children()
        .filter(|n| n.is_element() && n.tag_name().name() == name)
        .collect()
}

fn child<'a, 'input: 'a>(node: &Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|n| n.is_element() && n.tag_name().name() == name)
}

fn child_text<'a, 'input: 'a>(node: &Node<'a, 'input>, name: &str) -> Option<&'a str> {
    child(node, name).and_then(|n| n.text()).map(str::trim)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score_with_measures(measures: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<score-partwise version="3.1">
  <part-list><score-part id="P1"><part-name>Voice</part-name></score-part></part-list>
  <part id="P1">{measures}</part>
</score-partwise>"#
        )
    }

    const FIRST: &str = r#"<measure number="1">
      <attributes><divisions>2</divisions><key><fifths>2</fifths></key>
        <time><beats>3</beats><beat-type>4</beat-type></time></attributes>
      <note><pitch><step>F</step><octave>4</octave></pitch><duration>2</duration></note>
    </measure>"#;

    #[test]
    fn rejects_non_partwise_root() {
        let err = parse_musicxml("<score-timewise/>").unwrap_err();
        assert!(matches!(err, ConvertError::Parse(_)));
    }

    #[test]
    fn measures_without_attributes_share_previous_context() {
        let xml = score_with_measures(&format!(
            r#"{FIRST}<measure number="2">
              <note><rest/><duration>2</duration></note></measure>"#
        ));
        let score = parse_musicxml(&xml).unwrap();
        let measures = &score.parts[0].measures;
        assert_eq!(measures.len(), 2);
        assert!(Arc::ptr_eq(&measures[0].attributes, &measures[1].attributes));
        assert_eq!(measures[1].attributes.key, Key::D);
        assert_eq!(measures[1].attributes.time, TimeSignature { beats: 3, beat_type: 4 });
    }

    #[test]
    fn partial_attributes_inherit_missing_fields() {
        let xml = score_with_measures(&format!(
            r#"{FIRST}<measure number="2">
              <attributes><key><fifths>-1</fifths></key></attributes>
              <note><rest/><duration>2</duration></note></measure>"#
        ));
        let score = parse_musicxml(&xml).unwrap();
        let attrs = &score.parts[0].measures[1].attributes;
        assert_eq!(attrs.key, Key::F);
        assert_eq!(attrs.divisions, 2);
        assert_eq!(attrs.time.beats, 3);
    }

    #[test]
    fn first_measure_must_declare_everything() {
        let xml = score_with_measures(
            r#"<measure number="1"><attributes><divisions>1</divisions>
               <key><fifths>0</fifths></key></attributes></measure>"#,
        );
        match parse_musicxml(&xml) {
            Err(ConvertError::MissingAttribute { field, measure }) => {
                assert_eq!(field, AttributeField::Time);
                assert_eq!(measure, "1");
            }
            other => panic!("expected missing attribute, got {other:?}"),
        }

        let xml = score_with_measures(r#"<measure number="1"></measure>"#);
        assert!(matches!(
            parse_musicxml(&xml),
            Err(ConvertError::MissingAttribute { field: AttributeField::Divisions, .. })
        ));
    }

    #[test]
    fn key_outside_table_is_invalid() {
        let xml = score_with_measures(
            r#"<measure number="1"><attributes><divisions>1</divisions>
               <key><fifths>7</fifths></key>
               <time><beats>4</beats><beat-type>4</beat-type></time></attributes></measure>"#,
        );
        assert!(matches!(parse_musicxml(&xml), Err(ConvertError::InvalidKey(7))));
    }

    #[test]
    fn note_flags() {
        let xml = score_with_measures(
            r#"<measure number="1">
              <attributes><divisions>6</divisions><key><fifths>0</fifths></key>
                <time><beats>2</beats><beat-type>4</beat-type></time></attributes>
              <note><pitch><step>E</step><octave>5</octave></pitch><duration>2</duration>
                <tie type="stop"/><tie type="start"/>
                <time-modification><actual-notes>3</actual-notes><normal-notes>2</normal-notes></time-modification>
                <accidental>flat</accidental><staff>1</staff>
                <notations><tuplet type="start"/></notations>
                <lyric number="1"><syllabic>begin</syllabic><text>Hal</text></lyric></note>
              <note><chord/><pitch><step>G</step><octave>5</octave></pitch><duration>2</duration></note>
              <note><grace/><pitch><step>D</step><octave>5</octave></pitch></note>
            </measure>"#,
        );
        let score = parse_musicxml(&xml).unwrap();
        let notes = &score.parts[0].measures[0].notes;
        assert_eq!(notes.len(), 3);

        let n = &notes[0];
        assert_eq!(n.tie, Tie::Both);
        assert_eq!(n.tuplet, Tuplet::Start);
        assert_eq!(n.time_modification, TimeModification { actual_notes: 3, normal_notes: 2 });
        assert_eq!(n.accidental, Some(Accidental::Flat));
        assert_eq!(n.staff.as_deref(), Some("1"));
        assert_eq!(n.pitch, Some(Pitch { step: Step::E, octave: 5 }));
        let lyric = n.lyric.as_ref().unwrap();
        assert_eq!(lyric.text, "Hal");
        assert!(lyric.is_continued());

        assert!(notes[1].chord);
        assert_eq!(notes[1].tuplet, Tuplet::None);
        assert!(notes[2].grace);
        assert_eq!(notes[2].duration, 0);
    }

    #[test]
    fn note_without_duration_is_a_parse_error() {
        let xml = score_with_measures(
            r#"<measure number="1">
              <attributes><divisions>1</divisions><key><fifths>0</fifths></key>
                <time><beats>4</beats><beat-type>4</beat-type></time></attributes>
              <note><pitch><step>C</step><octave>4</octave></pitch></note></measure>"#,
        );
        assert!(matches!(parse_musicxml(&xml), Err(ConvertError::Parse(_))));
    }

    #[test]
    fn barline_types() {
        let xml = score_with_measures(&format!(
            r#"{FIRST}
            <measure number="2">
              <barline location="left"><bar-style>heavy-light</bar-style><repeat direction="forward"/></barline>
              <barline location="right"><bar-style>light-light</bar-style></barline>
            </measure>
            <measure number="3">
              <barline><bar-style>light-heavy</bar-style></barline>
            </measure>
            <measure number="4">
              <barline location="right"><repeat direction="backward"/></barline>
            </measure>"#
        ));
        let score = parse_musicxml(&xml).unwrap();
        let m = &score.parts[0].measures;
        assert_eq!(m[0].left_barline, BarlineType::Normal);
        assert_eq!(m[1].left_barline, BarlineType::Repeat);
        assert_eq!(m[1].right_barline, BarlineType::Double);
        assert_eq!(m[2].right_barline, BarlineType::Final);
        // a repeat without bar-style stays a plain barline
        assert_eq!(m[3].right_barline, BarlineType::Normal);
    }

    #[test]
    fn title_falls_back_to_credit() {
        let xml = r#"<score-partwise>
          <credit page="1"><credit-words>From Credit</credit-words></credit>
          <identification><creator type="lyricist">L</creator><creator type="composer">Someone</creator></identification>
          <part-list/>
        </score-partwise>"#;
        let score = parse_musicxml(xml).unwrap();
        assert_eq!(score.title.as_deref(), Some("From Credit"));
        assert_eq!(score.composer.as_deref(), Some("Someone"));
    }

    #[test]
    fn tempo_from_direction_sound() {
        let xml = score_with_measures(
            r#"<measure number="1">
              <attributes><divisions>1</divisions><key><fifths>0</fifths></key>
                <time><beats>4</beats><beat-type>4</beat-type></time></attributes>
              <direction placement="above"><direction-type><words>Allegro</words></direction-type>
                <sound tempo="132"/></direction>
            </measure>"#,
        );
        let score = parse_musicxml(&xml).unwrap();
        assert_eq!(score.initial_tempo(), Some(132.0));
    }

    #[test]
    fn measure_labels_are_kept_for_errors() {
        let xml = score_with_measures(
            r#"<measure number="X1" implicit="yes">
              <note><rest/><duration>1</duration></note></measure>"#,
        );
        match parse_musicxml(&xml) {
            Err(err @ ConvertError::MissingAttribute { .. }) => {
                assert!(err.to_string().starts_with("Measure X1:"), "{err}");
            }
            other => panic!("expected missing attribute, got {other:?}"),
        }

        let xml = score_with_measures(&format!(
            r#"{FIRST}<measure number="X1" implicit="yes">
              <note><rest/><duration>2</duration></note></measure>"#
        ));
        let score = parse_musicxml(&xml).unwrap();
        assert_eq!(score.parts[0].measures[1].number, "X1");
        assert_eq!(score.parts[0].measures[1].notes[0].measure, "X1");

        let xml = score_with_measures("<measure><attributes/></measure>");
        assert!(matches!(parse_musicxml(&xml), Err(ConvertError::Parse(_))));
    }

    #[test]
    fn parts_need_an_id() {
        let xml = r#"<score-partwise>
          <part-list><score-part><part-name>A</part-name></score-part>
            <score-part><part-name>B</part-name></score-part></part-list>
          <part/><part/></score-partwise>"#;
        match parse_musicxml(xml) {
            Err(ConvertError::Parse(msg)) => assert!(msg.contains("<score-part>"), "{msg}"),
            other => panic!("expected parse error, got {other:?}"),
        }

        let xml = r#"<score-partwise>
          <part-list><score-part id="P1"><part-name>A</part-name></score-part></part-list>
          <part/></score-partwise>"#;
        match parse_musicxml(xml) {
            Err(ConvertError::Parse(msg)) => assert!(msg.contains("<part>"), "{msg}"),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn undeclared_part_is_rejected() {
        let xml = r#"<score-partwise><part-list/><part id="P9"/></score-partwise>"#;
        assert!(matches!(parse_musicxml(xml), Err(ConvertError::Parse(_))));
    }
}
