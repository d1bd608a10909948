//! Error types for parsing and rendering.

use thiserror::Error;

/// Attribute field that could not be resolved for a measure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeField {
    Divisions,
    Key,
    Time,
}

impl std::fmt::Display for AttributeField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AttributeField::Divisions => "divisions",
            AttributeField::Key => "key",
            AttributeField::Time => "time",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("MusicXML parse error: {0}")]
    Parse(String),

    #[error("Measure {measure}: {field} not declared and no previous measure to inherit from")]
    MissingAttribute { field: AttributeField, measure: String },

    #[error("Measure {measure}: note does not have a pitch")]
    Pitch { measure: String },

    #[error("Invalid key signature: {0} fifths (expected -6..=6)")]
    InvalidKey(i32),

    #[error("MXL archive error: {0}")]
    Archive(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Render(#[from] RenderError),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("Duration {numer}/{denom} quarters cannot be written with duration suffixes")]
    UnrepresentableDuration { numer: i64, denom: i64 },

    #[error("No tempo given and the first measure declares none")]
    MissingTempo,

    #[error("Score has no measures")]
    NoMeasures,

    #[error("Part index {index} out of range ({count} parts)")]
    PartIndexOutOfRange { index: usize, count: usize },
}

pub type Result<T, E = ConvertError> = std::result::Result<T, E>;
