use thiserror::Error;

use crate::model::{Mode, ValidationError};

mod json;
pub use json::{decode_json, encode_json};

mod xml;
pub use xml::decode_xml;

/// Abstracts the ways in which an import payload can be unusable. Anything
/// semantically inconsistent is reported, never guessed around; only unknown
/// *additional* fields are tolerated for forward compatibility.
#[derive(Debug, Error)]
pub enum InterchangeError {
    /// The payload is not well-formed JSON.
    #[error("could not parse JSON payload: {0}")]
    Json(#[from] serde_json::Error),
    /// The payload is not well-formed XML.
    #[error("could not parse XML payload: {0}")]
    Xml(#[from] roxmltree::Error),
    /// A required field is absent.
    #[error("payload is missing required field `{0}`")]
    MissingField(&'static str),
    /// A field is present but has the wrong shape.
    #[error("field `{field}` has unexpected shape: {reason}")]
    MalformedField {
        /// Name of the offending field or attribute.
        field: &'static str,
        /// What was found instead.
        reason: String,
    },
    /// The mode tag names no known formalism.
    #[error("unknown mode tag `{0}`")]
    UnknownMode(String),
    /// The automaton kind of a foreign payload names no known formalism.
    #[error("unknown automaton kind `{0}`")]
    UnknownKind(String),
    /// A foreign transition carries attributes that contradict the declared
    /// automaton kind, e.g. a stack operation inside a finite automaton.
    #[error("transition {transition} carries attributes inconsistent with kind `{kind}`")]
    InconsistentKind {
        /// The declared automaton kind.
        kind: String,
        /// Position of the transition in the document.
        transition: usize,
    },
    /// The decoded model is structurally broken.
    #[error("imported model is inconsistent: {0}")]
    Model(#[from] ValidationError),
}

/// The conventional file name for persisting a model of the given mode.
pub fn suggested_file_name(mode: Mode) -> String {
    format!("stateforge-{}.json", mode.tag())
}
