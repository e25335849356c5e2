use thiserror::Error;

use crate::model::{Automaton, Mode, ValidationError};

mod subset;
pub use subset::determinize;

mod partition_refinement;
pub use partition_refinement::minimize;

mod transducer;
pub use transducer::{mealy_to_moore, moore_to_mealy};

/// Abstracts the ways in which a conversion can fail. Conversions are pure:
/// on error the input model is untouched, on success a fresh model is
/// returned and the input is still untouched.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum ConversionError {
    /// The input model failed validation; nothing was transformed.
    #[error("cannot convert invalid model: {0}")]
    Invalid(#[from] ValidationError),
    /// No conversion between the two modes is defined.
    #[error("no conversion from `{from}` to `{to}` is defined")]
    Unsupported {
        /// Mode of the input model.
        from: Mode,
        /// Requested target mode.
        to: Mode,
    },
    /// A Moore state without an output symbol cannot be folded onto its
    /// incoming transitions.
    #[error("state `{0}` carries no output symbol")]
    MissingStateOutput(String),
}

/// Converts `model` into an equivalent model of the `target` mode. Defined
/// pairs are NFA→DFA (subset construction, a DFA input degenerates to a
/// reachable copy), Mealy→Moore and Moore→Mealy; anything else is an
/// [`ConversionError::Unsupported`]. An invalid input model fails validation
/// before any transformation runs.
pub fn convert(model: &Automaton, target: Mode) -> Result<Automaton, ConversionError> {
    model.validate()?;
    match (model.mode, target) {
        (Mode::Nfa | Mode::Dfa, Mode::Dfa) => determinize(model),
        (Mode::Moore, Mode::Mealy) => moore_to_mealy(model),
        (Mode::Mealy, Mode::Moore) => mealy_to_moore(model),
        (from, to) => Err(ConversionError::Unsupported { from, to }),
    }
}
