use thiserror::Error;

use super::{Automaton, Mode};
use crate::math::Set;
use crate::show::Show;

/// Abstracts the ways in which a model can be structurally inconsistent.
/// `validate` reports the first violation it finds; callers are expected to
/// re-validate after every fix.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum ValidationError {
    /// A transition carries a symbol specification whose shape does not fit
    /// the model's mode, e.g. a stack specification on a DFA.
    #[error("transition `{transition}` carries {kind} spec `{spec}`, incompatible with mode `{mode}`")]
    IncompatibleSymbolSpec {
        /// Id of the offending transition.
        transition: String,
        /// The model's mode.
        mode: Mode,
        /// Variant name of the offending specification.
        kind: &'static str,
        /// Rendering of the offending specification.
        spec: String,
    },
    /// A transition endpoint references a state id that does not exist.
    #[error("transition `{transition}` references missing state `{state}`")]
    DanglingEndpoint {
        /// Id of the offending transition.
        transition: String,
        /// The referenced but missing state id.
        state: String,
    },
    /// The model does not have exactly one initial state.
    #[error("expected exactly one initial state, found {0}")]
    InitialStateCount(usize),
    /// Two states share an id.
    #[error("duplicate state id `{0}`")]
    DuplicateStateId(String),
    /// Two transitions share an id.
    #[error("duplicate transition id `{0}`")]
    DuplicateTransitionId(String),
}

impl Automaton {
    /// Verifies the structural invariants of the model, in order: symbol
    /// specifications fit the mode, transition endpoints exist, exactly one
    /// state is initial, and state/transition ids are unique. Pure
    /// inspection, fails fast on the first violation.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for transition in &self.transitions {
            for spec in &transition.symbols {
                if !spec.compatible_with(self.mode) {
                    return Err(ValidationError::IncompatibleSymbolSpec {
                        transition: transition.id.clone(),
                        mode: self.mode,
                        kind: spec.kind(),
                        spec: spec.show(),
                    });
                }
            }
        }

        let known: Set<&str> = self.states.iter().map(|s| s.id.as_str()).collect();
        for transition in &self.transitions {
            for endpoint in [&transition.from, &transition.to] {
                if !known.contains(endpoint.as_str()) {
                    return Err(ValidationError::DanglingEndpoint {
                        transition: transition.id.clone(),
                        state: endpoint.clone(),
                    });
                }
            }
        }

        let initial = self.states.iter().filter(|s| s.initial).count();
        if initial != 1 {
            return Err(ValidationError::InitialStateCount(initial));
        }

        let mut seen = Set::with_capacity(self.states.len());
        for state in &self.states {
            if !seen.insert(state.id.as_str()) {
                return Err(ValidationError::DuplicateStateId(state.id.clone()));
            }
        }
        let mut seen = Set::with_capacity(self.transitions.len());
        for transition in &self.transitions {
            if !seen.insert(transition.id.as_str()) {
                return Err(ValidationError::DuplicateTransitionId(transition.id.clone()));
            }
        }

        Ok(())
    }
}
