//! Library for modeling, simulating, converting and persisting finite-state
//! formalisms manipulated as node/edge graphs.
//!
//! A model is a plain value: a [`Mode`] tag naming one of six formalisms
//! (DFA, NFA, PDA, Turing machine, Mealy, Moore), a set of states and a set
//! of transitions whose symbol specifications are tagged variants keyed by
//! the mode. The crate never retains a model between calls; every engine
//! operation takes the current model by reference and returns fresh data,
//! which keeps each call referentially transparent and lets concurrent
//! simulation sessions run without coordination.
//!
//! Three engines operate on a model. The [`simulation`] engine executes a
//! model against an input string under the exact semantics of its formalism,
//! tracking a *set* of live configurations so nondeterminism, ε-closures,
//! pushdown stacks and unbounded two-way tapes are handled uniformly; the
//! caller drives execution one synchronous step at a time and receives a
//! trace of configuration frames plus a final verdict. The [`conversion`]
//! engine hosts the pure transformations between formalisms: subset
//! construction, DFA minimization by partition refinement and the
//! Mealy/Moore correspondences, all with deterministic output ordering. The
//! [`interchange`] codec persists models in the native `stateforge-v1` JSON
//! schema (losslessly and byte-deterministically) and imports the JFLAP-style
//! XML dialect.
//!
//! How a graph is drawn, where files come from and how errors are presented
//! are caller concerns; state positions are carried through as opaque
//! coordinates and every failure is a typed error.
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

/// The prelude is supposed to make using this package easier. Including
/// everything, i.e. `use stateforge::prelude::*;` should be enough to use
/// the package.
pub mod prelude {
    pub use super::conversion::{
        convert, determinize, mealy_to_moore, minimize, moore_to_mealy, ConversionError,
    };
    pub use super::interchange::{
        decode_json, decode_xml, encode_json, suggested_file_name, InterchangeError,
    };
    pub use super::math;
    pub use super::model::{
        Automaton, Mode, Motion, State, SymbolSpec, Transition, ValidationError,
    };
    pub use super::show::Show;
    pub use super::simulation::{
        simulate, Configuration, PdaAcceptance, RejectCause, Simulation, SimulationError,
        SimulationOptions, StepBudget, StepOutcome, Store, Tape, Trace, Verdict,
    };
}

/// This module contains some definitions of mathematical objects which are
/// used throughout the crate and do not really fit to the top level.
pub mod math;

/// Helper trait for rendering symbols, specifications and configurations in
/// a human readable way.
mod show;
pub use show::Show;

/// The automaton model: modes, states, transitions, symbol specifications
/// and structural validation.
pub mod model;
pub use model::{Automaton, Mode};

/// The simulation engine: caller-stepped execution of a model against an
/// input string, producing configuration frames and a verdict.
pub mod simulation;

/// Pure conversions between formalisms: subset construction, minimization
/// and the Mealy/Moore correspondences.
pub mod conversion;

/// The interchange codec: the native JSON schema and the foreign XML
/// dialect.
pub mod interchange;
