use crate::show::Show;
use itertools::Itertools;

mod indexed;
pub(crate) use indexed::IndexedAutomaton;

mod validation;
pub use validation::ValidationError;

/// The formalism under which a model is interpreted. Every engine operation
/// pattern-matches on this tag, there is no dynamic dispatch involved.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Mode {
    /// Deterministic finite automaton.
    Dfa,
    /// Nondeterministic finite automaton, may contain ε-transitions.
    Nfa,
    /// Pushdown automaton with a single unbounded stack.
    Pda,
    /// Turing machine with a single unbounded two-way tape.
    Tm,
    /// Finite-state transducer emitting one output symbol per transition.
    Mealy,
    /// Finite-state transducer emitting one output symbol per visited state.
    Moore,
}

impl Mode {
    /// The lowercase tag used by the native interchange format.
    pub fn tag(self) -> &'static str {
        match self {
            Mode::Dfa => "dfa",
            Mode::Nfa => "nfa",
            Mode::Pda => "pda",
            Mode::Tm => "tm",
            Mode::Mealy => "mealy",
            Mode::Moore => "moore",
        }
    }

    /// Inverse of [`Mode::tag`]. Returns `None` for unknown tags.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "dfa" => Some(Mode::Dfa),
            "nfa" => Some(Mode::Nfa),
            "pda" => Some(Mode::Pda),
            "tm" => Some(Mode::Tm),
            "mealy" => Some(Mode::Mealy),
            "moore" => Some(Mode::Moore),
            _ => None,
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// Direction in which a Turing machine moves its head after writing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Motion {
    /// Move the head one cell to the left.
    Left,
    /// Move the head one cell to the right.
    Right,
    /// Keep the head where it is.
    Stay,
}

impl Show for Motion {
    fn show(&self) -> String {
        match self {
            Motion::Left => "L".to_string(),
            Motion::Right => "R".to_string(),
            Motion::Stay => "S".to_string(),
        }
    }
}

/// A single symbol specification attached to a transition. Which variant is
/// permitted depends on the [`Mode`] of the containing model; `validate`
/// rejects mismatches. A transition carrying several specifications is a
/// compact encoding of parallel edges sharing endpoints, the engines expand
/// them to independent edges before running.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum SymbolSpec {
    /// A plain read symbol for DFA/NFA/Moore transitions. `None` is the
    /// ε marker and is only permitted on NFA models.
    Char {
        /// Symbol consumed from the input, `None` consumes nothing.
        read: Option<char>,
    },
    /// A pushdown specification. The pop symbol must match the stack top for
    /// the transition to be eligible; the push sequence is applied in order,
    /// so its last element ends up on top of the stack.
    Stack {
        /// Symbol consumed from the input, `None` consumes nothing.
        read: Option<char>,
        /// Symbol that must be popped off the stack, `None` pops nothing.
        pop: Option<char>,
        /// Symbols pushed after popping, in push order.
        push: Vec<char>,
    },
    /// A tape specification. `None` stands for the blank symbol that fills
    /// all unvisited cells.
    Tape {
        /// Symbol the head must currently read for the transition to apply.
        read: Option<char>,
        /// Symbol written to the cell under the head.
        write: Option<char>,
        /// Head movement applied after writing.
        motion: Motion,
    },
    /// A Mealy specification, consuming one input symbol and emitting one
    /// output symbol.
    Output {
        /// Symbol consumed from the input.
        read: char,
        /// Symbol appended to the produced output.
        emit: char,
    },
}

impl SymbolSpec {
    /// The input symbol this specification consumes, if any.
    pub fn read(&self) -> Option<char> {
        match self {
            SymbolSpec::Char { read } | SymbolSpec::Stack { read, .. } => *read,
            SymbolSpec::Tape { read, .. } => *read,
            SymbolSpec::Output { read, .. } => Some(*read),
        }
    }

    /// Short name of the variant, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            SymbolSpec::Char { .. } => "read",
            SymbolSpec::Stack { .. } => "stack",
            SymbolSpec::Tape { .. } => "tape",
            SymbolSpec::Output { .. } => "output",
        }
    }

    /// Whether this specification shape is permitted under the given mode.
    pub fn compatible_with(&self, mode: Mode) -> bool {
        matches!(
            (mode, self),
            (Mode::Dfa | Mode::Moore, SymbolSpec::Char { read: Some(_) })
                | (Mode::Nfa, SymbolSpec::Char { .. })
                | (Mode::Pda, SymbolSpec::Stack { .. })
                | (Mode::Tm, SymbolSpec::Tape { .. })
                | (Mode::Mealy, SymbolSpec::Output { .. })
        )
    }
}

impl Show for SymbolSpec {
    fn show(&self) -> String {
        match self {
            SymbolSpec::Char { read } => read.show(),
            SymbolSpec::Stack { read, pop, push } => {
                format!("{},{};{}", read.show(), pop.show(), push.iter().join(""))
            }
            SymbolSpec::Tape {
                read,
                write,
                motion,
            } => format!("{}/{},{}", read.show(), write.show(), motion.show()),
            SymbolSpec::Output { read, emit } => format!("{}/{}", read, emit),
        }
    }
}

/// A state of the model. The position is opaque to every engine, it is carried
/// through conversions and the codecs for display purposes only.
#[derive(Clone, Debug, PartialEq)]
pub struct State {
    /// Identifier, unique within a model.
    pub id: String,
    /// Display label.
    pub label: String,
    /// Horizontal display coordinate, never interpreted.
    pub x: f64,
    /// Vertical display coordinate, never interpreted.
    pub y: f64,
    /// Whether this is the designated initial state. Exactly one state per
    /// model may carry this flag.
    pub initial: bool,
    /// Whether this state accepts.
    pub accepting: bool,
    /// Output symbol emitted when a Moore machine visits this state. A state
    /// without an output emits nothing.
    pub output: Option<char>,
}

impl State {
    /// Creates a state with the given id, which doubles as its label.
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            label: id.clone(),
            id,
            x: 0.0,
            y: 0.0,
            initial: false,
            accepting: false,
            output: None,
        }
    }

    /// Sets the display label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Sets the display position.
    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    /// Marks this state as the initial one.
    pub fn initial(mut self) -> Self {
        self.initial = true;
        self
    }

    /// Marks this state as accepting.
    pub fn accepting(mut self) -> Self {
        self.accepting = true;
        self
    }

    /// Attaches a Moore output symbol.
    pub fn with_output(mut self, output: char) -> Self {
        self.output = Some(output);
        self
    }
}

/// A transition between two states, carrying one or more symbol
/// specifications.
#[derive(Clone, Debug, PartialEq)]
pub struct Transition {
    /// Identifier, unique within a model.
    pub id: String,
    /// Id of the source state.
    pub from: String,
    /// Id of the target state.
    pub to: String,
    /// Parallel symbol specifications, expanded to independent edges by the
    /// engines.
    pub symbols: Vec<SymbolSpec>,
}

impl Transition {
    /// Creates a transition between the given states.
    pub fn new(
        id: impl Into<String>,
        from: impl Into<String>,
        to: impl Into<String>,
        symbols: impl IntoIterator<Item = SymbolSpec>,
    ) -> Self {
        Self {
            id: id.into(),
            from: from.into(),
            to: to.into(),
            symbols: symbols.into_iter().collect(),
        }
    }
}

/// A complete automaton model: a mode tag, a set of states and a set of
/// transitions between them. The vectors define the model's canonical
/// iteration order, which the codecs and conversions rely on for
/// deterministic output.
///
/// The model is owned by the caller; every engine operation takes it by
/// immutable reference and returns new data.
#[derive(Clone, Debug, PartialEq)]
pub struct Automaton {
    /// The formalism this model is interpreted under.
    pub mode: Mode,
    /// States, in canonical order.
    pub states: Vec<State>,
    /// Transitions, in canonical order.
    pub transitions: Vec<Transition>,
}

impl Automaton {
    /// Creates an empty model of the given mode.
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            states: Vec::new(),
            transitions: Vec::new(),
        }
    }

    /// Appends a state, returning `self` for chaining.
    pub fn with_state(mut self, state: State) -> Self {
        self.states.push(state);
        self
    }

    /// Appends a transition, returning `self` for chaining.
    pub fn with_transition(mut self, transition: Transition) -> Self {
        self.transitions.push(transition);
        self
    }

    /// Looks up a state by id.
    pub fn state(&self, id: &str) -> Option<&State> {
        self.states.iter().find(|s| s.id == id)
    }

    /// The designated initial state, if exactly one exists.
    pub fn initial_state(&self) -> Option<&State> {
        let mut initial = self.states.iter().filter(|s| s.initial);
        match (initial.next(), initial.next()) {
            (Some(state), None) => Some(state),
            _ => None,
        }
    }
}
