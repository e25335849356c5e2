use crate::math::OrderedMap;
use crate::model::Motion;
use crate::show::Show;
use itertools::Itertools;

/// A sparse two-way unbounded tape. Only written cells are stored; every
/// other cell reads as the blank symbol. Cell indices grow to the right and
/// are negative to the left of the cell the head started on.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Tape {
    cells: OrderedMap<i64, char>,
    head: i64,
}

impl Tape {
    /// Creates a tape holding the given input starting at cell 0, with the
    /// head on cell 0.
    pub fn with_input<I: IntoIterator<Item = char>>(input: I) -> Self {
        Self {
            cells: input
                .into_iter()
                .enumerate()
                .map(|(i, c)| (i as i64, c))
                .collect(),
            head: 0,
        }
    }

    /// The symbol under the head, `None` for a blank cell.
    pub fn read(&self) -> Option<char> {
        self.cells.get(&self.head).copied()
    }

    /// Writes the given symbol to the cell under the head; writing `None`
    /// blanks the cell.
    pub fn write(&mut self, symbol: Option<char>) {
        match symbol {
            Some(c) => {
                self.cells.insert(self.head, c);
            }
            None => {
                self.cells.remove(&self.head);
            }
        }
    }

    /// Moves the head one cell in the given direction.
    pub fn shift(&mut self, motion: Motion) {
        self.head += match motion {
            Motion::Left => -1,
            Motion::Right => 1,
            Motion::Stay => 0,
        };
    }

    /// The current head position.
    pub fn head(&self) -> i64 {
        self.head
    }

    /// The smallest and largest written cell index, `None` for an all-blank
    /// tape.
    pub fn written_span(&self) -> Option<(i64, i64)> {
        match (self.cells.keys().next(), self.cells.keys().next_back()) {
            (Some(&lo), Some(&hi)) => Some((lo, hi)),
            _ => None,
        }
    }
}

impl Show for Tape {
    fn show(&self) -> String {
        let (lo, hi) = self
            .written_span()
            .map_or((self.head, self.head), |(lo, hi)| {
                (lo.min(self.head), hi.max(self.head))
            });
        (lo..=hi)
            .map(|i| {
                let cell = self.cells.get(&i).copied().unwrap_or('_');
                if i == self.head {
                    format!("[{}]", cell)
                } else {
                    cell.to_string()
                }
            })
            .join("")
    }
}

/// The formalism-specific storage a configuration carries along.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Store {
    /// Finite automata and transducers carry nothing.
    #[default]
    None,
    /// A pushdown stack; the top is the last element.
    Stack(Vec<char>),
    /// A Turing machine tape.
    Tape(Tape),
}

impl Show for Store {
    fn show(&self) -> String {
        match self {
            Store::None => String::new(),
            Store::Stack(stack) => stack.iter().rev().join(""),
            Store::Tape(tape) => tape.show(),
        }
    }
}

/// An immutable snapshot of one simulation thread: the control state (as an
/// arena index into the simulated model's state order), how much input has
/// been consumed, the output produced so far (transducers only) and the
/// formalism-specific store. Snapshots hash and compare by value so a step's
/// configuration set deduplicates naturally.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Configuration {
    /// Arena index of the control state.
    pub state: usize,
    /// Number of input symbols consumed so far. Stays 0 for Turing machines,
    /// whose input lives on the tape.
    pub consumed: usize,
    /// Output emitted so far by a Mealy or Moore machine, in emission order.
    pub output: String,
    /// Formalism-specific storage.
    pub store: Store,
}

impl Configuration {
    pub(crate) fn new(state: usize) -> Self {
        Self {
            state,
            consumed: 0,
            output: String::new(),
            store: Store::None,
        }
    }

    pub(crate) fn with_stack(mut self) -> Self {
        self.store = Store::Stack(Vec::new());
        self
    }

    pub(crate) fn with_tape(mut self, tape: Tape) -> Self {
        self.store = Store::Tape(tape);
        self
    }

    pub(crate) fn emitting(mut self, output: Option<char>) -> Self {
        if let Some(c) = output {
            self.output.push(c);
        }
        self
    }

    /// The pushdown stack, if this configuration carries one.
    pub fn stack(&self) -> Option<&[char]> {
        match &self.store {
            Store::Stack(stack) => Some(stack),
            _ => None,
        }
    }

    /// The tape, if this configuration carries one.
    pub fn tape(&self) -> Option<&Tape> {
        match &self.store {
            Store::Tape(tape) => Some(tape),
            _ => None,
        }
    }
}
