use bit_set::BitSet;
use std::collections::VecDeque;

use super::{Automaton, Mode, State, SymbolSpec, ValidationError};
use crate::math::{Map, OrderedSet};

/// An expanded edge: a target state guarded by exactly one symbol
/// specification. Transitions carrying several specifications contribute one
/// edge per specification, filed under their source state.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Edge<'a> {
    /// Arena index of the target state.
    pub target: usize,
    /// The single specification guarding this edge.
    pub spec: &'a SymbolSpec,
}

/// Arena-indexed view of a validated model. States are addressed by their
/// position in the model's state vector, transitions are expanded to
/// independent edges, and the read alphabet is precomputed. All engines work
/// on this view instead of chasing ids through the model.
#[derive(Clone, Debug)]
pub(crate) struct IndexedAutomaton<'a> {
    model: &'a Automaton,
    initial: usize,
    edges: Vec<Edge<'a>>,
    outgoing: Vec<Vec<usize>>,
    input_alphabet: OrderedSet<char>,
    tape_alphabet: OrderedSet<char>,
}

impl<'a> IndexedAutomaton<'a> {
    /// Validates the model and builds the indexed view. The arena order is
    /// the model's state order, the edge order is the model's transition
    /// order with parallel specifications expanded in place.
    pub fn new(model: &'a Automaton) -> Result<Self, ValidationError> {
        model.validate()?;

        let index: Map<&str, usize> = model
            .states
            .iter()
            .enumerate()
            .map(|(i, s)| (s.id.as_str(), i))
            .collect();
        // validation guarantees exactly one initial state
        let initial = model
            .states
            .iter()
            .position(|s| s.initial)
            .ok_or(ValidationError::InitialStateCount(0))?;

        let mut edges = Vec::new();
        let mut outgoing = vec![Vec::new(); model.states.len()];
        let mut input_alphabet = OrderedSet::new();
        let mut tape_alphabet = OrderedSet::new();
        for transition in &model.transitions {
            let source = index[transition.from.as_str()];
            let target = index[transition.to.as_str()];
            for spec in &transition.symbols {
                if let Some(read) = spec.read() {
                    input_alphabet.insert(read);
                }
                if let SymbolSpec::Tape { read, write, .. } = spec {
                    tape_alphabet.extend(read.iter().chain(write.iter()).copied());
                }
                outgoing[source].push(edges.len());
                edges.push(Edge { target, spec });
            }
        }

        Ok(Self {
            model,
            initial,
            edges,
            outgoing,
            input_alphabet,
            tape_alphabet,
        })
    }

    pub fn mode(&self) -> Mode {
        self.model.mode
    }

    pub fn state_count(&self) -> usize {
        self.model.states.len()
    }

    pub fn state(&self, index: usize) -> &'a State {
        &self.model.states[index]
    }

    pub fn initial(&self) -> usize {
        self.initial
    }

    pub fn edges_from(&self, state: usize) -> impl Iterator<Item = &Edge<'a>> + '_ {
        self.outgoing[state].iter().map(|&e| &self.edges[e])
    }

    /// The set of input symbols read anywhere in the model, in symbol order.
    pub fn input_alphabet(&self) -> &OrderedSet<char> {
        &self.input_alphabet
    }

    /// Whether the given input symbol is part of the model's declared
    /// alphabet. For a Turing machine the tape alphabet (read and written
    /// symbols) is authoritative, since input ends up on the tape.
    pub fn declares_symbol(&self, symbol: char) -> bool {
        match self.model.mode {
            Mode::Tm => self.tape_alphabet.contains(&symbol),
            _ => self.input_alphabet.contains(&symbol),
        }
    }

    /// The ε-closure of a set of states: every state reachable using only
    /// edges that consume no input. Visited states are never re-expanded, so
    /// ε-cycles terminate. Only meaningful for NFA models, where edges carry
    /// no stack or tape effects.
    pub fn epsilon_closure(&self, states: &BitSet) -> BitSet {
        let mut closure = states.clone();
        let mut queue: VecDeque<usize> = states.iter().collect();
        while let Some(state) = queue.pop_front() {
            for edge in self.edges_from(state) {
                if edge.spec.read().is_none() && closure.insert(edge.target) {
                    queue.push_back(edge.target);
                }
            }
        }
        closure
    }

    /// One consuming step at the state-set level: all states reachable from
    /// `states` by a single edge reading `symbol`, followed by ε-closure.
    pub fn symbol_step(&self, states: &BitSet, symbol: char) -> BitSet {
        let mut reached = BitSet::with_capacity(self.state_count());
        for state in states.iter() {
            for edge in self.edges_from(state) {
                if edge.spec.read() == Some(symbol) {
                    reached.insert(edge.target);
                }
            }
        }
        self.epsilon_closure(&reached)
    }

    /// All states reachable from the initial state over expanded edges,
    /// ignoring guards.
    pub fn reachable(&self) -> BitSet {
        let mut reached = BitSet::with_capacity(self.state_count());
        reached.insert(self.initial);
        let mut queue = VecDeque::from([self.initial]);
        while let Some(state) = queue.pop_front() {
            for edge in self.edges_from(state) {
                if reached.insert(edge.target) {
                    queue.push_back(edge.target);
                }
            }
        }
        reached
    }
}
