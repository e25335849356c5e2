use std::collections::VecDeque;

use bit_set::BitSet;
use itertools::Itertools;
use tracing::trace;

use super::ConversionError;
use crate::math::Bijection;
use crate::model::{Automaton, IndexedAutomaton, Mode, State, SymbolSpec, Transition};

/// Converts an NFA into an equivalent DFA by subset construction. Every
/// output state corresponds to the ε-closure of a reachable set of input
/// states; the start state is the ε-closure of the initial state. Subsets
/// are explored breadth-first and output ids `q0, q1, …` are assigned in
/// discovery order, so repeated runs yield identical models. Unreachable
/// subsets are never materialized and the empty subset produces no edge
/// rather than a dead sink.
///
/// A DFA input is accepted as a degenerate NFA, yielding a reachable copy.
pub fn determinize(model: &Automaton) -> Result<Automaton, ConversionError> {
    model.validate()?;
    if !matches!(model.mode, Mode::Nfa | Mode::Dfa) {
        return Err(ConversionError::Unsupported {
            from: model.mode,
            to: Mode::Dfa,
        });
    }
    let indexed = IndexedAutomaton::new(model)?;

    let mut seed = BitSet::with_capacity(indexed.state_count());
    seed.insert(indexed.initial());
    let start = indexed.epsilon_closure(&seed);
    let start_key: Vec<usize> = start.iter().collect();

    let mut subsets: Bijection<Vec<usize>, usize> = Bijection::new();
    let mut states = vec![subset_state(&indexed, &start_key, 0)];
    let mut transitions: Vec<Transition> = Vec::new();
    let mut queue: VecDeque<(BitSet, usize)> = VecDeque::new();
    subsets.insert(start_key, 0);
    queue.push_back((start, 0));

    while let Some((members, source)) = queue.pop_front() {
        for &symbol in indexed.input_alphabet() {
            let next = indexed.symbol_step(&members, symbol);
            if next.is_empty() {
                continue;
            }
            let key: Vec<usize> = next.iter().collect();
            let target = match subsets.get_by_left(&key) {
                Some(&known) => known,
                None => {
                    let fresh = subsets.len();
                    trace!("discovered subset state q{fresh} for {key:?}");
                    states.push(subset_state(&indexed, &key, fresh));
                    subsets.insert(key, fresh);
                    queue.push_back((next, fresh));
                    fresh
                }
            };
            transitions.push(Transition::new(
                format!("t{}", transitions.len()),
                format!("q{source}"),
                format!("q{target}"),
                [SymbolSpec::Char { read: Some(symbol) }],
            ));
        }
    }

    Ok(Automaton {
        mode: Mode::Dfa,
        states,
        transitions,
    })
}

/// The output state standing for a set of input states. Accepting iff any
/// member accepts; the label joins the member labels, the position is the
/// member average so the result lands near its constituents on a canvas.
fn subset_state(indexed: &IndexedAutomaton, members: &[usize], index: usize) -> State {
    let label = format!(
        "{{{}}}",
        members
            .iter()
            .map(|&m| {
                let state = indexed.state(m);
                if state.label.is_empty() {
                    &state.id
                } else {
                    &state.label
                }
            })
            .join(",")
    );
    let n = members.len().max(1) as f64;
    State {
        id: format!("q{index}"),
        label,
        x: members.iter().map(|&m| indexed.state(m).x).sum::<f64>() / n,
        y: members.iter().map(|&m| indexed.state(m).y).sum::<f64>() / n,
        initial: index == 0,
        accepting: members.iter().any(|&m| indexed.state(m).accepting),
        output: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::{simulate, SimulationOptions, Verdict};
    use proptest::prelude::*;

    fn read(c: char) -> SymbolSpec {
        SymbolSpec::Char { read: Some(c) }
    }

    #[test]
    fn epsilon_reach_becomes_start_state() {
        // q0 --ε--> q1 --x--> q2 (accepting) over alphabet {x}
        let model = Automaton::new(Mode::Nfa)
            .with_state(State::new("q0").initial())
            .with_state(State::new("q1"))
            .with_state(State::new("q2").accepting())
            .with_transition(Transition::new(
                "t0",
                "q0",
                "q1",
                [SymbolSpec::Char { read: None }],
            ))
            .with_transition(Transition::new("t1", "q1", "q2", [read('x')]));

        let dfa = determinize(&model).unwrap();
        assert_eq!(dfa.mode, Mode::Dfa);
        assert_eq!(dfa.states.len(), 2);
        assert_eq!(dfa.states[0].label, "{q0,q1}");
        assert!(dfa.states[0].initial && !dfa.states[0].accepting);
        assert_eq!(dfa.states[1].label, "{q2}");
        assert!(dfa.states[1].accepting);
        assert_eq!(dfa.transitions.len(), 1);
    }

    #[test]
    fn unreachable_subsets_are_not_materialized() {
        // q0 --a--> q1; q2 is disconnected and reads b
        let model = Automaton::new(Mode::Nfa)
            .with_state(State::new("q0").initial())
            .with_state(State::new("q1").accepting())
            .with_state(State::new("q2"))
            .with_transition(Transition::new("t0", "q0", "q1", [read('a')]))
            .with_transition(Transition::new("t1", "q2", "q2", [read('b')]));
        let dfa = determinize(&model).unwrap();
        assert_eq!(dfa.states.len(), 2);
        // no edge on b from the start subset, and no dead ∅ state either
        assert_eq!(dfa.transitions.len(), 1);
    }

    #[test]
    fn construction_is_deterministic() {
        let model = Automaton::new(Mode::Nfa)
            .with_state(State::new("q0").initial())
            .with_state(State::new("q1"))
            .with_state(State::new("q2").accepting())
            .with_transition(Transition::new("t0", "q0", "q0", [read('a'), read('b')]))
            .with_transition(Transition::new("t1", "q0", "q1", [read('a')]))
            .with_transition(Transition::new("t2", "q1", "q2", [read('b')]))
            .with_transition(Transition::new(
                "t3",
                "q1",
                "q1",
                [SymbolSpec::Char { read: None }],
            ));
        assert_eq!(determinize(&model).unwrap(), determinize(&model).unwrap());
    }

    #[test]
    fn rejects_foreign_modes() {
        let model = Automaton::new(Mode::Pda).with_state(State::new("q0").initial());
        assert_eq!(
            determinize(&model),
            Err(ConversionError::Unsupported {
                from: Mode::Pda,
                to: Mode::Dfa
            })
        );
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        /// The constructed DFA accepts exactly the words the NFA accepts.
        #[test]
        fn preserves_language(
            edges in proptest::collection::vec((0usize..4, 0usize..4, 0usize..3), 0..12),
            accepting in proptest::collection::vec(any::<bool>(), 4),
            word in "[ab]{0,6}",
        ) {
            let mut model = Automaton::new(Mode::Nfa);
            for i in 0..4 {
                let mut state = State::new(format!("q{i}"));
                if i == 0 {
                    state = state.initial();
                }
                if accepting[i] {
                    state = state.accepting();
                }
                model = model.with_state(state);
            }
            for (k, &(from, to, sym)) in edges.iter().enumerate() {
                let spec = match sym {
                    0 => read('a'),
                    1 => read('b'),
                    _ => SymbolSpec::Char { read: None },
                };
                model = model.with_transition(Transition::new(
                    format!("t{k}"),
                    format!("q{from}"),
                    format!("q{to}"),
                    [spec],
                ));
            }

            let dfa = determinize(&model).unwrap();
            let options = SimulationOptions::default();
            let nfa_accepts =
                simulate(&model, &word, options).unwrap().verdict == Verdict::Accept;
            let dfa_accepts =
                simulate(&dfa, &word, options).unwrap().verdict == Verdict::Accept;
            prop_assert_eq!(nfa_accepts, dfa_accepts);
        }
    }
}
