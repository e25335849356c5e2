use tracing::trace;

use super::ConversionError;
use crate::math::Map;
use crate::model::{Automaton, IndexedAutomaton, Mode, State, SymbolSpec, Transition};

/// Converts a Moore machine into an equivalent Mealy machine by folding each
/// state's output onto its incoming transitions: a transition into `q`
/// emits what `q` would have emitted on arrival. The graph is otherwise
/// unchanged, ids included. The output sequences agree for every input once
/// the Moore machine's leading initial-state output is disregarded, which is
/// the standard correspondence.
///
/// Every state that is the target of a transition must carry an output
/// symbol; a bare state cannot be folded and fails the conversion.
pub fn moore_to_mealy(model: &Automaton) -> Result<Automaton, ConversionError> {
    model.validate()?;
    if model.mode != Mode::Moore {
        return Err(ConversionError::Unsupported {
            from: model.mode,
            to: Mode::Mealy,
        });
    }

    let mut states = model.states.clone();
    for state in &mut states {
        state.output = None;
    }

    let mut transitions = Vec::with_capacity(model.transitions.len());
    for transition in &model.transitions {
        let target = model
            .state(&transition.to)
            .ok_or_else(|| ConversionError::MissingStateOutput(transition.to.clone()))?;
        let emit = target
            .output
            .ok_or_else(|| ConversionError::MissingStateOutput(target.id.clone()))?;
        let symbols = transition
            .symbols
            .iter()
            .filter_map(|spec| match spec {
                SymbolSpec::Char { read: Some(read) } => {
                    Some(SymbolSpec::Output { read: *read, emit })
                }
                _ => None,
            })
            .collect::<Vec<_>>();
        transitions.push(Transition::new(
            transition.id.clone(),
            transition.from.clone(),
            transition.to.clone(),
            symbols,
        ));
    }

    Ok(Automaton {
        mode: Mode::Mealy,
        states,
        transitions,
    })
}

/// Converts a Mealy machine into an equivalent Moore machine by state
/// splitting: each output state stands for a pair of an input state and one
/// of the output symbols emitted on entering it, plus an output-less copy of
/// the initial state. Splitting order follows the model's state and
/// transition order, so the construction is deterministic.
pub fn mealy_to_moore(model: &Automaton) -> Result<Automaton, ConversionError> {
    model.validate()?;
    if model.mode != Mode::Mealy {
        return Err(ConversionError::Unsupported {
            from: model.mode,
            to: Mode::Moore,
        });
    }
    let indexed = IndexedAutomaton::new(model)?;

    // which outputs enter each state, in first-seen order
    let mut variants: Vec<Vec<Option<char>>> = vec![Vec::new(); indexed.state_count()];
    variants[indexed.initial()].push(None);
    for state in 0..indexed.state_count() {
        for edge in indexed.edges_from(state) {
            if let SymbolSpec::Output { emit, .. } = edge.spec {
                if !variants[edge.target].contains(&Some(*emit)) {
                    variants[edge.target].push(Some(*emit));
                }
            }
        }
    }

    let mut ids: Map<(usize, Option<char>), String> = Map::new();
    let mut states = Vec::new();
    for (index, outputs) in variants.iter().enumerate() {
        let original = indexed.state(index);
        for &output in outputs {
            let id = format!("q{}", ids.len());
            let label = match output {
                None => original.label.clone(),
                Some(o) => format!("{}/{}", original.label, o),
            };
            trace!("splitting {} into {id} ({label})", original.id);
            states.push(State {
                id: id.clone(),
                label,
                x: original.x,
                y: original.y,
                initial: index == indexed.initial() && output.is_none(),
                accepting: original.accepting,
                output,
            });
            ids.insert((index, output), id);
        }
    }

    let mut transitions = Vec::new();
    for source in 0..indexed.state_count() {
        for edge in indexed.edges_from(source) {
            let SymbolSpec::Output { read, emit } = edge.spec else {
                continue;
            };
            let Some(target_id) = ids.get(&(edge.target, Some(*emit))) else {
                continue;
            };
            for source_output in &variants[source] {
                let Some(source_id) = ids.get(&(source, *source_output)) else {
                    continue;
                };
                transitions.push(Transition::new(
                    format!("t{}", transitions.len()),
                    source_id.clone(),
                    target_id.clone(),
                    [SymbolSpec::Char { read: Some(*read) }],
                ));
            }
        }
    }

    Ok(Automaton {
        mode: Mode::Moore,
        states,
        transitions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::{simulate, SimulationOptions, Verdict};

    fn read(c: char) -> SymbolSpec {
        SymbolSpec::Char { read: Some(c) }
    }

    fn edge_detector_mealy() -> Automaton {
        // emits 1 exactly when the input symbol differs from the previous one
        Automaton::new(Mode::Mealy)
            .with_state(State::new("a").initial())
            .with_state(State::new("b"))
            .with_transition(Transition::new(
                "t0",
                "a",
                "a",
                [SymbolSpec::Output {
                    read: 'a',
                    emit: '0',
                }],
            ))
            .with_transition(Transition::new(
                "t1",
                "a",
                "b",
                [SymbolSpec::Output {
                    read: 'b',
                    emit: '1',
                }],
            ))
            .with_transition(Transition::new(
                "t2",
                "b",
                "b",
                [SymbolSpec::Output {
                    read: 'b',
                    emit: '0',
                }],
            ))
            .with_transition(Transition::new(
                "t3",
                "b",
                "a",
                [SymbolSpec::Output {
                    read: 'a',
                    emit: '1',
                }],
            ))
    }

    #[test]
    fn mealy_to_moore_preserves_outputs() {
        let mealy = edge_detector_mealy();
        let moore = mealy_to_moore(&mealy).unwrap();
        assert_eq!(moore.mode, Mode::Moore);
        assert_eq!(moore.validate(), Ok(()));

        let options = SimulationOptions::default();
        for word in ["", "a", "ab", "abba", "bbbb", "ababab"] {
            let mealy_trace = simulate(&mealy, word, options).unwrap();
            let moore_trace = simulate(&moore, word, options).unwrap();
            assert_eq!(mealy_trace.verdict, Verdict::Accept);
            assert_eq!(moore_trace.verdict, Verdict::Accept);
            let mealy_out = &mealy_trace.steps.last().unwrap()[0].output;
            let moore_out = &moore_trace.steps.last().unwrap()[0].output;
            assert_eq!(mealy_out, moore_out, "outputs diverge on {word:?}");
        }
    }

    #[test]
    fn moore_to_mealy_preserves_outputs() {
        let moore = Automaton::new(Mode::Moore)
            .with_state(State::new("q0").initial().with_output('x'))
            .with_state(State::new("q1").with_output('y'))
            .with_transition(Transition::new("t0", "q0", "q1", [read('a')]))
            .with_transition(Transition::new("t1", "q1", "q0", [read('a'), read('b')]));
        let mealy = moore_to_mealy(&moore).unwrap();
        assert_eq!(mealy.validate(), Ok(()));

        let options = SimulationOptions::default();
        for word in ["a", "aa", "aab", "aba"] {
            let moore_trace = simulate(&moore, word, options).unwrap();
            let mealy_trace = simulate(&mealy, word, options).unwrap();
            if moore_trace.verdict != Verdict::Accept {
                continue;
            }
            let moore_out = &moore_trace.steps.last().unwrap()[0].output;
            let mealy_out = &mealy_trace.steps.last().unwrap()[0].output;
            // the Moore output carries the initial state's symbol up front
            assert_eq!(moore_out.strip_prefix('x').unwrap(), mealy_out);
        }
    }

    #[test]
    fn moore_to_mealy_requires_outputs() {
        let moore = Automaton::new(Mode::Moore)
            .with_state(State::new("q0").initial().with_output('x'))
            .with_state(State::new("q1"))
            .with_transition(Transition::new("t0", "q0", "q1", [read('a')]));
        assert_eq!(
            moore_to_mealy(&moore),
            Err(ConversionError::MissingStateOutput("q1".to_string()))
        );
    }

    #[test]
    fn transducer_conversions_reject_foreign_modes() {
        let dfa = Automaton::new(Mode::Dfa).with_state(State::new("q0").initial());
        assert!(matches!(
            moore_to_mealy(&dfa),
            Err(ConversionError::Unsupported { .. })
        ));
        assert!(matches!(
            mealy_to_moore(&dfa),
            Err(ConversionError::Unsupported { .. })
        ));
    }
}
