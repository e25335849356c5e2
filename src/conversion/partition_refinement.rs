use std::collections::BTreeSet;

use itertools::Itertools;
use tracing::trace;

use super::ConversionError;
use crate::math::{Map, OrderedMap, Partition};
use crate::model::{Automaton, IndexedAutomaton, Mode, State, SymbolSpec, Transition};

/// Minimizes a DFA by Moore/Hopcroft-style partition refinement. Unreachable
/// states are pruned first, then the partition starts from the
/// accepting/non-accepting split and a block is split whenever its members
/// disagree on the target block under some symbol, until a fixed point is
/// reached. A missing transition counts as its own signature, so partial
/// automata stay partial instead of gaining a sink.
///
/// Output blocks are ordered by their least member index and ids `q0, q1, …`
/// assigned in that order, which makes minimization deterministic and
/// idempotent up to renaming.
pub fn minimize(model: &Automaton) -> Result<Automaton, ConversionError> {
    model.validate()?;
    if model.mode != Mode::Dfa {
        return Err(ConversionError::Unsupported {
            from: model.mode,
            to: Mode::Dfa,
        });
    }
    let indexed = IndexedAutomaton::new(model)?;
    let reachable = indexed.reachable();

    // deterministic transition function: the first expanded edge per
    // (state, symbol) wins, mirroring the simulation engine
    let mut delta: Map<(usize, char), usize> = Map::new();
    for source in reachable.iter() {
        for edge in indexed.edges_from(source) {
            if let Some(symbol) = edge.spec.read() {
                delta.entry((source, symbol)).or_insert(edge.target);
            }
        }
    }

    let mut partition = Partition::new([
        reachable
            .iter()
            .filter(|&s| indexed.state(s).accepting)
            .collect::<Vec<_>>(),
        reachable
            .iter()
            .filter(|&s| !indexed.state(s).accepting)
            .collect::<Vec<_>>(),
    ]);

    loop {
        let mut lookup = vec![usize::MAX; indexed.state_count()];
        for (class, block) in partition.iter().enumerate() {
            for &member in block {
                lookup[member] = class;
            }
        }

        let mut refined: Vec<BTreeSet<usize>> = Vec::new();
        let mut split = false;
        for block in &partition {
            let mut groups: OrderedMap<Vec<Option<usize>>, BTreeSet<usize>> = OrderedMap::new();
            for &member in block {
                let signature = indexed
                    .input_alphabet()
                    .iter()
                    .map(|&symbol| delta.get(&(member, symbol)).map(|&t| lookup[t]))
                    .collect();
                groups.entry(signature).or_default().insert(member);
            }
            if groups.len() > 1 {
                split = true;
            }
            refined.extend(groups.into_values());
        }
        if !split {
            break;
        }
        trace!("refined partition to {} block(s)", refined.len());
        partition = Partition::from(refined);
    }

    // blocks in least-member order give the output its canonical state order
    let blocks = partition
        .iter()
        .sorted_by_key(|block| block.first().copied())
        .collect_vec();
    let mut block_of = vec![usize::MAX; indexed.state_count()];
    for (class, block) in blocks.iter().enumerate() {
        for &member in *block {
            block_of[member] = class;
        }
    }

    let mut states = Vec::with_capacity(blocks.len());
    let mut transitions = Vec::new();
    for (class, block) in blocks.iter().enumerate() {
        let Some(&representative) = block.first() else {
            continue;
        };
        states.push(block_state(&indexed, block, class));
        for &symbol in indexed.input_alphabet() {
            if let Some(&target) = delta.get(&(representative, symbol)) {
                transitions.push(Transition::new(
                    format!("t{}", transitions.len()),
                    format!("q{class}"),
                    format!("q{}", block_of[target]),
                    [SymbolSpec::Char { read: Some(symbol) }],
                ));
            }
        }
    }

    Ok(Automaton {
        mode: Mode::Dfa,
        states,
        transitions,
    })
}

/// The output state standing for a block of equivalent input states. All
/// members agree on acceptance by construction; a merged block joins the
/// member labels so the provenance stays visible.
fn block_state(indexed: &IndexedAutomaton, block: &BTreeSet<usize>, class: usize) -> State {
    let labels = block.iter().map(|&m| {
        let state = indexed.state(m);
        if state.label.is_empty() {
            &state.id
        } else {
            &state.label
        }
    });
    let label = if block.len() == 1 {
        labels.into_iter().join("")
    } else {
        format!("{{{}}}", labels.into_iter().join(","))
    };
    let n = block.len().max(1) as f64;
    State {
        id: format!("q{class}"),
        label,
        x: block.iter().map(|&m| indexed.state(m).x).sum::<f64>() / n,
        y: block.iter().map(|&m| indexed.state(m).y).sum::<f64>() / n,
        initial: block.contains(&indexed.initial()),
        accepting: block
            .first()
            .is_some_and(|&representative| indexed.state(representative).accepting),
        output: None,
    }
}
