use roxmltree::{Document, Node};
use tracing::debug;

use super::InterchangeError;
use crate::model::{Automaton, Mode, Motion, State, SymbolSpec, Transition};

/// Decodes an automaton from the JFLAP-style XML dialect
/// (`<structure><type>…</type><automaton>…</automaton></structure>`). The
/// declared kind decides how per-transition attributes are interpreted:
/// `fa` becomes an NFA when any transition reads the empty symbol and a DFA
/// otherwise, `pda` and `turing` map to their formalisms directly, and the
/// transducer kinds `mealy`/`moore` are accepted as well. An attribute
/// combination that contradicts the declared kind is an error, never a
/// guess. Only decoding is supported; exporting to the dialect is a caller
/// concern.
pub fn decode_xml(payload: &str) -> Result<Automaton, InterchangeError> {
    let doc = Document::parse(payload)?;
    let root = doc.root_element();
    if !root.has_tag_name("structure") {
        return Err(InterchangeError::MalformedField {
            field: "structure",
            reason: format!("expected a structure document, got `{}`", root.tag_name().name()),
        });
    }

    let kind = child_text(root, "type")
        .map(str::trim)
        .ok_or(InterchangeError::MissingField("type"))?;
    // newer documents nest everything in <automaton>, older ones do not
    let container = root
        .children()
        .find(|n| n.has_tag_name("automaton"))
        .unwrap_or(root);

    let mut states = Vec::new();
    for node in container.children().filter(|n| n.has_tag_name("state")) {
        states.push(decode_state(node, kind)?);
    }

    let mut symbols = Vec::new();
    let mut endpoints = Vec::new();
    for (position, node) in container
        .children()
        .filter(|n| n.has_tag_name("transition"))
        .enumerate()
    {
        let from = child_text(node, "from")
            .map(str::trim)
            .ok_or(InterchangeError::MissingField("from"))?;
        let to = child_text(node, "to")
            .map(str::trim)
            .ok_or(InterchangeError::MissingField("to"))?;
        endpoints.push((from.to_string(), to.to_string()));
        symbols.push(decode_spec(node, kind, position)?);
    }

    let mode = match kind {
        "fa" => {
            if symbols
                .iter()
                .any(|s| matches!(s, SymbolSpec::Char { read: None }))
            {
                Mode::Nfa
            } else {
                Mode::Dfa
            }
        }
        "pda" => Mode::Pda,
        "turing" => Mode::Tm,
        "mealy" => Mode::Mealy,
        "moore" => Mode::Moore,
        other => return Err(InterchangeError::UnknownKind(other.to_string())),
    };
    debug!("decoded foreign document of kind `{kind}` as {mode}");

    let transitions = endpoints
        .into_iter()
        .zip(symbols)
        .enumerate()
        .map(|(i, ((from, to), spec))| Transition::new(format!("t{i}"), from, to, [spec]))
        .collect();

    let model = Automaton {
        mode,
        states,
        transitions,
    };
    model.validate()?;
    Ok(model)
}

fn child_text<'a>(node: Node<'a, '_>, name: &str) -> Option<&'a str> {
    node.children()
        .find(|c| c.has_tag_name(name))
        .and_then(|c| c.text())
}

fn has_child(node: Node, name: &str) -> bool {
    node.children().any(|c| c.has_tag_name(name))
}

fn decode_state(node: Node, kind: &str) -> Result<State, InterchangeError> {
    let id = node
        .attribute("id")
        .ok_or(InterchangeError::MissingField("id"))?
        .to_string();
    let label = node
        .attribute("name")
        .map(str::to_string)
        .unwrap_or_else(|| format!("q{id}"));
    let output = match kind {
        "moore" => single_char(child_text(node, "output"), "output")?,
        _ => None,
    };
    Ok(State {
        label,
        x: coordinate(node, "x")?,
        y: coordinate(node, "y")?,
        initial: has_child(node, "initial"),
        accepting: has_child(node, "final"),
        output,
        id,
    })
}

fn coordinate(node: Node, field: &'static str) -> Result<f64, InterchangeError> {
    match child_text(node, field) {
        None => Ok(0.0),
        Some(text) => text
            .trim()
            .parse()
            .map_err(|_| InterchangeError::MalformedField {
                field,
                reason: format!("expected a number, got `{text}`"),
            }),
    }
}

/// An absent or empty element decodes as ε/blank, anything longer than one
/// symbol is malformed.
fn single_char(
    text: Option<&str>,
    field: &'static str,
) -> Result<Option<char>, InterchangeError> {
    match text {
        None | Some("") => Ok(None),
        Some(s) => {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(Some(c)),
                _ => Err(InterchangeError::MalformedField {
                    field,
                    reason: format!("expected a single symbol, got `{s}`"),
                }),
            }
        }
    }
}

fn forbid(
    node: Node,
    kind: &str,
    position: usize,
    names: &[&str],
) -> Result<(), InterchangeError> {
    for name in names {
        if has_child(node, name) {
            return Err(InterchangeError::InconsistentKind {
                kind: kind.to_string(),
                transition: position,
            });
        }
    }
    Ok(())
}

fn decode_spec(node: Node, kind: &str, position: usize) -> Result<SymbolSpec, InterchangeError> {
    let read = single_char(child_text(node, "read"), "read")?;
    match kind {
        "fa" => {
            forbid(node, kind, position, &["pop", "push", "write", "move", "transout"])?;
            Ok(SymbolSpec::Char { read })
        }
        "pda" => {
            forbid(node, kind, position, &["write", "move", "transout"])?;
            // the dialect lists push strings top-first, our push order ends
            // with the topmost symbol, hence the reversal
            let push = child_text(node, "push")
                .unwrap_or_default()
                .chars()
                .rev()
                .collect();
            Ok(SymbolSpec::Stack {
                read,
                pop: single_char(child_text(node, "pop"), "pop")?,
                push,
            })
        }
        "turing" => {
            forbid(node, kind, position, &["pop", "push", "transout"])?;
            let motion = match child_text(node, "move").map(str::trim) {
                Some("L") => Motion::Left,
                Some("R") => Motion::Right,
                Some("S") => Motion::Stay,
                Some(other) => {
                    return Err(InterchangeError::MalformedField {
                        field: "move",
                        reason: format!("expected one of L, R, S, got `{other}`"),
                    })
                }
                None => return Err(InterchangeError::MissingField("move")),
            };
            Ok(SymbolSpec::Tape {
                read,
                write: single_char(child_text(node, "write"), "write")?,
                motion,
            })
        }
        "mealy" => {
            forbid(node, kind, position, &["pop", "push", "write", "move"])?;
            let emit = single_char(child_text(node, "transout"), "transout")?
                .ok_or(InterchangeError::MissingField("transout"))?;
            let read = read.ok_or(InterchangeError::MissingField("read"))?;
            Ok(SymbolSpec::Output { read, emit })
        }
        "moore" => {
            forbid(node, kind, position, &["pop", "push", "write", "move", "transout"])?;
            Ok(SymbolSpec::Char { read })
        }
        other => Err(InterchangeError::UnknownKind(other.to_string())),
    }
}
