use serde_json::{json, Map as JsonMap, Value};
use tracing::trace;

use super::InterchangeError;
use crate::model::{Automaton, Mode, Motion, State, SymbolSpec, Transition};
use crate::show::Show;

/// Identifier of the native schema, stored in the `_format` field.
pub const FORMAT: &str = "stateforge-v1";

/// Encodes a model into the native JSON schema. The encoding is
/// deterministic: keys are emitted in a fixed order and arrays follow the
/// model's canonical iteration order, so equal models produce byte-identical
/// payloads.
pub fn encode_json(model: &Automaton) -> String {
    let mut root = JsonMap::new();
    root.insert("_format".into(), json!(FORMAT));
    root.insert("mode".into(), json!(model.mode.tag()));
    root.insert(
        "states".into(),
        Value::Array(model.states.iter().map(state_value).collect()),
    );
    root.insert(
        "transitions".into(),
        Value::Array(model.transitions.iter().map(transition_value).collect()),
    );
    Value::Object(root).to_string()
}

fn state_value(state: &State) -> Value {
    let mut obj = JsonMap::new();
    obj.insert("id".into(), json!(state.id));
    obj.insert("label".into(), json!(state.label));
    obj.insert("x".into(), json!(state.x));
    obj.insert("y".into(), json!(state.y));
    obj.insert("isInitial".into(), json!(state.initial));
    obj.insert("isAccepting".into(), json!(state.accepting));
    if let Some(output) = state.output {
        obj.insert("output".into(), json!(output.to_string()));
    }
    Value::Object(obj)
}

fn transition_value(transition: &Transition) -> Value {
    let mut obj = JsonMap::new();
    obj.insert("id".into(), json!(transition.id));
    obj.insert("from".into(), json!(transition.from));
    obj.insert("to".into(), json!(transition.to));
    obj.insert(
        "symbols".into(),
        Value::Array(transition.symbols.iter().map(symbol_value).collect()),
    );
    Value::Object(obj)
}

/// The empty string stands for ε (or the blank tape symbol) on the wire.
fn wire_symbol(symbol: Option<char>) -> String {
    symbol.map(String::from).unwrap_or_default()
}

fn symbol_value(spec: &SymbolSpec) -> Value {
    let mut obj = JsonMap::new();
    match spec {
        SymbolSpec::Char { read } => {
            obj.insert("read".into(), json!(wire_symbol(*read)));
        }
        SymbolSpec::Stack { read, pop, push } => {
            obj.insert("read".into(), json!(wire_symbol(*read)));
            obj.insert("pop".into(), json!(wire_symbol(*pop)));
            obj.insert("push".into(), json!(push.iter().collect::<String>()));
        }
        SymbolSpec::Tape {
            read,
            write,
            motion,
        } => {
            obj.insert("read".into(), json!(wire_symbol(*read)));
            obj.insert("write".into(), json!(wire_symbol(*write)));
            obj.insert("move".into(), json!(motion.show()));
        }
        SymbolSpec::Output { read, emit } => {
            obj.insert("read".into(), json!(read.to_string()));
            obj.insert("output".into(), json!(emit.to_string()));
        }
    }
    Value::Object(obj)
}

/// Decodes a payload in the native JSON schema. A missing `mode` defaults to
/// DFA, a missing `states` array is an error, and unknown fields anywhere
/// are ignored rather than rejected so newer producers stay readable.
pub fn decode_json(payload: &str) -> Result<Automaton, InterchangeError> {
    let value: Value = serde_json::from_str(payload)?;
    let root = value.as_object().ok_or(InterchangeError::MalformedField {
        field: "payload",
        reason: "expected a JSON object".to_string(),
    })?;

    let mode = match root.get("mode") {
        None | Some(Value::Null) => Mode::Dfa,
        Some(Value::String(tag)) => {
            Mode::from_tag(tag).ok_or_else(|| InterchangeError::UnknownMode(tag.clone()))?
        }
        Some(other) => {
            return Err(InterchangeError::MalformedField {
                field: "mode",
                reason: format!("expected a string, got {other}"),
            })
        }
    };

    let states = root
        .get("states")
        .ok_or(InterchangeError::MissingField("states"))?
        .as_array()
        .ok_or(InterchangeError::MalformedField {
            field: "states",
            reason: "expected an array".to_string(),
        })?
        .iter()
        .map(decode_state)
        .collect::<Result<Vec<_>, _>>()?;

    let transitions = match root.get("transitions") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| decode_transition(mode, item))
            .collect::<Result<Vec<_>, _>>()?,
        Some(other) => {
            return Err(InterchangeError::MalformedField {
                field: "transitions",
                reason: format!("expected an array, got {other}"),
            })
        }
    };

    trace!(
        "decoded {mode} payload with {} state(s) and {} transition(s)",
        states.len(),
        transitions.len()
    );
    Ok(Automaton {
        mode,
        states,
        transitions,
    })
}

fn object<'v>(
    value: &'v Value,
    field: &'static str,
) -> Result<&'v JsonMap<String, Value>, InterchangeError> {
    value.as_object().ok_or(InterchangeError::MalformedField {
        field,
        reason: "expected an object".to_string(),
    })
}

/// Identifiers may arrive as strings or bare numbers; both are kept as the
/// state id verbatim.
fn id_field(obj: &JsonMap<String, Value>, key: &'static str) -> Result<String, InterchangeError> {
    match obj.get(key) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(other) => Err(InterchangeError::MalformedField {
            field: key,
            reason: format!("expected a string, got {other}"),
        }),
        None => Err(InterchangeError::MissingField(key)),
    }
}

fn opt_char(
    obj: &JsonMap<String, Value>,
    key: &'static str,
) -> Result<Option<char>, InterchangeError> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (None, _) => Ok(None),
                (Some(c), None) => Ok(Some(c)),
                _ => Err(InterchangeError::MalformedField {
                    field: key,
                    reason: format!("expected a single symbol, got `{s}`"),
                }),
            }
        }
        Some(other) => Err(InterchangeError::MalformedField {
            field: key,
            reason: format!("expected a string, got {other}"),
        }),
    }
}

fn req_char(obj: &JsonMap<String, Value>, key: &'static str) -> Result<char, InterchangeError> {
    opt_char(obj, key)?.ok_or(InterchangeError::MissingField(key))
}

fn decode_state(value: &Value) -> Result<State, InterchangeError> {
    let obj = object(value, "states")?;
    Ok(State {
        id: id_field(obj, "id")?,
        label: obj
            .get("label")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        x: obj.get("x").and_then(Value::as_f64).unwrap_or_default(),
        y: obj.get("y").and_then(Value::as_f64).unwrap_or_default(),
        initial: obj
            .get("isInitial")
            .and_then(Value::as_bool)
            .unwrap_or_default(),
        accepting: obj
            .get("isAccepting")
            .and_then(Value::as_bool)
            .unwrap_or_default(),
        output: opt_char(obj, "output")?,
    })
}

fn decode_transition(mode: Mode, value: &Value) -> Result<Transition, InterchangeError> {
    let obj = object(value, "transitions")?;
    let symbols = match obj.get("symbols") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| decode_symbol(mode, item))
            .collect::<Result<Vec<_>, _>>()?,
        Some(other) => {
            return Err(InterchangeError::MalformedField {
                field: "symbols",
                reason: format!("expected an array, got {other}"),
            })
        }
    };
    Ok(Transition {
        id: id_field(obj, "id")?,
        from: id_field(obj, "from")?,
        to: id_field(obj, "to")?,
        symbols,
    })
}

fn decode_symbol(mode: Mode, value: &Value) -> Result<SymbolSpec, InterchangeError> {
    let obj = object(value, "symbols")?;
    match mode {
        Mode::Dfa | Mode::Nfa | Mode::Moore => Ok(SymbolSpec::Char {
            read: opt_char(obj, "read")?,
        }),
        Mode::Pda => Ok(SymbolSpec::Stack {
            read: opt_char(obj, "read")?,
            pop: opt_char(obj, "pop")?,
            push: obj
                .get("push")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .chars()
                .collect(),
        }),
        Mode::Tm => Ok(SymbolSpec::Tape {
            read: opt_char(obj, "read")?,
            write: opt_char(obj, "write")?,
            motion: decode_motion(obj)?,
        }),
        Mode::Mealy => Ok(SymbolSpec::Output {
            read: req_char(obj, "read")?,
            emit: req_char(obj, "output")?,
        }),
    }
}

fn decode_motion(obj: &JsonMap<String, Value>) -> Result<Motion, InterchangeError> {
    match obj.get("move").and_then(Value::as_str) {
        Some("L") => Ok(Motion::Left),
        Some("R") => Ok(Motion::Right),
        Some("S") => Ok(Motion::Stay),
        Some(other) => Err(InterchangeError::MalformedField {
            field: "move",
            reason: format!("expected one of L, R, S, got `{other}`"),
        }),
        None => Err(InterchangeError::MissingField("move")),
    }
}
