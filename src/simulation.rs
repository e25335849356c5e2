use std::collections::VecDeque;

use thiserror::Error;
use tracing::{debug, trace};

use crate::math::Set;
use crate::model::{Automaton, IndexedAutomaton, Mode, SymbolSpec, ValidationError};

mod configuration;
pub use configuration::{Configuration, Store, Tape};

/// Bounds on a single simulation session. Nondeterministic configuration
/// sets can grow combinatorially and a Turing machine may never halt, so
/// both dimensions are capped; exceeding either yields the
/// [`Verdict::BudgetExceeded`] verdict instead of unbounded growth.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StepBudget {
    /// Maximum number of synchronous steps taken before giving up.
    pub max_steps: usize,
    /// Maximum number of simultaneously live configurations, also applied
    /// while expanding ε-closures.
    pub max_configurations: usize,
}

impl Default for StepBudget {
    fn default() -> Self {
        Self {
            max_steps: 10_000,
            max_configurations: 10_000,
        }
    }
}

/// How a pushdown automaton decides acceptance once the input is consumed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PdaAcceptance {
    /// A live configuration in an accepting state suffices.
    #[default]
    FinalState,
    /// A live configuration must be in an accepting state *and* have an
    /// empty stack.
    EmptyStack,
}

/// Caller-supplied knobs for a simulation session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SimulationOptions {
    /// Resource bounds, see [`StepBudget`].
    pub budget: StepBudget,
    /// Pushdown acceptance flavor, see [`PdaAcceptance`].
    pub pda_acceptance: PdaAcceptance,
}

/// Why a run was rejected. Distinguishing these matters to callers: an input
/// symbol outside the model's alphabet is rejected explicitly and must not be
/// presented as an ordinary failed run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RejectCause {
    /// The live configuration set became empty before the input was
    /// exhausted (or, for a Turing machine, every configuration halted in a
    /// non-accepting state).
    NoLiveConfigurations,
    /// The input was consumed but no live configuration satisfied the
    /// acceptance condition.
    NotAccepting,
    /// The input contains a symbol the model never reads.
    ForeignSymbol {
        /// The offending symbol.
        symbol: char,
        /// Its position in the input.
        position: usize,
    },
}

/// Final outcome of a run. `BudgetExceeded` is deliberately not a rejection:
/// the machine ran out of budget, not out of options.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    /// Some live configuration satisfied the acceptance condition.
    Accept,
    /// The run terminated without acceptance.
    Reject(RejectCause),
    /// The step or configuration budget was exhausted first.
    BudgetExceeded,
}

/// Result of advancing a session by one step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// The session is still live, more steps may follow.
    Continue,
    /// The session has settled on a verdict; further steps are no-ops.
    Finished(Verdict),
}

/// Simulating a structurally broken model is a programming error on the
/// caller's side and is reported as such, never as a rejection.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum SimulationError {
    /// The model failed validation.
    #[error("cannot simulate invalid model: {0}")]
    InvalidModel(#[from] ValidationError),
}

/// The full record of a finished run: one configuration set per step (step 0
/// is the initial closure) and the final verdict. `state_ids` maps the arena
/// indices used by [`Configuration::state`] back to model state ids.
#[derive(Clone, Debug, PartialEq)]
pub struct Trace {
    /// Arena index to state id mapping.
    pub state_ids: Vec<String>,
    /// One frame per step, in step order.
    pub steps: Vec<Vec<Configuration>>,
    /// The final verdict.
    pub verdict: Verdict,
}

/// Runs `model` on `input` to completion and returns the trace.
pub fn simulate(
    model: &Automaton,
    input: &str,
    options: SimulationOptions,
) -> Result<Trace, SimulationError> {
    Ok(Simulation::new(model, input, options)?.run())
}

struct ClosureOverflow;

struct TmStep {
    accepted: Vec<Configuration>,
    successors: Set<Configuration>,
}

/// A single simulation session. The session borrows the model immutably and
/// owns all per-run state, so concurrent sessions over the same model never
/// interact. Stepping is caller-driven: [`Simulation::step`] advances every
/// live configuration by exactly one synchronous step and returns, nothing
/// runs in the background.
pub struct Simulation<'a> {
    indexed: IndexedAutomaton<'a>,
    input: Vec<char>,
    options: SimulationOptions,
    live: Set<Configuration>,
    steps: Vec<Vec<Configuration>>,
    pos: usize,
    taken: usize,
    verdict: Option<Verdict>,
}

impl<'a> Simulation<'a> {
    /// Validates `model` and opens a session on `input`. The initial
    /// ε-closure is computed eagerly and recorded as step 0; an input symbol
    /// the model never reads settles the session immediately with a
    /// [`RejectCause::ForeignSymbol`] verdict.
    pub fn new(
        model: &'a Automaton,
        input: &str,
        options: SimulationOptions,
    ) -> Result<Self, SimulationError> {
        let indexed = IndexedAutomaton::new(model)?;
        let input: Vec<char> = input.chars().collect();

        let init = match indexed.mode() {
            Mode::Dfa | Mode::Nfa | Mode::Mealy => Configuration::new(indexed.initial()),
            Mode::Moore => Configuration::new(indexed.initial())
                .emitting(indexed.state(indexed.initial()).output),
            Mode::Pda => Configuration::new(indexed.initial()).with_stack(),
            Mode::Tm => Configuration::new(indexed.initial())
                .with_tape(Tape::with_input(input.iter().copied())),
        };

        let mut session = Self {
            indexed,
            input,
            options,
            live: Set::new(),
            steps: Vec::new(),
            pos: 0,
            taken: 0,
            verdict: None,
        };

        match session.closure(vec![init]) {
            Ok(closed) => session.live = closed,
            Err(ClosureOverflow) => session.verdict = Some(Verdict::BudgetExceeded),
        }
        session.steps.push(session.live.iter().cloned().collect());
        trace!(
            "opened session with {} initial configuration(s)",
            session.live.len()
        );

        if session.verdict.is_none() {
            if let Some((position, &symbol)) = session
                .input
                .iter()
                .enumerate()
                .find(|(_, c)| !session.indexed.declares_symbol(**c))
            {
                debug!("input symbol {symbol} at {position} is not part of the alphabet");
                session.verdict = Some(Verdict::Reject(RejectCause::ForeignSymbol {
                    symbol,
                    position,
                }));
            }
        }
        if session.verdict.is_none() {
            session.settle();
        }
        Ok(session)
    }

    /// Advances every live configuration by one synchronous step: one input
    /// symbol for finite automata, pushdown automata and transducers, one
    /// machine step for a Turing machine. Records the resulting
    /// configuration set as the next frame.
    pub fn step(&mut self) -> StepOutcome {
        if let Some(verdict) = self.verdict {
            return StepOutcome::Finished(verdict);
        }
        if self.taken >= self.options.budget.max_steps {
            return self.finish(Verdict::BudgetExceeded);
        }

        match self.indexed.mode() {
            Mode::Tm => match self.tm_step() {
                Err(ClosureOverflow) => self.finish(Verdict::BudgetExceeded),
                Ok(TmStep { accepted, .. }) if !accepted.is_empty() => {
                    self.taken += 1;
                    self.steps.push(accepted);
                    self.finish(Verdict::Accept)
                }
                Ok(TmStep { successors, .. }) => self.admit(successors),
            },
            Mode::Dfa | Mode::Mealy | Mode::Moore => {
                let successors = self.deterministic_step();
                self.pos += 1;
                self.admit(successors)
            }
            Mode::Nfa | Mode::Pda => {
                let next = self.nondeterministic_step();
                self.pos += 1;
                match next {
                    Err(ClosureOverflow) => self.finish(Verdict::BudgetExceeded),
                    Ok(successors) => self.admit(successors),
                }
            }
        }
    }

    /// Drives the session to a verdict and returns the finished trace.
    pub fn run(mut self) -> Trace {
        let verdict = loop {
            if let StepOutcome::Finished(verdict) = self.step() {
                break verdict;
            }
        };
        let state_ids = (0..self.indexed.state_count())
            .map(|i| self.indexed.state(i).id.clone())
            .collect();
        Trace {
            state_ids,
            steps: self.steps,
            verdict,
        }
    }

    /// The currently live configurations, in insertion order.
    pub fn configurations(&self) -> impl Iterator<Item = &Configuration> {
        self.live.iter()
    }

    /// All frames recorded so far, frame 0 being the initial closure.
    pub fn frames(&self) -> &[Vec<Configuration>] {
        &self.steps
    }

    /// The verdict, once the session has settled.
    pub fn verdict(&self) -> Option<Verdict> {
        self.verdict
    }

    /// Resolves a configuration's arena index to its model state id.
    pub fn state_id(&self, configuration: &Configuration) -> &str {
        &self.indexed.state(configuration.state).id
    }

    /// The unconsumed input suffix of the given configuration.
    pub fn remaining_input(&self, configuration: &Configuration) -> String {
        self.input[configuration.consumed.min(self.input.len())..]
            .iter()
            .collect()
    }

    fn finish(&mut self, verdict: Verdict) -> StepOutcome {
        debug!("session settled after {} step(s): {verdict:?}", self.taken);
        self.verdict = Some(verdict);
        StepOutcome::Finished(verdict)
    }

    fn admit(&mut self, successors: Set<Configuration>) -> StepOutcome {
        self.taken += 1;
        if successors.len() > self.options.budget.max_configurations {
            return self.finish(Verdict::BudgetExceeded);
        }
        trace!(
            "step {} leaves {} live configuration(s)",
            self.taken,
            successors.len()
        );
        self.steps.push(successors.iter().cloned().collect());
        self.live = successors;
        if self.live.is_empty() {
            return self.finish(Verdict::Reject(RejectCause::NoLiveConfigurations));
        }
        self.settle();
        match self.verdict {
            Some(verdict) => StepOutcome::Finished(verdict),
            None => StepOutcome::Continue,
        }
    }

    /// Once all input is consumed, evaluate acceptance over the live set.
    /// Turing machines settle through halting instead.
    fn settle(&mut self) {
        if self.indexed.mode() == Mode::Tm || self.pos < self.input.len() {
            return;
        }
        let accepted = self.live.iter().any(|cfg| self.accepts(cfg));
        self.verdict = Some(if accepted {
            Verdict::Accept
        } else {
            Verdict::Reject(RejectCause::NotAccepting)
        });
        debug!("input exhausted: {:?}", self.verdict);
    }

    fn accepts(&self, configuration: &Configuration) -> bool {
        let state = self.indexed.state(configuration.state);
        match self.indexed.mode() {
            Mode::Dfa | Mode::Nfa | Mode::Tm => state.accepting,
            Mode::Pda => {
                state.accepting
                    && (self.options.pda_acceptance == PdaAcceptance::FinalState
                        || configuration.stack().is_some_and(|s| s.is_empty()))
            }
            // a transducer that consumed its whole input has succeeded
            Mode::Mealy | Mode::Moore => true,
        }
    }

    /// One deterministic step: the single live configuration follows the
    /// first edge matching the next input symbol. No matching edge means the
    /// successor set is empty and the run dies, there is no implicit
    /// self-loop.
    fn deterministic_step(&self) -> Set<Configuration> {
        let mut successors = Set::new();
        let (Some(cfg), Some(&symbol)) = (self.live.first(), self.input.get(self.pos)) else {
            return successors;
        };
        let next = self.indexed.edges_from(cfg.state).find_map(|edge| {
            match (self.indexed.mode(), edge.spec) {
                (Mode::Dfa, SymbolSpec::Char { read: Some(r) }) if *r == symbol => {
                    Some(self.consume(cfg, edge.target, None))
                }
                (Mode::Moore, SymbolSpec::Char { read: Some(r) }) if *r == symbol => {
                    Some(self.consume(cfg, edge.target, self.indexed.state(edge.target).output))
                }
                (Mode::Mealy, SymbolSpec::Output { read, emit }) if *read == symbol => {
                    Some(self.consume(cfg, edge.target, Some(*emit)))
                }
                _ => None,
            }
        });
        successors.extend(next);
        successors
    }

    /// One nondeterministic step: every live configuration takes every
    /// eligible consuming edge, then the result is ε-closed. Configurations
    /// without an eligible edge are dropped, never retried.
    fn nondeterministic_step(&self) -> Result<Set<Configuration>, ClosureOverflow> {
        let Some(&symbol) = self.input.get(self.pos) else {
            return Ok(Set::new());
        };
        let mut seed = Vec::new();
        for cfg in &self.live {
            for edge in self.indexed.edges_from(cfg.state) {
                match edge.spec {
                    SymbolSpec::Char { read: Some(r) } if *r == symbol => {
                        seed.push(self.consume(cfg, edge.target, None));
                    }
                    SymbolSpec::Stack {
                        read: Some(r),
                        pop,
                        push,
                    } if *r == symbol => {
                        if let Some(stack) =
                            cfg.stack().and_then(|s| apply_stack(s, *pop, push))
                        {
                            let mut next = self.consume(cfg, edge.target, None);
                            next.store = Store::Stack(stack);
                            seed.push(next);
                        }
                    }
                    _ => {}
                }
            }
        }
        self.closure(seed)
    }

    /// One Turing machine step. A configuration with no eligible edge has
    /// halted: in an accepting state that decides the run, otherwise the
    /// configuration is dropped.
    fn tm_step(&self) -> Result<TmStep, ClosureOverflow> {
        let mut accepted = Vec::new();
        let mut successors = Set::new();
        for cfg in &self.live {
            let Store::Tape(tape) = &cfg.store else {
                continue;
            };
            let cell = tape.read();
            let mut eligible = 0usize;
            for edge in self.indexed.edges_from(cfg.state) {
                let SymbolSpec::Tape {
                    read,
                    write,
                    motion,
                } = edge.spec
                else {
                    continue;
                };
                if *read != cell {
                    continue;
                }
                eligible += 1;
                if successors.len() >= self.options.budget.max_configurations {
                    return Err(ClosureOverflow);
                }
                let mut tape = tape.clone();
                tape.write(*write);
                tape.shift(*motion);
                successors.insert(Configuration {
                    state: edge.target,
                    consumed: cfg.consumed,
                    output: cfg.output.clone(),
                    store: Store::Tape(tape),
                });
            }
            if eligible == 0 && self.indexed.state(cfg.state).accepting {
                accepted.push(cfg.clone());
            }
        }
        Ok(TmStep {
            accepted,
            successors,
        })
    }

    fn consume(&self, cfg: &Configuration, target: usize, emit: Option<char>) -> Configuration {
        Configuration {
            state: target,
            consumed: cfg.consumed + 1,
            output: cfg.output.clone(),
            store: cfg.store.clone(),
        }
        .emitting(emit)
    }

    /// Expands a seed set with every configuration reachable through edges
    /// that consume no input (NFA ε-edges, PDA ε-edges including their stack
    /// effects). A configuration already seen is never re-expanded, which
    /// makes ε-cycles terminate; the configuration budget bounds ε-push
    /// loops that grow the stack forever.
    fn closure(&self, seed: Vec<Configuration>) -> Result<Set<Configuration>, ClosureOverflow> {
        let mut closed: Set<Configuration> = Set::new();
        let mut queue: VecDeque<Configuration> = seed.into();
        while let Some(cfg) = queue.pop_front() {
            if closed.contains(&cfg) {
                continue;
            }
            if closed.len() >= self.options.budget.max_configurations {
                return Err(ClosureOverflow);
            }
            for edge in self.indexed.edges_from(cfg.state) {
                match edge.spec {
                    SymbolSpec::Char { read: None } => {
                        queue.push_back(Configuration {
                            state: edge.target,
                            ..cfg.clone()
                        });
                    }
                    SymbolSpec::Stack {
                        read: None,
                        pop,
                        push,
                    } => {
                        if let Some(stack) = cfg.stack().and_then(|s| apply_stack(s, *pop, push)) {
                            queue.push_back(Configuration {
                                state: edge.target,
                                store: Store::Stack(stack),
                                ..cfg.clone()
                            });
                        }
                    }
                    _ => {}
                }
            }
            closed.insert(cfg);
        }
        Ok(closed)
    }
}

/// Applies a pushdown effect to a stack: the pop symbol must match the top
/// (an absent pop matches anything and pops nothing), then the push sequence
/// is appended in order so its last element becomes the new top. `None`
/// means the transition is not eligible.
fn apply_stack(stack: &[char], pop: Option<char>, push: &[char]) -> Option<Vec<char>> {
    let mut next = stack.to_vec();
    if let Some(expected) = pop {
        if next.pop() != Some(expected) {
            return None;
        }
    }
    next.extend_from_slice(push);
    Some(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Motion, State, Transition};

    fn read(c: char) -> SymbolSpec {
        SymbolSpec::Char { read: Some(c) }
    }

    /// DFA over {a, b}: q0 --a--> q1, q1 loops on a and b, q1 accepting.
    fn simple_dfa() -> Automaton {
        Automaton::new(Mode::Dfa)
            .with_state(State::new("q0").initial())
            .with_state(State::new("q1").accepting())
            .with_transition(Transition::new("t0", "q0", "q1", [read('a')]))
            .with_transition(Transition::new("t1", "q1", "q1", [read('a'), read('b')]))
    }

    fn balanced_parens_pda() -> Automaton {
        Automaton::new(Mode::Pda)
            .with_state(State::new("q0").initial().accepting())
            .with_transition(Transition::new(
                "t0",
                "q0",
                "q0",
                [SymbolSpec::Stack {
                    read: Some('('),
                    pop: None,
                    push: vec!['('],
                }],
            ))
            .with_transition(Transition::new(
                "t1",
                "q0",
                "q0",
                [SymbolSpec::Stack {
                    read: Some(')'),
                    pop: Some('('),
                    push: vec![],
                }],
            ))
    }

    #[test]
    fn dfa_accepts_and_rejects() {
        let model = simple_dfa();
        let trace = simulate(&model, "ab", SimulationOptions::default()).unwrap();
        assert_eq!(trace.verdict, Verdict::Accept);
        assert_eq!(trace.steps.len(), 3);

        let trace = simulate(&model, "ba", SimulationOptions::default()).unwrap();
        assert_eq!(
            trace.verdict,
            Verdict::Reject(RejectCause::NoLiveConfigurations)
        );
        // the rejecting step is recorded as an empty frame
        assert_eq!(trace.steps.len(), 2);
        assert!(trace.steps[1].is_empty());
    }

    #[test]
    fn dfa_empty_input_settles_immediately() {
        let model = simple_dfa();
        let trace = simulate(&model, "", SimulationOptions::default()).unwrap();
        assert_eq!(trace.verdict, Verdict::Reject(RejectCause::NotAccepting));
        assert_eq!(trace.steps.len(), 1);
    }

    #[test]
    fn foreign_symbol_is_distinguished() {
        let model = simple_dfa();
        let trace = simulate(&model, "ac", SimulationOptions::default()).unwrap();
        assert_eq!(
            trace.verdict,
            Verdict::Reject(RejectCause::ForeignSymbol {
                symbol: 'c',
                position: 1
            })
        );
    }

    #[test]
    fn invalid_model_is_an_error() {
        let model = Automaton::new(Mode::Dfa);
        assert!(matches!(
            simulate(&model, "a", SimulationOptions::default()),
            Err(SimulationError::InvalidModel(_))
        ));
    }

    #[test_log::test]
    fn nfa_initial_closure_and_acceptance() {
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

        let mut session = Simulation::new(&model, "x", SimulationOptions::default()).unwrap();
        // step 0 is the ε-closure of the initial state
        assert_eq!(session.frames()[0].len(), 2);
        assert_eq!(session.step(), StepOutcome::Finished(Verdict::Accept));
        assert_eq!(session.frames()[1].len(), 1);
        assert_eq!(session.state_id(&session.frames()[1][0]), "q2");
    }

    #[test]
    fn nfa_tracks_parallel_configurations() {
        // q0 --a--> q1 and q0 --a--> q2; only q2 loops to acceptance
        let model = Automaton::new(Mode::Nfa)
            .with_state(State::new("q0").initial())
            .with_state(State::new("q1"))
            .with_state(State::new("q2"))
            .with_state(State::new("q3").accepting())
            .with_transition(Transition::new("t0", "q0", "q1", [read('a')]))
            .with_transition(Transition::new("t1", "q0", "q2", [read('a')]))
            .with_transition(Transition::new("t2", "q2", "q3", [read('b')]))
            .with_transition(Transition::new("t3", "q1", "q1", [read('a')]));

        let mut session = Simulation::new(&model, "ab", SimulationOptions::default()).unwrap();
        assert_eq!(session.step(), StepOutcome::Continue);
        assert_eq!(session.configurations().count(), 2);
        // q1 has no edge on b and is dropped, q2 advances to q3
        assert_eq!(session.step(), StepOutcome::Finished(Verdict::Accept));
        assert_eq!(session.configurations().count(), 1);
    }

    #[test]
    fn pda_balanced_parentheses() {
        let model = balanced_parens_pda();
        let options = SimulationOptions {
            pda_acceptance: PdaAcceptance::EmptyStack,
            ..Default::default()
        };
        assert_eq!(
            simulate(&model, "(())", options).unwrap().verdict,
            Verdict::Accept
        );
        // an unclosed paren leaves the stack non-empty
        assert_eq!(
            simulate(&model, "(()", options).unwrap().verdict,
            Verdict::Reject(RejectCause::NotAccepting)
        );
        // a stray closer finds no matching stack top and the run dies early
        assert_eq!(
            simulate(&model, "())", options).unwrap().verdict,
            Verdict::Reject(RejectCause::NoLiveConfigurations)
        );
    }

    #[test]
    fn pda_final_state_acceptance_ignores_stack() {
        let model = balanced_parens_pda();
        let trace = simulate(&model, "((", SimulationOptions::default()).unwrap();
        assert_eq!(trace.verdict, Verdict::Accept);
    }

    #[test]
    fn pda_epsilon_push_loop_hits_budget() {
        let model = Automaton::new(Mode::Pda)
            .with_state(State::new("q0").initial().accepting())
            .with_transition(Transition::new(
                "t0",
                "q0",
                "q0",
                [SymbolSpec::Stack {
                    read: None,
                    pop: None,
                    push: vec!['A'],
                }],
            ));
        let options = SimulationOptions {
            budget: StepBudget {
                max_steps: 100,
                max_configurations: 50,
            },
            ..Default::default()
        };
        let session = Simulation::new(&model, "", options).unwrap();
        assert_eq!(session.verdict(), Some(Verdict::BudgetExceeded));
    }

    #[test]
    fn mealy_emits_per_symbol() {
        let model = Automaton::new(Mode::Mealy)
            .with_state(State::new("q0").initial())
            .with_transition(Transition::new(
                "t0",
                "q0",
                "q0",
                [
                    SymbolSpec::Output {
                        read: 'a',
                        emit: '0',
                    },
                    SymbolSpec::Output {
                        read: 'b',
                        emit: '1',
                    },
                ],
            ));
        let trace = simulate(&model, "abba", SimulationOptions::default()).unwrap();
        assert_eq!(trace.verdict, Verdict::Accept);
        assert_eq!(trace.steps[4][0].output, "0110");
    }

    #[test]
    fn moore_emits_initial_output() {
        let model = Automaton::new(Mode::Moore)
            .with_state(State::new("q0").initial().with_output('x'))
            .with_state(State::new("q1").with_output('y'))
            .with_transition(Transition::new("t0", "q0", "q1", [read('a')]));
        let trace = simulate(&model, "a", SimulationOptions::default()).unwrap();
        assert_eq!(trace.verdict, Verdict::Accept);
        assert_eq!(trace.steps[0][0].output, "x");
        assert_eq!(trace.steps[1][0].output, "xy");
    }

    #[test]
    fn moore_undefined_transition_rejects() {
        // b is declared (q1 reads it) but q1 has no edge on a
        let model = Automaton::new(Mode::Moore)
            .with_state(State::new("q0").initial().with_output('x'))
            .with_state(State::new("q1").with_output('y'))
            .with_transition(Transition::new("t0", "q0", "q1", [read('a')]))
            .with_transition(Transition::new("t1", "q1", "q0", [read('b')]));
        let trace = simulate(&model, "aa", SimulationOptions::default()).unwrap();
        assert_eq!(
            trace.verdict,
            Verdict::Reject(RejectCause::NoLiveConfigurations)
        );
    }

    #[test]
    fn tm_accepts_on_halt_in_accepting_state() {
        // writes a mark, moves right over the input, halts in q1
        let model = Automaton::new(Mode::Tm)
            .with_state(State::new("q0").initial())
            .with_state(State::new("q1").accepting())
            .with_transition(Transition::new(
                "t0",
                "q0",
                "q0",
                [SymbolSpec::Tape {
                    read: Some('a'),
                    write: Some('a'),
                    motion: Motion::Right,
                }],
            ))
            .with_transition(Transition::new(
                "t1",
                "q0",
                "q1",
                [SymbolSpec::Tape {
                    read: None,
                    write: None,
                    motion: Motion::Stay,
                }],
            ));
        let trace = simulate(&model, "aaa", SimulationOptions::default()).unwrap();
        assert_eq!(trace.verdict, Verdict::Accept);
    }

    #[test]
    fn tm_halt_in_nonaccepting_state_rejects() {
        let model = Automaton::new(Mode::Tm)
            .with_state(State::new("q0").initial())
            .with_transition(Transition::new(
                "t0",
                "q0",
                "q0",
                [SymbolSpec::Tape {
                    read: Some('a'),
                    write: Some('a'),
                    motion: Motion::Right,
                }],
            ));
        let trace = simulate(&model, "a", SimulationOptions::default()).unwrap();
        assert_eq!(
            trace.verdict,
            Verdict::Reject(RejectCause::NoLiveConfigurations)
        );
    }

    #[test]
    fn tm_walks_left_unbounded() {
        // keeps writing marks while walking left, never halts
        let model = Automaton::new(Mode::Tm)
            .with_state(State::new("q0").initial())
            .with_transition(Transition::new(
                "t0",
                "q0",
                "q0",
                [SymbolSpec::Tape {
                    read: None,
                    write: Some('m'),
                    motion: Motion::Left,
                }],
            ));
        let options = SimulationOptions {
            budget: StepBudget {
                max_steps: 1200,
                max_configurations: 16,
            },
            ..Default::default()
        };
        let mut session = Simulation::new(&model, "", options).unwrap();
        let verdict = loop {
            if let StepOutcome::Finished(v) = session.step() {
                break v;
            }
        };
        assert_eq!(verdict, Verdict::BudgetExceeded);
        let cfg = session.configurations().next().unwrap();
        let tape = cfg.tape().unwrap();
        assert_eq!(tape.head(), -1200);
        assert_eq!(tape.written_span(), Some((-1199, 0)));
    }

    #[test]
    fn tm_accepts_after_left_excursion() {
        // q0 steps left off the input, q1 marks the blank cell and returns,
        // q2 re-reads the original symbol and halts accepting in q3
        let model = Automaton::new(Mode::Tm)
            .with_state(State::new("q0").initial())
            .with_state(State::new("q1"))
            .with_state(State::new("q2"))
            .with_state(State::new("q3").accepting())
            .with_transition(Transition::new(
                "t0",
                "q0",
                "q1",
                [SymbolSpec::Tape {
                    read: Some('a'),
                    write: Some('a'),
                    motion: Motion::Left,
                }],
            ))
            .with_transition(Transition::new(
                "t1",
                "q1",
                "q2",
                [SymbolSpec::Tape {
                    read: None,
                    write: Some('c'),
                    motion: Motion::Right,
                }],
            ))
            .with_transition(Transition::new(
                "t2",
                "q2",
                "q3",
                [SymbolSpec::Tape {
                    read: Some('a'),
                    write: Some('a'),
                    motion: Motion::Right,
                }],
            ));
        let trace = simulate(&model, "a", SimulationOptions::default()).unwrap();
        assert_eq!(trace.verdict, Verdict::Accept);
    }

    #[test]
    fn step_budget_reports_distinctly() {
        let model = simple_dfa();
        let options = SimulationOptions {
            budget: StepBudget {
                max_steps: 1,
                max_configurations: 10,
            },
            ..Default::default()
        };
        let trace = simulate(&model, "aaaa", options).unwrap();
        assert_eq!(trace.verdict, Verdict::BudgetExceeded);
    }

    #[test]
    fn remaining_input_reflects_consumption() {
        let model = simple_dfa();
        let mut session = Simulation::new(&model, "ab", SimulationOptions::default()).unwrap();
        session.step();
        let cfg = session.configurations().next().unwrap().clone();
        assert_eq!(session.remaining_input(&cfg), "b");
    }
}
