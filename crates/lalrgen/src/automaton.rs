//! The LALR(1) automaton.

use crate::{
    closure::{AmbiguousEpsilonError, Closure, ClosureEngine, ItemCores, KernelItem},
    grammar::{AugmentedGrammar, Grammar, NonterminalID, RuleID, SymbolID, TerminalID},
    types::{Map, Queue},
    util::display_fn,
};
use std::{collections::VecDeque, fmt};

#[derive(Debug, thiserror::Error)]
pub enum AutomatonError {
    /// Two epsilon productions in one kernel.
    ///
    /// The blank symbol is never a transition label, so the kernels built
    /// by [`Config::build`] never hold an epsilon item. Only a seed built by
    /// hand and passed to [`ClosureEngine::close`] can trigger this.
    #[error("state {state} has more than one epsilon production in its kernel")]
    AmbiguousEpsilon {
        state: StateID,
        #[source]
        source: AmbiguousEpsilonError,
    },

    #[error("shift/reduce conflict in state {state} on `{token}': shift({shift}) or reduce({rule})")]
    ShiftReduceConflict {
        state: StateID,
        terminal: TerminalID,
        token: String,
        shift: StateID,
        reduce: RuleID,
        rule: String,
    },

    #[error(
        "reduce/reduce conflict in state {state} on `{token}': reduce({first_rule}) or reduce({second_rule})"
    )]
    ReduceReduceConflict {
        state: StateID,
        terminal: TerminalID,
        token: String,
        first: RuleID,
        second: RuleID,
        first_rule: String,
        second_rule: String,
    },
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum MergeMode {
    /// A state reached again under the same item cores keeps the lookahead
    /// symbols it was created with.
    #[default]
    FirstDiscovered,

    /// Items are compatible in the sense of DeRemer's LALR(1) method, that is,
    /// the lookahead symbols of every path reaching the same item cores are
    /// merged into one state.
    Lalr,
}

#[derive(Debug, Default, Clone)]
pub struct Config {
    merge_mode: MergeMode,
}

impl Config {
    pub const fn new() -> Self {
        Self {
            merge_mode: MergeMode::FirstDiscovered,
        }
    }

    /// Keep the lookahead symbols of the first path reaching each state.
    ///
    /// This is the default strategy.
    pub fn use_first_discovered(&mut self) -> &mut Self {
        self.merge_mode = MergeMode::FirstDiscovered;
        self
    }

    /// Set the merge strategy of states to match DeRemer's LALR(1) method.
    pub fn use_lalr(&mut self) -> &mut Self {
        self.merge_mode = MergeMode::Lalr;
        self
    }

    pub fn merge_mode(&self) -> MergeMode {
        self.merge_mode
    }

    /// Build the automaton of the specified grammar with this configuration.
    pub fn build(&self, grammar: &Grammar) -> Result<Automaton, AutomatonError> {
        let augmented = grammar.augment();
        let mut builder = AutomatonBuilder::new(&augmented, self.merge_mode);
        builder.populate()?;
        Ok(Automaton {
            states: builder.states,
        })
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct StateID {
    raw: u32,
}

impl StateID {
    pub const START: Self = Self::new(0);

    const fn new(raw: u32) -> Self {
        Self { raw }
    }

    pub const fn raw(self) -> u32 {
        self.raw
    }
}

impl fmt::Display for StateID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}", self.raw)
    }
}

#[derive(Debug)]
pub struct State {
    closure: Closure,
    transitions: Map<SymbolID, StateID>,
    reduces: Map<TerminalID, RuleID>,
}

impl State {
    pub fn closure(&self) -> &Closure {
        &self.closure
    }

    /// Iterate over the outgoing edges in discovery order.
    pub fn transitions(&self) -> impl Iterator<Item = (SymbolID, StateID)> + '_ {
        self.transitions.iter().map(|(symbol, target)| (*symbol, *target))
    }

    pub fn transition(&self, symbol: SymbolID) -> Option<StateID> {
        self.transitions.get(&symbol).copied()
    }

    pub fn shifts(&self) -> impl Iterator<Item = (TerminalID, StateID)> + '_ {
        self.transitions().filter_map(|(symbol, target)| match symbol {
            SymbolID::T(t) => Some((t, target)),
            SymbolID::N(..) => None,
        })
    }

    pub fn gotos(&self) -> impl Iterator<Item = (NonterminalID, StateID)> + '_ {
        self.transitions().filter_map(|(symbol, target)| match symbol {
            SymbolID::N(n) => Some((n, target)),
            SymbolID::T(..) => None,
        })
    }

    pub fn reduces(&self) -> impl Iterator<Item = (TerminalID, RuleID)> + '_ {
        self.reduces.iter().map(|(token, rule)| (*token, *rule))
    }

    pub fn reduce(&self, token: TerminalID) -> Option<RuleID> {
        self.reduces.get(&token).copied()
    }
}

#[derive(Debug)]
pub struct Automaton {
    states: Map<StateID, State>,
}

impl Automaton {
    /// Build the automaton of the specified grammar with the default
    /// configuration.
    pub fn build(grammar: &Grammar) -> Result<Self, AutomatonError> {
        Config::new().build(grammar)
    }

    /// Iterate over the states in creation order, which is also the
    /// order of their identifiers.
    pub fn states(&self) -> impl Iterator<Item = (StateID, &State)> + '_ {
        self.states.iter().map(|(id, state)| (*id, state))
    }

    pub fn state(&self, id: StateID) -> &State {
        &self.states[&id]
    }

    pub fn start_state(&self) -> StateID {
        StateID::START
    }

    pub fn num_states(&self) -> usize {
        self.states.len()
    }

    pub fn display<'g>(&'g self, g: &'g Grammar) -> impl fmt::Display + 'g {
        display_fn(move |f| {
            let augmented = g.augment();
            for (i, (id, state)) in self.states().enumerate() {
                if i > 0 {
                    writeln!(f)?;
                }

                writeln!(f, "#### State {}", id)?;
                writeln!(f, "## items")?;
                write!(f, "{}", state.closure.display(&augmented))?;

                writeln!(f, "## shifts")?;
                for (token, target) in state.shifts() {
                    writeln!(f, "- {} => shift({})", g.terminal(token), target)?;
                }

                writeln!(f, "## gotos")?;
                for (symbol, target) in state.gotos() {
                    writeln!(f, "- {} => goto({})", g.nonterminal(symbol), target)?;
                }

                writeln!(f, "## reduces")?;
                for (token, rule) in state.reduces() {
                    let rule = augmented.rule(rule);
                    writeln!(f, "- {} => reduce({})", g.terminal(token), rule.display(g))?;
                }
            }
            Ok(())
        })
    }
}

#[derive(Debug)]
struct AutomatonBuilder<'g> {
    grammar: &'g AugmentedGrammar<'g>,
    engine: ClosureEngine<'g>,
    merge_mode: MergeMode,
    states: Map<StateID, State>,
    same_cores: Map<ItemCores, StateID>,
    pending_states: VecDeque<StateID>,
    dirty_states: Queue<StateID>,
}

impl<'g> AutomatonBuilder<'g> {
    fn new(grammar: &'g AugmentedGrammar<'g>, merge_mode: MergeMode) -> Self {
        Self {
            grammar,
            engine: ClosureEngine::new(grammar),
            merge_mode,
            states: Map::default(),
            same_cores: Map::default(),
            pending_states: VecDeque::new(),
            dirty_states: Queue::default(),
        }
    }

    fn populate(&mut self) -> Result<(), AutomatonError> {
        let g = self.grammar;

        // [$start -> @ S] {$end}
        let end = g.grammar().end_symbol();
        self.intern(vec![KernelItem::new(RuleID::ACCEPT, 0, Some(end))])?;

        // 新規に状態が生成されなくなるまで繰り返す
        while let Some(id) = self.pending_states.pop_front() {
            let seeds: Vec<(SymbolID, Vec<KernelItem>)> = {
                let closure = &self.states[&id].closure;
                closure
                    .next_symbols(g)
                    .into_iter()
                    .map(|symbol| (symbol, closure.goto_seed(g, symbol)))
                    .collect()
            };

            for (symbol, seed) in seeds {
                let target = self.intern(seed)?;
                tracing::trace!(
                    from = %id,
                    to = %target,
                    symbol = g.grammar().symbol_name(symbol),
                    "goto"
                );
                self.states[&id].transitions.insert(symbol, target);
            }

            if self.merge_mode == MergeMode::FirstDiscovered {
                self.assign_reduces(id)?;
            }
        }

        if self.merge_mode == MergeMode::Lalr {
            self.propagate_lookaheads();
            for i in 0..self.states.len() {
                self.assign_reduces(StateID::new(i as u32))?;
            }
        }

        tracing::debug!(
            states = self.states.len(),
            mode = ?self.merge_mode,
            "automaton built"
        );

        Ok(())
    }

    /// Return the state identified by the cores of `seed`, creating it if
    /// no such state exists yet.
    fn intern(&mut self, seed: Vec<KernelItem>) -> Result<StateID, AutomatonError> {
        let cores: ItemCores = seed.iter().map(|k| k.core).collect();

        if let Some(&id) = self.same_cores.get(&cores) {
            if self.merge_mode == MergeMode::Lalr
                && self.states[&id].closure.merge_lookaheads(&seed)
            {
                tracing::debug!(state = %id, "merged lookaheads");
                self.dirty_states.push(id);
            }
            return Ok(id);
        }

        let id = StateID::new(self.states.len() as u32);
        let closure = self
            .engine
            .close(seed)
            .map_err(|source| AutomatonError::AmbiguousEpsilon { state: id, source })?;
        tracing::debug!(
            state = %id,
            kernels = closure.kernels().len(),
            pendings = closure.pendings().len(),
            "created state"
        );

        self.states.insert(
            id,
            State {
                closure,
                transitions: Map::default(),
                reduces: Map::default(),
            },
        );
        self.same_cores.insert(cores, id);
        self.pending_states.push_back(id);

        Ok(id)
    }

    /// Push merged lookaheads through the closures and successors of the
    /// modified states until nothing changes.
    fn propagate_lookaheads(&mut self) {
        let g = self.grammar;
        let mut rounds = 0;
        while let Some(id) = self.dirty_states.pop() {
            rounds += 1;
            let state = &mut self.states[&id];
            self.engine.refresh(&mut state.closure);

            let edges: Vec<(StateID, Vec<KernelItem>)> = state
                .transitions
                .iter()
                .map(|(symbol, target)| (*target, state.closure.goto_seed(g, *symbol)))
                .collect();
            for (target, seed) in edges {
                if self.states[&target].closure.merge_lookaheads(&seed) {
                    self.dirty_states.push(target);
                }
            }
        }
        tracing::debug!(rounds, "propagated lookaheads");
    }

    fn assign_reduces(&mut self, id: StateID) -> Result<(), AutomatonError> {
        let g = self.grammar;
        let grammar = g.grammar();
        let blank = grammar.blank_symbol();
        let state = &mut self.states[&id];

        let mut reduces: Map<TerminalID, RuleID> = Map::default();
        for (rule, lookaheads) in state.closure.reductions(g) {
            for &token in lookaheads {
                if token == blank {
                    continue;
                }

                if let Some(&first) = reduces.get(&token) {
                    return Err(AutomatonError::ReduceReduceConflict {
                        state: id,
                        terminal: token,
                        token: grammar.terminal(token).name().to_owned(),
                        first,
                        second: rule,
                        first_rule: g.rule(first).display(grammar).to_string(),
                        second_rule: g.rule(rule).display(grammar).to_string(),
                    });
                }

                if let Some(&shift) = state.transitions.get(&SymbolID::T(token)) {
                    return Err(AutomatonError::ShiftReduceConflict {
                        state: id,
                        terminal: token,
                        token: grammar.terminal(token).name().to_owned(),
                        shift,
                        reduce: rule,
                        rule: g.rule(rule).display(grammar).to_string(),
                    });
                }

                tracing::trace!(
                    state = %id,
                    token = grammar.terminal(token).name(),
                    rule = %rule,
                    "reduce"
                );
                reduces.insert(token, rule);
            }
        }

        state.reduces = reduces;
        Ok(())
    }
}
