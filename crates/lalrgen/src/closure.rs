//! Closure construction over dotted items.

use crate::{
    first_sets::FirstSets,
    grammar::{AugmentedGrammar, NonterminalID, RuleID, SymbolID, TerminalID},
    types::{Map, Queue, Set},
    util::{display_fn, separated},
};
use std::{collections::BTreeSet, fmt};

/// The LR(0) part of a dotted item.
///
/// Two items with the same core are the same item, whatever their
/// lookahead symbols are.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemCore {
    pub rule: RuleID,
    pub marker: usize,
}

pub type ItemCores = BTreeSet<ItemCore>;

/// A dotted item with its lookahead symbols, a.k.a. kernel item.
#[derive(Debug, Clone)]
pub struct KernelItem {
    pub core: ItemCore,
    pub lookaheads: Set<TerminalID>,
}

impl KernelItem {
    pub fn new<L>(rule: RuleID, marker: usize, lookaheads: L) -> Self
    where
        L: IntoIterator<Item = TerminalID>,
    {
        Self {
            core: ItemCore { rule, marker },
            lookaheads: lookaheads.into_iter().collect(),
        }
    }

    /// The symbol right after the marker, if any.
    pub fn next_symbol(&self, g: &AugmentedGrammar<'_>) -> Option<SymbolID> {
        g.rule(self.core.rule).right().get(self.core.marker).copied()
    }

    /// Whether the parser may reduce by this item.
    pub fn is_reducible(&self, g: &AugmentedGrammar<'_>) -> bool {
        let rule = g.rule(self.core.rule);
        self.core.marker == rule.right().len() || rule.is_epsilon()
    }

    pub fn display<'g>(&'g self, g: &'g AugmentedGrammar<'g>) -> impl fmt::Display + 'g {
        display_fn(move |f| {
            let grammar = g.grammar();
            let rule = g.rule(self.core.rule);
            write!(f, "{} :=", grammar.nonterminal(rule.left()))?;
            for (i, symbol) in rule.right().iter().enumerate() {
                if i == self.core.marker {
                    f.write_str(" .")?;
                }
                write!(f, " {}", grammar.symbol_name(*symbol))?;
            }
            if self.core.marker == rule.right().len() {
                f.write_str(" .")?;
            }
            display_lookaheads(f, g, &self.lookaheads)
        })
    }
}

/// All productions of a nonterminal with the marker at the beginning,
/// sharing the same lookahead symbols, a.k.a. normal item.
#[derive(Debug, Clone)]
pub struct PendingItem {
    pub symbol: NonterminalID,
    pub lookaheads: Set<TerminalID>,
}

impl PendingItem {
    pub fn display<'g>(&'g self, g: &'g AugmentedGrammar<'g>) -> impl fmt::Display + 'g {
        display_fn(move |f| {
            let grammar = g.grammar();
            write!(f, "{} := .", grammar.nonterminal(self.symbol))?;
            for (i, &rule) in g.productions_of(self.symbol).iter().enumerate() {
                if i > 0 {
                    f.write_str(" |")?;
                }
                for symbol in g.rule(rule).right() {
                    write!(f, " {}", grammar.symbol_name(*symbol))?;
                }
            }
            display_lookaheads(f, g, &self.lookaheads)
        })
    }
}

fn display_lookaheads(
    f: &mut fmt::Formatter<'_>,
    g: &AugmentedGrammar<'_>,
    lookaheads: &Set<TerminalID>,
) -> fmt::Result {
    let grammar = g.grammar();
    let names = lookaheads.iter().map(|t| grammar.terminal(*t));
    write!(f, "  [{}]", separated(names, " "))
}

/// The item set of one parser state.
#[derive(Debug, Clone)]
pub struct Closure {
    kernels: Vec<KernelItem>,
    pendings: Vec<PendingItem>,
}

impl Closure {
    pub fn kernels(&self) -> &[KernelItem] {
        &self.kernels[..]
    }

    pub fn pendings(&self) -> &[PendingItem] {
        &self.pendings[..]
    }

    pub fn pending(&self, symbol: NonterminalID) -> Option<&PendingItem> {
        self.pendings.iter().find(|p| p.symbol == symbol)
    }

    /// The identity of this closure.
    pub fn cores(&self) -> ItemCores {
        self.kernels.iter().map(|k| k.core).collect()
    }

    /// Symbols that the closure has a transition on, in discovery order.
    pub fn next_symbols(&self, g: &AugmentedGrammar<'_>) -> Vec<SymbolID> {
        let blank = SymbolID::T(g.grammar().blank_symbol());
        let mut symbols = Set::default();
        for kernel in &self.kernels {
            if kernel.core.marker < g.rule(kernel.core.rule).right().len() {
                symbols.extend(kernel.next_symbol(g));
            }
        }
        for pending in &self.pendings {
            for &rule in g.productions_of(pending.symbol) {
                symbols.insert(g.rule(rule).right()[0]);
            }
        }
        symbols.into_iter().filter(|s| *s != blank).collect()
    }

    /// Extract the unexpanded kernel of the closure reached by `symbol`.
    pub fn goto_seed(&self, g: &AugmentedGrammar<'_>, symbol: SymbolID) -> Vec<KernelItem> {
        let mut seed: Vec<KernelItem> = vec![];
        let mut add = |core: ItemCore, lookaheads: &Set<TerminalID>| {
            match seed.iter_mut().find(|k| k.core == core) {
                Some(kernel) => kernel.lookaheads.extend(lookaheads.iter().copied()),
                None => seed.push(KernelItem {
                    core,
                    lookaheads: lookaheads.clone(),
                }),
            }
        };

        for kernel in &self.kernels {
            if kernel.next_symbol(g) == Some(symbol) {
                let core = ItemCore {
                    rule: kernel.core.rule,
                    marker: kernel.core.marker + 1,
                };
                add(core, &kernel.lookaheads);
            }
        }
        for pending in &self.pendings {
            for &rule in g.productions_of(pending.symbol) {
                if g.rule(rule).right()[0] == symbol {
                    add(ItemCore { rule, marker: 1 }, &pending.lookaheads);
                }
            }
        }

        seed
    }

    /// Iterate over the productions that reduce in this closure together
    /// with their lookahead symbols: the reducible kernel items first, then
    /// the epsilon productions of the pending items.
    pub fn reductions<'a>(
        &'a self,
        g: &'a AugmentedGrammar<'a>,
    ) -> impl Iterator<Item = (RuleID, &'a Set<TerminalID>)> + 'a {
        let kernels = self
            .kernels
            .iter()
            .filter(move |k| k.is_reducible(g))
            .map(|k| (k.core.rule, &k.lookaheads));
        let epsilons = self.pendings.iter().flat_map(move |p| {
            g.productions_of(p.symbol)
                .iter()
                .filter(move |&&rule| g.rule(rule).is_epsilon())
                .map(move |&rule| (rule, &p.lookaheads))
        });
        kernels.chain(epsilons)
    }

    /// Union the lookaheads of `seed` into the kernel items with the same
    /// cores, returning whether anything was added.
    pub(crate) fn merge_lookaheads(&mut self, seed: &[KernelItem]) -> bool {
        let mut changed = false;
        for item in seed {
            if let Some(kernel) = self.kernels.iter_mut().find(|k| k.core == item.core) {
                for lookahead in &item.lookaheads {
                    changed |= kernel.lookaheads.insert(*lookahead);
                }
            }
        }
        changed
    }

    pub fn display<'g>(&'g self, g: &'g AugmentedGrammar<'g>) -> impl fmt::Display + 'g {
        display_fn(move |f| {
            for kernel in &self.kernels {
                writeln!(f, "- {}", kernel.display(g))?;
            }
            for pending in &self.pendings {
                writeln!(f, "- {}", pending.display(g))?;
            }
            Ok(())
        })
    }
}

/// Two epsilon productions met in the kernel of one state.
#[derive(Debug, thiserror::Error)]
#[error("found {} epsilon productions in one kernel", rules.len())]
pub struct AmbiguousEpsilonError {
    pub rules: Vec<RuleID>,
}

/// Builds closures from kernel items.
#[derive(Debug)]
pub struct ClosureEngine<'g> {
    grammar: &'g AugmentedGrammar<'g>,
    sets: FirstSets,
}

impl<'g> ClosureEngine<'g> {
    pub fn new(grammar: &'g AugmentedGrammar<'g>) -> Self {
        Self {
            grammar,
            sets: FirstSets::new(grammar),
        }
    }

    pub fn first_sets(&self) -> &FirstSets {
        &self.sets
    }

    /// Expand the specified kernel items into a closure.
    pub fn close(&self, seed: Vec<KernelItem>) -> Result<Closure, AmbiguousEpsilonError> {
        let epsilons: Vec<RuleID> = seed
            .iter()
            .map(|k| k.core.rule)
            .filter(|rule| self.grammar.rule(*rule).is_epsilon())
            .collect();
        if epsilons.len() > 1 {
            return Err(AmbiguousEpsilonError { rules: epsilons });
        }

        let pendings = self.expand(&seed);
        Ok(Closure {
            kernels: seed,
            pendings,
        })
    }

    /// Recompute the pending items after the kernel lookaheads changed.
    pub(crate) fn refresh(&self, closure: &mut Closure) {
        closure.pendings = self.expand(&closure.kernels);
    }

    fn expand(&self, kernels: &[KernelItem]) -> Vec<PendingItem> {
        let g = self.grammar;

        let mut pendings: Vec<PendingItem> = vec![];
        let mut index: Map<NonterminalID, usize> = Map::default();
        let mut get_or_insert = |pendings: &mut Vec<PendingItem>, symbol: NonterminalID| {
            if let Some(&i) = index.get(&symbol) {
                return (i, false);
            }
            let i = pendings.len();
            pendings.push(PendingItem {
                symbol,
                lookaheads: Set::default(),
            });
            index.insert(symbol, i);
            (i, true)
        };
        let mut queue = Queue::<NonterminalID>::default();

        // [X -> ... @ Y beta]
        for kernel in kernels {
            let right = g.rule(kernel.core.rule).right();
            let symbol = match right.get(kernel.core.marker) {
                Some(SymbolID::N(symbol)) => *symbol,
                _ => continue,
            };
            let lookaheads = match right.get(kernel.core.marker + 1) {
                Some(beta) => self.sets.first(*beta),
                None => kernel.lookaheads.clone(),
            };
            let (i, _) = get_or_insert(&mut pendings, symbol);
            pendings[i].lookaheads.extend(lookaheads);
            queue.push(symbol);
        }

        // [Y -> @ Z gamma]
        //  The lookaheads of Z are re-propagated whenever those of Y grow.
        while let Some(symbol) = queue.pop() {
            let (parent, _) = get_or_insert(&mut pendings, symbol);
            for &rule in g.productions_of(symbol) {
                let right = g.rule(rule).right();
                let next = match right[0] {
                    SymbolID::N(next) => next,
                    SymbolID::T(..) => continue,
                };
                let lookaheads = match right.get(1) {
                    Some(gamma) => self.sets.first(*gamma),
                    None => pendings[parent].lookaheads.clone(),
                };
                let (i, created) = get_or_insert(&mut pendings, next);
                let mut grown = false;
                for lookahead in lookaheads {
                    grown |= pendings[i].lookaheads.insert(lookahead);
                }
                if created || grown {
                    queue.push(next);
                }
            }
        }

        pendings
    }
}
