//! Calculation of FIRST and FOLLOW sets.

use crate::{
    grammar::{AugmentedGrammar, NonterminalID, SymbolID, TerminalID},
    types::{Map, Set},
};

/// FIRST and FOLLOW sets of every symbol in an augmented grammar.
///
/// `First(N)` is not the textbook one: when some production of `N` can
/// derive the empty string, `Follow(N)` is folded into `First(N)`. The
/// blank symbol stays in `First(N)` as the marker of nullability.
#[derive(Debug)]
pub struct FirstSets {
    blank: TerminalID,
    first: Map<NonterminalID, Set<TerminalID>>,
    follow: Map<NonterminalID, Set<TerminalID>>,
}

impl FirstSets {
    pub fn new(g: &AugmentedGrammar<'_>) -> Self {
        let blank = g.grammar().blank_symbol();

        // First(N) = Follow(N) = {} と初期化する
        let mut first: Map<NonterminalID, Set<TerminalID>> = Map::default();
        let mut follow: Map<NonterminalID, Set<TerminalID>> = Map::default();
        for symbol in g.nonterminals() {
            first.insert(symbol, Set::default());
            follow.insert(symbol, Set::default());
        }

        // Both definitions are monotone, so the sets are refined until
        // nothing changes regardless of the visiting order.
        let mut iterations = 0;
        let mut changed = true;
        while changed {
            changed = false;
            iterations += 1;

            for symbol in g.nonterminals() {
                for &rule in g.productions_of(symbol) {
                    let mut nullable = true;
                    let mut added = Set::default();
                    for &y in g.rule(rule).right() {
                        let y_first = first_of(&first, y);
                        let has_blank = y_first.contains(&blank);
                        added.extend(y_first);
                        if !has_blank {
                            nullable = false;
                            break;
                        }
                    }
                    if nullable {
                        added.extend(follow[&symbol].iter().copied());
                    }
                    changed |= extend(&mut first[&symbol], added);
                }
            }

            for rule in g.rules() {
                let right = rule.right();
                for (i, symbol) in right.iter().enumerate() {
                    let symbol = match symbol {
                        SymbolID::N(n) => *n,
                        SymbolID::T(..) => continue,
                    };
                    let added = match right.get(i + 1) {
                        Some(next) => first_of(&first, *next),
                        None => follow[&rule.left()].clone(),
                    };
                    changed |= extend(&mut follow[&symbol], added);
                }
            }
        }

        tracing::debug!(iterations, "computed FIRST/FOLLOW sets");

        Self {
            blank,
            first,
            follow,
        }
    }

    /// `First(symbol)`
    pub fn first(&self, symbol: SymbolID) -> Set<TerminalID> {
        first_of(&self.first, symbol)
    }

    /// `Follow(symbol)`, which is empty for anything but a nonterminal.
    pub fn follow(&self, symbol: SymbolID) -> Set<TerminalID> {
        match symbol {
            SymbolID::N(n) => self.follow[&n].clone(),
            SymbolID::T(..) => Set::default(),
        }
    }

    /// Whether `First(symbol)` contains the blank symbol.
    ///
    /// This over-approximates nullability, since the blank symbol also
    /// leaks in through the folded FOLLOW sets.
    pub fn has_blank(&self, symbol: SymbolID) -> bool {
        match symbol {
            SymbolID::T(t) => t == self.blank,
            SymbolID::N(n) => self.first[&n].contains(&self.blank),
        }
    }
}

fn first_of(first: &Map<NonterminalID, Set<TerminalID>>, symbol: SymbolID) -> Set<TerminalID> {
    match symbol {
        SymbolID::T(t) => Some(t).into_iter().collect(),
        SymbolID::N(n) => first[&n].clone(),
    }
}

fn extend(set: &mut Set<TerminalID>, added: Set<TerminalID>) -> bool {
    let mut changed = false;
    for t in added {
        changed |= set.insert(t);
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{Grammar, SymbolID::*};

    fn set(tokens: &[TerminalID]) -> Set<TerminalID> {
        tokens.iter().copied().collect()
    }

    #[test]
    fn pointer_grammar() {
        let mut ids = None;
        let grammar = Grammar::define(|g| {
            let _ = g.blank_symbol("Blank")?;
            let end = g.end_symbol("$")?;
            let star = g.terminal("*")?;
            let ident = g.terminal("id")?;
            let equal = g.terminal("=")?;
            let s = g.nonterminal("S")?;
            let l = g.nonterminal("L")?;
            let r = g.nonterminal("R")?;
            g.rule(s, [N(l), T(equal), N(r)])?;
            g.rule(s, [N(r)])?;
            g.rule(l, [T(star), N(r)])?;
            g.rule(l, [T(ident)])?;
            g.rule(r, [N(l)])?;
            g.start_symbol(s)?;
            ids = Some((end, star, ident, equal, s, l, r));
            Ok(())
        })
        .unwrap();
        let (end, star, ident, equal, s, l, r) = ids.unwrap();

        let augmented = grammar.augment();
        let sets = FirstSets::new(&augmented);

        assert_eq!(sets.first(T(end)), set(&[end]));
        for n in [s, l, r] {
            let first = sets.first(N(n));
            assert_eq!(first.len(), 2);
            assert!(first.is_superset(&set(&[star, ident])));
        }

        // The accepting production is the only context of S, and it
        // contributes no terminal of its own.
        assert!(sets.follow(N(s)).is_empty());
        assert_eq!(sets.follow(N(l)), set(&[equal]));
        assert_eq!(sets.follow(N(r)), set(&[equal]));
        assert!(sets.follow(T(star)).is_empty());
        assert!(!sets.has_blank(N(s)));
    }

    #[test]
    fn nullable_first_absorbs_follow() {
        let mut ids = None;
        let grammar = Grammar::define(|g| {
            let blank = g.blank_symbol("Blank")?;
            let _ = g.end_symbol("$")?;
            let a = g.terminal("a")?;
            let b = g.terminal("b")?;
            let c = g.terminal("c")?;
            let s = g.nonterminal("S")?;
            let x = g.nonterminal("X")?;
            let y = g.nonterminal("Y")?;
            g.rule(s, [N(x), N(y), T(c)])?;
            g.rule(x, [T(a), N(x)])?;
            g.rule(x, [T(blank)])?;
            g.rule(y, [T(b)])?;
            g.rule(y, [T(blank)])?;
            g.start_symbol(s)?;
            ids = Some((blank, a, b, c, s, x, y));
            Ok(())
        })
        .unwrap();
        let (blank, a, b, c, s, x, y) = ids.unwrap();

        let augmented = grammar.augment();
        let sets = FirstSets::new(&augmented);

        assert!(sets.has_blank(N(x)));
        assert!(sets.has_blank(N(y)));
        // S itself is not nullable, but the blank leaks in through X and Y.
        assert!(sets.has_blank(N(s)));

        // Follow(Y) = {c}, Follow(X) = First(Y) = {b, Blank, c}
        assert_eq!(sets.follow(N(y)), set(&[c]));
        let follow_x = sets.follow(N(x));
        assert_eq!(follow_x.len(), 3);
        assert!(follow_x.is_superset(&set(&[b, blank, c])));

        let first_y = sets.first(N(y));
        assert_eq!(first_y.len(), 3);
        assert!(first_y.is_superset(&set(&[b, blank, c])));

        let first_x = sets.first(N(x));
        assert_eq!(first_x.len(), 4);
        assert!(first_x.is_superset(&set(&[a, b, blank, c])));

        let first_s = sets.first(N(s));
        assert_eq!(first_s.len(), 4);
        assert!(first_s.is_superset(&set(&[a, b, blank, c])));
    }

    #[test]
    fn left_recursion_terminates() {
        let mut ids = None;
        let grammar = Grammar::define(|g| {
            let _ = g.blank_symbol("Blank")?;
            let _ = g.end_symbol("$")?;
            let plus = g.terminal("+")?;
            let num = g.terminal("num")?;
            let e = g.nonterminal("E")?;
            let t = g.nonterminal("T")?;
            g.rule(e, [N(e), T(plus), N(t)])?;
            g.rule(e, [N(t)])?;
            g.rule(t, [T(num)])?;
            g.rule(t, [N(e)])?;
            g.start_symbol(e)?;
            ids = Some((plus, num, e, t));
            Ok(())
        })
        .unwrap();
        let (plus, num, e, t) = ids.unwrap();

        let augmented = grammar.augment();
        let sets = FirstSets::new(&augmented);
        assert_eq!(sets.first(N(e)), set(&[num]));
        assert_eq!(sets.first(N(t)), set(&[num]));
        assert_eq!(sets.follow(N(e)), set(&[plus]));
        assert_eq!(sets.follow(N(t)), set(&[plus]));
    }
}
