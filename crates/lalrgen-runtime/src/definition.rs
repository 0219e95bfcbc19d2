//! Parse table definition.

/// The trait for abstracting the generated LALR(1) parse table.
pub trait ParseTable {
    /// The number to identify the state of LALR(1) automaton.
    type State: Copy;

    /// The number to identify the terminal/nonterminal symbols.
    type Symbol: Copy + PartialEq;

    /// Return the initial state number.
    fn initial_state(&self) -> Self::State;

    /// Return the action corresponding to the specified state number and
    /// the symbol on top of the pending stack.
    ///
    /// The end of input is an ordinary terminal symbol here.
    fn action(
        &self,
        current: Self::State,
        symbol: Self::Symbol,
    ) -> ParseAction<Self::State, Self::Symbol>;

    /// Return whether a transition on the symbol consumes an input token,
    /// i.e. whether the symbol is a terminal.
    fn is_shift(&self, symbol: Self::Symbol) -> bool;

    /// Return the head symbol of the augmented start production.
    fn accept_symbol(&self) -> Self::Symbol;

    /// Return the name of the symbol, used for diagnostics.
    fn symbol_name(&self, symbol: Self::Symbol) -> &str;
}

impl<T: ?Sized> ParseTable for &T
where
    T: ParseTable,
{
    type State = T::State;
    type Symbol = T::Symbol;

    fn initial_state(&self) -> Self::State {
        (**self).initial_state()
    }

    fn action(
        &self,
        current: Self::State,
        symbol: Self::Symbol,
    ) -> ParseAction<Self::State, Self::Symbol> {
        (**self).action(current, symbol)
    }

    fn is_shift(&self, symbol: Self::Symbol) -> bool {
        (**self).is_shift(symbol)
    }

    fn accept_symbol(&self) -> Self::Symbol {
        (**self).accept_symbol()
    }

    fn symbol_name(&self, symbol: Self::Symbol) -> &str {
        (**self).symbol_name(symbol)
    }
}

impl<T: ?Sized> ParseTable for std::rc::Rc<T>
where
    T: ParseTable,
{
    type State = T::State;
    type Symbol = T::Symbol;

    fn initial_state(&self) -> Self::State {
        (**self).initial_state()
    }

    fn action(
        &self,
        current: Self::State,
        symbol: Self::Symbol,
    ) -> ParseAction<Self::State, Self::Symbol> {
        (**self).action(current, symbol)
    }

    fn is_shift(&self, symbol: Self::Symbol) -> bool {
        (**self).is_shift(symbol)
    }

    fn accept_symbol(&self) -> Self::Symbol {
        (**self).accept_symbol()
    }

    fn symbol_name(&self, symbol: Self::Symbol) -> &str {
        (**self).symbol_name(symbol)
    }
}

impl<T: ?Sized> ParseTable for std::sync::Arc<T>
where
    T: ParseTable,
{
    type State = T::State;
    type Symbol = T::Symbol;

    fn initial_state(&self) -> Self::State {
        (**self).initial_state()
    }

    fn action(
        &self,
        current: Self::State,
        symbol: Self::Symbol,
    ) -> ParseAction<Self::State, Self::Symbol> {
        (**self).action(current, symbol)
    }

    fn is_shift(&self, symbol: Self::Symbol) -> bool {
        (**self).is_shift(symbol)
    }

    fn accept_symbol(&self) -> Self::Symbol {
        (**self).accept_symbol()
    }

    fn symbol_name(&self, symbol: Self::Symbol) -> &str {
        (**self).symbol_name(symbol)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ParseAction<TState, TSymbol> {
    /// Move to the state, either by shifting a terminal or by the goto
    /// after a reduction.
    Shift(TState),

    /// Reduce the top `len` nodes by the production `rule` headed by `lhs`.
    Reduce {
        rule: u32,
        lhs: TSymbol,
        len: usize,
    },

    /// No action is defined for this pair.
    Fail,

    Error(ParseActionError),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseActionError {
    #[error("incorrect state")]
    IncorrectState,

    #[error("incorrect symbol")]
    IncorrectSymbol,

    #[error("incorrect production rule")]
    IncorrectRule,
}

/// The table artifact of an LALR(1) automaton.
///
/// Symbols, states and production rules are dense numbers. Every table is
/// indexed directly by those numbers, and slot `0` of the symbol and rule
/// tables is never used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTableDef {
    /// The number of terminal symbols, including the end and blank symbols.
    ///
    /// Terminal symbols are numbered `1..=num_terminals`.
    pub num_terminals: u32,

    /// `reduce_result[rule]` is the head symbol of the production.
    pub reduce_result: Vec<u32>,

    /// `reduce_length[rule]` is the number of nodes the production consumes.
    pub reduce_length: Vec<u32>,

    /// `action_table[state][symbol]` is the target state if positive, the
    /// negated production number to reduce by if negative, or zero for an
    /// error.
    pub action_table: Vec<Vec<i32>>,

    /// The names of symbols, used for diagnostics.
    pub debug_names: Vec<String>,

    /// The augmented start symbol.
    pub accept_token: u32,

    /// The terminal symbol that marks the end of input.
    pub end_token: u32,
}

impl ParseTableDef {
    pub fn num_states(&self) -> usize {
        self.action_table.len()
    }
}

impl ParseTable for ParseTableDef {
    type State = u32;
    type Symbol = u32;

    fn initial_state(&self) -> Self::State {
        0
    }

    fn action(&self, current: u32, symbol: u32) -> ParseAction<u32, u32> {
        let row = match self.action_table.get(current as usize) {
            Some(row) => row,
            None => return ParseAction::Error(ParseActionError::IncorrectState),
        };
        let entry = match row.get(symbol as usize) {
            Some(entry) => *entry,
            None => return ParseAction::Error(ParseActionError::IncorrectSymbol),
        };

        match entry {
            0 => ParseAction::Fail,
            n if n > 0 => ParseAction::Shift(n as u32),
            n => {
                let rule = n.unsigned_abs();
                match (
                    self.reduce_result.get(rule as usize),
                    self.reduce_length.get(rule as usize),
                ) {
                    (Some(&lhs), Some(&len)) => ParseAction::Reduce {
                        rule,
                        lhs,
                        len: len as usize,
                    },
                    _ => ParseAction::Error(ParseActionError::IncorrectRule),
                }
            }
        }
    }

    fn is_shift(&self, symbol: u32) -> bool {
        symbol <= self.num_terminals
    }

    fn accept_symbol(&self) -> u32 {
        self.accept_token
    }

    fn symbol_name(&self, symbol: u32) -> &str {
        self.debug_names
            .get(symbol as usize)
            .map_or("<unknown>", |name| name.as_str())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    // S := a
    //   a = 1, $ = 2, $start = 3, S = 4
    pub(crate) fn single_token_table() -> ParseTableDef {
        ParseTableDef {
            num_terminals: 2,
            reduce_result: vec![0, 3, 4],
            reduce_length: vec![0, 1, 1],
            action_table: vec![
                vec![0, 2, 0, 0, 1],
                vec![0, 0, -1, 0, 0],
                vec![0, 0, -2, 0, 0],
            ],
            debug_names: ["", "a", "$", "$start", "S"]
                .into_iter()
                .map(String::from)
                .collect(),
            accept_token: 3,
            end_token: 2,
        }
    }

    #[test]
    fn decode_actions() {
        let table = single_token_table();
        assert_eq!(table.action(0, 1), ParseAction::Shift(2));
        assert_eq!(table.action(0, 4), ParseAction::Shift(1));
        assert_eq!(table.action(0, 2), ParseAction::Fail);
        assert_eq!(
            table.action(2, 2),
            ParseAction::Reduce {
                rule: 2,
                lhs: 4,
                len: 1
            }
        );
        assert_eq!(
            table.action(1, 2),
            ParseAction::Reduce {
                rule: 1,
                lhs: 3,
                len: 1
            }
        );
    }

    #[test]
    fn malformed_lookups() {
        let mut table = single_token_table();
        assert_eq!(
            table.action(3, 1),
            ParseAction::Error(ParseActionError::IncorrectState)
        );
        assert_eq!(
            table.action(0, 5),
            ParseAction::Error(ParseActionError::IncorrectSymbol)
        );
        table.action_table[0][1] = -7;
        assert_eq!(
            table.action(0, 1),
            ParseAction::Error(ParseActionError::IncorrectRule)
        );
        assert_eq!(table.symbol_name(9), "<unknown>");
    }

    #[test]
    fn terminals_are_shifted() {
        let table = single_token_table();
        assert!(table.is_shift(1));
        assert!(table.is_shift(2));
        assert!(!table.is_shift(3));
        assert!(!table.is_shift(4));
        assert_eq!(table.symbol_name(4), "S");
        assert_eq!((&table).accept_symbol(), 3);
        assert_eq!(std::rc::Rc::new(table).initial_state(), 0);
    }
}
