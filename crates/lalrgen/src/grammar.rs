//! Grammar types.

use crate::{types::Map, util::display_fn};
use std::{fmt, marker::PhantomData};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct TerminalID {
    raw: u16,
}
impl TerminalID {
    #[inline]
    const fn new(raw: u16) -> Self {
        Self { raw }
    }

    /// Return the declaration index of this terminal symbol.
    pub const fn raw(self) -> u16 {
        self.raw
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct NonterminalID {
    raw: u16,
}
impl NonterminalID {
    /// Reserved symbol used as the head of the augmented start production.
    pub const START: Self = Self::new(0);

    const OFFSET: u16 = 1;

    #[inline]
    const fn new(raw: u16) -> Self {
        Self { raw }
    }

    pub const fn raw(self) -> u16 {
        self.raw
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SymbolID {
    T(TerminalID),
    N(NonterminalID),
}
impl From<TerminalID> for SymbolID {
    fn from(id: TerminalID) -> Self {
        Self::T(id)
    }
}
impl From<NonterminalID> for SymbolID {
    fn from(id: NonterminalID) -> Self {
        Self::N(id)
    }
}

/// The identifier of a production rule.
///
/// The raw value is also the production number in the exported tables,
/// where zero is never used.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct RuleID {
    raw: u16,
}

impl RuleID {
    /// The augmented production `$start := S`.
    pub const ACCEPT: Self = Self::new(1);

    const OFFSET: u16 = 2;

    #[inline]
    const fn new(raw: u16) -> Self {
        Self { raw }
    }

    pub const fn raw(self) -> u16 {
        self.raw
    }
}

impl fmt::Display for RuleID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.raw, f)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Terminal,
    Nonterminal,
    /// The empty string.
    Blank,
    /// The end of input.
    End,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Terminal => f.write_str("terminal"),
            Self::Nonterminal => f.write_str("nonterminal"),
            Self::Blank => f.write_str("blank"),
            Self::End => f.write_str("end"),
        }
    }
}

#[derive(Debug)]
pub struct Terminal {
    id: TerminalID,
    name: String,
    kind: TokenKind,
}
impl Terminal {
    pub fn id(&self) -> TerminalID {
        self.id
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    /// One of `Terminal`, `Blank` or `End`.
    pub fn kind(&self) -> TokenKind {
        self.kind
    }
}
impl fmt::Display for Terminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[derive(Debug)]
pub struct Nonterminal {
    id: NonterminalID,
    name: String,
}
impl Nonterminal {
    pub fn id(&self) -> NonterminalID {
        self.id
    }
    pub fn name(&self) -> &str {
        &self.name
    }
}
impl fmt::Display for Nonterminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// The type that represents a production rule in grammar.
#[derive(Debug, Clone)]
pub struct Rule {
    id: RuleID,
    left: NonterminalID,
    right: Vec<SymbolID>,
    epsilon: bool,
}
impl Rule {
    pub fn id(&self) -> RuleID {
        self.id
    }

    /// Return the left-hand side of this production.
    pub fn left(&self) -> NonterminalID {
        self.left
    }

    /// Return the right-hand side of this production.
    ///
    /// The body is never empty: an epsilon production is `[Blank]`.
    pub fn right(&self) -> &[SymbolID] {
        &self.right[..]
    }

    /// Whether the body of this production is exactly `[Blank]`.
    pub fn is_epsilon(&self) -> bool {
        self.epsilon
    }

    /// The number of input symbols matched by this production.
    pub fn reduce_len(&self) -> usize {
        if self.epsilon {
            0
        } else {
            self.right.len()
        }
    }

    // `"LHS := R1 R2 R3"`
    pub fn display<'g>(&'g self, g: &'g Grammar) -> impl fmt::Display + 'g {
        display_fn(move |f| {
            write!(f, "{} :=", g.nonterminals[&self.left])?;
            for symbol in &self.right {
                write!(f, " {}", g.symbol_name(*symbol))?;
            }
            Ok(())
        })
    }
}

/// The grammar definition used to derive the parser tables.
///
/// The augmented start symbol is reserved in the symbol arena from the
/// beginning, but its production only exists in an [`AugmentedGrammar`].
#[derive(Debug)]
pub struct Grammar {
    terminals: Map<TerminalID, Terminal>,
    nonterminals: Map<NonterminalID, Nonterminal>,
    rules: Map<RuleID, Rule>,
    start_symbol: NonterminalID,
    end_symbol: TerminalID,
    blank_symbol: TerminalID,
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "## terminals:")?;
        for terminal in self.terminals() {
            write!(f, "{}", terminal)?;
            match terminal.kind() {
                TokenKind::Blank => write!(f, " (blank)")?,
                TokenKind::End => write!(f, " (end)")?,
                _ => (),
            }
            writeln!(f)?;
        }

        writeln!(f, "\n## nonterminals:")?;
        for nonterminal in self.nonterminals() {
            write!(f, "{}", nonterminal)?;
            if nonterminal.id() == self.start_symbol {
                write!(f, " (start)")?;
            }
            writeln!(f)?;
        }

        writeln!(f, "\n## rules:")?;
        for rule in self.rules() {
            writeln!(f, "{}", rule.display(self))?;
        }

        Ok(())
    }
}

impl Grammar {
    /// Define a grammar using the specified function.
    pub fn define<F>(f: F) -> Result<Self, GrammarDefError>
    where
        F: FnOnce(&mut GrammarDef) -> Result<(), GrammarDefError>,
    {
        let mut def = GrammarDef {
            terminals: Map::default(),
            nonterminals: Map::default(),
            rules: Map::default(),
            start: None,
            end: None,
            blank: None,
            next_terminal_id: 0,
            next_nonterminal_id: NonterminalID::OFFSET,
            next_rule_id: RuleID::OFFSET,
            _marker: PhantomData,
        };

        def.nonterminals.insert(
            NonterminalID::START,
            Nonterminal {
                id: NonterminalID::START,
                name: "$start".into(),
            },
        );

        f(&mut def)?;

        def.end()
    }

    /// Iterate over the terminal symbols in declaration order, including
    /// the end and blank symbols.
    pub fn terminals(&self) -> impl Iterator<Item = &Terminal> + '_ {
        self.terminals.values()
    }

    /// Iterate over the user-declared nonterminal symbols in declaration order.
    pub fn nonterminals(&self) -> impl Iterator<Item = &Nonterminal> + '_ {
        self.nonterminals
            .values()
            .filter(|n| n.id() != NonterminalID::START)
    }

    /// Iterate over the production rules in declaration order.
    pub fn rules(&self) -> impl Iterator<Item = &Rule> + '_ {
        self.rules.values()
    }

    pub fn terminal(&self, id: TerminalID) -> &Terminal {
        &self.terminals[&id]
    }

    pub fn nonterminal(&self, id: NonterminalID) -> &Nonterminal {
        &self.nonterminals[&id]
    }

    pub fn start_symbol(&self) -> NonterminalID {
        self.start_symbol
    }

    pub fn end_symbol(&self) -> TerminalID {
        self.end_symbol
    }

    pub fn blank_symbol(&self) -> TerminalID {
        self.blank_symbol
    }

    pub fn symbol_name(&self, symbol: SymbolID) -> &str {
        match symbol {
            SymbolID::T(t) => self.terminals[&t].name(),
            SymbolID::N(n) => self.nonterminals[&n].name(),
        }
    }

    pub fn kind(&self, symbol: SymbolID) -> TokenKind {
        match symbol {
            SymbolID::T(t) => self.terminals[&t].kind(),
            SymbolID::N(..) => TokenKind::Nonterminal,
        }
    }

    /// The number of terminal symbols, including the end and blank symbols.
    pub fn num_terminals(&self) -> usize {
        self.terminals.len()
    }

    /// The number of all symbols, including the augmented start symbol.
    pub fn num_symbols(&self) -> usize {
        self.terminals.len() + self.nonterminals.len()
    }

    /// Return the dense, 1-based token number of a symbol.
    ///
    /// Terminals come first in declaration order, followed by the augmented
    /// start symbol and then the other nonterminals in declaration order.
    pub fn export_id(&self, symbol: SymbolID) -> u32 {
        match symbol {
            SymbolID::T(t) => u32::from(t.raw) + 1,
            SymbolID::N(n) => self.terminals.len() as u32 + u32::from(n.raw) + 1,
        }
    }

    /// Add the production `$start := S` on top of this grammar.
    pub fn augment(&self) -> AugmentedGrammar<'_> {
        let accept = Rule {
            id: RuleID::ACCEPT,
            left: NonterminalID::START,
            right: vec![SymbolID::N(self.start_symbol)],
            epsilon: false,
        };

        let mut productions_of: Map<NonterminalID, Vec<RuleID>> = Map::default();
        for nonterminal in self.nonterminals.keys() {
            productions_of.insert(*nonterminal, vec![]);
        }
        productions_of[&NonterminalID::START].push(RuleID::ACCEPT);
        for rule in self.rules.values() {
            productions_of[&rule.left].push(rule.id);
        }

        AugmentedGrammar {
            grammar: self,
            accept,
            productions_of,
        }
    }
}

/// A grammar extended with the accepting production `$start := S`.
#[derive(Debug)]
pub struct AugmentedGrammar<'g> {
    grammar: &'g Grammar,
    accept: Rule,
    productions_of: Map<NonterminalID, Vec<RuleID>>,
}

impl<'g> AugmentedGrammar<'g> {
    pub fn grammar(&self) -> &'g Grammar {
        self.grammar
    }

    pub fn rule(&self, id: RuleID) -> &Rule {
        if id == RuleID::ACCEPT {
            &self.accept
        } else {
            &self.grammar.rules[&id]
        }
    }

    /// Iterate over all productions, starting with the accepting one.
    pub fn rules(&self) -> impl Iterator<Item = &Rule> + '_ {
        Some(&self.accept).into_iter().chain(self.grammar.rules())
    }

    /// Return the productions headed by the specified nonterminal, in
    /// declaration order.
    pub fn productions_of(&self, symbol: NonterminalID) -> &[RuleID] {
        self.productions_of
            .get(&symbol)
            .map_or(&[][..], |rules| &rules[..])
    }

    /// Iterate over all nonterminals, starting with the augmented start symbol.
    pub fn nonterminals(&self) -> impl Iterator<Item = NonterminalID> + '_ {
        self.productions_of.keys().copied()
    }

    pub fn accept_symbol(&self) -> NonterminalID {
        NonterminalID::START
    }
}

/// The contextural values for building a `Grammar`.
#[derive(Debug)]
pub struct GrammarDef<'def> {
    terminals: Map<TerminalID, Terminal>,
    nonterminals: Map<NonterminalID, Nonterminal>,
    rules: Map<RuleID, Rule>,
    start: Option<NonterminalID>,
    end: Option<TerminalID>,
    blank: Option<TerminalID>,
    next_terminal_id: u16,
    next_nonterminal_id: u16,
    next_rule_id: u16,
    _marker: PhantomData<&'def mut ()>,
}

impl<'def> GrammarDef<'def> {
    /// Declare a terminal symbol used in this grammar.
    pub fn terminal(&mut self, name: &str) -> Result<TerminalID, GrammarDefError> {
        self.declare_terminal(name, TokenKind::Terminal)
    }

    /// Declare the terminal symbol that marks the end of input.
    pub fn end_symbol(&mut self, name: &str) -> Result<TerminalID, GrammarDefError> {
        if self.end.is_some() {
            return Err(GrammarDefError::SentinelRedefined {
                kind: TokenKind::End,
            });
        }
        let id = self.declare_terminal(name, TokenKind::End)?;
        self.end.replace(id);
        Ok(id)
    }

    /// Declare the symbol that denotes the empty string.
    pub fn blank_symbol(&mut self, name: &str) -> Result<TerminalID, GrammarDefError> {
        if self.blank.is_some() {
            return Err(GrammarDefError::SentinelRedefined {
                kind: TokenKind::Blank,
            });
        }
        let id = self.declare_terminal(name, TokenKind::Blank)?;
        self.blank.replace(id);
        Ok(id)
    }

    fn declare_terminal(
        &mut self,
        name: &str,
        kind: TokenKind,
    ) -> Result<TerminalID, GrammarDefError> {
        if name.is_empty() {
            return Err(GrammarDefError::EmptyName);
        }
        if self.terminals.values().any(|t| t.name == name) {
            return Err(GrammarDefError::DuplicateName {
                kind: TokenKind::Terminal,
                name: name.to_owned(),
            });
        }

        let id = TerminalID::new(self.next_terminal_id);
        self.next_terminal_id = bump(self.next_terminal_id, "terminal symbols")?;

        self.terminals.insert(
            id,
            Terminal {
                id,
                name: name.to_owned(),
                kind,
            },
        );

        Ok(id)
    }

    /// Declare a nonterminal symbol used in this grammar.
    pub fn nonterminal(&mut self, name: &str) -> Result<NonterminalID, GrammarDefError> {
        if name.is_empty() {
            return Err(GrammarDefError::EmptyName);
        }
        if self.nonterminals.values().any(|n| n.name == name) {
            return Err(GrammarDefError::DuplicateName {
                kind: TokenKind::Nonterminal,
                name: name.to_owned(),
            });
        }

        let id = NonterminalID::new(self.next_nonterminal_id);
        self.next_nonterminal_id = bump(self.next_nonterminal_id, "nonterminal symbols")?;

        self.nonterminals.insert(
            id,
            Nonterminal {
                id,
                name: name.to_owned(),
            },
        );

        Ok(id)
    }

    /// Specify a production rule into this grammer.
    pub fn rule<L, I>(&mut self, left: L, right: I) -> Result<RuleID, GrammarDefError>
    where
        L: Into<SymbolID>,
        I: IntoIterator<Item = SymbolID>,
    {
        let left = match left.into() {
            SymbolID::N(n) if n != NonterminalID::START && self.nonterminals.contains_key(&n) => n,
            SymbolID::N(..) => {
                return Err(GrammarDefError::UnknownSymbol {
                    head: "<unknown>".into(),
                })
            }
            SymbolID::T(t) => {
                return Err(GrammarDefError::NonterminalHead {
                    head: self
                        .terminals
                        .get(&t)
                        .map_or("<unknown>", |t| t.name())
                        .to_owned(),
                })
            }
        };
        let head = || self.nonterminals[&left].name.clone();

        let mut right: Vec<SymbolID> = right.into_iter().collect();
        if right.is_empty() {
            return Err(GrammarDefError::EmptyProduction { head: head() });
        }
        for symbol in &right {
            let known = match symbol {
                SymbolID::T(t) => self.terminals.contains_key(t),
                SymbolID::N(n) => *n != NonterminalID::START && self.nonterminals.contains_key(n),
            };
            if !known {
                return Err(GrammarDefError::UnknownSymbol { head: head() });
            }
        }

        // Blank symbols mixed with other symbols contribute nothing.
        let mut epsilon = false;
        if let Some(blank) = self.blank.map(SymbolID::T) {
            if right.len() > 1 && right.contains(&blank) {
                right.retain(|symbol| *symbol != blank);
                if right.is_empty() {
                    right.push(blank);
                }
            }
            epsilon = right == [blank];
        }

        if self
            .rules
            .values()
            .any(|rule| rule.left == left && rule.right == right)
        {
            let mut rule = head();
            rule.push_str(" :=");
            for symbol in &right {
                rule.push(' ');
                rule.push_str(self.symbol_name(*symbol));
            }
            return Err(GrammarDefError::DuplicateRule { rule });
        }

        let id = RuleID::new(self.next_rule_id);
        self.next_rule_id = bump(self.next_rule_id, "production rules")?;
        self.rules.insert(
            id,
            Rule {
                id,
                left,
                right,
                epsilon,
            },
        );

        Ok(id)
    }

    /// Specify the start symbol for this grammar.
    pub fn start_symbol(&mut self, symbol: NonterminalID) -> Result<(), GrammarDefError> {
        if symbol == NonterminalID::START || !self.nonterminals.contains_key(&symbol) {
            return Err(GrammarDefError::UnknownSymbol {
                head: "<start>".into(),
            });
        }
        self.start.replace(symbol);
        Ok(())
    }

    fn symbol_name(&self, symbol: SymbolID) -> &str {
        match symbol {
            SymbolID::T(t) => self.terminals[&t].name(),
            SymbolID::N(n) => self.nonterminals[&n].name(),
        }
    }

    fn end(self) -> Result<Grammar, GrammarDefError> {
        let start_symbol = self.start.ok_or(GrammarDefError::MissingStart)?;
        let end_symbol = self.end.ok_or(GrammarDefError::MissingEnd)?;
        let blank_symbol = self.blank.ok_or(GrammarDefError::MissingBlank)?;

        Ok(Grammar {
            terminals: self.terminals,
            nonterminals: self.nonterminals,
            rules: self.rules,
            start_symbol,
            end_symbol,
            blank_symbol,
        })
    }
}

fn bump(next: u16, what: &'static str) -> Result<u16, GrammarDefError> {
    next.checked_add(1).ok_or(GrammarDefError::TooMany { what })
}

/// The grammar definition is malformed.
#[derive(Debug, thiserror::Error)]
pub enum GrammarDefError {
    #[error("the symbol name must not be empty")]
    EmptyName,

    #[error("the {kind} `{name}' has already been declared")]
    DuplicateName { kind: TokenKind, name: String },

    #[error("the {kind} symbol has already been declared")]
    SentinelRedefined { kind: TokenKind },

    #[error("the production headed by `{head}' has an empty body")]
    EmptyProduction { head: String },

    #[error("the head of a production must be a nonterminal, but `{head}' is not")]
    NonterminalHead { head: String },

    #[error("undeclared symbol used in a production headed by `{head}'")]
    UnknownSymbol { head: String },

    #[error("duplicate production rule: {rule}")]
    DuplicateRule { rule: String },

    #[error("the start symbol is not specified")]
    MissingStart,

    #[error("the end symbol is not specified")]
    MissingEnd,

    #[error("the blank symbol is not specified")]
    MissingBlank,

    #[error("too many {what} in one grammar")]
    TooMany { what: &'static str },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::SymbolID::*;

    #[test]
    fn blank_is_stripped_from_mixed_bodies() {
        let mut ids = None;
        let grammar = Grammar::define(|g| {
            let blank = g.blank_symbol("Blank")?;
            let _ = g.end_symbol("$")?;
            let a = g.terminal("a")?;
            let s = g.nonterminal("S")?;
            let r1 = g.rule(s, [T(blank), T(a), T(blank)])?;
            let r2 = g.rule(s, [T(blank)])?;
            g.start_symbol(s)?;
            ids = Some((blank, a, r1, r2));
            Ok(())
        })
        .unwrap();
        let (blank, a, r1, r2) = ids.unwrap();

        let rules: Vec<_> = grammar.rules().collect();
        assert_eq!(rules[0].id(), r1);
        assert_eq!(rules[0].right(), &[T(a)]);
        assert!(!rules[0].is_epsilon());
        assert_eq!(rules[0].reduce_len(), 1);

        assert_eq!(rules[1].id(), r2);
        assert_eq!(rules[1].right(), &[T(blank)]);
        assert!(rules[1].is_epsilon());
        assert_eq!(rules[1].reduce_len(), 0);
    }

    #[test]
    fn duplicates_are_detected_after_stripping_blanks() {
        let err = Grammar::define(|g| {
            let blank = g.blank_symbol("Blank")?;
            let _ = g.end_symbol("$")?;
            let a = g.terminal("a")?;
            let s = g.nonterminal("S")?;
            g.rule(s, [T(a)])?;
            g.rule(s, [T(blank), T(a)])?;
            g.start_symbol(s)?;
            Ok(())
        })
        .unwrap_err();
        assert!(matches!(err, GrammarDefError::DuplicateRule { ref rule } if rule == "S := a"));

        let err = Grammar::define(|g| {
            let blank = g.blank_symbol("Blank")?;
            let _ = g.end_symbol("$")?;
            let s = g.nonterminal("S")?;
            g.rule(s, [T(blank)])?;
            g.rule(s, [T(blank), T(blank)])?;
            g.start_symbol(s)?;
            Ok(())
        })
        .unwrap_err();
        assert!(matches!(err, GrammarDefError::DuplicateRule { ref rule } if rule == "S := Blank"));
    }

    #[test]
    fn id_space_exhaustion_is_an_error() {
        let err = Grammar::define(|g| {
            g.next_terminal_id = u16::MAX;
            let _ = g.terminal("x")?;
            Ok(())
        })
        .unwrap_err();
        assert!(matches!(err, GrammarDefError::TooMany { what: "terminal symbols" }));

        let err = Grammar::define(|g| {
            g.next_nonterminal_id = u16::MAX;
            let _ = g.nonterminal("S")?;
            Ok(())
        })
        .unwrap_err();
        assert!(matches!(err, GrammarDefError::TooMany { what: "nonterminal symbols" }));

        let err = Grammar::define(|g| {
            let x = g.terminal("x")?;
            let s = g.nonterminal("S")?;
            g.next_rule_id = u16::MAX;
            g.rule(s, [T(x)])?;
            Ok(())
        })
        .unwrap_err();
        assert!(matches!(err, GrammarDefError::TooMany { what: "production rules" }));
    }

    #[test]
    fn export_ids_are_dense() {
        let mut ids = None;
        let grammar = Grammar::define(|g| {
            let x = g.terminal("x")?;
            let e = g.nonterminal("E")?;
            let end = g.end_symbol("$")?;
            let blank = g.blank_symbol("Blank")?;
            let f = g.nonterminal("F")?;
            g.rule(e, [N(f)])?;
            g.rule(f, [T(x)])?;
            g.start_symbol(e)?;
            ids = Some((x, end, blank, e, f));
            Ok(())
        })
        .unwrap();
        let (x, end, blank, e, f) = ids.unwrap();

        assert_eq!(grammar.num_terminals(), 3);
        assert_eq!(grammar.num_symbols(), 6);
        assert_eq!(grammar.export_id(T(x)), 1);
        assert_eq!(grammar.export_id(T(end)), 2);
        assert_eq!(grammar.export_id(T(blank)), 3);
        assert_eq!(grammar.export_id(N(NonterminalID::START)), 4);
        assert_eq!(grammar.export_id(N(e)), 5);
        assert_eq!(grammar.export_id(N(f)), 6);
    }

    #[test]
    fn augment_inserts_accept_rule_first() {
        let grammar = Grammar::define(|g| {
            let _ = g.blank_symbol("Blank")?;
            let _ = g.end_symbol("$")?;
            let x = g.terminal("x")?;
            let s = g.nonterminal("S")?;
            g.rule(s, [T(x)])?;
            g.start_symbol(s)?;
            Ok(())
        })
        .unwrap();

        let augmented = grammar.augment();
        let rules: Vec<_> = augmented.rules().map(|rule| rule.id()).collect();
        assert_eq!(rules, [RuleID::ACCEPT, RuleID::new(2)]);
        assert_eq!(
            augmented.productions_of(NonterminalID::START),
            &[RuleID::ACCEPT]
        );
        let accept = augmented.rule(RuleID::ACCEPT);
        assert_eq!(accept.right(), &[N(grammar.start_symbol())]);
        assert_eq!(accept.display(&grammar).to_string(), "$start := S");
    }

    #[test]
    fn malformed_grammars() {
        let err = Grammar::define(|g| {
            let _ = g.blank_symbol("Blank")?;
            let _ = g.end_symbol("$")?;
            let s = g.nonterminal("S")?;
            g.rule(s, Vec::<SymbolID>::new())?;
            Ok(())
        })
        .unwrap_err();
        assert!(matches!(err, GrammarDefError::EmptyProduction { ref head } if head == "S"));

        let err = Grammar::define(|g| {
            let x = g.terminal("x")?;
            g.rule(x, [T(x)])?;
            Ok(())
        })
        .unwrap_err();
        assert!(matches!(err, GrammarDefError::NonterminalHead { ref head } if head == "x"));

        let err = Grammar::define(|g| {
            let _ = g.blank_symbol("Blank")?;
            let _ = g.end_symbol("$")?;
            let _ = g.nonterminal("S")?;
            Ok(())
        })
        .unwrap_err();
        assert!(matches!(err, GrammarDefError::MissingStart));

        let err = Grammar::define(|g| {
            let _ = g.blank_symbol("Blank")?;
            let s = g.nonterminal("S")?;
            g.start_symbol(s)?;
            Ok(())
        })
        .unwrap_err();
        assert!(matches!(err, GrammarDefError::MissingEnd));

        let err = Grammar::define(|g| {
            let _ = g.end_symbol("$")?;
            let s = g.nonterminal("S")?;
            g.start_symbol(s)?;
            Ok(())
        })
        .unwrap_err();
        assert!(matches!(err, GrammarDefError::MissingBlank));

        let err = Grammar::define(|g| {
            let _ = g.terminal("x")?;
            let _ = g.terminal("x")?;
            Ok(())
        })
        .unwrap_err();
        assert!(matches!(err, GrammarDefError::DuplicateName { .. }));

        let err = Grammar::define(|g| {
            let x = g.terminal("x")?;
            let s = g.nonterminal("S")?;
            g.rule(s, [T(x)])?;
            g.rule(s, [T(x)])?;
            Ok(())
        })
        .unwrap_err();
        assert!(matches!(err, GrammarDefError::DuplicateRule { ref rule } if rule == "S := x"));
    }
}
