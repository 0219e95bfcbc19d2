//! Parser.

use crate::definition::{ParseAction, ParseActionError, ParseTable};
use std::fmt;

/// A trait for abstracting lexical tokens.
pub trait Token<TSym> {
    /// Return the symbol number of this token.
    fn as_symbol(&self) -> TSym;

    /// Return the matched text of this token.
    fn text(&self) -> &str;
}

impl<TSym: Copy> Token<TSym> for (TSym, &str) {
    fn as_symbol(&self) -> TSym {
        self.0
    }
    fn text(&self) -> &str {
        self.1
    }
}

impl<TSym: Copy> Token<TSym> for (TSym, String) {
    fn as_symbol(&self) -> TSym {
        self.0
    }
    fn text(&self) -> &str {
        &self.1
    }
}

/// A node of the syntax tree built by [`Parser`].
#[derive(Debug, Clone, PartialEq)]
pub struct SyntaxNode<TSym> {
    symbol: TSym,
    name: String,
    text: Option<String>,
    children: Vec<SyntaxNode<TSym>>,
}

impl<TSym: Copy> SyntaxNode<TSym> {
    pub fn symbol(&self) -> TSym {
        self.symbol
    }

    /// The debug name of the symbol.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The matched text, if this node is made from an input token.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn children(&self) -> &[SyntaxNode<TSym>] {
        &self.children[..]
    }

    pub fn is_leaf(&self) -> bool {
        self.text.is_some()
    }
}

/// `S(L(* R(L(id))) = R(L(id)))`
impl<TSym> fmt::Display for SyntaxNode<TSym> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if self.text.is_none() {
            f.write_str("(")?;
            for (i, child) in self.children.iter().enumerate() {
                if i > 0 {
                    f.write_str(" ")?;
                }
                fmt::Display::fmt(child, f)?;
            }
            f.write_str(")")?;
        }
        Ok(())
    }
}

#[derive(Debug)]
struct Lookahead<TSym> {
    symbol: TSym,
    text: Option<String>,
}

/// The shift-reduce parser driven by a parse table.
pub struct Parser<TDef>
where
    TDef: ParseTable,
{
    definition: TDef,
    state_stack: Vec<TDef::State>,
    pending: Vec<Lookahead<TDef::Symbol>>,
    node_stack: Vec<SyntaxNode<TDef::Symbol>>,
}

impl<TDef> fmt::Debug for Parser<TDef>
where
    TDef: ParseTable + fmt::Debug,
    TDef::State: fmt::Debug,
    TDef::Symbol: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parser")
            .field("definition", &self.definition)
            .field("state_stack", &self.state_stack)
            .field("pending", &self.pending)
            .field("node_stack", &self.node_stack)
            .finish()
    }
}

impl<TDef> Parser<TDef>
where
    TDef: ParseTable,
{
    /// Create an instance of `Parser` using the specified parse table.
    pub fn new(definition: TDef) -> Self {
        Self {
            definition,
            state_stack: vec![],
            pending: vec![],
            node_stack: vec![],
        }
    }

    pub fn definition(&self) -> &TDef {
        &self.definition
    }

    /// Consume tokens until the input is accepted, and return the node of
    /// the augmented start symbol.
    ///
    /// The token source must yield the end-of-input token explicitly.
    pub fn parse<I, TTok, E>(
        &mut self,
        tokens: I,
    ) -> Result<SyntaxNode<TDef::Symbol>, ParseError<E, TDef::State, TDef::Symbol>>
    where
        I: IntoIterator<Item = Result<TTok, E>>,
        TTok: Token<TDef::Symbol>,
        E: fmt::Display,
        TDef::State: fmt::Debug,
        TDef::Symbol: fmt::Debug,
    {
        let mut tokens = tokens.into_iter();

        self.state_stack.clear();
        self.state_stack.push(self.definition.initial_state());
        self.pending.clear();
        self.node_stack.clear();

        loop {
            let lookahead = match self.pending.pop() {
                Some(lookahead) => lookahead,
                None => {
                    let token = match tokens.next() {
                        Some(Ok(token)) => token,
                        Some(Err(err)) => return Err(ParseError::Lexer(err)),
                        None => return Err(ParseError::UnexpectedEOI),
                    };
                    Lookahead {
                        symbol: token.as_symbol(),
                        text: Some(token.text().to_owned()),
                    }
                }
            };

            let current = match self.state_stack.last() {
                Some(current) => *current,
                None => return Err(ParseError::EmptyStateStack),
            };

            match self.definition.action(current, lookahead.symbol) {
                ParseAction::Shift(next) => {
                    // The node of a nonterminal has already been pushed by the reduction.
                    if self.definition.is_shift(lookahead.symbol) {
                        self.node_stack.push(SyntaxNode {
                            symbol: lookahead.symbol,
                            name: self.definition.symbol_name(lookahead.symbol).to_owned(),
                            text: Some(lookahead.text.unwrap_or_default()),
                            children: vec![],
                        });
                    }
                    self.state_stack.push(next);
                }

                ParseAction::Reduce { lhs, len, .. } => {
                    self.pending.push(lookahead);

                    let at = match self.node_stack.len().checked_sub(len) {
                        Some(at) => at,
                        None => return Err(ParseError::EmptyNodeStack),
                    };
                    let children = self.node_stack.split_off(at);
                    let node = SyntaxNode {
                        symbol: lhs,
                        name: self.definition.symbol_name(lhs).to_owned(),
                        text: None,
                        children,
                    };

                    if lhs == self.definition.accept_symbol() {
                        return Ok(node);
                    }

                    let at = match self.state_stack.len().checked_sub(len) {
                        Some(at) if at > 0 => at,
                        _ => return Err(ParseError::EmptyStateStack),
                    };
                    self.state_stack.truncate(at);
                    self.pending.push(Lookahead {
                        symbol: lhs,
                        text: None,
                    });
                    self.node_stack.push(node);
                }

                ParseAction::Fail => {
                    return Err(ParseError::UnexpectedToken {
                        symbol: lookahead.symbol,
                        name: self.definition.symbol_name(lookahead.symbol).to_owned(),
                        state: current,
                    });
                }

                ParseAction::Error(err) => {
                    return Err(ParseError::ParseTable(err));
                }
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ParseError<L, TState, TSym>
where
    L: fmt::Display,
    TState: fmt::Debug,
    TSym: fmt::Debug,
{
    #[error("from lexer: {}", _0)]
    Lexer(L),

    #[error("unexpected token `{name}' in state {state:?}")]
    UnexpectedToken {
        symbol: TSym,
        name: String,
        state: TState,
    },

    #[error("from parse table: {}", _0)]
    ParseTable(ParseActionError),

    #[error("unexpected EOI")]
    UnexpectedEOI,

    #[error("empty state stack")]
    EmptyStateStack,

    #[error("empty node stack")]
    EmptyNodeStack,
}
