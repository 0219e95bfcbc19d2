//! An LALR(1) parse table generator.
//!
//! A [`Grammar`](grammar::Grammar) is compiled into an
//! [`Automaton`](automaton::Automaton), which is then flattened into the
//! dense [`ParseTableDef`](table::ParseTableDef) consumed by the parser in
//! `lalrgen-runtime`.

pub mod automaton;
pub mod closure;
pub mod first_sets;
pub mod grammar;
pub mod table;
pub mod types;
mod util;
