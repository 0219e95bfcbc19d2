//! Runtime implementation for `lalrgen` parse tables.

pub mod definition;
pub mod parser;
