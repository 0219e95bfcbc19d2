//! Shared fixtures for the integration tests and benchmarks.

pub mod grammars;

use lalrgen_runtime::definition::ParseTableDef;

/// Split the input at whitespace and map each word to a terminal symbol
/// of the table.
///
/// A word is looked up by the symbol name first. Otherwise, digits become
/// `num` and identifiers become `id`, if the grammar has such terminals.
pub fn lex<'a>(
    table: &'a ParseTableDef,
    input: &'a str,
) -> impl Iterator<Item = Result<(u32, &'a str), String>> + 'a {
    let lookup = move |name: &str| {
        (1..=table.num_terminals).find(|&id| {
            table
                .debug_names
                .get(id as usize)
                .map_or(false, |n| n == name)
        })
    };

    input.split_whitespace().map(move |word| {
        let symbol = lookup(word)
            .or_else(|| {
                if word.chars().all(|c| c.is_ascii_digit()) {
                    lookup("num")
                } else {
                    None
                }
            })
            .or_else(|| {
                if word.chars().all(|c| c.is_alphanumeric() || c == '_') {
                    lookup("id")
                } else {
                    None
                }
            });
        symbol
            .map(|symbol| (symbol, word))
            .ok_or_else(|| format!("unknown token `{}'", word))
    })
}
