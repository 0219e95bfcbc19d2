//! Export of the automaton into the dense table artifact.

use crate::{
    automaton::Automaton,
    grammar::{Grammar, NonterminalID, SymbolID},
};

pub use lalrgen_runtime::definition::ParseTableDef;

/// Flatten the automaton into tables indexed by dense numbers.
///
/// * a shift or goto to state `s` is stored as `s`
/// * a reduction by production `r` is stored as `-r`
/// * everything else is `0`
pub fn export(g: &Grammar, automaton: &Automaton) -> ParseTableDef {
    let augmented = g.augment();
    let width = g.num_symbols() + 1;

    // the accepting production is `1`, and `0` is never used.
    let num_rules = augmented.rules().count() + 1;
    let mut reduce_result = vec![0; num_rules];
    let mut reduce_length = vec![0; num_rules];
    for rule in augmented.rules() {
        let id = rule.id().raw() as usize;
        reduce_result[id] = g.export_id(SymbolID::N(rule.left()));
        reduce_length[id] = rule.reduce_len() as u32;
    }

    let mut action_table = Vec::with_capacity(automaton.num_states());
    for (_, state) in automaton.states() {
        let mut row = vec![0i32; width];
        for (symbol, target) in state.transitions() {
            row[g.export_id(symbol) as usize] = target.raw() as i32;
        }
        for (token, rule) in state.reduces() {
            row[g.export_id(SymbolID::T(token)) as usize] = -i32::from(rule.raw());
        }
        action_table.push(row);
    }

    let mut debug_names = vec![String::new(); width];
    for terminal in g.terminals() {
        debug_names[g.export_id(SymbolID::T(terminal.id())) as usize] = terminal.name().to_owned();
    }
    for symbol in augmented.nonterminals() {
        debug_names[g.export_id(SymbolID::N(symbol)) as usize] =
            g.nonterminal(symbol).name().to_owned();
    }

    tracing::debug!(
        states = action_table.len(),
        symbols = width - 1,
        rules = num_rules - 1,
        "exported parse table"
    );

    ParseTableDef {
        num_terminals: g.num_terminals() as u32,
        reduce_result,
        reduce_length,
        action_table,
        debug_names,
        accept_token: g.export_id(SymbolID::N(NonterminalID::START)),
        end_token: g.export_id(SymbolID::T(g.end_symbol())),
    }
}
