//! Grammar definitions for integration tests.

use lalrgen::grammar::{GrammarDef, GrammarDefError, SymbolID::*};

pub type DefineFn = fn(&mut GrammarDef<'_>) -> Result<(), GrammarDefError>;

/// `S := L = R | R`, `L := * R | id`, `R := L`
pub fn pointer(g: &mut GrammarDef<'_>) -> Result<(), GrammarDefError> {
    let _ = g.blank_symbol("Blank")?;
    let _ = g.end_symbol("$")?;
    let star = g.terminal("*")?;
    let ident = g.terminal("id")?;
    let equal = g.terminal("=")?;

    let s = g.nonterminal("S")?;
    let l = g.nonterminal("L")?;
    let r = g.nonterminal("R")?;
    g.start_symbol(s)?;

    g.rule(s, [N(l), T(equal), N(r)])?;
    g.rule(s, [N(r)])?;
    g.rule(l, [T(star), N(r)])?;
    g.rule(l, [T(ident)])?;
    g.rule(r, [N(l)])?;

    Ok(())
}

pub fn arithmetic(g: &mut GrammarDef<'_>) -> Result<(), GrammarDefError> {
    // declare terminal symbols.
    let _ = g.blank_symbol("Blank")?;
    let _ = g.end_symbol("$")?;
    let lparen = g.terminal("(")?;
    let rparen = g.terminal(")")?;
    let plus = g.terminal("+")?;
    let minus = g.terminal("-")?;
    let star = g.terminal("*")?;
    let slash = g.terminal("/")?;
    let num = g.terminal("num")?;

    // declare nonterminal symbols.
    let expr = g.nonterminal("E")?;
    let term = g.nonterminal("T")?;
    let factor = g.nonterminal("F")?;
    g.start_symbol(expr)?;

    // declare syntax rules.
    g.rule(expr, [N(expr), T(plus), N(term)])?; // expr '+' term
    g.rule(expr, [N(expr), T(minus), N(term)])?; // expr '-' term
    g.rule(expr, [N(term)])?; // term
    g.rule(term, [N(term), T(star), N(factor)])?; // term '*' factor
    g.rule(term, [N(term), T(slash), N(factor)])?; // term '/' factor
    g.rule(term, [N(factor)])?; // factor
    g.rule(factor, [T(num)])?; // num
    g.rule(factor, [T(lparen), N(expr), T(rparen)])?; // '(' expr ')'

    Ok(())
}

/// `DECL := let id TYPE_ANNOT = num`, `TYPE_ANNOT := : id | Blank`
pub fn optional(g: &mut GrammarDef<'_>) -> Result<(), GrammarDefError> {
    let blank = g.blank_symbol("Blank")?;
    let _ = g.end_symbol("$")?;
    let t_let = g.terminal("let")?;
    let ident = g.terminal("id")?;
    let colon = g.terminal(":")?;
    let equal = g.terminal("=")?;
    let num = g.terminal("num")?;

    let decl = g.nonterminal("DECL")?;
    let annot = g.nonterminal("TYPE_ANNOT")?;
    g.start_symbol(decl)?;

    g.rule(decl, [T(t_let), T(ident), N(annot), T(equal), T(num)])?;
    g.rule(annot, [T(colon), T(ident)])?;
    g.rule(annot, [T(blank)])?;

    Ok(())
}

/// `E := E + E | id`
pub fn ambiguous(g: &mut GrammarDef<'_>) -> Result<(), GrammarDefError> {
    let _ = g.blank_symbol("Blank")?;
    let _ = g.end_symbol("$")?;
    let plus = g.terminal("+")?;
    let ident = g.terminal("id")?;

    let e = g.nonterminal("E")?;
    g.start_symbol(e)?;

    g.rule(e, [N(e), T(plus), N(e)])?;
    g.rule(e, [T(ident)])?;

    Ok(())
}

/// `S := A | B`, `A := x`, `B := x`
pub fn reduce_reduce(g: &mut GrammarDef<'_>) -> Result<(), GrammarDefError> {
    let _ = g.blank_symbol("Blank")?;
    let _ = g.end_symbol("$")?;
    let x = g.terminal("x")?;

    let s = g.nonterminal("S")?;
    let a = g.nonterminal("A")?;
    let b = g.nonterminal("B")?;
    g.start_symbol(s)?;

    g.rule(s, [N(a)])?;
    g.rule(s, [N(b)])?;
    g.rule(a, [T(x)])?;
    g.rule(b, [T(x)])?;

    Ok(())
}

/// `S := a E c | b E d`, `E := e`
///
/// The state after `e` is reached first with the lookahead `c`.
pub fn late_lookahead(g: &mut GrammarDef<'_>) -> Result<(), GrammarDefError> {
    let _ = g.blank_symbol("Blank")?;
    let _ = g.end_symbol("$")?;
    let a = g.terminal("a")?;
    let b = g.terminal("b")?;
    let c = g.terminal("c")?;
    let d = g.terminal("d")?;
    let e_ = g.terminal("e")?;

    let s = g.nonterminal("S")?;
    let e = g.nonterminal("E")?;
    g.start_symbol(s)?;

    g.rule(s, [T(a), N(e), T(c)])?;
    g.rule(s, [T(b), N(e), T(d)])?;
    g.rule(e, [T(e_)])?;

    Ok(())
}

/// LR(1), but not LALR(1).
pub fn param_spec(g: &mut GrammarDef<'_>) -> Result<(), GrammarDefError> {
    let _ = g.blank_symbol("Blank")?;
    let _ = g.end_symbol("$")?;
    let comma = g.terminal(",")?;
    let colon = g.terminal(":")?;
    let ident = g.terminal("id")?;

    let def = g.nonterminal("DEF")?;
    let param_spec = g.nonterminal("PARAM_SPEC")?;
    let return_spec = g.nonterminal("RETURN_SPEC")?;
    let type_ = g.nonterminal("TYPE")?;
    let name = g.nonterminal("NAME")?;
    let name_list = g.nonterminal("NAME_LIST")?;
    g.start_symbol(def)?;

    g.rule(def, [N(param_spec), N(return_spec), T(comma)])?;
    g.rule(param_spec, [N(type_)])?;
    g.rule(param_spec, [N(name_list), T(colon), N(type_)])?;
    g.rule(return_spec, [N(type_)])?;
    g.rule(return_spec, [N(name), T(colon), N(type_)])?;
    g.rule(type_, [T(ident)])?;
    g.rule(name, [T(ident)])?;
    g.rule(name_list, [N(name)])?;
    g.rule(name_list, [N(name), T(comma), N(name_list)])?;

    Ok(())
}

pub fn all() -> Vec<(&'static str, DefineFn)> {
    vec![
        ("pointer", pointer as DefineFn),
        ("arithmetic", arithmetic as DefineFn),
        ("optional", optional as DefineFn),
        ("ambiguous", ambiguous as DefineFn),
        ("reduce_reduce", reduce_reduce as DefineFn),
        ("late_lookahead", late_lookahead as DefineFn),
        ("param_spec", param_spec as DefineFn),
    ]
}
