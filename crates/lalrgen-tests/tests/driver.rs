use lalrgen::{automaton::Config, grammar::Grammar, table};
use lalrgen_runtime::{
    definition::ParseTableDef,
    parser::{ParseError, Parser, SyntaxNode},
};
use lalrgen_tests::{
    grammars::{self, DefineFn},
    lex,
};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn compile(f: DefineFn, config: &Config) -> anyhow::Result<ParseTableDef> {
    init_tracing();
    let grammar = Grammar::define(f)?;
    let automaton = config.build(&grammar)?;
    Ok(table::export(&grammar, &automaton))
}

fn parse(
    table: &ParseTableDef,
    input: &str,
) -> Result<SyntaxNode<u32>, ParseError<String, u32, u32>> {
    Parser::new(table).parse(lex(table, input))
}

fn symbol(table: &ParseTableDef, name: &str) -> u32 {
    table
        .debug_names
        .iter()
        .position(|n| n == name)
        .map(|i| i as u32)
        .unwrap()
}

fn names(node: &SyntaxNode<u32>) -> Vec<&str> {
    node.children().iter().map(|child| child.name()).collect()
}

fn leaves<'a>(node: &'a SyntaxNode<u32>, acc: &mut Vec<&'a str>) {
    match node.text() {
        Some(text) => acc.push(text),
        None => node.children().iter().for_each(|child| leaves(child, acc)),
    }
}

/// Every internal node must have as many children as its production consumes.
fn assert_reduce_lengths(table: &ParseTableDef, node: &SyntaxNode<u32>) {
    if node.is_leaf() {
        return;
    }
    let matched = (1..table.reduce_result.len()).any(|rule| {
        table.reduce_result[rule] == node.symbol()
            && table.reduce_length[rule] as usize == node.children().len()
    });
    assert!(matched, "no production for {}", node);
    for child in node.children() {
        assert_reduce_lengths(table, child);
    }
}

#[test]
fn accept_pointer_assignment() -> anyhow::Result<()> {
    let table = compile(grammars::pointer, &Config::new())?;
    let root = parse(&table, "* x = * y $")?;

    assert_eq!(root.symbol(), table.accept_token);
    assert_eq!(
        root.to_string(),
        "$start(S(L(* R(L(id))) = R(L(* R(L(id))))))"
    );

    let s = &root.children()[0];
    assert_eq!(s.name(), "S");
    assert_eq!(names(s), ["L", "=", "R"]);
    let l = &s.children()[0];
    assert_eq!(names(l), ["*", "R"]);

    let mut acc = vec![];
    leaves(&root, &mut acc);
    assert_eq!(acc, ["*", "x", "=", "*", "y"]);

    assert_reduce_lengths(&table, &root);
    Ok(())
}

#[test]
fn reject_double_equal() -> anyhow::Result<()> {
    let table = compile(grammars::pointer, &Config::new())?;
    match parse(&table, "x = = $") {
        Err(ParseError::UnexpectedToken {
            symbol,
            name,
            state,
        }) => {
            assert_eq!(name, "=");
            assert_eq!(symbol, self::symbol(&table, "="));
            // S := L = . R
            assert_eq!(state, 6);
            assert_eq!(table.action_table[state as usize][symbol as usize], 0);
        }
        res => panic!("unexpected result: {:?}", res),
    }
    Ok(())
}

#[test]
fn arithmetic_precedence() -> anyhow::Result<()> {
    let table = compile(grammars::arithmetic, &Config::new())?;
    let root = parse(&table, "1 + 2 * 3 - 4 $")?;
    assert_eq!(
        root.to_string(),
        "$start(E(E(E(T(F(num))) + T(T(F(num)) * F(num))) - T(F(num))))"
    );
    let mut acc = vec![];
    leaves(&root, &mut acc);
    assert_eq!(acc, ["1", "+", "2", "*", "3", "-", "4"]);
    assert_reduce_lengths(&table, &root);
    Ok(())
}

#[test]
fn epsilon_production_has_no_children() -> anyhow::Result<()> {
    let table = compile(grammars::optional, &Config::new())?;

    let root = parse(&table, "let x = 1 $")?;
    assert_eq!(root.to_string(), "$start(DECL(let id TYPE_ANNOT() = num))");
    assert_reduce_lengths(&table, &root);

    let root = parse(&table, "let x : int = 1 $")?;
    assert_eq!(
        root.to_string(),
        "$start(DECL(let id TYPE_ANNOT(: id) = num))"
    );
    assert_reduce_lengths(&table, &root);
    Ok(())
}

#[test]
fn first_discovered_lookaheads_reject_late_paths() -> anyhow::Result<()> {
    let table = compile(grammars::late_lookahead, &Config::new())?;
    assert!(parse(&table, "a e c $").is_ok());
    match parse(&table, "b e d $") {
        Err(ParseError::UnexpectedToken { name, .. }) => assert_eq!(name, "d"),
        res => panic!("unexpected result: {:?}", res),
    }

    let table = compile(grammars::late_lookahead, Config::new().use_lalr())?;
    let root = parse(&table, "b e d $")?;
    assert_eq!(root.to_string(), "$start(S(b E(e) d))");
    Ok(())
}

#[test]
fn parenthesized_expressions_need_lalr() -> anyhow::Result<()> {
    // F := num .  is first reached from the start state, where `)` never follows.
    let table = compile(grammars::arithmetic, &Config::new())?;
    match parse(&table, "( 1 ) $") {
        Err(ParseError::UnexpectedToken { name, .. }) => assert_eq!(name, ")"),
        res => panic!("unexpected result: {:?}", res),
    }

    let table = compile(grammars::arithmetic, Config::new().use_lalr())?;
    let root = parse(&table, "( 1 + 2 ) * 3 $")?;
    assert_eq!(
        root.to_string(),
        "$start(E(T(T(F(( E(E(T(F(num))) + T(F(num))) ))) * F(num))))"
    );
    assert_reduce_lengths(&table, &root);
    Ok(())
}

#[test]
fn token_source_errors() -> anyhow::Result<()> {
    let table = compile(grammars::arithmetic, &Config::new())?;

    match parse(&table, "1 + ? $") {
        Err(ParseError::Lexer(msg)) => assert!(msg.contains('?')),
        res => panic!("unexpected result: {:?}", res),
    }

    match parse(&table, "1 +") {
        Err(ParseError::UnexpectedEOI) => (),
        res => panic!("unexpected result: {:?}", res),
    }

    Ok(())
}
