//! The precedence-table expression builder: associativity folds, level
//! ordering, and non-associative chains.

use parskit::{
    between, ch, digit, expression, many1, InfixOp, Level, Parser, UnaryOp, NON_ASSOC_CHAIN,
};
use test_case::test_case;

fn int() -> Parser<i64> {
    many1(&digit())
        .collect_string()
        .map(|s| s.parse().unwrap_or(0))
        .labelled("integer")
}

fn add() -> InfixOp<i64> {
    InfixOp::new(ch('+').discard(), |a, b| a + b)
}

fn sub() -> InfixOp<i64> {
    InfixOp::new(ch('-').discard(), |a, b| a - b)
}

fn mul() -> InfixOp<i64> {
    InfixOp::new(ch('*').discard(), |a, b| a * b)
}

#[test_case("1+2+3", 6; "chain of three")]
#[test_case("10+20", 30; "single application")]
#[test_case("7", 7; "bare term")]
fn infix_left_addition(input: &str, expected: i64) {
    let expr = expression(&int(), vec![Level::InfixLeft(vec![add()])]);
    assert_eq!(expr.try_run(input), Ok(expected));
}

#[test]
fn infix_left_associates_left() {
    let expr = expression(&int(), vec![Level::InfixLeft(vec![sub()])]);
    // (10 - 3) - 4, not 10 - (3 - 4)
    assert_eq!(expr.try_run("10-3-4"), Ok(3));
}

#[test]
fn infix_right_associates_right() {
    let expr = expression(&int(), vec![Level::InfixRight(vec![sub()])]);
    // 1 - (2 - 3)
    assert_eq!(expr.try_run("1-2-3"), Ok(2));
}

#[test]
fn infix_right_exponentiation() {
    let pow = InfixOp::new(ch('^').discard(), |a: i64, b| a.pow(b as u32));
    let expr = expression(&int(), vec![Level::InfixRight(vec![pow])]);
    // 2 ^ (3 ^ 2) = 2^9
    assert_eq!(expr.try_run("2^3^2"), Ok(512));
}

#[test]
fn non_assoc_allows_single_application() {
    let less = InfixOp::new(ch('<').discard(), |a, b| i64::from(a < b));
    let expr = expression(&int(), vec![Level::InfixNone(vec![less])]);
    assert_eq!(expr.try_run("1<2"), Ok(1));
    assert_eq!(expr.try_run("5"), Ok(5));
}

#[test]
fn non_assoc_chain_is_a_parse_failure() {
    let less = InfixOp::new(ch('<').discard(), |a, b| i64::from(a < b));
    let expr = expression(&int(), vec![Level::InfixNone(vec![less])]);

    let err = expr.try_run("1<2<3").unwrap_err();
    assert_eq!(err.expected, NON_ASSOC_CHAIN);
}

#[test]
fn lower_levels_bind_looser() {
    let expr = expression(
        &int(),
        vec![
            Level::InfixLeft(vec![add(), sub()]),
            Level::InfixLeft(vec![mul()]),
        ],
    );
    assert_eq!(expr.try_run("1+2*3"), Ok(7));
    assert_eq!(expr.try_run("2*3+4*5"), Ok(26));
    assert_eq!(expr.try_run("10-2*3"), Ok(4));
}

#[test]
fn prefix_operators_fold_innermost_first() {
    let neg = UnaryOp::new(ch('-').discard(), |a: i64| -a);
    let expr = expression(&int(), vec![Level::Prefix(vec![neg])]);
    assert_eq!(expr.try_run("-4"), Ok(-4));
    assert_eq!(expr.try_run("--4"), Ok(4));
}

#[test]
fn postfix_operators_fold_left_to_right() {
    let fact = UnaryOp::new(ch('!').discard(), |a: i64| (1..=a).product());
    let expr = expression(&int(), vec![Level::Postfix(vec![fact])]);
    assert_eq!(expr.try_run("3!"), Ok(6));
    // (3!)! = 720
    assert_eq!(expr.try_run("3!!"), Ok(720));
}

#[test]
fn all_five_level_kinds_compose() {
    let table = vec![
        Level::InfixNone(vec![InfixOp::new(ch('<').discard(), |a, b| {
            i64::from(a < b)
        })]),
        Level::InfixLeft(vec![add(), sub()]),
        Level::InfixLeft(vec![mul()]),
        Level::InfixRight(vec![InfixOp::new(ch('^').discard(), |a: i64, b| {
            a.pow(b as u32)
        })]),
        Level::Prefix(vec![UnaryOp::new(ch('-').discard(), |a: i64| -a)]),
        Level::Postfix(vec![UnaryOp::new(ch('!').discard(), |a: i64| {
            (1..=a).product()
        })]),
    ];
    let expr = expression(&int(), table);

    assert_eq!(expr.try_run("1+2*3"), Ok(7));
    assert_eq!(expr.try_run("-3+10"), Ok(7));
    assert_eq!(expr.try_run("2^2^2*2"), Ok(32));
    assert_eq!(expr.try_run("3!+1"), Ok(7));
    assert_eq!(expr.try_run("1+1<3"), Ok(1));
}

#[test]
fn terms_can_be_parenthesized_recursively() {
    // expr is recursive through the term parser: term ::= int | '(' expr ')'
    let expr_ref: Parser<i64> = Parser::recursive();
    let term = int().or(&between(&ch('('), &expr_ref, &ch(')')));
    let expr = expression(
        &term,
        vec![
            Level::InfixLeft(vec![add(), sub()]),
            Level::InfixLeft(vec![mul()]),
        ],
    );
    expr_ref.recurse(expr.clone());

    assert_eq!(expr.try_run("(1+2)*3"), Ok(9));
    assert_eq!(expr.try_run("2*(3+(4-1))"), Ok(12));
}
