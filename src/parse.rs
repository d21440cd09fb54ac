//! Parse pest pairs into term AST nodes

use crate::ast::*;
use crate::errors::TermError;
use crate::{Rule, TermParser};
use pest::Parser;
use pest::error::InputLocation;
use pest::iterators::Pair;

/// Parse a formula into an expression tree
pub fn parse(source: &str) -> Result<Expr, TermError> {
    let mut pairs = TermParser::parse(Rule::term, source).map_err(|e| {
        let (start, end) = match e.location {
            InputLocation::Pos(p) => (p, p),
            InputLocation::Span(s) => s,
        };
        TermError::Syntax {
            message: e.variant.message().into_owned(),
            src: TermError::source_named(source),
            span: Span { start, end }.into(),
        }
    })?;

    // term = { SOI ~ expr ~ EOI }
    let expr = pairs
        .next()
        .and_then(|term| term.into_inner().find(|p| p.as_rule() == Rule::expr));
    match expr {
        Some(expr) => Ok(parse_expr(expr)),
        None => Err(TermError::Syntax {
            message: "empty term".to_string(),
            src: TermError::source_named(source),
            span: Span { start: 0, end: source.len() }.into(),
        }),
    }
}

fn parse_expr(pair: Pair<Rule>) -> Expr {
    // expr = { product ~ (add_op ~ product)* }
    let mut inner = pair.into_inner();
    let mut lhs = match inner.next() {
        Some(first) => parse_product(first),
        None => return Expr::Number(f64::NAN),
    };
    while let (Some(op), Some(rhs)) = (inner.next(), inner.next()) {
        let op = match op.as_str() {
            "-" => BinaryOp::Sub,
            _ => BinaryOp::Add,
        };
        lhs = Expr::Binary(Box::new(lhs), op, Box::new(parse_product(rhs)));
    }
    lhs
}

fn parse_product(pair: Pair<Rule>) -> Expr {
    let mut inner = pair.into_inner();
    let mut lhs = match inner.next() {
        Some(first) => parse_unary(first),
        None => return Expr::Number(f64::NAN),
    };
    while let (Some(op), Some(rhs)) = (inner.next(), inner.next()) {
        let op = match op.as_str() {
            "/" => BinaryOp::Div,
            _ => BinaryOp::Mul,
        };
        lhs = Expr::Binary(Box::new(lhs), op, Box::new(parse_unary(rhs)));
    }
    lhs
}

fn parse_unary(pair: Pair<Rule>) -> Expr {
    // unary = { prefix* ~ power }
    let mut signs = Vec::new();
    let mut operand = Expr::Number(f64::NAN);
    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::prefix => signs.push(if inner.as_str() == "-" {
                UnaryOp::Neg
            } else {
                UnaryOp::Pos
            }),
            Rule::power => operand = parse_power(inner),
            _ => {}
        }
    }
    signs
        .into_iter()
        .rev()
        .fold(operand, |acc, op| Expr::Unary(op, Box::new(acc)))
}

fn parse_power(pair: Pair<Rule>) -> Expr {
    // power = { primary ~ (pow_op ~ unary)? }
    let mut inner = pair.into_inner();
    let base = match inner.next() {
        Some(p) => parse_primary(p),
        None => return Expr::Number(f64::NAN),
    };
    match (inner.next(), inner.next()) {
        (Some(_), Some(exponent)) => {
            Expr::Binary(Box::new(base), BinaryOp::Pow, Box::new(parse_unary(exponent)))
        }
        _ => base,
    }
}

fn parse_primary(pair: Pair<Rule>) -> Expr {
    match pair.as_rule() {
        // The grammar only admits well-formed literals here.
        Rule::number => Expr::Number(pair.as_str().parse().unwrap_or(f64::NAN)),
        Rule::ident => Expr::Name {
            name: pair.as_str().to_string(),
            span: pair.as_span().into(),
        },
        Rule::call => parse_call(pair),
        Rule::expr => parse_expr(pair),
        _ => Expr::Number(f64::NAN),
    }
}

fn parse_call(pair: Pair<Rule>) -> Expr {
    let span = pair.as_span().into();
    let mut inner = pair.into_inner();
    let name = inner
        .next()
        .map(|p| p.as_str().to_string())
        .unwrap_or_default();
    let args = inner.map(parse_expr).collect();
    Expr::Call { name, args, span }
}
