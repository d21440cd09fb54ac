//! Abstract Syntax Tree types for formula terms
//!
//! These types represent the parsed structure of a term like
//! `Dist(A, B) / 2` before names are resolved against a board.

/// Byte range of a node in the formula source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

impl From<pest::Span<'_>> for Span {
    fn from(span: pest::Span<'_>) -> Self {
        Span {
            start: span.start(),
            end: span.end(),
        }
    }
}

impl From<Span> for miette::SourceSpan {
    fn from(span: Span) -> Self {
        (span.start, span.len()).into()
    }
}

/// A parsed expression
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Numeric literal: 1, 2.5, 1e-3
    Number(f64),
    /// Bare name: a constant (PI) or an element (A)
    Name { name: String, span: Span },
    /// Prefix sign: -x
    Unary(UnaryOp, Box<Expr>),
    /// Binary operation: a + b, a ^ b
    Binary(Box<Expr>, BinaryOp, Box<Expr>),
    /// Function call: sin(x), Dist(A, B)
    Call {
        name: String,
        args: Vec<Expr>,
        span: Span,
    },
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Pos,
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}
