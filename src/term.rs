//! Terms: numbers, formulas and callbacks that elements evaluate during an
//! update. A term knows which elements it reads (`deps`) so the board can
//! wire them into the dependency graph.

use std::fmt;
use std::rc::Rc;

use crate::ast::{BinaryOp, Expr, Span, UnaryOp};
use crate::errors::TermError;
use crate::parse::parse;
use crate::registry::ElementId;
use crate::types::Coords;

/// Read access to element geometry while evaluating a term
pub trait Lookup {
    /// Position of a point-like element
    fn coords(&self, id: ElementId) -> Option<Coords>;
    /// Radius of a circle or arc
    fn radius(&self, id: ElementId) -> Option<f64>;
    /// Length of a line's defining segment
    fn length(&self, id: ElementId) -> Option<f64>;
}

/// Name resolution while compiling a formula
pub trait Resolver {
    fn resolve(&self, name: &str) -> Option<ElementId>;
}

/// Input accepted by [`create_function`]
#[derive(Debug, Clone)]
pub enum TermSpec {
    Number(f64),
    Formula(String),
    Term(Term),
}

impl From<f64> for TermSpec {
    fn from(v: f64) -> Self {
        TermSpec::Number(v)
    }
}

impl From<&str> for TermSpec {
    fn from(s: &str) -> Self {
        TermSpec::Formula(s.to_string())
    }
}

impl From<String> for TermSpec {
    fn from(s: String) -> Self {
        TermSpec::Formula(s)
    }
}

impl From<Term> for TermSpec {
    fn from(t: Term) -> Self {
        TermSpec::Term(t)
    }
}

/// Turn a number, formula or existing term into an evaluable [`Term`]
pub fn create_function(
    spec: impl Into<TermSpec>,
    resolver: &dyn Resolver,
) -> Result<Term, TermError> {
    match spec.into() {
        TermSpec::Number(v) => Ok(Term::Constant(v)),
        TermSpec::Formula(source) => Term::formula(&source, resolver),
        TermSpec::Term(term) => Ok(term),
    }
}

type CallbackFn = dyn Fn(&dyn Lookup) -> f64;

/// A zero-argument value source
#[derive(Clone)]
pub enum Term {
    Constant(f64),
    Formula(Rc<Formula>),
    Callback {
        f: Rc<CallbackFn>,
        deps: Vec<ElementId>,
    },
}

impl Term {
    /// Compile a formula, resolving element names through `resolver`
    pub fn formula(source: &str, resolver: &dyn Resolver) -> Result<Term, TermError> {
        let expr = parse(source)?;
        let mut deps = Vec::new();
        let root = compile(&expr, source, resolver, &mut deps)?;
        Ok(Term::Formula(Rc::new(Formula {
            source: source.to_string(),
            root,
            deps,
        })))
    }

    /// Wrap an opaque callback that reads `deps`
    pub fn callback(deps: Vec<ElementId>, f: impl Fn(&dyn Lookup) -> f64 + 'static) -> Term {
        Term::Callback {
            f: Rc::new(f),
            deps,
        }
    }

    pub fn eval(&self, lookup: &dyn Lookup) -> f64 {
        match self {
            Term::Constant(v) => *v,
            Term::Formula(formula) => formula.root.eval(lookup),
            Term::Callback { f, .. } => f(lookup),
        }
    }

    /// Elements read by this term
    pub fn deps(&self) -> &[ElementId] {
        match self {
            Term::Constant(_) => &[],
            Term::Formula(formula) => &formula.deps,
            Term::Callback { deps, .. } => deps,
        }
    }

    pub fn source(&self) -> Option<&str> {
        match self {
            Term::Formula(formula) => Some(&formula.source),
            _ => None,
        }
    }
}

impl fmt::Debug for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Constant(v) => write!(f, "Constant({v})"),
            Term::Formula(formula) => write!(f, "Formula({:?})", formula.source),
            Term::Callback { deps, .. } => write!(f, "Callback(deps: {deps:?})"),
        }
    }
}

impl From<f64> for Term {
    fn from(v: f64) -> Self {
        Term::Constant(v)
    }
}

/// A compiled formula
#[derive(Debug)]
pub struct Formula {
    source: String,
    root: Node,
    deps: Vec<ElementId>,
}

// ============================================================================
// Compiled form
// ============================================================================

#[derive(Debug, Clone)]
enum Node {
    Number(f64),
    Unary(UnaryOp, Box<Node>),
    Binary(Box<Node>, BinaryOp, Box<Node>),
    Math(MathFn, Vec<Node>),
    Access(Accessor, Vec<ElementId>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MathFn {
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Atan2,
    Sqrt,
    Abs,
    Exp,
    Ln,
    Log10,
    Pow,
    Min,
    Max,
    Floor,
    Ceil,
    Round,
}

impl MathFn {
    fn lookup(name: &str) -> Option<MathFn> {
        Some(match name.to_ascii_lowercase().as_str() {
            "sin" => MathFn::Sin,
            "cos" => MathFn::Cos,
            "tan" => MathFn::Tan,
            "asin" => MathFn::Asin,
            "acos" => MathFn::Acos,
            "atan" => MathFn::Atan,
            "atan2" => MathFn::Atan2,
            "sqrt" => MathFn::Sqrt,
            "abs" => MathFn::Abs,
            "exp" => MathFn::Exp,
            "ln" => MathFn::Ln,
            "log" => MathFn::Log10,
            "pow" => MathFn::Pow,
            "min" => MathFn::Min,
            "max" => MathFn::Max,
            "floor" => MathFn::Floor,
            "ceil" => MathFn::Ceil,
            "round" => MathFn::Round,
            _ => return None,
        })
    }

    fn arity(self) -> usize {
        match self {
            MathFn::Atan2 | MathFn::Pow | MathFn::Min | MathFn::Max => 2,
            _ => 1,
        }
    }

    fn apply(self, args: &[f64]) -> f64 {
        let a = args.first().copied().unwrap_or(f64::NAN);
        let b = args.get(1).copied().unwrap_or(f64::NAN);
        match self {
            MathFn::Sin => a.sin(),
            MathFn::Cos => a.cos(),
            MathFn::Tan => a.tan(),
            MathFn::Asin => a.asin(),
            MathFn::Acos => a.acos(),
            MathFn::Atan => a.atan(),
            MathFn::Atan2 => a.atan2(b),
            MathFn::Sqrt => a.sqrt(),
            MathFn::Abs => a.abs(),
            MathFn::Exp => a.exp(),
            MathFn::Ln => a.ln(),
            MathFn::Log10 => a.log10(),
            MathFn::Pow => a.powf(b),
            MathFn::Min => a.min(b),
            MathFn::Max => a.max(b),
            MathFn::Floor => a.floor(),
            MathFn::Ceil => a.ceil(),
            MathFn::Round => a.round(),
        }
    }
}

/// Element accessors: X(A), Y(A), Dist(A, B), Rad(c), L(s)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Accessor {
    X,
    Y,
    Dist,
    Radius,
    Length,
}

impl Accessor {
    fn lookup(name: &str) -> Option<Accessor> {
        Some(match name.to_ascii_lowercase().as_str() {
            "x" => Accessor::X,
            "y" => Accessor::Y,
            "dist" => Accessor::Dist,
            "rad" | "radius" => Accessor::Radius,
            "l" | "length" => Accessor::Length,
            _ => return None,
        })
    }

    fn arity(self) -> usize {
        match self {
            Accessor::Dist => 2,
            _ => 1,
        }
    }
}

impl Node {
    fn eval(&self, lookup: &dyn Lookup) -> f64 {
        match self {
            Node::Number(v) => *v,
            Node::Unary(UnaryOp::Neg, e) => -e.eval(lookup),
            Node::Unary(UnaryOp::Pos, e) => e.eval(lookup),
            Node::Binary(l, op, r) => {
                let (l, r) = (l.eval(lookup), r.eval(lookup));
                match op {
                    BinaryOp::Add => l + r,
                    BinaryOp::Sub => l - r,
                    BinaryOp::Mul => l * r,
                    BinaryOp::Div => l / r,
                    BinaryOp::Pow => l.powf(r),
                }
            }
            Node::Math(f, args) => {
                let args: Vec<f64> = args.iter().map(|a| a.eval(lookup)).collect();
                f.apply(&args)
            }
            Node::Access(accessor, ids) => {
                let coords = |i: usize| ids.get(i).and_then(|id| lookup.coords(*id));
                match accessor {
                    Accessor::X => coords(0).map_or(f64::NAN, Coords::x),
                    Accessor::Y => coords(0).map_or(f64::NAN, Coords::y),
                    Accessor::Dist => match (coords(0), coords(1)) {
                        (Some(a), Some(b)) => a.distance(b),
                        _ => f64::NAN,
                    },
                    Accessor::Radius => ids
                        .first()
                        .and_then(|id| lookup.radius(*id))
                        .unwrap_or(f64::NAN),
                    Accessor::Length => ids
                        .first()
                        .and_then(|id| lookup.length(*id))
                        .unwrap_or(f64::NAN),
                }
            }
        }
    }
}

fn compile(
    expr: &Expr,
    source: &str,
    resolver: &dyn Resolver,
    deps: &mut Vec<ElementId>,
) -> Result<Node, TermError> {
    Ok(match expr {
        Expr::Number(v) => Node::Number(*v),
        Expr::Name { name, span } => match name.as_str() {
            "PI" | "pi" => Node::Number(std::f64::consts::PI),
            "E" => Node::Number(std::f64::consts::E),
            _ => match resolver.resolve(name) {
                Some(_) => {
                    return Err(TermError::BareElement {
                        name: name.clone(),
                        src: TermError::source_named(source),
                        span: (*span).into(),
                    });
                }
                None => return Err(unknown_element(name, *span, source)),
            },
        },
        Expr::Unary(op, e) => Node::Unary(*op, Box::new(compile(e, source, resolver, deps)?)),
        Expr::Binary(l, op, r) => Node::Binary(
            Box::new(compile(l, source, resolver, deps)?),
            *op,
            Box::new(compile(r, source, resolver, deps)?),
        ),
        Expr::Call { name, args, span } => {
            let arity_error = |expected: usize| TermError::Arity {
                name: name.clone(),
                expected,
                got: args.len(),
                src: TermError::source_named(source),
                span: (*span).into(),
            };
            if let Some(accessor) = Accessor::lookup(name) {
                if args.len() != accessor.arity() {
                    return Err(arity_error(accessor.arity()));
                }
                let mut ids = Vec::with_capacity(args.len());
                for arg in args {
                    let Expr::Name { name: target, span } = arg else {
                        return Err(TermError::ExpectedElement {
                            function: name.clone(),
                            src: TermError::source_named(source),
                            span: arg_span(arg, *span).into(),
                        });
                    };
                    let id = resolver
                        .resolve(target)
                        .ok_or_else(|| unknown_element(target, *span, source))?;
                    if !deps.contains(&id) {
                        deps.push(id);
                    }
                    ids.push(id);
                }
                Node::Access(accessor, ids)
            } else if let Some(f) = MathFn::lookup(name) {
                if args.len() != f.arity() {
                    return Err(arity_error(f.arity()));
                }
                let args = args
                    .iter()
                    .map(|a| compile(a, source, resolver, deps))
                    .collect::<Result<Vec<_>, _>>()?;
                Node::Math(f, args)
            } else {
                return Err(TermError::UnknownFunction {
                    name: name.clone(),
                    src: TermError::source_named(source),
                    span: Span {
                        start: span.start,
                        end: span.start + name.len(),
                    }
                    .into(),
                });
            }
        }
    })
}

fn arg_span(arg: &Expr, call: Span) -> Span {
    match arg {
        Expr::Name { span, .. } | Expr::Call { span, .. } => *span,
        _ => call,
    }
}

fn unknown_element(name: &str, span: Span, source: &str) -> TermError {
    TermError::UnknownElement {
        name: name.to_string(),
        src: TermError::source_named(source),
        span: span.into(),
        help: Some(format!("create an element named `{name}` first")),
    }
}
