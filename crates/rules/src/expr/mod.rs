//! Constrained condition language.
//!
//! A closed grammar of literals, signal references, arithmetic, comparisons
//! and boolean combinators. Evaluation only reads a state [`Snapshot`] and
//! produces a value; it has no way to perform I/O or mutate anything.
//!
//! Bare signal references use `[A-Za-z_][A-Za-z0-9_.]*`, so `engine-temp`
//! reads as `engine - temp`. Any other valid signal name is written between
//! backticks: `` `engine-temp` > 90 ``.
//!
//! [`Snapshot`]: vsm_core::Snapshot

mod error;
mod eval;
mod lexer;
mod parser;

use std::fmt;

use vsm_core::Value;

pub use self::error::{EvalError, ExprError};
pub use self::parser::parse;

/// An expression tree evaluated against signal state.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A literal value. `true`/`false` are stored as 1/0.
    Literal(Value),
    /// Current value of a named signal; absent if never assigned.
    Signal(String),
    Unary(UnaryOp, Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    /// All must be truthy (short-circuits).
    And(Vec<Expr>),
    /// At least one must be truthy (short-circuits).
    Or(Vec<Expr>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Neg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
        }
    }

    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge
        )
    }
}

impl Expr {
    /// Names of every signal the expression reads, in first-use order.
    pub fn signals(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_signals(&mut out);
        out
    }

    fn collect_signals<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Expr::Literal(_) => {}
            Expr::Signal(name) => {
                if !out.contains(&name.as_str()) {
                    out.push(name);
                }
            }
            Expr::Unary(_, inner) => inner.collect_signals(out),
            Expr::Binary(_, lhs, rhs) => {
                lhs.collect_signals(out);
                rhs.collect_signals(out);
            }
            Expr::And(terms) | Expr::Or(terms) => {
                for term in terms {
                    term.collect_signals(out);
                }
            }
        }
    }
}

/// Canonical, fully parenthesised rendering used in logs.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal(Value::Text(s)) => write!(f, "{s:?}"),
            Expr::Literal(v) => write!(f, "{v}"),
            Expr::Signal(name) if lexer::is_bare_name(name) => f.write_str(name),
            Expr::Signal(name) => write!(f, "`{name}`"),
            Expr::Unary(UnaryOp::Not, inner) => write!(f, "not {inner}"),
            Expr::Unary(UnaryOp::Neg, inner) => write!(f, "-{inner}"),
            Expr::Binary(op, lhs, rhs) => write!(f, "({lhs} {} {rhs})", op.symbol()),
            Expr::And(terms) => write_joined(f, terms, " and "),
            Expr::Or(terms) => write_joined(f, terms, " or "),
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, terms: &[Expr], sep: &str) -> fmt::Result {
    f.write_str("(")?;
    for (i, term) in terms.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{term}")?;
    }
    f.write_str(")")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signals_are_deduplicated_in_order() {
        let expr = parse("b == 1 and (a > 2 or b < 0)").unwrap();
        assert_eq!(expr.signals(), vec!["b", "a"]);
    }

    #[test]
    fn display_is_canonical_across_spellings() {
        let a = parse("x == true && y || !z").unwrap();
        let b = parse("x == true and y or !z").unwrap();
        assert_eq!(a.to_string(), b.to_string());
        assert_eq!(a.to_string(), "(((x == 1) and y) or not z)");
    }

    #[test]
    fn display_quotes_text() {
        let expr = parse("car.gear == 'reverse'").unwrap();
        assert_eq!(expr.to_string(), "(car.gear == \"reverse\")");
    }

    #[test]
    fn display_quotes_names_outside_bare_syntax() {
        let expr = parse("`engine-temp` > 90 and car.speed < 5").unwrap();
        assert_eq!(expr.to_string(), "((`engine-temp` > 90) and (car.speed < 5))");
        assert_eq!(parse(&expr.to_string()).unwrap(), expr);
    }
}
