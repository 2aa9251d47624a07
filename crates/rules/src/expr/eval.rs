//! Pure interpreter for [`Expr`] trees.

use std::cmp::Ordering;

use vsm_core::{Snapshot, Value};

use super::error::EvalError;
use super::{BinaryOp, Expr, UnaryOp};

impl Expr {
    /// Evaluate against a state snapshot.
    ///
    /// Unassigned signals read as absent. Comparisons between incomparable
    /// values are `false`, arithmetic on non-numbers yields absent. Only
    /// division by zero and integer overflow are errors.
    pub fn eval(&self, state: &Snapshot) -> Result<Value, EvalError> {
        match self {
            Expr::Literal(v) => Ok(v.clone()),
            Expr::Signal(name) => Ok(state.get(name).clone()),

            Expr::Unary(UnaryOp::Not, inner) => Ok(Value::Bool(!inner.eval(state)?.is_truthy())),
            Expr::Unary(UnaryOp::Neg, inner) => negate(inner.eval(state)?),

            Expr::Binary(op, lhs, rhs) => {
                let a = lhs.eval(state)?;
                let b = rhs.eval(state)?;
                if op.is_comparison() {
                    Ok(Value::Bool(compare(*op, &a, &b)))
                } else {
                    arithmetic(*op, &a, &b)
                }
            }

            Expr::And(terms) => {
                for term in terms {
                    if !term.eval(state)?.is_truthy() {
                        return Ok(Value::Bool(false));
                    }
                }
                Ok(Value::Bool(true))
            }
            Expr::Or(terms) => {
                for term in terms {
                    if term.eval(state)?.is_truthy() {
                        return Ok(Value::Bool(true));
                    }
                }
                Ok(Value::Bool(false))
            }
        }
    }

    /// Evaluate and reduce to a boolean by truthiness.
    pub fn eval_condition(&self, state: &Snapshot) -> Result<bool, EvalError> {
        Ok(self.eval(state)?.is_truthy())
    }
}

fn negate(v: Value) -> Result<Value, EvalError> {
    match v {
        Value::Float(f) => Ok(Value::Float(-f)),
        other => match other.as_i64() {
            Some(i) => i
                .checked_neg()
                .map(Value::Int)
                .ok_or(EvalError::Overflow("negation")),
            None => Ok(Value::Absent),
        },
    }
}

fn compare(op: BinaryOp, a: &Value, b: &Value) -> bool {
    let Some(ord) = a.compare(b) else {
        return false;
    };
    match op {
        BinaryOp::Eq => ord == Ordering::Equal,
        BinaryOp::Ne => ord != Ordering::Equal,
        BinaryOp::Lt => ord == Ordering::Less,
        BinaryOp::Le => ord != Ordering::Greater,
        BinaryOp::Gt => ord == Ordering::Greater,
        BinaryOp::Ge => ord != Ordering::Less,
        _ => false,
    }
}

fn arithmetic(op: BinaryOp, a: &Value, b: &Value) -> Result<Value, EvalError> {
    // Integer path when neither side is a float.
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        return match op {
            BinaryOp::Add => x.checked_add(y).map(Value::Int).ok_or(EvalError::Overflow("addition")),
            BinaryOp::Sub => x
                .checked_sub(y)
                .map(Value::Int)
                .ok_or(EvalError::Overflow("subtraction")),
            BinaryOp::Mul => x
                .checked_mul(y)
                .map(Value::Int)
                .ok_or(EvalError::Overflow("multiplication")),
            BinaryOp::Div => {
                if y == 0 {
                    return Err(EvalError::DivisionByZero);
                }
                Ok(Value::Float(x as f64 / y as f64))
            }
            BinaryOp::Rem => {
                if y == 0 {
                    return Err(EvalError::DivisionByZero);
                }
                x.checked_rem(y).map(Value::Int).ok_or(EvalError::Overflow("remainder"))
            }
            _ => Ok(Value::Absent),
        };
    }

    let (Some(x), Some(y)) = (a.as_f64(), b.as_f64()) else {
        return Ok(Value::Absent);
    };
    let result = match op {
        BinaryOp::Add => x + y,
        BinaryOp::Sub => x - y,
        BinaryOp::Mul => x * y,
        BinaryOp::Div | BinaryOp::Rem if y == 0.0 => return Err(EvalError::DivisionByZero),
        BinaryOp::Div => x / y,
        BinaryOp::Rem => x % y,
        _ => return Ok(Value::Absent),
    };
    Ok(Value::Float(result))
}
