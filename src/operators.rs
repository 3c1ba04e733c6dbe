//! Operator tokens, the precedence table, and operator semantics (§4.1).
//!
//! Mirrors `operator_exprs.py`'s `Operate` dispatch from the prototype this
//! was distilled from, but returns a typed [`OperatorOutcome`] instead of
//! raising a Python exception: `OP_FAIL` (div/mod by zero, out-of-range `#`
//! index) is an ordinary return value the evaluator's unwind loop inspects,
//! never a Rust `Err`. Every other operator misuse is a [`RuntimeError`].

use crate::error::{RuntimeError, RuntimeErrorKind, SourceLoc};
use crate::value::Value;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
    And,
    Or,
    Index,
    Concat,
}

pub enum OperatorOutcome {
    Value(Value),
    OpFail,
}

/// One level of the precedence table, lowest to highest. `Infix` levels
/// are left-associative; ternary `?:` is handled separately by the parser
/// since it is the only operator of arity 3 and is right-associative.
pub enum Level {
    Infix(&'static [(&'static str, BinaryOp)]),
    Prefix(&'static [(&'static str, UnaryOp)]),
}

/// Lowest to highest (tightest-binding last), exactly as listed in §4.1:
/// logical, comparisons, unary `!`, `^`, `#`, additive, multiplicative,
/// unary `-`. Ternary `?:` sits below all of these and is parsed first.
pub static LEVELS: &[Level] = &[
    Level::Infix(&[("&", BinaryOp::And), ("|", BinaryOp::Or)]),
    Level::Infix(&[
        ("<=", BinaryOp::Le),
        (">=", BinaryOp::Ge),
        ("==", BinaryOp::Eq),
        ("!=", BinaryOp::Ne),
        ("<", BinaryOp::Lt),
        (">", BinaryOp::Gt),
    ]),
    Level::Prefix(&[("!", UnaryOp::Not)]),
    Level::Infix(&[("^", BinaryOp::Concat)]),
    Level::Infix(&[("#", BinaryOp::Index)]),
    Level::Infix(&[("+", BinaryOp::Add), ("-", BinaryOp::Sub)]),
    Level::Infix(&[("*", BinaryOp::Mul), ("/", BinaryOp::Div), ("\\", BinaryOp::Mod)]),
    Level::Prefix(&[("-", UnaryOp::Neg)]),
];

fn mismatch(at: &SourceLoc, message: impl Into<String>) -> RuntimeError {
    RuntimeError::new(RuntimeErrorKind::TypeMismatch(message.into()), at.clone())
}

/// Floor division, matching Python's `//` (`operator_exprs.py`'s `/`): the
/// quotient rounds toward negative infinity, not toward zero like Rust's
/// built-in `/`.
fn floor_div(a: i64, b: i64) -> i64 {
    let q = a / b;
    let r = a % b;
    if r != 0 && (r < 0) != (b < 0) {
        q - 1
    } else {
        q
    }
}

/// Modulus matching the sign of the divisor, as Python's `%` does
/// (`operator_exprs.py`'s `\`) — distinct from Rust's `%`, which matches
/// the sign of the dividend, and from `rem_euclid`, which is always
/// non-negative regardless of the divisor's sign.
fn floor_mod(a: i64, b: i64) -> i64 {
    let r = a % b;
    if r != 0 && (r < 0) != (b < 0) {
        r + b
    } else {
        r
    }
}

pub fn apply_unary(op: UnaryOp, operand: Value, at: &SourceLoc) -> Result<Value, RuntimeError> {
    match (op, operand) {
        (UnaryOp::Neg, Value::Int(i)) => Ok(Value::Int(-i)),
        (UnaryOp::Neg, other) => Err(mismatch(at, format!("Operand of - must be an integer, got {}", other.kind_name()))),
        (UnaryOp::Not, Value::Bool(b)) => Ok(Value::Bool(!b)),
        (UnaryOp::Not, other) => Err(mismatch(at, format!("Operand of ! must be a boolean, got {}", other.kind_name()))),
    }
}

pub fn apply_binary(
    op: BinaryOp,
    lhs: Value,
    rhs: Value,
    at: &SourceLoc,
) -> Result<OperatorOutcome, RuntimeError> {
    use BinaryOp::*;
    use Value::*;

    let ok = |v: Value| Ok(OperatorOutcome::Value(v));

    match (op, lhs, rhs) {
        (Add, Int(a), Int(b)) => ok(Int(a.wrapping_add(b))),
        (Sub, Int(a), Int(b)) => ok(Int(a.wrapping_sub(b))),
        (Mul, Int(a), Int(b)) => ok(Int(a.wrapping_mul(b))),

        (Div, Int(_), Int(0)) => Ok(OperatorOutcome::OpFail),
        (Div, Int(a), Int(b)) => ok(Int(floor_div(a, b))),

        (Mod, Int(_), Int(0)) => Ok(OperatorOutcome::OpFail),
        (Mod, Int(a), Int(b)) => ok(Int(floor_mod(a, b))),

        (Lt, Int(a), Int(b)) => ok(Bool(a < b)),
        (Le, Int(a), Int(b)) => ok(Bool(a <= b)),
        (Gt, Int(a), Int(b)) => ok(Bool(a > b)),
        (Ge, Int(a), Int(b)) => ok(Bool(a >= b)),

        (Eq, Int(a), Int(b)) => ok(Bool(a == b)),
        (Eq, Str(a), Str(b)) => ok(Bool(a == b)),
        (Ne, Int(a), Int(b)) => ok(Bool(a != b)),
        (Ne, Str(a), Str(b)) => ok(Bool(a != b)),

        (And, Bool(a), Bool(b)) => ok(Bool(a && b)),
        (Or, Bool(a), Bool(b)) => ok(Bool(a || b)),

        (Index, Str(s), Int(i)) => {
            if i <= 0 || i as usize > s.chars().count() {
                Ok(OperatorOutcome::OpFail)
            } else {
                let ch = s.chars().nth((i - 1) as usize).unwrap();
                ok(Str(ch.to_string()))
            }
        }

        (Concat, Str(a), Str(b)) => ok(Str(a + &b)),

        (Add, a, b) | (Sub, a, b) | (Mul, a, b) => Err(mismatch(
            at,
            format!("Operands must both be integers, got {} and {}", a.kind_name(), b.kind_name()),
        )),
        (Div, a, b) | (Mod, a, b) => Err(mismatch(
            at,
            format!("Operands must both be integers, got {} and {}", a.kind_name(), b.kind_name()),
        )),
        (Lt, a, b) | (Le, a, b) | (Gt, a, b) | (Ge, a, b) => Err(mismatch(
            at,
            format!("Operands must both be integers, got {} and {}", a.kind_name(), b.kind_name()),
        )),
        (Eq, a, b) | (Ne, a, b) => Err(mismatch(
            at,
            format!(
                "Operands must both be integers or both be strings, got {} and {}",
                a.kind_name(),
                b.kind_name()
            ),
        )),
        (And, a, b) | (Or, a, b) => Err(mismatch(
            at,
            format!("Operands must both be booleans, got {} and {}", a.kind_name(), b.kind_name()),
        )),
        (Index, a, b) => Err(mismatch(
            at,
            format!(
                "First operand of # must be a string and second an integer, got {} and {}",
                a.kind_name(),
                b.kind_name()
            ),
        )),
        (Concat, a, b) => Err(mismatch(
            at,
            format!("Operands of ^ must both be strings, got {} and {}", a.kind_name(), b.kind_name()),
        )),
    }
}

pub fn apply_ternary(cond: Value, then_v: Value, else_v: Value, at: &SourceLoc) -> Result<Value, RuntimeError> {
    match cond {
        Value::Bool(true) => Ok(then_v),
        Value::Bool(false) => Ok(else_v),
        other => Err(mismatch(at, format!("Condition of ?: must be a boolean, got {}", other.kind_name()))),
    }
}
