//! The statement and expression AST produced by [`crate::parser`].
//!
//! There is exactly one AST: the loader parses every stored line once
//! (§4.2's "folding" mode is just ordinary evaluation of this same tree by
//! [`crate::evaluator`]; §4.2's "inert" mode is the compile-time validator
//! in [`crate::loader`] walking this same tree for [`LineRef`]s without
//! invoking the evaluator at all). Keeping one tree, not two parser
//! backends, is a deliberate simplification over the `original_source/`
//! prototype: the prototype's two parsing grammars (`cfg_expr` vs.
//! `cfg_expr_eval`) exist only because its parsing library runs parse
//! actions eagerly; a tree-walking evaluator has no such constraint.

use crate::operators::{BinaryOp, UnaryOp};

/// Operand of `GO`/`GOIF`/`JUMP`/`HANDLE`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LineRef {
    pub alias: Option<String>,
    pub target: LineTarget,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LineTarget {
    Absolute(i64),
    Relative(i64),
    Label(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Expr {
    IntLit(i64),
    BoolLit(bool),
    /// A string sigil `"<n>"`, resolved against the string table at
    /// evaluation time.
    StrSigil(u32),
    Var(String),
    /// `@IDENT` — true iff `IDENT` is unset in the active frame.
    UnsetQuery(String),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Ternary {
        cond: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Box<Expr>,
    },
}

/// The right-hand side of an `INTO`: either an expression, or the bare `@`
/// sentinel meaning "unset".
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AssignSource {
    Expr(Expr),
    Unset,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Handler {
    pub exception: String,
    pub target: LineRef,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Statement {
    Go(LineRef),
    GoIf { target: LineRef, cond: Expr },
    Jump {
        target: LineRef,
        args: Vec<Expr>,
        handlers: Vec<Handler>,
    },
    Throw(String),
    Return(Vec<Expr>),
    Into { source: AssignSource, target: String },
}
