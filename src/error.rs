//! The three disjoint error kinds from the error model: compile errors,
//! runtime errors, and user exceptions.
//!
//! User exceptions are deliberately *not* a variant of [`GoifError`]. Per the
//! design note on "exceptions for control flow", a thrown `HANDLE`-catchable
//! name is an ordinary program value that the evaluator's unwind loop
//! inspects (see [`crate::evaluator::Outcome`]); only compile errors and
//! runtime errors use Rust's `Result`/`?` error channel.

use std::fmt;

/// A `(file, line)` pair used to decorate diagnostics, and to build the
/// unwind chain reported for an uncaught exception.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceLoc {
    pub file_name: String,
    pub line: u32,
}

impl SourceLoc {
    pub fn new(file_name: impl Into<String>, line: u32) -> SourceLoc {
        SourceLoc {
            file_name: file_name.into(),
            line,
        }
    }
}

impl fmt::Display for SourceLoc {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "line {}, file '{}'", self.line, self.file_name)
    }
}

/// Raised while loading/compiling a program. Non-recoverable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompileError {
    pub message: String,
    pub at: SourceLoc,
}

impl CompileError {
    pub fn new(message: impl Into<String>, at: SourceLoc) -> CompileError {
        CompileError {
            message: message.into(),
            at,
        }
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Error: {} ({})", self.message, self.at)
    }
}

/// Raised while executing a loaded program. Non-recoverable.
///
/// The `Uncaught` variant is a runtime error too (per §4.4/§7): an
/// unhandled `THROW` terminates the program, carrying the chain of `JUMP`
/// sites that were unwound while looking for a handler.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RuntimeErrorKind {
    TypeMismatch(String),
    UnknownVariable(String),
    WriteToStdin,
    ReadFromStdout,
    ReadFromStderr,
    NonBooleanCondition,
    StackOverflow,
    ExplicitError,
    UncaughtException { name: String, chain: Vec<SourceLoc> },
    /// A resolved `^N`/`~±N` target is not a valid line number (§4.3's
    /// "runtime may still fail" clause on unconditionally-accepted
    /// absolute/relative references).
    InvalidJumpTarget(String),
    Io(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuntimeError {
    pub kind: RuntimeErrorKind,
    pub at: SourceLoc,
}

impl RuntimeError {
    pub fn new(kind: RuntimeErrorKind, at: SourceLoc) -> RuntimeError {
        RuntimeError { kind, at }
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.kind {
            RuntimeErrorKind::TypeMismatch(msg) => {
                write!(f, "Error: {} ({})", msg, self.at)
            }
            RuntimeErrorKind::UnknownVariable(name) => {
                write!(f, "Error: Unknown variable {} ({})", name, self.at)
            }
            RuntimeErrorKind::WriteToStdin => {
                write!(f, "Error: You cannot write to STDIN ({})", self.at)
            }
            RuntimeErrorKind::ReadFromStdout => {
                write!(f, "Error: You cannot read from STDOUT ({})", self.at)
            }
            RuntimeErrorKind::ReadFromStderr => {
                write!(f, "Error: You cannot read from STDERR ({})", self.at)
            }
            RuntimeErrorKind::NonBooleanCondition => {
                write!(f, "Error: GOIF expression does not evaluate to bool ({})", self.at)
            }
            RuntimeErrorKind::StackOverflow => {
                write!(f, "Error: Call stack overflow ({})", self.at)
            }
            RuntimeErrorKind::ExplicitError => {
                write!(f, "Error: Critical ERROR raised ({})", self.at)
            }
            RuntimeErrorKind::UncaughtException { name, chain } => {
                write!(f, "Uncaught exception '{}' ({})", name, self.at)?;
                for loc in chain {
                    write!(f, " from JUMP ({})", loc)?;
                }
                Ok(())
            }
            RuntimeErrorKind::InvalidJumpTarget(msg) => {
                write!(f, "Error: {} ({})", msg, self.at)
            }
            RuntimeErrorKind::Io(msg) => {
                write!(f, "Error: I/O error: {} ({})", msg, self.at)
            }
        }
    }
}

/// Unifies the two non-recoverable error kinds, the way `vasm::Error`
/// unifies `ParseError`/`AssembleError`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GoifError {
    Compile(CompileError),
    Runtime(RuntimeError),
}

impl From<CompileError> for GoifError {
    fn from(err: CompileError) -> GoifError {
        GoifError::Compile(err)
    }
}

impl From<RuntimeError> for GoifError {
    fn from(err: RuntimeError) -> GoifError {
        GoifError::Runtime(err)
    }
}

impl fmt::Display for GoifError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            GoifError::Compile(err) => write!(f, "{}", err),
            GoifError::Runtime(err) => write!(f, "{}", err),
        }
    }
}

pub type CompileResult<T> = Result<T, CompileError>;
pub type RuntimeResult<T> = Result<T, RuntimeError>;
