// tarn-vm - Runtime errors for the VM
// Copyright (c) 2026 The Tarn Authors. MIT licensed.

//! Runtime errors and the three-way error taxonomy.
//!
//! Every error the engine can raise belongs to one of three kinds:
//! syntax errors (compile time), type errors (wrong runtime operand kind),
//! and internal errors (arity mismatches, unbound symbols, division by
//! zero, resource exhaustion, malformed-bytecode invariants). Errors are
//! never retried or swallowed; they unwind to the embedding layer.

use std::fmt;

use crate::symbol::Symbol;

/// The coarse error classification shared by the compiler and the VM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed special form, rejected at compile time.
    Syntax,
    /// Wrong runtime operand kind, e.g. `car` of a non-pair.
    Type,
    /// Everything else: arity mismatch, unbound symbol, division by zero,
    /// stack exhaustion, bytecode invariant violations.
    Internal,
}

/// Specification for an expected argument count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AritySpec {
    Exact(usize),
    AtLeast(usize),
}

impl fmt::Display for AritySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AritySpec::Exact(n) => write!(f, "{}", n),
            AritySpec::AtLeast(n) => write!(f, "at least {}", n),
        }
    }
}

/// Runtime error during VM execution.
#[derive(Debug, Clone)]
pub enum RuntimeError {
    /// Register stack underflow.
    StackUnderflow,
    /// Register stack capacity exceeded.
    StackOverflow,
    /// Call-information stack capacity exceeded.
    CallDepthExceeded,
    /// Wrong operand kind.
    TypeError {
        expected: &'static str,
        got: &'static str,
        context: Option<String>,
    },
    /// Attempted to call something that is neither a procedure nor a
    /// continuation.
    NotCallable(&'static str),
    /// Read of a global that was never defined.
    UndefinedSymbol(Symbol),
    /// Wrong number of arguments.
    ArityError {
        expected: AritySpec,
        got: usize,
        name: Option<String>,
    },
    /// Division by zero.
    DivisionByZero,
    /// Index outside a vector or string.
    IndexOutOfBounds { index: i64, length: usize },
    /// Bytecode invariant violation.
    Internal(String),
}

impl RuntimeError {
    /// Which taxonomy kind this error belongs to.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            RuntimeError::TypeError { .. } | RuntimeError::NotCallable(_) => ErrorKind::Type,
            _ => ErrorKind::Internal,
        }
    }

    /// Create an exact-arity error.
    pub fn arity(expected: usize, got: usize) -> Self {
        RuntimeError::ArityError {
            expected: AritySpec::Exact(expected),
            got,
            name: None,
        }
    }

    /// Create an exact-arity error carrying the procedure name.
    pub fn arity_named(name: impl Into<String>, expected: usize, got: usize) -> Self {
        RuntimeError::ArityError {
            expected: AritySpec::Exact(expected),
            got,
            name: Some(name.into()),
        }
    }

    /// Create a minimum-arity error.
    pub fn arity_at_least(expected: usize, got: usize) -> Self {
        RuntimeError::ArityError {
            expected: AritySpec::AtLeast(expected),
            got,
            name: None,
        }
    }

    /// Create a minimum-arity error carrying the procedure name.
    pub fn arity_at_least_named(name: impl Into<String>, expected: usize, got: usize) -> Self {
        RuntimeError::ArityError {
            expected: AritySpec::AtLeast(expected),
            got,
            name: Some(name.into()),
        }
    }

    /// Create a type error.
    pub fn type_error(expected: &'static str, got: &'static str) -> Self {
        RuntimeError::TypeError {
            expected,
            got,
            context: None,
        }
    }

    /// Create a type error naming the operation it occurred in.
    pub fn type_error_in(
        context: impl Into<String>,
        expected: &'static str,
        got: &'static str,
    ) -> Self {
        RuntimeError::TypeError {
            expected,
            got,
            context: Some(context.into()),
        }
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeError::StackUnderflow => write!(f, "Register stack underflow"),
            RuntimeError::StackOverflow => write!(f, "Register stack overflow"),
            RuntimeError::CallDepthExceeded => write!(f, "Call stack overflow"),
            RuntimeError::TypeError {
                expected,
                got,
                context,
            } => {
                if let Some(ctx) = context {
                    write!(f, "{}: expected {}, got {}", ctx, expected, got)
                } else {
                    write!(f, "Type error: expected {}, got {}", expected, got)
                }
            }
            RuntimeError::NotCallable(typ) => {
                write!(f, "Value is not callable: {}", typ)
            }
            RuntimeError::UndefinedSymbol(sym) => {
                write!(f, "Unbound symbol: {}", sym)
            }
            RuntimeError::ArityError {
                expected,
                got,
                name,
            } => {
                if let Some(name) = name {
                    write!(
                        f,
                        "Wrong number of arguments to '{}': expected {}, got {}",
                        name, expected, got
                    )
                } else {
                    write!(
                        f,
                        "Wrong number of arguments: expected {}, got {}",
                        expected, got
                    )
                }
            }
            RuntimeError::DivisionByZero => write!(f, "Division by zero"),
            RuntimeError::IndexOutOfBounds { index, length } => {
                write!(f, "Index {} out of bounds for length {}", index, length)
            }
            RuntimeError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for RuntimeError {}

/// Result type for VM operations.
pub type Result<T> = std::result::Result<T, RuntimeError>;
