// tarn-base - Common test utilities
// Copyright (c) 2026 The Tarn Authors. MIT licensed.

//! Shared helpers for the language-level integration tests: parse, compile
//! and execute a source string against a fresh interpreter with the base
//! library registered.

#![allow(dead_code)]

use std::fmt;

pub use tarn_base::register_baselib;
pub use tarn_parser::{ParseError, Parser};
pub use tarn_vm::{compile, CompileError, ErrorKind, Interp, Options, RuntimeError, Value};

/// Any failure on the way from source text to a value.
#[derive(Debug)]
pub enum EvalFailure {
    Parse(ParseError),
    Compile(CompileError),
    Runtime(RuntimeError),
}

impl EvalFailure {
    /// Taxonomy kind, when the failure came from the engine itself.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            EvalFailure::Parse(_) => None,
            EvalFailure::Compile(e) => Some(e.kind()),
            EvalFailure::Runtime(e) => Some(e.kind()),
        }
    }
}

impl fmt::Display for EvalFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvalFailure::Parse(e) => write!(f, "{}", e),
            EvalFailure::Compile(e) => write!(f, "{}", e),
            EvalFailure::Runtime(e) => write!(f, "{}", e),
        }
    }
}

/// Evaluate a whole program in a fresh interpreter with default capacities.
pub fn eval_str(source: &str) -> Result<Value, EvalFailure> {
    eval_str_with(source, Options::default())
}

/// Evaluate a whole program against the given stack capacities.
pub fn eval_str_with(source: &str, options: Options) -> Result<Value, EvalFailure> {
    let forms = Parser::parse_all_str(source).map_err(EvalFailure::Parse)?;
    let proto = compile(&forms).map_err(EvalFailure::Compile)?;
    let mut interp = Interp::new(options);
    register_baselib(&mut interp);
    interp.execute(proto).map_err(EvalFailure::Runtime)
}

/// Evaluate and render the result, panicking on failure.
pub fn eval_display(source: &str) -> String {
    match eval_str(source) {
        Ok(value) => value.to_string(),
        Err(e) => panic!("evaluation failed for {:?}: {}", source, e),
    }
}

/// Evaluate expecting an engine error; returns its taxonomy kind.
pub fn eval_kind(source: &str) -> ErrorKind {
    match eval_str(source) {
        Ok(value) => panic!("expected an error for {:?}, got {}", source, value),
        Err(e) => e
            .kind()
            .unwrap_or_else(|| panic!("expected an engine error for {:?}, got {}", source, e)),
    }
}
