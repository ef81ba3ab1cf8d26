// tarn-base - Arithmetic built-in procedures
// Copyright (c) 2026 The Tarn Authors. MIT licensed.

//! Arithmetic: `+`, `-`, `*`, `/`.
//!
//! `+` and `*` fold from their identities, so `(+)` is `0` and `(*)` is
//! `1`. `-` and `/` need at least one argument; with exactly one, `-`
//! negates and `/` takes the reciprocal. Division by zero is an error
//! rather than an IEEE infinity.

use tarn_vm::{RuntimeError, Value};

use super::{check_at_least, require_number};

pub(crate) fn builtin_add(args: &[Value]) -> Result<Value, RuntimeError> {
    let mut acc = 0.0;
    for arg in args {
        acc += require_number("+", arg)?;
    }
    Ok(Value::Number(acc))
}

pub(crate) fn builtin_mul(args: &[Value]) -> Result<Value, RuntimeError> {
    let mut acc = 1.0;
    for arg in args {
        acc *= require_number("*", arg)?;
    }
    Ok(Value::Number(acc))
}

pub(crate) fn builtin_sub(args: &[Value]) -> Result<Value, RuntimeError> {
    check_at_least("-", args, 1)?;
    let first = require_number("-", &args[0])?;
    if args.len() == 1 {
        return Ok(Value::Number(-first));
    }
    let mut acc = first;
    for arg in &args[1..] {
        acc -= require_number("-", arg)?;
    }
    Ok(Value::Number(acc))
}

pub(crate) fn builtin_div(args: &[Value]) -> Result<Value, RuntimeError> {
    check_at_least("/", args, 1)?;
    let first = require_number("/", &args[0])?;
    if args.len() == 1 {
        if first == 0.0 {
            return Err(RuntimeError::DivisionByZero);
        }
        return Ok(Value::Number(1.0 / first));
    }
    let mut acc = first;
    for arg in &args[1..] {
        let divisor = require_number("/", arg)?;
        if divisor == 0.0 {
            return Err(RuntimeError::DivisionByZero);
        }
        acc /= divisor;
    }
    Ok(Value::Number(acc))
}
