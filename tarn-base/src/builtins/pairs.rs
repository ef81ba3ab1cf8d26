// tarn-base - Pair and list built-in procedures
// Copyright (c) 2026 The Tarn Authors. MIT licensed.

//! Pairs and lists: `cons`, `car`, `cdr`, `list`, `length`, `append`,
//! `reverse`. Procedures that walk a whole list reject dotted chains.

use tarn_vm::{list_to_vec, RuntimeError, Value};

use super::check_exact;

pub(crate) fn builtin_cons(args: &[Value]) -> Result<Value, RuntimeError> {
    check_exact("cons", args, 2)?;
    Ok(Value::cons(args[0].clone(), args[1].clone()))
}

pub(crate) fn builtin_car(args: &[Value]) -> Result<Value, RuntimeError> {
    check_exact("car", args, 1)?;
    match &args[0] {
        Value::Pair(pair) => Ok(pair.car.clone()),
        other => Err(RuntimeError::type_error_in(
            "car",
            "pair",
            other.type_name(),
        )),
    }
}

pub(crate) fn builtin_cdr(args: &[Value]) -> Result<Value, RuntimeError> {
    check_exact("cdr", args, 1)?;
    match &args[0] {
        Value::Pair(pair) => Ok(pair.cdr.clone()),
        other => Err(RuntimeError::type_error_in(
            "cdr",
            "pair",
            other.type_name(),
        )),
    }
}

pub(crate) fn builtin_list(args: &[Value]) -> Result<Value, RuntimeError> {
    Ok(Value::list(args.to_vec()))
}

pub(crate) fn builtin_length(args: &[Value]) -> Result<Value, RuntimeError> {
    check_exact("length", args, 1)?;
    let items = list_to_vec(&args[0]).ok_or_else(|| {
        RuntimeError::type_error_in("length", "list", args[0].type_name())
    })?;
    Ok(Value::Number(items.len() as f64))
}

pub(crate) fn builtin_append(args: &[Value]) -> Result<Value, RuntimeError> {
    // (append) is (), and the final argument becomes the tail unchanged,
    // so (append '(1) 2) is the dotted (1 . 2).
    let (last, init) = match args.split_last() {
        Some(split) => split,
        None => return Ok(Value::Nil),
    };
    let mut out = last.clone();
    for arg in init.iter().rev() {
        let items = list_to_vec(arg).ok_or_else(|| {
            RuntimeError::type_error_in("append", "list", arg.type_name())
        })?;
        for item in items.into_iter().rev() {
            out = Value::cons(item, out);
        }
    }
    Ok(out)
}

pub(crate) fn builtin_reverse(args: &[Value]) -> Result<Value, RuntimeError> {
    check_exact("reverse", args, 1)?;
    let mut items = list_to_vec(&args[0]).ok_or_else(|| {
        RuntimeError::type_error_in("reverse", "list", args[0].type_name())
    })?;
    items.reverse();
    Ok(Value::list(items))
}
