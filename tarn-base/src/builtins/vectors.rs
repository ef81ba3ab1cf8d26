// tarn-base - Vector built-in procedures
// Copyright (c) 2026 The Tarn Authors. MIT licensed.

//! Vector access: `vector`, `vector-ref`, `vector-length`,
//! `list->vector`, `vector->list`.

use std::rc::Rc;

use tarn_vm::{list_to_vec, RuntimeError, Value};

use super::{check_exact, require_index};

fn require_vector(name: &str, value: &Value) -> Result<Rc<Vec<Value>>, RuntimeError> {
    match value {
        Value::Vector(items) => Ok(items.clone()),
        other => Err(RuntimeError::type_error_in(
            name,
            "vector",
            other.type_name(),
        )),
    }
}

pub(crate) fn builtin_vector(args: &[Value]) -> Result<Value, RuntimeError> {
    Ok(Value::Vector(Rc::new(args.to_vec())))
}

pub(crate) fn builtin_vector_ref(args: &[Value]) -> Result<Value, RuntimeError> {
    check_exact("vector-ref", args, 2)?;
    let items = require_vector("vector-ref", &args[0])?;
    let index = require_index("vector-ref", &args[1], items.len())?;
    items
        .get(index)
        .cloned()
        .ok_or(RuntimeError::IndexOutOfBounds {
            index: index as i64,
            length: items.len(),
        })
}

pub(crate) fn builtin_vector_length(args: &[Value]) -> Result<Value, RuntimeError> {
    check_exact("vector-length", args, 1)?;
    let items = require_vector("vector-length", &args[0])?;
    Ok(Value::Number(items.len() as f64))
}

pub(crate) fn builtin_list_to_vector(args: &[Value]) -> Result<Value, RuntimeError> {
    check_exact("list->vector", args, 1)?;
    let items = list_to_vec(&args[0]).ok_or_else(|| {
        RuntimeError::type_error_in("list->vector", "list", args[0].type_name())
    })?;
    Ok(Value::Vector(Rc::new(items)))
}

pub(crate) fn builtin_vector_to_list(args: &[Value]) -> Result<Value, RuntimeError> {
    check_exact("vector->list", args, 1)?;
    let items = require_vector("vector->list", &args[0])?;
    Ok(Value::list(items.as_ref().clone()))
}
