// tarn-base - Predicate built-in procedures
// Copyright (c) 2026 The Tarn Authors. MIT licensed.

//! Type predicates plus `not`, `eq?` and `equal?`.

use tarn_vm::{list_to_vec, RuntimeError, Value};

use super::check_exact;

fn type_predicate(
    name: &'static str,
    args: &[Value],
    test: fn(&Value) -> bool,
) -> Result<Value, RuntimeError> {
    check_exact(name, args, 1)?;
    Ok(Value::Boolean(test(&args[0])))
}

pub(crate) fn builtin_null_p(args: &[Value]) -> Result<Value, RuntimeError> {
    type_predicate("null?", args, |v| matches!(v, Value::Nil))
}

pub(crate) fn builtin_pair_p(args: &[Value]) -> Result<Value, RuntimeError> {
    type_predicate("pair?", args, |v| matches!(v, Value::Pair(_)))
}

pub(crate) fn builtin_list_p(args: &[Value]) -> Result<Value, RuntimeError> {
    type_predicate("list?", args, |v| list_to_vec(v).is_some())
}

pub(crate) fn builtin_number_p(args: &[Value]) -> Result<Value, RuntimeError> {
    type_predicate("number?", args, |v| matches!(v, Value::Number(_)))
}

pub(crate) fn builtin_string_p(args: &[Value]) -> Result<Value, RuntimeError> {
    type_predicate("string?", args, |v| matches!(v, Value::Str(_)))
}

pub(crate) fn builtin_symbol_p(args: &[Value]) -> Result<Value, RuntimeError> {
    type_predicate("symbol?", args, |v| matches!(v, Value::Symbol(_)))
}

pub(crate) fn builtin_boolean_p(args: &[Value]) -> Result<Value, RuntimeError> {
    type_predicate("boolean?", args, |v| matches!(v, Value::Boolean(_)))
}

pub(crate) fn builtin_vector_p(args: &[Value]) -> Result<Value, RuntimeError> {
    type_predicate("vector?", args, |v| matches!(v, Value::Vector(_)))
}

pub(crate) fn builtin_procedure_p(args: &[Value]) -> Result<Value, RuntimeError> {
    type_predicate("procedure?", args, |v| {
        matches!(v, Value::Closure(_) | Value::Continuation(_))
    })
}

pub(crate) fn builtin_not(args: &[Value]) -> Result<Value, RuntimeError> {
    check_exact("not", args, 1)?;
    Ok(Value::Boolean(!args[0].is_truthy()))
}

pub(crate) fn builtin_eq_p(args: &[Value]) -> Result<Value, RuntimeError> {
    check_exact("eq?", args, 2)?;
    Ok(Value::Boolean(args[0].is_identical(&args[1])))
}

pub(crate) fn builtin_equal_p(args: &[Value]) -> Result<Value, RuntimeError> {
    check_exact("equal?", args, 2)?;
    Ok(Value::Boolean(args[0] == args[1]))
}
