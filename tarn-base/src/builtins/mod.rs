// tarn-base - Built-in procedures
// Copyright (c) 2026 The Tarn Authors. MIT licensed.

//! Built-in native procedures for Tarn.
//!
//! Each `builtin_*` function has the native calling convention: it receives
//! the already-popped argument slice and returns one value or a runtime
//! error. [`register_baselib`] installs them all by name.

mod arithmetic;
mod comparison;
mod pairs;
mod predicates;
mod strings;
mod vectors;

use tarn_vm::{Interp, RuntimeError, Value};

use arithmetic::{builtin_add, builtin_div, builtin_mul, builtin_sub};
use comparison::{builtin_ge, builtin_gt, builtin_le, builtin_lt, builtin_num_eq};
use pairs::{
    builtin_append, builtin_car, builtin_cdr, builtin_cons, builtin_length, builtin_list,
    builtin_reverse,
};
use predicates::{
    builtin_boolean_p, builtin_eq_p, builtin_equal_p, builtin_list_p, builtin_not, builtin_null_p,
    builtin_number_p, builtin_pair_p, builtin_procedure_p, builtin_string_p, builtin_symbol_p,
    builtin_vector_p,
};
use strings::{
    builtin_number_to_string, builtin_string_append, builtin_string_eq, builtin_string_length,
    builtin_substring, builtin_symbol_to_string,
};
use vectors::{
    builtin_list_to_vector, builtin_vector, builtin_vector_length, builtin_vector_ref,
    builtin_vector_to_list,
};

/// Install the base procedures into an interpreter's global namespace.
pub fn register_baselib(interp: &mut Interp) {
    interp.register_native("+", builtin_add);
    interp.register_native("-", builtin_sub);
    interp.register_native("*", builtin_mul);
    interp.register_native("/", builtin_div);

    interp.register_native("=", builtin_num_eq);
    interp.register_native("<", builtin_lt);
    interp.register_native(">", builtin_gt);
    interp.register_native("<=", builtin_le);
    interp.register_native(">=", builtin_ge);

    interp.register_native("cons", builtin_cons);
    interp.register_native("car", builtin_car);
    interp.register_native("cdr", builtin_cdr);
    interp.register_native("list", builtin_list);
    interp.register_native("length", builtin_length);
    interp.register_native("append", builtin_append);
    interp.register_native("reverse", builtin_reverse);

    interp.register_native("null?", builtin_null_p);
    interp.register_native("pair?", builtin_pair_p);
    interp.register_native("list?", builtin_list_p);
    interp.register_native("number?", builtin_number_p);
    interp.register_native("string?", builtin_string_p);
    interp.register_native("symbol?", builtin_symbol_p);
    interp.register_native("boolean?", builtin_boolean_p);
    interp.register_native("vector?", builtin_vector_p);
    interp.register_native("procedure?", builtin_procedure_p);
    interp.register_native("not", builtin_not);
    interp.register_native("eq?", builtin_eq_p);
    interp.register_native("equal?", builtin_equal_p);

    interp.register_native("string-length", builtin_string_length);
    interp.register_native("string-append", builtin_string_append);
    interp.register_native("substring", builtin_substring);
    interp.register_native("string=?", builtin_string_eq);
    interp.register_native("symbol->string", builtin_symbol_to_string);
    interp.register_native("number->string", builtin_number_to_string);

    interp.register_native("vector", builtin_vector);
    interp.register_native("vector-ref", builtin_vector_ref);
    interp.register_native("vector-length", builtin_vector_length);
    interp.register_native("list->vector", builtin_list_to_vector);
    interp.register_native("vector->list", builtin_vector_to_list);
}

// ============================================================================
// Shared argument helpers
// ============================================================================

pub(crate) fn check_exact(name: &str, args: &[Value], n: usize) -> Result<(), RuntimeError> {
    if args.len() != n {
        return Err(RuntimeError::arity_named(name, n, args.len()));
    }
    Ok(())
}

pub(crate) fn check_at_least(name: &str, args: &[Value], n: usize) -> Result<(), RuntimeError> {
    if args.len() < n {
        return Err(RuntimeError::arity_at_least_named(name, n, args.len()));
    }
    Ok(())
}

pub(crate) fn require_number(name: &str, value: &Value) -> Result<f64, RuntimeError> {
    match value {
        Value::Number(n) => Ok(*n),
        other => Err(RuntimeError::type_error_in(
            name,
            "number",
            other.type_name(),
        )),
    }
}

pub(crate) fn require_string(name: &str, value: &Value) -> Result<std::rc::Rc<str>, RuntimeError> {
    match value {
        Value::Str(s) => Ok(s.clone()),
        other => Err(RuntimeError::type_error_in(
            name,
            "string",
            other.type_name(),
        )),
    }
}

/// Convert a numeric argument into a non-negative integral index.
pub(crate) fn require_index(
    name: &str,
    value: &Value,
    length: usize,
) -> Result<usize, RuntimeError> {
    let n = require_number(name, value)?;
    if n < 0.0 || n.fract() != 0.0 || n as usize > length {
        return Err(RuntimeError::IndexOutOfBounds {
            index: n as i64,
            length,
        });
    }
    Ok(n as usize)
}
