// tarn-vm - Compile-and-execute tests for the core special forms
// Copyright (c) 2026 The Tarn Authors. MIT licensed.

//! End-to-end tests over hand-built forms, exercising the compiler and VM
//! without the reader or the primitive library.

use tarn_vm::{compile, ErrorKind, Interp, Options, Value};

fn sym(name: &str) -> Value {
    Value::symbol(name)
}

fn num(n: f64) -> Value {
    Value::Number(n)
}

fn form(items: Vec<Value>) -> Value {
    Value::list(items)
}

fn run(forms: &[Value]) -> Result<Value, String> {
    let proto = compile(forms).map_err(|e| e.to_string())?;
    let mut interp = Interp::default();
    interp.execute(proto).map_err(|e| e.to_string())
}

#[test]
fn test_literal_program() {
    assert_eq!(run(&[num(42.0)]).unwrap(), num(42.0));
    assert_eq!(run(&[Value::Boolean(true)]).unwrap(), Value::Boolean(true));
}

#[test]
fn test_identity_lambda() {
    // ((lambda (x) x) 42)
    let result = run(&[form(vec![
        form(vec![sym("lambda"), form(vec![sym("x")]), sym("x")]),
        num(42.0),
    ])])
    .unwrap();
    assert_eq!(result, num(42.0));
}

#[test]
fn test_if_branches() {
    let program = |test: Value| form(vec![sym("if"), test, num(1.0), num(2.0)]);
    assert_eq!(run(&[program(Value::Boolean(true))]).unwrap(), num(1.0));
    assert_eq!(run(&[program(Value::Boolean(false))]).unwrap(), num(2.0));
    // Every non-#f value is truthy.
    assert_eq!(run(&[program(num(0.0))]).unwrap(), num(1.0));
    assert_eq!(run(&[program(Value::Nil)]).unwrap(), num(1.0));
}

#[test]
fn test_if_missing_alternative() {
    let result = run(&[form(vec![sym("if"), Value::Boolean(false), num(1.0)])]).unwrap();
    assert_eq!(result, Value::Undefined);
}

#[test]
fn test_define_then_read() {
    let result = run(&[
        form(vec![sym("define"), sym("x"), num(7.0)]),
        sym("x"),
    ])
    .unwrap();
    assert_eq!(result, num(7.0));
}

#[test]
fn test_set_rebinds_global() {
    let result = run(&[
        form(vec![sym("define"), sym("x"), num(1.0)]),
        form(vec![sym("set!"), sym("x"), num(2.0)]),
        sym("x"),
    ])
    .unwrap();
    assert_eq!(result, num(2.0));
}

#[test]
fn test_set_on_unbound_defines_global() {
    // Assignment-before-definition rebinds a global rather than erroring.
    let result = run(&[form(vec![sym("set!"), sym("fresh"), num(3.0)]), sym("fresh")]).unwrap();
    assert_eq!(result, num(3.0));
}

#[test]
fn test_quote_never_evaluates() {
    let datum = form(vec![sym("if"), num(1.0), num(2.0)]);
    let result = run(&[form(vec![sym("quote"), datum.clone()])]).unwrap();
    assert_eq!(result, datum);
}

#[test]
fn test_begin_returns_last() {
    let result = run(&[form(vec![sym("begin"), num(1.0), num(2.0), num(3.0)])]).unwrap();
    assert_eq!(result, num(3.0));
}

#[test]
fn test_variadic_binds_all_args_as_list() {
    // ((lambda args args) 1 2 3)
    let result = run(&[form(vec![
        form(vec![sym("lambda"), sym("args"), sym("args")]),
        num(1.0),
        num(2.0),
        num(3.0),
    ])])
    .unwrap();
    assert_eq!(result, form(vec![num(1.0), num(2.0), num(3.0)]));
}

#[test]
fn test_variadic_binds_zero_args() {
    let result = run(&[form(vec![form(vec![
        sym("lambda"),
        sym("args"),
        sym("args"),
    ])])])
    .unwrap();
    assert_eq!(result, Value::Nil);
}

#[test]
fn test_rest_collects_remainder() {
    // ((lambda (a . rest) rest) 1 2 3) => (2 3)
    let formals = Value::cons(sym("a"), sym("rest"));
    let result = run(&[form(vec![
        form(vec![sym("lambda"), formals.clone(), sym("rest")]),
        num(1.0),
        num(2.0),
        num(3.0),
    ])])
    .unwrap();
    assert_eq!(result, form(vec![num(2.0), num(3.0)]));

    // With no extra arguments the rest parameter binds the empty list.
    let result = run(&[form(vec![
        form(vec![sym("lambda"), formals, sym("rest")]),
        num(1.0),
    ])])
    .unwrap();
    assert_eq!(result, Value::Nil);
}

#[test]
fn test_fixed_arity_mismatch_is_internal() {
    let proto = compile(&[form(vec![
        form(vec![sym("lambda"), form(vec![sym("x")]), sym("x")]),
        num(1.0),
        num(2.0),
    ])])
    .unwrap();
    let mut interp = Interp::default();
    let err = interp.execute(proto).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Internal);
}

#[test]
fn test_unbound_global_is_internal() {
    let proto = compile(&[sym("no-such-binding")]).unwrap();
    let mut interp = Interp::default();
    let err = interp.execute(proto).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Internal);
}

#[test]
fn test_calling_non_callable_is_type_error() {
    let proto = compile(&[form(vec![
        form(vec![sym("quote"), num(5.0)]),
        num(1.0),
    ])])
    .unwrap();
    let mut interp = Interp::default();
    let err = interp.execute(proto).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Type);
}

#[test]
fn test_closure_reads_env_after_return() {
    // (define (make-const x) (lambda () x))
    // ((make-const 7))
    let result = run(&[
        form(vec![
            sym("define"),
            form(vec![sym("make-const"), sym("x")]),
            form(vec![sym("lambda"), Value::Nil, sym("x")]),
        ]),
        form(vec![form(vec![sym("make-const"), num(7.0)])]),
    ])
    .unwrap();
    assert_eq!(result, num(7.0));
}

#[test]
fn test_set_through_upvalue_shared() {
    // (define (make x)
    //   (lambda (v) (begin (set! x v) x)))
    // ((make 1) 9)
    let result = run(&[
        form(vec![
            sym("define"),
            form(vec![sym("make"), sym("x")]),
            form(vec![
                sym("lambda"),
                form(vec![sym("v")]),
                form(vec![
                    sym("begin"),
                    form(vec![sym("set!"), sym("x"), sym("v")]),
                    sym("x"),
                ]),
            ]),
        ]),
        form(vec![form(vec![sym("make"), num(1.0)]), num(9.0)]),
    ])
    .unwrap();
    assert_eq!(result, num(9.0));
}

#[test]
fn test_call_cc_escape() {
    // (call/cc (lambda (k) (k 3) 5)) => 3
    let result = run(&[form(vec![
        sym("call/cc"),
        form(vec![
            sym("lambda"),
            form(vec![sym("k")]),
            form(vec![sym("k"), num(3.0)]),
            num(5.0),
        ]),
    ])])
    .unwrap();
    assert_eq!(result, num(3.0));
}

#[test]
fn test_call_cc_normal_return() {
    // (call/cc (lambda (k) 5)) => 5 when the continuation is never invoked.
    let result = run(&[form(vec![
        sym("call/cc"),
        form(vec![sym("lambda"), form(vec![sym("k")]), num(5.0)]),
    ])])
    .unwrap();
    assert_eq!(result, num(5.0));
}

#[test]
fn test_native_registration_and_call() {
    let proto = compile(&[form(vec![sym("double"), num(21.0)])]).unwrap();
    let mut interp = Interp::default();
    interp.register_native("double", |args| match args {
        [Value::Number(n)] => Ok(Value::Number(n * 2.0)),
        _ => Err(tarn_vm::RuntimeError::arity(1, args.len())),
    });
    assert_eq!(interp.execute(proto).unwrap(), num(42.0));
}

#[test]
fn test_globals_survive_across_units() {
    let mut interp = Interp::new(Options::default());
    let unit1 = compile(&[form(vec![sym("define"), sym("x"), num(5.0)])]).unwrap();
    interp.execute(unit1).unwrap();
    let unit2 = compile(&[sym("x")]).unwrap();
    assert_eq!(interp.execute(unit2).unwrap(), num(5.0));
    assert_eq!(interp.get_global("x"), Some(num(5.0)));
}
