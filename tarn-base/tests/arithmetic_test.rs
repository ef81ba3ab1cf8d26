// tarn-base - Arithmetic and comparison tests
// Copyright (c) 2026 The Tarn Authors. MIT licensed.

mod common;

use common::{eval_display, eval_kind, eval_str, ErrorKind, Value};

#[test]
fn test_fold_identities() {
    assert_eq!(eval_display("(+)"), "0");
    assert_eq!(eval_display("(*)"), "1");
}

#[test]
fn test_unary_minus_and_reciprocal() {
    assert_eq!(eval_display("(- 1)"), "-1");
    assert_eq!(eval_display("(/ 3)"), "0.3333333333333333");
    assert_eq!(eval_display("(/ 2)"), "0.5");
}

#[test]
fn test_basic_folds() {
    assert_eq!(eval_display("(+ 1 2 3)"), "6");
    assert_eq!(eval_display("(- 10 1 2)"), "7");
    assert_eq!(eval_display("(* 2 3 4)"), "24");
    assert_eq!(eval_display("(/ 24 2 3)"), "4");
}

#[test]
fn test_nested_expressions() {
    assert_eq!(eval_display("(+ (* 2 3) (- 10 4))"), "12");
}

#[test]
fn test_division_by_zero_is_internal() {
    assert_eq!(eval_kind("(/ 1 0)"), ErrorKind::Internal);
    assert_eq!(eval_kind("(/ 0)"), ErrorKind::Internal);
}

#[test]
fn test_arith_needs_numbers() {
    assert_eq!(eval_kind("(+ 1 #t)"), ErrorKind::Type);
    assert_eq!(eval_kind("(* \"x\" 2)"), ErrorKind::Type);
}

#[test]
fn test_minus_needs_an_argument() {
    assert_eq!(eval_kind("(-)"), ErrorKind::Internal);
    assert_eq!(eval_kind("(/)"), ErrorKind::Internal);
}

#[test]
fn test_comparison_chains() {
    assert_eq!(eval_display("(< 2 3 3)"), "#f");
    assert_eq!(eval_display("(<= 2 3 3)"), "#t");
    assert_eq!(eval_display("(< 1 2 3)"), "#t");
    assert_eq!(eval_display("(> 3 2 1)"), "#t");
    assert_eq!(eval_display("(= 1 1 1)"), "#t");
    assert_eq!(eval_display("(= 1 2)"), "#f");
    assert_eq!(eval_display("(>= 3 3 2)"), "#t");
}

#[test]
fn test_comparison_needs_two_arguments() {
    assert_eq!(eval_kind("(< 1)"), ErrorKind::Internal);
    assert_eq!(eval_kind("(=)"), ErrorKind::Internal);
}

#[test]
fn test_float_results() {
    assert_eq!(eval_str("(/ 1 3)").unwrap(), Value::Number(1.0 / 3.0));
    assert_eq!(eval_display("(+ 0.5 0.25)"), "0.75");
}
