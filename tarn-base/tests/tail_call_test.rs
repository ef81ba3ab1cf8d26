// tarn-base - Tail-call frame reuse tests
// Copyright (c) 2026 The Tarn Authors. MIT licensed.

mod common;

use common::{eval_display, eval_str_with, ErrorKind, Options};

/// Capacities sized for roughly twenty ordinary frames.
fn small() -> Options {
    Options {
        stack_size: 256,
        call_infos_size: 64,
    }
}

#[test]
fn test_self_tail_recursion_is_bounded() {
    // At depth 100 this would exhaust the small register stack if every
    // recursive call grew a frame; frame reuse keeps it flat.
    let result = eval_str_with(
        "(define (recur n) (if (= n 1) 1 (recur (- n 1)))) (recur 100)",
        small(),
    )
    .unwrap();
    assert_eq!(result.to_string(), "1");
}

#[test]
fn test_non_tail_recursion_exhausts_small_stack() {
    // The same depth through a non-tail call site must hit the capacity
    // error instead.
    let err = eval_str_with(
        "(define (grow n) (if (= n 1) 1 (+ 1 (grow (- n 1))))) (grow 100)",
        small(),
    )
    .unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::Internal));
}

#[test]
fn test_deep_tail_recursion_default_capacity() {
    assert_eq!(
        eval_display("(define (recur n) (if (= n 1) 1 (recur (- n 1)))) (recur 100000)"),
        "1"
    );
}

#[test]
fn test_mutual_tail_recursion_is_bounded() {
    let result = eval_str_with(
        "(define (ping n) (if (= n 0) 'ping (pong (- n 1))))
         (define (pong n) (if (= n 0) 'pong (ping (- n 1))))
         (ping 501)",
        small(),
    )
    .unwrap();
    assert_eq!(result.to_string(), "pong");
}

#[test]
fn test_tail_call_result_is_callers_result() {
    assert_eq!(
        eval_display(
            "(define (pick n) (if (= n 1) (one) (two)))
             (define (one) 'one)
             (define (two) 'two)
             (pick 2)"
        ),
        "two"
    );
}

#[test]
fn test_tail_call_to_native() {
    // A native in tail position still produces the caller's result.
    assert_eq!(
        eval_display("(define (sum3 a b c) (+ a b c)) (sum3 1 2 3)"),
        "6"
    );
}

#[test]
fn test_accumulator_style_loop() {
    assert_eq!(
        eval_display(
            "(define (count-down n acc) (if (= n 0) acc (count-down (- n 1) (+ acc 1))))
             (count-down 1000 0)"
        ),
        "1000"
    );
}
