// tarn-base - Continuation capture and resume tests
// Copyright (c) 2026 The Tarn Authors. MIT licensed.

mod common;

use common::{eval_display, eval_kind, ErrorKind};

#[test]
fn test_invoking_k_discards_pending_work() {
    // Invoking k jumps past the pending 5 and supplies the expression's
    // value directly.
    assert_eq!(eval_display("(call/cc (lambda (k) (k 3) 5))"), "3");
}

#[test]
fn test_normal_return_when_k_unused() {
    assert_eq!(eval_display("(call/cc (lambda (k) 5))"), "5");
}

#[test]
fn test_escape_from_nested_computation() {
    assert_eq!(
        eval_display("(+ 1 (call/cc (lambda (k) (+ 2 (k 10)))))"),
        "11"
    );
}

#[test]
fn test_long_name_is_equivalent() {
    assert_eq!(
        eval_display("(call-with-current-continuation (lambda (k) (k 3) 5))"),
        "3"
    );
}

#[test]
fn test_continuation_is_first_class() {
    // The continuation escapes its capture site through another procedure
    // and is invoked there, in tail position.
    assert_eq!(
        eval_display(
            "(define (apply-k k) (k 42))
             (+ 1 (call/cc (lambda (k) (apply-k k) 99)))"
        ),
        "43"
    );
}

#[test]
fn test_continuation_stored_in_global() {
    assert_eq!(
        eval_display(
            "(define saved #f)
             (define r (+ 1 (call/cc (lambda (k) (set! saved k) 0))))
             (if (< r 5) (saved r) r)"
        ),
        "5"
    );
}

#[test]
fn test_multi_shot_resume() {
    // The continuation is invoked twice; snapshot-by-copy keeps the second
    // resume as good as the first.
    assert_eq!(
        eval_display(
            "(define saved #f)
             (define count 0)
             (define result (+ 1 (call/cc (lambda (k) (set! saved k) 0))))
             (if (< count 2)
                 (begin (set! count (+ count 1)) (saved count))
                 result)"
        ),
        "3"
    );
}

#[test]
fn test_continuation_takes_exactly_one_value() {
    assert_eq!(
        eval_kind("((call/cc (lambda (k) k)))"),
        ErrorKind::Internal
    );
}

#[test]
fn test_escape_across_procedure_frames() {
    // k unwinds through two live frames.
    assert_eq!(
        eval_display(
            "(define (inner k) (k 7))
             (define (outer k) (inner k) 99)
             (+ 1 (call/cc (lambda (k) (outer k))))"
        ),
        "8"
    );
}
