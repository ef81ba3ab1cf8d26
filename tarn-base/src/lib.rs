// tarn-base - Native primitive library for the Tarn language
// Copyright (c) 2026 The Tarn Authors. MIT licensed.

//! # tarn-base
//!
//! The standard native procedures: arithmetic, numeric comparison,
//! pair/list operations, predicates, and string/vector access. One call to
//! [`register_baselib`] installs the whole set into an interpreter.

pub mod builtins;

pub use builtins::register_baselib;
