// tarn-vm - Bytecode compiler for the Tarn language
// Copyright (c) 2026 The Tarn Authors. MIT licensed.

//! The code generator: turns parsed values into prototype trees.

pub mod codegen;
pub mod scope;

pub use codegen::compile;
pub use scope::{CompileError, FuncState, Result, UpvalDesc, UpvalKind};
