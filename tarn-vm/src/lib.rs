// tarn-vm - Register bytecode compiler and virtual machine for the Tarn language
// Copyright (c) 2026 The Tarn Authors. MIT licensed.

//! # tarn-vm
//!
//! The core of the Tarn runtime: the value model, the register-addressed
//! bytecode, the code generator, and the virtual machine.
//!
//! A host embeds the runtime through three seams: [`compile`] turns parsed
//! top-level values into a prototype tree, [`Interp::execute`] runs one,
//! and [`Interp::register_native`] / [`Interp::set_global`] populate the
//! interpreter's global namespace. Parsing lives in the companion
//! `tarn-parser` crate and the standard primitives in `tarn-base`; both
//! speak this crate's [`Value`] union.

pub mod compiler;
pub mod opcode;
pub mod proto;
pub mod symbol;
pub mod value;
pub mod vm;

pub use compiler::{compile, CompileError};
pub use opcode::Op;
pub use proto::{ArityMode, Proto};
pub use symbol::Symbol;
pub use value::{list_to_vec, Closure, NativeFn, Pair, Value};
pub use vm::{
    AritySpec, Continuation, ErrorKind, Interp, Options, RuntimeError, UpValue,
    DEFAULT_CALL_INFOS_SIZE, DEFAULT_STACK_SIZE,
};
