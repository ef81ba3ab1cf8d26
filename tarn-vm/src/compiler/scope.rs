// tarn-vm - Compiler scopes and errors
// Copyright (c) 2026 The Tarn Authors. MIT licensed.

//! Shared types for the code generator: per-function compilation state,
//! upvalue descriptors, and compile-time errors.

use std::fmt;

use crate::opcode::Op;
use crate::proto::{ArityMode, Proto};
use crate::symbol::Symbol;
use crate::value::Value;
use crate::vm::error::ErrorKind;

/// Error during compilation.
#[derive(Debug, Clone)]
pub enum CompileError {
    /// Malformed special form; the message names the offending form.
    Syntax(String),
    /// Constant pool overflow.
    TooManyConstants,
    /// Register counter overflow in one function scope.
    TooManyRegisters,
    /// Nested prototype list overflow.
    TooManyProtos,
}

impl CompileError {
    /// Which taxonomy kind this error belongs to.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            CompileError::Syntax(_) => ErrorKind::Syntax,
            _ => ErrorKind::Internal,
        }
    }

    /// Create a syntax error naming the offending form.
    pub fn syntax(form: &str, message: impl fmt::Display) -> Self {
        CompileError::Syntax(format!("{}: {}", form, message))
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileError::Syntax(msg) => write!(f, "Syntax error: {}", msg),
            CompileError::TooManyConstants => write!(f, "Too many constants in function"),
            CompileError::TooManyRegisters => write!(f, "Too many registers in function"),
            CompileError::TooManyProtos => write!(f, "Too many nested lambdas in function"),
        }
    }
}

impl std::error::Error for CompileError {}

/// Result type for compilation.
pub type Result<T> = std::result::Result<T, CompileError>;

/// Where an upvalue of the current scope comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpvalKind {
    /// A local register of the immediately enclosing scope.
    Local(u16),
    /// An upvalue of the immediately enclosing scope (a passthrough link
    /// in a capture chain).
    Upvalue(u16),
}

/// A variable the current scope captures, in declaration order.
#[derive(Debug, Clone)]
pub struct UpvalDesc {
    pub name: Symbol,
    pub kind: UpvalKind,
}

/// Compilation state for one function scope (a lambda, or the top-level
/// unit). Register allocation is monotonic: every intermediate result gets
/// a fresh register, and the counter never rewinds within a scope.
#[derive(Debug)]
pub struct FuncState {
    /// The prototype under construction.
    pub proto: Proto,

    /// Monotonic register counter. Starts past the parameter slots.
    pub nreg: u16,

    /// Parameter names; register `i` holds `locals[i]`.
    pub locals: Vec<Symbol>,

    /// Variables captured from enclosing scopes, in declaration order.
    pub upvalues: Vec<UpvalDesc>,

    /// Set when an inner lambda captures one of this scope's locals; the
    /// scope must then close its upvalues on every exit path.
    pub closes_upvalues: bool,
}

impl FuncState {
    /// Open a scope whose parameter registers are already occupied.
    pub fn new(mode: ArityMode, nparams: u16, locals: Vec<Symbol>) -> Self {
        let nreg = locals.len() as u16;
        Self {
            proto: Proto::new(mode, nparams),
            nreg,
            locals,
            upvalues: Vec::new(),
            closes_upvalues: false,
        }
    }

    /// Allocate a fresh register.
    pub fn new_reg(&mut self) -> Result<u16> {
        if self.nreg == u16::MAX {
            return Err(CompileError::TooManyRegisters);
        }
        let reg = self.nreg;
        self.nreg += 1;
        Ok(reg)
    }

    pub fn emit(&mut self, op: Op) {
        self.proto.emit(op);
    }

    /// Add a constant, failing on pool overflow.
    pub fn add_constant(&mut self, value: Value) -> Result<u16> {
        self.proto
            .add_constant(value)
            .ok_or(CompileError::TooManyConstants)
    }

    /// Emit a to-be-patched jump and return its offset.
    pub fn emit_jump(&mut self) -> usize {
        let offset = self.proto.current_offset();
        self.emit(Op::Jump(0));
        offset
    }

    pub fn patch_jump(&mut self, offset: usize) {
        self.proto.patch_jump(offset);
    }

    /// Register of the local with this name, if bound in this scope.
    #[must_use]
    pub fn local_slot(&self, name: &Symbol) -> Option<u16> {
        self.locals.iter().position(|l| l == name).map(|i| i as u16)
    }

    /// Index of an already-declared upvalue with this name.
    #[must_use]
    pub fn upvalue_slot(&self, name: &Symbol) -> Option<u16> {
        self.upvalues
            .iter()
            .position(|uv| &uv.name == name)
            .map(|i| i as u16)
    }

    /// Declare a new upvalue and return its index.
    pub fn add_upvalue(&mut self, name: Symbol, kind: UpvalKind) -> u16 {
        let idx = self.upvalues.len() as u16;
        self.upvalues.push(UpvalDesc { name, kind });
        idx
    }

    /// Seal the scope into its prototype plus the capture descriptors the
    /// enclosing scope must emit.
    pub fn finish(mut self) -> (Proto, Vec<UpvalDesc>) {
        self.proto.nupvals = self.upvalues.len() as u16;
        (self.proto, self.upvalues)
    }
}
