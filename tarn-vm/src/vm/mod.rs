// tarn-vm - Stack-based virtual machine for Tarn bytecode
// Copyright (c) 2026 The Tarn Authors. MIT licensed.

//! The virtual machine.
//!
//! One [`Interp`] owns all mutable execution state: the shared register
//! stack, the call-information stack, the global namespace, and the list of
//! currently open upvalues. Interpreters are independent; any number may
//! coexist without coordination.
//!
//! Execution is a fetch/decode/execute loop. Control transfer is either an
//! instruction-pointer jump within the current stream or a call/return that
//! re-enters the loop for a new or restored frame — the loop activation
//! itself is reused rather than recursing into the host stack, which is the
//! mechanism tail calls exploit for O(1) frame growth.

pub mod error;
pub mod frame;
pub mod stack;
pub mod upvalue;

use std::collections::HashMap;
use std::rc::Rc;

use log::trace;

use crate::opcode::Op;
use crate::proto::{ArityMode, Proto};
use crate::symbol::Symbol;
use crate::value::{Closure, Value};

pub use error::{AritySpec, ErrorKind, Result, RuntimeError};
pub use frame::{CallInfo, Continuation};
pub use stack::RegisterStack;
pub use upvalue::UpValue;

/// Default register stack capacity, in value slots.
pub const DEFAULT_STACK_SIZE: usize = 256 * 20;

/// Default call-information stack capacity, in frames.
pub const DEFAULT_CALL_INFOS_SIZE: usize = 256;

/// Capacities for one interpreter instance. Both stacks are pre-sized;
/// exceeding either is a resource-exhaustion error.
#[derive(Debug, Clone, Copy)]
pub struct Options {
    pub stack_size: usize,
    pub call_infos_size: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            stack_size: DEFAULT_STACK_SIZE,
            call_infos_size: DEFAULT_CALL_INFOS_SIZE,
        }
    }
}

/// The Tarn virtual machine.
pub struct Interp {
    /// The shared register stack.
    stack: RegisterStack,

    /// One frame per active non-tail call.
    frames: Vec<CallInfo>,

    /// The global namespace, owned by this instance.
    globals: HashMap<Symbol, Value>,

    /// Currently open upvalues, sorted by stack index ascending.
    open_upvalues: Vec<Rc<UpValue>>,

    /// Count of frames the run loop still owes a return for. Zero means
    /// the loop is done. Continuation snapshots record and restore it.
    exec_depth: usize,

    options: Options,
}

impl Interp {
    /// Create an interpreter with the given stack capacities.
    pub fn new(options: Options) -> Self {
        Self {
            stack: RegisterStack::new(options.stack_size),
            frames: Vec::new(),
            globals: HashMap::new(),
            open_upvalues: Vec::new(),
            exec_depth: 0,
            options,
        }
    }

    /// Execute a compiled top-level unit to completion.
    pub fn execute(&mut self, proto: Rc<Proto>) -> Result<Value> {
        let closure = Rc::new(Closure::Scheme {
            proto,
            upvalues: Vec::new(),
        });
        let fn_sp = self.stack.sp();
        self.stack.push(Value::Closure(closure))?;
        self.precall(fn_sp)?;
        let result = self.run_loop()?;
        self.stack.pop()?;
        Ok(result)
    }

    /// Discard all execution state (stacks, open upvalues) but keep the
    /// global namespace. An error leaves the stacks unwound-but-dirty;
    /// call this before reusing the interpreter.
    pub fn reset(&mut self) {
        self.stack = RegisterStack::new(self.options.stack_size);
        self.frames.clear();
        self.open_upvalues.clear();
        self.exec_depth = 0;
    }

    /// Bind a global by name.
    pub fn set_global(&mut self, name: &str, value: Value) {
        self.globals.insert(Symbol::new(name), value);
    }

    /// Look up a global by name.
    #[must_use]
    pub fn get_global(&self, name: &str) -> Option<Value> {
        self.globals.get(&Symbol::new(name)).cloned()
    }

    /// Install a native procedure, callable by name.
    ///
    /// The host function receives the already-popped argument list and
    /// returns one value or an error.
    pub fn register_native(
        &mut self,
        name: &str,
        func: impl Fn(&[Value]) -> Result<Value> + 'static,
    ) {
        let closure = Closure::Native {
            name: Rc::from(name),
            func: Rc::new(func),
        };
        self.set_global(name, Value::Closure(Rc::new(closure)));
    }

    // =========================================================================
    // The fetch/decode/execute loop
    // =========================================================================

    fn run_loop(&mut self) -> Result<Value> {
        loop {
            let op = self.read_op()?;
            match op {
                Op::LoadConst { dst, idx } => {
                    let value = self.constant(idx)?;
                    let slot = self.abs(dst)?;
                    self.stack.set(slot, value)?;
                }
                Op::GetGlobal { dst, name } => {
                    let sym = self.constant_symbol(name)?;
                    let value = self
                        .globals
                        .get(&sym)
                        .cloned()
                        .ok_or(RuntimeError::UndefinedSymbol(sym))?;
                    let slot = self.abs(dst)?;
                    self.stack.set(slot, value)?;
                }
                Op::SetGlobal { src, name } => {
                    let sym = self.constant_symbol(name)?;
                    let value = self.stack.get(self.abs(src)?)?;
                    self.globals.insert(sym, value);
                }
                Op::Move { dst, src } => {
                    let value = self.stack.get(self.abs(src)?)?;
                    let slot = self.abs(dst)?;
                    self.stack.set(slot, value)?;
                }
                Op::MakeClosure { dst, proto } => {
                    self.make_closure(dst, proto)?;
                }
                Op::CaptureLocal(_) | Op::CaptureUpvalue(_) => {
                    return Err(RuntimeError::Internal(
                        "capture instruction outside MakeClosure context".into(),
                    ));
                }
                Op::GetUpvalue { dst, idx } => {
                    let uv = self.current_upvalue(idx)?;
                    let value = uv.get(&self.stack)?;
                    let slot = self.abs(dst)?;
                    self.stack.set(slot, value)?;
                }
                Op::SetUpvalue { src, idx } => {
                    let uv = self.current_upvalue(idx)?;
                    let value = self.stack.get(self.abs(src)?)?;
                    uv.set(&mut self.stack, value)?;
                }
                Op::CloseUpvalues(from) => {
                    let threshold = self.abs(from)?;
                    self.close_upvalues(threshold)?;
                }
                Op::Test(reg) => {
                    let value = self.stack.get(self.abs(reg)?)?;
                    if value.is_truthy() {
                        self.frame_mut()?.ip += 1;
                    }
                }
                Op::Jump(offset) => {
                    self.jump(offset)?;
                }
                Op::Call { base, argc } => {
                    let fn_sp = self.abs(base)?;
                    self.stack.set_sp(fn_sp + argc as usize + 1)?;
                    self.precall(fn_sp)?;
                }
                Op::TailCall { base, argc } => {
                    if let Some(result) = self.tail_call(base, argc)? {
                        return Ok(result);
                    }
                }
                Op::Return(reg) => {
                    if let Some(result) = self.do_return(reg)? {
                        return Ok(result);
                    }
                }
                Op::CallCc(base) => {
                    self.call_cc(base)?;
                }
            }
        }
    }

    fn read_op(&mut self) -> Result<Op> {
        let frame = self
            .frames
            .last_mut()
            .ok_or_else(|| RuntimeError::Internal("no active frame".into()))?;
        let op = match frame.closure.as_ref() {
            Closure::Scheme { proto, .. } => proto
                .code
                .get(frame.ip)
                .copied()
                .ok_or_else(|| RuntimeError::Internal("instruction pointer out of bounds".into()))?,
            Closure::Native { .. } => {
                return Err(RuntimeError::Internal(
                    "native closure has no instruction stream".into(),
                ));
            }
        };
        frame.ip += 1;
        Ok(op)
    }

    fn frame(&self) -> Result<&CallInfo> {
        self.frames
            .last()
            .ok_or_else(|| RuntimeError::Internal("no active frame".into()))
    }

    fn frame_mut(&mut self) -> Result<&mut CallInfo> {
        self.frames
            .last_mut()
            .ok_or_else(|| RuntimeError::Internal("no active frame".into()))
    }

    /// Absolute stack index of a frame-relative register.
    fn abs(&self, reg: u16) -> Result<usize> {
        Ok(self.frame()?.base + reg as usize)
    }

    fn current_proto(&self) -> Result<Rc<Proto>> {
        match self.frame()?.closure.as_ref() {
            Closure::Scheme { proto, .. } => Ok(proto.clone()),
            Closure::Native { .. } => Err(RuntimeError::Internal(
                "native closure has no prototype".into(),
            )),
        }
    }

    fn constant(&self, idx: u16) -> Result<Value> {
        self.current_proto()?
            .consts
            .get(idx as usize)
            .cloned()
            .ok_or_else(|| RuntimeError::Internal("constant index out of bounds".into()))
    }

    fn constant_symbol(&self, idx: u16) -> Result<Symbol> {
        match self.constant(idx)? {
            Value::Symbol(sym) => Ok(sym),
            other => Err(RuntimeError::Internal(format!(
                "global name constant is not a symbol: {}",
                other
            ))),
        }
    }

    fn current_upvalue(&self, idx: u16) -> Result<Rc<UpValue>> {
        match self.frame()?.closure.as_ref() {
            Closure::Scheme { upvalues, .. } => {
                upvalues.get(idx as usize).cloned().ok_or_else(|| {
                    RuntimeError::Internal(format!("upvalue index {} out of bounds", idx))
                })
            }
            Closure::Native { .. } => Err(RuntimeError::Internal(
                "native closure has no upvalues".into(),
            )),
        }
    }

    fn jump(&mut self, offset: i16) -> Result<()> {
        let frame = self.frame_mut()?;
        let new_ip = frame.ip as i64 + offset as i64;
        if new_ip < 0 {
            return Err(RuntimeError::Internal(
                "jump produced a negative instruction pointer".into(),
            ));
        }
        frame.ip = new_ip as usize;
        Ok(())
    }

    // =========================================================================
    // Call protocol
    // =========================================================================

    /// Prepare a call to the callee in the stack slot `fn_sp`, with its
    /// arguments in the slots directly above and the cursor one past the
    /// last argument.
    ///
    /// Natives are invoked synchronously and their return protocol runs
    /// immediately. Scheme closures get their arguments bound per the
    /// prototype's arity mode and a new frame pushed; the run loop picks
    /// the new frame up on its next fetch. A continuation callee replaces
    /// the live stacks with its snapshot.
    fn precall(&mut self, fn_sp: usize) -> Result<()> {
        let callee = self.stack.get(fn_sp)?;
        let nargs = self
            .stack
            .sp()
            .checked_sub(fn_sp + 1)
            .ok_or_else(|| RuntimeError::Internal("call span collapsed".into()))?;
        match &callee {
            Value::Closure(cl) => match cl.as_ref() {
                Closure::Native { name, func } => {
                    if self.frames.len() >= self.options.call_infos_size {
                        return Err(RuntimeError::CallDepthExceeded);
                    }
                    trace!("native call: {} ({} args)", name, nargs);
                    let func = func.clone();
                    self.frames.push(CallInfo::new(cl.clone(), fn_sp + 1, fn_sp));
                    let args = self.stack.pop_args(nargs)?;
                    let result = func.as_ref()(&args)?;
                    self.stack.push(result)?;
                    self.postcall()
                }
                Closure::Scheme { proto, .. } => {
                    let proto = proto.clone();
                    self.bind_args(&proto, nargs)?;
                    if self.frames.len() >= self.options.call_infos_size {
                        return Err(RuntimeError::CallDepthExceeded);
                    }
                    self.frames.push(CallInfo::new(cl.clone(), fn_sp + 1, fn_sp));
                    self.exec_depth += 1;
                    Ok(())
                }
            },
            Value::Continuation(k) => {
                if nargs != 1 {
                    return Err(RuntimeError::arity(1, nargs));
                }
                let arg = self.stack.get(fn_sp + 1)?;
                let k = k.clone();
                self.restore_continuation(&k, arg)
            }
            other => Err(RuntimeError::NotCallable(other.type_name())),
        }
    }

    /// The native return protocol: pop the native's frame, write its single
    /// result into the callee slot, and truncate the stack to it.
    fn postcall(&mut self) -> Result<()> {
        let frame = self
            .frames
            .pop()
            .ok_or_else(|| RuntimeError::Internal("no active frame".into()))?;
        let result = self.stack.pop()?;
        self.stack.set(frame.func_sp, result)?;
        self.stack.set_sp(frame.func_sp + 1)
    }

    /// Bind call arguments according to the prototype's arity mode. The
    /// cursor sits one past the last raw argument on entry and one past the
    /// last bound local on exit.
    fn bind_args(&mut self, proto: &Proto, nargs: usize) -> Result<()> {
        match proto.mode {
            ArityMode::Fixed => {
                if nargs != proto.nparams as usize {
                    return Err(RuntimeError::arity(proto.nparams as usize, nargs));
                }
            }
            ArityMode::Variadic => {
                let args = self.stack.pop_args(nargs)?;
                self.stack.push(Value::list(args))?;
            }
            ArityMode::Rest => {
                let nparams = proto.nparams as usize;
                if nargs < nparams {
                    return Err(RuntimeError::arity_at_least(nparams, nargs));
                }
                let rest = self.stack.pop_args(nargs - nparams)?;
                self.stack.push(Value::list(rest))?;
            }
        }
        Ok(())
    }

    /// Pop the current frame and deliver `result` into its callee slot.
    /// Returns the final value when the last owed frame has returned.
    fn finish_return(&mut self, result: Value) -> Result<Option<Value>> {
        let frame = self
            .frames
            .pop()
            .ok_or_else(|| RuntimeError::Internal("return without an active frame".into()))?;
        self.stack.set(frame.func_sp, result.clone())?;
        self.stack.set_sp(frame.func_sp + 1)?;
        self.exec_depth -= 1;
        if self.exec_depth == 0 {
            Ok(Some(result))
        } else {
            Ok(None)
        }
    }

    fn do_return(&mut self, reg: u16) -> Result<Option<Value>> {
        let result = self.stack.get(self.abs(reg)?)?;
        self.finish_return(result)
    }

    /// Call-then-return without growing the frame stack: the callee and its
    /// bound arguments are shifted down over the current frame's slots and
    /// the frame is rewritten in place.
    fn tail_call(&mut self, base: u16, argc: u16) -> Result<Option<Value>> {
        let fn_sp = self.abs(base)?;
        let argc = argc as usize;
        let callee = self.stack.get(fn_sp)?;
        match &callee {
            Value::Closure(cl) => match cl.as_ref() {
                Closure::Native { .. } => {
                    // No frame to reuse for a native: invoke it, then run
                    // the caller's return protocol with its result.
                    self.stack.set_sp(fn_sp + argc + 1)?;
                    self.precall(fn_sp)?;
                    let result = self.stack.get(fn_sp)?;
                    self.finish_return(result)
                }
                Closure::Scheme { proto, .. } => {
                    let proto = proto.clone();
                    let cl = cl.clone();
                    self.stack.set_sp(fn_sp + argc + 1)?;
                    self.bind_args(&proto, argc)?;
                    let nbound = self.stack.sp() - fn_sp - 1;
                    let dst = self.frame()?.func_sp;
                    // dst <= fn_sp, so copying upwards through the overlap
                    // is safe.
                    for i in 0..=nbound {
                        let value = self.stack.get(fn_sp + i)?;
                        self.stack.set(dst + i, value)?;
                    }
                    self.stack.set_sp(dst + nbound + 1)?;
                    let frame = self.frame_mut()?;
                    frame.closure = cl;
                    frame.base = dst + 1;
                    frame.ip = 0;
                    Ok(None)
                }
            },
            Value::Continuation(k) => {
                if argc != 1 {
                    return Err(RuntimeError::arity(1, argc));
                }
                let arg = self.stack.get(fn_sp + 1)?;
                let k = k.clone();
                self.restore_continuation(&k, arg)?;
                Ok(None)
            }
            other => Err(RuntimeError::NotCallable(other.type_name())),
        }
    }

    // =========================================================================
    // Continuations
    // =========================================================================

    /// First phase of `call/cc`: snapshot the stacks and the frame count,
    /// then call the procedure in `R[base]` with the continuation as its
    /// sole argument through the ordinary call protocol.
    ///
    /// The current frame's instruction pointer has already advanced past
    /// this instruction, so the snapshot's top frame resumes right after it
    /// — with the delivered value sitting in `R[base]`.
    fn call_cc(&mut self, base: u16) -> Result<()> {
        let fn_sp = self.abs(base)?;
        let snapshot = Continuation {
            frames: self.frames.clone(),
            stack: self.stack.snapshot_to(fn_sp),
            depth: self.exec_depth,
        };
        self.stack
            .set(fn_sp + 1, Value::Continuation(Rc::new(snapshot)))?;
        self.stack.set_sp(fn_sp + 2)?;
        self.precall(fn_sp)
    }

    /// Discard the live stacks, copy the snapshot back in, and deliver the
    /// invocation's argument as the capture expression's value. Restoring
    /// by copy keeps the snapshot intact for further invocations.
    fn restore_continuation(&mut self, k: &Continuation, arg: Value) -> Result<()> {
        trace!(
            "continuation resume: {} frames, depth {}",
            k.frames.len(),
            k.depth
        );
        self.frames = k.frames.clone();
        self.stack.restore(&k.stack)?;
        self.exec_depth = k.depth;
        self.stack.push(arg)
    }

    // =========================================================================
    // Closures and upvalues
    // =========================================================================

    /// Instantiate a closure from a child prototype, consuming the capture
    /// micro-instructions that follow the `MakeClosure` instruction.
    fn make_closure(&mut self, dst: u16, proto_idx: u16) -> Result<()> {
        let (current, base) = {
            let frame = self.frame()?;
            (frame.closure.clone(), frame.base)
        };
        let parent = match current.as_ref() {
            Closure::Scheme { proto, .. } => proto.clone(),
            Closure::Native { .. } => {
                return Err(RuntimeError::Internal(
                    "MakeClosure outside a Scheme frame".into(),
                ));
            }
        };
        let child = parent
            .protos
            .get(proto_idx as usize)
            .cloned()
            .ok_or_else(|| RuntimeError::Internal("prototype index out of bounds".into()))?;

        let mut upvalues = Vec::with_capacity(child.nupvals as usize);
        for _ in 0..child.nupvals {
            match self.read_op()? {
                Op::CaptureLocal(src) => {
                    let slot = base + src as usize;
                    upvalues.push(self.find_upvalue(slot));
                }
                Op::CaptureUpvalue(idx) => {
                    let uv = match current.as_ref() {
                        Closure::Scheme { upvalues, .. } => {
                            upvalues.get(idx as usize).cloned().ok_or_else(|| {
                                RuntimeError::Internal(format!(
                                    "upvalue index {} out of bounds",
                                    idx
                                ))
                            })?
                        }
                        Closure::Native { .. } => {
                            return Err(RuntimeError::Internal(
                                "capture from a native closure".into(),
                            ));
                        }
                    };
                    upvalues.push(uv);
                }
                other => {
                    return Err(RuntimeError::Internal(format!(
                        "expected capture instruction, got {:?}",
                        other
                    )));
                }
            }
        }

        let closure = Closure::Scheme {
            proto: child,
            upvalues,
        };
        let slot = self.abs(dst)?;
        self.stack.set(slot, Value::Closure(Rc::new(closure)))
    }

    /// Find the open upvalue for a stack slot, creating and inserting it in
    /// index order if no closure has captured that slot yet. Sharing one
    /// node per slot is what makes mutation visible across closures.
    fn find_upvalue(&mut self, index: usize) -> Rc<UpValue> {
        let mut insert_at = self.open_upvalues.len();
        for (i, uv) in self.open_upvalues.iter().enumerate() {
            match uv.index() {
                Some(open) if open == index => return uv.clone(),
                Some(open) if open > index => {
                    insert_at = i;
                    break;
                }
                _ => {}
            }
        }
        let fresh = Rc::new(UpValue::open(index));
        self.open_upvalues.insert(insert_at, fresh.clone());
        fresh
    }

    /// One linear sweep closing every open upvalue at or above `from`.
    fn close_upvalues(&mut self, from: usize) -> Result<()> {
        let split = self
            .open_upvalues
            .partition_point(|uv| uv.index().map_or(false, |i| i < from));
        for uv in self.open_upvalues.split_off(split) {
            uv.close(&self.stack)?;
        }
        Ok(())
    }
}

impl Default for Interp {
    fn default() -> Self {
        Self::new(Options::default())
    }
}
