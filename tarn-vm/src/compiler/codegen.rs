// tarn-vm - Code generation: parsed values to register bytecode
// Copyright (c) 2026 The Tarn Authors. MIT licensed.

//! The code generator.
//!
//! One call to [`compile`] turns an ordered sequence of parsed top-level
//! values into a single prototype tree. Identifier references are resolved
//! at compile time, innermost scope first: a name bound in the current
//! scope is a local register; a name bound in an enclosing scope becomes an
//! upvalue of the current scope *and* of every intermediate scope that does
//! not itself reference it, so capture chains propagate through passthrough
//! closures; anything else compiles as a late-bound global, resolved by
//! name at run time — globals may legitimately be defined after the code
//! referencing them is compiled.
//!
//! Calls in tail position compile to the frame-reusing tail-call
//! instruction; this is the language's only iteration mechanism.

use std::rc::Rc;

use log::debug;

use crate::opcode::Op;
use crate::proto::{ArityMode, Proto};
use crate::symbol::Symbol;
use crate::value::{list_to_vec, Value};

use super::scope::{CompileError, FuncState, Result, UpvalKind};

/// Compile one unit: an ordered sequence of top-level values.
pub fn compile(forms: &[Value]) -> Result<Rc<Proto>> {
    let mut compiler = Compiler {
        states: vec![FuncState::new(ArityMode::Fixed, 0, Vec::new())],
    };
    let last = if forms.is_empty() {
        compiler.load_undefined()?
    } else {
        let mut last = 0;
        for form in forms {
            last = compiler.compile_expr(form)?;
        }
        last
    };
    compiler.emit_frame_exit(last)?;
    let (proto, _) = compiler.pop_state().finish();
    debug!(
        "compiled unit: {} instructions, {} constants, {} nested prototypes",
        proto.code.len(),
        proto.consts.len(),
        proto.protos.len()
    );
    Ok(Rc::new(proto))
}

struct Compiler {
    /// One state per open function scope, innermost last.
    states: Vec<FuncState>,
}

impl Compiler {
    fn state(&self) -> &FuncState {
        self.states.last().expect("compiler scope stack is empty")
    }

    fn state_mut(&mut self) -> &mut FuncState {
        self.states
            .last_mut()
            .expect("compiler scope stack is empty")
    }

    fn pop_state(&mut self) -> FuncState {
        self.states.pop().expect("compiler scope stack is empty")
    }

    /// Compile an expression and return the register holding its result.
    fn compile_expr(&mut self, expr: &Value) -> Result<u16> {
        match expr {
            Value::Symbol(sym) => self.compile_symbol(sym),
            Value::Pair(_) => self.compile_form(expr),
            Value::Nil => Err(CompileError::syntax("()", "empty form")),
            _ => self.compile_literal(expr),
        }
    }

    /// Literals evaluate to themselves via the constant pool.
    fn compile_literal(&mut self, expr: &Value) -> Result<u16> {
        let idx = self.state_mut().add_constant(expr.clone())?;
        let dst = self.state_mut().new_reg()?;
        self.state_mut().emit(Op::LoadConst { dst, idx });
        Ok(dst)
    }

    fn load_undefined(&mut self) -> Result<u16> {
        self.compile_literal(&Value::Undefined)
    }

    /// Resolve an identifier: local register, captured upvalue, or
    /// late-bound global, in that order.
    fn compile_symbol(&mut self, sym: &Symbol) -> Result<u16> {
        if let Some(slot) = self.state().local_slot(sym) {
            return Ok(slot);
        }
        if let Some(idx) = self.resolve_upvalue(self.states.len() - 1, sym) {
            let dst = self.state_mut().new_reg()?;
            self.state_mut().emit(Op::GetUpvalue { dst, idx });
            return Ok(dst);
        }
        let name = self.state_mut().add_constant(Value::Symbol(sym.clone()))?;
        let dst = self.state_mut().new_reg()?;
        self.state_mut().emit(Op::GetGlobal { dst, name });
        Ok(dst)
    }

    /// Try to resolve `sym` as an upvalue of the scope at `level`,
    /// declaring the capture in every intermediate scope on the way.
    /// Marks the owning scope so it closes its upvalues on exit.
    fn resolve_upvalue(&mut self, level: usize, sym: &Symbol) -> Option<u16> {
        if let Some(idx) = self.states[level].upvalue_slot(sym) {
            return Some(idx);
        }
        if level == 0 {
            return None;
        }
        let parent = level - 1;
        if let Some(slot) = self.states[parent].local_slot(sym) {
            self.states[parent].closes_upvalues = true;
            return Some(self.states[level].add_upvalue(sym.clone(), UpvalKind::Local(slot)));
        }
        if let Some(idx) = self.resolve_upvalue(parent, sym) {
            return Some(self.states[level].add_upvalue(sym.clone(), UpvalKind::Upvalue(idx)));
        }
        None
    }

    /// Compile a parenthesised form: a special form when the head symbol
    /// names one, a procedure call otherwise.
    fn compile_form(&mut self, expr: &Value) -> Result<u16> {
        let items = list_to_vec(expr)
            .ok_or_else(|| CompileError::syntax("form", "dotted list in expression position"))?;
        if let Value::Symbol(head) = &items[0] {
            match head.name() {
                "define" => return self.compile_define(&items[1..]),
                "lambda" => return self.compile_lambda(&items[1..]),
                "begin" => return self.compile_begin(&items[1..]),
                "set!" => return self.compile_set(&items[1..]),
                "quote" => return self.compile_quote(&items[1..]),
                "if" => return self.compile_if(&items[1..]),
                "call/cc" | "call-with-current-continuation" => {
                    return self.compile_callcc(&items[1..]);
                }
                _ => {}
            }
        }
        self.compile_call(&items)
    }

    // =========================================================================
    // Special forms
    // =========================================================================

    fn compile_define(&mut self, args: &[Value]) -> Result<u16> {
        if args.len() < 2 {
            return Err(CompileError::syntax("define", "expected a name and a value"));
        }
        match &args[0] {
            Value::Symbol(name) => {
                if args.len() != 2 {
                    return Err(CompileError::syntax("define", "expected a single value"));
                }
                let name = name.clone();
                let src = self.compile_expr(&args[1])?;
                let name_idx = self.state_mut().add_constant(Value::Symbol(name))?;
                self.state_mut().emit(Op::SetGlobal {
                    src,
                    name: name_idx,
                });
                Ok(src)
            }
            Value::Pair(signature) => {
                // (define (f . formals) body...) rewrites to
                // (define f (lambda formals body...)) before compiling.
                let name = match &signature.car {
                    Value::Symbol(s) => s.clone(),
                    other => {
                        return Err(CompileError::syntax(
                            "define",
                            format!("procedure name must be a symbol, got {}", other),
                        ));
                    }
                };
                let mut lambda = Value::Nil;
                for body_form in args[1..].iter().rev() {
                    lambda = Value::cons(body_form.clone(), lambda);
                }
                lambda = Value::cons(signature.cdr.clone(), lambda);
                lambda = Value::cons(Value::symbol("lambda"), lambda);

                let src = self.compile_expr(&lambda)?;
                let name_idx = self.state_mut().add_constant(Value::Symbol(name))?;
                self.state_mut().emit(Op::SetGlobal {
                    src,
                    name: name_idx,
                });
                Ok(src)
            }
            other => Err(CompileError::syntax(
                "define",
                format!("cannot bind {}", other),
            )),
        }
    }

    fn compile_lambda(&mut self, args: &[Value]) -> Result<u16> {
        if args.len() < 2 {
            return Err(CompileError::syntax(
                "lambda",
                "expected a parameter list and a body",
            ));
        }
        let (mode, nparams, locals) = parse_formals(&args[0])?;
        let body = &args[1..];

        self.states.push(FuncState::new(mode, nparams, locals));
        for form in &body[..body.len() - 1] {
            self.compile_expr(form)?;
        }
        self.compile_tail(&body[body.len() - 1])?;
        let (proto, upvalues) = self.pop_state().finish();

        let parent = self.state_mut();
        if parent.proto.protos.len() > u16::MAX as usize {
            return Err(CompileError::TooManyProtos);
        }
        let proto_idx = parent.proto.protos.len() as u16;
        parent.proto.protos.push(Rc::new(proto));
        let dst = parent.new_reg()?;
        parent.emit(Op::MakeClosure {
            dst,
            proto: proto_idx,
        });
        // One capture micro-instruction per upvalue, in declaration order;
        // the VM consumes these positionally while instantiating.
        for uv in &upvalues {
            let op = match uv.kind {
                UpvalKind::Local(slot) => Op::CaptureLocal(slot),
                UpvalKind::Upvalue(idx) => Op::CaptureUpvalue(idx),
            };
            parent.emit(op);
        }
        Ok(dst)
    }

    fn compile_begin(&mut self, args: &[Value]) -> Result<u16> {
        if args.is_empty() {
            return self.load_undefined();
        }
        let mut last = 0;
        for form in args {
            last = self.compile_expr(form)?;
        }
        Ok(last)
    }

    fn compile_set(&mut self, args: &[Value]) -> Result<u16> {
        if args.len() != 2 {
            return Err(CompileError::syntax("set!", "expected a name and a value"));
        }
        let name = match &args[0] {
            Value::Symbol(s) => s.clone(),
            other => {
                return Err(CompileError::syntax(
                    "set!",
                    format!("target must be a symbol, got {}", other),
                ));
            }
        };
        let src = self.compile_expr(&args[1])?;
        if let Some(slot) = self.state().local_slot(&name) {
            self.state_mut().emit(Op::Move { dst: slot, src });
            return Ok(src);
        }
        if let Some(idx) = self.resolve_upvalue(self.states.len() - 1, &name) {
            self.state_mut().emit(Op::SetUpvalue { src, idx });
            return Ok(src);
        }
        // An unbound target rebinds a global, matching the reference
        // behaviour for assignment-before-definition.
        let name_idx = self.state_mut().add_constant(Value::Symbol(name))?;
        self.state_mut().emit(Op::SetGlobal {
            src,
            name: name_idx,
        });
        Ok(src)
    }

    fn compile_quote(&mut self, args: &[Value]) -> Result<u16> {
        if args.len() != 1 {
            return Err(CompileError::syntax("quote", "expected one datum"));
        }
        // The datum goes into the constant pool verbatim, never evaluated.
        self.compile_literal(&args[0])
    }

    fn compile_if(&mut self, args: &[Value]) -> Result<u16> {
        if args.len() < 2 || args.len() > 3 {
            return Err(CompileError::syntax("if", "expected 2 or 3 operands"));
        }
        let dst = self.state_mut().new_reg()?;
        let test = self.compile_expr(&args[0])?;
        self.state_mut().emit(Op::Test(test));
        let to_else = self.state_mut().emit_jump();

        let then_reg = self.compile_expr(&args[1])?;
        self.state_mut().emit(Op::Move { dst, src: then_reg });
        let to_end = self.state_mut().emit_jump();

        self.state_mut().patch_jump(to_else);
        if args.len() == 3 {
            let else_reg = self.compile_expr(&args[2])?;
            self.state_mut().emit(Op::Move { dst, src: else_reg });
        } else {
            // A missing alternative yields the Undefined sentinel.
            let idx = self.state_mut().add_constant(Value::Undefined)?;
            self.state_mut().emit(Op::LoadConst { dst, idx });
        }
        self.state_mut().patch_jump(to_end);
        Ok(dst)
    }

    fn compile_callcc(&mut self, args: &[Value]) -> Result<u16> {
        if args.len() != 1 {
            return Err(CompileError::syntax("call/cc", "expected one procedure"));
        }
        let base = self.expr_to_next_reg(&args[0])?;
        // Reserve the slot the VM writes the continuation argument into.
        self.state_mut().new_reg()?;
        self.state_mut().emit(Op::CallCc(base));
        Ok(base)
    }

    // =========================================================================
    // Calls
    // =========================================================================

    /// Compile a call: the callee and its arguments must end up in one
    /// contiguous register span, so each argument is moved into place after
    /// evaluation.
    fn compile_call(&mut self, items: &[Value]) -> Result<u16> {
        let (base, arg_regs) = self.compile_call_span(items)?;
        self.state_mut().emit(Op::Call {
            base,
            argc: arg_regs.len() as u16,
        });
        Ok(base)
    }

    /// Evaluate callee and arguments into a fresh contiguous span.
    fn compile_call_span(&mut self, items: &[Value]) -> Result<(u16, Vec<u16>)> {
        let base = self.expr_to_next_reg(&items[0])?;
        let mut arg_regs = Vec::with_capacity(items.len() - 1);
        for _ in 1..items.len() {
            arg_regs.push(self.state_mut().new_reg()?);
        }
        for (i, arg) in items[1..].iter().enumerate() {
            let src = self.compile_expr(arg)?;
            self.state_mut().emit(Op::Move {
                dst: arg_regs[i],
                src,
            });
        }
        Ok((base, arg_regs))
    }

    /// Compile an expression and guarantee its result occupies the newest
    /// register, moving it there if it does not already.
    fn expr_to_next_reg(&mut self, expr: &Value) -> Result<u16> {
        let reg = self.compile_expr(expr)?;
        let state = self.state();
        if reg + 1 == state.nreg && reg as usize >= state.locals.len() {
            return Ok(reg);
        }
        let dst = self.state_mut().new_reg()?;
        self.state_mut().emit(Op::Move { dst, src: reg });
        Ok(dst)
    }

    // =========================================================================
    // Tail position
    // =========================================================================

    /// Compile the final expression of a function body. Calls become
    /// frame-reusing tail calls; `if` and `begin` push tail position into
    /// their branches; everything else evaluates and returns.
    fn compile_tail(&mut self, expr: &Value) -> Result<()> {
        if let Value::Pair(_) = expr {
            let items = list_to_vec(expr).ok_or_else(|| {
                CompileError::syntax("form", "dotted list in expression position")
            })?;
            if let Value::Symbol(head) = &items[0] {
                match head.name() {
                    "if" => return self.compile_tail_if(&items[1..]),
                    "begin" => return self.compile_tail_begin(&items[1..]),
                    // Value-producing special forms return normally.
                    "define" | "lambda" | "set!" | "quote" | "call/cc"
                    | "call-with-current-continuation" => {}
                    _ => return self.compile_tail_call(&items),
                }
            } else {
                return self.compile_tail_call(&items);
            }
        }
        let reg = self.compile_expr(expr)?;
        self.emit_frame_exit(reg)
    }

    fn compile_tail_if(&mut self, args: &[Value]) -> Result<()> {
        if args.len() < 2 || args.len() > 3 {
            return Err(CompileError::syntax("if", "expected 2 or 3 operands"));
        }
        let test = self.compile_expr(&args[0])?;
        self.state_mut().emit(Op::Test(test));
        let to_else = self.state_mut().emit_jump();
        // Each branch ends the frame itself; no merge point exists.
        self.compile_tail(&args[1])?;
        self.state_mut().patch_jump(to_else);
        if args.len() == 3 {
            self.compile_tail(&args[2])
        } else {
            let reg = self.load_undefined()?;
            self.emit_frame_exit(reg)
        }
    }

    fn compile_tail_begin(&mut self, args: &[Value]) -> Result<()> {
        if args.is_empty() {
            let reg = self.load_undefined()?;
            return self.emit_frame_exit(reg);
        }
        for form in &args[..args.len() - 1] {
            self.compile_expr(form)?;
        }
        self.compile_tail(&args[args.len() - 1])
    }

    fn compile_tail_call(&mut self, items: &[Value]) -> Result<()> {
        let (base, arg_regs) = self.compile_call_span(items)?;
        if self.state().closes_upvalues {
            self.state_mut().emit(Op::CloseUpvalues(0));
        }
        self.state_mut().emit(Op::TailCall {
            base,
            argc: arg_regs.len() as u16,
        });
        Ok(())
    }

    /// Close captured locals if any, then return the result register.
    fn emit_frame_exit(&mut self, reg: u16) -> Result<()> {
        if self.state().closes_upvalues {
            self.state_mut().emit(Op::CloseUpvalues(0));
        }
        self.state_mut().emit(Op::Return(reg));
        Ok(())
    }
}

/// Classify a lambda's parameter list into its binding mode.
///
/// `(a b c)` is fixed arity; a bare symbol captures all arguments as one
/// list; `(a b . rest)` binds two positionally and collects the remainder.
fn parse_formals(formals: &Value) -> Result<(ArityMode, u16, Vec<Symbol>)> {
    match formals {
        Value::Symbol(rest) => Ok((ArityMode::Variadic, 0, vec![rest.clone()])),
        Value::Nil => Ok((ArityMode::Fixed, 0, Vec::new())),
        Value::Pair(_) => {
            let mut names = Vec::new();
            let mut cursor = formals.clone();
            loop {
                match cursor {
                    Value::Pair(pair) => {
                        match &pair.car {
                            Value::Symbol(s) => names.push(s.clone()),
                            other => {
                                return Err(CompileError::syntax(
                                    "lambda",
                                    format!("parameter must be a symbol, got {}", other),
                                ));
                            }
                        }
                        cursor = pair.cdr.clone();
                    }
                    Value::Nil => {
                        let nparams = names.len() as u16;
                        return Ok((ArityMode::Fixed, nparams, names));
                    }
                    Value::Symbol(rest) => {
                        let nparams = names.len() as u16;
                        names.push(rest.clone());
                        return Ok((ArityMode::Rest, nparams, names));
                    }
                    other => {
                        return Err(CompileError::syntax(
                            "lambda",
                            format!("malformed parameter list tail: {}", other),
                        ));
                    }
                }
            }
        }
        other => Err(CompileError::syntax(
            "lambda",
            format!("malformed parameter list: {}", other),
        )),
    }
}
