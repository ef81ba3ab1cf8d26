// tarn-vm - Upvalues: captured variables with open/closed states
// Copyright (c) 2026 The Tarn Authors. MIT licensed.

//! Captured variables.
//!
//! While the frame owning a captured local is live, its upvalue is *open*:
//! reads and writes go through the variable's stack slot, so the owning
//! frame and every capturing closure observe the same storage. When the
//! owning frame exits, the VM closes the upvalue: the value is copied out
//! of the stack into the node and the node becomes its sole owner. The
//! transition is one-way.
//!
//! All closures capturing the same variable share one node by `Rc`, which
//! is what gives `set!` its shared-variable semantics.

use std::cell::RefCell;

use crate::value::Value;

use super::error::Result;
use super::stack::RegisterStack;

#[derive(Debug, Clone)]
enum UpvalueState {
    /// The variable still lives at this absolute stack index.
    Open(usize),
    /// The owning frame has exited; the node owns the value.
    Closed(Value),
}

/// A captured variable, shared between closures.
#[derive(Debug)]
pub struct UpValue {
    state: RefCell<UpvalueState>,
}

impl UpValue {
    /// Create an open upvalue referencing a live stack slot.
    pub fn open(index: usize) -> Self {
        Self {
            state: RefCell::new(UpvalueState::Open(index)),
        }
    }

    /// The referenced stack index, while open.
    #[must_use]
    pub fn index(&self) -> Option<usize> {
        match *self.state.borrow() {
            UpvalueState::Open(index) => Some(index),
            UpvalueState::Closed(_) => None,
        }
    }

    /// Read the captured variable.
    pub fn get(&self, stack: &RegisterStack) -> Result<Value> {
        match &*self.state.borrow() {
            UpvalueState::Open(index) => stack.get(*index),
            UpvalueState::Closed(value) => Ok(value.clone()),
        }
    }

    /// Write the captured variable.
    pub fn set(&self, stack: &mut RegisterStack, value: Value) -> Result<()> {
        let index = match &*self.state.borrow() {
            UpvalueState::Open(index) => Some(*index),
            UpvalueState::Closed(_) => None,
        };
        match index {
            Some(index) => stack.set(index, value),
            None => {
                *self.state.borrow_mut() = UpvalueState::Closed(value);
                Ok(())
            }
        }
    }

    /// Copy the value out of the stack and switch to the closed state.
    /// Closing an already-closed upvalue is a no-op.
    pub fn close(&self, stack: &RegisterStack) -> Result<()> {
        let value = match &*self.state.borrow() {
            UpvalueState::Open(index) => stack.get(*index)?,
            UpvalueState::Closed(_) => return Ok(()),
        };
        *self.state.borrow_mut() = UpvalueState::Closed(value);
        Ok(())
    }
}
