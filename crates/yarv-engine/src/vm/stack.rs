//! Operand stack
//!
//! This module provides the per-activation operand stack that instructions
//! read and write.
//!
//! # Depth convention
//!
//! Positions are counted from the top: depth 0 is the top value, depth `k`
//! is the `k`-th value below it.
//!
//! ```text
//! ┌─────────────────────┐
//! │ value₂   depth 0    │  ← top
//! │ value₁   depth 1    │
//! │ value₀   depth 2    │
//! └─────────────────────┘
//! ```
//!
//! Callers are expected to guarantee depth preconditions (see
//! `compiler::bytecode::verify`). A violated precondition is reported as
//! `VmError::StackUnderflow` and leaves the stack untouched.

use crate::vm::value::Value;
use crate::vm::{VmError, VmResult};

/// Default maximum stack size (in slots)
pub const DEFAULT_MAX_STACK_SIZE: usize = 1024 * 64;

/// Operand stack for one activation
#[derive(Debug, Clone)]
pub struct Stack {
    /// Stack slots, bottom first
    slots: Vec<Value>,

    /// Maximum stack size (in slots)
    max_size: usize,
}

impl Stack {
    /// Create a new stack with default size
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_STACK_SIZE)
    }

    /// Create a stack with specific capacity
    pub fn with_capacity(max_size: usize) -> Self {
        Self {
            slots: Vec::with_capacity(max_size.min(1024)),
            max_size,
        }
    }

    /// Vector index of the slot at `depth` (0 = top)
    #[inline]
    fn slot_index(&self, depth: usize) -> VmResult<usize> {
        if depth >= self.slots.len() {
            return Err(VmError::StackUnderflow {
                needed: depth.saturating_add(1),
                depth: self.slots.len(),
            });
        }
        Ok(self.slots.len() - 1 - depth)
    }

    #[inline]
    fn require(&self, needed: usize) -> VmResult<()> {
        if self.slots.len() < needed {
            return Err(VmError::StackUnderflow {
                needed,
                depth: self.slots.len(),
            });
        }
        Ok(())
    }

    /// Push a value onto the stack
    ///
    /// # Errors
    ///
    /// Returns `VmError::StackOverflow` if the stack is full.
    #[inline]
    pub fn push(&mut self, value: Value) -> VmResult<()> {
        self.ensure_room()?;
        self.slots.push(value);
        Ok(())
    }

    /// Check that one more value fits without pushing it
    ///
    /// # Errors
    ///
    /// Returns `VmError::StackOverflow` if the stack is full.
    #[inline]
    pub fn ensure_room(&self) -> VmResult<()> {
        if self.slots.len() >= self.max_size {
            return Err(VmError::StackOverflow {
                max: self.max_size,
            });
        }
        Ok(())
    }

    /// Pop a value from the stack
    ///
    /// # Errors
    ///
    /// Returns `VmError::StackUnderflow` if the stack is empty.
    #[inline]
    pub fn pop(&mut self) -> VmResult<Value> {
        self.slots.pop().ok_or(VmError::StackUnderflow {
            needed: 1,
            depth: 0,
        })
    }

    /// Pop the top `n` values, returned bottom-to-top
    ///
    /// # Errors
    ///
    /// Returns `VmError::StackUnderflow` if fewer than `n` values are present.
    pub fn pop_n(&mut self, n: usize) -> VmResult<Vec<Value>> {
        self.require(n)?;
        let at = self.slots.len() - n;
        Ok(self.slots.split_off(at))
    }

    /// Peek at the top value without popping
    ///
    /// # Errors
    ///
    /// Returns `VmError::StackUnderflow` if the stack is empty.
    #[inline]
    pub fn peek(&self) -> VmResult<&Value> {
        self.peek_n(0)
    }

    /// Peek at value N slots from top (0 = top)
    ///
    /// # Errors
    ///
    /// Returns `VmError::StackUnderflow` if not enough values on stack.
    #[inline]
    pub fn peek_n(&self, depth: usize) -> VmResult<&Value> {
        let index = self.slot_index(depth)?;
        Ok(&self.slots[index])
    }

    /// Overwrite the value N slots from top (0 = top)
    ///
    /// # Errors
    ///
    /// Returns `VmError::StackUnderflow` if not enough values on stack.
    #[inline]
    pub fn set_n(&mut self, depth: usize, value: Value) -> VmResult<()> {
        let index = self.slot_index(depth)?;
        self.slots[index] = value;
        Ok(())
    }

    /// Get current stack depth
    #[inline]
    pub fn depth(&self) -> usize {
        self.slots.len()
    }

    /// Check if stack is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Get maximum stack size
    #[inline]
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Drop every value
    pub fn clear(&mut self) {
        self.slots.clear();
    }

    /// Get all stack values as a slice, bottom first
    pub fn as_slice(&self) -> &[Value] {
        &self.slots
    }

    /// Iterate over all values, bottom first
    pub fn iter(&self) -> impl Iterator<Item = &Value> + '_ {
        self.slots.iter()
    }
}

impl Default for Stack {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
