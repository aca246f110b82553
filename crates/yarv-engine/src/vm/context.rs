//! VM Execution Context
//!
//! Each ExecutionContext represents one activation with:
//! - Its own operand stack
//! - Inline cache slots for the instruction sequence it runs
//! - The constant most recently resolved by `getconstant`
//! - An optional trace hook
//! - The options it was created with

use crate::vm::inline_cache::InlineCacheTable;
use crate::vm::stack::{Stack, DEFAULT_MAX_STACK_SIZE};
use crate::vm::trace::{TraceEvent, TraceHook};
use crate::vm::value::Value;
use crate::vm::{VmError, VmResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Unique identifier for an ExecutionContext
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextId(u64);

impl ContextId {
    /// Create a new unique context ID
    pub fn new() -> Self {
        static NEXT_ID: AtomicU64 = AtomicU64::new(1);
        ContextId(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Default for ContextId {
    fn default() -> Self {
        Self::new()
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The TOML document could not be parsed
    #[error("Invalid VM configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// A field holds an unusable value
    #[error("Invalid VM configuration: {0}")]
    Invalid(String),
}

/// Options for creating an ExecutionContext
///
/// Every field has a default, so a configuration file only needs to list
/// what it changes:
///
/// ```toml
/// max_stack_size = 4096
/// inline_caching = true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VmOptions {
    /// Maximum operand stack size in slots
    pub max_stack_size: usize,

    /// Whether `opt_setinlinecache` fills cache slots.
    ///
    /// When off, the instruction is a no-op and every constant access
    /// re-resolves through the object model.
    pub inline_caching: bool,

    /// Whether line events reach an installed trace hook
    pub trace_lines: bool,

    /// Instruction budget for one context (None = unlimited)
    pub max_steps: Option<u64>,
}

impl Default for VmOptions {
    fn default() -> Self {
        Self {
            max_stack_size: DEFAULT_MAX_STACK_SIZE,
            inline_caching: false,
            trace_lines: true,
            max_steps: None,
        }
    }
}

impl VmOptions {
    /// Parse options from a TOML document and validate them
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let options: VmOptions = toml::from_str(content)?;
        options.validate()?;
        Ok(options)
    }

    /// Reject values no context can run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_stack_size == 0 {
            return Err(ConfigError::Invalid(
                "max_stack_size must be greater than zero".to_string(),
            ));
        }
        if self.max_steps == Some(0) {
            return Err(ConfigError::Invalid(
                "max_steps must be greater than zero when set".to_string(),
            ));
        }
        Ok(())
    }

    /// Options with inline caching turned on
    pub fn with_inline_caching() -> Self {
        Self {
            inline_caching: true,
            ..Default::default()
        }
    }

    /// Options with an instruction budget
    pub fn with_step_budget(max_steps: u64) -> Self {
        Self {
            max_steps: Some(max_steps),
            ..Default::default()
        }
    }
}

/// The constant most recently resolved in a context
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConstant {
    /// Constant name as written at the access site
    pub name: Arc<str>,
    /// Value the object model returned
    pub value: Value,
    /// Constant serial observed when the value was resolved
    pub serial: u64,
}

/// Execution state of one activation
pub struct ExecutionContext {
    /// Unique context ID
    id: ContextId,

    /// Operand stack
    stack: Stack,

    /// Inline cache slots, keyed by cache token
    inline_caches: InlineCacheTable,

    /// Output of the last successful `getconstant`
    last_constant: Option<ResolvedConstant>,

    /// Trace event observer
    trace_hook: Option<Arc<dyn TraceHook>>,

    /// Creation options
    options: VmOptions,

    /// Instructions executed so far
    steps: u64,
}

impl ExecutionContext {
    /// Create a context with default options
    pub fn new() -> Self {
        Self::with_options(VmOptions::default())
    }

    /// Create a context with specific options
    pub fn with_options(options: VmOptions) -> Self {
        let id = ContextId::new();
        debug!(
            context = id.as_u64(),
            max_stack_size = options.max_stack_size,
            inline_caching = options.inline_caching,
            "execution context created"
        );
        Self {
            id,
            stack: Stack::with_capacity(options.max_stack_size),
            inline_caches: InlineCacheTable::new(),
            last_constant: None,
            trace_hook: None,
            options,
            steps: 0,
        }
    }

    /// Get the context ID
    pub fn id(&self) -> ContextId {
        self.id
    }

    /// Get the operand stack
    pub fn stack(&self) -> &Stack {
        &self.stack
    }

    /// Get mutable access to the operand stack
    pub fn stack_mut(&mut self) -> &mut Stack {
        &mut self.stack
    }

    /// Get the creation options
    pub fn options(&self) -> &VmOptions {
        &self.options
    }

    /// Get the inline cache table
    pub fn inline_caches(&self) -> &InlineCacheTable {
        &self.inline_caches
    }

    /// Get mutable access to the inline cache table
    pub fn inline_caches_mut(&mut self) -> &mut InlineCacheTable {
        &mut self.inline_caches
    }

    /// Get the constant most recently resolved in this context
    pub fn last_constant(&self) -> Option<&ResolvedConstant> {
        self.last_constant.as_ref()
    }

    /// Install a trace hook, replacing any previous one
    pub fn set_trace_hook(&mut self, hook: Arc<dyn TraceHook>) {
        self.trace_hook = Some(hook);
    }

    /// Remove the trace hook
    pub fn clear_trace_hook(&mut self) {
        self.trace_hook = None;
    }

    /// Number of instructions executed in this context
    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub(crate) fn record_constant(&mut self, name: Arc<str>, value: Value, serial: u64) {
        self.last_constant = Some(ResolvedConstant {
            name,
            value,
            serial,
        });
    }

    /// Hand the last resolved constant to one cache finalization
    pub(crate) fn take_last_constant(&mut self) -> Option<ResolvedConstant> {
        self.last_constant.take()
    }

    pub(crate) fn emit_trace(&self, event: TraceEvent) {
        if !self.options.trace_lines {
            return;
        }
        if let Some(hook) = &self.trace_hook {
            hook.on_event(&event);
        }
    }

    pub(crate) fn count_step(&mut self) -> VmResult<()> {
        if let Some(max) = self.options.max_steps {
            if self.steps >= max {
                return Err(VmError::StepLimitExceeded(max));
            }
        }
        self.steps += 1;
        Ok(())
    }
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("id", &self.id)
            .field("stack", &self.stack.as_slice())
            .field("inline_caches", &self.inline_caches.len())
            .field("trace_hook", &self.trace_hook.is_some())
            .field("options", &self.options)
            .field("steps", &self.steps)
            .finish()
    }
}
