//! Inline constant caches
//!
//! Each constant-access site owns a slot identified by the token the
//! compiler emitted with `opt_setinlinecache`. A slot remembers the value it
//! was filled with and the object model's constant serial at that moment;
//! any later constant definition bumps the serial and makes the slot stale.

use crate::vm::value::Value;
use rustc_hash::FxHashMap;

/// One inline cache slot
#[derive(Debug, Clone, Default)]
pub struct InlineCacheSlot {
    value: Option<Value>,
    serial: u64,
}

impl InlineCacheSlot {
    /// Cached value, regardless of validity
    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    /// Serial the slot was filled under
    pub fn serial(&self) -> u64 {
        self.serial
    }

    /// Check if the slot is filled and still current for `serial`
    #[inline]
    pub fn is_valid(&self, serial: u64) -> bool {
        self.value.is_some() && self.serial == serial
    }
}

/// Inline cache slots of one instruction sequence, keyed by cache token
#[derive(Debug, Clone, Default)]
pub struct InlineCacheTable {
    slots: FxHashMap<u32, InlineCacheSlot>,
    fills: u64,
}

impl InlineCacheTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a table with an empty slot for each token
    pub fn with_tokens(tokens: impl IntoIterator<Item = u32>) -> Self {
        let slots = tokens
            .into_iter()
            .map(|token| (token, InlineCacheSlot::default()))
            .collect();
        Self { slots, fills: 0 }
    }

    /// Fill slot `token` with `value` resolved under `serial`
    pub fn store(&mut self, token: u32, value: Value, serial: u64) {
        let slot = self.slots.entry(token).or_default();
        slot.value = Some(value);
        slot.serial = serial;
        self.fills += 1;
    }

    /// Cached value for `token` if the slot is valid under `serial`
    pub fn lookup(&self, token: u32, serial: u64) -> Option<&Value> {
        self.slots
            .get(&token)
            .filter(|slot| slot.is_valid(serial))
            .and_then(|slot| slot.value.as_ref())
    }

    /// Raw slot access
    pub fn slot(&self, token: u32) -> Option<&InlineCacheSlot> {
        self.slots.get(&token)
    }

    /// Empty every slot
    pub fn invalidate_all(&mut self) {
        for slot in self.slots.values_mut() {
            *slot = InlineCacheSlot::default();
        }
    }

    /// Number of known slots
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Check if no slot exists
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Total number of fills since creation
    pub fn fills(&self) -> u64 {
        self.fills
    }
}
