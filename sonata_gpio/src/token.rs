//! Sealing keys and sealed LED handles.
//!
//! A `TokenKey` plays the role of a sealing capability: only the registry
//! holding the key can mint handles, and a handle only unseals under the
//! key that sealed it. Handles carry the slot generation they were minted
//! for; the registry rejects any handle whose generation is no longer live.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Source of process-unique key ids. Id 0 is never issued.
static NEXT_KEY_ID: AtomicU64 = AtomicU64::new(1);

/// Sealing key owned by one LED registry.
#[derive(Debug)]
pub struct TokenKey {
    id: u64,
}

impl TokenKey {
    /// Create a fresh key with a process-unique id.
    pub fn new() -> Self {
        Self {
            id: NEXT_KEY_ID.fetch_add(1, Ordering::Relaxed),
        }
    }

    /// Key identifier.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Seal `(slot, generation)` into a handle.
    pub(crate) fn seal(&self, slot: u8, generation: u32) -> SealedLedHandle {
        SealedLedHandle {
            key: self.id,
            slot,
            generation,
        }
    }

    /// Recover `(slot, generation)` if `handle` was sealed with this key.
    ///
    /// Liveness is not checked here.
    pub(crate) fn unseal(&self, handle: &SealedLedHandle) -> Option<(u8, u32)> {
        (handle.key == self.id).then_some((handle.slot, handle.generation))
    }
}

impl Default for TokenKey {
    fn default() -> Self {
        Self::new()
    }
}

/// Opaque handle proving exclusive ownership of one LED.
///
/// Only `LedRegistry::acquire` creates these. The type is neither `Clone`
/// nor `Copy` and has no public constructor, so holding one is proof that
/// the registry granted it.
#[derive(Debug, PartialEq, Eq)]
pub struct SealedLedHandle {
    key: u64,
    slot: u8,
    generation: u32,
}

impl SealedLedHandle {
    /// LED index this handle was minted for.
    pub fn index(&self) -> u8 {
        self.slot
    }
}

impl fmt::Display for SealedLedHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "LedHandle(key={}, led={}, gen={})",
            self.key, self.slot, self.generation
        )
    }
}
