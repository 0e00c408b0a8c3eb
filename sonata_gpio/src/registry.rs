//! LED ownership registry.
//!
//! `LedRegistry` arbitrates a fixed pool of LEDs. Each LED is either FREE or
//! TAKEN; `acquire` moves it to TAKEN and returns a sealed handle, `release`
//! moves it back to FREE and bumps the slot generation so the released
//! handle can never act on the LED again.
//!
//! ```text
//!   FREE ──acquire──► TAKEN ──release──► FREE
//!                       │
//!                       └─ toggle / set (handle must unseal)
//! ```
//!
//! The taken mask, slot generations and allocations change together under
//! one mutex, so two callers racing for the same LED get exactly one handle.

use crate::allocator::{AllocError, Allocation, TokenAllocator};
use crate::token::{SealedLedHandle, TokenKey};
use serde::Serialize;
use sonata_common::consts::MAX_LEDS;
use sonata_common::gpio::bits::leds_from_output;
use sonata_common::gpio::board::GpioBoard;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Bytes charged to the allocator for each outstanding handle.
pub const HANDLE_ALLOCATION_SIZE: usize = std::mem::size_of::<SealedLedHandle>();

/// Registry errors. Each kind is distinct so callers can react differently.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Index outside the pool.
    #[error("LED {index} out of range (pool has {count} LEDs)")]
    OutOfRange {
        /// Requested index.
        index: u8,
        /// Pool size.
        count: u8,
    },

    /// The LED already has an outstanding handle.
    #[error("LED {0} is already taken")]
    AlreadyTaken(u8),

    /// Handle is forged, from another registry, stale or released.
    #[error("invalid LED handle")]
    InvalidHandle,

    /// The handle record could not be allocated.
    #[error("out of memory: {0}")]
    OutOfMemory(#[from] AllocError),
}

/// Per-LED bookkeeping.
#[derive(Debug, Default)]
struct Slot {
    /// Bumped on every release.
    generation: u32,
    /// Backing allocation while TAKEN.
    allocation: Option<Allocation>,
}

#[derive(Debug)]
struct PoolState {
    /// Bit `i` set = LED `i` TAKEN.
    taken: u32,
    slots: heapless::Vec<Slot, MAX_LEDS>,
}

/// Serializable view of the registry for status output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistrySnapshot {
    /// Board driver name.
    pub board: String,
    /// Pool size.
    pub capacity: u8,
    /// Indices with an outstanding handle.
    pub taken: Vec<u8>,
    /// Indices currently lit.
    pub leds_on: Vec<u8>,
    /// Raw output register.
    pub output_register: u32,
    /// Allocator bytes in use.
    pub allocator_used: usize,
    /// Allocator quota.
    pub allocator_quota: usize,
}

impl RegistrySnapshot {
    /// Serialize as a single-line JSON document.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Exclusive LED ownership registry.
///
/// Construct one per board and share it through `Arc`.
pub struct LedRegistry {
    key: TokenKey,
    count: u8,
    board: Arc<dyn GpioBoard>,
    allocator: Arc<dyn TokenAllocator>,
    state: Mutex<PoolState>,
}

impl LedRegistry {
    /// Create a registry over every LED of `board` (at most `MAX_LEDS`).
    pub fn new(board: Arc<dyn GpioBoard>, allocator: Arc<dyn TokenAllocator>) -> Self {
        let count = board.led_count().min(MAX_LEDS as u8);

        let mut slots = heapless::Vec::new();
        for _ in 0..count {
            // Cannot fail: count <= MAX_LEDS.
            let _ = slots.push(Slot::default());
        }

        let key = TokenKey::new();
        info!(
            "LedRegistry created: board={}, leds={}, quota={}B, key={}",
            board.name(),
            count,
            allocator.quota(),
            key.id()
        );

        Self {
            key,
            count,
            board,
            allocator,
            state: Mutex::new(PoolState { taken: 0, slots }),
        }
    }

    /// Acquire exclusive ownership of LED `index`.
    ///
    /// # Errors
    /// - `OutOfRange` if `index >= capacity()`
    /// - `AlreadyTaken` if another handle for `index` is outstanding
    /// - `OutOfMemory` if the handle record cannot be allocated; the LED
    ///   stays FREE
    pub fn acquire(&self, index: u8) -> Result<SealedLedHandle, RegistryError> {
        if index >= self.count {
            return Err(RegistryError::OutOfRange {
                index,
                count: self.count,
            });
        }

        let bit = 1u32 << index;
        let mut state = self.lock();
        if state.taken & bit != 0 {
            debug!("LED {} acquire refused: already taken", index);
            return Err(RegistryError::AlreadyTaken(index));
        }

        let allocation = self
            .allocator
            .allocate(HANDLE_ALLOCATION_SIZE)
            .inspect_err(|e| warn!("LED {} acquire failed: {}", index, e))?;

        state.taken |= bit;
        let slot = &mut state.slots[index as usize];
        slot.allocation = Some(allocation);
        let handle = self.key.seal(index, slot.generation);

        debug!("Acquired {}", handle);
        Ok(handle)
    }

    /// Toggle the LED owned by `handle`.
    ///
    /// Returns `false` if the handle does not unseal.
    pub fn toggle(&self, handle: &SealedLedHandle) -> bool {
        match self.try_toggle(handle) {
            Ok(()) => true,
            Err(e) => {
                warn!("Toggle rejected for {}: {}", handle, e);
                false
            }
        }
    }

    /// Toggle the LED owned by `handle`, reporting why it was refused.
    pub fn try_toggle(&self, handle: &SealedLedHandle) -> Result<(), RegistryError> {
        let state = self.lock();
        let index = self.unseal(&state, handle)?;
        self.board.led_toggle(index);
        Ok(())
    }

    /// Drive the LED owned by `handle` on or off.
    pub fn set(&self, handle: &SealedLedHandle, on: bool) -> Result<(), RegistryError> {
        let state = self.lock();
        let index = self.unseal(&state, handle)?;
        self.board.set_led(index, on);
        Ok(())
    }

    /// Read the output state of the LED owned by `handle`.
    pub fn led_state(&self, handle: &SealedLedHandle) -> Result<bool, RegistryError> {
        let state = self.lock();
        let index = self.unseal(&state, handle)?;
        Ok(self.board.led(index))
    }

    /// Relinquish ownership of the LED named by `handle`.
    ///
    /// Invalid handles leave the pool untouched; use `try_release` to see
    /// the error.
    pub fn release(&self, handle: &SealedLedHandle) {
        if let Err(e) = self.try_release(handle) {
            debug!("Release ignored for {}: {}", handle, e);
        }
    }

    /// Relinquish ownership, reporting `InvalidHandle` for stale handles.
    pub fn try_release(&self, handle: &SealedLedHandle) -> Result<(), RegistryError> {
        let mut state = self.lock();
        let index = self.unseal(&state, handle)?;

        state.taken &= !(1u32 << index);
        let slot = &mut state.slots[index as usize];
        slot.generation = slot.generation.wrapping_add(1);
        if let Some(allocation) = slot.allocation.take() {
            self.allocator.free(allocation);
        }

        debug!("Released {}", handle);
        Ok(())
    }

    /// Whether LED `index` currently has an outstanding handle.
    pub fn is_taken(&self, index: u8) -> bool {
        index < self.count && self.lock().taken & (1u32 << index) != 0
    }

    /// Bit mask of taken LEDs (bit `i` = LED `i`).
    pub fn taken_mask(&self) -> u32 {
        self.lock().taken
    }

    /// Number of LEDs in the pool.
    pub fn capacity(&self) -> u8 {
        self.count
    }

    /// Number of FREE LEDs.
    pub fn available(&self) -> u8 {
        self.count - self.taken_mask().count_ones() as u8
    }

    /// Board the registry drives.
    pub fn board(&self) -> &Arc<dyn GpioBoard> {
        &self.board
    }

    /// Capture the registry and board state.
    pub fn snapshot(&self) -> RegistrySnapshot {
        let taken = self.taken_mask();
        let output = self.board.output();
        let lit = leds_from_output(output, self.count);

        RegistrySnapshot {
            board: self.board.name().to_string(),
            capacity: self.count,
            taken: (0..self.count).filter(|i| taken & (1 << i) != 0).collect(),
            leds_on: (0..self.count).filter(|i| lit & (1 << i) != 0).collect(),
            output_register: output,
            allocator_used: self.allocator.used(),
            allocator_quota: self.allocator.quota(),
        }
    }

    /// Unseal `handle` against the live pool state, returning its index.
    fn unseal(&self, state: &PoolState, handle: &SealedLedHandle) -> Result<u8, RegistryError> {
        let (index, generation) = self
            .key
            .unseal(handle)
            .ok_or(RegistryError::InvalidHandle)?;
        let slot = state
            .slots
            .get(index as usize)
            .ok_or(RegistryError::InvalidHandle)?;

        if state.taken & (1u32 << index) == 0 || slot.generation != generation {
            return Err(RegistryError::InvalidHandle);
        }
        Ok(index)
    }

    fn lock(&self) -> MutexGuard<'_, PoolState> {
        // Every critical section leaves the state consistent, so a poisoned
        // lock is still usable.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for LedRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LedRegistry")
            .field("key", &self.key.id())
            .field("board", &self.board.name())
            .field("count", &self.count)
            .field("taken", &format_args!("{:#b}", self.taken_mask()))
            .finish()
    }
}
