//! Quota-limited allocator for handle records.
//!
//! Every outstanding LED handle is backed by one allocation charged against
//! an allocator quota, the way each firmware compartment owns a
//! `MALLOC_CAPABILITY` with a fixed byte budget. Running out of quota is
//! reported immediately; there is no blocking retry.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use thiserror::Error;
use tracing::{trace, warn};

/// Source of process-unique allocator ids. Id 0 is never issued.
static NEXT_ALLOCATOR_ID: AtomicU64 = AtomicU64::new(1);

/// Allocation failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AllocError {
    /// The request does not fit in the remaining quota.
    #[error("allocation of {requested} bytes exceeds quota ({available} of {quota} bytes left)")]
    QuotaExceeded {
        /// Bytes requested.
        requested: usize,
        /// Bytes still available when the request was made.
        available: usize,
        /// Total quota of the allocator.
        quota: usize,
    },

    /// Zero-byte allocations are refused.
    #[error("zero-sized allocation")]
    ZeroSized,
}

/// Identity of one allocator instance.
///
/// The only way to mint an [`Allocation`]. Each id is process-unique and
/// not `Clone`, so an allocator can recognise the allocations it issued and
/// ignore any others handed to `free`.
#[derive(Debug)]
pub struct AllocatorId {
    id: u64,
}

impl AllocatorId {
    /// Create a fresh, process-unique id.
    pub fn new() -> Self {
        Self {
            id: NEXT_ALLOCATOR_ID.fetch_add(1, Ordering::Relaxed),
        }
    }

    /// Mint an allocation record of `size` bytes stamped with this id.
    pub fn issue(&self, size: usize) -> Allocation {
        Allocation {
            size,
            issuer: self.id,
        }
    }

    /// Whether `allocation` was minted by this id.
    pub fn owns(&self, allocation: &Allocation) -> bool {
        allocation.issuer == self.id
    }
}

impl Default for AllocatorId {
    fn default() -> Self {
        Self::new()
    }
}

/// Proof of a live allocation.
///
/// Neither `Clone` nor `Copy` and only minted through [`AllocatorId::issue`];
/// the only way to give the bytes back is to move the allocation into
/// [`TokenAllocator::free`] of the allocator that issued it.
#[derive(Debug, PartialEq, Eq)]
pub struct Allocation {
    size: usize,
    issuer: u64,
}

impl Allocation {
    /// Size of the allocation in bytes.
    pub fn size(&self) -> usize {
        self.size
    }
}

/// Allocation boundary used by the LED registry.
pub trait TokenAllocator: Send + Sync {
    /// Reserve `size` bytes.
    fn allocate(&self, size: usize) -> Result<Allocation, AllocError>;

    /// Return an allocation to the pool.
    ///
    /// Allocations issued by another allocator must leave the pool
    /// untouched.
    fn free(&self, allocation: Allocation);

    /// Total quota in bytes.
    fn quota(&self) -> usize;

    /// Bytes currently allocated.
    fn used(&self) -> usize;

    /// Bytes still available.
    fn available(&self) -> usize {
        self.quota().saturating_sub(self.used())
    }
}

/// Lock-free quota allocator.
#[derive(Debug)]
pub struct QuotaAllocator {
    id: AllocatorId,
    quota: usize,
    used: AtomicUsize,
}

impl QuotaAllocator {
    /// Create an allocator with a quota of `quota` bytes.
    pub fn new(quota: usize) -> Self {
        Self {
            id: AllocatorId::new(),
            quota,
            used: AtomicUsize::new(0),
        }
    }
}

impl TokenAllocator for QuotaAllocator {
    fn allocate(&self, size: usize) -> Result<Allocation, AllocError> {
        if size == 0 {
            return Err(AllocError::ZeroSized);
        }

        let quota = self.quota;
        self.used
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |used| {
                used.checked_add(size).filter(|&total| total <= quota)
            })
            .map(|previous| {
                trace!("allocated {} bytes ({} in use)", size, previous + size);
                self.id.issue(size)
            })
            .map_err(|used| AllocError::QuotaExceeded {
                requested: size,
                available: quota.saturating_sub(used),
                quota,
            })
    }

    fn free(&self, allocation: Allocation) {
        if !self.id.owns(&allocation) {
            warn!("Ignoring free of {} bytes not issued by this allocator", allocation.size());
            return;
        }
        let size = allocation.size();
        let _ = self
            .used
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |used| {
                Some(used.saturating_sub(size))
            });
        trace!("freed {} bytes", size);
    }

    fn quota(&self) -> usize {
        self.quota
    }

    fn used(&self) -> usize {
        self.used.load(Ordering::Acquire)
    }
}
