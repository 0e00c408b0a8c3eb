//! # Sonata GPIO Library
//!
//! Exclusive LED ownership over the Sonata GPIO block, plus the demos that
//! exercise it.
//!
//! Boards implement the `GpioBoard` trait defined in
//! `sonata_common::gpio::board`. The `LedRegistry` sits on top of a board
//! and hands out sealed, generation-counted handles, one per LED.
//!
//! # Module Structure
//!
//! - [`allocator`] - Quota-limited allocator for handle records
//! - [`board_registry`] - Board factory registration
//! - [`boards`] - Board implementations (simulation, MMIO)
//! - [`core`] - DemoCore, fixed-period demo loop
//! - [`demos`] - Raw and registry-backed LED demos
//! - [`registry`] - LedRegistry: acquire, toggle, release
//! - [`token`] - Sealing keys and sealed handles
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     sonata_gpio                              │
//! │  ┌────────────┐    ┌──────────────┐    ┌─────────────────┐   │
//! │  │  DemoCore  │───►│ LedRegistry  │───►│ TokenAllocator  │   │
//! │  │ (loop)     │    │ (mutex pool) │    │ (quota)         │   │
//! │  └─────┬──────┘    └──────┬───────┘    └─────────────────┘   │
//! │        │ raw demos        │                                  │
//! │        ▼                  ▼                                  │
//! │               ┌────────────────┐                             │
//! │               │  GpioBoard     │ (trait object)              │
//! │               └────────────────┘                             │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust
//! use sonata_gpio::{LedRegistry, QuotaAllocator, RegistryError, SimulatedBoard};
//! use std::sync::Arc;
//!
//! let board = Arc::new(SimulatedBoard::new(8));
//! let registry = LedRegistry::new(board, Arc::new(QuotaAllocator::new(1024)));
//!
//! let handle = registry.acquire(7).unwrap();
//! assert_eq!(registry.acquire(7), Err(RegistryError::AlreadyTaken(7)));
//! assert!(registry.toggle(&handle));
//!
//! registry.release(&handle);
//! assert!(!registry.toggle(&handle));
//! ```

#![deny(missing_docs)]

pub mod allocator;
pub mod board_registry;
pub mod boards;
pub mod core;
pub mod demos;
pub mod registry;
pub mod token;

// Re-export key types for convenience
pub use crate::allocator::{AllocError, Allocation, AllocatorId, QuotaAllocator, TokenAllocator};
pub use crate::board_registry::BoardRegistry;
pub use crate::boards::{MmioBoard, SimulatedBoard};
pub use crate::core::{DemoCore, TimingStats};
pub use crate::demos::{Demo, DemoError, create_demo};
pub use crate::registry::{LedRegistry, RegistryError, RegistrySnapshot};
pub use crate::token::SealedLedHandle;
