//! GPIO board implementations.
//!
//! - [`simulation`] - Atomic in-memory registers for development and testing
//! - [`mmio`] - Volatile access to a memory-mapped register block
//!
//! # Adding New Boards
//!
//! 1. Create a new submodule under `boards/`
//! 2. Implement the `GpioBoard` trait from `sonata_common::gpio::board`
//! 3. Register a factory in `register_builtin_boards()`

pub mod mmio;
pub mod simulation;

pub use mmio::{GpioRegisters, MmioBoard};
pub use simulation::SimulatedBoard;

use crate::board_registry::BoardRegistry;

/// Register all built-in boards that can be created from configuration.
///
/// The MMIO board needs a register address and is constructed directly.
pub fn register_builtin_boards(registry: &mut BoardRegistry) {
    registry.register("simulation", simulation::create_board);
}
