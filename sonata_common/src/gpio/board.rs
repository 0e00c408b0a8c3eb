//! GPIO board trait and error types.
//!
//! This module defines:
//! - `GpioBoard` trait - The MMIO register boundary for LEDs and switches
//! - `GpioError` enum - Error types for board creation and configuration
//! - `BoardFactory` type alias - Factory function type

use crate::gpio::config::GpioConfig;
use std::sync::Arc;
use thiserror::Error;

/// Error types for GPIO board operations.
#[derive(Debug, Clone, Error)]
pub enum GpioError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Board driver not found
    #[error("Board not found: {0}")]
    BoardNotFound(String),
}

/// Factory function type for creating board instances.
pub type BoardFactory = fn(&GpioConfig) -> Result<Arc<dyn GpioBoard>, GpioError>;

/// Trait defining the GPIO register boundary.
///
/// Implementations own one output register (LEDs) and one input register
/// (switches). All methods take `&self`: boards are shared between the LED
/// registry and raw demos, so register access must be interior and
/// single-word.
///
/// Out-of-range indices are ignored by setters and read as `false`.
pub trait GpioBoard: Send + Sync {
    /// Returns the board's identifier (e.g., "simulation", "mmio").
    fn name(&self) -> &'static str;

    /// Number of LEDs wired to the output register.
    fn led_count(&self) -> u8;

    /// Number of switches wired to the input register.
    fn switch_count(&self) -> u8;

    /// Drive LED `index` on or off.
    fn set_led(&self, index: u8, on: bool);

    /// Current output state of LED `index`.
    fn led(&self, index: u8) -> bool;

    /// Raw snapshot of the output register.
    fn output(&self) -> u32;

    /// Debounced state of switch `index`.
    fn read_switch(&self, index: u8) -> bool;

    /// Flip LED `index`.
    ///
    /// Default is a read-modify-write through `led`/`set_led`; boards with
    /// an atomic register should override it.
    fn led_toggle(&self, index: u8) {
        self.set_led(index, !self.led(index));
    }

    /// Turn LED `index` on.
    fn led_on(&self, index: u8) {
        self.set_led(index, true);
    }

    /// Turn LED `index` off.
    fn led_off(&self, index: u8) {
        self.set_led(index, false);
    }
}
