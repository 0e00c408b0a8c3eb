//! Memory-mapped Sonata GPIO board.
//!
//! Drives the GPIO block through volatile reads and writes of its output and
//! input words. LED writes are read-modify-write on a single word; callers
//! that share one block between threads must serialize LED writes (the LED
//! registry does this under its pool lock).

use sonata_common::consts::{MAX_LEDS, NUM_SWITCHES};
use sonata_common::gpio::bits::{get_bit, led_bit, set_bit, switch_bit};
use sonata_common::gpio::board::GpioBoard;
use std::ptr::NonNull;
use tracing::trace;

/// Register block layout of the Sonata GPIO peripheral (first two words).
#[repr(C)]
#[derive(Debug, Default)]
pub struct GpioRegisters {
    /// Output register. LEDs live at bit 4 upwards.
    pub output: u32,
    /// Debounced input register. Switches live in the low byte.
    pub input: u32,
}

/// GPIO board backed by a memory-mapped register block.
#[derive(Debug)]
pub struct MmioBoard {
    regs: NonNull<GpioRegisters>,
    led_count: u8,
}

// SAFETY: all register access is volatile single-word access; `new`'s
// contract guarantees the block outlives the board.
unsafe impl Send for MmioBoard {}
// SAFETY: see above.
unsafe impl Sync for MmioBoard {}

impl MmioBoard {
    /// Wrap the register block at `regs`.
    ///
    /// # Safety
    /// Caller must ensure
    /// - `regs` points to a valid, aligned GPIO register block that stays
    ///   mapped for the lifetime of the board
    /// - no other driver writes the output register concurrently
    pub unsafe fn new(regs: NonNull<GpioRegisters>, led_count: u8) -> Self {
        Self {
            regs,
            led_count: led_count.min(MAX_LEDS as u8),
        }
    }

    fn read_output(&self) -> u32 {
        // SAFETY: `regs` is valid per `new`'s contract.
        unsafe { (&raw const (*self.regs.as_ptr()).output).read_volatile() }
    }

    fn write_output(&self, value: u32) {
        // SAFETY: `regs` is valid per `new`'s contract.
        unsafe { (&raw mut (*self.regs.as_ptr()).output).write_volatile(value) }
    }

    fn read_input(&self) -> u32 {
        // SAFETY: `regs` is valid per `new`'s contract.
        unsafe { (&raw const (*self.regs.as_ptr()).input).read_volatile() }
    }
}

impl GpioBoard for MmioBoard {
    fn name(&self) -> &'static str {
        "mmio"
    }

    fn led_count(&self) -> u8 {
        self.led_count
    }

    fn switch_count(&self) -> u8 {
        NUM_SWITCHES
    }

    fn set_led(&self, index: u8, on: bool) {
        if index >= self.led_count {
            return;
        }
        let mut value = self.read_output();
        set_bit(&mut value, led_bit(index), on);
        self.write_output(value);
        trace!("MMIO output <- {:#010x}", value);
    }

    fn led(&self, index: u8) -> bool {
        index < self.led_count && get_bit(self.read_output(), led_bit(index))
    }

    fn output(&self) -> u32 {
        self.read_output()
    }

    fn read_switch(&self, index: u8) -> bool {
        get_bit(self.read_input(), switch_bit(index))
    }

    fn led_toggle(&self, index: u8) {
        if index >= self.led_count {
            return;
        }
        let value = self.read_output() ^ led_bit(index);
        self.write_output(value);
        trace!("MMIO output <- {:#010x}", value);
    }
}
