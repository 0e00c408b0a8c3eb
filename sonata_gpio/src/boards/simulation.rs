//! Simulated Sonata GPIO board.
//!
//! The `SimulatedBoard` holds the output and input registers in atomics so
//! the registry, raw demos and tests can share one board without locks.
//! Register layout matches the real board (see `sonata_common::gpio::bits`).

use sonata_common::consts::{MAX_LEDS, NUM_SWITCHES};
use sonata_common::gpio::bits::{get_bit, led_bit, leds_from_output, switch_bit};
use sonata_common::gpio::board::{GpioBoard, GpioError};
use sonata_common::gpio::config::GpioConfig;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use tracing::{debug, trace};

/// Simulated GPIO board.
#[derive(Debug)]
pub struct SimulatedBoard {
    /// LEDs wired to the output register
    led_count: u8,
    /// Output register (LEDs at bit 4 upwards)
    output: AtomicU32,
    /// Input register (switches in the low byte)
    input: AtomicU32,
    /// Number of LED register writes, for tests and diagnostics
    writes: AtomicU64,
}

impl SimulatedBoard {
    /// Create a board with `led_count` LEDs (clamped to `MAX_LEDS`), all off.
    pub fn new(led_count: u8) -> Self {
        let led_count = led_count.min(MAX_LEDS as u8);
        debug!("SimulatedBoard initialized: {} LEDs, {} switches", led_count, NUM_SWITCHES);

        Self {
            led_count,
            output: AtomicU32::new(0),
            input: AtomicU32::new(0),
            writes: AtomicU64::new(0),
        }
    }

    /// Overwrite the whole input register.
    pub fn set_input(&self, value: u32) {
        self.input.store(value, Ordering::Release);
    }

    /// Flip a simulated switch.
    pub fn set_switch(&self, index: u8, on: bool) {
        let bit = switch_bit(index);
        if on {
            self.input.fetch_or(bit, Ordering::AcqRel);
        } else {
            self.input.fetch_and(!bit, Ordering::AcqRel);
        }
        trace!("SW[{}] -> {}", index, if on { "ON" } else { "OFF" });
    }

    /// Number of LED register writes since creation.
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::Relaxed)
    }

    /// Pool-aligned LED bits (bit 0 = LED 0).
    pub fn leds(&self) -> u32 {
        leds_from_output(self.output(), self.led_count)
    }

    /// Register bit for LED `index`, or `None` if the board has no such LED.
    fn bit(&self, index: u8) -> Option<u32> {
        (index < self.led_count).then(|| led_bit(index))
    }
}

impl GpioBoard for SimulatedBoard {
    fn name(&self) -> &'static str {
        "simulation"
    }

    fn led_count(&self) -> u8 {
        self.led_count
    }

    fn switch_count(&self) -> u8 {
        NUM_SWITCHES
    }

    fn set_led(&self, index: u8, on: bool) {
        let Some(bit) = self.bit(index) else {
            return;
        };
        if on {
            self.output.fetch_or(bit, Ordering::AcqRel);
        } else {
            self.output.fetch_and(!bit, Ordering::AcqRel);
        }
        self.writes.fetch_add(1, Ordering::Relaxed);
        trace!("LED[{}] -> {}", index, if on { "ON" } else { "OFF" });
    }

    fn led(&self, index: u8) -> bool {
        self.bit(index)
            .is_some_and(|bit| get_bit(self.output.load(Ordering::Acquire), bit))
    }

    fn output(&self) -> u32 {
        self.output.load(Ordering::Acquire)
    }

    fn read_switch(&self, index: u8) -> bool {
        get_bit(self.input.load(Ordering::Acquire), switch_bit(index))
    }

    fn led_toggle(&self, index: u8) {
        let Some(bit) = self.bit(index) else {
            return;
        };
        let previous = self.output.fetch_xor(bit, Ordering::AcqRel);
        self.writes.fetch_add(1, Ordering::Relaxed);
        trace!(
            "LED[{}] toggled -> {}",
            index,
            if get_bit(previous, bit) { "OFF" } else { "ON" }
        );
    }
}

/// Factory for the board registry.
pub fn create_board(config: &GpioConfig) -> Result<Arc<dyn GpioBoard>, GpioError> {
    if config.led_count == 0 || config.led_count as usize > MAX_LEDS {
        return Err(GpioError::ConfigError(format!(
            "simulation board supports 1..={} LEDs (got {})",
            MAX_LEDS, config.led_count
        )));
    }
    Ok(Arc::new(SimulatedBoard::new(config.led_count)))
}
