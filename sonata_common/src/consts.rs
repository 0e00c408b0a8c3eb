//! System-wide constants for the Sonata GPIO workspace.
//!
//! Single source of truth for register layout, pool limits and defaults.
//! Imported by all crates — no duplication permitted.

use static_assertions::const_assert;

/// Number of user LEDs on the Sonata board.
pub const NUM_LEDS: u8 = 8;

/// Number of user DIP switches on the Sonata board.
pub const NUM_SWITCHES: u8 = 8;

/// Bit position of LED 0 in the GPIO output register.
pub const LED_BIT_OFFSET: u32 = 4;

/// Maximum number of LEDs a pool can arbitrate.
///
/// Bounded by the 32-bit output register minus the LED bit offset.
pub const MAX_LEDS: usize = 28;

/// Mask of the switch bits in the GPIO input register.
pub const SWITCH_MASK: u32 = 0xFF;

/// Default LED used by the blinky demos.
pub const DEFAULT_LED_INDEX: u8 = 7;

/// Default demo step period in milliseconds.
pub const DEFAULT_PERIOD_MS: u64 = 500;

/// Default allocator quota in bytes (one `MALLOC_QUOTA`).
pub const DEFAULT_MALLOC_QUOTA: usize = 1024;

/// Default board driver name.
pub const DEFAULT_BOARD: &str = "simulation";

/// Default service name used in logs and status output.
pub const SERVICE_NAME: &str = "sonata-gpio";

/// Default configuration file path.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/sonata/gpio.toml";

const_assert!(LED_BIT_OFFSET as usize + MAX_LEDS <= 32);
const_assert!(NUM_LEDS as usize <= MAX_LEDS);
const_assert!(DEFAULT_LED_INDEX < NUM_LEDS);
