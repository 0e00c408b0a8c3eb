//! GPIO and demo configuration types.
//!
//! This module contains the configuration loaded from `gpio.toml`:
//! - `GpioAppConfig` - Top-level file layout
//! - `GpioConfig` - Board selection, LED pool size, allocator quota
//! - `DemoConfig` / `DemoKind` - Which demo to run and how fast

use crate::config::{ConfigError, SharedConfig};
use crate::consts::{
    DEFAULT_BOARD, DEFAULT_LED_INDEX, DEFAULT_MALLOC_QUOTA, DEFAULT_PERIOD_MS, MAX_LEDS, NUM_LEDS,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

fn default_board() -> String {
    DEFAULT_BOARD.to_string()
}

fn default_led_count() -> u8 {
    NUM_LEDS
}

fn default_malloc_quota() -> usize {
    DEFAULT_MALLOC_QUOTA
}

fn default_period_ms() -> u64 {
    DEFAULT_PERIOD_MS
}

fn default_led_index() -> u8 {
    DEFAULT_LED_INDEX
}

/// Top-level layout of `gpio.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GpioAppConfig {
    /// Common service fields.
    pub shared: SharedConfig,

    /// Board and pool settings.
    #[serde(default)]
    pub gpio: GpioConfig,

    /// Demo selection.
    #[serde(default)]
    pub demo: DemoConfig,
}

impl GpioAppConfig {
    /// Validate every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;
        self.gpio.validate()?;
        self.demo.validate(self.gpio.led_count)
    }
}

/// Board and LED pool configuration (`[gpio]`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GpioConfig {
    /// Board driver name.
    #[serde(default = "default_board")]
    pub board: String,

    /// Number of LEDs in the pool.
    #[serde(default = "default_led_count")]
    pub led_count: u8,

    /// Allocator quota for handle records, in bytes.
    #[serde(default = "default_malloc_quota")]
    pub malloc_quota: usize,
}

impl GpioConfig {
    /// Validate the GPIO configuration.
    ///
    /// # Validation Rules
    /// 1. `board` not empty
    /// 2. 0 < `led_count` <= MAX_LEDS
    /// 3. `malloc_quota` > 0
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.board.is_empty() {
            return Err(ConfigError::ValidationError(
                "gpio.board cannot be empty".to_string(),
            ));
        }

        if self.led_count == 0 || self.led_count as usize > MAX_LEDS {
            return Err(ConfigError::ValidationError(format!(
                "gpio.led_count must be in 1..={MAX_LEDS} (got {})",
                self.led_count
            )));
        }

        if self.malloc_quota == 0 {
            return Err(ConfigError::ValidationError(
                "gpio.malloc_quota must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for GpioConfig {
    fn default() -> Self {
        Self {
            board: default_board(),
            led_count: default_led_count(),
            malloc_quota: default_malloc_quota(),
        }
    }
}

/// Available LED demos.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DemoKind {
    /// Toggle one LED by writing the register directly.
    BlinkyRaw,
    /// Toggle one LED through an acquired handle.
    BlinkyDynamic,
    /// Walk LEDs downwards by writing the register directly.
    LedWalkRaw,
    /// Acquire every LED, re-acquire LED 3, then walk through handles.
    #[default]
    LedWalkDynamic,
    /// Fill all LEDs on, then empty them off, one per step.
    LedWalkFill,
}

impl DemoKind {
    /// All demos, in menu order.
    pub const ALL: [DemoKind; 5] = [
        DemoKind::BlinkyRaw,
        DemoKind::BlinkyDynamic,
        DemoKind::LedWalkRaw,
        DemoKind::LedWalkDynamic,
        DemoKind::LedWalkFill,
    ];

    /// Canonical snake_case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            DemoKind::BlinkyRaw => "blinky_raw",
            DemoKind::BlinkyDynamic => "blinky_dynamic",
            DemoKind::LedWalkRaw => "led_walk_raw",
            DemoKind::LedWalkDynamic => "led_walk_dynamic",
            DemoKind::LedWalkFill => "led_walk_fill",
        }
    }

    /// Whether the demo goes through the LED registry.
    pub fn uses_registry(&self) -> bool {
        matches!(self, DemoKind::BlinkyDynamic | DemoKind::LedWalkDynamic)
    }
}

impl fmt::Display for DemoKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DemoKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        DemoKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| ConfigError::ParseError(format!("unknown demo '{s}'")))
    }
}

/// Demo configuration (`[demo]`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DemoConfig {
    /// Which demo to run.
    #[serde(default)]
    pub kind: DemoKind,

    /// Delay between demo steps in milliseconds.
    #[serde(default = "default_period_ms")]
    pub period_ms: u64,

    /// LED used by the blinky demos.
    #[serde(default = "default_led_index")]
    pub led_index: u8,

    /// Number of steps to run. 0 = run until interrupted.
    #[serde(default)]
    pub cycles: u64,
}

impl DemoConfig {
    /// Validate the demo configuration against the pool size.
    pub fn validate(&self, led_count: u8) -> Result<(), ConfigError> {
        if self.period_ms == 0 {
            return Err(ConfigError::ValidationError(
                "demo.period_ms must be greater than 0".to_string(),
            ));
        }

        if self.led_index >= led_count {
            return Err(ConfigError::ValidationError(format!(
                "demo.led_index {} out of range for {} LEDs",
                self.led_index, led_count
            )));
        }

        Ok(())
    }
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            kind: DemoKind::default(),
            period_ms: default_period_ms(),
            led_index: default_led_index(),
            cycles: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gpio_config_defaults() {
        let cfg = GpioConfig::default();
        assert_eq!(cfg.board, "simulation");
        assert_eq!(cfg.led_count, 8);
        assert_eq!(cfg.malloc_quota, 1024);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_gpio_config_rejects_bad_led_count() {
        let mut cfg = GpioConfig::default();
        cfg.led_count = 0;
        assert!(matches!(cfg.validate(), Err(ConfigError::ValidationError(_))));

        cfg.led_count = MAX_LEDS as u8 + 1;
        assert!(matches!(cfg.validate(), Err(ConfigError::ValidationError(_))));

        cfg.led_count = MAX_LEDS as u8;
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_gpio_config_rejects_zero_quota() {
        let cfg = GpioConfig {
            malloc_quota: 0,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_demo_kind_parse() {
        assert_eq!("blinky_raw".parse::<DemoKind>().unwrap(), DemoKind::BlinkyRaw);
        assert_eq!(
            "led-walk-dynamic".parse::<DemoKind>().unwrap(),
            DemoKind::LedWalkDynamic
        );
        assert_eq!(" LED_WALK_FILL ".parse::<DemoKind>().unwrap(), DemoKind::LedWalkFill);
        assert!(matches!(
            "snake".parse::<DemoKind>(),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_demo_kind_display_roundtrip() {
        for kind in DemoKind::ALL {
            assert_eq!(kind.to_string().parse::<DemoKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_demo_kind_registry_usage() {
        assert!(DemoKind::BlinkyDynamic.uses_registry());
        assert!(DemoKind::LedWalkDynamic.uses_registry());
        assert!(!DemoKind::BlinkyRaw.uses_registry());
        assert!(!DemoKind::LedWalkFill.uses_registry());
    }

    #[test]
    fn test_demo_config_validation() {
        let cfg = DemoConfig::default();
        assert!(cfg.validate(8).is_ok());
        assert!(cfg.validate(7).is_err());

        let cfg = DemoConfig {
            period_ms: 0,
            ..Default::default()
        };
        assert!(cfg.validate(8).is_err());
    }

    #[test]
    fn test_demo_kind_toml() {
        let cfg: DemoConfig = toml::from_str("kind = \"blinky_dynamic\"\ncycles = 4").unwrap();
        assert_eq!(cfg.kind, DemoKind::BlinkyDynamic);
        assert_eq!(cfg.cycles, 4);
        assert_eq!(cfg.period_ms, 500);
        assert_eq!(cfg.led_index, 7);
    }
}
