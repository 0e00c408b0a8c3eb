//! Prelude module for common re-exports.
//!
//! This module provides convenient re-exports of commonly used types
//! so that consumers can do `use sonata_common::prelude::*;` and get
//! the most important types without listing individual paths.
//!
//! # Usage
//!
//! ```rust
//! use sonata_common::prelude::*;
//! ```

// ─── Logging ────────────────────────────────────────────────────────
pub use crate::config::LogLevel;

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, SharedConfig};
pub use crate::gpio::config::{DemoConfig, DemoKind, GpioAppConfig, GpioConfig};

// ─── System Constants ───────────────────────────────────────────────
pub use crate::consts::{MAX_LEDS, NUM_LEDS};

// ─── GPIO ───────────────────────────────────────────────────────────
pub use crate::gpio::board::{BoardFactory, GpioBoard, GpioError};
