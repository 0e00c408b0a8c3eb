//! Sonata Common Library
//!
//! This crate provides shared constants, configuration loading utilities and
//! the GPIO board boundary for all Sonata workspace crates.
//!
//! # Module Structure
//!
//! - [`consts`] - Register layout and default values
//! - [`gpio`] - GPIO board trait, register bit helpers, GPIO/demo config
//! - [`config`] - Configuration loading traits and types
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use sonata_common::consts::NUM_LEDS;
//! use sonata_common::config::{ConfigLoader, SharedConfig};
//! ```

pub mod config;
pub mod consts;
pub mod gpio;
pub mod prelude;
