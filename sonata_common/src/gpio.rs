//! GPIO board boundary and configuration.
//!
//! This module contains the register helpers, the board trait and
//! configuration types shared by the LED registry and the demo runner.

pub mod bits;
pub mod board;
pub mod config;
