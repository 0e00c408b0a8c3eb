//! Bit helpers for the Sonata GPIO registers.
//!
//! ## Layout
//!
//! Output register: LED `i` lives at bit `i + LED_BIT_OFFSET`, so LED 0 is
//! bit 4 and LED 7 is bit 11 on an 8-LED board. The low nibble drives other
//! outputs and must never be touched by LED operations.
//!
//! Input register: switch `i` lives at bit `i`, masked by `SWITCH_MASK`.
//!
//! All helpers are branch-light and inline, suitable for polling loops.

use crate::consts::{LED_BIT_OFFSET, MAX_LEDS, SWITCH_MASK};

/// Output-register mask covering the first `count` LEDs.
///
/// `count` is clamped to `MAX_LEDS`.
#[inline]
pub fn led_mask(count: u8) -> u32 {
    let count = (count as usize).min(MAX_LEDS) as u32;
    let low = if count == 0 { 0 } else { u32::MAX >> (32 - count) };
    low << LED_BIT_OFFSET
}

/// Output-register bit for LED `index`, or 0 if `index >= MAX_LEDS`.
#[inline]
pub fn led_bit(index: u8) -> u32 {
    1u32.checked_shl(index as u32 + LED_BIT_OFFSET).unwrap_or(0) & led_mask(MAX_LEDS as u8)
}

/// Input-register bit for switch `index`, or 0 if outside `SWITCH_MASK`.
#[inline]
pub fn switch_bit(index: u8) -> u32 {
    1u32.checked_shl(index as u32).unwrap_or(0) & SWITCH_MASK
}

/// Test whether any bit of `mask` is set in `reg`.
#[inline]
pub fn get_bit(reg: u32, mask: u32) -> bool {
    reg & mask != 0
}

/// Set or clear the bits of `mask` in `reg`.
#[inline]
pub fn set_bit(reg: &mut u32, mask: u32, value: bool) {
    if value {
        *reg |= mask;
    } else {
        *reg &= !mask;
    }
}

/// Extract the LED states of the first `count` LEDs as a pool-aligned mask
/// (bit 0 = LED 0).
#[inline]
pub fn leds_from_output(reg: u32, count: u8) -> u32 {
    (reg & led_mask(count)) >> LED_BIT_OFFSET
}

// ─── Tests ──────────────────────────────────────────────────────────
