//! LED demos.
//!
//! Each demo is a small state machine stepped by `DemoCore` once per
//! period. Raw demos write the board directly and can trample LEDs owned by
//! someone else; dynamic demos go through the `LedRegistry` and fail hard on
//! any rejected handle.

use crate::registry::{LedRegistry, RegistryError};
use crate::token::SealedLedHandle;
use sonata_common::consts::MAX_LEDS;
use sonata_common::gpio::board::GpioBoard;
use sonata_common::gpio::config::{DemoConfig, DemoKind};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// LED whose handle `led_walk_dynamic` releases and re-acquires on start.
const REACQUIRED_LED: usize = 3;

/// Demo failures. All are fatal for the running demo.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DemoError {
    /// An acquire or release was refused.
    #[error("LED registry error: {0}")]
    Registry(#[from] RegistryError),

    /// A held handle failed to toggle its LED.
    #[error("Failed to toggle LED {0}")]
    ToggleRejected(u8),

    /// `step` called without a successful `start`.
    #[error("Demo '{0}' stepped before start")]
    NotStarted(&'static str),
}

/// A steppable LED demo.
pub trait Demo: Send {
    /// Demo name, as used in configuration.
    fn name(&self) -> &'static str;

    /// Acquire resources. Called once before the first step.
    fn start(&mut self) -> Result<(), DemoError> {
        Ok(())
    }

    /// Advance the pattern by one step.
    fn step(&mut self) -> Result<(), DemoError>;

    /// Release resources. Safe to call more than once.
    fn stop(&mut self) {}
}

/// Build the demo selected by `config`.
pub fn create_demo(
    config: &DemoConfig,
    board: Arc<dyn GpioBoard>,
    registry: Arc<LedRegistry>,
) -> Box<dyn Demo> {
    match config.kind {
        DemoKind::BlinkyRaw => Box::new(BlinkyRaw::new(board, config.led_index)),
        DemoKind::BlinkyDynamic => Box::new(BlinkyDynamic::new(registry, config.led_index)),
        DemoKind::LedWalkRaw => Box::new(LedWalkRaw::new(board)),
        DemoKind::LedWalkDynamic => Box::new(LedWalkDynamic::new(registry)),
        DemoKind::LedWalkFill => Box::new(LedWalkFill::new(board)),
    }
}

// ─── Raw demos ──────────────────────────────────────────────────────

/// Blink one LED by writing the register directly.
pub struct BlinkyRaw {
    board: Arc<dyn GpioBoard>,
    led: u8,
}

impl BlinkyRaw {
    /// Blink `led` on `board`.
    pub fn new(board: Arc<dyn GpioBoard>, led: u8) -> Self {
        Self { board, led }
    }
}

impl Demo for BlinkyRaw {
    fn name(&self) -> &'static str {
        DemoKind::BlinkyRaw.as_str()
    }

    fn start(&mut self) -> Result<(), DemoError> {
        info!("Look a blinking LED!");
        Ok(())
    }

    fn step(&mut self) -> Result<(), DemoError> {
        self.board.led_toggle(self.led);
        Ok(())
    }
}

/// Toggle LEDs from the highest index down to 0, wrapping.
pub struct LedWalkRaw {
    board: Arc<dyn GpioBoard>,
    next: u8,
}

impl LedWalkRaw {
    /// Walk every LED of `board`.
    pub fn new(board: Arc<dyn GpioBoard>) -> Self {
        let next = board.led_count().saturating_sub(1);
        Self { board, next }
    }
}

impl Demo for LedWalkRaw {
    fn name(&self) -> &'static str {
        DemoKind::LedWalkRaw.as_str()
    }

    fn start(&mut self) -> Result<(), DemoError> {
        info!("Look pretty LEDs!");
        Ok(())
    }

    fn step(&mut self) -> Result<(), DemoError> {
        self.board.led_toggle(self.next);
        self.next = match self.next {
            0 => self.board.led_count().saturating_sub(1),
            n => n - 1,
        };
        Ok(())
    }
}

/// Light LEDs one per step until all are on, then switch them off the
/// same way.
pub struct LedWalkFill {
    board: Arc<dyn GpioBoard>,
    position: u8,
    lighting: bool,
}

impl LedWalkFill {
    /// Fill every LED of `board`.
    pub fn new(board: Arc<dyn GpioBoard>) -> Self {
        Self {
            board,
            position: 0,
            lighting: true,
        }
    }
}

impl Demo for LedWalkFill {
    fn name(&self) -> &'static str {
        DemoKind::LedWalkFill.as_str()
    }

    fn start(&mut self) -> Result<(), DemoError> {
        info!("Look pretty LEDs!");
        Ok(())
    }

    fn step(&mut self) -> Result<(), DemoError> {
        let last = self.board.led_count().saturating_sub(1);
        self.board.set_led(self.position, self.lighting);
        if self.position == last {
            self.lighting = !self.lighting;
            self.position = 0;
        } else {
            self.position += 1;
        }
        Ok(())
    }
}

// ─── Dynamic demos ──────────────────────────────────────────────────

/// Blink one LED through an acquired handle.
pub struct BlinkyDynamic {
    registry: Arc<LedRegistry>,
    led: u8,
    handle: Option<SealedLedHandle>,
}

impl BlinkyDynamic {
    /// Blink `led` once it has been acquired from `registry`.
    pub fn new(registry: Arc<LedRegistry>, led: u8) -> Self {
        Self {
            registry,
            led,
            handle: None,
        }
    }
}

impl Demo for BlinkyDynamic {
    fn name(&self) -> &'static str {
        DemoKind::BlinkyDynamic.as_str()
    }

    fn start(&mut self) -> Result<(), DemoError> {
        let handle = self.registry.acquire(self.led)?;
        info!("Acquired LED {}: {}", self.led, handle);
        self.handle = Some(handle);
        Ok(())
    }

    fn step(&mut self) -> Result<(), DemoError> {
        let handle = self.handle.as_ref().ok_or(DemoError::NotStarted(self.name()))?;
        if !self.registry.toggle(handle) {
            return Err(DemoError::ToggleRejected(self.led));
        }
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.registry.release(&handle);
        }
    }
}

/// Acquire every LED, swap LED 3's handle for a fresh one, then toggle the
/// LEDs in order through their handles.
pub struct LedWalkDynamic {
    registry: Arc<LedRegistry>,
    handles: heapless::Vec<SealedLedHandle, MAX_LEDS>,
    next: usize,
}

impl LedWalkDynamic {
    /// Walk every LED of `registry`.
    pub fn new(registry: Arc<LedRegistry>) -> Self {
        Self {
            registry,
            handles: heapless::Vec::new(),
            next: 0,
        }
    }

    /// Handles currently held, in LED order.
    pub fn handles(&self) -> &[SealedLedHandle] {
        &self.handles
    }

    fn acquire_all(&mut self) -> Result<(), DemoError> {
        for index in 0..self.registry.capacity() {
            let handle = self.registry.acquire(index)?;
            if let Err(handle) = self.handles.push(handle) {
                self.registry.release(&handle);
                return Err(RegistryError::OutOfRange {
                    index,
                    count: MAX_LEDS as u8,
                }
                .into());
            }
        }

        if let Some(old) = self.handles.get(REACQUIRED_LED) {
            info!("          LED {} Handle: {}", REACQUIRED_LED, old);
            self.registry.try_release(old)?;
            info!("Destroyed LED {} Handle: {}", REACQUIRED_LED, old);
            let fresh = self.registry.acquire(REACQUIRED_LED as u8)?;
            info!("      New LED {} Handle: {}", REACQUIRED_LED, fresh);
            self.handles[REACQUIRED_LED] = fresh;
        }
        Ok(())
    }
}

impl Demo for LedWalkDynamic {
    fn name(&self) -> &'static str {
        DemoKind::LedWalkDynamic.as_str()
    }

    fn start(&mut self) -> Result<(), DemoError> {
        let result = self.acquire_all();
        if result.is_err() {
            self.stop();
        }
        result
    }

    fn step(&mut self) -> Result<(), DemoError> {
        let handle = self
            .handles
            .get(self.next)
            .ok_or(DemoError::NotStarted(self.name()))?;
        if !self.registry.toggle(handle) {
            return Err(DemoError::ToggleRejected(handle.index()));
        }
        self.next = (self.next + 1) % self.handles.len();
        Ok(())
    }

    fn stop(&mut self) {
        while let Some(handle) = self.handles.pop() {
            self.registry.release(&handle);
        }
        self.next = 0;
    }
}
