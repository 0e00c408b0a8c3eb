//! Demo loop management.
//!
//! `DemoCore` drives a `Demo` at a fixed period until the cycle limit is
//! reached, the running flag is cleared, or a step fails.

use sonata_common::gpio::config::DemoConfig;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

use crate::demos::{Demo, DemoError};

/// Timing statistics for the demo loop.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TimingStats {
    /// Number of steps executed
    pub steps: u64,
    /// Steps that took longer than the period
    pub overruns: u64,
    /// Maximum observed step time
    pub max_step_us: u64,
    /// Sum of step times for average calculation
    pub total_step_us: u64,
}

impl TimingStats {
    /// Average step time in microseconds.
    pub fn avg_step_us(&self) -> u64 {
        self.total_step_us.checked_div(self.steps).unwrap_or(0)
    }

    fn record(&mut self, step_us: u64, period: Duration) {
        self.steps += 1;
        self.total_step_us += step_us;
        self.max_step_us = self.max_step_us.max(step_us);

        if u128::from(step_us) > period.as_micros() {
            self.overruns += 1;
            if self.overruns <= 10 || self.overruns % 1000 == 0 {
                warn!(
                    "Step overrun #{}: step took {}us (period {}us)",
                    self.overruns,
                    step_us,
                    period.as_micros()
                );
            }
        }
    }
}

/// Fixed-period demo loop.
pub struct DemoCore {
    period: Duration,
    /// 0 = unlimited
    cycles: u64,
    running: Arc<AtomicBool>,
    stats: TimingStats,
}

impl DemoCore {
    /// Create a loop with the period and cycle limit from `config`.
    pub fn new(config: &DemoConfig) -> Self {
        Self {
            period: Duration::from_millis(config.period_ms),
            cycles: config.cycles,
            running: Arc::new(AtomicBool::new(true)),
            stats: TimingStats::default(),
        }
    }

    /// Run `demo` until stopped.
    ///
    /// The running flag is armed at construction and never re-armed, so a
    /// shutdown requested before `run` is honoured and a core runs once.
    /// `stop` is called on the demo whether the loop ends normally or with an
    /// error, so dynamic demos always hand their LEDs back.
    ///
    /// # Errors
    /// Returns the first error from `start` or `step`.
    pub fn run(&mut self, demo: &mut dyn Demo) -> Result<(), DemoError> {
        info!(
            "Starting demo '{}' (period={}ms, cycles={})",
            demo.name(),
            self.period.as_millis(),
            if self.cycles == 0 {
                "unlimited".to_string()
            } else {
                self.cycles.to_string()
            }
        );

        let result = demo.start().and_then(|()| self.step_loop(demo));
        demo.stop();
        self.running.store(false, Ordering::SeqCst);

        match &result {
            Ok(()) => info!(
                "Demo '{}' stopped after {} steps (overruns: {})",
                demo.name(),
                self.stats.steps,
                self.stats.overruns
            ),
            Err(e) => error!("Demo '{}' failed after {} steps: {}", demo.name(), self.stats.steps, e),
        }
        result
    }

    fn step_loop(&mut self, demo: &mut dyn Demo) -> Result<(), DemoError> {
        while self.running.load(Ordering::SeqCst) {
            if self.cycles != 0 && self.stats.steps >= self.cycles {
                break;
            }

            let step_start = Instant::now();
            demo.step()?;

            let step_us = step_start.elapsed().as_micros() as u64;
            self.stats.record(step_us, self.period);

            if self.stats.steps % 1000 == 0 {
                debug!(
                    "Demo loop: {} steps, avg={}us, max={}us, overruns={}",
                    self.stats.steps,
                    self.stats.avg_step_us(),
                    self.stats.max_step_us,
                    self.stats.overruns
                );
            }

            // Skip the trailing sleep once the last cycle is done.
            if self.cycles != 0 && self.stats.steps >= self.cycles {
                break;
            }
            let elapsed = step_start.elapsed();
            if elapsed < self.period {
                std::thread::sleep(self.period - elapsed);
            }
        }
        Ok(())
    }

    /// Get the running flag for signal handlers.
    pub fn running_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    /// Get timing statistics.
    pub fn stats(&self) -> TimingStats {
        self.stats
    }
}
