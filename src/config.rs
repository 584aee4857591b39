//! Session configuration.

use crate::error::{ErrorKind, UsbError, UsbResult};

/// Core clock driving the cycle counter, about 13.88 ns per tick.
pub const DEFAULT_CLOCK_HZ: u32 = 72_000_000;

/// Readiness timeout used by [`crate::session::Session::wait_until_ready`].
pub const DEFAULT_START_TIMEOUT_MS: u32 = 5_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Cycle-counter frequency used to turn ticks into milliseconds.
    pub clock_hz: u32,
    pub start_timeout_ms: u32,
}

impl SessionConfig {
    pub const fn new() -> Self {
        Self { clock_hz: DEFAULT_CLOCK_HZ, start_timeout_ms: DEFAULT_START_TIMEOUT_MS }
    }

    pub const fn with_clock_hz(mut self, clock_hz: u32) -> Self {
        self.clock_hz = clock_hz;
        self
    }

    pub const fn with_start_timeout_ms(mut self, timeout_ms: u32) -> Self {
        self.start_timeout_ms = timeout_ms;
        self
    }

    pub fn validate(&self) -> UsbResult<()> {
        if self.clock_hz == 0 {
            return Err(UsbError::new(ErrorKind::ParamError));
        }
        Ok(())
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new()
    }
}
