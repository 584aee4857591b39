//! Readiness wait.
//!
//! Busy-polls the host background task until the mass-storage class reports
//! active or the deadline passes. There is no other cancellation.

use core::convert::Infallible;

use log::{debug, trace, warn};

use super::Session;
use crate::drivers::usb::UsbHost;
use crate::error::{ErrorKind, UsbError, UsbResult};
use crate::fs::vfs::FileSystem;
use crate::time::{ms_to_ticks, CycleCounter};

impl<H: UsbHost, F: FileSystem, C: CycleCounter> Session<H, F, C> {
    /// One non-blocking readiness step.
    ///
    /// Runs a single host background step unless the session is already
    /// started, then reports `WouldBlock` until the state is `Started`.
    /// Background step failures are not fatal to the wait.
    pub fn try_started(&mut self) -> nb::Result<(), Infallible> {
        if self.is_ready() {
            return Ok(());
        }
        if let Err(e) = self.poll() {
            trace!("usb: background step reported {}", e.kind());
        }
        if self.is_ready() {
            Ok(())
        } else {
            Err(nb::Error::WouldBlock)
        }
    }

    /// Poll until the session is started or `timeout_ms` have elapsed.
    pub fn wait_until_started(&mut self, timeout_ms: u32) -> UsbResult<()> {
        let deadline = ms_to_ticks(timeout_ms, self.timer.clock_hz());
        let mut last = self.timer.start();
        let mut elapsed = 0u64;
        loop {
            match self.try_started() {
                Ok(()) => {
                    debug!("usb: device ready");
                    return Ok(());
                }
                Err(nb::Error::WouldBlock) => {}
                Err(nb::Error::Other(never)) => match never {},
            }
            elapsed += u64::from(self.timer.lap_ticks(&mut last));
            if elapsed >= deadline {
                warn!("usb: no device ready after {} ms (state {:?})", timeout_ms, self.state());
                return Err(UsbError::new(ErrorKind::Timeout));
            }
        }
    }

    /// [`Session::wait_until_started`] with the configured timeout.
    pub fn wait_until_ready(&mut self) -> UsbResult<()> {
        self.wait_until_started(self.config.start_timeout_ms)
    }
}
