//! Cortex-M DWT cycle counter driver
//!
//! The Data Watchpoint and Trace unit exposes a free-running 32-bit cycle
//! counter (`CYCCNT`). It is the elapsed-time source used while waiting for a
//! mass-storage device to come up.

use core::fmt;
use volatile::Volatile;

use crate::time::CycleCounter;

/// DWT control register.
pub const DWT_CTRL: usize = 0xE000_1000;
/// DWT cycle count register.
pub const DWT_CYCCNT: usize = 0xE000_1004;

const CYCCNT_ENABLE: u32 = 0x4000_0001;
const CYCCNT_DISABLE: u32 = 0x4000_0000;

/// Memory mapped DWT counter
pub struct DwtCycleCounter {
    ctrl: &'static mut Volatile<u32>,
    cyccnt: &'static mut Volatile<u32>,
}

impl DwtCycleCounter {
    /// Counter at the architectural DWT addresses.
    ///
    /// # Safety
    /// Must run on a Cortex-M core with a DWT unit, and no other owner of the
    /// DWT registers may exist.
    pub unsafe fn new() -> Self {
        Self::at(DWT_CTRL, DWT_CYCCNT)
    }

    /// Counter with explicit register addresses.
    ///
    /// # Safety
    /// Both addresses must point to valid, exclusively owned `u32` registers
    /// for the rest of the program.
    pub unsafe fn at(ctrl: usize, cyccnt: usize) -> Self {
        Self {
            ctrl: &mut *(ctrl as *mut Volatile<u32>),
            cyccnt: &mut *(cyccnt as *mut Volatile<u32>),
        }
    }

    /// Stop counting. The current value is kept.
    pub fn disable(&mut self) {
        self.ctrl.write(CYCCNT_DISABLE);
    }
}

impl CycleCounter for DwtCycleCounter {
    fn enable(&mut self) {
        self.ctrl.write(CYCCNT_ENABLE);
    }

    fn reset(&mut self) {
        self.cyccnt.write(0);
    }

    fn read(&mut self) -> u32 {
        self.cyccnt.read()
    }
}

impl fmt::Debug for DwtCycleCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DwtCycleCounter")
            .field("ctrl", &self.ctrl.read())
            .field("cyccnt", &self.cyccnt.read())
            .finish()
    }
}
