//! Elapsed-time source.
//!
//! Wraps a free-running cycle counter and converts raw ticks into wall-clock
//! durations using the configured core clock frequency.

pub const NANOS_PER_SEC: u64 = 1_000_000_000;
pub const MILLIS_PER_SEC: u64 = 1_000;

/// A monotonic 32-bit hardware tick counter.
pub trait CycleCounter {
    fn enable(&mut self);
    fn reset(&mut self);
    fn read(&mut self) -> u32;
}

/// Convert ticks at `clock_hz` to whole milliseconds.
pub const fn ticks_to_ms(ticks: u32, clock_hz: u32) -> u32 {
    if clock_hz == 0 {
        return 0;
    }
    (ticks as u64 * MILLIS_PER_SEC / clock_hz as u64) as u32
}

/// Convert ticks at `clock_hz` to nanoseconds.
pub const fn ticks_to_ns(ticks: u32, clock_hz: u32) -> u64 {
    if clock_hz == 0 {
        return 0;
    }
    ticks as u64 * NANOS_PER_SEC / clock_hz as u64
}

/// Ticks at `clock_hz` spanning at least `ms` milliseconds.
pub const fn ms_to_ticks(ms: u32, clock_hz: u32) -> u64 {
    (ms as u64 * clock_hz as u64 + MILLIS_PER_SEC - 1) / MILLIS_PER_SEC
}

/// Stopwatch over a [`CycleCounter`].
pub struct ElapsedTimer<C> {
    counter: C,
    clock_hz: u32,
}

impl<C: CycleCounter> ElapsedTimer<C> {
    pub fn new(counter: C, clock_hz: u32) -> Self {
        Self { counter, clock_hz }
    }

    /// Reset and enable the counter, returning the first reading.
    pub fn start(&mut self) -> u32 {
        self.counter.reset();
        self.counter.enable();
        self.counter.read()
    }

    pub fn reset(&mut self) {
        self.counter.reset();
    }

    pub fn read(&mut self) -> u32 {
        self.counter.read()
    }

    /// Ticks since `since`, tolerating one counter wrap.
    pub fn elapsed_ticks(&mut self, since: u32) -> u32 {
        self.counter.read().wrapping_sub(since)
    }

    /// Ticks since the reading in `last`, which moves to the new reading.
    ///
    /// Summing laps measures spans longer than one counter period as long as
    /// consecutive readings are less than a period apart.
    pub fn lap_ticks(&mut self, last: &mut u32) -> u32 {
        let now = self.counter.read();
        let lap = now.wrapping_sub(*last);
        *last = now;
        lap
    }

    pub fn elapsed_ms(&mut self, since: u32) -> u32 {
        let ticks = self.elapsed_ticks(since);
        self.ticks_to_ms(ticks)
    }

    pub fn ticks_to_ms(&self, ticks: u32) -> u32 {
        ticks_to_ms(ticks, self.clock_hz)
    }

    pub fn ticks_to_ns(&self, ticks: u32) -> u64 {
        ticks_to_ns(ticks, self.clock_hz)
    }

    pub fn clock_hz(&self) -> u32 {
        self.clock_hz
    }

    pub fn counter(&self) -> &C {
        &self.counter
    }
}

/// Counter that advances by a fixed step on every read.
///
/// Stands in for the hardware counter on the host; one read corresponds to
/// one polling iteration.
#[derive(Debug, Clone)]
pub struct StepCounter {
    ticks: u32,
    step: u32,
    enabled: bool,
    reads: u32,
}

impl StepCounter {
    pub const fn new(step: u32) -> Self {
        Self { ticks: 0, step, enabled: false, reads: 0 }
    }

    pub fn reads(&self) -> u32 {
        self.reads
    }

    pub fn ticks(&self) -> u32 {
        self.ticks
    }

    pub fn set_ticks(&mut self, ticks: u32) {
        self.ticks = ticks;
    }
}

impl CycleCounter for StepCounter {
    fn enable(&mut self) {
        self.enabled = true;
    }

    fn reset(&mut self) {
        self.ticks = 0;
    }

    fn read(&mut self) -> u32 {
        let now = self.ticks;
        self.reads += 1;
        if self.enabled {
            self.ticks = self.ticks.wrapping_add(self.step);
        }
        now
    }
}
