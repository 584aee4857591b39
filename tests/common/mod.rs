#![allow(dead_code)]

use usbms::drivers::usb::scripted::ScriptedHost;
use usbms::fs::fat32::RamVolume;
use usbms::{Session, SessionConfig, StepCounter};

pub type TestSession = Session<ScriptedHost, RamVolume, StepCounter>;

pub const CLOCK_HZ: u32 = 72_000_000;
/// Counter step giving one millisecond per read.
pub const TICKS_PER_MS: u32 = CLOCK_HZ / 1_000;

pub fn session(host: ScriptedHost, fs: RamVolume) -> TestSession {
    let config = SessionConfig::new().with_clock_hz(CLOCK_HZ).with_start_timeout_ms(200);
    Session::new(host, fs, StepCounter::new(TICKS_PER_MS), config)
}

/// Initialized, started and mounted session on an empty volume.
pub fn mounted_session() -> TestSession {
    let mut s = session(ScriptedHost::attached(), RamVolume::new());
    s.init().expect("init");
    s.wait_until_ready().expect("ready");
    s.mount().expect("mount");
    s
}
