//! USB host mass-storage session manager.
//!
//! Brings a removable drive from attachment to a usable filesystem and keeps
//! track of the one file open on it:
//!
//! * [`drivers::usb`]: host stack boundary and the event-driven session state
//! * [`session`]: handle lifecycle and the readiness wait
//! * [`fs`]: volume boundary, open-mode translation, an in-memory volume
//! * [`error`]: the unified error taxonomy
//! * [`time`] and [`drivers::dwt`]: elapsed-time source
//!
//! ```
//! use usbms::drivers::usb::scripted::ScriptedHost;
//! use usbms::fs::{fat32::RamVolume, flags::OpenModeFlags};
//! use usbms::{Session, SessionConfig, StepCounter};
//!
//! let config = SessionConfig::new().with_clock_hz(1_000);
//! let mut session = Session::new(ScriptedHost::attached(), RamVolume::new(), StepCounter::new(1), config);
//! session.init()?;
//! session.wait_until_started(100)?;
//! let flags = OpenModeFlags::WRITE | OpenModeFlags::CREATE_OR_OPEN;
//! let written = session.open_write_close("log.txt", b"hello", flags, false)?;
//! assert_eq!(written, 5);
//! session.deinit()?;
//! # Ok::<(), usbms::UsbError>(())
//! ```

#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod api;
pub mod config;
pub mod drivers;
pub mod error;
pub mod fs;
pub mod session;
pub mod time;

pub use config::SessionConfig;
pub use drivers::usb::mass_storage::{SessionLink, SessionState};
pub use drivers::usb::{HostEvent, HostStatus, UsbHost};
pub use error::{diagnose, ErrorKind, UsbError, UsbResult};
pub use fs::flags::OpenModeFlags;
pub use fs::vfs::{FileSystem, FsResult, NativeOpenMode};
pub use session::Session;
pub use time::{CycleCounter, ElapsedTimer, StepCounter};
