//! USB host stack boundary.
//!
//! The host stack enumerates the device, binds the mass-storage class and
//! reports progress through discrete lifecycle events. Everything behind
//! [`UsbHost`] is a collaborator; this module only fixes its status codes and
//! event identifiers.

pub mod mass_storage;
pub mod scripted;

use alloc::sync::Arc;

use self::mass_storage::SessionLink;

/// Status returned by every host stack call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostStatus {
    Ok,
    Busy,
    Fail,
    NotSupported,
    UnrecoveredError,
    SpeedUnknown,
    /// Code outside the documented table.
    Unrecognized(u8),
}

impl HostStatus {
    pub const fn from_raw(raw: u8) -> Self {
        match raw {
            0 => HostStatus::Ok,
            1 => HostStatus::Busy,
            2 => HostStatus::Fail,
            3 => HostStatus::NotSupported,
            4 => HostStatus::UnrecoveredError,
            5 => HostStatus::SpeedUnknown,
            other => HostStatus::Unrecognized(other),
        }
    }

    pub const fn is_ok(self) -> bool {
        matches!(self, HostStatus::Ok)
    }
}

/// Lifecycle events raised by the host stack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum HostEvent {
    SelectConfiguration = 1,
    ClassActive = 2,
    ClassSelected = 3,
    Connection = 4,
    Disconnection = 5,
    UnrecoveredError = 6,
}

impl HostEvent {
    pub const fn from_raw(id: u8) -> Option<Self> {
        match id {
            1 => Some(HostEvent::SelectConfiguration),
            2 => Some(HostEvent::ClassActive),
            3 => Some(HostEvent::ClassSelected),
            4 => Some(HostEvent::Connection),
            5 => Some(HostEvent::Disconnection),
            6 => Some(HostEvent::UnrecoveredError),
            _ => None,
        }
    }
}

/// USB host stack driving one mass-storage device.
///
/// Events are delivered to the [`SessionLink`] handed over in [`UsbHost::init`],
/// either from [`UsbHost::process`] or from interrupt context.
pub trait UsbHost {
    /// Initialize the host library and bind its event callback to `link`.
    fn init(&mut self, link: Arc<SessionLink>) -> HostStatus;

    /// Register the mass-storage class driver.
    fn register_mass_storage(&mut self) -> HostStatus;

    /// Start the host process.
    fn start(&mut self) -> HostStatus;

    /// Run one step of the host background task.
    fn process(&mut self) -> HostStatus;
}
