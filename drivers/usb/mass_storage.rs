//! USB Mass Storage session link.
//!
//! The link is the only state shared between the host stack's event context
//! and the foreground caller. It holds the session state as a single atomic
//! byte plus a flag telling the foreground that the device went away while a
//! file may still be open.

use alloc::sync::Arc;
use core::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use lazy_static::lazy_static;
use log::{debug, trace, warn};
use spin::Mutex;

use super::HostEvent;

/// Connection state of a mass-storage session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SessionState {
    Idle = 0,
    Started = 1,
    Running = 2,
    SelectingConfig = 3,
    UserConnectionPending = 4,
    ClassSelected = 5,
    /// Terminal until the session is deinitialized and initialized again.
    Unrecovered = 6,
}

impl SessionState {
    const fn from_u8(raw: u8) -> Self {
        match raw {
            0 => SessionState::Idle,
            1 => SessionState::Started,
            2 => SessionState::Running,
            3 => SessionState::SelectingConfig,
            4 => SessionState::UserConnectionPending,
            5 => SessionState::ClassSelected,
            _ => SessionState::Unrecovered,
        }
    }

    /// The storage class is bound and file operations may run.
    pub const fn is_ready(self) -> bool {
        matches!(self, SessionState::Started)
    }
}

impl HostEvent {
    /// State entered when this event is delivered.
    pub const fn target_state(self) -> SessionState {
        match self {
            HostEvent::UnrecoveredError => SessionState::Unrecovered,
            HostEvent::Disconnection => SessionState::Idle,
            HostEvent::ClassActive => SessionState::Started,
            HostEvent::Connection => SessionState::UserConnectionPending,
            HostEvent::SelectConfiguration => SessionState::SelectingConfig,
            HostEvent::ClassSelected => SessionState::ClassSelected,
        }
    }
}

/// Event sink shared between the host stack and the owning session.
#[derive(Debug)]
pub struct SessionLink {
    state: AtomicU8,
    disconnect_pending: AtomicBool,
}

impl SessionLink {
    pub const fn new() -> Self {
        Self {
            state: AtomicU8::new(SessionState::Idle as u8),
            disconnect_pending: AtomicBool::new(false),
        }
    }

    pub fn state(&self) -> SessionState {
        SessionState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Back to `Idle` with no pending disconnect. Only called while the host
    /// stack is not yet delivering events.
    pub fn reset(&self) {
        self.disconnect_pending.store(false, Ordering::Release);
        self.state.store(SessionState::Idle as u8, Ordering::Release);
    }

    /// Apply one lifecycle event and return the resulting state.
    ///
    /// Safe to call from interrupt context: it never blocks and touches
    /// nothing but the two atomics.
    pub fn deliver(&self, event: HostEvent) -> SessionState {
        let current = self.state();
        if current == SessionState::Unrecovered {
            trace!("usb: dropping {:?}, session unrecovered", event);
            return current;
        }

        let next = event.target_state();
        if event == HostEvent::Disconnection {
            self.disconnect_pending.store(true, Ordering::Release);
        }
        self.state.store(next as u8, Ordering::Release);
        debug!("usb: {:?} -> {:?} ({:?})", current, next, event);
        next
    }

    /// Deliver an event by its raw host stack identifier.
    pub fn deliver_raw(&self, event_id: u8) -> SessionState {
        match HostEvent::from_raw(event_id) {
            Some(event) => self.deliver(event),
            None => {
                trace!("usb: ignoring unknown event id {}", event_id);
                self.state()
            }
        }
    }

    /// A disconnect was delivered and the foreground has not handled it yet.
    pub fn disconnect_pending(&self) -> bool {
        self.disconnect_pending.load(Ordering::Acquire)
    }

    /// Consume the disconnect notification, if one is pending.
    pub fn take_disconnect(&self) -> bool {
        self.disconnect_pending.swap(false, Ordering::AcqRel)
    }
}

impl Default for SessionLink {
    fn default() -> Self {
        Self::new()
    }
}

lazy_static! {
    /// Link that the interrupt hand-off forwards to.
    static ref BOUND_LINK: Mutex<Option<Arc<SessionLink>>> = Mutex::new(None);
}

/// Route [`dispatch`] to `link`, replacing any previously bound session.
pub fn bind(link: Arc<SessionLink>) {
    *BOUND_LINK.lock() = Some(link);
}

/// Stop routing to `link`. A different bound link is left untouched.
pub fn unbind(link: &Arc<SessionLink>) {
    let mut bound = BOUND_LINK.lock();
    if matches!(&*bound, Some(b) if Arc::ptr_eq(b, link)) {
        *bound = None;
    }
}

/// Process-wide entry point for the host stack's user callback.
///
/// Returns the new state, or `None` when the event was dropped because no
/// session is bound or the slot is being rebound by the foreground.
pub fn dispatch(event_id: u8) -> Option<SessionState> {
    let bound = match BOUND_LINK.try_lock() {
        Some(guard) => guard,
        None => {
            warn!("usb: event {} dropped, dispatch slot busy", event_id);
            return None;
        }
    };
    (*bound).as_ref().map(|link| link.deliver_raw(event_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transition_table() {
        let link = SessionLink::new();
        let table = [
            (HostEvent::Connection, SessionState::UserConnectionPending),
            (HostEvent::SelectConfiguration, SessionState::SelectingConfig),
            (HostEvent::ClassSelected, SessionState::ClassSelected),
            (HostEvent::ClassActive, SessionState::Started),
            (HostEvent::Disconnection, SessionState::Idle),
            (HostEvent::UnrecoveredError, SessionState::Unrecovered),
        ];
        for (event, state) in table {
            assert_eq!(link.deliver(event), state);
            assert_eq!(link.state(), state);
        }
    }

    #[test]
    fn unrecovered_is_sticky_until_reset() {
        let link = SessionLink::new();
        link.deliver(HostEvent::UnrecoveredError);
        assert_eq!(link.deliver(HostEvent::ClassActive), SessionState::Unrecovered);
        assert_eq!(link.deliver(HostEvent::Disconnection), SessionState::Unrecovered);
        assert!(!link.take_disconnect());

        link.reset();
        assert_eq!(link.state(), SessionState::Idle);
        assert_eq!(link.deliver(HostEvent::ClassActive), SessionState::Started);
    }

    #[test]
    fn disconnect_flag_is_consumed_once() {
        let link = SessionLink::new();
        link.deliver(HostEvent::ClassActive);
        link.deliver(HostEvent::Disconnection);
        link.deliver(HostEvent::Connection);
        assert!(link.disconnect_pending());
        assert!(link.take_disconnect());
        assert!(!link.disconnect_pending());
        assert!(!link.take_disconnect());
        assert_eq!(link.state(), SessionState::UserConnectionPending);
    }

    #[test]
    fn unknown_raw_event_is_ignored() {
        let link = SessionLink::new();
        link.deliver(HostEvent::Connection);
        assert_eq!(link.deliver_raw(0), SessionState::UserConnectionPending);
        assert_eq!(link.deliver_raw(99), SessionState::UserConnectionPending);
    }

    // The only test touching the process-wide slot.
    #[test]
    fn dispatch_requires_bound_link() {
        let link = Arc::new(SessionLink::new());
        let other = Arc::new(SessionLink::new());

        assert_eq!(dispatch(HostEvent::ClassActive as u8), None);

        bind(link.clone());
        assert_eq!(dispatch(HostEvent::ClassActive as u8), Some(SessionState::Started));
        assert_eq!(link.state(), SessionState::Started);

        unbind(&other);
        assert_eq!(dispatch(HostEvent::Connection as u8), Some(SessionState::UserConnectionPending));

        unbind(&link);
        assert_eq!(dispatch(HostEvent::Disconnection as u8), None);
        assert_eq!(link.state(), SessionState::UserConnectionPending);
        assert_eq!(other.state(), SessionState::Idle);
    }
}
