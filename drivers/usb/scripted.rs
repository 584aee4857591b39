//! Scripted USB host for bring-up without hardware.
//!
//! Each call to [`UsbHost::process`] consumes one queued step and delivers its
//! event, if any, to the bound session link, the same way the real host
//! library raises its user callback from inside the background task.

use alloc::sync::Arc;

use heapless::Deque;
use log::trace;

use super::mass_storage::SessionLink;
use super::{HostEvent, HostStatus, UsbHost};

/// Queue capacity for scripted steps.
pub const SCRIPT_CAPACITY: usize = 32;

/// Attach sequence reported by a well-behaved mass-storage device.
pub const ENUMERATION: [HostEvent; 4] = [
    HostEvent::Connection,
    HostEvent::SelectConfiguration,
    HostEvent::ClassSelected,
    HostEvent::ClassActive,
];

pub struct ScriptedHost {
    link: Option<Arc<SessionLink>>,
    script: Deque<Option<HostEvent>, SCRIPT_CAPACITY>,
    init_status: HostStatus,
    register_status: HostStatus,
    start_status: HostStatus,
    class_registered: bool,
    started: bool,
    steps: u32,
}

impl ScriptedHost {
    pub const fn new() -> Self {
        Self {
            link: None,
            script: Deque::new(),
            init_status: HostStatus::Ok,
            register_status: HostStatus::Ok,
            start_status: HostStatus::Ok,
            class_registered: false,
            started: false,
            steps: 0,
        }
    }

    /// Host that enumerates a device right after start.
    pub fn attached() -> Self {
        let mut host = Self::new();
        host.enumerate();
        host
    }

    /// Queue an event for a later background step.
    pub fn push_event(&mut self, event: HostEvent) -> Result<(), HostEvent> {
        self.script
            .push_back(Some(event))
            .map_err(|_| event)
    }

    /// Queue `steps` background steps that report nothing.
    pub fn push_idle(&mut self, steps: usize) {
        for _ in 0..steps {
            if self.script.push_back(None).is_err() {
                break;
            }
        }
    }

    /// Queue the standard attach sequence.
    pub fn enumerate(&mut self) {
        for event in ENUMERATION {
            let _ = self.push_event(event);
        }
    }

    /// Deliver an event immediately, as an interrupt would.
    pub fn interrupt(&self, event: HostEvent) {
        if let Some(link) = &self.link {
            link.deliver(event);
        }
    }

    pub fn fail_init(&mut self, status: HostStatus) {
        self.init_status = status;
    }

    pub fn fail_register(&mut self, status: HostStatus) {
        self.register_status = status;
    }

    pub fn fail_start(&mut self, status: HostStatus) {
        self.start_status = status;
    }

    pub fn is_class_registered(&self) -> bool {
        self.class_registered
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Background steps run so far.
    pub fn steps(&self) -> u32 {
        self.steps
    }

    pub fn pending(&self) -> usize {
        self.script.len()
    }
}

impl Default for ScriptedHost {
    fn default() -> Self {
        Self::new()
    }
}

impl UsbHost for ScriptedHost {
    fn init(&mut self, link: Arc<SessionLink>) -> HostStatus {
        if self.init_status.is_ok() {
            self.link = Some(link);
        }
        self.init_status
    }

    fn register_mass_storage(&mut self) -> HostStatus {
        self.class_registered = self.register_status.is_ok();
        self.register_status
    }

    fn start(&mut self) -> HostStatus {
        self.started = self.start_status.is_ok();
        self.start_status
    }

    fn process(&mut self) -> HostStatus {
        self.steps = self.steps.wrapping_add(1);
        if !self.started {
            return HostStatus::Ok;
        }
        if let Some(Some(event)) = self.script.pop_front() {
            trace!("scripted host: step {} raises {:?}", self.steps, event);
            if let Some(link) = &self.link {
                link.deliver(event);
            }
        }
        HostStatus::Ok
    }
}
