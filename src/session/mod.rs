//! Mass-storage session handle.
//!
//! A [`Session`] owns the host stack, the volume driver and the elapsed-time
//! source for one removable drive, and tracks the single file that may be
//! open on it. All methods run in the foreground context; only the
//! [`SessionLink`] is touched by the host stack's event context.

mod wait;

use alloc::sync::Arc;

use log::{debug, info, warn};

use crate::config::SessionConfig;
use crate::drivers::usb::mass_storage::{SessionLink, SessionState};
use crate::drivers::usb::{HostStatus, UsbHost};
use crate::error::{map_fs_result, map_host_status, ErrorKind, UsbError, UsbResult};
use crate::fs::flags::{translate, OpenModeFlags};
use crate::fs::vfs::{FileSystem, FsResult, MountPath};
use crate::time::{CycleCounter, ElapsedTimer};

#[track_caller]
fn host_call(status: HostStatus) -> UsbResult<()> {
    UsbError::check(map_host_status(status))
}

#[track_caller]
fn fs_call(result: FsResult) -> UsbResult<()> {
    UsbError::check(map_fs_result(result))
}

pub struct Session<H, F: FileSystem, C> {
    host: H,
    fs: F,
    timer: ElapsedTimer<C>,
    config: SessionConfig,
    link: Arc<SessionLink>,
    file: Option<F::File>,
    mount_path: MountPath,
    open: bool,
    linked: bool,
}

impl<H: UsbHost, F: FileSystem, C: CycleCounter> Session<H, F, C> {
    /// Assemble a session. Nothing touches the hardware until [`Session::init`].
    pub fn new(host: H, fs: F, counter: C, config: SessionConfig) -> Self {
        Self {
            host,
            fs,
            timer: ElapsedTimer::new(counter, config.clock_hz),
            config,
            link: Arc::new(SessionLink::new()),
            file: None,
            mount_path: MountPath::new(),
            open: false,
            linked: false,
        }
    }

    /// Link the storage driver and start the host stack.
    ///
    /// A file left open by an earlier run is closed first. On failure the
    /// session is unusable but [`Session::deinit`] remains safe to call.
    pub fn init(&mut self) -> UsbResult<()> {
        self.config.validate()?;
        self.sync_link();
        if self.open {
            self.close_file()?;
        }
        self.link.reset();
        self.open = false;
        self.file = Some(F::File::default());

        self.mount_path = match self.fs.link_driver() {
            Some(path) => path,
            None => {
                warn!("usb: storage driver link failed");
                return Err(UsbError::new(ErrorKind::LinkError));
            }
        };
        self.linked = true;

        host_call(self.host.init(self.link.clone()))?;
        host_call(self.host.register_mass_storage())?;
        host_call(self.host.start())?;
        info!("usb: host started, drive {}", self.mount_path);
        Ok(())
    }

    /// Close any open file, unlink the driver and release the file object.
    pub fn deinit(&mut self) -> UsbResult<()> {
        match self.close() {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::InterfaceClosed => {}
            Err(e) => return Err(e),
        }

        if self.linked {
            if !self.fs.unlink_driver(&self.mount_path) {
                warn!("usb: unlink of {} failed", self.mount_path);
                return Err(UsbError::new(ErrorKind::LinkError));
            }
            self.linked = false;
        }
        self.file = None;
        info!("usb: session released");
        Ok(())
    }

    /// Mount the volume on the session's drive.
    pub fn mount(&mut self) -> UsbResult<()> {
        fs_call(self.fs.mount(&self.mount_path))?;
        info!("usb: mounted {}", self.mount_path);
        Ok(())
    }

    pub fn open(&mut self, name: &str, flags: OpenModeFlags) -> UsbResult<()> {
        self.sync_link();
        let mode = translate(flags);
        let file = match self.file.as_mut() {
            Some(file) => file,
            None => return Err(UsbError::new(ErrorKind::InvalidObject)),
        };
        fs_call(self.fs.open(file, name, mode))?;
        self.open = true;
        debug!("usb: opened {} ({:?})", name, flags);
        Ok(())
    }

    pub fn close(&mut self) -> UsbResult<()> {
        self.sync_link();
        self.close_file()
    }

    /// Write `buf` to the open file and return the number of bytes written.
    ///
    /// With `append` the file pointer is first moved to the end of the file.
    pub fn write(&mut self, buf: &[u8], append: bool) -> UsbResult<usize> {
        self.sync_link();
        if !self.open {
            return Err(UsbError::new(ErrorKind::InterfaceClosed));
        }
        if append {
            self.seek_to_end()?;
        }
        let file = match self.file.as_mut() {
            Some(file) => file,
            None => return Err(UsbError::new(ErrorKind::InvalidObject)),
        };
        let mut written = 0;
        fs_call(self.fs.write(file, buf, &mut written))?;
        Ok(written)
    }

    /// Move the file pointer of the open file to its end.
    pub fn seek_to_end(&mut self) -> UsbResult<()> {
        if !self.open {
            return Err(UsbError::new(ErrorKind::InterfaceClosed));
        }
        let file = match self.file.as_mut() {
            Some(file) => file,
            None => return Err(UsbError::new(ErrorKind::InvalidObject)),
        };
        let end = self.fs.size(file);
        fs_call(self.fs.seek(file, end))
    }

    /// Read into `buf` and return the number of bytes read.
    ///
    /// Unlike [`Session::write`] this does not check for an open file; the
    /// volume driver reports the state of the file object itself.
    pub fn read(&mut self, buf: &mut [u8]) -> UsbResult<usize> {
        self.sync_link();
        let file = match self.file.as_mut() {
            Some(file) => file,
            None => return Err(UsbError::new(ErrorKind::InvalidObject)),
        };
        let mut read = 0;
        fs_call(self.fs.read(file, buf, &mut read))?;
        Ok(read)
    }

    /// Mount, open, append `buf` and close unless `keep_open` is set.
    ///
    /// Stops at the first failing step and returns its error.
    pub fn open_write_close(
        &mut self,
        name: &str,
        buf: &[u8],
        flags: OpenModeFlags,
        keep_open: bool,
    ) -> UsbResult<usize> {
        self.mount()?;
        self.open(name, flags)?;
        let written = self.write(buf, true)?;
        if !keep_open {
            self.close()?;
        }
        Ok(written)
    }

    /// Run one host background step and apply its side effects.
    pub fn poll(&mut self) -> UsbResult<()> {
        let status = self.host.process();
        self.sync_link();
        host_call(status)
    }

    pub fn state(&self) -> SessionState {
        self.link.state()
    }

    pub fn is_ready(&self) -> bool {
        self.state().is_ready()
    }

    /// A disconnect already delivered by the host stack counts as closed.
    pub fn is_open(&self) -> bool {
        self.open && !self.link.disconnect_pending()
    }

    pub fn mount_path(&self) -> &str {
        &self.mount_path
    }

    /// Event link to hand to an interrupt-driven host adapter.
    pub fn link(&self) -> Arc<SessionLink> {
        self.link.clone()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn filesystem(&self) -> &F {
        &self.fs
    }

    pub fn filesystem_mut(&mut self) -> &mut F {
        &mut self.fs
    }

    pub fn timer(&self) -> &ElapsedTimer<C> {
        &self.timer
    }

    fn close_file(&mut self) -> UsbResult<()> {
        if !self.open {
            return Err(UsbError::new(ErrorKind::InterfaceClosed));
        }
        let file = match self.file.as_mut() {
            Some(file) => file,
            None => return Err(UsbError::new(ErrorKind::InvalidObject)),
        };
        fs_call(self.fs.close(file))?;
        self.open = false;
        debug!("usb: file closed");
        Ok(())
    }

    /// Close the file if the device went away since the last check.
    fn sync_link(&mut self) {
        if !self.link.take_disconnect() || !self.open {
            return;
        }
        if let Err(e) = self.close_file() {
            warn!("usb: close after disconnect failed: {}", e);
            self.open = false;
        }
    }
}
