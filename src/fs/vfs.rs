//! Filesystem layer boundary.
//!
//! The session talks to the volume through [`FileSystem`], whose result codes
//! and open-mode bits follow the FatFs conventions used by the storage driver.
//! Path resolution and block I/O stay behind this trait.

use bitflags::bitflags;
use core::fmt;

/// Capacity of a logical drive path such as `"0:/"`.
pub const MOUNT_PATH_CAPACITY: usize = 4;

/// Logical drive identifier assigned when the storage driver is linked.
pub type MountPath = heapless::String<MOUNT_PATH_CAPACITY>;

/// Build a mount path, or `None` if `path` does not fit.
pub fn mount_path(path: &str) -> Option<MountPath> {
    let mut out = MountPath::new();
    out.push_str(path).ok()?;
    Some(out)
}

/// Native filesystem result code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsResult {
    Ok,
    DiskErr,
    IntErr,
    NotReady,
    NoFile,
    NoPath,
    InvalidName,
    Denied,
    Exist,
    InvalidObject,
    WriteProtected,
    InvalidDrive,
    NotEnabled,
    NoFilesystem,
    MkfsAborted,
    Timeout,
    Locked,
    NotEnoughCore,
    TooManyOpenFiles,
    InvalidParameter,
    /// Code outside the documented table.
    Unrecognized(u8),
}

impl FsResult {
    pub const fn from_raw(raw: u8) -> Self {
        match raw {
            0 => FsResult::Ok,
            1 => FsResult::DiskErr,
            2 => FsResult::IntErr,
            3 => FsResult::NotReady,
            4 => FsResult::NoFile,
            5 => FsResult::NoPath,
            6 => FsResult::InvalidName,
            7 => FsResult::Denied,
            8 => FsResult::Exist,
            9 => FsResult::InvalidObject,
            10 => FsResult::WriteProtected,
            11 => FsResult::InvalidDrive,
            12 => FsResult::NotEnabled,
            13 => FsResult::NoFilesystem,
            14 => FsResult::MkfsAborted,
            15 => FsResult::Timeout,
            16 => FsResult::Locked,
            17 => FsResult::NotEnoughCore,
            18 => FsResult::TooManyOpenFiles,
            19 => FsResult::InvalidParameter,
            other => FsResult::Unrecognized(other),
        }
    }

    pub const fn is_ok(self) -> bool {
        matches!(self, FsResult::Ok)
    }
}

impl fmt::Display for FsResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FsResult::Ok => write!(f, "succeeded"),
            FsResult::DiskErr => write!(f, "hard error in low level disk i/o"),
            FsResult::IntErr => write!(f, "assertion failed"),
            FsResult::NotReady => write!(f, "physical drive not ready"),
            FsResult::NoFile => write!(f, "file not found"),
            FsResult::NoPath => write!(f, "path not found"),
            FsResult::InvalidName => write!(f, "invalid path name"),
            FsResult::Denied => write!(f, "access denied"),
            FsResult::Exist => write!(f, "object already exists"),
            FsResult::InvalidObject => write!(f, "invalid file object"),
            FsResult::WriteProtected => write!(f, "drive write protected"),
            FsResult::InvalidDrive => write!(f, "invalid drive number"),
            FsResult::NotEnabled => write!(f, "volume has no work area"),
            FsResult::NoFilesystem => write!(f, "no valid filesystem"),
            FsResult::MkfsAborted => write!(f, "format aborted"),
            FsResult::Timeout => write!(f, "timed out waiting for volume access"),
            FsResult::Locked => write!(f, "rejected by file sharing policy"),
            FsResult::NotEnoughCore => write!(f, "working buffer could not be allocated"),
            FsResult::TooManyOpenFiles => write!(f, "too many open files"),
            FsResult::InvalidParameter => write!(f, "invalid parameter"),
            FsResult::Unrecognized(code) => write!(f, "unrecognized result {}", code),
        }
    }
}

bitflags! {
    /// Native open-mode bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct NativeOpenMode: u8 {
        const READ = 0x01;
        const WRITE = 0x02;
        /// Default disposition; has no bit of its own.
        const OPEN_EXISTING = 0x00;
        const CREATE_NEW = 0x04;
        const CREATE_ALWAYS = 0x08;
        const OPEN_ALWAYS = 0x10;
        /// Open always and position at end of file.
        const OPEN_APPEND = 0x30;
    }
}

impl Default for NativeOpenMode {
    fn default() -> Self {
        NativeOpenMode::empty()
    }
}

/// Volume driver used by a session.
///
/// Counts are reported through out-parameters so that a partial transfer can
/// be reported alongside a failing result.
pub trait FileSystem {
    /// Per-file state. A default value is a closed file.
    type File: Default;

    /// Link the storage driver and return its drive path.
    fn link_driver(&mut self) -> Option<MountPath>;

    /// Unlink the storage driver registered at `path`.
    fn unlink_driver(&mut self, path: &str) -> bool;

    fn mount(&mut self, path: &str) -> FsResult;

    fn open(&mut self, file: &mut Self::File, name: &str, mode: NativeOpenMode) -> FsResult;

    fn close(&mut self, file: &mut Self::File) -> FsResult;

    fn read(&mut self, file: &mut Self::File, buf: &mut [u8], read: &mut usize) -> FsResult;

    fn write(&mut self, file: &mut Self::File, buf: &[u8], written: &mut usize) -> FsResult;

    /// Move the read/write pointer to `offset` bytes from the start.
    fn seek(&mut self, file: &mut Self::File, offset: u64) -> FsResult;

    fn size(&self, file: &Self::File) -> u64;
}
