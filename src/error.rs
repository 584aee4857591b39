//! Unified error taxonomy.
//!
//! Every session operation reports one [`ErrorKind`], regardless of whether the
//! failure came from argument validation, the USB host stack or the filesystem
//! layer. The two mapping functions are the only place that knows the native
//! result codes of both collaborators.

use alloc::format;
use alloc::string::String;
use core::fmt;
use core::panic::Location;

use crate::drivers::usb::HostStatus;
use crate::fs::vfs::FsResult;

/// Failure categories returned by the session API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NoError,
    /// No file is currently open on the handle.
    InterfaceClosed,
    ParamError,
    /// Storage driver could not be linked or unlinked.
    LinkError,
    NotSupported,
    FatalError,
    Busy,
    SpeedError,
    UnknownError,
    DiskError,
    InternalError,
    /// Drive not ready.
    FileNotRead,
    FileUnavailable,
    PathUnavailable,
    InvalidFileName,
    AccessDenied,
    FileExists,
    InvalidObject,
    FileWriteProtected,
    InvalidDrive,
    /// Volume has no work area, i.e. it is not mounted.
    NotEnabled,
    NoFilesystem,
    Timeout,
    ResourceLocked,
    NotEnoughCore,
    TooManyOpenFiles,
}

impl ErrorKind {
    pub const ALL: [ErrorKind; 26] = [
        ErrorKind::NoError,
        ErrorKind::InterfaceClosed,
        ErrorKind::ParamError,
        ErrorKind::LinkError,
        ErrorKind::NotSupported,
        ErrorKind::FatalError,
        ErrorKind::Busy,
        ErrorKind::SpeedError,
        ErrorKind::UnknownError,
        ErrorKind::DiskError,
        ErrorKind::InternalError,
        ErrorKind::FileNotRead,
        ErrorKind::FileUnavailable,
        ErrorKind::PathUnavailable,
        ErrorKind::InvalidFileName,
        ErrorKind::AccessDenied,
        ErrorKind::FileExists,
        ErrorKind::InvalidObject,
        ErrorKind::FileWriteProtected,
        ErrorKind::InvalidDrive,
        ErrorKind::NotEnabled,
        ErrorKind::NoFilesystem,
        ErrorKind::Timeout,
        ErrorKind::ResourceLocked,
        ErrorKind::NotEnoughCore,
        ErrorKind::TooManyOpenFiles,
    ];

    /// Upper-case name used in diagnostic lines.
    pub const fn name(self) -> &'static str {
        match self {
            ErrorKind::NoError => "NO_ERROR",
            ErrorKind::InterfaceClosed => "INTERFACE_CLOSED",
            ErrorKind::ParamError => "PARAM_ERROR",
            ErrorKind::LinkError => "LINK_ERROR",
            ErrorKind::NotSupported => "NOT_SUPPORTED",
            ErrorKind::FatalError => "FATAL_ERROR",
            ErrorKind::Busy => "BUSY",
            ErrorKind::SpeedError => "SPEED_ERROR",
            ErrorKind::UnknownError => "UNKNOWN_ERROR",
            ErrorKind::DiskError => "DISK_ERROR",
            ErrorKind::InternalError => "INTERNAL_ERROR",
            ErrorKind::FileNotRead => "FILE_NOT_READ",
            ErrorKind::FileUnavailable => "FILE_UNAVAILABLE",
            ErrorKind::PathUnavailable => "PATH_UNAVAILABLE",
            ErrorKind::InvalidFileName => "INVALID_FILE_NAME",
            ErrorKind::AccessDenied => "ACCESS_DENIED",
            ErrorKind::FileExists => "FILE_EXISTS",
            ErrorKind::InvalidObject => "INVALID_OBJECT",
            ErrorKind::FileWriteProtected => "FILE_WRITE_PROTECTED",
            ErrorKind::InvalidDrive => "INVALID_DRIVE",
            ErrorKind::NotEnabled => "NOT_ENABLED",
            ErrorKind::NoFilesystem => "NO_FILESYSTEM",
            ErrorKind::Timeout => "TIMEOUT",
            ErrorKind::ResourceLocked => "RESOURCE_LOCKED",
            ErrorKind::NotEnoughCore => "NOT_ENOUGH_CORE",
            ErrorKind::TooManyOpenFiles => "TOO_MANY_OPEN_FILES",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A failed operation: what went wrong and where it was reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsbError {
    kind: ErrorKind,
    site: &'static Location<'static>,
}

pub type UsbResult<T> = Result<T, UsbError>;

impl UsbError {
    /// Create an error attributed to the calling line.
    #[track_caller]
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind, site: Location::caller() }
    }

    /// Turn a mapped kind into a result; `NoError` becomes `Ok`.
    #[track_caller]
    pub fn check(kind: ErrorKind) -> UsbResult<()> {
        match kind {
            ErrorKind::NoError => Ok(()),
            kind => Err(Self::new(kind)),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Source line that produced the error.
    pub fn line(&self) -> u32 {
        self.site.line()
    }

    pub fn file(&self) -> &'static str {
        self.site.file()
    }

    /// Render as `"Line <n>: <KIND>"`.
    pub fn diagnose(&self) -> String {
        format!("{}", self)
    }
}

impl fmt::Display for UsbError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Line {}: {}", self.line(), self.kind.name())
    }
}

/// Diagnostic line for any operation result.
pub fn diagnose<T>(result: &UsbResult<T>) -> String {
    match result {
        Ok(_) => String::from(ErrorKind::NoError.name()),
        Err(e) => e.diagnose(),
    }
}

/// Map a USB host stack status to the unified taxonomy.
pub fn map_host_status(status: HostStatus) -> ErrorKind {
    match status {
        HostStatus::Ok => ErrorKind::NoError,
        HostStatus::Busy => ErrorKind::Busy,
        HostStatus::Fail => ErrorKind::FatalError,
        HostStatus::NotSupported => ErrorKind::NotSupported,
        HostStatus::UnrecoveredError => ErrorKind::FatalError,
        HostStatus::SpeedUnknown => ErrorKind::SpeedError,
        HostStatus::Unrecognized(_) => ErrorKind::UnknownError,
    }
}

/// Map a filesystem result code to the unified taxonomy.
pub fn map_fs_result(result: FsResult) -> ErrorKind {
    match result {
        FsResult::Ok => ErrorKind::NoError,
        FsResult::DiskErr => ErrorKind::DiskError,
        FsResult::IntErr => ErrorKind::InternalError,
        FsResult::NotReady => ErrorKind::FileNotRead,
        FsResult::NoFile => ErrorKind::FileUnavailable,
        FsResult::NoPath => ErrorKind::PathUnavailable,
        FsResult::InvalidName => ErrorKind::InvalidFileName,
        FsResult::Denied => ErrorKind::AccessDenied,
        FsResult::Exist => ErrorKind::FileExists,
        FsResult::InvalidObject => ErrorKind::InvalidObject,
        FsResult::WriteProtected => ErrorKind::FileWriteProtected,
        FsResult::InvalidDrive => ErrorKind::InvalidDrive,
        FsResult::NotEnabled => ErrorKind::NotEnabled,
        FsResult::NoFilesystem => ErrorKind::NoFilesystem,
        FsResult::Timeout => ErrorKind::Timeout,
        FsResult::Locked => ErrorKind::ResourceLocked,
        FsResult::NotEnoughCore => ErrorKind::NotEnoughCore,
        FsResult::TooManyOpenFiles => ErrorKind::TooManyOpenFiles,
        FsResult::MkfsAborted | FsResult::InvalidParameter | FsResult::Unrecognized(_) => {
            ErrorKind::UnknownError
        }
    }
}

impl From<HostStatus> for ErrorKind {
    fn from(status: HostStatus) -> Self {
        map_host_status(status)
    }
}

impl From<FsResult> for ErrorKind {
    fn from(result: FsResult) -> Self {
        map_fs_result(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_codes_map_like_the_driver_table() {
        let expected = [
            (0, ErrorKind::NoError),
            (1, ErrorKind::Busy),
            (2, ErrorKind::FatalError),
            (3, ErrorKind::NotSupported),
            (4, ErrorKind::FatalError),
            (5, ErrorKind::SpeedError),
        ];
        for (raw, kind) in expected {
            assert_eq!(map_host_status(HostStatus::from_raw(raw)), kind, "raw {}", raw);
        }
    }

    #[test]
    fn unknown_codes_never_map_to_success() {
        for raw in 6..=u8::MAX {
            assert_eq!(map_host_status(HostStatus::from_raw(raw)), ErrorKind::UnknownError);
        }
        for raw in [14u8, 19, 20, 200] {
            assert_eq!(map_fs_result(FsResult::from_raw(raw)), ErrorKind::UnknownError);
        }
    }

    #[test]
    fn only_fs_ok_maps_to_no_error() {
        for raw in 0..=u8::MAX {
            let kind = map_fs_result(FsResult::from_raw(raw));
            assert_eq!(kind == ErrorKind::NoError, raw == 0, "raw {}", raw);
        }
    }

    #[test]
    fn fs_codes_are_distinct() {
        let mut seen = alloc::vec::Vec::new();
        for raw in 1..=18u8 {
            if raw == 14 {
                continue;
            }
            let kind = map_fs_result(FsResult::from_raw(raw));
            assert_ne!(kind, ErrorKind::UnknownError, "raw {}", raw);
            assert!(!seen.contains(&kind), "raw {} maps to duplicate {:?}", raw, kind);
            seen.push(kind);
        }
        assert_eq!(seen.len(), 17);
    }

    #[test]
    fn diagnose_names_line_and_kind() {
        let line = line!() + 1;
        let err = UsbError::new(ErrorKind::Timeout);
        assert_eq!(err.line(), line);
        assert_eq!(err.diagnose(), alloc::format!("Line {}: TIMEOUT", line));
        assert_eq!(diagnose::<()>(&Ok(())), "NO_ERROR");
    }

    #[test]
    fn check_only_fails_on_errors() {
        assert!(UsbError::check(ErrorKind::NoError).is_ok());
        let err = UsbError::check(ErrorKind::Busy).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Busy);
    }

    #[test]
    fn names_are_unique() {
        for (i, a) in ErrorKind::ALL.iter().enumerate() {
            for b in &ErrorKind::ALL[i + 1..] {
                assert_ne!(a.name(), b.name());
            }
        }
    }
}
