//! Caller-facing open modes and their translation to native bits.

use bitflags::bitflags;

use super::vfs::NativeOpenMode;

bitflags! {
    /// How a file should be opened. Bits combine freely; none implies another,
    /// so `APPEND` alone does not grant write access.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct OpenModeFlags: u8 {
        const READ = 0x02;
        const WRITE = 0x04;
        /// Open if the file exists, fail otherwise.
        const OPEN_IF_EXISTS = 0x08;
        /// Create a new file, fail if it exists.
        const CREATE_NEW = 0x10;
        /// Always create, truncating an existing file.
        const OVERWRITE = 0x20;
        /// Open an existing file or create it.
        const CREATE_OR_OPEN = 0x40;
        /// Open or create and position at end of file.
        const APPEND = 0x80;
    }
}

const TRANSLATION: [(OpenModeFlags, NativeOpenMode); 7] = [
    (OpenModeFlags::READ, NativeOpenMode::READ),
    (OpenModeFlags::WRITE, NativeOpenMode::WRITE),
    (OpenModeFlags::OPEN_IF_EXISTS, NativeOpenMode::OPEN_EXISTING),
    (OpenModeFlags::CREATE_NEW, NativeOpenMode::CREATE_NEW),
    (OpenModeFlags::OVERWRITE, NativeOpenMode::CREATE_ALWAYS),
    (OpenModeFlags::CREATE_OR_OPEN, NativeOpenMode::OPEN_ALWAYS),
    (OpenModeFlags::APPEND, NativeOpenMode::OPEN_APPEND),
];

/// Map caller flags to the filesystem's native open mode.
pub fn translate(flags: OpenModeFlags) -> NativeOpenMode {
    let mut native = NativeOpenMode::empty();
    for (flag, bits) in TRANSLATION {
        if flags.intersects(flag) {
            native |= bits;
        }
    }
    native
}

impl From<OpenModeFlags> for NativeOpenMode {
    fn from(flags: OpenModeFlags) -> Self {
        translate(flags)
    }
}
