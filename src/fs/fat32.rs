//! In-memory FAT volume.
//!
//! Reproduces the FatFs behaviour the session depends on (open dispositions,
//! access checks, seek semantics, result codes) over file contents held in
//! RAM. Directories and on-disk structures are out of scope; names are flat
//! within the volume.

use alloc::{collections::BTreeMap, string::String, string::ToString, sync::Arc, vec::Vec};
use spin::RwLock;

use super::vfs::{mount_path, FileSystem, FsResult, MountPath, NativeOpenMode};

/// Drive path handed out when the driver is linked.
pub const DRIVE_PATH: &str = "0:/";

type FileData = Arc<RwLock<Vec<u8>>>;

/// Open file on a [`RamVolume`].
#[derive(Default)]
pub struct RamFile {
    data: Option<FileData>,
    pos: u64,
    mode: NativeOpenMode,
}

impl RamFile {
    pub fn is_open(&self) -> bool {
        self.data.is_some()
    }

    pub fn position(&self) -> u64 {
        self.pos
    }
}

/// RAM-backed volume with FatFs result semantics.
pub struct RamVolume {
    files: RwLock<BTreeMap<String, FileData>>,
    linked: Option<MountPath>,
    mounted: bool,
    write_protected: bool,
    max_open: usize,
    open_files: usize,
}

impl RamVolume {
    pub fn new() -> Self {
        Self {
            files: RwLock::new(BTreeMap::new()),
            linked: None,
            mounted: false,
            write_protected: false,
            max_open: 4,
            open_files: 0,
        }
    }

    /// Pre-populate a file.
    pub fn with_file(self, name: &str, contents: &[u8]) -> Self {
        self.files
            .write()
            .insert(name.to_string(), Arc::new(RwLock::new(contents.to_vec())));
        self
    }

    pub fn set_write_protected(&mut self, protected: bool) {
        self.write_protected = protected;
    }

    pub fn set_max_open(&mut self, max_open: usize) {
        self.max_open = max_open;
    }

    pub fn contents(&self, name: &str) -> Option<Vec<u8>> {
        self.files.read().get(name).map(|data| data.read().clone())
    }

    pub fn is_linked(&self) -> bool {
        self.linked.is_some()
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn open_files(&self) -> usize {
        self.open_files
    }

    /// Strip the drive prefix from `name`, validating both parts.
    fn resolve<'a>(&self, name: &'a str) -> Result<&'a str, FsResult> {
        let local = match name.split_once(':') {
            Some((drive, rest)) => {
                let linked = self.linked.as_deref().unwrap_or(DRIVE_PATH);
                if !linked.starts_with(drive) || drive.is_empty() {
                    return Err(FsResult::InvalidDrive);
                }
                rest
            }
            None => name,
        };
        let local = local.trim_start_matches('/');
        if local.is_empty() {
            return Err(FsResult::InvalidName);
        }
        if local.contains('/') {
            return Err(FsResult::NoPath);
        }
        if local.chars().any(|c| matches!(c, '"' | '*' | '<' | '>' | '?' | '|' | '\\') || c.is_control()) {
            return Err(FsResult::InvalidName);
        }
        Ok(local)
    }
}

impl Default for RamVolume {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSystem for RamVolume {
    type File = RamFile;

    fn link_driver(&mut self) -> Option<MountPath> {
        if self.linked.is_some() {
            return None;
        }
        let path = mount_path(DRIVE_PATH)?;
        self.linked = Some(path.clone());
        Some(path)
    }

    fn unlink_driver(&mut self, path: &str) -> bool {
        match &self.linked {
            Some(linked) if linked.as_str() == path => {
                self.linked = None;
                self.mounted = false;
                true
            }
            _ => false,
        }
    }

    fn mount(&mut self, path: &str) -> FsResult {
        match &self.linked {
            Some(linked) if linked.as_str() == path => {
                self.mounted = true;
                FsResult::Ok
            }
            _ => FsResult::InvalidDrive,
        }
    }

    fn open(&mut self, file: &mut RamFile, name: &str, mode: NativeOpenMode) -> FsResult {
        if !self.mounted {
            return FsResult::NotEnabled;
        }
        let local = match self.resolve(name) {
            Ok(local) => local,
            Err(res) => return res,
        };
        let creates = mode.intersects(
            NativeOpenMode::CREATE_NEW | NativeOpenMode::CREATE_ALWAYS | NativeOpenMode::OPEN_ALWAYS,
        );
        if self.write_protected && (creates || mode.contains(NativeOpenMode::WRITE)) {
            return FsResult::WriteProtected;
        }
        if file.data.is_none() && self.open_files >= self.max_open {
            return FsResult::TooManyOpenFiles;
        }

        let mut files = self.files.write();
        let data = match files.get(local).cloned() {
            Some(_) if mode.contains(NativeOpenMode::CREATE_NEW) => return FsResult::Exist,
            Some(data) => {
                if mode.contains(NativeOpenMode::CREATE_ALWAYS) {
                    data.write().clear();
                }
                data
            }
            None if creates => {
                let data: FileData = Arc::new(RwLock::new(Vec::new()));
                files.insert(local.to_string(), data.clone());
                data
            }
            None => return FsResult::NoFile,
        };

        let pos = if mode.contains(NativeOpenMode::OPEN_APPEND) {
            data.read().len() as u64
        } else {
            0
        };
        if file.data.is_none() {
            self.open_files += 1;
        }
        *file = RamFile { data: Some(data), pos, mode };
        FsResult::Ok
    }

    fn close(&mut self, file: &mut RamFile) -> FsResult {
        if file.data.take().is_none() {
            return FsResult::InvalidObject;
        }
        self.open_files = self.open_files.saturating_sub(1);
        file.pos = 0;
        FsResult::Ok
    }

    fn read(&mut self, file: &mut RamFile, buf: &mut [u8], read: &mut usize) -> FsResult {
        *read = 0;
        let data = match &file.data {
            Some(data) => data,
            None => return FsResult::InvalidObject,
        };
        if !file.mode.contains(NativeOpenMode::READ) {
            return FsResult::Denied;
        }
        let data = data.read();
        let start = core::cmp::min(file.pos as usize, data.len());
        let end = core::cmp::min(data.len(), start + buf.len());
        let slice = &data[start..end];
        buf[..slice.len()].copy_from_slice(slice);
        file.pos += slice.len() as u64;
        *read = slice.len();
        FsResult::Ok
    }

    fn write(&mut self, file: &mut RamFile, buf: &[u8], written: &mut usize) -> FsResult {
        *written = 0;
        let data = match &file.data {
            Some(data) => data,
            None => return FsResult::InvalidObject,
        };
        if !file.mode.contains(NativeOpenMode::WRITE) {
            return FsResult::Denied;
        }
        if self.write_protected {
            return FsResult::WriteProtected;
        }
        let mut data = data.write();
        let offset = file.pos as usize;
        if offset + buf.len() > data.len() {
            data.resize(offset + buf.len(), 0);
        }
        data[offset..offset + buf.len()].copy_from_slice(buf);
        file.pos += buf.len() as u64;
        *written = buf.len();
        FsResult::Ok
    }

    fn seek(&mut self, file: &mut RamFile, offset: u64) -> FsResult {
        let data = match &file.data {
            Some(data) => data,
            None => return FsResult::InvalidObject,
        };
        let mut data = data.write();
        let len = data.len() as u64;
        if offset > len {
            if file.mode.contains(NativeOpenMode::WRITE) && !self.write_protected {
                // Seeking past the end in write mode expands the file.
                data.resize(offset as usize, 0);
                file.pos = offset;
            } else {
                file.pos = len;
            }
        } else {
            file.pos = offset;
        }
        FsResult::Ok
    }

    fn size(&self, file: &RamFile) -> u64 {
        file.data.as_ref().map_or(0, |data| data.read().len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mounted() -> RamVolume {
        let mut vol = RamVolume::new();
        let path = vol.link_driver().unwrap();
        assert_eq!(vol.mount(&path), FsResult::Ok);
        vol
    }

    #[test]
    fn link_is_exclusive() {
        let mut vol = RamVolume::new();
        assert_eq!(vol.link_driver().as_deref(), Some(DRIVE_PATH));
        assert!(vol.link_driver().is_none());
        assert!(!vol.unlink_driver("1:/"));
        assert!(vol.unlink_driver(DRIVE_PATH));
        assert!(!vol.is_linked());
    }

    #[test]
    fn open_before_mount_is_not_enabled() {
        let mut vol = RamVolume::new();
        vol.link_driver();
        let mut file = RamFile::default();
        assert_eq!(vol.open(&mut file, "a.txt", NativeOpenMode::OPEN_ALWAYS), FsResult::NotEnabled);
    }

    #[test]
    fn dispositions() {
        let mut vol = mounted().with_file("old.txt", b"abc");
        let mut file = RamFile::default();

        assert_eq!(vol.open(&mut file, "new.txt", NativeOpenMode::READ), FsResult::NoFile);
        assert_eq!(vol.open(&mut file, "old.txt", NativeOpenMode::CREATE_NEW), FsResult::Exist);
        assert_eq!(vol.open(&mut file, "0:/old.txt", NativeOpenMode::READ), FsResult::Ok);
        assert_eq!(vol.close(&mut file), FsResult::Ok);

        let mode = NativeOpenMode::WRITE | NativeOpenMode::CREATE_ALWAYS;
        assert_eq!(vol.open(&mut file, "old.txt", mode), FsResult::Ok);
        assert_eq!(vol.size(&file), 0);
        assert_eq!(vol.close(&mut file), FsResult::Ok);
        assert_eq!(vol.close(&mut file), FsResult::InvalidObject);
    }

    #[test]
    fn append_mode_starts_at_end() {
        let mut vol = mounted().with_file("log.txt", b"12345");
        let mut file = RamFile::default();
        let mode = NativeOpenMode::WRITE | NativeOpenMode::OPEN_APPEND;
        assert_eq!(vol.open(&mut file, "log.txt", mode), FsResult::Ok);
        assert_eq!(file.position(), 5);
        let mut n = 0;
        assert_eq!(vol.write(&mut file, b"67", &mut n), FsResult::Ok);
        assert_eq!(n, 2);
        assert_eq!(vol.contents("log.txt").unwrap(), b"1234567");
    }

    #[test]
    fn access_is_checked_per_direction() {
        let mut vol = mounted().with_file("ro.txt", b"data");
        let mut file = RamFile::default();
        assert_eq!(vol.open(&mut file, "ro.txt", NativeOpenMode::READ), FsResult::Ok);
        let mut n = 0;
        assert_eq!(vol.write(&mut file, b"x", &mut n), FsResult::Denied);

        let mut buf = [0u8; 8];
        assert_eq!(vol.read(&mut file, &mut buf, &mut n), FsResult::Ok);
        assert_eq!(&buf[..n], b"data");
        assert_eq!(vol.read(&mut file, &mut buf, &mut n), FsResult::Ok);
        assert_eq!(n, 0);
    }

    #[test]
    fn names_are_validated() {
        let mut vol = mounted();
        let mut file = RamFile::default();
        let mode = NativeOpenMode::OPEN_ALWAYS;
        assert_eq!(vol.open(&mut file, "", mode), FsResult::InvalidName);
        assert_eq!(vol.open(&mut file, "a?b", mode), FsResult::InvalidName);
        assert_eq!(vol.open(&mut file, "dir/a", mode), FsResult::NoPath);
        assert_eq!(vol.open(&mut file, "1:/a", mode), FsResult::InvalidDrive);
    }

    #[test]
    fn write_protection() {
        let mut vol = mounted().with_file("a", b"");
        vol.set_write_protected(true);
        let mut file = RamFile::default();
        assert_eq!(vol.open(&mut file, "a", NativeOpenMode::WRITE), FsResult::WriteProtected);
        assert_eq!(vol.open(&mut file, "a", NativeOpenMode::READ), FsResult::Ok);
    }

    #[test]
    fn open_file_limit() {
        let mut vol = mounted();
        vol.set_max_open(1);
        let mut first = RamFile::default();
        let mut second = RamFile::default();
        assert_eq!(vol.open(&mut first, "a", NativeOpenMode::OPEN_ALWAYS), FsResult::Ok);
        assert_eq!(vol.open(&mut second, "b", NativeOpenMode::OPEN_ALWAYS), FsResult::TooManyOpenFiles);
        vol.close(&mut first);
        assert_eq!(vol.open(&mut second, "b", NativeOpenMode::OPEN_ALWAYS), FsResult::Ok);
        assert_eq!(vol.open_files(), 1);
    }

    #[test]
    fn seek_past_end_expands_in_write_mode() {
        let mut vol = mounted().with_file("a", b"ab");
        let mut file = RamFile::default();
        vol.open(&mut file, "a", NativeOpenMode::READ);
        assert_eq!(vol.seek(&mut file, 10), FsResult::Ok);
        assert_eq!(file.position(), 2);
        vol.close(&mut file);

        vol.open(&mut file, "a", NativeOpenMode::WRITE);
        assert_eq!(vol.seek(&mut file, 4), FsResult::Ok);
        assert_eq!(vol.size(&file), 4);
        assert_eq!(vol.contents("a").unwrap(), b"ab\0\0");
    }
}
