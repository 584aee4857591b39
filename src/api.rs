//! Entry points for callers holding an optional session handle.
//!
//! Mirrors the session methods with the handle passed as `Option`, open modes
//! as raw bits and transfer lengths as in/out parameters. A missing handle or
//! undefined flag bits produce `ParamError`.

use crate::drivers::usb::UsbHost;
use crate::error::{ErrorKind, UsbError, UsbResult};
use crate::fs::flags::OpenModeFlags;
use crate::fs::vfs::FileSystem;
use crate::session::Session;
use crate::time::CycleCounter;

#[track_caller]
fn require<T>(handle: Option<T>) -> UsbResult<T> {
    match handle {
        Some(handle) => Ok(handle),
        None => Err(UsbError::new(ErrorKind::ParamError)),
    }
}

#[track_caller]
fn open_mode(flags: u8) -> UsbResult<OpenModeFlags> {
    match OpenModeFlags::from_bits(flags) {
        Some(flags) => Ok(flags),
        None => Err(UsbError::new(ErrorKind::ParamError)),
    }
}

#[track_caller]
fn requested(len: usize, available: usize) -> UsbResult<usize> {
    if len > available {
        return Err(UsbError::new(ErrorKind::ParamError));
    }
    Ok(len)
}

pub fn init<H, F, C>(handle: Option<&mut Session<H, F, C>>) -> UsbResult<()>
where
    H: UsbHost,
    F: FileSystem,
    C: CycleCounter,
{
    require(handle)?.init()
}

pub fn deinit<H, F, C>(handle: Option<&mut Session<H, F, C>>) -> UsbResult<()>
where
    H: UsbHost,
    F: FileSystem,
    C: CycleCounter,
{
    require(handle)?.deinit()
}

pub fn wait_until_started<H, F, C>(handle: Option<&mut Session<H, F, C>>, timeout_ms: u32) -> UsbResult<()>
where
    H: UsbHost,
    F: FileSystem,
    C: CycleCounter,
{
    require(handle)?.wait_until_started(timeout_ms)
}

pub fn mount<H, F, C>(handle: Option<&mut Session<H, F, C>>) -> UsbResult<()>
where
    H: UsbHost,
    F: FileSystem,
    C: CycleCounter,
{
    require(handle)?.mount()
}

pub fn open<H, F, C>(handle: Option<&mut Session<H, F, C>>, name: &str, flags: u8) -> UsbResult<()>
where
    H: UsbHost,
    F: FileSystem,
    C: CycleCounter,
{
    let flags = open_mode(flags)?;
    require(handle)?.open(name, flags)
}

pub fn close<H, F, C>(handle: Option<&mut Session<H, F, C>>) -> UsbResult<()>
where
    H: UsbHost,
    F: FileSystem,
    C: CycleCounter,
{
    require(handle)?.close()
}

/// Write the first `*len` bytes of `buf`; `*len` becomes the count written.
pub fn write<H, F, C>(
    handle: Option<&mut Session<H, F, C>>,
    buf: &[u8],
    len: &mut usize,
    append: bool,
) -> UsbResult<()>
where
    H: UsbHost,
    F: FileSystem,
    C: CycleCounter,
{
    let session = require(handle)?;
    let wanted = requested(*len, buf.len())?;
    *len = 0;
    *len = session.write(&buf[..wanted], append)?;
    Ok(())
}

/// Read up to `*len` bytes into `buf`; `*len` becomes the count read.
pub fn read<H, F, C>(handle: Option<&mut Session<H, F, C>>, buf: &mut [u8], len: &mut usize) -> UsbResult<()>
where
    H: UsbHost,
    F: FileSystem,
    C: CycleCounter,
{
    let session = require(handle)?;
    let wanted = requested(*len, buf.len())?;
    *len = 0;
    *len = session.read(&mut buf[..wanted])?;
    Ok(())
}

pub fn seek_to_end<H, F, C>(handle: Option<&mut Session<H, F, C>>) -> UsbResult<()>
where
    H: UsbHost,
    F: FileSystem,
    C: CycleCounter,
{
    require(handle)?.seek_to_end()
}

pub fn open_write_close<H, F, C>(
    handle: Option<&mut Session<H, F, C>>,
    name: &str,
    buf: &[u8],
    len: &mut usize,
    flags: u8,
    keep_open: bool,
) -> UsbResult<()>
where
    H: UsbHost,
    F: FileSystem,
    C: CycleCounter,
{
    let session = require(handle)?;
    let flags = open_mode(flags)?;
    let wanted = requested(*len, buf.len())?;
    *len = 0;
    *len = session.open_write_close(name, &buf[..wanted], flags, keep_open)?;
    Ok(())
}
