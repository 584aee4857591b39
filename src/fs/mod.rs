//! Filesystem layer: the volume boundary, open-mode translation and an
//! in-memory volume.

pub mod fat32;
pub mod flags;
pub mod vfs;
