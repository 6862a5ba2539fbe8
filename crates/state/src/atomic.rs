// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Atomic state writes: serialize, write to `.tmp`, fsync, rename (spec
//! §4.A). `StateWriter` abstracts the filesystem the same way the
//! teacher's `storage::checkpoint::CheckpointWriter` abstracts its
//! snapshot I/O, so retry/backoff behavior around the rename step can be
//! tested without touching a real filesystem.

use std::io;
use std::path::Path;
use std::time::Duration;

/// Filesystem operations a state write needs, abstracted for testability.
pub trait StateWriter: Send + Sync + 'static {
    fn write_tmp(&self, path: &Path, data: &[u8]) -> io::Result<()>;
    fn fsync(&self, path: &Path) -> io::Result<()>;
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;
    fn exists(&self, path: &Path) -> bool;
    fn remove(&self, path: &Path) -> io::Result<()>;
}

/// Production writer using real filesystem calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsStateWriter;

impl StateWriter for FsStateWriter {
    fn write_tmp(&self, path: &Path, data: &[u8]) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, data)
    }

    fn fsync(&self, path: &Path) -> io::Result<()> {
        std::fs::File::open(path)?.sync_all()
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        std::fs::rename(from, to)
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn remove(&self, path: &Path) -> io::Result<()> {
        match std::fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}

/// Renames that fail because another process momentarily holds the file
/// open (Windows) get up to this many attempts with exponential backoff.
const MAX_RENAME_ATTEMPTS: u32 = 5;
const RENAME_BACKOFF_BASE: Duration = Duration::from_millis(10);

/// Write `data` to `path` atomically: write to `path.tmp`, fsync, then
/// rename into place, retrying the rename with exponential backoff.
pub fn atomic_write<W: StateWriter>(writer: &W, path: &Path, data: &[u8]) -> io::Result<()> {
    let tmp_path = path.with_extension(tmp_extension(path));
    writer.write_tmp(&tmp_path, data)?;
    writer.fsync(&tmp_path)?;

    let mut last_err = None;
    for attempt in 0..MAX_RENAME_ATTEMPTS {
        match writer.rename(&tmp_path, path) {
            Ok(()) => return Ok(()),
            Err(e) => {
                last_err = Some(e);
                if attempt + 1 < MAX_RENAME_ATTEMPTS {
                    std::thread::sleep(RENAME_BACKOFF_BASE * 2u32.pow(attempt));
                }
            }
        }
    }
    Err(last_err.unwrap_or_else(|| io::Error::other("rename failed with no recorded error")))
}

fn tmp_extension(path: &Path) -> String {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{ext}.tmp"),
        None => "tmp".to_string(),
    }
}

#[cfg(test)]
#[path = "atomic_tests.rs"]
mod tests;
