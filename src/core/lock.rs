//! Single-instance lock file
//!
//! Ownership is an exclusive advisory lock on the open file, held for the
//! life of the [`InstanceLock`]. The operating system drops it when the
//! owning process exits, however it exits, so a lock file left behind by a
//! crash never blocks a restart. The PID written into the file only names
//! the owner in diagnostics.

use crate::error::{DetectorError, Result};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Attempts before giving up on a path that keeps being replaced under us.
const MAX_ATTEMPTS: usize = 3;

/// Exclusive ownership token for the scheduler process.
#[derive(Debug)]
pub struct InstanceLock {
    path: PathBuf,
    pid: u32,
    // Closing the handle releases the advisory lock.
    file: File,
}

impl InstanceLock {
    /// Takes the lock at `path`.
    ///
    /// Fails with `DuplicateInstance` while another open handle holds the
    /// lock. Whatever an unlocked file contains (a dead owner, our own PID
    /// from a previous run, garbage) is overwritten.
    pub fn acquire(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let pid = std::process::id();
        let lock_error = |source: std::io::Error| DetectorError::Lock {
            path: path.clone(),
            source,
        };

        for _ in 0..MAX_ATTEMPTS {
            let file = OpenOptions::new()
                .read(true)
                .write(true)
                .create(true)
                .truncate(false)
                .open(&path)
                .map_err(lock_error)?;

            if let Err(e) = FileExt::try_lock_exclusive(&file) {
                if e.kind() == fs2::lock_contended_error().kind() {
                    // Best effort: the holder may not have written its PID yet.
                    let owner = read_owner(&path).unwrap_or_default();
                    return Err(DetectorError::DuplicateInstance { pid: owner, path });
                }
                return Err(lock_error(e));
            }

            // The previous holder may have unlinked the path between our open
            // and our lock; a lock on an orphaned inode excludes nobody.
            if !is_same_file(&file, &path).map_err(lock_error)? {
                continue;
            }

            if let Some(previous) = read_pid(&file) {
                warn!(
                    path = %path.display(),
                    previous = previous,
                    "InstanceLock: taking over unlocked lock file"
                );
            }
            file.set_len(0)
                .and_then(|_| (&file).write_all(pid.to_string().as_bytes()))
                .and_then(|_| file.sync_all())
                .map_err(lock_error)?;

            info!(path = %path.display(), pid = pid, "InstanceLock: acquired");
            return Ok(Self { path, pid, file });
        }

        Err(lock_error(std::io::Error::new(
            ErrorKind::Other,
            "lock file was replaced repeatedly while acquiring",
        )))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }
}

impl Drop for InstanceLock {
    fn drop(&mut self) {
        // Unlink while still holding the lock; the handle closes afterwards.
        let ours = matches!(is_same_file(&self.file, &self.path), Ok(true))
            && read_pid(&self.file) == Some(self.pid);
        if !ours {
            warn!(
                path = %self.path.display(),
                "InstanceLock: lock file no longer ours, leaving it"
            );
            return;
        }
        match fs::remove_file(&self.path) {
            Ok(()) => info!(path = %self.path.display(), "InstanceLock: released"),
            Err(e) => warn!(
                path = %self.path.display(),
                error = %e,
                "InstanceLock: failed to remove lock file"
            ),
        }
    }
}

/// PID stored at `path`; `None` if the file is unreadable or unparseable.
fn read_owner(path: &Path) -> Option<u32> {
    fs::read_to_string(path).ok()?.trim().parse().ok()
}

/// PID in the held file, read through the locked handle.
fn read_pid(mut file: &File) -> Option<u32> {
    let mut contents = String::new();
    file.seek(SeekFrom::Start(0)).ok()?;
    file.read_to_string(&mut contents).ok()?;
    contents.trim().parse().ok()
}

/// Whether `path` still names the file behind `file`.
#[cfg(unix)]
fn is_same_file(file: &File, path: &Path) -> std::io::Result<bool> {
    use std::os::unix::fs::MetadataExt;

    let held = file.metadata()?;
    match fs::metadata(path) {
        Ok(current) => Ok(held.dev() == current.dev() && held.ino() == current.ino()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

/// Open files cannot be unlinked without share-delete access here, so the
/// path keeps naming the locked file.
#[cfg(not(unix))]
fn is_same_file(_file: &File, path: &Path) -> std::io::Result<bool> {
    Ok(path.exists())
}
