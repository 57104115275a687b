//! Single-instance execution lock.
//!
//! An exclusive, non-blocking `flock(2)` on a well-known path. The guard
//! removes the marker file and releases the lock when dropped, so every exit
//! path out of a run gives the lock back.
//!
//! Because the holder unlinks the file, a contender may end up locking an
//! inode that is no longer at `path`. After `flock` succeeds the open file is
//! compared with what `path` names now; a mismatch counts as held.

use std::fs::File;
use std::io;
use std::os::unix::fs::MetadataExt;
use std::os::unix::io::AsRawFd;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum LockError {
    /// Another process (or another guard in this process) holds the lock.
    #[error("another instance is already running (lock held on {})", path.display())]
    Held { path: PathBuf },
    #[error("failed to lock {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Held lock on `path`. Dropping it removes the file and releases the lock.
#[derive(Debug)]
pub struct InstanceLock {
    file: Option<File>,
    path: PathBuf,
}

impl InstanceLock {
    /// Try to take the lock without waiting.
    pub fn acquire(path: &Path) -> Result<Self, LockError> {
        let file = File::options()
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .map_err(|source| LockError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        Self::lock_open(file, path)
    }

    fn lock_open(file: File, path: &Path) -> Result<Self, LockError> {
        let r = unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX | libc::LOCK_NB) };
        if r != 0 {
            let err = io::Error::last_os_error();
            if err.raw_os_error() == Some(libc::EWOULDBLOCK) {
                return Err(LockError::Held {
                    path: path.to_path_buf(),
                });
            }
            return Err(LockError::Io {
                path: path.to_path_buf(),
                source: err,
            });
        }

        let current = same_file(&file, path).map_err(|source| LockError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if !current {
            tracing::debug!(path = %path.display(), "locked a stale lock file inode");
            return Err(LockError::Held {
                path: path.to_path_buf(),
            });
        }

        tracing::debug!(path = %path.display(), "instance lock acquired");
        Ok(InstanceLock {
            file: Some(file),
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// True if `path` still names the inode `file` has open.
fn same_file(file: &File, path: &Path) -> io::Result<bool> {
    let open = file.metadata()?;
    match std::fs::metadata(path) {
        Ok(on_disk) => Ok(open.dev() == on_disk.dev() && open.ino() == on_disk.ino()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

impl Drop for InstanceLock {
    fn drop(&mut self) {
        // Unlink while still holding the lock, then close to release it.
        if let Err(e) = std::fs::remove_file(&self.path) {
            tracing::warn!(path = %self.path.display(), "failed to remove lock file: {}", e);
        }
        drop(self.file.take());
        tracing::debug!(path = %self.path.display(), "instance lock released");
    }
}
