//! Single-build lock.
//!
//! A second build against the same project would race the first one's clean
//! and bundle stages, so builds take an exclusive lock file in the project
//! root for their whole duration. The file records the holder's pid; a lock
//! left behind by a process that no longer exists is reclaimed.

use crate::debug;
use parking_lot::Mutex;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

pub const LOCK_FILE: &str = ".sitesmith-build.lock";

/// Lock held by this process, removed by the Ctrl+C handler.
static ACTIVE: Mutex<Option<PathBuf>> = Mutex::new(None);

/// Held for the duration of a build; the file is removed on drop.
#[derive(Debug)]
pub struct BuildLock {
    path: PathBuf,
}

impl BuildLock {
    /// Fails with `AlreadyExists` when a live process holds the lock.
    pub fn acquire(root: &Path) -> io::Result<Self> {
        let path = root.join(LOCK_FILE);
        match create(&path) {
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists && is_stale(&path) => {
                debug!("build"; "reclaiming stale lock {}", path.display());
                fs::remove_file(&path)?;
                create(&path)?;
            }
            result => result?,
        }
        *ACTIVE.lock() = Some(path.clone());
        Ok(Self { path })
    }
}

impl Drop for BuildLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
        let mut active = ACTIVE.lock();
        if active.as_deref() == Some(self.path.as_path()) {
            *active = None;
        }
    }
}

/// Remove the lock of a build interrupted before its guard could drop.
pub fn release_active_lock() {
    if let Some(path) = ACTIVE.lock().take() {
        let _ = fs::remove_file(path);
    }
}

fn create(path: &Path) -> io::Result<()> {
    let mut file = OpenOptions::new().write(true).create_new(true).open(path)?;
    writeln!(file, "{}", std::process::id())
}

/// A lock is stale when its pid is readable and names no running process.
/// Unreadable contents count as held.
fn is_stale(path: &Path) -> bool {
    fs::read_to_string(path)
        .ok()
        .and_then(|s| s.trim().parse::<u32>().ok())
        .is_some_and(|pid| !process_alive(pid))
}

#[cfg(unix)]
fn process_alive(pid: u32) -> bool {
    let Ok(pid) = libc::pid_t::try_from(pid) else {
        return false;
    };
    // Signal 0 only checks existence; EPERM means it exists under another user
    // SAFETY: kill with signal 0 sends nothing.
    let rc = unsafe { libc::kill(pid, 0) };
    rc == 0 || io::Error::last_os_error().raw_os_error() == Some(libc::EPERM)
}

#[cfg(not(unix))]
fn process_alive(_pid: u32) -> bool {
    true
}
