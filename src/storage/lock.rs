//! Cross-process file lock
//!
//! A [`FileLock`] serializes access to one backing file. Acquisition happens in
//! two stages:
//!
//! 1. An in-process mutex shared by every `FileLock` in this process that
//!    points at the same lock path. Failing to get it within the timeout is
//!    final: another thread of this process is already inside.
//! 2. An OS advisory lock (`flock`/`LockFileEx` via `fs2`) on `<file>.lock`,
//!    polled every [`POLL_INTERVAL`] until the timeout elapses. Where the
//!    filesystem does not support advisory locks the lock falls back to
//!    creating the lock file with `O_EXCL` semantics.
//!
//! The lock is not reentrant. Acquiring it twice from the same thread will
//! time out.

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use fs2::FileExt;
use once_cell::sync::Lazy;
use parking_lot::{Mutex, MutexGuard};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::error::{PocketError, PocketResult};

/// Delay between two attempts at the OS-level lock
pub const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Timeout used when none is configured
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Suffix appended to a data file name to form its lock file
pub const LOCK_SUFFIX: &str = ".lock";

/// One in-process mutex per lock path.
static THREAD_LOCKS: Lazy<Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

/// Cross-process locking primitive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LockStrategy {
    /// OS advisory lock on the lock file
    #[default]
    Advisory,
    /// The lock is held by whoever created the lock file
    CreateExclusive,
}

/// Lock guarding one named resource
pub struct FileLock {
    path: PathBuf,
    timeout: Duration,
    thread_lock: Arc<Mutex<()>>,
    /// Set once advisory locking turned out to be unsupported
    exclusive_create: AtomicBool,
}

impl FileLock {
    /// Create a lock on `path` itself (the lock file)
    pub fn new(path: impl Into<PathBuf>, timeout: Duration) -> Self {
        let path = path.into();
        let thread_lock = thread_lock_for(&path);
        Self {
            path,
            timeout,
            thread_lock,
            exclusive_create: AtomicBool::new(false),
        }
    }

    /// Create the lock guarding `data_file`, stored at `<data_file>.lock`
    pub fn for_data_file(data_file: &Path, timeout: Duration) -> Self {
        Self::new(lock_path_for(data_file), timeout)
    }

    /// Select the locking primitive
    pub fn with_strategy(self, strategy: LockStrategy) -> Self {
        self.exclusive_create
            .store(strategy == LockStrategy::CreateExclusive, Ordering::SeqCst);
        self
    }

    /// Path of the lock file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Configured timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Strategy currently in use
    pub fn strategy(&self) -> LockStrategy {
        if self.exclusive_create.load(Ordering::SeqCst) {
            LockStrategy::CreateExclusive
        } else {
            LockStrategy::Advisory
        }
    }

    /// Acquire the lock with the configured timeout
    pub fn acquire(&self) -> PocketResult<LockGuard<'_>> {
        self.acquire_timeout(self.timeout)
    }

    /// Acquire the lock, waiting at most `timeout` in total
    ///
    /// # Errors
    ///
    /// Returns [`PocketError::LockUnavailable`] when either stage cannot be
    /// completed in time, or when the OS reports an unexpected error.
    pub fn acquire_timeout(&self, timeout: Duration) -> PocketResult<LockGuard<'_>> {
        let started = Instant::now();

        let thread_guard = self.thread_lock.try_lock_for(timeout).ok_or_else(|| {
            PocketError::lock_unavailable(
                self.resource(),
                format!(
                    "in-process lock not obtained within {}ms",
                    timeout.as_millis()
                ),
            )
        })?;

        let file = self.acquire_file_lock(started, timeout)?;
        trace!(lock = %self.path.display(), waited_ms = started.elapsed().as_millis() as u64, "lock acquired");

        Ok(LockGuard {
            lock: self,
            file: Some(file),
            thread_guard: Some(thread_guard),
        })
    }

    fn acquire_file_lock(&self, started: Instant, timeout: Duration) -> PocketResult<File> {
        let mut attempts = 0u32;
        loop {
            attempts += 1;
            match self.try_lock_once() {
                Ok(Some(file)) => return Ok(file),
                Ok(None) => {}
                Err(e) => {
                    return Err(PocketError::lock_unavailable(
                        self.resource(),
                        format!("unexpected error while locking: {}", e),
                    ))
                }
            }

            let elapsed = started.elapsed();
            if elapsed >= timeout {
                warn!(
                    lock = %self.path.display(),
                    attempts,
                    timeout_ms = timeout.as_millis() as u64,
                    "timed out waiting for lock"
                );
                return Err(PocketError::lock_unavailable(
                    self.resource(),
                    format!("held by another process for more than {}ms", timeout.as_millis()),
                ));
            }

            if attempts == 1 {
                debug!(lock = %self.path.display(), "lock contended, polling");
            }
            thread::sleep(POLL_INTERVAL.min(timeout - elapsed));
        }
    }

    /// One non-blocking attempt. `Ok(None)` means the lock is held elsewhere.
    fn try_lock_once(&self) -> io::Result<Option<File>> {
        if self.exclusive_create.load(Ordering::SeqCst) {
            return self.try_create_exclusive();
        }

        let (file, created) = self.open_lock_file()?;

        match FileExt::try_lock_exclusive(&file) {
            Ok(()) => {
                // The previous owner may have unlinked the file we opened.
                if still_linked(&file, &self.path)? {
                    Ok(Some(file))
                } else {
                    let _ = FileExt::unlock(&file);
                    Ok(None)
                }
            }
            Err(e) if is_contended(&e) => Ok(None),
            Err(e) if is_unsupported(&e) => {
                warn!(
                    lock = %self.path.display(),
                    error = %e,
                    "advisory locking unsupported, falling back to exclusive create"
                );
                drop(file);
                // A file we just created is not a holder's marker.
                if created {
                    let _ = fs::remove_file(&self.path);
                }
                self.exclusive_create.store(true, Ordering::SeqCst);
                self.try_create_exclusive()
            }
            Err(e) => Err(e),
        }
    }

    /// Open the lock file, reporting whether this call created it
    fn open_lock_file(&self) -> io::Result<(File, bool)> {
        match OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(&self.path)
        {
            Ok(file) => Ok((file, true)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                let file = OpenOptions::new().read(true).write(true).open(&self.path)?;
                Ok((file, false))
            }
            Err(e) => Err(e),
        }
    }

    fn try_create_exclusive(&self) -> io::Result<Option<File>> {
        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.path)
        {
            Ok(file) => Ok(Some(file)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn resource(&self) -> String {
        self.path.display().to_string()
    }
}

/// Exclusive ownership of a [`FileLock`] until released or dropped
pub struct LockGuard<'a> {
    lock: &'a FileLock,
    file: Option<File>,
    thread_guard: Option<MutexGuard<'a, ()>>,
}

impl LockGuard<'_> {
    /// Release the OS-level lock, then the in-process mutex
    ///
    /// Safe to call more than once.
    pub fn release(&mut self) {
        if let Some(file) = self.file.take() {
            let path = &self.lock.path;
            match self.lock.strategy() {
                LockStrategy::Advisory => {
                    // Unlink while still holding the lock so that a waiter
                    // which opened this file sees it vanish and retries.
                    if let Err(e) = fs::remove_file(path) {
                        trace!(lock = %path.display(), error = %e, "lock file not removed");
                    }
                    let _ = FileExt::unlock(&file);
                    drop(file);
                }
                LockStrategy::CreateExclusive => {
                    drop(file);
                    if let Err(e) = fs::remove_file(path) {
                        warn!(lock = %path.display(), error = %e, "failed to remove lock file");
                    }
                }
            }
        }
        self.thread_guard.take();
    }

    /// Whether this guard still owns the lock
    pub fn is_held(&self) -> bool {
        self.file.is_some()
    }
}

impl Drop for LockGuard<'_> {
    fn drop(&mut self) {
        self.release();
    }
}

/// `<data_file>.lock`
pub fn lock_path_for(data_file: &Path) -> PathBuf {
    let mut name = data_file.as_os_str().to_os_string();
    name.push(LOCK_SUFFIX);
    PathBuf::from(name)
}

fn thread_lock_for(path: &Path) -> Arc<Mutex<()>> {
    let key = registry_key(path);
    let mut registry = THREAD_LOCKS.lock();
    registry
        .entry(key)
        .or_insert_with(|| Arc::new(Mutex::new(())))
        .clone()
}

/// Canonical form of a lock path, so relative and absolute spellings of the
/// same file share one mutex
fn registry_key(path: &Path) -> PathBuf {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    match (parent.canonicalize(), path.file_name()) {
        (Ok(dir), Some(name)) => dir.join(name),
        _ => path.to_path_buf(),
    }
}

fn is_contended(err: &io::Error) -> bool {
    err.kind() == ErrorKind::WouldBlock
        || err.raw_os_error() == fs2::lock_contended_error().raw_os_error()
}

#[cfg(target_os = "linux")]
const UNSUPPORTED_LOCK_ERRNOS: &[i32] = &[37 /* ENOLCK */, 95 /* EOPNOTSUPP */];
#[cfg(target_os = "macos")]
const UNSUPPORTED_LOCK_ERRNOS: &[i32] = &[77 /* ENOLCK */, 45 /* ENOTSUP */, 102 /* EOPNOTSUPP */];
#[cfg(not(any(target_os = "linux", target_os = "macos")))]
const UNSUPPORTED_LOCK_ERRNOS: &[i32] = &[];

fn is_unsupported(err: &io::Error) -> bool {
    err.kind() == ErrorKind::Unsupported
        || err
            .raw_os_error()
            .is_some_and(|code| UNSUPPORTED_LOCK_ERRNOS.contains(&code))
}

#[cfg(unix)]
fn still_linked(file: &File, path: &Path) -> io::Result<bool> {
    use std::os::unix::fs::MetadataExt;

    let held = file.metadata()?;
    match fs::metadata(path) {
        Ok(current) => Ok(held.dev() == current.dev() && held.ino() == current.ino()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

#[cfg(not(unix))]
fn still_linked(_file: &File, path: &Path) -> io::Result<bool> {
    Ok(path.exists())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Seek, SeekFrom, Write};
    use tempfile::TempDir;

    fn short() -> Duration {
        Duration::from_millis(200)
    }

    #[test]
    fn test_lock_path_for() {
        let path = Path::new("/tmp/storage/data.csv");
        assert_eq!(lock_path_for(path), PathBuf::from("/tmp/storage/data.csv.lock"));
    }

    #[test]
    fn test_acquire_and_release_removes_lock_file() {
        let temp_dir = TempDir::new().unwrap();
        let lock = FileLock::for_data_file(&temp_dir.path().join("data.csv"), short());

        let mut guard = lock.acquire().unwrap();
        assert!(guard.is_held());
        assert!(lock.path().exists());

        guard.release();
        assert!(!guard.is_held());
        assert!(!lock.path().exists());

        // Idempotent
        guard.release();
        drop(guard);

        // Reacquire after release
        let _again = lock.acquire().unwrap();
    }

    #[test]
    fn test_same_process_holder_blocks_second_instance() {
        let temp_dir = TempDir::new().unwrap();
        let data = temp_dir.path().join("data.csv");
        let first = FileLock::for_data_file(&data, short());
        let second = FileLock::for_data_file(&data, short());

        let _held = first.acquire().unwrap();

        let start = Instant::now();
        let err = thread::scope(|s| s.spawn(|| second.acquire().err()).join().unwrap())
            .expect("second acquire must fail");
        assert!(err.is_lock_unavailable());
        assert!(start.elapsed() < short() + Duration::from_millis(500));
    }

    #[test]
    fn test_timeout_when_other_process_holds_advisory_lock() {
        let temp_dir = TempDir::new().unwrap();
        let lock = FileLock::for_data_file(&temp_dir.path().join("data.csv"), short());

        // A separate open file description behaves like another process.
        let blocker = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(lock.path())
            .unwrap();
        FileExt::lock_exclusive(&blocker).unwrap();

        let start = Instant::now();
        let err = lock.acquire().err().expect("acquire must time out");
        let elapsed = start.elapsed();

        assert!(err.is_lock_unavailable());
        assert!(elapsed >= short());
        assert!(elapsed < short() + Duration::from_millis(500));

        FileExt::unlock(&blocker).unwrap();
        let _guard = lock.acquire().unwrap();
    }

    #[test]
    fn test_waiter_gets_lock_once_blocker_releases() {
        let temp_dir = TempDir::new().unwrap();
        let lock = FileLock::for_data_file(&temp_dir.path().join("data.csv"), Duration::from_secs(5));

        let blocker = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(lock.path())
            .unwrap();
        FileExt::lock_exclusive(&blocker).unwrap();

        let releaser = thread::spawn(move || {
            thread::sleep(Duration::from_millis(150));
            FileExt::unlock(&blocker).unwrap();
        });

        let guard = lock.acquire().unwrap();
        assert!(guard.is_held());
        releaser.join().unwrap();
    }

    #[test]
    fn test_create_exclusive_strategy() {
        let temp_dir = TempDir::new().unwrap();
        let lock = FileLock::for_data_file(&temp_dir.path().join("data.csv"), short())
            .with_strategy(LockStrategy::CreateExclusive);
        assert_eq!(lock.strategy(), LockStrategy::CreateExclusive);

        // A lock file left by someone else means the lock is taken
        fs::write(lock.path(), b"").unwrap();
        let err = lock.acquire().err().expect("acquire must time out");
        assert!(err.is_lock_unavailable());

        fs::remove_file(lock.path()).unwrap();
        let guard = lock.acquire().unwrap();
        assert!(lock.path().exists());
        drop(guard);
        assert!(!lock.path().exists());
    }

    #[test]
    fn test_missing_directory_is_lock_unavailable() {
        let temp_dir = TempDir::new().unwrap();
        let lock = FileLock::for_data_file(&temp_dir.path().join("nope").join("data.csv"), short());

        let err = lock.acquire().err().expect("acquire must fail");
        assert!(err.is_lock_unavailable());
        assert!(err.to_string().contains("unexpected error"));
    }

    #[test]
    fn test_mutual_exclusion_across_threads() {
        let temp_dir = TempDir::new().unwrap();
        let data = temp_dir.path().join("counter.txt");
        fs::write(&data, b"0").unwrap();

        thread::scope(|s| {
            for _ in 0..4 {
                let data = data.clone();
                s.spawn(move || {
                    // Separate instances share the in-process mutex via the registry
                    let lock = FileLock::for_data_file(&data, Duration::from_secs(10));
                    for _ in 0..25 {
                        let _guard = lock.acquire().unwrap();
                        let mut file = OpenOptions::new().read(true).write(true).open(&data).unwrap();
                        let mut text = String::new();
                        file.read_to_string(&mut text).unwrap();
                        let value: u32 = text.trim().parse().unwrap();
                        file.seek(SeekFrom::Start(0)).unwrap();
                        file.set_len(0).unwrap();
                        write!(file, "{}", value + 1).unwrap();
                    }
                });
            }
        });

        assert_eq!(fs::read_to_string(&data).unwrap(), "100");
    }

    const CHILD_LOCK_ENV: &str = "POCKET_LEDGER_TEST_LOCK_PATH";
    const CHILD_READY_ENV: &str = "POCKET_LEDGER_TEST_LOCK_READY";

    /// Runs inside a child test process started by
    /// `test_lock_held_by_child_process_blocks_parent`.
    #[test]
    #[ignore]
    fn hold_lock_for_child_process() {
        let (Ok(data), Ok(ready)) = (std::env::var(CHILD_LOCK_ENV), std::env::var(CHILD_READY_ENV))
        else {
            return;
        };

        let lock = FileLock::for_data_file(Path::new(&data), Duration::from_secs(5));
        let guard = lock.acquire().unwrap();
        fs::write(&ready, b"").unwrap();
        thread::sleep(Duration::from_millis(700));
        drop(guard);
    }

    #[test]
    fn test_lock_held_by_child_process_blocks_parent() {
        let temp_dir = TempDir::new().unwrap();
        let data = temp_dir.path().join("data.csv");
        let ready = temp_dir.path().join("ready");

        let mut child = std::process::Command::new(std::env::current_exe().unwrap())
            .args([
                "--ignored",
                "--exact",
                "storage::lock::tests::hold_lock_for_child_process",
                "--nocapture",
            ])
            .env(CHILD_LOCK_ENV, &data)
            .env(CHILD_READY_ENV, &ready)
            .spawn()
            .unwrap();

        let deadline = Instant::now() + Duration::from_secs(30);
        while !ready.exists() {
            assert!(Instant::now() < deadline, "child never took the lock");
            thread::sleep(Duration::from_millis(10));
        }

        let lock = FileLock::for_data_file(&data, Duration::from_millis(100));
        let err = lock.acquire().err().expect("child holds the lock");
        assert!(err.is_lock_unavailable());

        assert!(child.wait().unwrap().success());
        let guard = lock.acquire().unwrap();
        assert!(guard.is_held());
    }
}
