//! File-based key-value store.
//!
//! Stores each key as a separate file under a configurable directory
//! (default: `$XDG_DATA_HOME/yoopay-rs/`).

use std::fs;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use super::KeyValueStore;
use crate::error::{Result, YooPayError};

/// Application name used for the XDG data directory.
const APP_NAME: &str = "yoopay-rs";

/// Sentinel file used for cross-process file locking.
const LOCK_FILE: &str = "session.lock";

/// File-backed [`KeyValueStore`].
///
/// Each key is stored in a file of the same name; keys are restricted to
/// ASCII letters, digits, `_` and `-`. Writes go to a temporary file that
/// is then renamed over the target, so a crash never leaves a half-written
/// value.
///
/// # Concurrency
///
/// In-process access is serialized by a [`Mutex`]; other processes are
/// kept out by an advisory lock on `session.lock`.
#[derive(Debug)]
pub struct FileStore {
    /// Root directory containing the value files.
    dir: PathBuf,
    /// Mutex serializing concurrent in-process access.
    lock: Mutex<()>,
    /// Sentinel file for cross-process advisory locking.
    lock_file: fs::File,
}

impl FileStore {
    /// Creates a store rooted at `dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the lock
    /// file cannot be opened.
    #[inline]
    pub fn new(dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&dir).map_err(storage_io_error)?;
        let lock_file = fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(dir.join(LOCK_FILE))
            .map_err(storage_io_error)?;
        Ok(Self {
            dir,
            lock: Mutex::new(()),
            lock_file,
        })
    }

    /// Returns the default XDG-compliant data directory for this application.
    ///
    /// On Linux: `$XDG_DATA_HOME/yoopay-rs/` (typically
    /// `~/.local/share/yoopay-rs/`).
    ///
    /// # Errors
    ///
    /// Returns an error if the platform data directory cannot be determined.
    #[inline]
    pub fn default_dir() -> Result<PathBuf> {
        dirs::data_dir()
            .map(|data_path| data_path.join(APP_NAME))
            .ok_or_else(|| {
                YooPayError::Storage("could not determine platform data directory".into())
            })
    }

    /// Returns the path of `key`'s file.
    fn path(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .bytes()
                .all(|byte| byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'-');
        if !valid {
            return Err(YooPayError::Storage(
                format!("invalid session key: '{key}'").into(),
            ));
        }
        Ok(self.dir.join(key))
    }

    /// Runs `op` holding the in-process mutex and the exclusive file lock.
    fn with_lock<R, F: FnOnce() -> Result<R>>(&self, op: F) -> Result<R> {
        let _guard: MutexGuard<'_, ()> = self
            .lock
            .lock()
            .map_err(|err| YooPayError::Storage(err.to_string().into()))?;
        self.lock_file.lock().map_err(storage_io_error)?;
        let result = op();
        if let Err(err) = self.lock_file.unlock()
            && result.is_ok()
        {
            return Err(storage_io_error(err));
        }
        result
    }
}

impl KeyValueStore for FileStore {
    #[inline]
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path(key)?;
        self.with_lock(|| match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(storage_io_error(err)),
        })
    }

    #[inline]
    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path(key)?;
        let tmp_path = self.dir.join(format!("{key}.tmp"));
        self.with_lock(|| {
            fs::write(&tmp_path, value).map_err(storage_io_error)?;
            fs::rename(&tmp_path, &path).map_err(storage_io_error)
        })
    }

    #[inline]
    fn remove(&self, key: &str) -> Result<()> {
        let path = self.path(key)?;
        self.with_lock(|| match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(storage_io_error(err)),
        })
    }
}

/// Wraps an I/O error into a [`YooPayError::Storage`].
fn storage_io_error(err: std::io::Error) -> YooPayError {
    YooPayError::Storage(Box::new(err))
}
