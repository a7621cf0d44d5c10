//! Filesystem storage for session credentials.
//!
//! Each key is a file under the store root. Writes go to a uniquely named
//! temp file that is renamed into place, and every write holds an exclusive
//! `fs2` lock on `.lock`, so two processes sharing a store never interleave
//! the halves of a token pair.

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use directories::ProjectDirs;
use fs2::FileExt;
use tracing::{debug, instrument, trace};
use uuid::Uuid;

use warden_core::error::{Error, InvalidInputError, StorageError};
use warden_core::traits::{ACCESS_TOKEN_KEY, CredentialStore, REFRESH_TOKEN_KEY};
use warden_core::{AccessToken, AuthTokens, RefreshToken, Result};

#[cfg(unix)]
use std::os::unix::fs::OpenOptionsExt;

/// Lock file guarding writes.
const LOCK_FILE: &str = ".lock";

fn map_io(key: &str, err: std::io::Error) -> Error {
    Error::Storage(StorageError::Io {
        key: key.to_string(),
        message: err.to_string(),
    })
}

fn map_lock(err: std::io::Error) -> Error {
    Error::Storage(StorageError::Lock {
        message: err.to_string(),
    })
}

/// A [`CredentialStore`] persisted as one file per key.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    root: PathBuf,
}

impl FileCredentialStore {
    /// Create a store rooted at the given directory. The directory is created
    /// on first write.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Create a store in the platform data directory (`.../warden/credentials`).
    pub fn default_location() -> Result<Self> {
        let dirs = ProjectDirs::from("", "", "warden").ok_or_else(|| {
            Error::from(InvalidInputError::Other {
                message: "could not determine data directory".to_string(),
            })
        })?;
        Ok(Self::new(dirs.data_dir().join("credentials")))
    }

    /// Get the root directory path.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn key_path(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
        if !valid {
            return Err(InvalidInputError::Other {
                message: format!("invalid storage key '{}'", key),
            }
            .into());
        }
        Ok(self.root.join(key))
    }

    fn open_lock(&self) -> Result<File> {
        fs::create_dir_all(&self.root).map_err(|e| map_io(LOCK_FILE, e))?;
        OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(self.root.join(LOCK_FILE))
            .map_err(|e| map_io(LOCK_FILE, e))
    }

    /// Run `f` while holding the exclusive write lock.
    fn with_write_lock<T>(&self, f: impl FnOnce() -> Result<T>) -> Result<T> {
        let lock = self.open_lock()?;
        lock.lock_exclusive().map_err(map_lock)?;
        let result = f();
        lock.unlock().map_err(map_lock)?;
        result
    }

    /// Run `f` while holding a shared lock, excluding concurrent writers.
    fn with_read_lock<T>(&self, f: impl FnOnce() -> Result<T>) -> Result<T> {
        // Nothing has ever been written, so there is nothing to read or race.
        if !self.root.exists() {
            return f();
        }
        let lock = self.open_lock()?;
        lock.lock_shared().map_err(map_lock)?;
        let result = f();
        lock.unlock().map_err(map_lock)?;
        result
    }

    fn read_file(&self, key: &str) -> Result<Option<String>> {
        let path = self.key_path(key)?;
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(map_io(key, e)),
        }
    }

    fn write_file(&self, key: &str, value: &str) -> Result<()> {
        let path = self.key_path(key)?;
        let temp_path = self
            .root
            .join(format!(".{}.{}.tmp", key, Uuid::new_v4().simple()));

        let mut options = OpenOptions::new();
        options.create_new(true).write(true);
        #[cfg(unix)]
        options.mode(0o600);

        let written = options
            .open(&temp_path)
            .and_then(|mut file| {
                file.write_all(value.as_bytes())?;
                file.sync_data()
            })
            .and_then(|()| fs::rename(&temp_path, &path));

        if let Err(e) = written {
            let _ = fs::remove_file(&temp_path);
            return Err(map_io(key, e));
        }

        trace!(key, "Wrote key");
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn read_key(&self, key: &str) -> Result<Option<String>> {
        self.read_file(key)
    }

    #[instrument(skip(self, value), fields(root = %self.root.display()))]
    async fn write_key(&self, key: &str, value: &str) -> Result<()> {
        self.with_write_lock(|| self.write_file(key, value))
    }

    #[instrument(skip(self), fields(root = %self.root.display()))]
    async fn remove_key(&self, key: &str) -> Result<()> {
        let path = self.key_path(key)?;
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(key, "Removed key");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(map_io(key, e)),
        }
    }

    #[instrument(skip_all, fields(root = %self.root.display()))]
    async fn write_tokens(&self, tokens: &AuthTokens) -> Result<()> {
        self.with_write_lock(|| {
            self.write_file(ACCESS_TOKEN_KEY, tokens.access_token.as_str())?;
            self.write_file(REFRESH_TOKEN_KEY, tokens.refresh_token.as_str())
        })
    }

    async fn try_get_tokens(&self) -> Result<Option<AuthTokens>> {
        let (access, refresh) = self.with_read_lock(|| {
            Ok((
                self.read_file(ACCESS_TOKEN_KEY)?,
                self.read_file(REFRESH_TOKEN_KEY)?,
            ))
        })?;

        match (access, refresh) {
            (Some(access), Some(refresh)) if !access.is_empty() && !refresh.is_empty() => {
                Ok(Some(AuthTokens {
                    access_token: AccessToken::new(access),
                    refresh_token: RefreshToken::new(refresh),
                }))
            }
            _ => Ok(None),
        }
    }
}
