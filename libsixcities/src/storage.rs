//! Bearer token persistence
//!
//! The only client-side state that outlives the process is the session
//! token. It lives under a single key: a file named `six-cities-token`
//! in the data directory.

use secrecy::{ExposeSecret, SecretString};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::{Result, StorageError};

/// Storage backend for the session token
///
/// Implementations must be cheap to call: the HTTP client reads the token
/// before every request.
pub trait TokenStorage: Send + Sync {
    /// Read the stored token, if any
    fn load(&self) -> Result<Option<SecretString>>;

    /// Persist a token, replacing any previous one
    fn save(&self, token: &str) -> Result<()>;

    /// Forget the stored token. Removing a missing token is not an error.
    fn remove(&self) -> Result<()>;

    /// Get the backend name
    fn backend_name(&self) -> &str;
}

/// File-backed token storage
///
/// Permissions: 600 (owner read/write only) on Unix systems.
pub struct FileTokenStorage {
    path: PathBuf,
}

impl FileTokenStorage {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStorage for FileTokenStorage {
    fn load(&self) -> Result<Option<SecretString>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&self.path).map_err(StorageError::Io)?;
        let token = content.trim();
        if token.is_empty() {
            return Ok(None);
        }

        Ok(Some(SecretString::from(token.to_string())))
    }

    fn save(&self, token: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(StorageError::Io)?;
        }

        std::fs::write(&self.path, token).map_err(StorageError::Io)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&self.path, perms).map_err(StorageError::Io)?;
        }

        tracing::debug!("Stored session token at {:?}", self.path);
        Ok(())
    }

    fn remove(&self) -> Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path).map_err(StorageError::Io)?;
            tracing::debug!("Removed session token at {:?}", self.path);
        } else {
            tracing::debug!("Session token not found (already removed)");
        }
        Ok(())
    }

    fn backend_name(&self) -> &str {
        "file"
    }
}

/// In-memory token storage for tests and short-lived sessions
#[derive(Default)]
pub struct MemoryTokenStorage {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: &str) -> Self {
        Self {
            token: Mutex::new(Some(token.to_string())),
        }
    }

    fn slot(&self) -> Result<std::sync::MutexGuard<'_, Option<String>>> {
        self.token
            .lock()
            .map_err(|e| StorageError::Unavailable(format!("Poison error: {}", e)).into())
    }
}

impl TokenStorage for MemoryTokenStorage {
    fn load(&self) -> Result<Option<SecretString>> {
        Ok(self.slot()?.clone().map(SecretString::from))
    }

    fn save(&self, token: &str) -> Result<()> {
        *self.slot()? = Some(token.to_string());
        Ok(())
    }

    fn remove(&self) -> Result<()> {
        *self.slot()? = None;
        Ok(())
    }

    fn backend_name(&self) -> &str {
        "memory"
    }
}

/// Read the token as a plain string, treating storage failures as "no token"
pub(crate) fn current_token(storage: &dyn TokenStorage) -> Option<String> {
    match storage.load() {
        Ok(token) => token.map(|t| t.expose_secret().to_string()),
        Err(e) => {
            tracing::warn!("Failed to read session token: {}", e);
            None
        }
    }
}
