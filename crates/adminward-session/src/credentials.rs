//! Durable storage for the session token and the cached identity.
//!
//! The credential store is a dumb persisted key-value boundary. It holds
//! exactly two entries:
//!
//! - [`TOKEN_KEY`] — the bearer token, so a restart can resume the session
//! - [`IDENTITY_KEY`] — the last identity JSON blob, for display continuity
//!
//! It has no validation logic and never fails: reads return `None` when
//! nothing usable is stored, and write failures are logged and dropped.
//! Whether a token is still *valid* is for the server to say.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use adminward_protocol::{Identity, Token};

/// Storage key for the bearer token.
pub const TOKEN_KEY: &str = "Admin-Token";

/// Storage key for the cached identity JSON blob.
pub const IDENTITY_KEY: &str = "userInfo";

/// Persists and retrieves the session token and cached identity.
///
/// Implementations are synchronous. The session context calls them before
/// it publishes a change in memory, never while readers are locked out,
/// so slow storage delays other session writers but not readers.
pub trait CredentialStore: Send + Sync + 'static {
    /// Returns the stored token, or `None` if there is none.
    fn get(&self) -> Option<Token>;

    /// Stores the token, replacing any previous one.
    fn set(&self, token: &Token);

    /// Removes the stored token. A no-op if there is none.
    fn clear(&self);

    /// Returns the cached identity, or `None` if absent or unreadable.
    fn cached_identity(&self) -> Option<Identity>;

    /// Caches the identity, replacing any previous one.
    fn set_cached_identity(&self, identity: &Identity);

    /// Removes the cached identity. A no-op if there is none.
    fn clear_cached_identity(&self);
}

// ---------------------------------------------------------------------------
// MemoryCredentialStore
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct Slots {
    token: Option<Token>,
    identity: Option<Identity>,
}

/// A [`CredentialStore`] that keeps everything in memory.
///
/// Nothing survives a restart. Useful for tests and for hosts that
/// deliberately don't want a session to outlive the process.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    slots: Mutex<Slots>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_slots<R>(&self, f: impl FnOnce(&mut Slots) -> R) -> R {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut slots)
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self) -> Option<Token> {
        self.with_slots(|s| s.token.clone())
    }

    fn set(&self, token: &Token) {
        self.with_slots(|s| s.token = Some(token.clone()));
    }

    fn clear(&self) {
        self.with_slots(|s| s.token = None);
    }

    fn cached_identity(&self) -> Option<Identity> {
        self.with_slots(|s| s.identity.clone())
    }

    fn set_cached_identity(&self, identity: &Identity) {
        self.with_slots(|s| s.identity = Some(identity.clone()));
    }

    fn clear_cached_identity(&self) {
        self.with_slots(|s| s.identity = None);
    }
}

// ---------------------------------------------------------------------------
// FileCredentialStore
// ---------------------------------------------------------------------------

/// A [`CredentialStore`] that keeps one file per key in a directory.
///
/// ```text
/// <dir>/Admin-Token   raw token text
/// <dir>/userInfo      identity JSON
/// ```
///
/// Writes go to a temporary file first and are renamed into place, so a
/// crash mid-write never leaves a half-written token behind.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    dir: PathBuf,
}

impl FileCredentialStore {
    /// Creates a store rooted at `dir`. The directory is created lazily
    /// on the first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The directory this store writes into.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }

    fn read(&self, key: &str) -> Option<String> {
        match fs::read_to_string(self.path(key)) {
            Ok(text) => Some(text),
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => {
                tracing::warn!(key, error = %e, "failed to read credential entry");
                None
            }
        }
    }

    fn write(&self, key: &str, contents: &[u8]) {
        if let Err(e) = write_atomic(&self.dir, key, contents) {
            tracing::warn!(key, error = %e, "failed to persist credential entry");
        }
    }

    fn remove(&self, key: &str) {
        match fs::remove_file(self.path(key)) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(key, error = %e, "failed to remove credential entry");
            }
        }
    }
}

fn write_atomic(dir: &Path, key: &str, contents: &[u8]) -> io::Result<()> {
    fs::create_dir_all(dir)?;
    let tmp = dir.join(format!(".{key}.tmp"));
    fs::write(&tmp, contents)?;
    fs::rename(&tmp, dir.join(key))
}

impl CredentialStore for FileCredentialStore {
    fn get(&self) -> Option<Token> {
        let text = self.read(TOKEN_KEY)?;
        let token = Token::new(text.trim());
        (!token.is_blank()).then_some(token)
    }

    fn set(&self, token: &Token) {
        self.write(TOKEN_KEY, token.as_str().as_bytes());
    }

    fn clear(&self) {
        self.remove(TOKEN_KEY);
    }

    fn cached_identity(&self) -> Option<Identity> {
        let text = self.read(IDENTITY_KEY)?;
        match serde_json::from_str(&text) {
            Ok(identity) => Some(identity),
            Err(e) => {
                tracing::warn!(error = %e, "cached identity is unreadable, ignoring it");
                None
            }
        }
    }

    fn set_cached_identity(&self, identity: &Identity) {
        match serde_json::to_vec(identity) {
            Ok(bytes) => self.write(IDENTITY_KEY, &bytes),
            Err(e) => tracing::warn!(error = %e, "failed to encode identity"),
        }
    }

    fn clear_cached_identity(&self) {
        self.remove(IDENTITY_KEY);
    }
}

#[cfg(test)]
mod tests {
    use adminward_protocol::Role;

    use super::*;

    fn alice() -> Identity {
        Identity::new("alice", Role::ADMIN).with_email("alice@example.com")
    }

    // =====================================================================
    // MemoryCredentialStore
    // =====================================================================

    #[test]
    fn test_memory_store_starts_empty() {
        let store = MemoryCredentialStore::new();

        assert!(store.get().is_none());
        assert!(store.cached_identity().is_none());
    }

    #[test]
    fn test_memory_store_set_get_clear() {
        let store = MemoryCredentialStore::new();

        store.set(&Token::new("t-1"));
        store.set_cached_identity(&alice());
        assert_eq!(store.get(), Some(Token::new("t-1")));
        assert_eq!(store.cached_identity(), Some(alice()));

        store.clear();
        store.clear_cached_identity();
        assert!(store.get().is_none());
        assert!(store.cached_identity().is_none());
    }

    #[test]
    fn test_memory_store_clear_when_empty_is_noop() {
        let store = MemoryCredentialStore::new();

        store.clear();
        store.clear_cached_identity();

        assert!(store.get().is_none());
    }

    // =====================================================================
    // FileCredentialStore
    // =====================================================================

    #[test]
    fn test_file_store_survives_a_new_instance() {
        // A "reload" is a fresh store pointed at the same directory.
        let dir = tempfile::tempdir().unwrap();
        let first = FileCredentialStore::new(dir.path());
        first.set(&Token::new("persisted"));
        first.set_cached_identity(&alice());

        let second = FileCredentialStore::new(dir.path());

        assert_eq!(second.get(), Some(Token::new("persisted")));
        assert_eq!(second.cached_identity(), Some(alice()));
    }

    #[test]
    fn test_file_store_writes_one_file_per_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path());
        store.set(&Token::new("abc"));
        store.set_cached_identity(&alice());

        let token_text = fs::read_to_string(dir.path().join(TOKEN_KEY)).unwrap();
        assert_eq!(token_text, "abc");
        assert!(dir.path().join(IDENTITY_KEY).exists());
    }

    #[test]
    fn test_file_store_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let store = FileCredentialStore::new(&nested);

        store.set(&Token::new("t"));

        assert_eq!(store.get(), Some(Token::new("t")));
    }

    #[test]
    fn test_file_store_clear_removes_files_and_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path());
        store.set(&Token::new("t"));
        store.set_cached_identity(&alice());

        store.clear();
        store.clear_cached_identity();
        store.clear();
        store.clear_cached_identity();

        assert!(store.get().is_none());
        assert!(store.cached_identity().is_none());
        assert!(!dir.path().join(TOKEN_KEY).exists());
    }

    #[test]
    fn test_file_store_blank_token_reads_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(TOKEN_KEY), "  \n").unwrap();

        let store = FileCredentialStore::new(dir.path());

        assert!(store.get().is_none());
    }

    #[test]
    fn test_file_store_corrupt_identity_reads_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(IDENTITY_KEY), "{not json").unwrap();

        let store = FileCredentialStore::new(dir.path());

        assert!(store.cached_identity().is_none());
    }

    #[test]
    fn test_file_store_missing_directory_reads_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path().join("never-created"));

        assert!(store.get().is_none());
        assert!(store.cached_identity().is_none());
    }
}
