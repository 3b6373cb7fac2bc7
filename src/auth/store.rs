//! Credential storage for the access/refresh token pair.
//!
//! The store is deliberately dumb: two string slots keyed `"access"` and
//! `"refresh"`, read fresh on every request. The API client owns all refresh
//! logic; the store only persists whatever it is told.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Token file name in the data directory
const TOKEN_FILE: &str = "tokens.json";

/// Which credential a store operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    /// Storage key for this credential.
    pub fn key(&self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
        }
    }
}

/// Key-value storage for the credential pair.
///
/// Implementations must not cache values across calls: the client re-reads
/// the store on every request, so a token rotated by a concurrent caller is
/// picked up immediately.
pub trait TokenStore: Send + Sync {
    fn get(&self, kind: TokenKind) -> Result<Option<String>>;
    fn set(&self, kind: TokenKind, value: &str) -> Result<()>;
    fn delete(&self, kind: TokenKind) -> Result<()>;
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct TokenFile {
    access: Option<String>,
    refresh: Option<String>,
}

/// Disk-backed store: `tokens.json` under the per-user data directory.
pub struct DiskTokenStore {
    path: PathBuf,
}

impl DiskTokenStore {
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            path: data_dir.join(TOKEN_FILE),
        }
    }

    fn read_file(&self) -> Result<TokenFile> {
        if self.path.exists() {
            let contents = std::fs::read_to_string(&self.path)
                .context("Failed to read token file")?;
            Ok(serde_json::from_str(&contents).context("Failed to parse token file")?)
        } else {
            Ok(TokenFile::default())
        }
    }

    fn write_file(&self, tokens: &TokenFile) -> Result<()> {
        // Remove the file entirely once both slots are empty (logout)
        if tokens.access.is_none() && tokens.refresh.is_none() {
            if self.path.exists() {
                std::fs::remove_file(&self.path).context("Failed to remove token file")?;
            }
            return Ok(());
        }

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(tokens)?;
        std::fs::write(&self.path, contents).context("Failed to write token file")?;
        Ok(())
    }
}

impl TokenStore for DiskTokenStore {
    fn get(&self, kind: TokenKind) -> Result<Option<String>> {
        let tokens = self.read_file()?;
        Ok(match kind {
            TokenKind::Access => tokens.access,
            TokenKind::Refresh => tokens.refresh,
        })
    }

    fn set(&self, kind: TokenKind, value: &str) -> Result<()> {
        let mut tokens = self.read_file().unwrap_or_default();
        match kind {
            TokenKind::Access => tokens.access = Some(value.to_string()),
            TokenKind::Refresh => tokens.refresh = Some(value.to_string()),
        }
        self.write_file(&tokens)
    }

    fn delete(&self, kind: TokenKind) -> Result<()> {
        let mut tokens = self.read_file().unwrap_or_default();
        match kind {
            TokenKind::Access => tokens.access = None,
            TokenKind::Refresh => tokens.refresh = None,
        }
        self.write_file(&tokens)
    }
}

/// In-memory store for tests and one-off sessions (e.g. the export command
/// when no tokens are saved on disk).
#[derive(Default)]
pub struct MemoryTokenStore {
    entries: Mutex<HashMap<&'static str, String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct pre-populated with the given credentials.
    pub fn with_tokens(access: Option<&str>, refresh: Option<&str>) -> Self {
        let store = Self::default();
        {
            let mut entries = store.entries.lock().unwrap_or_else(|e| e.into_inner());
            if let Some(access) = access {
                entries.insert(TokenKind::Access.key(), access.to_string());
            }
            if let Some(refresh) = refresh {
                entries.insert(TokenKind::Refresh.key(), refresh.to_string());
            }
        }
        store
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<&'static str, String>>> {
        self.entries
            .lock()
            .map_err(|_| anyhow::anyhow!("Token store lock poisoned"))
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self, kind: TokenKind) -> Result<Option<String>> {
        Ok(self.lock()?.get(kind.key()).cloned())
    }

    fn set(&self, kind: TokenKind, value: &str) -> Result<()> {
        self.lock()?.insert(kind.key(), value.to_string());
        Ok(())
    }

    fn delete(&self, kind: TokenKind) -> Result<()> {
        self.lock()?.remove(kind.key());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_kind_keys() {
        assert_eq!(TokenKind::Access.key(), "access");
        assert_eq!(TokenKind::Refresh.key(), "refresh");
    }

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryTokenStore::new();
        assert_eq!(store.get(TokenKind::Access).unwrap(), None);

        store.set(TokenKind::Access, "abc").unwrap();
        store.set(TokenKind::Refresh, "def").unwrap();
        assert_eq!(store.get(TokenKind::Access).unwrap().as_deref(), Some("abc"));
        assert_eq!(store.get(TokenKind::Refresh).unwrap().as_deref(), Some("def"));

        store.delete(TokenKind::Access).unwrap();
        assert_eq!(store.get(TokenKind::Access).unwrap(), None);
        assert_eq!(store.get(TokenKind::Refresh).unwrap().as_deref(), Some("def"));
    }

    #[test]
    fn test_disk_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = DiskTokenStore::new(dir.path().to_path_buf());

        assert_eq!(store.get(TokenKind::Access).unwrap(), None);

        store.set(TokenKind::Access, "tok-a").unwrap();
        store.set(TokenKind::Refresh, "tok-r").unwrap();
        assert_eq!(store.get(TokenKind::Access).unwrap().as_deref(), Some("tok-a"));

        // A second store at the same path sees the same data - nothing is
        // held in memory between calls
        let other = DiskTokenStore::new(dir.path().to_path_buf());
        assert_eq!(other.get(TokenKind::Refresh).unwrap().as_deref(), Some("tok-r"));

        other.set(TokenKind::Access, "rotated").unwrap();
        assert_eq!(store.get(TokenKind::Access).unwrap().as_deref(), Some("rotated"));
    }

    #[test]
    fn test_disk_store_removes_file_when_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = DiskTokenStore::new(dir.path().to_path_buf());

        store.set(TokenKind::Access, "a").unwrap();
        store.set(TokenKind::Refresh, "r").unwrap();
        assert!(dir.path().join("tokens.json").exists());

        store.delete(TokenKind::Access).unwrap();
        assert!(dir.path().join("tokens.json").exists());

        store.delete(TokenKind::Refresh).unwrap();
        assert!(!dir.path().join("tokens.json").exists());
    }
}
