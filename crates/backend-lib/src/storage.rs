// ============================
// contacts-backend-lib/src/storage.rs
// ============================
//! Credential storage abstraction with in-memory and flat-file implementations.
use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use async_trait::async_trait;
use dashmap::{mapref::entry::Entry, DashMap};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::{
    fs as tokio_fs,
    io::AsyncWriteExt,
    sync::{Mutex, OwnedMutexGuard},
};

use crate::auth::password::constant_time_eq;

/// Storage failures
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Identity already registered: {0}")]
    AlreadyExists(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Persisted authentication record for one identity
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    /// Unique, email-like identity
    pub identity: String,
    /// Hex SHA-256 of password bytes followed by salt bytes
    pub password_hash: String,
    /// Hex-encoded 16 byte salt
    pub salt: String,
    /// The single live refresh token, if any
    #[serde(default)]
    pub refresh_token: Option<String>,
}

impl Credential {
    pub fn new(identity: &str, password_hash: String, salt: String) -> Self {
        Self {
            identity: identity.to_string(),
            password_hash,
            salt,
            refresh_token: None,
        }
    }

    /// Compare-and-swap on the stored refresh token.
    ///
    /// A mismatch clears the stored token, revoking the session.
    fn rotate(&mut self, presented: &str, replacement: String) -> RotateOutcome {
        let matches = self
            .refresh_token
            .as_deref()
            .is_some_and(|stored| constant_time_eq(stored.as_bytes(), presented.as_bytes()));
        if matches {
            self.refresh_token = Some(replacement);
            RotateOutcome::Rotated
        } else {
            self.refresh_token = None;
            RotateOutcome::Mismatch
        }
    }
}

/// Result of [`UserStore::rotate_refresh_token`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotateOutcome {
    /// Presented token was current and has been replaced
    Rotated,
    /// Presented token was stale or forged; stored token is now cleared
    Mismatch,
    /// Identity has no credential
    Missing,
}

/// Trait for credential storage backends
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Look up a credential by identity
    async fn find_by_identity(&self, identity: &str) -> Result<Option<Credential>, StoreError>;

    /// Store a freshly registered credential
    async fn persist_new_credential(
        &self,
        identity: &str,
        password_hash: String,
        salt: String,
    ) -> Result<Credential, StoreError>;

    /// Overwrite (or clear, with `None`) the stored refresh token
    async fn persist_refresh_token(
        &self,
        identity: &str,
        token: Option<String>,
    ) -> Result<(), StoreError>;

    /// Replace the stored refresh token with `replacement` iff it equals `presented`.
    ///
    /// The read, compare and write happen under one per-identity critical section.
    async fn rotate_refresh_token(
        &self,
        identity: &str,
        presented: &str,
        replacement: String,
    ) -> Result<RotateOutcome, StoreError>;
}

/// In-memory store; each DashMap shard lock serializes writes to one identity
#[derive(Clone, Default)]
pub struct MemoryUserStore {
    users: Arc<DashMap<String, Credential>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_identity(&self, identity: &str) -> Result<Option<Credential>, StoreError> {
        Ok(self.users.get(identity).map(|c| c.clone()))
    }

    async fn persist_new_credential(
        &self,
        identity: &str,
        password_hash: String,
        salt: String,
    ) -> Result<Credential, StoreError> {
        match self.users.entry(identity.to_string()) {
            Entry::Occupied(_) => Err(StoreError::AlreadyExists(identity.to_string())),
            Entry::Vacant(slot) => {
                let credential = Credential::new(identity, password_hash, salt);
                slot.insert(credential.clone());
                Ok(credential)
            },
        }
    }

    async fn persist_refresh_token(
        &self,
        identity: &str,
        token: Option<String>,
    ) -> Result<(), StoreError> {
        let mut credential = self
            .users
            .get_mut(identity)
            .ok_or_else(|| StoreError::NotFound(identity.to_string()))?;
        credential.refresh_token = token;
        Ok(())
    }

    async fn rotate_refresh_token(
        &self,
        identity: &str,
        presented: &str,
        replacement: String,
    ) -> Result<RotateOutcome, StoreError> {
        Ok(match self.users.get_mut(identity) {
            Some(mut credential) => credential.rotate(presented, replacement),
            None => RotateOutcome::Missing,
        })
    }
}

/// Flat-file implementation: one JSON document per identity
#[derive(Clone)]
pub struct FlatFileUserStore {
    root: PathBuf,
    locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl FlatFileUserStore {
    pub fn new<P: AsRef<Path>>(root: P) -> anyhow::Result<Self> {
        let root = root.as_ref().join("users");
        fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            locks: Arc::new(DashMap::new()),
        })
    }

    /// Identities are hex-encoded so arbitrary emails map to safe file names
    fn path_for(&self, identity: &str) -> PathBuf {
        self.root.join(format!("{}.json", hex::encode(identity.as_bytes())))
    }

    /// Serialize access to one identity's document until the guard drops
    async fn lock(&self, identity: &str) -> IdentityGuard<'_> {
        let lock = self
            .locks
            .entry(identity.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        IdentityGuard {
            locks: &self.locks,
            identity: identity.to_string(),
            guard: Some(lock.lock_owned().await),
        }
    }

    async fn read(&self, identity: &str) -> Result<Option<Credential>, StoreError> {
        let path = self.path_for(identity);
        match tokio_fs::read_to_string(&path).await {
            Ok(content) => Ok(Some(serde_json::from_str(&content)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Write through a temp file + rename so readers never see a torn document
    async fn write(&self, credential: &Credential) -> Result<(), StoreError> {
        let path = self.path_for(&credential.identity);
        let tmp = path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(credential)?;

        let mut file = tokio_fs::File::create(&tmp).await?;
        file.write_all(json.as_bytes()).await?;
        file.sync_all().await?;
        tokio_fs::rename(&tmp, &path).await?;
        Ok(())
    }
}

/// Held per-identity lock; the map entry is dropped once no one else holds or awaits it
struct IdentityGuard<'a> {
    locks: &'a DashMap<String, Arc<Mutex<()>>>,
    identity: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for IdentityGuard<'_> {
    fn drop(&mut self) {
        self.guard.take();
        self.locks
            .remove_if(&self.identity, |_, lock| Arc::strong_count(lock) == 1);
    }
}

#[async_trait]
impl UserStore for FlatFileUserStore {
    async fn find_by_identity(&self, identity: &str) -> Result<Option<Credential>, StoreError> {
        self.read(identity).await
    }

    async fn persist_new_credential(
        &self,
        identity: &str,
        password_hash: String,
        salt: String,
    ) -> Result<Credential, StoreError> {
        let _guard = self.lock(identity).await;

        if self.read(identity).await?.is_some() {
            return Err(StoreError::AlreadyExists(identity.to_string()));
        }
        let credential = Credential::new(identity, password_hash, salt);
        self.write(&credential).await?;
        Ok(credential)
    }

    async fn persist_refresh_token(
        &self,
        identity: &str,
        token: Option<String>,
    ) -> Result<(), StoreError> {
        let _guard = self.lock(identity).await;

        let mut credential = self
            .read(identity)
            .await?
            .ok_or_else(|| StoreError::NotFound(identity.to_string()))?;
        credential.refresh_token = token;
        self.write(&credential).await
    }

    async fn rotate_refresh_token(
        &self,
        identity: &str,
        presented: &str,
        replacement: String,
    ) -> Result<RotateOutcome, StoreError> {
        let _guard = self.lock(identity).await;

        let Some(mut credential) = self.read(identity).await? else {
            return Ok(RotateOutcome::Missing);
        };
        let outcome = credential.rotate(presented, replacement);
        self.write(&credential).await?;
        Ok(outcome)
    }
}
