//! Durable account storage contracts, record types, and adapters.

use std::{collections::HashMap, future::Future, pin::Pin, sync::Arc};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Prefix applied to usernames to form storage keys.
pub const ACCOUNT_KEY_PREFIX: &str = "arsis-user-";

/// Returns the storage key for `username`.
pub fn account_storage_key(username: &str) -> String {
    format!("{ACCOUNT_KEY_PREFIX}{username}")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Durable record for one account.
///
/// The profile is stored as an opaque JSON blob; no schema version is attached.
pub struct AccountRecord {
    /// Account name.
    pub username: String,
    /// PHC-format password hash.
    pub password_hash: String,
    /// Serialized profile data.
    pub profile: Value,
    /// Last update time in unix milliseconds.
    pub updated_at_unix_ms: u64,
}

impl AccountRecord {
    /// Creates a record and stamps it with a monotonic timestamp.
    pub fn new(username: impl Into<String>, password_hash: impl Into<String>, profile: Value) -> Self {
        Self {
            username: username.into(),
            password_hash: password_hash.into(),
            profile,
            updated_at_unix_ms: crate::time::next_monotonic_timestamp_ms(),
        }
    }
}

/// Object-safe boxed future used by [`AccountStore`] async methods.
pub type AccountStoreFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Durable storage collaborator keyed by username.
///
/// Writes carry no delivery guarantee; callers treat them as best-effort.
pub trait AccountStore: Send + Sync {
    /// Loads the record stored for `username`.
    fn load_account<'a>(
        &'a self,
        username: &'a str,
    ) -> AccountStoreFuture<'a, Result<Option<AccountRecord>, String>>;

    /// Stores `record` under `username`, replacing any previous record.
    fn save_account<'a>(
        &'a self,
        username: &'a str,
        record: &'a AccountRecord,
    ) -> AccountStoreFuture<'a, Result<(), String>>;
}

#[derive(Debug, Clone, Copy, Default)]
/// Account store that never finds records and accepts and discards writes.
pub struct NoopAccountStore;

impl AccountStore for NoopAccountStore {
    fn load_account<'a>(
        &'a self,
        _username: &'a str,
    ) -> AccountStoreFuture<'a, Result<Option<AccountRecord>, String>> {
        Box::pin(async { Ok(None) })
    }

    fn save_account<'a>(
        &'a self,
        _username: &'a str,
        _record: &'a AccountRecord,
    ) -> AccountStoreFuture<'a, Result<(), String>> {
        Box::pin(async { Ok(()) })
    }
}

#[derive(Debug, Clone, Default)]
/// In-memory account store keyed by [`account_storage_key`].
pub struct MemoryAccountStore {
    inner: Arc<Mutex<HashMap<String, AccountRecord>>>,
}

impl MemoryAccountStore {
    /// Number of stored accounts.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Returns `true` when no account is stored.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Reads a record without going through the async contract.
    pub fn get(&self, username: &str) -> Option<AccountRecord> {
        self.inner.lock().get(&account_storage_key(username)).cloned()
    }
}

impl AccountStore for MemoryAccountStore {
    fn load_account<'a>(
        &'a self,
        username: &'a str,
    ) -> AccountStoreFuture<'a, Result<Option<AccountRecord>, String>> {
        Box::pin(async move { Ok(self.get(username)) })
    }

    fn save_account<'a>(
        &'a self,
        username: &'a str,
        record: &'a AccountRecord,
    ) -> AccountStoreFuture<'a, Result<(), String>> {
        Box::pin(async move {
            self.inner
                .lock()
                .insert(account_storage_key(username), record.clone());
            Ok(())
        })
    }
}
