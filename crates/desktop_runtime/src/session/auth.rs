//! Login and account registration against the durable account store.

use std::{sync::Arc, time::Duration};

use desktop_app_contract::Credentials;
use platform_host::{AccountRecord, AccountStore};
use tokio::sync::Mutex;
use tracing::{info, warn};

use super::{credentials::CredentialHasher, AuthError, SessionToken};
use crate::model::SessionProfile;

/// Result of a successful login, applied to the session store by the runtime.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthenticatedSession {
    pub username: String,
    pub token: SessionToken,
    pub password_hash: String,
    pub profile: SessionProfile,
}

/// Serializes login attempts and simulates the network round-trip.
pub struct Authenticator {
    store: Arc<dyn AccountStore>,
    hasher: CredentialHasher,
    latency: Duration,
    gate: Mutex<()>,
}

impl Authenticator {
    pub fn new(store: Arc<dyn AccountStore>, hasher: CredentialHasher, latency: Duration) -> Self {
        Self {
            store,
            hasher,
            latency,
            gate: Mutex::new(()),
        }
    }

    /// Verifies `credentials` and loads the stored profile.
    ///
    /// Only one attempt may be in flight; a concurrent attempt is rejected with
    /// [`AuthError::LoginInProgress`]. Missing accounts, wrong passwords, storage failures, and
    /// unreadable profiles all surface as [`AuthError::InvalidCredentials`].
    pub async fn login(&self, credentials: &Credentials) -> Result<AuthenticatedSession, AuthError> {
        let Ok(_in_flight) = self.gate.try_lock() else {
            return Err(AuthError::LoginInProgress);
        };
        tokio::time::sleep(self.latency).await;

        let username = credentials.username.as_str();
        let record = match self.store.load_account(username).await {
            Ok(Some(record)) => record,
            Ok(None) => {
                info!(username, "login rejected: no such account");
                return Err(AuthError::InvalidCredentials);
            }
            Err(err) => {
                warn!(username, "login rejected: account lookup failed: {err}");
                return Err(AuthError::InvalidCredentials);
            }
        };
        if !self.hasher.verify(&credentials.password, &record.password_hash) {
            info!(username, "login rejected: password mismatch");
            return Err(AuthError::InvalidCredentials);
        }
        let profile = serde_json::from_value::<SessionProfile>(record.profile).map_err(|err| {
            warn!(username, "login rejected: stored profile unreadable: {err}");
            AuthError::InvalidCredentials
        })?;

        info!(username, "login succeeded");
        Ok(AuthenticatedSession {
            username: username.to_string(),
            token: SessionToken::generate(),
            password_hash: record.password_hash,
            profile,
        })
    }

    /// Registers a new account seeded with `seed_profile`. Does not log in.
    pub async fn create_account(
        &self,
        credentials: &Credentials,
        seed_profile: &SessionProfile,
    ) -> Result<(), AuthError> {
        tokio::time::sleep(self.latency).await;

        let username = credentials.username.as_str();
        if self
            .store
            .load_account(username)
            .await
            .map_err(AuthError::Storage)?
            .is_some()
        {
            info!(username, "account creation rejected: username taken");
            return Err(AuthError::UsernameTaken);
        }

        let password_hash = self.hasher.hash(&credentials.password)?;
        let profile =
            serde_json::to_value(seed_profile).map_err(|err| AuthError::Storage(err.to_string()))?;
        let record = AccountRecord::new(username, password_hash, profile);
        self.store
            .save_account(username, &record)
            .await
            .map_err(|err| {
                warn!(username, "account creation failed: {err}");
                AuthError::Storage(err)
            })?;
        info!(username, "account created");
        Ok(())
    }
}
