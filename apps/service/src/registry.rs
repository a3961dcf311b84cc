//! Check ownership bookkeeping over the record store.
//!
//! The request handlers call these operations after the token gate passes;
//! everything here keeps the user's `checks` list and the check records
//! consistent with each other.

use std::sync::Arc;
use tracing::warn;

use crate::error::{RegistryError, StoreError};
use crate::helpers::{self, RECORD_ID_LEN};
use crate::models::{Check, CheckState, HttpMethod, Protocol, User};
use crate::monitoring::validation::validate_check;
use crate::store::{CHECKS, FileStore, USERS};

/// Fields supplied when registering a check.
#[derive(Debug, Clone)]
pub struct NewCheck {
    pub protocol: Protocol,
    pub url: String,
    pub method: HttpMethod,
    pub success_codes: Vec<u16>,
    pub timeout_seconds: u64,
}

/// Partial update of a check's probe parameters. Absent fields are left
/// untouched; ownership and state are never updatable this way.
#[derive(Debug, Clone, Default)]
pub struct CheckUpdate {
    pub protocol: Option<Protocol>,
    pub url: Option<String>,
    pub method: Option<HttpMethod>,
    pub success_codes: Option<Vec<u16>>,
    pub timeout_seconds: Option<u64>,
}

pub struct CheckRegistry {
    store: Arc<FileStore>,
    max_checks: usize,
}

impl CheckRegistry {
    pub fn new(store: Arc<FileStore>, max_checks: usize) -> Self {
        Self { store, max_checks }
    }

    /// Register a check for a user, enforcing the per-user maximum and
    /// appending the new id to the owner's `checks` list.
    pub async fn create_check(&self, phone: &str, params: NewCheck) -> Result<Check, RegistryError> {
        let mut user: User = self.store.read(USERS, phone).await?;
        if user.checks.len() >= self.max_checks {
            return Err(RegistryError::TooManyChecks(self.max_checks));
        }

        let check = Check {
            id: helpers::random_id(RECORD_ID_LEN),
            user_phone: phone.to_string(),
            protocol: params.protocol,
            url: params.url,
            method: params.method,
            success_codes: params.success_codes,
            timeout_seconds: params.timeout_seconds,
            state: CheckState::Down,
            last_checked: None,
        };
        validate_check(&check)?;

        self.store.create(CHECKS, &check.id, &check).await?;
        user.checks.push(check.id.clone());
        self.store.update(USERS, phone, &user).await?;
        Ok(check)
    }

    /// Apply a partial update, each field landing in its own slot, and
    /// re-validate the whole record before persisting.
    pub async fn update_check(&self, id: &str, update: CheckUpdate) -> Result<Check, RegistryError> {
        let mut check: Check = self.store.read(CHECKS, id).await?;

        if let Some(protocol) = update.protocol {
            check.protocol = protocol;
        }
        if let Some(url) = update.url {
            check.url = url;
        }
        if let Some(method) = update.method {
            check.method = method;
        }
        if let Some(success_codes) = update.success_codes {
            check.success_codes = success_codes;
        }
        if let Some(timeout_seconds) = update.timeout_seconds {
            check.timeout_seconds = timeout_seconds;
        }
        validate_check(&check)?;

        self.store.update(CHECKS, id, &check).await?;
        Ok(check)
    }

    /// Delete a check and remove its id from the owner's `checks` list.
    pub async fn delete_check(&self, id: &str) -> Result<(), RegistryError> {
        let check: Check = self.store.read(CHECKS, id).await?;
        self.store.delete(CHECKS, id).await?;

        let mut user: User = self.store.read(USERS, &check.user_phone).await?;
        user.checks.retain(|owned| owned != id);
        self.store.update(USERS, &check.user_phone, &user).await?;
        Ok(())
    }

    /// Delete a user and every check they own. All check records are gone
    /// before the user record is removed.
    pub async fn delete_user(&self, phone: &str) -> Result<(), RegistryError> {
        let user: User = self.store.read(USERS, phone).await?;

        for check_id in &user.checks {
            match self.store.delete(CHECKS, check_id).await {
                Ok(()) => {}
                Err(StoreError::NotFound) => {
                    warn!(check = %check_id, "owned check was already gone during cascade delete");
                }
                Err(e) => return Err(e.into()),
            }
        }

        self.store.delete(USERS, phone).await?;
        Ok(())
    }
}
