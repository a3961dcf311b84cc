//! Bearer-token issue, extension, and the authorization gate used by
//! mutating operations on a user's checks.

use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use crate::error::StoreError;
use crate::helpers::{self, RECORD_ID_LEN};
use crate::models::Token;
use crate::store::{FileStore, TOKENS};

/// Default token lifetime: one hour.
pub const TOKEN_LIFETIME_MS: i64 = 60 * 60 * 1000;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token is expired")]
    Expired,
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub struct TokenAuthorizer {
    store: Arc<FileStore>,
}

impl TokenAuthorizer {
    pub fn new(store: Arc<FileStore>) -> Self {
        Self { store }
    }

    /// True only if the token exists, belongs to `phone`, and is unexpired.
    ///
    /// A missing or unreadable token is a normal negative result, never an
    /// error: callers treat `false` as "not authorized" and move on.
    pub async fn verify(&self, token_id: &str, phone: &str) -> bool {
        match self.store.read::<Token>(TOKENS, token_id).await {
            Ok(token) => token.phone == phone && token.is_live(Utc::now().timestamp_millis()),
            Err(e) => {
                debug!(token = %token_id, error = %e, "token lookup failed during verification");
                false
            }
        }
    }

    /// Mint and persist a fresh token for a user.
    pub async fn issue(&self, phone: &str) -> Result<Token, TokenError> {
        let token = Token {
            id: helpers::random_id(RECORD_ID_LEN),
            phone: phone.to_string(),
            expires: Utc::now().timestamp_millis() + TOKEN_LIFETIME_MS,
        };
        self.store.create(TOKENS, &token.id, &token).await?;
        Ok(token)
    }

    /// Push a token's expiry forward by one lifetime. Only live tokens can be
    /// extended; expired ones are left as unreachable garbage.
    pub async fn extend(&self, token_id: &str) -> Result<Token, TokenError> {
        let mut token: Token = self.store.read(TOKENS, token_id).await?;
        if !token.is_live(Utc::now().timestamp_millis()) {
            return Err(TokenError::Expired);
        }
        token.expires = Utc::now().timestamp_millis() + TOKEN_LIFETIME_MS;
        self.store.update(TOKENS, &token.id, &token).await?;
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn authorizer() -> (TempDir, Arc<FileStore>, TokenAuthorizer) {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(FileStore::new(dir.path()));
        let auth = TokenAuthorizer::new(store.clone());
        (dir, store, auth)
    }

    async fn store_token(store: &FileStore, id: &str, phone: &str, expires: i64) {
        let token = Token { id: id.to_string(), phone: phone.to_string(), expires };
        store.create(TOKENS, id, &token).await.unwrap();
    }

    #[tokio::test]
    async fn verify_accepts_live_token_with_matching_owner() {
        let (_dir, store, auth) = authorizer();
        let future = Utc::now().timestamp_millis() + 60_000;
        store_token(&store, "tok1", "5551234567", future).await;

        assert!(auth.verify("tok1", "5551234567").await);
    }

    #[tokio::test]
    async fn verify_rejects_expired_token_even_with_matching_owner() {
        let (_dir, store, auth) = authorizer();
        let past = Utc::now().timestamp_millis() - 1_000;
        store_token(&store, "tok1", "5551234567", past).await;

        assert!(!auth.verify("tok1", "5551234567").await);
    }

    #[tokio::test]
    async fn verify_rejects_mismatched_owner_even_when_unexpired() {
        let (_dir, store, auth) = authorizer();
        let future = Utc::now().timestamp_millis() + 60_000;
        store_token(&store, "tok1", "5551234567", future).await;

        assert!(!auth.verify("tok1", "5559999999").await);
    }

    #[tokio::test]
    async fn verify_treats_missing_token_as_plain_denial() {
        let (_dir, _store, auth) = authorizer();
        assert!(!auth.verify("no-such-token", "5551234567").await);
    }

    #[tokio::test]
    async fn issued_tokens_verify_for_their_owner() {
        let (_dir, _store, auth) = authorizer();
        let token = auth.issue("5551234567").await.unwrap();
        assert_eq!(token.id.len(), RECORD_ID_LEN);
        assert!(auth.verify(&token.id, "5551234567").await);
    }

    #[tokio::test]
    async fn extend_pushes_expiry_forward_only_while_live() {
        let (_dir, store, auth) = authorizer();
        let token = auth.issue("5551234567").await.unwrap();

        let extended = auth.extend(&token.id).await.unwrap();
        assert!(extended.expires >= token.expires);

        let past = Utc::now().timestamp_millis() - 1_000;
        store_token(&store, "stale", "5551234567", past).await;
        let err = auth.extend("stale").await.unwrap_err();
        assert!(matches!(err, TokenError::Expired));
    }
}
