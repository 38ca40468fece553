//! Session credential issuance, verification, rotation and revocation.
//!
//! Access tokens are stateless HS256 JWTs checked purely by signature and
//! TTL. Refresh tokens are opaque random values persisted only as the
//! identity's single pointer; "valid" means "equals the stored pointer", and
//! rotation replaces the pointer with a compare-and-swap so a superseded
//! token can never rotate again.

use std::sync::Arc;

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use rand::RngCore;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::Claims;
use crate::error::{Error, Result};
use crate::store::IdentityRepository;

pub const DEFAULT_ACCESS_TTL_SECS: i64 = 900;

/// Access + refresh pair handed out at login and rotation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionTokens {
    pub access_token: String,
    pub refresh_token: String,
    /// Access-token lifetime in seconds.
    pub expires_in: i64,
}

pub struct TokenService {
    identities: Arc<dyn IdentityRepository>,
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    access_ttl: Duration,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService").finish_non_exhaustive()
    }
}

impl TokenService {
    pub fn new(
        identities: Arc<dyn IdentityRepository>,
        secret: &str,
        access_ttl_secs: i64,
    ) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        Self {
            identities,
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            access_ttl: Duration::seconds(access_ttl_secs),
        }
    }

    /// Mint a fresh access+refresh pair and overwrite the identity's refresh
    /// pointer with the new value. The single write unconditionally
    /// invalidates whatever refresh token was live before.
    pub async fn issue_session(&self, user_id: Uuid) -> Result<SessionTokens> {
        let tokens = self.mint_pair(user_id)?;
        self.identities
            .set_refresh_token(user_id, Some(&tokens.refresh_token))
            .await?;
        Ok(tokens)
    }

    /// Stateless verification: signature plus TTL, no store access.
    pub fn verify_access(&self, token: &str) -> Result<Uuid> {
        match decode::<Claims>(token, &self.decoding, &self.validation) {
            Ok(data) => Ok(data.claims.sub),
            Err(err) if matches!(err.kind(), ErrorKind::ExpiredSignature) => {
                Err(Error::TokenExpired)
            }
            Err(_) => Err(Error::TokenInvalid),
        }
    }

    /// Exchange a live refresh token for a fresh pair. The pointer swap is
    /// conditional on the presented value still being current, which rejects
    /// replay of superseded tokens and lets exactly one of two concurrent
    /// rotations win.
    pub async fn rotate(&self, user_id: Uuid, presented: &str) -> Result<SessionTokens> {
        let tokens = self.mint_pair(user_id)?;
        let swapped = self
            .identities
            .swap_refresh_token(user_id, presented, &tokens.refresh_token)
            .await?;
        if !swapped {
            return Err(Error::TokenMismatch);
        }
        Ok(tokens)
    }

    /// Resolve which identity currently holds `presented` as its pointer.
    /// Fails with `TokenMismatch` when no identity does.
    pub async fn resolve_refresh(&self, presented: &str) -> Result<Uuid> {
        self.identities
            .find_by_refresh_token(presented)
            .await?
            .ok_or(Error::TokenMismatch)
    }

    /// Clear the refresh pointer. Idempotent: revoking an already-revoked
    /// identity is a no-op.
    pub async fn revoke(&self, user_id: Uuid) -> Result<()> {
        self.identities.set_refresh_token(user_id, None).await
    }

    pub fn access_ttl_secs(&self) -> i64 {
        self.access_ttl.num_seconds()
    }

    fn mint_pair(&self, user_id: Uuid) -> Result<SessionTokens> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id,
            iat: now.timestamp(),
            exp: (now + self.access_ttl).timestamp(),
        };
        let access_token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|err| Error::Internal(format!("failed to sign access token: {err}")))?;
        Ok(SessionTokens {
            access_token,
            refresh_token: generate_refresh_token(),
            expires_in: self.access_ttl.num_seconds(),
        })
    }
}

/// 256 bits from the OS-seeded generator, URL-safe base64. Unguessable, and
/// opaque: validity is equality with the stored pointer, nothing else.
fn generate_refresh_token() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NewUser;
    use crate::store::memory::MemoryStore;

    const SECRET: &str = "test-secret-key";

    async fn service_with_user() -> (TokenService, Uuid) {
        let store = Arc::new(MemoryStore::new());
        let user = store
            .create_user_with_password(
                &NewUser {
                    username: "alice".to_string(),
                    email: "alice@example.com".to_string(),
                    full_name: "Alice".to_string(),
                    avatar_url: None,
                },
                "hash",
            )
            .await
            .unwrap();
        (
            TokenService::new(store, SECRET, DEFAULT_ACCESS_TTL_SECS),
            user.id,
        )
    }

    #[tokio::test]
    async fn issue_and_verify_round_trip() {
        let (service, user_id) = service_with_user().await;
        let tokens = service.issue_session(user_id).await.unwrap();
        assert_eq!(service.verify_access(&tokens.access_token).unwrap(), user_id);
        assert_eq!(tokens.expires_in, DEFAULT_ACCESS_TTL_SECS);
    }

    #[tokio::test]
    async fn expired_access_token_is_distinguished() {
        let store = Arc::new(MemoryStore::new());
        let expired = TokenService::new(store.clone(), SECRET, -100);
        let live = TokenService::new(store, SECRET, DEFAULT_ACCESS_TTL_SECS);

        let tokens = expired.mint_pair(Uuid::new_v4()).unwrap();
        assert!(matches!(
            live.verify_access(&tokens.access_token),
            Err(Error::TokenExpired)
        ));
    }

    #[tokio::test]
    async fn garbage_and_wrong_key_tokens_are_invalid() {
        let (service, user_id) = service_with_user().await;
        assert!(matches!(
            service.verify_access("not-a-jwt"),
            Err(Error::TokenInvalid)
        ));

        let other = TokenService::new(
            Arc::new(MemoryStore::new()),
            "a-different-secret",
            DEFAULT_ACCESS_TTL_SECS,
        );
        let foreign = other.mint_pair(user_id).unwrap();
        assert!(matches!(
            service.verify_access(&foreign.access_token),
            Err(Error::TokenInvalid)
        ));
    }

    #[tokio::test]
    async fn rotation_rejects_replay_of_superseded_token() {
        let (service, user_id) = service_with_user().await;
        let first = service.issue_session(user_id).await.unwrap();
        let second = service.rotate(user_id, &first.refresh_token).await.unwrap();
        assert_ne!(first.refresh_token, second.refresh_token);

        // The superseded value must never rotate again.
        assert!(matches!(
            service.rotate(user_id, &first.refresh_token).await,
            Err(Error::TokenMismatch)
        ));
        // The current one still does.
        service.rotate(user_id, &second.refresh_token).await.unwrap();
    }

    #[tokio::test]
    async fn concurrent_rotation_has_exactly_one_winner() {
        let (service, user_id) = service_with_user().await;
        let tokens = service.issue_session(user_id).await.unwrap();

        let (a, b) = tokio::join!(
            service.rotate(user_id, &tokens.refresh_token),
            service.rotate(user_id, &tokens.refresh_token),
        );
        let winners = [&a, &b].iter().filter(|r| r.is_ok()).count();
        assert_eq!(winners, 1);
        let loser = if a.is_ok() { b } else { a };
        assert!(matches!(loser, Err(Error::TokenMismatch)));
    }

    #[tokio::test]
    async fn revoke_clears_pointer_and_is_idempotent() {
        let (service, user_id) = service_with_user().await;
        let tokens = service.issue_session(user_id).await.unwrap();

        service.revoke(user_id).await.unwrap();
        service.revoke(user_id).await.unwrap();

        // Logout then rotate with the just-revoked token.
        assert!(matches!(
            service.rotate(user_id, &tokens.refresh_token).await,
            Err(Error::TokenMismatch)
        ));
        assert!(matches!(
            service.resolve_refresh(&tokens.refresh_token).await,
            Err(Error::TokenMismatch)
        ));
    }

    #[tokio::test]
    async fn issue_session_supersedes_previous_refresh_token() {
        let (service, user_id) = service_with_user().await;
        let first = service.issue_session(user_id).await.unwrap();
        let second = service.issue_session(user_id).await.unwrap();

        assert!(matches!(
            service.rotate(user_id, &first.refresh_token).await,
            Err(Error::TokenMismatch)
        ));
        assert_eq!(
            service.resolve_refresh(&second.refresh_token).await.unwrap(),
            user_id
        );
    }
}
