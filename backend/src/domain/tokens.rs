//! Access and refresh token issuance and verification.
//!
//! Two independent secrets sign two independent token families: a short-lived
//! access token carrying the full principal, and a long-lived refresh token
//! carrying only the user id and email. Verification distinguishes an expired
//! access token (the client should refresh) from one that fails signature
//! checks (the client must re-authenticate).

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::identity::Principal;
use super::role::Role;

/// Default access token lifetime.
pub const DEFAULT_ACCESS_TTL_SECS: i64 = 15 * 60;
/// Default refresh token lifetime.
pub const DEFAULT_REFRESH_TTL_SECS: i64 = 7 * 24 * 60 * 60;

#[derive(Debug, Serialize, Deserialize)]
struct AccessClaims {
    #[serde(rename = "userId")]
    user_id: i32,
    email: String,
    username: String,
    role: Role,
    domain_id: Option<i32>,
    domain_name: Option<String>,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Serialize, Deserialize)]
struct RefreshClaims {
    #[serde(rename = "userId")]
    user_id: i32,
    email: String,
    iat: i64,
    exp: i64,
}

/// A freshly issued access/refresh token pair.
#[derive(Debug, Clone)]
pub struct TokenPair {
    /// Signed access token.
    pub access: String,
    /// Signed refresh token.
    pub refresh: String,
}

/// Outcome of access token verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedAccess {
    /// The embedded principal.
    pub principal: Principal,
    /// The domain name snapshot taken at issuance.
    pub domain_name: Option<String>,
}

/// Subject of a verified refresh token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshSubject {
    /// User id at issuance.
    pub user_id: i32,
    /// Email at issuance; the account must still resolve to this address.
    pub email: String,
}

/// Signs and verifies both token families.
pub struct TokenCodec {
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenCodec {
    /// Build a codec from the two secrets and lifetimes in seconds.
    pub fn new(
        access_secret: &str,
        refresh_secret: &str,
        access_ttl_secs: i64,
        refresh_ttl_secs: i64,
    ) -> Self {
        Self {
            access_encoding: EncodingKey::from_secret(access_secret.as_bytes()),
            access_decoding: DecodingKey::from_secret(access_secret.as_bytes()),
            refresh_encoding: EncodingKey::from_secret(refresh_secret.as_bytes()),
            refresh_decoding: DecodingKey::from_secret(refresh_secret.as_bytes()),
            access_ttl: Duration::seconds(access_ttl_secs),
            refresh_ttl: Duration::seconds(refresh_ttl_secs),
        }
    }

    /// Access token lifetime, for cookie max-age alignment.
    pub fn access_ttl(&self) -> Duration {
        self.access_ttl
    }

    /// Refresh token lifetime, for cookie max-age alignment.
    pub fn refresh_ttl(&self) -> Duration {
        self.refresh_ttl
    }

    /// Issue a token pair for the principal.
    pub fn issue(
        &self,
        principal: &Principal,
        domain_name: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<TokenPair, DomainError> {
        let iat = now.timestamp();
        let access = encode(
            &Header::default(),
            &AccessClaims {
                user_id: principal.user_id,
                email: principal.email.clone(),
                username: principal.username.clone(),
                role: principal.role,
                domain_id: principal.domain_id,
                domain_name: domain_name.map(str::to_owned),
                iat,
                exp: (now + self.access_ttl).timestamp(),
            },
            &self.access_encoding,
        )
        .map_err(|err| DomainError::internal(format!("failed to sign access token: {err}")))?;
        let refresh = encode(
            &Header::default(),
            &RefreshClaims {
                user_id: principal.user_id,
                email: principal.email.clone(),
                iat,
                exp: (now + self.refresh_ttl).timestamp(),
            },
            &self.refresh_encoding,
        )
        .map_err(|err| DomainError::internal(format!("failed to sign refresh token: {err}")))?;
        Ok(TokenPair { access, refresh })
    }

    /// Verify an access token.
    ///
    /// Expiry maps to [`token_expired`] so the client knows a refresh may
    /// still succeed; every other failure is a blanket `unauthorized`.
    ///
    /// [`token_expired`]: DomainError::token_expired
    pub fn verify_access(&self, token: &str) -> Result<VerifiedAccess, DomainError> {
        let data = decode::<AccessClaims>(token, &self.access_decoding, &Validation::default())
            .map_err(|err| match err.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    DomainError::token_expired("access token has expired")
                }
                _ => DomainError::unauthorized("invalid access token"),
            })?;
        let claims = data.claims;
        Ok(VerifiedAccess {
            principal: Principal {
                user_id: claims.user_id,
                email: claims.email,
                username: claims.username,
                role: claims.role,
                domain_id: claims.domain_id,
            },
            domain_name: claims.domain_name,
        })
    }

    /// Verify a refresh token. Any failure, expiry included, is `forbidden`;
    /// there is nothing left to fall back to.
    pub fn verify_refresh(&self, token: &str) -> Result<RefreshSubject, DomainError> {
        let data = decode::<RefreshClaims>(token, &self.refresh_decoding, &Validation::default())
            .map_err(|_| DomainError::forbidden("invalid refresh token"))?;
        Ok(RefreshSubject {
            user_id: data.claims.user_id,
            email: data.claims.email,
        })
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::identity::fixtures;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    fn codec() -> TokenCodec {
        TokenCodec::new("access-secret", "refresh-secret", 900, 604_800)
    }

    #[rstest]
    fn access_token_round_trips_the_principal() {
        let codec = codec();
        let principal = fixtures::domain_admin(16);
        let pair = codec
            .issue(&principal, Some("Engineering"), Utc::now())
            .expect("tokens issue");
        let verified = codec.verify_access(&pair.access).expect("verifies");
        assert_eq!(verified.principal, principal);
        assert_eq!(verified.domain_name.as_deref(), Some("Engineering"));
    }

    #[rstest]
    fn expired_access_token_is_distinguished_from_a_tampered_one() {
        let codec = codec();
        let principal = fixtures::reader();
        // Issued far enough in the past that the 15 minute lifetime is over.
        let stale = codec
            .issue(&principal, None, Utc::now() - Duration::hours(2))
            .expect("tokens issue");
        let err = codec.verify_access(&stale.access).expect_err("expired");
        assert_eq!(err.code(), ErrorCode::TokenExpired);

        let other = TokenCodec::new("different-secret", "refresh-secret", 900, 604_800);
        let forged = other
            .issue(&principal, None, Utc::now())
            .expect("tokens issue");
        let err = codec.verify_access(&forged.access).expect_err("tampered");
        assert_eq!(err.code(), ErrorCode::Unauthorized);
    }

    #[rstest]
    fn refresh_token_never_verifies_as_access() {
        let codec = codec();
        let pair = codec
            .issue(&fixtures::reader(), None, Utc::now())
            .expect("tokens issue");
        let err = codec.verify_access(&pair.refresh).expect_err("wrong family");
        assert_eq!(err.code(), ErrorCode::Unauthorized);
    }

    #[rstest]
    fn refresh_verification_yields_the_subject() {
        let codec = codec();
        let principal = fixtures::contributor(5, 16);
        let pair = codec
            .issue(&principal, None, Utc::now())
            .expect("tokens issue");
        let subject = codec.verify_refresh(&pair.refresh).expect("verifies");
        assert_eq!(subject.user_id, 5);
        assert_eq!(subject.email, principal.email);
    }

    #[rstest]
    fn expired_refresh_token_is_forbidden() {
        let codec = codec();
        let stale = codec
            .issue(&fixtures::reader(), None, Utc::now() - Duration::days(30))
            .expect("tokens issue");
        let err = codec.verify_refresh(&stale.refresh).expect_err("expired");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }
}
