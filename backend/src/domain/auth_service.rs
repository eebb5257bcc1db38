//! Login, refresh, and logout use-cases with their audit side effects.

use std::sync::Arc;

use chrono::Utc;
use tracing::warn;
use zeroize::Zeroizing;

use super::audit::{AuditAction, ClientMeta};
use super::auth::LoginCredentials;
use super::error::DomainError;
use super::identity::Principal;
use super::ports::{AuditLogRepository, UserRepository};
use super::tokens::{TokenCodec, TokenPair};
use super::user_account::UserAccount;

/// A successfully established session.
#[derive(Debug, Clone)]
pub struct Session {
    /// The authenticated account.
    pub user: UserAccount,
    /// Freshly issued token pair.
    pub tokens: TokenPair,
}

fn invalid_credentials() -> DomainError {
    DomainError::unauthorized("invalid credentials")
}

/// Credential verification and session issuance.
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    audit: Arc<dyn AuditLogRepository>,
    tokens: Arc<TokenCodec>,
}

impl AuthService {
    /// Assemble the service over its ports.
    pub fn new(
        users: Arc<dyn UserRepository>,
        audit: Arc<dyn AuditLogRepository>,
        tokens: Arc<TokenCodec>,
    ) -> Self {
        Self {
            users,
            audit,
            tokens,
        }
    }

    /// The token codec, shared with the HTTP adapter for verification.
    pub fn token_codec(&self) -> Arc<TokenCodec> {
        Arc::clone(&self.tokens)
    }

    /// Verify credentials and establish a session.
    ///
    /// An unknown email and a wrong password produce byte-identical errors;
    /// the response never reveals which check failed. The login audit entry
    /// is written synchronously and a failure there fails the login.
    pub async fn login(
        &self,
        credentials: LoginCredentials,
        meta: &ClientMeta,
    ) -> Result<Session, DomainError> {
        let record = self
            .users
            .find_credentials(credentials.email())
            .await?
            .ok_or_else(invalid_credentials)?;

        let password = Zeroizing::new(credentials.password().to_owned());
        let hash = record.password_hash.clone();
        // bcrypt is deliberately slow; keep it off the async runtime.
        let verified = tokio::task::spawn_blocking(move || bcrypt::verify(&*password, &hash))
            .await
            .map_err(|err| DomainError::internal(format!("verification task failed: {err}")))?
            .map_err(|err| DomainError::internal(format!("password verification failed: {err}")))?;
        if !verified {
            return Err(invalid_credentials());
        }

        let session = self.issue_session(record.account).await?;
        self.audit
            .record(session.user.id, AuditAction::Login, meta, Utc::now())
            .await?;
        Ok(session)
    }

    /// Exchange a refresh token for a rotated token pair.
    ///
    /// The account must still exist under the email the token was issued
    /// for; a deleted or re-keyed account invalidates outstanding refresh
    /// tokens.
    pub async fn refresh(&self, refresh_token: &str) -> Result<Session, DomainError> {
        let subject = self.tokens.verify_refresh(refresh_token)?;
        let record = self
            .users
            .find_credentials(&subject.email)
            .await?
            .filter(|record| record.account.id == subject.user_id)
            .ok_or_else(|| DomainError::forbidden("invalid refresh token"))?;
        self.issue_session(record.account).await
    }

    /// Record a logout. The audit write is best-effort: a failure is logged
    /// and the logout still succeeds, since the client discards its tokens
    /// either way.
    pub async fn logout(&self, principal: &Principal, meta: &ClientMeta) {
        if let Err(err) = self
            .audit
            .record(principal.user_id, AuditAction::Logout, meta, Utc::now())
            .await
        {
            warn!(user_id = principal.user_id, error = %err, "logout audit write failed");
        }
    }

    async fn issue_session(&self, user: UserAccount) -> Result<Session, DomainError> {
        let principal = Principal {
            user_id: user.id,
            email: user.email.clone(),
            username: user.username.clone(),
            role: user.role,
            domain_id: user.domain_id,
        };
        let tokens = self
            .tokens
            .issue(&principal, user.domain_name.as_deref(), Utc::now())?;
        Ok(Session { user, tokens })
    }
}

#[cfg(test)]
mod tests {
    //! Login, refresh, and audit side-effect coverage.
    use rstest::rstest;

    use super::*;
    use crate::domain::ports::audit_log_repository::fixtures::RecordingAuditLog;
    use crate::domain::ports::user_repository::fixtures::InMemoryUserRepository;
    use crate::domain::role::Role;
    use crate::domain::ErrorCode;

    const PASSWORD: &str = "correct horse";

    fn hash() -> String {
        // Minimum cost keeps the test fast; production cost comes from config.
        bcrypt::hash(PASSWORD, 4).expect("hashing succeeds")
    }

    fn service(users: InMemoryUserRepository, audit: RecordingAuditLog) -> AuthService {
        AuthService::new(
            Arc::new(users),
            Arc::new(audit),
            Arc::new(TokenCodec::new("access", "refresh", 900, 604_800)),
        )
    }

    fn seeded_service() -> AuthService {
        let account = InMemoryUserRepository::account(3, Role::DomainAdmin, Some(16));
        service(
            InMemoryUserRepository::default().with_user(account, &hash()),
            RecordingAuditLog::default(),
        )
    }

    #[rstest]
    #[tokio::test]
    async fn login_issues_tokens_and_records_audit() {
        let account = InMemoryUserRepository::account(3, Role::DomainAdmin, Some(16));
        let audit = Arc::new(RecordingAuditLog::default());
        let auth = AuthService::new(
            Arc::new(InMemoryUserRepository::default().with_user(account, &hash())),
            Arc::clone(&audit) as Arc<dyn AuditLogRepository>,
            Arc::new(TokenCodec::new("access", "refresh", 900, 604_800)),
        );

        let creds = LoginCredentials::new("user3@example.com", PASSWORD).expect("valid");
        let meta = ClientMeta {
            ip_address: Some("10.0.0.9".to_owned()),
            user_agent: Some("test-agent".to_owned()),
        };
        let session = auth.login(creds, &meta).await.expect("login succeeds");
        assert_eq!(session.user.id, 3);

        let verified = auth
            .token_codec()
            .verify_access(&session.tokens.access)
            .expect("access token verifies");
        assert_eq!(verified.principal.user_id, 3);
        assert_eq!(verified.principal.role, Role::DomainAdmin);
        assert_eq!(verified.domain_name.as_deref(), Some("domain-16"));

        let recorded = audit.recorded();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].action, AuditAction::Login);
        assert_eq!(recorded[0].ip_address.as_deref(), Some("10.0.0.9"));
    }

    #[rstest]
    #[case("nobody@example.com", PASSWORD)]
    #[case("user3@example.com", "wrong password")]
    #[tokio::test]
    async fn unknown_email_and_wrong_password_fail_identically(
        #[case] email: &str,
        #[case] password: &str,
    ) {
        let auth = seeded_service();
        let creds = LoginCredentials::new(email, password).expect("valid shape");
        let err = auth
            .login(creds, &ClientMeta::default())
            .await
            .expect_err("rejected");
        assert_eq!(err.code(), ErrorCode::Unauthorized);
        assert_eq!(err.message(), "invalid credentials");
    }

    #[rstest]
    #[tokio::test]
    async fn audit_failure_aborts_the_login() {
        let account = InMemoryUserRepository::account(3, Role::User, None);
        let auth = service(
            InMemoryUserRepository::default().with_user(account, &hash()),
            RecordingAuditLog::failing(),
        );
        let creds = LoginCredentials::new("user3@example.com", PASSWORD).expect("valid");
        let err = auth
            .login(creds, &ClientMeta::default())
            .await
            .expect_err("audit failure propagates");
        assert_eq!(err.code(), ErrorCode::InternalError);
    }

    #[rstest]
    #[tokio::test]
    async fn refresh_rotates_the_pair_for_a_live_account() {
        let auth = seeded_service();
        let creds = LoginCredentials::new("user3@example.com", PASSWORD).expect("valid");
        let session = auth
            .login(creds, &ClientMeta::default())
            .await
            .expect("login succeeds");

        let rotated = auth
            .refresh(&session.tokens.refresh)
            .await
            .expect("refresh succeeds");
        let verified = auth
            .token_codec()
            .verify_access(&rotated.tokens.access)
            .expect("rotated access token verifies");
        assert_eq!(verified.principal.user_id, 3);
    }

    #[rstest]
    #[tokio::test]
    async fn refresh_is_forbidden_once_the_account_is_gone() {
        let account = InMemoryUserRepository::account(3, Role::User, None);
        let users = InMemoryUserRepository::default().with_user(account, &hash());
        let codec = Arc::new(TokenCodec::new("access", "refresh", 900, 604_800));
        let auth = AuthService::new(
            Arc::new(users),
            Arc::new(RecordingAuditLog::default()),
            Arc::clone(&codec),
        );
        let creds = LoginCredentials::new("user3@example.com", PASSWORD).expect("valid");
        let session = auth
            .login(creds, &ClientMeta::default())
            .await
            .expect("login succeeds");

        // Simulate deletion by pointing the service at an empty store.
        let auth = AuthService::new(
            Arc::new(InMemoryUserRepository::default()),
            Arc::new(RecordingAuditLog::default()),
            codec,
        );
        let err = auth
            .refresh(&session.tokens.refresh)
            .await
            .expect_err("account gone");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[rstest]
    #[tokio::test]
    async fn garbage_refresh_token_is_forbidden() {
        let auth = seeded_service();
        let err = auth.refresh("not-a-token").await.expect_err("rejected");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[rstest]
    #[tokio::test]
    async fn logout_swallows_audit_failures() {
        let auth = service(InMemoryUserRepository::default(), RecordingAuditLog::failing());
        let principal = crate::domain::identity::fixtures::reader();
        // Must not panic or error.
        auth.logout(&principal, &ClientMeta::default()).await;
    }

    #[rstest]
    #[tokio::test]
    async fn logout_records_the_event() {
        let audit = Arc::new(RecordingAuditLog::default());
        let auth = AuthService::new(
            Arc::new(InMemoryUserRepository::default()),
            Arc::clone(&audit) as Arc<dyn AuditLogRepository>,
            Arc::new(TokenCodec::new("access", "refresh", 900, 604_800)),
        );
        let principal = crate::domain::identity::fixtures::reader();
        auth.logout(&principal, &ClientMeta::default()).await;
        let recorded = audit.recorded();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].action, AuditAction::Logout);
    }
}
