//! Admin authentication
//!
//! Login verifies the Argon2 hash, issues an access token and writes a session
//! row holding a second, session-kind token. Every authenticated request then
//! re-checks the user and the newest active session; an expired session is
//! switched off the first time it is seen.

use crate::db::repositories::{AdminUserRepository, SessionRepository};
use crate::models::{normalize_email, AdminRole, AdminSession, AdminUser};
use crate::services::password::{verify_dummy_password, verify_password};
use crate::services::token::{TokenIssuer, TokenKind};
use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;

/// Error types for authentication
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Unknown email, inactive account or wrong password
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Token missing, malformed, badly signed or expired
    #[error("Authentication required")]
    Unauthenticated,

    /// No live session backs the token
    #[error("Session expired")]
    SessionExpired,

    /// Role not allowed for the operation
    #[error("Insufficient permissions")]
    Forbidden,

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Login input
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginInput {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Request metadata stored on the session row
#[derive(Debug, Clone, Default)]
pub struct ClientInfo {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// Successful login
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user: AdminUser,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

pub struct AuthService {
    users: Arc<dyn AdminUserRepository>,
    sessions: Arc<dyn SessionRepository>,
    tokens: TokenIssuer,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn AdminUserRepository>,
        sessions: Arc<dyn SessionRepository>,
        tokens: TokenIssuer,
    ) -> Self {
        Self {
            users,
            sessions,
            tokens,
        }
    }

    /// Token lifetime, also used for the cookie max-age
    pub fn token_ttl(&self) -> chrono::Duration {
        self.tokens.ttl()
    }

    pub async fn login(&self, input: LoginInput, client: ClientInfo) -> Result<LoginOutcome, AuthError> {
        let email = normalize_email(&input.email);
        if email.is_empty() || input.password.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }

        let user = match self.users.get_by_email(&email).await? {
            Some(user) if user.is_active => user,
            _ => {
                verify_dummy_password(&input.password);
                tracing::warn!("Rejected login for {}: unknown or inactive account", email);
                return Err(AuthError::InvalidCredentials);
            }
        };

        let valid = verify_password(&input.password, &user.password_hash)
            .context("Failed to verify password")?;
        if !valid {
            tracing::warn!("Rejected login for {}: wrong password", email);
            return Err(AuthError::InvalidCredentials);
        }

        let token = self
            .tokens
            .issue(&user, TokenKind::Access)
            .context("Failed to sign access token")?;
        let session_token = self
            .tokens
            .issue(&user, TokenKind::Session)
            .context("Failed to sign session token")?;

        let session = AdminSession::new(
            user.id.clone(),
            session_token,
            self.tokens.ttl(),
            client.ip_address,
            client.user_agent,
        );
        self.sessions.create(&session).await?;

        let now = Utc::now();
        self.users.record_login(&user.id, now).await?;

        let mut user = user;
        user.last_login = Some(now);
        user.login_count += 1;

        tracing::info!("Admin {} logged in", user.email);
        Ok(LoginOutcome {
            user,
            token,
            expires_at: session.expires_at,
        })
    }

    /// Resolve the user behind an access token
    pub async fn current_user(&self, token: Option<&str>) -> Result<AdminUser, AuthError> {
        let token = token.filter(|t| !t.is_empty()).ok_or(AuthError::Unauthenticated)?;
        let claims = self.tokens.verify(token).map_err(|e| {
            tracing::debug!("Token rejected: {}", e);
            AuthError::Unauthenticated
        })?;
        if claims.kind != TokenKind::Access {
            return Err(AuthError::Unauthenticated);
        }

        let user = match self.users.get_by_id(&claims.sub).await? {
            Some(user) if user.is_active => user,
            _ => return Err(AuthError::Unauthenticated),
        };

        let session = self
            .sessions
            .latest_active_for_user(&user.id)
            .await?
            .ok_or(AuthError::SessionExpired)?;
        if session.is_expired() {
            self.sessions.deactivate(&session.id).await?;
            tracing::info!("Session {} of {} expired", session.id, user.email);
            return Err(AuthError::SessionExpired);
        }

        Ok(user)
    }

    /// [`current_user`](Self::current_user) plus a role check
    pub async fn authorize(&self, token: Option<&str>, allowed: &[AdminRole]) -> Result<AdminUser, AuthError> {
        let user = self.current_user(token).await?;
        if !allowed.contains(&user.role) {
            tracing::warn!("Admin {} ({}) lacks the required role", user.email, user.role);
            return Err(AuthError::Forbidden);
        }
        Ok(user)
    }

    /// End every active session of the token's owner
    pub async fn logout(&self, token: Option<&str>) -> Result<u64, AuthError> {
        let token = token.ok_or(AuthError::Unauthenticated)?;
        let claims = self
            .tokens
            .verify(token)
            .map_err(|_| AuthError::Unauthenticated)?;

        let ended = self.sessions.deactivate_all_for_user(&claims.sub).await?;
        tracing::info!("Admin {} logged out ({} sessions ended)", claims.email, ended);
        Ok(ended)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{SqlxAdminUserRepository, SqlxSessionRepository};
    use crate::db::{create_test_pool, migrations::run_migrations};
    use crate::services::password::hash_password;
    use chrono::Duration;

    struct Fixture {
        service: AuthService,
        users: Arc<dyn AdminUserRepository>,
        sessions: Arc<dyn SessionRepository>,
        tokens: TokenIssuer,
    }

    async fn fixture() -> Fixture {
        let pool = create_test_pool().await.unwrap();
        run_migrations(&pool).await.unwrap();
        let users = SqlxAdminUserRepository::boxed(pool.clone());
        let sessions = SqlxSessionRepository::boxed(pool);
        let tokens = TokenIssuer::new("test-secret", Duration::hours(24));
        Fixture {
            service: AuthService::new(users.clone(), sessions.clone(), tokens.clone()),
            users,
            sessions,
            tokens,
        }
    }

    async fn add_user(users: &Arc<dyn AdminUserRepository>, role: AdminRole, active: bool) -> AdminUser {
        let mut user = AdminUser::new(
            "Lecturer@CSE.edu",
            "Lecturer".into(),
            hash_password("s3cret-pass").unwrap(),
            role,
            Some("63_G".into()),
        );
        user.is_active = active;
        users.create(&user).await.unwrap()
    }

    fn login_input(password: &str) -> LoginInput {
        LoginInput {
            email: "  lecturer@cse.EDU ".into(),
            password: password.into(),
        }
    }

    #[tokio::test]
    async fn test_login_then_current_user() {
        let f = fixture().await;
        let user = add_user(&f.users, AdminRole::Admin, true).await;

        let outcome = f
            .service
            .login(
                login_input("s3cret-pass"),
                ClientInfo {
                    ip_address: Some("10.0.0.1".into()),
                    user_agent: Some("test".into()),
                },
            )
            .await
            .unwrap();
        assert_eq!(outcome.user.id, user.id);
        assert_eq!(outcome.user.login_count, 1);

        let current = f.service.current_user(Some(&outcome.token)).await.unwrap();
        assert_eq!(current.id, user.id);
        assert_eq!(current.login_count, 1);
        assert!(current.last_login.is_some());
        assert_eq!(f.sessions.count_for_user(&user.id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_wrong_password_writes_no_session() {
        let f = fixture().await;
        let user = add_user(&f.users, AdminRole::Admin, true).await;

        let result = f.service.login(login_input("wrong"), ClientInfo::default()).await;
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
        assert_eq!(f.sessions.count_for_user(&user.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_inactive_or_unknown_account_rejected() {
        let f = fixture().await;
        add_user(&f.users, AdminRole::Admin, false).await;

        let inactive = f.service.login(login_input("s3cret-pass"), ClientInfo::default()).await;
        assert!(matches!(inactive, Err(AuthError::InvalidCredentials)));

        let unknown = f
            .service
            .login(
                LoginInput {
                    email: "nobody@cse.edu".into(),
                    password: "s3cret-pass".into(),
                },
                ClientInfo::default(),
            )
            .await;
        assert!(matches!(unknown, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_missing_or_bad_token_unauthenticated() {
        let f = fixture().await;
        assert!(matches!(f.service.current_user(None).await, Err(AuthError::Unauthenticated)));
        assert!(matches!(
            f.service.current_user(Some("garbage")).await,
            Err(AuthError::Unauthenticated)
        ));
    }

    #[tokio::test]
    async fn test_session_token_is_not_an_access_token() {
        let f = fixture().await;
        let user = add_user(&f.users, AdminRole::Admin, true).await;
        let session_token = f.tokens.issue(&user, TokenKind::Session).unwrap();

        assert!(matches!(
            f.service.current_user(Some(&session_token)).await,
            Err(AuthError::Unauthenticated)
        ));
    }

    #[tokio::test]
    async fn test_expired_session_is_deactivated() {
        let f = fixture().await;
        let user = add_user(&f.users, AdminRole::Admin, true).await;

        let mut session = AdminSession::new(user.id.clone(), "old".into(), Duration::hours(1), None, None);
        session.created_at = Utc::now() - Duration::hours(3);
        session.expires_at = Utc::now() - Duration::hours(2);
        f.sessions.create(&session).await.unwrap();

        let token = f.tokens.issue(&user, TokenKind::Access).unwrap();
        assert!(matches!(
            f.service.current_user(Some(&token)).await,
            Err(AuthError::SessionExpired)
        ));
        assert!(f.sessions.latest_active_for_user(&user.id).await.unwrap().is_none());
        assert_eq!(f.sessions.count_for_user(&user.id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_valid_token_without_session_is_expired() {
        let f = fixture().await;
        let user = add_user(&f.users, AdminRole::Admin, true).await;
        let token = f.tokens.issue(&user, TokenKind::Access).unwrap();

        assert!(matches!(
            f.service.current_user(Some(&token)).await,
            Err(AuthError::SessionExpired)
        ));
    }

    #[tokio::test]
    async fn test_authorize_checks_role() {
        let f = fixture().await;
        add_user(&f.users, AdminRole::SectionAdmin, true).await;
        let outcome = f
            .service
            .login(login_input("s3cret-pass"), ClientInfo::default())
            .await
            .unwrap();

        assert!(f
            .service
            .authorize(Some(&outcome.token), AdminRole::CONTENT_EDITORS)
            .await
            .is_ok());
        assert!(matches!(
            f.service.authorize(Some(&outcome.token), AdminRole::USER_MANAGERS).await,
            Err(AuthError::Forbidden)
        ));
    }

    #[tokio::test]
    async fn test_logout_ends_sessions() {
        let f = fixture().await;
        add_user(&f.users, AdminRole::Admin, true).await;
        let outcome = f
            .service
            .login(login_input("s3cret-pass"), ClientInfo::default())
            .await
            .unwrap();

        assert_eq!(f.service.logout(Some(&outcome.token)).await.unwrap(), 1);
        assert!(matches!(
            f.service.current_user(Some(&outcome.token)).await,
            Err(AuthError::SessionExpired)
        ));
    }
}
