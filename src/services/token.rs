//! Signed admin tokens
//!
//! Both the access token handed to the client and the token stored on the
//! session row are HS256 JWTs. They share a claim layout and differ only in
//! `kind`, so a session token can never be replayed as an access token.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{AdminRole, AdminUser};

/// What a token is for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Session,
}

/// Claims embedded in every admin token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Admin user id
    pub sub: String,
    pub email: String,
    pub role: AdminRole,
    pub kind: TokenKind,
    /// Issued-at (UTC Unix timestamp)
    pub iat: i64,
    /// Expiration (UTC Unix timestamp)
    pub exp: i64,
    /// Unique token id
    pub jti: String,
}

/// Issues and verifies admin tokens with one HMAC secret
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer").field("ttl", &self.ttl).finish()
    }
}

impl TokenIssuer {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    /// Lifetime of issued tokens
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Sign a token of the given kind for `user`
    pub fn issue(&self, user: &AdminUser, kind: TokenKind) -> jsonwebtoken::errors::Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.clone(),
            email: user.email.clone(),
            role: user.role,
            kind,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding)
    }

    /// Check signature and expiry, returning the claims
    pub fn verify(&self, token: &str) -> jsonwebtoken::errors::Result<Claims> {
        let mut validation = Validation::default();
        validation.leeway = 0;
        decode::<Claims>(token, &self.decoding, &validation).map(|data| data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> AdminUser {
        AdminUser::new(
            "Teacher@CSE.edu",
            "Teacher".into(),
            "hash".into(),
            AdminRole::SectionAdmin,
            Some("63_G".into()),
        )
    }

    #[test]
    fn test_issue_and_verify() {
        let issuer = TokenIssuer::new("test-secret", Duration::hours(24));
        let user = user();

        let token = issuer.issue(&user, TokenKind::Access).unwrap();
        let claims = issuer.verify(&token).unwrap();

        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.email, "teacher@cse.edu");
        assert_eq!(claims.role, AdminRole::SectionAdmin);
        assert_eq!(claims.kind, TokenKind::Access);
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
    }

    #[test]
    fn test_tokens_are_unique() {
        let issuer = TokenIssuer::new("test-secret", Duration::hours(1));
        let user = user();

        let a = issuer.issue(&user, TokenKind::Session).unwrap();
        let b = issuer.issue(&user, TokenKind::Session).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = TokenIssuer::new("secret-a", Duration::hours(1))
            .issue(&user(), TokenKind::Access)
            .unwrap();

        assert!(TokenIssuer::new("secret-b", Duration::hours(1)).verify(&token).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let issuer = TokenIssuer::new("test-secret", Duration::seconds(-120));
        let token = issuer.issue(&user(), TokenKind::Access).unwrap();

        assert!(issuer.verify(&token).is_err());
    }
}
