//! Admin session model

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Server-side session row backing a signed-in admin
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminSession {
    pub id: String,
    pub admin_user_id: String,
    #[serde(skip_serializing)]
    pub session_token: String,
    pub expires_at: DateTime<Utc>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl AdminSession {
    pub fn new(
        admin_user_id: String,
        session_token: String,
        ttl: Duration,
        ip_address: Option<String>,
        user_agent: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            admin_user_id,
            session_token,
            expires_at: now + ttl,
            ip_address,
            user_agent,
            is_active: true,
            created_at: now,
        }
    }

    /// Check if the session has expired
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_not_expired() {
        let session = AdminSession::new("u1".into(), "tok".into(), Duration::hours(24), None, None);
        assert!(!session.is_expired());
        assert!(session.expires_at > session.created_at);
        assert!(session.is_active);
    }

    #[test]
    fn test_past_expiry_is_expired() {
        let mut session = AdminSession::new("u1".into(), "tok".into(), Duration::hours(1), None, None);
        session.expires_at = Utc::now() - Duration::seconds(1);
        assert!(session.is_expired());
    }
}
