//! Admin session repository
//!
//! Session rows are never deleted by the application: they are deactivated
//! lazily when found expired, or on logout.

use crate::db::{DynDatabasePool, PoolRef};
use crate::models::AdminSession;
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{postgres::PgRow, sqlite::SqliteRow, PgPool, Row, SqlitePool};
use std::sync::Arc;

const SESSION_COLUMNS: &str = "id, admin_user_id, session_token, expires_at, ip_address, \
     user_agent, is_active, created_at";

const INSERT_SESSION: &str = r#"
    INSERT INTO admin_sessions (id, admin_user_id, session_token, expires_at, ip_address,
                                user_agent, is_active, created_at)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
"#;

/// Session repository trait
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Create a new session
    async fn create(&self, session: &AdminSession) -> Result<AdminSession>;

    /// Most recently created active session of a user
    async fn latest_active_for_user(&self, admin_user_id: &str) -> Result<Option<AdminSession>>;

    /// Mark one session inactive
    async fn deactivate(&self, id: &str) -> Result<()>;

    /// Mark every active session of a user inactive. Returns how many changed.
    async fn deactivate_all_for_user(&self, admin_user_id: &str) -> Result<u64>;

    /// Count sessions of a user, active or not
    async fn count_for_user(&self, admin_user_id: &str) -> Result<i64>;
}

/// SQLx-based session repository implementation
pub struct SqlxSessionRepository {
    pool: DynDatabasePool,
}

impl SqlxSessionRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn SessionRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl SessionRepository for SqlxSessionRepository {
    async fn create(&self, session: &AdminSession) -> Result<AdminSession> {
        match self.pool.backend() {
            PoolRef::Sqlite(pool) => create_session_sqlite(pool, session).await?,
            PoolRef::Postgres(pool) => create_session_postgres(pool, session).await?,
        }
        Ok(session.clone())
    }

    async fn latest_active_for_user(&self, admin_user_id: &str) -> Result<Option<AdminSession>> {
        match self.pool.backend() {
            PoolRef::Sqlite(pool) => latest_active_sqlite(pool, admin_user_id).await,
            PoolRef::Postgres(pool) => latest_active_postgres(pool, admin_user_id).await,
        }
    }

    async fn deactivate(&self, id: &str) -> Result<()> {
        let sql = "UPDATE admin_sessions SET is_active = $1 WHERE id = $2";
        match self.pool.backend() {
            PoolRef::Sqlite(pool) => sqlx::query(sql)
                .bind(false)
                .bind(id)
                .execute(pool)
                .await
                .map(|_| ()),
            PoolRef::Postgres(pool) => sqlx::query(sql)
                .bind(false)
                .bind(id)
                .execute(pool)
                .await
                .map(|_| ()),
        }
        .context("Failed to deactivate session")?;
        Ok(())
    }

    async fn deactivate_all_for_user(&self, admin_user_id: &str) -> Result<u64> {
        let sql = "UPDATE admin_sessions SET is_active = $1 WHERE admin_user_id = $2 AND is_active = $3";
        let affected = match self.pool.backend() {
            PoolRef::Sqlite(pool) => sqlx::query(sql)
                .bind(false)
                .bind(admin_user_id)
                .bind(true)
                .execute(pool)
                .await
                .map(|r| r.rows_affected()),
            PoolRef::Postgres(pool) => sqlx::query(sql)
                .bind(false)
                .bind(admin_user_id)
                .bind(true)
                .execute(pool)
                .await
                .map(|r| r.rows_affected()),
        }
        .context("Failed to deactivate user sessions")?;
        Ok(affected)
    }

    async fn count_for_user(&self, admin_user_id: &str) -> Result<i64> {
        let sql = "SELECT COUNT(*) FROM admin_sessions WHERE admin_user_id = $1";
        let count = match self.pool.backend() {
            PoolRef::Sqlite(pool) => {
                sqlx::query_scalar::<_, i64>(sql)
                    .bind(admin_user_id)
                    .fetch_one(pool)
                    .await
            }
            PoolRef::Postgres(pool) => {
                sqlx::query_scalar::<_, i64>(sql)
                    .bind(admin_user_id)
                    .fetch_one(pool)
                    .await
            }
        }
        .context("Failed to count sessions")?;
        Ok(count)
    }
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_session_sqlite(pool: &SqlitePool, session: &AdminSession) -> Result<()> {
    sqlx::query(INSERT_SESSION)
        .bind(&session.id)
        .bind(&session.admin_user_id)
        .bind(&session.session_token)
        .bind(session.expires_at)
        .bind(&session.ip_address)
        .bind(&session.user_agent)
        .bind(session.is_active)
        .bind(session.created_at)
        .execute(pool)
        .await
        .context("Failed to create session")?;
    Ok(())
}

async fn latest_active_sqlite(pool: &SqlitePool, admin_user_id: &str) -> Result<Option<AdminSession>> {
    let row = sqlx::query(&format!(
        "SELECT {SESSION_COLUMNS} FROM admin_sessions \
         WHERE admin_user_id = $1 AND is_active = $2 \
         ORDER BY created_at DESC LIMIT 1"
    ))
    .bind(admin_user_id)
    .bind(true)
    .fetch_optional(pool)
    .await
    .context("Failed to get active session")?;

    row.as_ref().map(row_to_session_sqlite).transpose()
}

fn row_to_session_sqlite(row: &SqliteRow) -> Result<AdminSession> {
    Ok(AdminSession {
        id: row.try_get("id")?,
        admin_user_id: row.try_get("admin_user_id")?,
        session_token: row.try_get("session_token")?,
        expires_at: row.try_get("expires_at")?,
        ip_address: row.try_get("ip_address")?,
        user_agent: row.try_get("user_agent")?,
        is_active: row.try_get("is_active")?,
        created_at: row.try_get("created_at")?,
    })
}

// ============================================================================
// Postgres implementations
// ============================================================================

async fn create_session_postgres(pool: &PgPool, session: &AdminSession) -> Result<()> {
    sqlx::query(INSERT_SESSION)
        .bind(&session.id)
        .bind(&session.admin_user_id)
        .bind(&session.session_token)
        .bind(session.expires_at)
        .bind(&session.ip_address)
        .bind(&session.user_agent)
        .bind(session.is_active)
        .bind(session.created_at)
        .execute(pool)
        .await
        .context("Failed to create session")?;
    Ok(())
}

async fn latest_active_postgres(pool: &PgPool, admin_user_id: &str) -> Result<Option<AdminSession>> {
    let row = sqlx::query(&format!(
        "SELECT {SESSION_COLUMNS} FROM admin_sessions \
         WHERE admin_user_id = $1 AND is_active = $2 \
         ORDER BY created_at DESC LIMIT 1"
    ))
    .bind(admin_user_id)
    .bind(true)
    .fetch_optional(pool)
    .await
    .context("Failed to get active session")?;

    row.as_ref().map(row_to_session_postgres).transpose()
}

fn row_to_session_postgres(row: &PgRow) -> Result<AdminSession> {
    Ok(AdminSession {
        id: row.try_get("id")?,
        admin_user_id: row.try_get("admin_user_id")?,
        session_token: row.try_get("session_token")?,
        expires_at: row.try_get("expires_at")?,
        ip_address: row.try_get("ip_address")?,
        user_agent: row.try_get("user_agent")?,
        is_active: row.try_get("is_active")?,
        created_at: row.try_get("created_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{AdminUserRepository, SqlxAdminUserRepository};
    use crate::db::{create_test_pool, migrations::run_migrations};
    use crate::models::{AdminRole, AdminUser};
    use chrono::Duration;

    async fn setup() -> (Arc<dyn SessionRepository>, String) {
        let pool = create_test_pool().await.unwrap();
        run_migrations(&pool).await.unwrap();

        let user = AdminUser::new(
            "admin@cse.edu",
            "Admin".into(),
            "hash".into(),
            AdminRole::Admin,
            None,
        );
        SqlxAdminUserRepository::new(pool.clone()).create(&user).await.unwrap();
        (SqlxSessionRepository::boxed(pool), user.id)
    }

    #[tokio::test]
    async fn test_latest_active_session() {
        let (repo, user_id) = setup().await;

        let mut older = AdminSession::new(user_id.clone(), "t1".into(), Duration::hours(24), None, None);
        older.created_at = older.created_at - Duration::minutes(5);
        repo.create(&older).await.unwrap();

        let newer = AdminSession::new(
            user_id.clone(),
            "t2".into(),
            Duration::hours(24),
            Some("10.0.0.1".into()),
            Some("curl/8".into()),
        );
        repo.create(&newer).await.unwrap();

        let found = repo.latest_active_for_user(&user_id).await.unwrap().unwrap();
        assert_eq!(found.id, newer.id);
        assert_eq!(found.ip_address.as_deref(), Some("10.0.0.1"));

        repo.deactivate(&newer.id).await.unwrap();
        let found = repo.latest_active_for_user(&user_id).await.unwrap().unwrap();
        assert_eq!(found.id, older.id);
    }

    #[tokio::test]
    async fn test_deactivate_all_for_user() {
        let (repo, user_id) = setup().await;
        for token in ["a", "b"] {
            let session = AdminSession::new(user_id.clone(), token.into(), Duration::hours(1), None, None);
            repo.create(&session).await.unwrap();
        }

        assert_eq!(repo.deactivate_all_for_user(&user_id).await.unwrap(), 2);
        assert!(repo.latest_active_for_user(&user_id).await.unwrap().is_none());
        assert_eq!(repo.count_for_user(&user_id).await.unwrap(), 2);
    }
}
