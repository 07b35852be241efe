//! Admin user repository
//!
//! Database operations for back-office accounts.
//!
//! This module provides:
//! - `AdminUserRepository` trait defining the interface for account data access
//! - `SqlxAdminUserRepository` implementing the trait for SQLite and Postgres

use crate::db::{DynDatabasePool, PoolRef};
use crate::models::{AdminRole, AdminUser};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgRow, sqlite::SqliteRow, PgPool, Row, SqlitePool};
use std::str::FromStr;
use std::sync::Arc;

const ADMIN_USER_COLUMNS: &str = "id, email, full_name, password_hash, role, department, \
     is_active, last_login, login_count, created_at, updated_at";

const INSERT_ADMIN_USER: &str = r#"
    INSERT INTO admin_users (id, email, full_name, password_hash, role, department,
                             is_active, last_login, login_count, created_at, updated_at)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
"#;

const UPDATE_ADMIN_USER: &str = r#"
    UPDATE admin_users
    SET full_name = $1, password_hash = $2, role = $3, department = $4, is_active = $5,
        updated_at = $6
    WHERE id = $7
"#;

const RECORD_LOGIN: &str = r#"
    UPDATE admin_users
    SET last_login = $1, login_count = login_count + 1
    WHERE id = $2
"#;

/// Admin user repository trait
#[async_trait]
pub trait AdminUserRepository: Send + Sync {
    /// Create a new admin user
    async fn create(&self, user: &AdminUser) -> Result<AdminUser>;

    /// Get admin user by ID
    async fn get_by_id(&self, id: &str) -> Result<Option<AdminUser>>;

    /// Get admin user by (already normalized) email
    async fn get_by_email(&self, email: &str) -> Result<Option<AdminUser>>;

    /// Persist profile, role, password hash and active flag
    async fn update(&self, user: &AdminUser) -> Result<AdminUser>;

    /// Delete an admin user (cascades to sessions). Returns false if absent.
    async fn delete(&self, id: &str) -> Result<bool>;

    /// Count admin users
    async fn count(&self) -> Result<i64>;

    /// List all admin users ordered by creation time
    async fn list(&self) -> Result<Vec<AdminUser>>;

    /// Set `last_login` and increment `login_count`
    async fn record_login(&self, id: &str, at: DateTime<Utc>) -> Result<()>;
}

/// SQLx-based admin user repository implementation
pub struct SqlxAdminUserRepository {
    pool: DynDatabasePool,
}

impl SqlxAdminUserRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn AdminUserRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl AdminUserRepository for SqlxAdminUserRepository {
    async fn create(&self, user: &AdminUser) -> Result<AdminUser> {
        match self.pool.backend() {
            PoolRef::Sqlite(pool) => create_admin_user_sqlite(pool, user).await?,
            PoolRef::Postgres(pool) => create_admin_user_postgres(pool, user).await?,
        }
        Ok(user.clone())
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<AdminUser>> {
        let sql = format!("SELECT {ADMIN_USER_COLUMNS} FROM admin_users WHERE id = $1");
        match self.pool.backend() {
            PoolRef::Sqlite(pool) => fetch_one_admin_user_sqlite(pool, &sql, id).await,
            PoolRef::Postgres(pool) => fetch_one_admin_user_postgres(pool, &sql, id).await,
        }
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<AdminUser>> {
        let sql = format!("SELECT {ADMIN_USER_COLUMNS} FROM admin_users WHERE email = $1");
        match self.pool.backend() {
            PoolRef::Sqlite(pool) => fetch_one_admin_user_sqlite(pool, &sql, email).await,
            PoolRef::Postgres(pool) => fetch_one_admin_user_postgres(pool, &sql, email).await,
        }
    }

    async fn update(&self, user: &AdminUser) -> Result<AdminUser> {
        match self.pool.backend() {
            PoolRef::Sqlite(pool) => update_admin_user_sqlite(pool, user).await?,
            PoolRef::Postgres(pool) => update_admin_user_postgres(pool, user).await?,
        }
        Ok(user.clone())
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let affected = match self.pool.backend() {
            PoolRef::Sqlite(pool) => sqlx::query("DELETE FROM admin_users WHERE id = $1")
                .bind(id)
                .execute(pool)
                .await
                .context("Failed to delete admin user")?
                .rows_affected(),
            PoolRef::Postgres(pool) => sqlx::query("DELETE FROM admin_users WHERE id = $1")
                .bind(id)
                .execute(pool)
                .await
                .context("Failed to delete admin user")?
                .rows_affected(),
        };
        Ok(affected > 0)
    }

    async fn count(&self) -> Result<i64> {
        let count = match self.pool.backend() {
            PoolRef::Sqlite(pool) => {
                sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM admin_users")
                    .fetch_one(pool)
                    .await
            }
            PoolRef::Postgres(pool) => {
                sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM admin_users")
                    .fetch_one(pool)
                    .await
            }
        }
        .context("Failed to count admin users")?;
        Ok(count)
    }

    async fn list(&self) -> Result<Vec<AdminUser>> {
        let sql = format!("SELECT {ADMIN_USER_COLUMNS} FROM admin_users ORDER BY created_at");
        match self.pool.backend() {
            PoolRef::Sqlite(pool) => {
                let rows = sqlx::query(&sql)
                    .fetch_all(pool)
                    .await
                    .context("Failed to list admin users")?;
                rows.iter().map(row_to_admin_user_sqlite).collect()
            }
            PoolRef::Postgres(pool) => {
                let rows = sqlx::query(&sql)
                    .fetch_all(pool)
                    .await
                    .context("Failed to list admin users")?;
                rows.iter().map(row_to_admin_user_postgres).collect()
            }
        }
    }

    async fn record_login(&self, id: &str, at: DateTime<Utc>) -> Result<()> {
        match self.pool.backend() {
            PoolRef::Sqlite(pool) => {
                sqlx::query(RECORD_LOGIN)
                    .bind(at)
                    .bind(id)
                    .execute(pool)
                    .await
                    .map(|_| ())
            }
            PoolRef::Postgres(pool) => {
                sqlx::query(RECORD_LOGIN)
                    .bind(at)
                    .bind(id)
                    .execute(pool)
                    .await
                    .map(|_| ())
            }
        }
        .context("Failed to record login")?;
        Ok(())
    }
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_admin_user_sqlite(pool: &SqlitePool, user: &AdminUser) -> Result<()> {
    sqlx::query(INSERT_ADMIN_USER)
        .bind(&user.id)
        .bind(&user.email)
        .bind(&user.full_name)
        .bind(&user.password_hash)
        .bind(user.role.to_string())
        .bind(&user.department)
        .bind(user.is_active)
        .bind(user.last_login)
        .bind(user.login_count)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(pool)
        .await
        .context("Failed to create admin user")?;
    Ok(())
}

async fn fetch_one_admin_user_sqlite(
    pool: &SqlitePool,
    sql: &str,
    key: &str,
) -> Result<Option<AdminUser>> {
    let row = sqlx::query(sql)
        .bind(key)
        .fetch_optional(pool)
        .await
        .context("Failed to get admin user")?;

    row.as_ref().map(row_to_admin_user_sqlite).transpose()
}

async fn update_admin_user_sqlite(pool: &SqlitePool, user: &AdminUser) -> Result<()> {
    sqlx::query(UPDATE_ADMIN_USER)
        .bind(&user.full_name)
        .bind(&user.password_hash)
        .bind(user.role.to_string())
        .bind(&user.department)
        .bind(user.is_active)
        .bind(user.updated_at)
        .bind(&user.id)
        .execute(pool)
        .await
        .context("Failed to update admin user")?;
    Ok(())
}

fn row_to_admin_user_sqlite(row: &SqliteRow) -> Result<AdminUser> {
    let role: String = row.try_get("role")?;

    Ok(AdminUser {
        id: row.try_get("id")?,
        email: row.try_get("email")?,
        full_name: row.try_get("full_name")?,
        password_hash: row.try_get("password_hash")?,
        role: AdminRole::from_str(&role)?,
        department: row.try_get("department")?,
        is_active: row.try_get("is_active")?,
        last_login: row.try_get("last_login")?,
        login_count: row.try_get("login_count")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

// ============================================================================
// Postgres implementations
// ============================================================================

async fn create_admin_user_postgres(pool: &PgPool, user: &AdminUser) -> Result<()> {
    sqlx::query(INSERT_ADMIN_USER)
        .bind(&user.id)
        .bind(&user.email)
        .bind(&user.full_name)
        .bind(&user.password_hash)
        .bind(user.role.to_string())
        .bind(&user.department)
        .bind(user.is_active)
        .bind(user.last_login)
        .bind(user.login_count)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(pool)
        .await
        .context("Failed to create admin user")?;
    Ok(())
}

async fn fetch_one_admin_user_postgres(
    pool: &PgPool,
    sql: &str,
    key: &str,
) -> Result<Option<AdminUser>> {
    let row = sqlx::query(sql)
        .bind(key)
        .fetch_optional(pool)
        .await
        .context("Failed to get admin user")?;

    row.as_ref().map(row_to_admin_user_postgres).transpose()
}

async fn update_admin_user_postgres(pool: &PgPool, user: &AdminUser) -> Result<()> {
    sqlx::query(UPDATE_ADMIN_USER)
        .bind(&user.full_name)
        .bind(&user.password_hash)
        .bind(user.role.to_string())
        .bind(&user.department)
        .bind(user.is_active)
        .bind(user.updated_at)
        .bind(&user.id)
        .execute(pool)
        .await
        .context("Failed to update admin user")?;
    Ok(())
}

fn row_to_admin_user_postgres(row: &PgRow) -> Result<AdminUser> {
    let role: String = row.try_get("role")?;

    Ok(AdminUser {
        id: row.try_get("id")?,
        email: row.try_get("email")?,
        full_name: row.try_get("full_name")?,
        password_hash: row.try_get("password_hash")?,
        role: AdminRole::from_str(&role)?,
        department: row.try_get("department")?,
        is_active: row.try_get("is_active")?,
        last_login: row.try_get("last_login")?,
        login_count: row.try_get("login_count")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations::run_migrations};

    async fn setup_test_repo() -> SqlxAdminUserRepository {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        run_migrations(&pool).await.expect("Failed to run migrations");
        SqlxAdminUserRepository::new(pool)
    }

    fn section_admin(email: &str) -> AdminUser {
        AdminUser::new(
            email,
            "Section Admin".to_string(),
            "$argon2id$fake".to_string(),
            AdminRole::SectionAdmin,
            Some("63_G".to_string()),
        )
    }

    #[tokio::test]
    async fn test_create_and_get_by_email() {
        let repo = setup_test_repo().await;
        let user = repo.create(&section_admin("sec@cse.edu")).await.unwrap();

        let found = repo.get_by_email("sec@cse.edu").await.unwrap().unwrap();
        assert_eq!(found.id, user.id);
        assert_eq!(found.role, AdminRole::SectionAdmin);
        assert_eq!(found.department.as_deref(), Some("63_G"));
        assert!(found.last_login.is_none());

        assert!(repo.get_by_email("nobody@cse.edu").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let repo = setup_test_repo().await;
        repo.create(&section_admin("dup@cse.edu")).await.unwrap();
        assert!(repo.create(&section_admin("dup@cse.edu")).await.is_err());
    }

    #[tokio::test]
    async fn test_record_login_increments_count() {
        let repo = setup_test_repo().await;
        let user = repo.create(&section_admin("login@cse.edu")).await.unwrap();

        repo.record_login(&user.id, Utc::now()).await.unwrap();
        repo.record_login(&user.id, Utc::now()).await.unwrap();

        let found = repo.get_by_id(&user.id).await.unwrap().unwrap();
        assert_eq!(found.login_count, 2);
        assert!(found.last_login.is_some());
    }

    #[tokio::test]
    async fn test_update_count_list_delete() {
        let repo = setup_test_repo().await;
        let mut user = repo.create(&section_admin("a@cse.edu")).await.unwrap();
        repo.create(&section_admin("b@cse.edu")).await.unwrap();
        assert_eq!(repo.count().await.unwrap(), 2);

        user.role = AdminRole::Admin;
        user.department = None;
        user.is_active = false;
        repo.update(&user).await.unwrap();

        let found = repo.get_by_id(&user.id).await.unwrap().unwrap();
        assert_eq!(found.role, AdminRole::Admin);
        assert!(found.department.is_none());
        assert!(!found.is_active);

        assert_eq!(repo.list().await.unwrap().len(), 2);
        assert!(repo.delete(&user.id).await.unwrap());
        assert_eq!(repo.count().await.unwrap(), 1);
    }
}
