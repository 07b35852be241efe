//! Admin user management
//!
//! Back-office accounts: creation, role and department changes, deactivation
//! and removal, plus the bootstrap super admin created on first start.

use crate::db::repositories::{AdminUserRepository, SessionRepository};
use crate::models::{normalize_email, AdminRole, AdminUser, CreateAdminUserInput, UpdateAdminUserInput};
use crate::services::password::{hash_password, MIN_PASSWORD_LENGTH};
use anyhow::Context;
use chrono::Utc;
use std::sync::Arc;

/// Error types for admin user operations
#[derive(Debug, thiserror::Error)]
pub enum AdminUserError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Admin user not found: {0}")]
    NotFound(String),

    /// Email already registered
    #[error("Email already registered: {0}")]
    Conflict(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

pub struct AdminUserService {
    users: Arc<dyn AdminUserRepository>,
    sessions: Arc<dyn SessionRepository>,
}

impl AdminUserService {
    pub fn new(users: Arc<dyn AdminUserRepository>, sessions: Arc<dyn SessionRepository>) -> Self {
        Self { users, sessions }
    }

    pub async fn list(&self) -> Result<Vec<AdminUser>, AdminUserError> {
        Ok(self.users.list().await.context("Failed to list admin users")?)
    }

    pub async fn get(&self, id: &str) -> Result<AdminUser, AdminUserError> {
        self.users
            .get_by_id(id)
            .await?
            .ok_or_else(|| AdminUserError::NotFound(id.to_string()))
    }

    pub async fn create(
        &self,
        actor: &AdminUser,
        input: CreateAdminUserInput,
    ) -> Result<AdminUser, AdminUserError> {
        let email = normalize_email(&input.email);
        validate_email(&email)?;
        if input.full_name.trim().is_empty() {
            return Err(AdminUserError::Validation("full_name is required".into()));
        }
        validate_password(&input.password)?;
        ensure_may_grant(actor, input.role)?;
        let department = clean_department(input.department);
        validate_department(input.role, department.as_deref())?;

        if self.users.get_by_email(&email).await?.is_some() {
            return Err(AdminUserError::Conflict(email));
        }

        let password_hash = hash_password(&input.password)?;
        let user = AdminUser::new(
            &email,
            input.full_name.trim().to_string(),
            password_hash,
            input.role,
            department,
        );
        let created = self.users.create(&user).await?;
        tracing::info!("Admin user {} ({}) created by {}", created.email, created.role, actor.email);
        Ok(created)
    }

    pub async fn update(
        &self,
        actor: &AdminUser,
        id: &str,
        input: UpdateAdminUserInput,
    ) -> Result<AdminUser, AdminUserError> {
        let mut user = self.get(id).await?;
        if user.is_super_admin() && !actor.is_super_admin() {
            return Err(AdminUserError::Forbidden(
                "Only a super admin can modify a super admin".into(),
            ));
        }

        if let Some(full_name) = input.full_name {
            if full_name.trim().is_empty() {
                return Err(AdminUserError::Validation("full_name is required".into()));
            }
            user.full_name = full_name.trim().to_string();
        }
        if let Some(role) = input.role {
            ensure_may_grant(actor, role)?;
            user.role = role;
        }
        if input.department.is_some() {
            user.department = clean_department(input.department);
        }
        validate_department(user.role, user.department.as_deref())?;
        if let Some(password) = input.password {
            validate_password(&password)?;
            user.password_hash = hash_password(&password)?;
        }

        let deactivated = input.is_active == Some(false) && user.is_active;
        if let Some(is_active) = input.is_active {
            if !is_active && user.id == actor.id {
                return Err(AdminUserError::Validation(
                    "You cannot deactivate your own account".into(),
                ));
            }
            user.is_active = is_active;
        }
        user.updated_at = Utc::now();

        let updated = self.users.update(&user).await?;
        if deactivated {
            self.sessions.deactivate_all_for_user(&updated.id).await?;
        }
        Ok(updated)
    }

    pub async fn delete(&self, actor: &AdminUser, id: &str) -> Result<(), AdminUserError> {
        if actor.id == id {
            return Err(AdminUserError::Validation(
                "You cannot delete your own account".into(),
            ));
        }
        if !self.users.delete(id).await? {
            return Err(AdminUserError::NotFound(id.to_string()));
        }
        tracing::info!("Admin user {} deleted by {}", id, actor.email);
        Ok(())
    }

    /// Create the first super admin when no admin exists yet.
    ///
    /// Returns the created user, or `None` if accounts already exist.
    pub async fn ensure_bootstrap_admin(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<AdminUser>, AdminUserError> {
        if self.users.count().await? > 0 {
            return Ok(None);
        }

        let email = normalize_email(email);
        validate_email(&email)?;
        validate_password(password)?;

        let user = AdminUser::new(
            &email,
            "Super Admin".to_string(),
            hash_password(password)?,
            AdminRole::SuperAdmin,
            None,
        );
        let created = self.users.create(&user).await?;
        tracing::info!("Bootstrap super admin {} created", created.email);
        Ok(Some(created))
    }
}

fn validate_email(email: &str) -> Result<(), AdminUserError> {
    let valid = match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.'),
        None => false,
    };
    if !valid {
        return Err(AdminUserError::Validation(format!("Invalid email: {}", email)));
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), AdminUserError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AdminUserError::Validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

fn clean_department(department: Option<String>) -> Option<String> {
    department
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
}

/// Section admins are tied to one section
fn validate_department(role: AdminRole, department: Option<&str>) -> Result<(), AdminUserError> {
    if role == AdminRole::SectionAdmin && department.is_none() {
        return Err(AdminUserError::Validation(
            "Section admins require a department".into(),
        ));
    }
    Ok(())
}

/// Only a super admin can hand out the super admin role
fn ensure_may_grant(actor: &AdminUser, role: AdminRole) -> Result<(), AdminUserError> {
    if role == AdminRole::SuperAdmin && !actor.is_super_admin() {
        return Err(AdminUserError::Forbidden(
            "Only a super admin can grant the super admin role".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{SqlxAdminUserRepository, SqlxSessionRepository};
    use crate::db::{create_test_pool, migrations::run_migrations};
    use crate::services::test_support::super_admin;

    async fn service() -> AdminUserService {
        let pool = create_test_pool().await.unwrap();
        run_migrations(&pool).await.unwrap();
        AdminUserService::new(
            SqlxAdminUserRepository::boxed(pool.clone()),
            SqlxSessionRepository::boxed(pool),
        )
    }

    fn input(email: &str, role: AdminRole, department: Option<&str>) -> CreateAdminUserInput {
        CreateAdminUserInput {
            email: email.into(),
            full_name: "Faculty Member".into(),
            password: "long-enough-pw".into(),
            role,
            department: department.map(String::from),
        }
    }

    #[tokio::test]
    async fn test_create_normalizes_and_rejects_duplicates() {
        let service = service().await;
        let root = super_admin();

        let user = service
            .create(&root, input(" Head@CSE.edu ", AdminRole::Admin, None))
            .await
            .unwrap();
        assert_eq!(user.email, "head@cse.edu");
        assert!(user.password_hash.starts_with("$argon2id$"));

        let dup = service.create(&root, input("HEAD@cse.edu", AdminRole::Admin, None)).await;
        assert!(matches!(dup, Err(AdminUserError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_section_admin_needs_department() {
        let service = service().await;
        let root = super_admin();

        let missing = service
            .create(&root, input("sec@cse.edu", AdminRole::SectionAdmin, Some("  ")))
            .await;
        assert!(matches!(missing, Err(AdminUserError::Validation(_))));

        let ok = service
            .create(&root, input("sec@cse.edu", AdminRole::SectionAdmin, Some("63_G")))
            .await
            .unwrap();
        assert_eq!(ok.department.as_deref(), Some("63_G"));
    }

    #[tokio::test]
    async fn test_validation_rules() {
        let service = service().await;
        let root = super_admin();

        assert!(matches!(
            service.create(&root, input("not-an-email", AdminRole::Admin, None)).await,
            Err(AdminUserError::Validation(_))
        ));

        let mut short = input("a@cse.edu", AdminRole::Admin, None);
        short.password = "short".into();
        assert!(matches!(
            service.create(&root, short).await,
            Err(AdminUserError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_admin_cannot_grant_super_admin() {
        let service = service().await;
        let admin = service
            .create(&super_admin(), input("admin@cse.edu", AdminRole::Admin, None))
            .await
            .unwrap();

        let result = service
            .create(&admin, input("boss@cse.edu", AdminRole::SuperAdmin, None))
            .await;
        assert!(matches!(result, Err(AdminUserError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_update_and_delete_rules() {
        let service = service().await;
        let root = service.ensure_bootstrap_admin("root@cse.edu", "bootstrap-pw").await.unwrap().unwrap();
        let user = service
            .create(&root, input("sec@cse.edu", AdminRole::SectionAdmin, Some("A")))
            .await
            .unwrap();

        let moved = service
            .update(
                &root,
                &user.id,
                UpdateAdminUserInput {
                    department: Some("B".into()),
                    is_active: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(moved.department.as_deref(), Some("B"));
        assert!(!moved.is_active);

        assert!(matches!(
            service.delete(&root, &root.id).await,
            Err(AdminUserError::Validation(_))
        ));
        service.delete(&root, &user.id).await.unwrap();
        assert!(matches!(service.get(&user.id).await, Err(AdminUserError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_bootstrap_only_when_empty() {
        let service = service().await;

        let first = service.ensure_bootstrap_admin("Root@CSE.edu", "bootstrap-pw").await.unwrap();
        assert_eq!(first.map(|u| u.role), Some(AdminRole::SuperAdmin));

        let second = service.ensure_bootstrap_admin("other@cse.edu", "bootstrap-pw").await.unwrap();
        assert!(second.is_none());
        assert_eq!(service.list().await.unwrap().len(), 1);
    }
}
