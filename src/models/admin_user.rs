//! Admin user model
//!
//! Back-office accounts. Section admins are limited to the section named by
//! their `department`; admins and super admins are not section restricted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Admin user entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminUser {
    pub id: String,
    /// Email address (unique, lower-cased)
    pub email: String,
    pub full_name: String,
    /// Password hash (argon2)
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: AdminRole,
    /// Section code for section admins
    pub department: Option<String>,
    pub is_active: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub login_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AdminUser {
    /// Create a new admin user.
    ///
    /// The password must already be hashed; the email is normalized here.
    pub fn new(
        email: &str,
        full_name: String,
        password_hash: String,
        role: AdminRole,
        department: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            email: normalize_email(email),
            full_name,
            password_hash,
            role,
            department,
            is_active: true,
            last_login: None,
            login_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_super_admin(&self) -> bool {
        self.role == AdminRole::SuperAdmin
    }

    /// Admins and super admins may manage other accounts
    pub fn can_manage_users(&self) -> bool {
        AdminRole::USER_MANAGERS.contains(&self.role)
    }

    /// Check whether this user may write content in the given section
    pub fn can_manage_section(&self, section: &str) -> bool {
        match self.role {
            AdminRole::SuperAdmin | AdminRole::Admin => true,
            AdminRole::SectionAdmin => self.department.as_deref() == Some(section),
        }
    }
}

/// Lower-case and trim an email address for storage and lookup
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Admin role for authorization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminRole {
    SuperAdmin,
    Admin,
    SectionAdmin,
}

impl AdminRole {
    /// Roles allowed to write section-scoped content
    pub const CONTENT_EDITORS: &'static [AdminRole] =
        &[AdminRole::SuperAdmin, AdminRole::Admin, AdminRole::SectionAdmin];

    /// Roles allowed to manage admin accounts
    pub const USER_MANAGERS: &'static [AdminRole] = &[AdminRole::SuperAdmin, AdminRole::Admin];
}

impl fmt::Display for AdminRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdminRole::SuperAdmin => write!(f, "super_admin"),
            AdminRole::Admin => write!(f, "admin"),
            AdminRole::SectionAdmin => write!(f, "section_admin"),
        }
    }
}

impl FromStr for AdminRole {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "super_admin" => Ok(AdminRole::SuperAdmin),
            "admin" => Ok(AdminRole::Admin),
            "section_admin" => Ok(AdminRole::SectionAdmin),
            _ => Err(anyhow::anyhow!("Invalid admin role: {}", s)),
        }
    }
}

/// Input for creating an admin user (before password hashing)
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAdminUserInput {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub password: String,
    pub role: AdminRole,
    pub department: Option<String>,
}

/// Input for updating an admin user
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateAdminUserInput {
    pub full_name: Option<String>,
    /// New password (will be hashed)
    pub password: Option<String>,
    pub role: Option<AdminRole>,
    pub department: Option<String>,
    pub is_active: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: AdminRole, department: Option<&str>) -> AdminUser {
        AdminUser::new(
            "Someone@CSE.edu ",
            "Someone".to_string(),
            "hash".to_string(),
            role,
            department.map(str::to_string),
        )
    }

    #[test]
    fn test_new_normalizes_email() {
        let u = user(AdminRole::Admin, None);
        assert_eq!(u.email, "someone@cse.edu");
        assert_eq!(u.login_count, 0);
        assert!(u.is_active);
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let json = serde_json::to_value(user(AdminRole::Admin, None)).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["role"], "admin");
    }

    #[test]
    fn test_section_rules() {
        let section_admin = user(AdminRole::SectionAdmin, Some("A"));
        assert!(section_admin.can_manage_section("A"));
        assert!(!section_admin.can_manage_section("B"));

        let no_department = user(AdminRole::SectionAdmin, None);
        assert!(!no_department.can_manage_section("A"));

        assert!(user(AdminRole::Admin, None).can_manage_section("B"));
        assert!(user(AdminRole::SuperAdmin, None).can_manage_section("B"));
    }

    #[test]
    fn test_user_managers() {
        assert!(user(AdminRole::SuperAdmin, None).can_manage_users());
        assert!(user(AdminRole::Admin, None).can_manage_users());
        assert!(!user(AdminRole::SectionAdmin, Some("A")).can_manage_users());
    }

    #[test]
    fn test_role_roundtrip() {
        for role in [AdminRole::SuperAdmin, AdminRole::Admin, AdminRole::SectionAdmin] {
            assert_eq!(AdminRole::from_str(&role.to_string()).unwrap(), role);
        }
        assert!(AdminRole::from_str("owner").is_err());
    }
}
