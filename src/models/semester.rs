//! Semester model
//!
//! A semester is the top of the content hierarchy and carries the section
//! (department) code that scopes what section admins may edit.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Semester entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Semester {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    /// Section code, e.g. "63_G"
    pub section: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Semester {
    pub fn new(title: String, section: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            title,
            description: None,
            section,
            start_date: None,
            end_date: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Build a semester from create input. Fields are expected to be validated.
    pub fn from_input(input: CreateSemesterInput) -> Self {
        let mut semester = Self::new(input.title.trim().to_string(), input.section.trim().to_string());
        semester.description = input.description;
        semester.start_date = input.start_date;
        semester.end_date = input.end_date;
        semester.is_active = input.is_active.unwrap_or(true);
        semester
    }

    /// Apply a partial update in place
    pub fn apply(&mut self, input: UpdateSemesterInput) {
        if let Some(title) = input.title {
            self.title = title.trim().to_string();
        }
        if let Some(section) = input.section {
            self.section = section.trim().to_string();
        }
        if input.description.is_some() {
            self.description = input.description;
        }
        if input.start_date.is_some() {
            self.start_date = input.start_date;
        }
        if input.end_date.is_some() {
            self.end_date = input.end_date;
        }
        if let Some(is_active) = input.is_active {
            self.is_active = is_active;
        }
        self.updated_at = Utc::now();
    }
}

/// Input for creating a semester
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateSemesterInput {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub section: String,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub is_active: Option<bool>,
}

/// Input for updating a semester
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateSemesterInput {
    pub title: Option<String>,
    pub section: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub is_active: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_input_trims_and_defaults() {
        let semester = Semester::from_input(CreateSemesterInput {
            title: "  Spring 2025 ".to_string(),
            section: "63_G".to_string(),
            ..Default::default()
        });

        assert_eq!(semester.title, "Spring 2025");
        assert_eq!(semester.section, "63_G");
        assert!(semester.is_active);
        assert!(Uuid::parse_str(&semester.id).is_ok());
    }

    #[test]
    fn test_apply_partial_update() {
        let mut semester = Semester::new("Spring".to_string(), "63_G".to_string());
        let before = semester.updated_at;

        semester.apply(UpdateSemesterInput {
            is_active: Some(false),
            ..Default::default()
        });

        assert_eq!(semester.title, "Spring");
        assert!(!semester.is_active);
        assert!(semester.updated_at >= before);
    }
}
