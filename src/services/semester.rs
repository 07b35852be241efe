//! Semester service
//!
//! Public listing (cached per section filter), the section-scoped back-office
//! listing and section-checked writes.

use crate::db::repositories::SemesterRepository;
use crate::models::{AdminRole, AdminUser, CreateSemesterInput, Semester, UpdateSemesterInput};
use crate::services::content::{ensure_section, require, ContentCaches, ContentError, Resource};
use anyhow::Context;
use std::sync::Arc;

pub struct SemesterService {
    repo: Arc<dyn SemesterRepository>,
    caches: ContentCaches,
}

impl SemesterService {
    pub fn new(repo: Arc<dyn SemesterRepository>, caches: ContentCaches) -> Self {
        Self { repo, caches }
    }

    /// Public list, newest first, optionally for one section
    pub async fn list(&self, section: Option<&str>) -> Result<Vec<Semester>, ContentError> {
        let key = Resource::Semesters.list_key(section);
        self.caches
            .list_or_load(&key, || async {
                self.repo.list(section).await.context("Failed to list semesters")
            })
            .await
    }

    /// Back-office list.
    ///
    /// A section admin without a filter sees its own section only; asking for
    /// another section is forbidden.
    pub async fn list_for_admin(
        &self,
        actor: &AdminUser,
        section: Option<&str>,
    ) -> Result<Vec<Semester>, ContentError> {
        let scope = match (actor.role, section) {
            (AdminRole::SectionAdmin, None) => Some(
                actor
                    .department
                    .clone()
                    .ok_or_else(|| ContentError::Forbidden("Section admin has no department".into()))?,
            ),
            (_, Some(section)) => {
                ensure_section(actor, Some(section.to_string()), "Section")?;
                Some(section.to_string())
            }
            (_, None) => None,
        };

        Ok(self.repo.list(scope.as_deref()).await.context("Failed to list semesters")?)
    }

    pub async fn get(&self, id: &str) -> Result<Semester, ContentError> {
        self.repo
            .get_by_id(id)
            .await?
            .ok_or_else(|| ContentError::NotFound(format!("Semester {}", id)))
    }

    pub async fn create(
        &self,
        actor: &AdminUser,
        input: CreateSemesterInput,
    ) -> Result<Semester, ContentError> {
        require("title", &input.title)?;
        require("section", &input.section)?;

        let semester = Semester::from_input(input);
        validate_dates(&semester)?;
        ensure_section(actor, Some(semester.section.clone()), "Section")?;

        let created = self.repo.create(&semester).await?;
        self.caches.invalidate_lists(Resource::Semesters).await;
        tracing::info!("Semester {} created by {}", created.id, actor.email);
        Ok(created)
    }

    pub async fn update(
        &self,
        actor: &AdminUser,
        id: &str,
        input: UpdateSemesterInput,
    ) -> Result<Semester, ContentError> {
        let mut semester = self.get(id).await?;
        ensure_section(actor, Some(semester.section.clone()), "Semester")?;

        if let Some(title) = &input.title {
            require("title", title)?;
        }
        if let Some(section) = &input.section {
            require("section", section)?;
        }

        semester.apply(input);
        validate_dates(&semester)?;
        // Moving a semester needs rights on the target section too
        ensure_section(actor, Some(semester.section.clone()), "Section")?;

        let updated = self.repo.update(&semester).await?;
        self.caches.invalidate_lists(Resource::Semesters).await;
        Ok(updated)
    }

    pub async fn delete(&self, actor: &AdminUser, id: &str) -> Result<(), ContentError> {
        let semester = self.get(id).await?;
        ensure_section(actor, Some(semester.section), "Semester")?;

        if !self.repo.delete(id).await? {
            return Err(ContentError::NotFound(format!("Semester {}", id)));
        }
        self.caches.invalidate_subtree(Resource::Semesters).await;
        tracing::info!("Semester {} deleted by {}", id, actor.email);
        Ok(())
    }
}

fn validate_dates(semester: &Semester) -> Result<(), ContentError> {
    if let (Some(start), Some(end)) = (semester.start_date, semester.end_date) {
        if end < start {
            return Err(ContentError::Validation(
                "end_date must not be before start_date".into(),
            ));
        }
    }
    Ok(())
}
