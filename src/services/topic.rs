//! Topic service

use crate::db::repositories::{CourseRepository, SlideRepository, TopicRepository, VideoRepository};
use crate::models::{AdminUser, CreateTopicInput, Topic, TopicDetail, UpdateTopicInput};
use crate::services::content::{ensure_section, require, ContentCaches, ContentError, Resource};
use anyhow::Context;
use std::sync::Arc;

pub struct TopicService {
    repo: Arc<dyn TopicRepository>,
    courses: Arc<dyn CourseRepository>,
    slides: Arc<dyn SlideRepository>,
    videos: Arc<dyn VideoRepository>,
    caches: ContentCaches,
}

impl TopicService {
    pub fn new(
        repo: Arc<dyn TopicRepository>,
        courses: Arc<dyn CourseRepository>,
        slides: Arc<dyn SlideRepository>,
        videos: Arc<dyn VideoRepository>,
        caches: ContentCaches,
    ) -> Self {
        Self {
            repo,
            courses,
            slides,
            videos,
            caches,
        }
    }

    pub async fn list(&self, course_id: Option<&str>) -> Result<Vec<Topic>, ContentError> {
        let key = Resource::Topics.list_key(course_id);
        self.caches
            .list_or_load(&key, || async {
                self.repo.list(course_id).await.context("Failed to list topics")
            })
            .await
    }

    pub async fn get(&self, id: &str) -> Result<Topic, ContentError> {
        self.repo
            .get_by_id(id)
            .await?
            .ok_or_else(|| ContentError::NotFound(format!("Topic {}", id)))
    }

    /// Topic with its slides and videos
    pub async fn detail(&self, id: &str) -> Result<TopicDetail, ContentError> {
        let topic = self.get(id).await?;
        let (slides, videos) = tokio::try_join!(self.slides.list(Some(id)), self.videos.list(Some(id)))
            .context("Failed to load topic detail")?;

        Ok(TopicDetail {
            topic,
            slides,
            videos,
        })
    }

    async fn ensure_course(&self, actor: &AdminUser, course_id: &str) -> Result<(), ContentError> {
        let section = self.courses.section_of(course_id).await?;
        ensure_section(actor, section, &format!("Course {}", course_id))?;
        Ok(())
    }

    pub async fn create(&self, actor: &AdminUser, input: CreateTopicInput) -> Result<Topic, ContentError> {
        require("course_id", &input.course_id)?;
        require("title", &input.title)?;
        self.ensure_course(actor, &input.course_id).await?;

        let topic = self.repo.create(&Topic::from_input(input)).await?;
        self.caches.invalidate_lists(Resource::Topics).await;
        Ok(topic)
    }

    pub async fn update(
        &self,
        actor: &AdminUser,
        id: &str,
        input: UpdateTopicInput,
    ) -> Result<Topic, ContentError> {
        let section = self.repo.section_of(id).await?;
        ensure_section(actor, section, &format!("Topic {}", id))?;
        let mut topic = self.get(id).await?;

        if let Some(title) = &input.title {
            require("title", title)?;
        }
        if let Some(course_id) = &input.course_id {
            self.ensure_course(actor, course_id).await?;
        }

        topic.apply(input);
        let updated = self.repo.update(&topic).await?;
        self.caches.invalidate_lists(Resource::Topics).await;
        Ok(updated)
    }

    pub async fn delete(&self, actor: &AdminUser, id: &str) -> Result<(), ContentError> {
        let section = self.repo.section_of(id).await?;
        ensure_section(actor, section, &format!("Topic {}", id))?;

        if !self.repo.delete(id).await? {
            return Err(ContentError::NotFound(format!("Topic {}", id)));
        }
        self.caches.invalidate_subtree(Resource::Topics).await;
        Ok(())
    }
}
