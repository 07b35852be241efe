//! Slide service
//!
//! Writes are checked against the section of the owning topic and evict the
//! slide from the content cache.

use crate::db::repositories::{SlideRepository, TopicRepository};
use crate::models::{AdminUser, ContentType, CreateSlideInput, Slide, UpdateSlideInput};
use crate::services::content::{
    ensure_section, require, require_url, ContentCaches, ContentError, Resource,
};
use anyhow::Context;
use std::sync::Arc;

pub struct SlideService {
    repo: Arc<dyn SlideRepository>,
    topics: Arc<dyn TopicRepository>,
    caches: ContentCaches,
}

impl SlideService {
    pub fn new(repo: Arc<dyn SlideRepository>, topics: Arc<dyn TopicRepository>, caches: ContentCaches) -> Self {
        Self { repo, topics, caches }
    }

    pub async fn list(&self, topic_id: Option<&str>) -> Result<Vec<Slide>, ContentError> {
        let key = Resource::Slides.list_key(topic_id);
        self.caches
            .list_or_load(&key, || async {
                self.repo.list(topic_id).await.context("Failed to list slides")
            })
            .await
    }

    pub async fn get(&self, id: &str) -> Result<Slide, ContentError> {
        self.repo
            .get_by_id(id)
            .await?
            .ok_or_else(|| ContentError::NotFound(format!("Slide {}", id)))
    }

    async fn ensure_topic(&self, actor: &AdminUser, topic_id: &str) -> Result<(), ContentError> {
        let section = self.topics.section_of(topic_id).await?;
        ensure_section(actor, section, &format!("Topic {}", topic_id))?;
        Ok(())
    }

    pub async fn create(&self, actor: &AdminUser, input: CreateSlideInput) -> Result<Slide, ContentError> {
        require("topic_id", &input.topic_id)?;
        require("title", &input.title)?;
        require_url("url", &input.url)?;
        self.ensure_topic(actor, &input.topic_id).await?;

        let slide = self.repo.create(&Slide::from_input(input)).await?;
        self.caches.invalidate_lists(Resource::Slides).await;
        Ok(slide)
    }

    pub async fn update(
        &self,
        actor: &AdminUser,
        id: &str,
        input: UpdateSlideInput,
    ) -> Result<Slide, ContentError> {
        let section = self.repo.section_of(id).await?;
        ensure_section(actor, section, &format!("Slide {}", id))?;
        let mut slide = self.get(id).await?;

        if let Some(title) = &input.title {
            require("title", title)?;
        }
        if let Some(url) = &input.url {
            require_url("url", url)?;
        }
        if let Some(topic_id) = &input.topic_id {
            self.ensure_topic(actor, topic_id).await?;
        }

        slide.apply(input);
        let updated = self.repo.update(&slide).await?;
        self.caches.forget(ContentType::Slide, id);
        self.caches.invalidate_lists(Resource::Slides).await;
        Ok(updated)
    }

    pub async fn delete(&self, actor: &AdminUser, id: &str) -> Result<(), ContentError> {
        let section = self.repo.section_of(id).await?;
        ensure_section(actor, section, &format!("Slide {}", id))?;

        if !self.repo.delete(id).await? {
            return Err(ContentError::NotFound(format!("Slide {}", id)));
        }
        self.caches.forget(ContentType::Slide, id);
        self.caches.invalidate_subtree(Resource::Slides).await;
        Ok(())
    }
}
