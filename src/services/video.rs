//! Video service

use crate::db::repositories::{TopicRepository, VideoRepository};
use crate::models::{AdminUser, ContentType, CreateVideoInput, UpdateVideoInput, Video};
use crate::services::content::{
    ensure_section, require, require_url, ContentCaches, ContentError, Resource,
};
use anyhow::Context;
use std::sync::Arc;

pub struct VideoService {
    repo: Arc<dyn VideoRepository>,
    topics: Arc<dyn TopicRepository>,
    caches: ContentCaches,
}

impl VideoService {
    pub fn new(repo: Arc<dyn VideoRepository>, topics: Arc<dyn TopicRepository>, caches: ContentCaches) -> Self {
        Self { repo, topics, caches }
    }

    pub async fn list(&self, topic_id: Option<&str>) -> Result<Vec<Video>, ContentError> {
        let key = Resource::Videos.list_key(topic_id);
        self.caches
            .list_or_load(&key, || async {
                self.repo.list(topic_id).await.context("Failed to list videos")
            })
            .await
    }

    pub async fn get(&self, id: &str) -> Result<Video, ContentError> {
        self.repo
            .get_by_id(id)
            .await?
            .ok_or_else(|| ContentError::NotFound(format!("Video {}", id)))
    }

    async fn ensure_topic(&self, actor: &AdminUser, topic_id: &str) -> Result<(), ContentError> {
        let section = self.topics.section_of(topic_id).await?;
        ensure_section(actor, section, &format!("Topic {}", topic_id))?;
        Ok(())
    }

    pub async fn create(&self, actor: &AdminUser, input: CreateVideoInput) -> Result<Video, ContentError> {
        require("topic_id", &input.topic_id)?;
        require("title", &input.title)?;
        require_url("url", &input.url)?;
        self.ensure_topic(actor, &input.topic_id).await?;

        let video = self.repo.create(&Video::from_input(input)).await?;
        self.caches.invalidate_lists(Resource::Videos).await;
        Ok(video)
    }

    pub async fn update(
        &self,
        actor: &AdminUser,
        id: &str,
        input: UpdateVideoInput,
    ) -> Result<Video, ContentError> {
        let section = self.repo.section_of(id).await?;
        ensure_section(actor, section, &format!("Video {}", id))?;
        let mut video = self.get(id).await?;

        if let Some(title) = &input.title {
            require("title", title)?;
        }
        if let Some(url) = &input.url {
            require_url("url", url)?;
        }
        if let Some(topic_id) = &input.topic_id {
            self.ensure_topic(actor, topic_id).await?;
        }

        video.apply(input);
        let updated = self.repo.update(&video).await?;
        self.caches.forget(ContentType::Video, id);
        self.caches.invalidate_lists(Resource::Videos).await;
        Ok(updated)
    }

    pub async fn delete(&self, actor: &AdminUser, id: &str) -> Result<(), ContentError> {
        let section = self.repo.section_of(id).await?;
        ensure_section(actor, section, &format!("Video {}", id))?;

        if !self.repo.delete(id).await? {
            return Err(ContentError::NotFound(format!("Video {}", id)));
        }
        self.caches.forget(ContentType::Video, id);
        self.caches.invalidate_subtree(Resource::Videos).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::test_support::seed_topic;
    use crate::db::repositories::{SqlxTopicRepository, SqlxVideoRepository};
    use crate::services::test_support::{caches, super_admin};

    #[tokio::test]
    async fn test_video_lifecycle() {
        let (pool, topic_id) = seed_topic("63_G").await;
        let service = VideoService::new(
            SqlxVideoRepository::boxed(pool.clone()),
            SqlxTopicRepository::boxed(pool),
            caches(),
        );
        let root = super_admin();

        let video = service
            .create(
                &root,
                CreateVideoInput {
                    topic_id: topic_id.clone(),
                    title: "AVL rotations".into(),
                    url: "https://youtu.be/avl".into(),
                    duration: Some("12:30".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(video.duration.as_deref(), Some("12:30"));

        let updated = service
            .update(
                &root,
                &video.id,
                UpdateVideoInput {
                    order_index: Some(3),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.order_index, 3);
        assert_eq!(service.list(Some(&topic_id)).await.unwrap().len(), 1);

        service.delete(&root, &video.id).await.unwrap();
        assert!(service.list(Some(&topic_id)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_title_rejected() {
        let (pool, topic_id) = seed_topic("63_G").await;
        let service = VideoService::new(
            SqlxVideoRepository::boxed(pool.clone()),
            SqlxTopicRepository::boxed(pool),
            caches(),
        );

        let result = service
            .create(
                &super_admin(),
                CreateVideoInput {
                    topic_id,
                    url: "https://youtu.be/x".into(),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(result, Err(ContentError::Validation(_))));
    }
}
