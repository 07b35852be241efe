//! Topic model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Slide, Video};

/// Topic entity, owned by a course
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topic {
    pub id: String,
    pub course_id: String,
    pub title: String,
    pub description: Option<String>,
    pub order_index: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Topic {
    pub fn from_input(input: CreateTopicInput) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            course_id: input.course_id,
            title: input.title.trim().to_string(),
            description: input.description,
            order_index: input.order_index.unwrap_or(0),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, input: UpdateTopicInput) {
        if let Some(course_id) = input.course_id {
            self.course_id = course_id;
        }
        if let Some(title) = input.title {
            self.title = title.trim().to_string();
        }
        if input.description.is_some() {
            self.description = input.description;
        }
        if let Some(order_index) = input.order_index {
            self.order_index = order_index;
        }
        self.updated_at = Utc::now();
    }
}

/// Input for creating a topic
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateTopicInput {
    #[serde(default)]
    pub course_id: String,
    #[serde(default)]
    pub title: String,
    pub description: Option<String>,
    pub order_index: Option<i32>,
}

/// Input for updating a topic
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTopicInput {
    pub course_id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub order_index: Option<i32>,
}

/// Topic with its slides and videos
#[derive(Debug, Clone, Serialize)]
pub struct TopicDetail {
    #[serde(flatten)]
    pub topic: Topic,
    pub slides: Vec<Slide>,
    pub videos: Vec<Video>,
}
