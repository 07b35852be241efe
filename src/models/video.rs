//! Video model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lecture video link attached to a topic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Video {
    pub id: String,
    pub topic_id: String,
    pub title: String,
    pub url: String,
    pub description: Option<String>,
    /// Free-form duration label, e.g. "45:10"
    pub duration: Option<String>,
    pub order_index: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Video {
    pub fn from_input(input: CreateVideoInput) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            topic_id: input.topic_id,
            title: input.title.trim().to_string(),
            url: input.url.trim().to_string(),
            description: input.description,
            duration: input.duration,
            order_index: input.order_index.unwrap_or(0),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, input: UpdateVideoInput) {
        if let Some(topic_id) = input.topic_id {
            self.topic_id = topic_id;
        }
        if let Some(title) = input.title {
            self.title = title.trim().to_string();
        }
        if let Some(url) = input.url {
            self.url = url.trim().to_string();
        }
        if input.description.is_some() {
            self.description = input.description;
        }
        if input.duration.is_some() {
            self.duration = input.duration;
        }
        if let Some(order_index) = input.order_index {
            self.order_index = order_index;
        }
        self.updated_at = Utc::now();
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateVideoInput {
    #[serde(default)]
    pub topic_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    pub description: Option<String>,
    pub duration: Option<String>,
    pub order_index: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateVideoInput {
    pub topic_id: Option<String>,
    pub title: Option<String>,
    pub url: Option<String>,
    pub description: Option<String>,
    pub duration: Option<String>,
    pub order_index: Option<i32>,
}
