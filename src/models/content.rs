//! Shareable content kinds

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of individually shareable content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContentType {
    Slide,
    Video,
    StudyTool,
}

impl ContentType {
    pub const ALL: [ContentType; 3] = [ContentType::Slide, ContentType::Video, ContentType::StudyTool];

    /// URL path segment, e.g. `study-tool`
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Slide => "slide",
            ContentType::Video => "video",
            ContentType::StudyTool => "study-tool",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "slide" | "slides" => Ok(ContentType::Slide),
            "video" | "videos" => Ok(ContentType::Video),
            "study-tool" | "study_tool" | "study-tools" => Ok(ContentType::StudyTool),
            _ => Err(anyhow::anyhow!("Invalid content type: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_parse() {
        assert_eq!(ContentType::from_str("slide").unwrap(), ContentType::Slide);
        assert_eq!(ContentType::from_str("Videos").unwrap(), ContentType::Video);
        assert_eq!(ContentType::from_str("study_tool").unwrap(), ContentType::StudyTool);
        assert!(ContentType::from_str("course").is_err());
    }

    #[test]
    fn test_display_matches_serde() {
        for t in ContentType::ALL {
            assert_eq!(serde_json::to_string(&t).unwrap(), format!("\"{}\"", t));
            assert_eq!(ContentType::from_str(t.as_str()).unwrap(), t);
        }
    }
}
