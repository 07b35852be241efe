//! Share links
//!
//! Public links to content items have the form `/{slide|video|study-tool}/{id}`,
//! optionally prefixed by the site origin and a base path. Ids are a single
//! path segment: no `/`, `?`, `#` or whitespace.

use crate::models::ContentType;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

static SHARE_PATH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:https?://[^/?#]+)?(?:/[^?#]*)?/(slide|video|study-tool)/([^/?#\s]+)/?(?:[?#].*)?$",
    )
    .expect("share path pattern compiles")
});

static SHARE_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^/?#\s]+$").expect("share id pattern compiles"));

/// Content referenced by a share link
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SharedItem {
    pub content_type: ContentType,
    pub id: String,
}

/// Whether `id` fits in one share path segment
pub fn is_shareable_id(id: &str) -> bool {
    SHARE_ID.is_match(id)
}

/// Site-relative path of a content item
pub fn share_path(content_type: ContentType, id: &str) -> String {
    format!("/{}/{}", content_type.as_str(), id)
}

/// Absolute share URL under `base_url`
pub fn generate_share_url(base_url: &str, content_type: ContentType, id: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), share_path(content_type, id))
}

/// Recover the content type and id from a share URL or path
pub fn parse_share_url(url: &str) -> Option<SharedItem> {
    let captures = SHARE_PATH.captures(url.trim())?;
    let content_type = captures.get(1)?.as_str().parse().ok()?;
    let id = captures.get(2)?.as_str().to_string();
    Some(SharedItem { content_type, id })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_share_path() {
        assert_eq!(share_path(ContentType::StudyTool, "t1"), "/study-tool/t1");
    }

    #[test]
    fn test_generate_trims_trailing_slash() {
        assert_eq!(
            generate_share_url("https://lms.cse.edu/", ContentType::Video, "abc123"),
            "https://lms.cse.edu/video/abc123"
        );
    }

    #[test]
    fn test_round_trip_video() {
        let url = generate_share_url("https://lms.cse.edu", ContentType::Video, "abc123");
        assert_eq!(
            parse_share_url(&url),
            Some(SharedItem {
                content_type: ContentType::Video,
                id: "abc123".into()
            })
        );
    }

    #[test]
    fn test_parse_accepts_paths_queries_and_fragments() {
        let expected = Some(SharedItem {
            content_type: ContentType::Slide,
            id: "s-1".into(),
        });
        assert_eq!(parse_share_url("/slide/s-1"), expected);
        assert_eq!(parse_share_url("/slide/s-1/"), expected);
        assert_eq!(parse_share_url("http://localhost:3000/slide/s-1?ref=x"), expected);
        assert_eq!(parse_share_url("/slide/s-1#top"), expected);
    }

    #[test]
    fn test_round_trip_under_base_path() {
        let url = generate_share_url("https://cse.example.edu/lms", ContentType::Video, "abc123");
        assert_eq!(url, "https://cse.example.edu/lms/video/abc123");
        assert_eq!(
            parse_share_url(&url),
            Some(SharedItem {
                content_type: ContentType::Video,
                id: "abc123".into()
            })
        );
    }

    #[test]
    fn test_round_trip_dotted_id() {
        let url = generate_share_url("https://cse.example.edu", ContentType::Slide, "lec.01");
        assert_eq!(
            parse_share_url(&url),
            Some(SharedItem {
                content_type: ContentType::Slide,
                id: "lec.01".into()
            })
        );
    }

    #[test]
    fn test_shareable_ids() {
        assert!(is_shareable_id("lec.01"));
        assert!(is_shareable_id("9f1c-uuid_x"));
        assert!(!is_shareable_id(""));
        assert!(!is_shareable_id("a/b"));
        assert!(!is_shareable_id("a b"));
        assert!(!is_shareable_id("a?b"));
        assert!(!is_shareable_id("a#b"));
    }

    #[test]
    fn test_parse_rejects_other_urls() {
        assert_eq!(parse_share_url("/course/abc"), None);
        assert_eq!(parse_share_url("/slide/"), None);
        assert_eq!(parse_share_url("/slide/a/b"), None);
        assert_eq!(parse_share_url("not a url"), None);
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        fn content_type() -> impl Strategy<Value = ContentType> {
            prop_oneof![
                Just(ContentType::Slide),
                Just(ContentType::Video),
                Just(ContentType::StudyTool),
            ]
        }

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(20))]

            #[test]
            fn parse_inverts_generate(
                content_type in content_type(),
                id in "[A-Za-z0-9_.~!$'()*+,;=:@%-]{1,40}",
                base in prop_oneof![
                    Just(""),
                    Just("/lms"),
                    Just("https://lms.cse.edu"),
                    Just("http://localhost:8080/"),
                    Just("https://cse.example.edu/lms"),
                    Just("https://cse.example.edu/apps/lms/"),
                ],
            ) {
                prop_assert!(is_shareable_id(&id));
                let url = generate_share_url(base, content_type, &id);
                prop_assert_eq!(parse_share_url(&url), Some(SharedItem { content_type, id }));
            }
        }
    }
}
