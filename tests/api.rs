//! HTTP scenarios against the full router with an in-memory database

use axum::http::{header, HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use chrono::{Duration, Utc};
use serde_json::{json, Value};

use cse_lms::api::{build_router, AppState};
use cse_lms::cache::{create_cache, create_content_cache};
use cse_lms::config::Config;
use cse_lms::db::repositories::{SessionRepository, SqlxSessionRepository};
use cse_lms::db::{create_test_pool, migrations::run_migrations, DynDatabasePool};
use cse_lms::models::{AdminRole, AdminSession, AdminUser, CreateAdminUserInput};
use cse_lms::services::{ContentCaches, TokenIssuer, TokenKind};

const ROOT_EMAIL: &str = "root@cse.edu";
const ROOT_PASSWORD: &str = "root-password";

struct Harness {
    server: TestServer,
    state: AppState,
    pool: DynDatabasePool,
    config: Config,
}

async fn harness() -> Harness {
    let config = Config::default();
    let pool = create_test_pool().await.unwrap();
    run_migrations(&pool).await.unwrap();

    let caches = ContentCaches::new(
        create_cache(&config.cache),
        create_content_cache(&config.content_cache),
    );
    let state = AppState::new(pool.clone(), &config, caches);
    state
        .admin_user_service
        .ensure_bootstrap_admin(ROOT_EMAIL, ROOT_PASSWORD)
        .await
        .unwrap();

    let app = build_router(state.clone(), &config.server.cors_origin).unwrap();
    Harness {
        server: TestServer::new(app).unwrap(),
        state,
        pool,
        config,
    }
}

fn bearer(token: &str) -> (HeaderName, HeaderValue) {
    (
        header::AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
    )
}

async fn login(h: &Harness, email: &str, password: &str) -> String {
    let response = h
        .server
        .post("/api/auth/login")
        .json(&json!({ "email": email, "password": password }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    body["data"]["token"].as_str().unwrap().to_string()
}

async fn add_section_admin(h: &Harness, department: &str) -> AdminUser {
    let root = h
        .state
        .admin_user_service
        .list()
        .await
        .unwrap()
        .into_iter()
        .find(|u| u.email == ROOT_EMAIL)
        .unwrap();
    h.state
        .admin_user_service
        .create(
            &root,
            CreateAdminUserInput {
                email: "section@cse.edu".into(),
                full_name: "Section Admin".into(),
                password: "section-password".into(),
                role: AdminRole::SectionAdmin,
                department: Some(department.into()),
            },
        )
        .await
        .unwrap()
}

fn all_in_one_body() -> Value {
    json!({
        "semester": { "title": "Spring 2025", "section": "63_G" },
        "courses": [{
            "title": "Data Structures",
            "course_code": "CSE201",
            "teacher_name": "Dr. Karim",
            "topics": [
                { "title": "Arrays", "slides": [{ "title": "Arrays", "url": "https://slides.example.com/arrays" }] },
                { "title": "Lists", "slides": [{ "title": "Lists", "url": "https://slides.example.com/lists" }] }
            ]
        }]
    })
}

#[tokio::test]
async fn login_sets_cookie_and_me_returns_user() {
    let h = harness().await;

    let response = h
        .server
        .post("/api/auth/login")
        .json(&json!({ "email": "ROOT@cse.edu", "password": ROOT_PASSWORD }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap()
        .to_string();
    assert!(cookie.starts_with("admin_token="));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Lax"));
    assert!(!cookie.contains("Secure"));

    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["user"]["email"], ROOT_EMAIL);
    assert!(body["data"]["user"].get("password_hash").is_none());
    let token = body["data"]["token"].as_str().unwrap();

    let (name, value) = bearer(token);
    let me = h.server.get("/api/auth/me").add_header(name, value).await;
    assert_eq!(me.status_code(), StatusCode::OK);
    assert_eq!(
        me.headers().get(header::CACHE_CONTROL).unwrap(),
        "no-store, no-cache, must-revalidate"
    );
    let me_body: Value = me.json();
    assert_eq!(me_body["data"]["email"], ROOT_EMAIL);
    assert_eq!(me_body["data"]["id"], body["data"]["user"]["id"]);
}

#[tokio::test]
async fn me_accepts_cookie_token() {
    let h = harness().await;
    let token = login(&h, ROOT_EMAIL, ROOT_PASSWORD).await;

    let me = h
        .server
        .get("/api/auth/me")
        .add_header(
            header::COOKIE,
            HeaderValue::from_str(&format!("admin_token={}", token)).unwrap(),
        )
        .await;
    assert_eq!(me.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn wrong_password_is_rejected_without_session() {
    let h = harness().await;

    let response = h
        .server
        .post("/api/auth/login")
        .json(&json!({ "email": ROOT_EMAIL, "password": "not-the-password" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Invalid credentials");
    assert_eq!(body["code"], "UNAUTHORIZED");

    let root = h.state.admin_user_service.list().await.unwrap().remove(0);
    let sessions = SqlxSessionRepository::new(h.pool.clone());
    assert_eq!(sessions.count_for_user(&root.id).await.unwrap(), 0);
}

#[tokio::test]
async fn expired_session_is_rejected() {
    let h = harness().await;
    let root = h.state.admin_user_service.list().await.unwrap().remove(0);

    let sessions = SqlxSessionRepository::new(h.pool.clone());
    let mut session = AdminSession::new(root.id.clone(), "stale".into(), Duration::hours(1), None, None);
    session.created_at = Utc::now() - Duration::hours(30);
    session.expires_at = Utc::now() - Duration::hours(6);
    sessions.create(&session).await.unwrap();

    let tokens = TokenIssuer::new(&h.config.auth.jwt_secret, Duration::hours(24));
    let token = tokens.issue(&root, TokenKind::Access).unwrap();

    let (name, value) = bearer(&token);
    let me = h.server.get("/api/auth/me").add_header(name, value).await;
    assert_eq!(me.status_code(), StatusCode::UNAUTHORIZED);
    let body: Value = me.json();
    assert_eq!(body["error"], "Session expired");
    assert!(sessions.latest_active_for_user(&root.id).await.unwrap().is_none());
}

#[tokio::test]
async fn logout_ends_session_and_clears_cookie() {
    let h = harness().await;
    let token = login(&h, ROOT_EMAIL, ROOT_PASSWORD).await;

    let (name, value) = bearer(&token);
    let logout = h.server.post("/api/auth/logout").add_header(name, value).await;
    assert_eq!(logout.status_code(), StatusCode::OK);
    let cookie = logout.headers().get(header::SET_COOKIE).unwrap().to_str().unwrap();
    assert!(cookie.contains("Max-Age=0"));

    let (name, value) = bearer(&token);
    let me = h.server.get("/api/auth/me").add_header(name, value).await;
    assert_eq!(me.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn all_in_one_creates_the_tree() {
    let h = harness().await;
    let token = login(&h, ROOT_EMAIL, ROOT_PASSWORD).await;

    let (name, value) = bearer(&token);
    let response = h
        .server
        .post("/api/admin/all-in-one")
        .add_header(name, value)
        .json(&all_in_one_body())
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(
        body["data"]["summary"],
        json!({
            "courses_created": 1,
            "topics_created": 2,
            "slides_created": 2,
            "videos_created": 0,
            "study_tools_created": 0
        })
    );

    let semester_id = body["data"]["semester"]["id"].as_str().unwrap();
    let courses: Value = h
        .server
        .get("/api/courses")
        .add_query_param("semester_id", semester_id)
        .await
        .json();
    assert_eq!(courses["data"].as_array().unwrap().len(), 1);

    let course_id = courses["data"][0]["id"].as_str().unwrap();
    let detail: Value = h.server.get(&format!("/api/courses/{}", course_id)).await.json();
    assert_eq!(detail["data"]["topics"].as_array().unwrap().len(), 2);
    assert_eq!(detail["data"]["semester"]["section"], "63_G");
}

#[tokio::test]
async fn all_in_one_validation_names_the_field() {
    let h = harness().await;
    let token = login(&h, ROOT_EMAIL, ROOT_PASSWORD).await;

    let mut body = all_in_one_body();
    body["courses"][0]["topics"][1]["slides"][0]["url"] = json!("");

    let (name, value) = bearer(&token);
    let response = h
        .server
        .post("/api/admin/all-in-one")
        .add_header(name, value)
        .json(&body)
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let error: Value = response.json();
    assert_eq!(error["code"], "VALIDATION_ERROR");
    assert!(error["error"]
        .as_str()
        .unwrap()
        .contains("courses[0].topics[1].slides[0].url"));

    let semesters: Value = h.server.get("/api/semesters").await.json();
    assert!(semesters["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn section_admin_is_limited_to_its_section() {
    let h = harness().await;
    add_section_admin(&h, "A").await;
    let token = login(&h, "section@cse.edu", "section-password").await;

    let (name, value) = bearer(&token);
    let own = h
        .server
        .post("/api/semesters")
        .add_header(name, value)
        .json(&json!({ "title": "Fall 2025", "section": "A" }))
        .await;
    assert_eq!(own.status_code(), StatusCode::CREATED);

    let (name, value) = bearer(&token);
    let other = h
        .server
        .post("/api/semesters")
        .add_header(name, value)
        .json(&json!({ "title": "Fall 2025", "section": "B" }))
        .await;
    assert_eq!(other.status_code(), StatusCode::FORBIDDEN);

    let (name, value) = bearer(&token);
    let listing = h
        .server
        .get("/api/admin/semesters")
        .add_query_param("section", "B")
        .add_header(name, value)
        .await;
    assert_eq!(listing.status_code(), StatusCode::FORBIDDEN);

    let (name, value) = bearer(&token);
    let users = h.server.get("/api/admin/users").add_header(name, value).await;
    assert_eq!(users.status_code(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn content_endpoint_goes_through_the_cache() {
    let h = harness().await;
    let token = login(&h, ROOT_EMAIL, ROOT_PASSWORD).await;

    let (name, value) = bearer(&token);
    let created: Value = h
        .server
        .post("/api/admin/all-in-one")
        .add_header(name, value)
        .json(&all_in_one_body())
        .await
        .json();
    let course_id = created["data"]["courses"][0]["id"].as_str().unwrap();

    let topic: Value = h
        .server
        .get("/api/topics")
        .add_query_param("course_id", course_id)
        .await
        .json();
    let topic_id = topic["data"][0]["id"].as_str().unwrap();
    let slides: Value = h
        .server
        .get("/api/slides")
        .add_query_param("topic_id", topic_id)
        .await
        .json();
    let slide_id = slides["data"][0]["id"].as_str().unwrap();

    let first = h.server.get(&format!("/api/content/slide/{}", slide_id)).await;
    assert_eq!(first.status_code(), StatusCode::OK);
    assert_eq!(first.headers().get("x-cache").unwrap(), "MISS");

    let second = h.server.get(&format!("/api/content/slide/{}", slide_id)).await;
    let body: Value = second.json();
    assert_eq!(body["data"]["cached"], true);
    assert_eq!(body["data"]["data"]["id"], slide_id);

    let (name, value) = bearer(&token);
    let stats: Value = h
        .server
        .get("/api/admin/cache/stats")
        .add_header(name, value)
        .await
        .json();
    assert_eq!(stats["data"]["hits"], 1);
    assert_eq!(stats["data"]["entries"], 1);

    let missing = h.server.get("/api/content/video/nope").await;
    assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn share_link_round_trip() {
    let h = harness().await;

    let response = h
        .server
        .get("/api/share")
        .add_query_param("type", "video")
        .add_query_param("id", "abc123")
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["data"]["path"], "/video/abc123");
    let url = body["data"]["url"].as_str().unwrap().to_string();
    assert!(url.ends_with("/video/abc123"));

    let parsed: Value = h
        .server
        .get("/api/share")
        .add_query_param("url", &url)
        .await
        .json();
    assert_eq!(parsed["data"]["content_type"], "video");
    assert_eq!(parsed["data"]["id"], "abc123");
}

#[tokio::test]
async fn unknown_resources_are_not_found() {
    let h = harness().await;

    let response = h.server.get("/api/semesters/does-not-exist").await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["code"], "NOT_FOUND");
}
