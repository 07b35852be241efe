//! Seed helpers shared by repository tests

use crate::db::repositories::{
    CourseRepository, SemesterRepository, SqlxCourseRepository, SqlxSemesterRepository,
    SqlxTopicRepository, TopicRepository,
};
use crate::db::{create_test_pool, migrations::run_migrations, DynDatabasePool};
use crate::models::{Course, CreateCourseInput, CreateTopicInput, Semester, Topic};

/// Migrated in-memory pool holding one semester in `section` and one course.
pub async fn seed_course(section: &str) -> (DynDatabasePool, String) {
    let pool = create_test_pool().await.expect("Failed to create test pool");
    run_migrations(&pool).await.expect("Failed to run migrations");

    let semester = Semester::new("Spring 2025".into(), section.into());
    SqlxSemesterRepository::new(pool.clone())
        .create(&semester)
        .await
        .expect("Failed to seed semester");

    let course = Course::from_input(CreateCourseInput {
        semester_id: semester.id,
        title: "Data Structures".into(),
        course_code: "CSE201".into(),
        teacher_name: "Dr. Hasan".into(),
        ..Default::default()
    });
    SqlxCourseRepository::new(pool.clone())
        .create(&course)
        .await
        .expect("Failed to seed course");

    (pool, course.id)
}

/// Like [`seed_course`] with one topic under the course.
pub async fn seed_topic(section: &str) -> (DynDatabasePool, String) {
    let (pool, course_id) = seed_course(section).await;

    let topic = Topic::from_input(CreateTopicInput {
        course_id,
        title: "Trees".into(),
        ..Default::default()
    });
    SqlxTopicRepository::new(pool.clone())
        .create(&topic)
        .await
        .expect("Failed to seed topic");

    (pool, topic.id)
}
