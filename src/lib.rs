//! CSE LMS - Course content backend for a computer science department
//!
//! Semesters, courses, topics, slides, videos and study tools, with an admin
//! back office, an all-in-one creator and share links.

pub mod api;
pub mod cache;
pub mod config;
pub mod db;
pub mod models;
pub mod services;
