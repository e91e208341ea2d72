//! Projected forum records returned by operations.
//!
//! These are the compact public shapes; raw upstream payloads never leave the
//! agent crate.

use serde::{Deserialize, Serialize};

/// A topic as listed by the "latest topics" endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub id: u64,
    pub title: String,
    pub posts_count: u64,
    pub views: u64,
    pub like_count: u64,
    pub created_at: Option<String>,
    pub last_posted_at: Option<String>,
    pub category_id: Option<u64>,
    pub slug: String,
    pub excerpt: String,
}

/// A post as returned by search or the recent-posts feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: u64,
    pub post_number: u64,
    /// Plain text, HTML stripped, length-bounded.
    pub excerpt: String,
    pub username: String,
    pub topic_title: String,
    pub topic_id: u64,
    pub topic_slug: String,
    pub created_at: Option<String>,
    pub post_url: String,
}

/// A post inside a single-topic view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicPost {
    pub id: u64,
    pub post_number: u64,
    pub username: String,
    pub created_at: Option<String>,
    pub excerpt: String,
    pub like_count: u64,
}

/// A single topic with its summary fields and, optionally, its first posts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicDetail {
    pub id: u64,
    pub title: String,
    pub posts_count: u64,
    pub views: u64,
    pub like_count: u64,
    pub created_at: Option<String>,
    pub last_posted_at: Option<String>,
    pub category_id: Option<u64>,
    pub slug: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Absent (not empty) when posts were not requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub posts: Option<Vec<TopicPost>>,
}
