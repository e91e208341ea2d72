//! Projections from raw forum JSON into the public record shapes.
//!
//! Every function here is pure and total: a missing or mistyped field falls
//! back to zero, an empty string, an empty list or `None`.

use std::collections::HashMap;

use forumlink_core::{Post, Topic, TopicDetail, TopicPost};
use serde_json::Value;

/// Action type id the forum uses for "like" in `actions_summary`.
pub const LIKE_ACTION_TYPE: u64 = 2;

/// Excerpt budget for search hits.
pub const SEARCH_EXCERPT_LEN: usize = 150;
/// Excerpt budget for the recent-posts feed.
pub const RECENT_POST_EXCERPT_LEN: usize = 200;
/// Excerpt budget for posts inside a topic view.
pub const TOPIC_POST_EXCERPT_LEN: usize = 200;
/// Posts included with a single topic.
pub const TOPIC_POST_LIMIT: usize = 5;

const ELLIPSIS: &str = "...";

fn u64_field(v: &Value, key: &str) -> u64 {
    match v.get(key) {
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
            .unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

fn opt_u64_field(v: &Value, key: &str) -> Option<u64> {
    v.get(key).and_then(Value::as_u64)
}

fn str_field(v: &Value, key: &str) -> String {
    v.get(key).and_then(Value::as_str).unwrap_or_default().to_string()
}

fn opt_str_field(v: &Value, key: &str) -> Option<String> {
    v.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Remove markup, decode the handful of entities the forum emits and
/// collapse whitespace.
pub fn strip_html(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for ch in html.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }

    let decoded = out
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&amp;", "&");

    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Plain-text excerpt of at most `max_chars` characters followed by `...`.
///
/// The ellipsis is appended whenever the source field exists; an absent
/// source yields an empty string.
pub fn excerpt(source: Option<&str>, max_chars: usize) -> String {
    match source {
        Some(raw) => {
            let mut text: String = strip_html(raw).chars().take(max_chars).collect();
            text.push_str(ELLIPSIS);
            text
        }
        None => String::new(),
    }
}

/// Count of "like" actions on a post, 0 when the summary has none.
pub fn like_count(post: &Value) -> u64 {
    post.get("actions_summary")
        .and_then(Value::as_array)
        .and_then(|actions| {
            actions
                .iter()
                .find(|a| a.get("id").and_then(Value::as_u64) == Some(LIKE_ACTION_TYPE))
        })
        .map(|a| u64_field(a, "count"))
        .unwrap_or(0)
}

/// `{base}/t/{slug}/{topic_id}/{post_number}`; the slug segment is dropped when empty.
pub fn post_url(base_url: &str, slug: &str, topic_id: u64, post_number: u64) -> String {
    let base = base_url.trim_end_matches('/');
    if slug.is_empty() {
        format!("{base}/t/{topic_id}/{post_number}")
    } else {
        format!("{base}/t/{slug}/{topic_id}/{post_number}")
    }
}

/// One entry of `topic_list.topics`.
pub fn project_topic(raw: &Value) -> Topic {
    Topic {
        id: u64_field(raw, "id"),
        title: str_field(raw, "title"),
        posts_count: u64_field(raw, "posts_count"),
        views: u64_field(raw, "views"),
        like_count: u64_field(raw, "like_count"),
        created_at: opt_str_field(raw, "created_at"),
        last_posted_at: opt_str_field(raw, "last_posted_at"),
        category_id: opt_u64_field(raw, "category_id"),
        slug: str_field(raw, "slug"),
        excerpt: raw
            .get("excerpt")
            .and_then(Value::as_str)
            .map(strip_html)
            .unwrap_or_default(),
    }
}

/// All topics of a `/latest.json` payload.
pub fn project_topic_list(raw: &Value) -> Vec<Topic> {
    raw.pointer("/topic_list/topics")
        .and_then(Value::as_array)
        .map(|topics| topics.iter().map(project_topic).collect())
        .unwrap_or_default()
}

/// One entry of `/posts.json`'s `latest_posts`; excerpt comes from `cooked`.
pub fn project_latest_post(raw: &Value, base_url: &str, excerpt_len: usize) -> Post {
    let topic_id = u64_field(raw, "topic_id");
    let post_number = u64_field(raw, "post_number");
    let topic_slug = str_field(raw, "topic_slug");
    Post {
        id: u64_field(raw, "id"),
        post_number,
        excerpt: excerpt(raw.get("cooked").and_then(Value::as_str), excerpt_len),
        username: str_field(raw, "username"),
        topic_title: str_field(raw, "topic_title"),
        topic_id,
        post_url: post_url(base_url, &topic_slug, topic_id, post_number),
        topic_slug,
        created_at: opt_str_field(raw, "created_at"),
    }
}

/// All posts of a `/posts.json` payload.
pub fn project_latest_posts(raw: &Value, base_url: &str, excerpt_len: usize) -> Vec<Post> {
    raw.get("latest_posts")
        .and_then(Value::as_array)
        .map(|posts| {
            posts
                .iter()
                .map(|p| project_latest_post(p, base_url, excerpt_len))
                .collect()
        })
        .unwrap_or_default()
}

/// Minimal topic info carried alongside search hits.
#[derive(Debug, Clone, Default)]
pub struct SearchTopicRef {
    pub title: String,
    pub slug: String,
}

/// Index the `topics` array of a search payload by topic id.
pub fn search_topic_index(raw: &Value) -> HashMap<u64, SearchTopicRef> {
    raw.get("topics")
        .and_then(Value::as_array)
        .map(|topics| {
            topics
                .iter()
                .map(|t| {
                    (
                        u64_field(t, "id"),
                        SearchTopicRef {
                            title: str_field(t, "title"),
                            slug: str_field(t, "slug"),
                        },
                    )
                })
                .collect()
        })
        .unwrap_or_default()
}

/// One search hit. The excerpt prefers `blurb` and falls back to `cooked`.
pub fn project_search_post(
    raw: &Value,
    topics: &HashMap<u64, SearchTopicRef>,
    base_url: &str,
    excerpt_len: usize,
) -> Post {
    let topic_id = u64_field(raw, "topic_id");
    let post_number = u64_field(raw, "post_number");
    let topic = topics.get(&topic_id).cloned().unwrap_or_default();
    let topic_title = opt_str_field(raw, "topic_title").unwrap_or(topic.title);
    let topic_slug = opt_str_field(raw, "topic_slug").unwrap_or(topic.slug);
    let source = raw
        .get("blurb")
        .and_then(Value::as_str)
        .or_else(|| raw.get("cooked").and_then(Value::as_str));

    Post {
        id: u64_field(raw, "id"),
        post_number,
        excerpt: excerpt(source, excerpt_len),
        username: str_field(raw, "username"),
        topic_title,
        topic_id,
        post_url: post_url(base_url, &topic_slug, topic_id, post_number),
        topic_slug,
        created_at: opt_str_field(raw, "created_at"),
    }
}

/// All hits of a `/search.json` payload.
pub fn project_search_results(raw: &Value, base_url: &str, excerpt_len: usize) -> Vec<Post> {
    let topics = search_topic_index(raw);
    raw.get("posts")
        .and_then(Value::as_array)
        .map(|posts| {
            posts
                .iter()
                .map(|p| project_search_post(p, &topics, base_url, excerpt_len))
                .collect()
        })
        .unwrap_or_default()
}

/// Tags may be plain strings or `{name: ...}` objects depending on forum version.
fn project_tags(raw: &Value) -> Vec<String> {
    raw.get("tags")
        .and_then(Value::as_array)
        .map(|tags| {
            tags.iter()
                .filter_map(|t| match t {
                    Value::String(s) => Some(s.clone()),
                    Value::Object(_) => opt_str_field(t, "name"),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default()
}

pub fn project_topic_post(raw: &Value) -> TopicPost {
    TopicPost {
        id: u64_field(raw, "id"),
        post_number: u64_field(raw, "post_number"),
        username: str_field(raw, "username"),
        created_at: opt_str_field(raw, "created_at"),
        excerpt: excerpt(
            raw.get("cooked").and_then(Value::as_str),
            TOPIC_POST_EXCERPT_LEN,
        ),
        like_count: like_count(raw),
    }
}

/// A `/t/{id}.json` payload. Posts come from `post_stream.posts`, capped at
/// [`TOPIC_POST_LIMIT`], and are omitted entirely unless requested.
pub fn project_topic_detail(raw: &Value, include_posts: bool) -> TopicDetail {
    let posts = include_posts.then(|| {
        raw.pointer("/post_stream/posts")
            .and_then(Value::as_array)
            .map(|posts| {
                posts
                    .iter()
                    .take(TOPIC_POST_LIMIT)
                    .map(project_topic_post)
                    .collect()
            })
            .unwrap_or_default()
    });

    TopicDetail {
        id: u64_field(raw, "id"),
        title: str_field(raw, "title"),
        posts_count: u64_field(raw, "posts_count"),
        views: u64_field(raw, "views"),
        like_count: u64_field(raw, "like_count"),
        created_at: opt_str_field(raw, "created_at"),
        last_posted_at: opt_str_field(raw, "last_posted_at"),
        category_id: opt_u64_field(raw, "category_id"),
        slug: str_field(raw, "slug"),
        tags: project_tags(raw),
        posts,
    }
}
