//! Handlers for the four operations.
//!
//! Each handler receives already-validated params and returns the success
//! payload; errors are turned into failure results by `SessionAgent::call`.

use std::sync::Arc;

use forumlink_core::ForumError;
use serde_json::{Value, json};
use tracing::debug;

use crate::agent::SessionAgent;
use crate::cache::CacheLookup;
use crate::projector::{
    RECENT_POST_EXCERPT_LEN, SEARCH_EXCERPT_LEN, project_latest_posts, project_search_results,
    project_topic_detail, project_topic_list,
};
use crate::registry::ParamValues;

/// Params are validated before handlers run, so a missing one is a bug in
/// the operation table rather than bad input.
fn int_param(params: &ParamValues, name: &str) -> Result<usize, ForumError> {
    params
        .int(name)
        .and_then(|v| usize::try_from(v).ok())
        .ok_or_else(|| ForumError::validation(name, "missing after validation"))
}

fn bool_param(params: &ParamValues, name: &str) -> Result<bool, ForumError> {
    params
        .bool(name)
        .ok_or_else(|| ForumError::validation(name, "missing after validation"))
}

impl SessionAgent {
    pub(crate) async fn get_latest_topics(&mut self, params: &ParamValues) -> Result<Value, ForumError> {
        let per_page = int_param(params, "per_page")?;
        let use_cache = bool_param(params, "use_cache")?;
        let order = params.str("order");

        match self.state().cache().get(use_cache, self.now()) {
            CacheLookup::Hit(topics) => {
                debug!(session_id = %self.session_id(), "Latest topics served from cache");
                return Ok(json!({
                    "cached": true,
                    "topics": &*topics,
                    "count": topics.len(),
                    "request_count": self.state().request_count(),
                }));
            }
            CacheLookup::Miss(reason) => {
                debug!(session_id = %self.session_id(), ?reason, "Latest topics cache miss");
            }
        }

        let mut path = format!("/latest.json?per_page={per_page}");
        if let Some(order) = order {
            path.push_str("&order=");
            path.push_str(&urlencoding::encode(order));
        }
        let raw = self.fetch(&path).await?;

        let mut topics = project_topic_list(&raw);
        topics.truncate(per_page);
        let topics = Arc::new(topics);

        let now = self.now();
        let ttl = self.cache_ttl();
        self.state_mut().cache_mut().store(topics.clone(), now, ttl);

        Ok(json!({
            "cached": false,
            "topics": &*topics,
            "count": topics.len(),
            "request_count": self.state().request_count(),
        }))
    }

    pub(crate) async fn search_posts(&mut self, params: &ParamValues) -> Result<Value, ForumError> {
        let max_results = int_param(params, "max_results")?;
        let query = params.str("query").unwrap_or_default().trim().to_string();

        // Browsing reports the fetched page size as the total.
        let (mode, mut posts) = if query.is_empty() {
            let raw = self.fetch("/posts.json").await?;
            ("recent", project_latest_posts(&raw, self.base_url(), RECENT_POST_EXCERPT_LEN))
        } else {
            let path = format!("/search.json?q={}", urlencoding::encode(&query));
            let raw = self.fetch(&path).await?;
            ("search", project_search_results(&raw, self.base_url(), SEARCH_EXCERPT_LEN))
        };

        let total_results = posts.len();
        posts.truncate(max_results);

        Ok(json!({
            "query": query,
            "mode": mode,
            "total_results": total_results,
            "shown_results": posts.len(),
            "posts": posts,
            "request_count": self.state().request_count(),
        }))
    }

    pub(crate) async fn get_topic(&mut self, params: &ParamValues) -> Result<Value, ForumError> {
        let id = params
            .str("id")
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ForumError::validation("id", "is required"))?
            .to_string();
        let include_posts = bool_param(params, "include_posts")?;

        let raw = self.fetch(&format!("/t/{}.json", urlencoding::encode(&id))).await?;
        let topic = project_topic_detail(&raw, include_posts);

        let mut data = serde_json::to_value(&topic)
            .map_err(|e| ForumError::Projection(format!("topic {id}: {e}")))?;
        if let Value::Object(map) = &mut data {
            map.insert("request_count".into(), json!(self.state().request_count()));
        }
        Ok(data)
    }

    pub(crate) async fn get_recent_posts(&mut self, params: &ParamValues) -> Result<Value, ForumError> {
        let limit = int_param(params, "limit")?;
        let before = params.str("before").map(str::trim).filter(|b| !b.is_empty());

        let path = match before {
            Some(before) => format!("/posts.json?before={}", urlencoding::encode(before)),
            None => "/posts.json".to_string(),
        };
        let before = before.map(str::to_string);
        let raw = self.fetch(&path).await?;

        let mut posts = project_latest_posts(&raw, self.base_url(), RECENT_POST_EXCERPT_LEN);
        posts.truncate(limit);

        Ok(json!({
            "posts": posts,
            "count": posts.len(),
            "before": before,
            "request_count": self.state().request_count(),
        }))
    }
}
