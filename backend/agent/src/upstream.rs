//! Authenticated client for the forum's JSON API.
//!
//! [`UpstreamClient`] owns URL building, the fixed auth headers and status
//! normalization. The HTTP exchange itself goes through [`HttpTransport`] so
//! the client can run against reqwest in production and a scripted transport
//! in tests.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use forumlink_config::ForumSettings;
use forumlink_core::ForumError;
use reqwest::Method;
use serde_json::Value;
use tracing::debug;

pub const HEADER_API_KEY: &str = "Api-Key";
pub const HEADER_API_USERNAME: &str = "Api-Username";
pub const HEADER_CONTENT_TYPE: &str = "Content-Type";

/// Caller-supplied overrides for one upstream call.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    /// Same-named (case-insensitive) entries replace the default headers.
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            headers: Vec::new(),
            body: None,
        }
    }
}

/// A fully built request, ready for the wire.
#[derive(Debug, Clone)]
pub struct UpstreamRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl UpstreamRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Raw response; the body is not parsed yet.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: u16,
    pub status_text: String,
    pub body: String,
}

impl UpstreamResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Executes one HTTP exchange. Transport failures (timeouts, refused
/// connections) must come back as [`ForumError::Upstream`].
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn execute(&self, request: UpstreamRequest) -> Result<UpstreamResponse, ForumError>;
}

/// Production transport backed by a shared `reqwest::Client`.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self, ForumError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("ForumLink/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ForumError::Configuration(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(&self, request: UpstreamRequest) -> Result<UpstreamResponse, ForumError> {
        let mut builder = self.client.request(request.method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.to_string());
        }

        let resp = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                ForumError::upstream(504, "Gateway Timeout")
            } else {
                ForumError::upstream(502, format!("Bad Gateway: {e}"))
            }
        })?;

        let status = resp.status();
        let status_text = status.canonical_reason().unwrap_or("").to_string();
        let body = resp
            .text()
            .await
            .map_err(|e| ForumError::upstream(502, format!("Bad Gateway: {e}")))?;

        Ok(UpstreamResponse {
            status: status.as_u16(),
            status_text,
            body,
        })
    }
}

/// Builds authenticated requests against the configured forum.
#[derive(Clone)]
pub struct UpstreamClient {
    base_url: String,
    api_key: String,
    api_username: String,
    transport: Arc<dyn HttpTransport>,
}

impl UpstreamClient {
    pub fn new(settings: &ForumSettings, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
            api_username: settings.api_username.clone(),
            transport,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build the request for `path` without sending it.
    pub fn build_request(&self, path: &str, options: RequestOptions) -> UpstreamRequest {
        let url = if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        };

        let mut headers = vec![
            (HEADER_API_KEY.to_string(), self.api_key.clone()),
            (HEADER_API_USERNAME.to_string(), self.api_username.clone()),
            (HEADER_CONTENT_TYPE.to_string(), "application/json".to_string()),
        ];
        for (name, value) in options.headers {
            match headers.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(&name)) {
                Some(slot) => slot.1 = value,
                None => headers.push((name, value)),
            }
        }

        UpstreamRequest {
            method: options.method,
            url,
            headers,
            body: options.body,
        }
    }

    /// Issue one call and return the parsed JSON body.
    ///
    /// Does not touch session counters; the agent records the attempt first.
    pub async fn call(
        &self,
        path: &str,
        options: Option<RequestOptions>,
    ) -> Result<Value, ForumError> {
        let request = self.build_request(path, options.unwrap_or_default());
        let method = request.method.clone();
        let response = self.transport.execute(request).await?;
        debug!(%method, path, status = response.status, "Upstream call completed");

        if !response.is_success() {
            return Err(ForumError::upstream(response.status, response.status_text));
        }
        if response.body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&response.body)
            .map_err(|e| ForumError::Projection(format!("response from {path} is not JSON: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedTransport;
    use serde_json::json;

    fn client(transport: Arc<ScriptedTransport>) -> UpstreamClient {
        let settings = ForumSettings::new("https://forum.example.com/", "key-1", "system");
        UpstreamClient::new(&settings, transport)
    }

    #[tokio::test]
    async fn prepends_base_url_and_attaches_auth_headers() {
        let transport = ScriptedTransport::new();
        transport.push_json(200, json!({"ok": true}));
        let body = client(transport.clone()).call("/latest.json", None).await.unwrap();

        assert_eq!(body["ok"], true);
        let sent = transport.requests();
        assert_eq!(sent[0].url, "https://forum.example.com/latest.json");
        assert_eq!(sent[0].header("api-key"), Some("key-1"));
        assert_eq!(sent[0].header("Api-Username"), Some("system"));
        assert_eq!(sent[0].header("Content-Type"), Some("application/json"));
    }

    #[test]
    fn caller_headers_replace_same_name_defaults_only() {
        let transport = ScriptedTransport::new();
        let options = RequestOptions {
            headers: vec![
                ("api-username".into(), "moderator".into()),
                ("X-Trace".into(), "abc".into()),
            ],
            ..Default::default()
        };
        let req = client(transport).build_request("t/1.json", options);

        assert_eq!(req.url, "https://forum.example.com/t/1.json");
        assert_eq!(req.header("Api-Username"), Some("moderator"));
        assert_eq!(req.header("Api-Key"), Some("key-1"));
        assert_eq!(req.header("x-trace"), Some("abc"));
        assert_eq!(req.headers.len(), 4);
    }

    #[tokio::test]
    async fn non_success_becomes_upstream_error() {
        let transport = ScriptedTransport::new();
        transport.push_status(404, "Not Found");
        let err = client(transport).call("/t/9.json", None).await.unwrap_err();
        match err {
            ForumError::Upstream { status, status_text } => {
                assert_eq!(status, 404);
                assert_eq!(status_text, "Not Found");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[tokio::test]
    async fn unparsable_success_body_is_projection_error() {
        let transport = ScriptedTransport::new();
        transport.push_raw(200, "OK", "<html>maintenance</html>");
        let err = client(transport).call("/latest.json", None).await.unwrap_err();
        assert!(matches!(err, ForumError::Projection(_)));
    }
}
