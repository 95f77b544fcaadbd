//! Web access tools: search and read pages.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::html::{extract_page, truncate_content, MAX_CONTENT_CHARS, NO_TITLE};
use super::{parse_args, Tool, ToolError};

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Page fetch timeout.
pub const READ_PAGE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Deserialize)]
pub struct WebSearchArgs {
    pub query: String,
}

/// Search results as returned by the search API. Only `queries` is relied on;
/// any other fields are passed through to the model untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SearchResults {
    #[serde(default)]
    queries: Vec<Value>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

/// Search the web through the configured search API.
pub struct WebSearch {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    max_results: u32,
}

impl WebSearch {
    pub fn new(endpoint: &str, api_key: &str, max_results: u32) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.to_string(),
            api_key: api_key.to_string(),
            max_results,
        }
    }
}

#[async_trait]
impl Tool for WebSearch {
    fn name(&self) -> &str {
        "web_search"
    }

    fn description(&self) -> &str {
        "Search the web for current information. Use this when you need up-to-date information about events, facts, or topics that may have changed recently. Returns relevant search results from the internet."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query string. Be specific and use keywords that will return relevant results."
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, args: Value) -> Result<Value, ToolError> {
        let args: WebSearchArgs = parse_args(args)?;
        let query = args.query.trim();
        if query.is_empty() {
            return Err(ToolError::InvalidArguments("query must not be empty".to_string()));
        }

        tracing::info!(query = %query, "web search");

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&json!({
                "keywords": [query],
                "max_results": self.max_results,
            }))
            .send()
            .await
            .map_err(|e| ToolError::Upstream(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ToolError::Upstream(format!(
                "HTTP {}: {}",
                status,
                crate::llm::truncate_body(&body, 300)
            )));
        }

        let results: SearchResults = response
            .json()
            .await
            .map_err(|e| ToolError::Upstream(format!("invalid response body: {}", e)))?;

        serde_json::to_value(results).map_err(|e| ToolError::Upstream(e.to_string()))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReadPageArgs {
    pub url: String,
}

/// Result of reading a page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageContent {
    pub url: String,
    pub title: String,
    pub content: String,
    /// Character count of `content`
    pub length: usize,
}

/// Fetch a page and return its readable text.
pub struct ReadPage {
    client: reqwest::Client,
}

impl ReadPage {
    pub fn new() -> Self {
        Self::with_timeout(READ_PAGE_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        Self { client }
    }

    pub async fn read(&self, url: &str) -> Result<PageContent, ToolError> {
        let parsed = url::Url::parse(url)
            .map_err(|e| ToolError::InvalidArguments(format!("invalid url {:?}: {}", url, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ToolError::InvalidArguments(format!(
                "url must start with http:// or https://, got {:?}",
                url
            )));
        }

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|e| ToolError::Fetch(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ToolError::Fetch(format!("HTTP {}", status)));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_ascii_lowercase())
            .unwrap_or_default();
        if is_binary(&content_type) {
            return Err(ToolError::Parse(format!(
                "unsupported content type: {}",
                content_type
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ToolError::Fetch(e.to_string()))?;

        let (title, text) = if is_markup(&content_type) {
            let page = extract_page(&body);
            (page.title, page.text)
        } else {
            (NO_TITLE.to_string(), body.trim().to_string())
        };
        let content = truncate_content(text, MAX_CONTENT_CHARS);

        Ok(PageContent {
            url: url.to_string(),
            title,
            length: content.chars().count(),
            content,
        })
    }
}

impl Default for ReadPage {
    fn default() -> Self {
        Self::new()
    }
}

const BINARY_PREFIXES: &[&str] = &[
    "image/",
    "audio/",
    "video/",
    "font/",
    "application/octet-stream",
    "application/pdf",
    "application/zip",
];

fn is_binary(content_type: &str) -> bool {
    BINARY_PREFIXES.iter().any(|p| content_type.starts_with(p))
}

/// Bodies without a content type are treated as HTML.
fn is_markup(content_type: &str) -> bool {
    content_type.is_empty() || content_type.contains("html") || content_type.contains("xml")
}

#[async_trait]
impl Tool for ReadPage {
    fn name(&self) -> &str {
        "read_page"
    }

    fn description(&self) -> &str {
        "Fetch and read the content of a specific web page. Use this when you have a URL and need to extract detailed information from that page. Returns the page title and main text content with scripts, styles, and navigation removed."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "url": {
                    "type": "string",
                    "description": "The full URL of the web page to read (must include http:// or https://)"
                }
            },
            "required": ["url"]
        })
    }

    async fn execute(&self, args: Value) -> Result<Value, ToolError> {
        let args: ReadPageArgs = parse_args(args)?;
        tracing::info!(url = %args.url, "read page");
        let page = self.read(args.url.trim()).await?;
        tracing::debug!(
            title = %page.title,
            length = page.length,
            "read page finished"
        );
        serde_json::to_value(page).map_err(|e| ToolError::Parse(e.to_string()))
    }
}
