//! Wikipedia lookup through the MediaWiki API.

use super::Tool;
use crate::config::KnowledgeSettings;
use crate::error::{MathGptError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Longest query forwarded to the search API.
const MAX_QUERY_LENGTH: usize = 300;

const NO_RESULTS: &str = "No good Wikipedia Search Result was found";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    query: Option<SearchQuery>,
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    search: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    title: String,
}

#[derive(Debug, Deserialize)]
struct ExtractResponse {
    query: Option<ExtractQuery>,
}

#[derive(Debug, Deserialize)]
struct ExtractQuery {
    #[serde(default)]
    pages: Vec<Page>,
}

#[derive(Debug, Deserialize)]
struct Page {
    title: String,
    #[serde(default)]
    extract: Option<String>,
    #[serde(default)]
    missing: bool,
}

/// Summarizes the top Wikipedia pages for a query.
pub struct WikipediaTool {
    client: reqwest::Client,
    endpoint: url::Url,
    top_k_results: usize,
    max_chars: usize,
}

impl WikipediaTool {
    pub fn new(settings: &KnowledgeSettings) -> Result<Self> {
        let endpoint = settings.endpoint();
        let endpoint = url::Url::parse(&endpoint).map_err(|e| {
            MathGptError::Config(format!("Invalid knowledge API url '{}': {}", endpoint, e))
        })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .user_agent(concat!("mathgpt/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| MathGptError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint,
            top_k_results: settings.top_k_results,
            max_chars: settings.max_chars,
        })
    }

    async fn search_titles(&self, query: &str) -> Result<Vec<String>> {
        let limit = self.top_k_results.to_string();
        let response: SearchResponse = self
            .client
            .get(self.endpoint.clone())
            .query(&[
                ("action", "query"),
                ("list", "search"),
                ("srsearch", query),
                ("srlimit", limit.as_str()),
                ("format", "json"),
                ("formatversion", "2"),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(response
            .query
            .map(|q| q.search.into_iter().map(|hit| hit.title).collect())
            .unwrap_or_default())
    }

    async fn fetch_summary(&self, title: &str) -> Result<Option<(String, String)>> {
        let response: ExtractResponse = self
            .client
            .get(self.endpoint.clone())
            .query(&[
                ("action", "query"),
                ("prop", "extracts"),
                ("exintro", "1"),
                ("explaintext", "1"),
                ("redirects", "1"),
                ("titles", title),
                ("format", "json"),
                ("formatversion", "2"),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let page = response
            .query
            .and_then(|q| q.pages.into_iter().next())
            .filter(|p| !p.missing);

        Ok(page.and_then(|p| {
            let extract = p.extract.unwrap_or_default();
            let extract = extract.trim();
            if extract.is_empty() {
                None
            } else {
                Some((p.title, extract.to_string()))
            }
        }))
    }
}

/// Join page summaries and cut the result to `max_chars` characters.
fn format_summaries(pages: &[(String, String)], max_chars: usize) -> String {
    if pages.is_empty() {
        return NO_RESULTS.to_string();
    }

    pages
        .iter()
        .map(|(title, summary)| format!("Page: {}\nSummary: {}", title, summary))
        .collect::<Vec<_>>()
        .join("\n\n")
        .chars()
        .take(max_chars)
        .collect()
}

#[async_trait]
impl Tool for WikipediaTool {
    fn name(&self) -> &str {
        "Wikipedia"
    }

    fn description(&self) -> &str {
        "Search the Internet for relevant information."
    }

    #[instrument(skip(self), fields(tool = "Wikipedia"))]
    async fn invoke(&self, query: &str) -> Result<String> {
        let query: String = query.chars().take(MAX_QUERY_LENGTH).collect();
        info!("Looking up '{}' on Wikipedia", query);

        let titles = self
            .search_titles(&query)
            .await
            .map_err(|e| MathGptError::Knowledge(format!("search for '{}' failed: {}", query, e)))?;
        debug!("Search returned {} titles", titles.len());

        let mut pages = Vec::new();
        for title in titles.iter().take(self.top_k_results) {
            match self.fetch_summary(title).await {
                Ok(Some(page)) => pages.push(page),
                Ok(None) => debug!("No summary for '{}'", title),
                Err(e) => warn!("Skipping '{}': {}", title, e),
            }
        }

        Ok(format_summaries(&pages, self.max_chars))
    }
}
