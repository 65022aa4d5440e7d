//! HTTP client used by the web research tools.

use super::html::{truncate_chars, HtmlExtractor, Link};
use super::search::{InstantAnswer, SearchResult, DUCKDUCKGO_API};
use crate::config::WebSettings;
use crate::error::{ParleyError, Result};
use reqwest::StatusCode;
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

/// A fetched and extracted web page.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub url: String,
    pub status_code: u16,
    pub title: String,
    pub description: String,
    pub content: String,
    pub links: Vec<Link>,
}

/// Shared HTTP session: one connection pool, one User-Agent, fixed timeouts.
pub struct WebClient {
    http: reqwest::Client,
    extractor: HtmlExtractor,
    settings: WebSettings,
    search_endpoint: String,
}

impl WebClient {
    /// Create a client from web settings.
    pub fn new(settings: &WebSettings) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(settings.user_agent.clone())
            .timeout(Duration::from_secs(settings.fetch_timeout_seconds))
            .build()?;

        Ok(Self {
            http,
            extractor: HtmlExtractor::new(),
            settings: settings.clone(),
            search_endpoint: DUCKDUCKGO_API.to_string(),
        })
    }

    /// Point searches at a different Instant Answer compatible endpoint.
    pub fn with_search_endpoint(mut self, endpoint: &str) -> Self {
        self.search_endpoint = endpoint.to_string();
        self
    }

    /// GET a page and extract its readable content.
    #[instrument(skip(self))]
    pub async fn fetch_page(&self, url: &str) -> Result<FetchedPage> {
        let response = self.http.get(url).send().await?.error_for_status()?;
        let status_code = response.status().as_u16();
        let body = response.text().await?;
        debug!("Fetched {} bytes from {}", body.len(), url);

        let summary = self.extractor.extract(&body, self.settings.max_links);

        Ok(FetchedPage {
            url: url.to_string(),
            status_code,
            title: summary.title.unwrap_or_else(|| "No title".to_string()),
            description: summary.description,
            content: truncate_chars(&summary.text, self.settings.max_content_chars),
            links: summary.links,
        })
    }

    /// Query the Instant Answer API.
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str, num_results: usize) -> Result<Vec<SearchResult>> {
        let url = Url::parse_with_params(
            &self.search_endpoint,
            &[
                ("q", query),
                ("format", "json"),
                ("no_html", "1"),
                ("skip_disambig", "1"),
            ],
        )
        .map_err(|e| ParleyError::InvalidInput(format!("Invalid search endpoint: {}", e)))?;

        let answer: InstantAnswer = self
            .http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(answer.into_results(num_results))
    }

    /// HEAD a URL with the short probe timeout; true only for a 200 answer.
    pub async fn probe(&self, url: &Url) -> bool {
        let result = self
            .http
            .head(url.clone())
            .timeout(Duration::from_secs(self.settings.probe_timeout_seconds))
            .send()
            .await;

        match result {
            Ok(response) => response.status() == StatusCode::OK,
            Err(e) => {
                debug!("Probe of {} failed: {}", url, e);
                false
            }
        }
    }
}
