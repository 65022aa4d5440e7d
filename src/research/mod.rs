//! Web research tools: page fetching, web search, and competitor site analysis.

mod client;
mod html;
mod search;

pub use client::{FetchedPage, WebClient};
pub use html::{HtmlExtractor, Link, PageSummary};
pub use search::{InstantAnswer, SearchResult, DUCKDUCKGO_API};

use crate::agent::{decode_arguments, Resolved, ToolKit, ToolOutcome, ToolSchema};
use crate::config::WebSettings;
use crate::error::{ParleyError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;
use url::Url;

pub const FETCH_WEBPAGE: &str = "fetch_webpage";
pub const SEARCH_WEB: &str = "search_web";
pub const ANALYZE_COMPETITOR: &str = "analyze_competitor";

/// Paths probed on a competitor's site.
pub const COMMON_PATHS: [&str; 5] = ["/about", "/services", "/products", "/contact", "/pricing"];

/// Keyword found in page text, and the technology it indicates.
pub const TECH_KEYWORDS: [(&str, &str); 7] = [
    ("react", "React.js"),
    ("angular", "Angular"),
    ("vue", "Vue.js"),
    ("wordpress", "WordPress"),
    ("shopify", "Shopify"),
    ("woocommerce", "WooCommerce"),
    ("bootstrap", "Bootstrap"),
];

/// Tools available to the web research agent.
#[derive(Debug, Clone, PartialEq)]
pub enum ResearchTool {
    FetchWebpage(FetchArgs),
    SearchWeb(SearchArgs),
    AnalyzeCompetitor(CompetitorArgs),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FetchArgs {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SearchArgs {
    pub query: String,
    #[serde(default = "default_num_results")]
    pub num_results: usize,
}

fn default_num_results() -> usize {
    5
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CompetitorArgs {
    pub domain: String,
}

/// Toolkit owning the HTTP session for the lifetime of the agent.
pub struct ResearchToolKit {
    client: WebClient,
}

impl ResearchToolKit {
    pub fn new(client: WebClient) -> Self {
        Self { client }
    }

    pub fn from_settings(settings: &WebSettings) -> Result<Self> {
        Ok(Self::new(WebClient::new(settings)?))
    }

    /// Fetch and summarize a page.
    pub async fn fetch_webpage(&self, url: &str) -> ToolOutcome {
        let result = self.client.fetch_page(url).await.map(|page| {
            json!({
                "url": page.url,
                "title": page.title,
                "description": page.description,
                "content": page.content,
                "links": page.links,
                "status_code": page.status_code,
            })
        });
        ToolOutcome::from_result(result).with_context("url", url)
    }

    /// Search the web through the Instant Answer API.
    pub async fn search_web(&self, query: &str, num_results: usize) -> ToolOutcome {
        let result = self.client.search(query, num_results).await.map(|results| {
            json!({
                "query": query,
                "total_results": results.len(),
                "results": results,
            })
        });
        ToolOutcome::from_result(result).with_context("query", query)
    }

    /// Analyze a competitor's site: main page metadata, common pages, technology hints.
    pub async fn analyze_competitor(&self, domain: &str) -> ToolOutcome {
        let url = normalize_domain(domain);

        let page = match self.client.fetch_page(&url).await {
            Ok(page) => page,
            Err(e) => {
                return ToolOutcome::from_result(Err(e)).with_context("url", url.as_str());
            }
        };

        let candidates = match candidate_pages(&url) {
            Ok(candidates) => candidates,
            Err(e) => return ToolOutcome::from_result(Err(e)).with_context("domain", domain),
        };

        let mut pages_found = Vec::new();
        for (path, candidate) in candidates {
            if self.client.probe(&candidate).await {
                pages_found.push(json!({
                    "path": path,
                    "url": candidate.as_str(),
                    "status": "found",
                }));
            }
        }
        debug!("Found {} common page(s) on {}", pages_found.len(), url);

        ToolOutcome::success(json!({
            "domain": domain,
            "main_page": {
                "title": page.title,
                "description": page.description,
            },
            "pages_found": pages_found,
            "technology_indicators": detect_technologies(&page.content),
            "total_links": page.links.len(),
            "analysis_timestamp": chrono::Utc::now().timestamp_millis() as f64 / 1000.0,
        }))
    }
}

/// Turn a bare domain into a URL; inputs already starting with `http` pass through.
pub fn normalize_domain(domain: &str) -> String {
    let domain = domain.trim();
    if domain.starts_with("http") {
        domain.to_string()
    } else {
        format!("https://{}", domain)
    }
}

/// Resolve each common path against the site's URL.
pub fn candidate_pages(base: &str) -> Result<Vec<(&'static str, Url)>> {
    let base = Url::parse(base)
        .map_err(|e| ParleyError::InvalidInput(format!("Invalid URL '{}': {}", base, e)))?;
    COMMON_PATHS
        .iter()
        .map(|path| {
            base.join(path)
                .map(|url| (*path, url))
                .map_err(|e| ParleyError::InvalidInput(format!("Invalid path '{}': {}", path, e)))
        })
        .collect()
}

/// Technologies whose keyword appears in the page text, in keyword-table order.
pub fn detect_technologies(content: &str) -> Vec<&'static str> {
    let lowered = content.to_lowercase();
    TECH_KEYWORDS
        .iter()
        .filter(|(keyword, _)| lowered.contains(keyword))
        .map(|(_, tech)| *tech)
        .collect()
}

#[async_trait]
impl ToolKit for ResearchToolKit {
    type Tool = ResearchTool;

    fn schemas(&self) -> Vec<ToolSchema> {
        tool_definitions()
    }

    fn resolve(&self, name: &str, arguments: &str) -> Result<Resolved<ResearchTool>> {
        let tool = match name {
            FETCH_WEBPAGE => ResearchTool::FetchWebpage(decode_arguments(arguments)?),
            SEARCH_WEB => ResearchTool::SearchWeb(decode_arguments(arguments)?),
            ANALYZE_COMPETITOR => ResearchTool::AnalyzeCompetitor(decode_arguments(arguments)?),
            other => return Ok(Resolved::Unknown(other.to_string())),
        };
        Ok(Resolved::Known(tool))
    }

    async fn invoke(&self, tool: ResearchTool) -> ToolOutcome {
        debug!("Invoking {:?}", tool);
        match tool {
            ResearchTool::FetchWebpage(args) => self.fetch_webpage(&args.url).await,
            ResearchTool::SearchWeb(args) => self.search_web(&args.query, args.num_results).await,
            ResearchTool::AnalyzeCompetitor(args) => self.analyze_competitor(&args.domain).await,
        }
    }
}

/// Schemas for the web research tools.
pub fn tool_definitions() -> Vec<ToolSchema> {
    vec![
        ToolSchema::new(
            FETCH_WEBPAGE,
            "Fetch and analyze content from a specific webpage",
            json!({
                "type": "object",
                "properties": {
                    "url": {
                        "type": "string",
                        "description": "URL of the webpage to fetch"
                    }
                },
                "required": ["url"]
            }),
        ),
        ToolSchema::new(
            SEARCH_WEB,
            "Search the web for information on a topic",
            json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "Search query"
                    },
                    "num_results": {
                        "type": "integer",
                        "description": "Number of results to return",
                        "default": 5
                    }
                },
                "required": ["query"]
            }),
        ),
        ToolSchema::new(
            ANALYZE_COMPETITOR,
            "Analyze competitor website structure and technology",
            json!({
                "type": "object",
                "properties": {
                    "domain": {
                        "type": "string",
                        "description": "Domain name to analyze (e.g., example.com)"
                    }
                },
                "required": ["domain"]
            }),
        ),
    ]
}
