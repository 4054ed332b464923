use crate::error::{FetchError, Result, ScanError};
use crate::result::FetchResult;
use crate::visited::VisitedGuard;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Turns an identifier into a page body and its outbound links.
///
/// This is the only boundary the traversal engine talks to; anything that
/// implements it (network client, canned pages, test double) can be crawled.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, id: &str) -> std::result::Result<FetchResult, FetchError>;
}

/// One canned page of a [`FixtureFetcher`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixturePage {
    pub body: String,
    #[serde(default)]
    pub links: Vec<String>,
}

impl FixturePage {
    pub fn new(body: impl Into<String>, links: &[&str]) -> Self {
        Self {
            body: body.into(),
            links: links.iter().map(|l| l.to_string()).collect(),
        }
    }
}

/// Serves pages from memory.
///
/// With [`FixtureFetcher::deduplicating`] the fetcher keeps its own visited
/// set and answers a second request for the same page with
/// [`FetchError::AlreadyVisited`].
#[derive(Debug, Default)]
pub struct FixtureFetcher {
    pages: HashMap<String, FixturePage>,
    served: Option<VisitedGuard>,
}

impl FixtureFetcher {
    pub fn new(pages: HashMap<String, FixturePage>) -> Self {
        Self {
            pages,
            served: None,
        }
    }

    pub fn deduplicating(mut self) -> Self {
        self.served = Some(VisitedGuard::new());
        self
    }

    pub fn with_page(mut self, id: impl Into<String>, page: FixturePage) -> Self {
        self.pages.insert(id.into(), page);
        self
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

#[async_trait]
impl Fetcher for FixtureFetcher {
    async fn fetch(&self, id: &str) -> std::result::Result<FetchResult, FetchError> {
        let page = self
            .pages
            .get(id)
            .ok_or_else(|| FetchError::NotFound(id.to_string()))?;

        if let Some(served) = &self.served
            && !served.try_claim(id)
        {
            return Err(FetchError::AlreadyVisited(id.to_string()));
        }

        Ok(FetchResult::new(page.body.clone(), page.links.clone()))
    }
}

/// Fetches pages over HTTP(S) and pulls links out of HTML bodies.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    link_selector: Selector,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        Self::with_timeout(10)
    }

    pub fn with_timeout(timeout_secs: u64) -> Result<Self> {
        if timeout_secs == 0 {
            return Err(ScanError::Config(
                "timeout must be at least one second".to_string(),
            ));
        }

        let client = Client::builder()
            .user_agent("Skitter/0.1 (https://github.com/trapdoorsec/skitter)")
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(timeout_secs.div_ceil(2)))
            .pool_max_idle_per_host(50)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;

        let link_selector =
            Selector::parse("a[href]").map_err(|e| ScanError::Config(e.to_string()))?;

        Ok(Self {
            client,
            link_selector,
        })
    }

    /// Absolute link targets found in `html`, in document order.
    fn extract_links(&self, html: &str, page_url: &str) -> Vec<String> {
        let document = Html::parse_document(html);
        document
            .select(&self.link_selector)
            .filter_map(|element| element.value().attr("href"))
            .filter_map(|href| resolve_link(page_url, href))
            .collect()
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, id: &str) -> std::result::Result<FetchResult, FetchError> {
        debug!("Fetching {}", id);

        let response = self.client.get(id).send().await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound(id.to_string()));
        }
        if !status.is_success() {
            return Err(FetchError::Transport(format!("HTTP {} from {}", status, id)));
        }

        let is_html = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.contains("text/html"))
            .unwrap_or(false);

        let body = response.text().await?;
        let links = if is_html {
            self.extract_links(&body, id)
        } else {
            Vec::new()
        };

        Ok(FetchResult { body, links })
    }
}

/// Resolves `href` against the page it appeared on. Returns `None` for
/// anchors and non-navigational schemes.
pub fn resolve_link(base: &str, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty()
        || href.starts_with('#')
        || href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
    {
        return None;
    }

    let mut resolved = Url::parse(base).ok()?.join(href).ok()?;
    resolved.set_fragment(None);
    Some(resolved.to_string())
}
