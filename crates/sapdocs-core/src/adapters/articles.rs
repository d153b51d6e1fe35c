//! Third-party article site adapter.
//!
//! The article site has no JSON API; results come from its HTML search
//! page. Titles and links are recovered by best-effort tag stripping, and
//! anything that does not look like an article link is dropped.

use std::time::Duration;

use async_trait::async_trait;

use super::{LiveAdapter, sanitize};
use crate::Result;
use crate::types::LiveHit;

const DEFAULT_BASE: &str = "https://blogs.sap.com";

/// Adapter scraping the article site's search page.
pub struct ArticlesAdapter {
    client: reqwest::Client,
    base_url: String,
}

impl ArticlesAdapter {
    /// Creates the adapter against the production site.
    #[must_use]
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            base_url: DEFAULT_BASE.to_string(),
        }
    }

    /// Overrides the endpoint, for tests.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl LiveAdapter for ArticlesAdapter {
    fn name(&self) -> &'static str {
        "articles"
    }

    fn id_prefix(&self) -> &'static str {
        "articles-"
    }

    fn ttl(&self) -> Duration {
        Duration::from_secs(24 * 60 * 60)
    }

    async fn search(&self, query: &str) -> Result<Vec<LiveHit>> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("s", query)])
            .send()
            .await?;
        let body = response.text().await?;
        if sanitize::looks_like_bot_challenge(&body) {
            return Ok(Vec::new());
        }

        let hits = sanitize::extract_links(&body)
            .into_iter()
            .filter(|(href, _)| href.contains("/20") || href.contains("/article"))
            .take(10)
            .enumerate()
            .map(|(idx, (href, text))| LiveHit {
                id: format!("articles-{idx}"),
                title: text,
                url: href,
                snippet: String::new(),
                source: "articles".into(),
            })
            .collect();
        Ok(hits)
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<String>> {
        if !id.starts_with(self.id_prefix()) {
            return Ok(None);
        }
        Ok(Some(
            "This result is an external article. Open the URL from the search hit \
             to read it in full.\n"
                .to_string(),
        ))
    }
}
