//! SAP Help portal adapter.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use super::{LiveAdapter, sanitize};
use crate::types::LiveHit;
use crate::{Error, Result};

const DEFAULT_BASE: &str = "https://help.sap.com";

/// Adapter for help.sap.com full-text search.
pub struct HelpPortalAdapter {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Deserialize)]
struct HelpResponse {
    data: HelpData,
}

#[derive(Deserialize)]
struct HelpData {
    results: Vec<HelpResult>,
}

#[derive(Deserialize)]
struct HelpResult {
    title: String,
    #[serde(default)]
    snippet: String,
    url: String,
}

impl HelpPortalAdapter {
    /// Creates the adapter against the production endpoint.
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

    fn absolute(&self, url: &str) -> String {
        if url.starts_with("http") {
            url.to_string()
        } else {
            format!("{}{url}", self.base_url)
        }
    }
}

#[async_trait]
impl LiveAdapter for HelpPortalAdapter {
    fn name(&self) -> &'static str {
        "sap-help"
    }

    fn id_prefix(&self) -> &'static str {
        "sap-help-"
    }

    fn ttl(&self) -> Duration {
        Duration::from_secs(24 * 60 * 60)
    }

    async fn search(&self, query: &str) -> Result<Vec<LiveHit>> {
        let url = format!("{}/http.svc/elasticsearch", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("area", "content"),
                ("q", query),
                ("state", "PRODUCTION"),
                ("to", "19"),
            ])
            .send()
            .await?;

        let parsed: HelpResponse = response
            .json()
            .await
            .map_err(|e| Error::Parse(format!("help portal response: {e}")))?;

        Ok(parsed
            .data
            .results
            .into_iter()
            .enumerate()
            .map(|(idx, result)| LiveHit {
                id: format!("sap-help-{idx}"),
                title: sanitize::strip_html(&result.title),
                url: self.absolute(&result.url),
                snippet: sanitize::strip_html(&result.snippet),
                source: "sap-help".into(),
            })
            .collect())
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<String>> {
        // Help portal hits are positional within a cached response; the
        // page itself is the document of record, so point the caller there.
        if !id.starts_with(self.id_prefix()) {
            return Ok(None);
        }
        Ok(Some(format!(
            "This result is hosted on the SAP Help portal. Open the URL from the \
             search hit to read the full page.\n\nid: {id}\n"
        )))
    }
}
