//! SAP Community forum adapter.
//!
//! Queries the community LiQL search endpoint. The endpoint sits behind
//! bot protection that sometimes answers with an HTML interstitial; that
//! case degrades to an empty result set and is not retried.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use super::{LiveAdapter, sanitize};
use crate::types::LiveHit;
use crate::{Error, Result};

const DEFAULT_BASE: &str = "https://community.sap.com";

/// Adapter for community.sap.com posts.
pub struct CommunityAdapter {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Deserialize)]
struct LiqlResponse {
    data: LiqlData,
}

#[derive(Deserialize)]
struct LiqlData {
    items: Vec<LiqlItem>,
}

#[derive(Deserialize)]
struct LiqlItem {
    id: String,
    subject: String,
    view_href: String,
    #[serde(default)]
    search_snippet: String,
}

impl CommunityAdapter {
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

    fn liql(query: &str) -> String {
        let escaped = query.replace('\'', " ");
        format!(
            "SELECT id, subject, view_href, search_snippet FROM messages \
             WHERE subject MATCHES '{escaped}' ORDER BY post_time DESC LIMIT 10"
        )
    }
}

#[async_trait]
impl LiveAdapter for CommunityAdapter {
    fn name(&self) -> &'static str {
        "community"
    }

    fn id_prefix(&self) -> &'static str {
        "community-"
    }

    fn ttl(&self) -> Duration {
        // Forum content moves quickly; keep the cache short.
        Duration::from_secs(60 * 60)
    }

    async fn search(&self, query: &str) -> Result<Vec<LiveHit>> {
        let url = format!("{}/api/2.0/search", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("q", Self::liql(query))])
            .send()
            .await?;

        let body = response.text().await?;
        if sanitize::looks_like_bot_challenge(&body) {
            tracing::debug!("community answered with a bot challenge; returning empty");
            return Ok(Vec::new());
        }

        let parsed: LiqlResponse = serde_json::from_str(&body)
            .map_err(|e| Error::Parse(format!("community response: {e}")))?;

        Ok(parsed
            .data
            .items
            .into_iter()
            .map(|item| LiveHit {
                id: format!("community-{}", item.id),
                title: sanitize::strip_html(&item.subject),
                url: item.view_href,
                snippet: sanitize::strip_html(&item.search_snippet),
                source: "community".into(),
            })
            .collect())
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<String>> {
        let Some(message_id) = id.strip_prefix(self.id_prefix()) else {
            return Ok(None);
        };
        let url = format!("{}/api/2.0/messages/{message_id}", self.base_url);
        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Ok(None);
        }
        let body = response.text().await?;
        if sanitize::looks_like_bot_challenge(&body) {
            return Ok(None);
        }

        #[derive(Deserialize)]
        struct MessageResponse {
            data: Message,
        }
        #[derive(Deserialize)]
        struct Message {
            subject: String,
            #[serde(default)]
            body: String,
            #[serde(default)]
            view_href: String,
        }

        let parsed: MessageResponse =
            serde_json::from_str(&body).map_err(|e| Error::Parse(format!("community post: {e}")))?;
        Ok(Some(format!(
            "# {}\n\n{}\n\nSource: {}\n",
            sanitize::strip_html(&parsed.data.subject),
            sanitize::strip_html(&parsed.data.body),
            parsed.data.view_href
        )))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn parses_liql_items() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/2.0/search"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"data":{"items":[{"id":"14039211","subject":"OData &amp; CAP","view_href":"https://community.sap.com/t5/p/14039211","search_snippet":"<b>OData</b> in CAP"}]}}"#,
            ))
            .mount(&server)
            .await;

        let adapter =
            CommunityAdapter::new(reqwest::Client::new()).with_base_url(server.uri());
        let hits = adapter.search("odata").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "community-14039211");
        assert_eq!(hits[0].title, "OData & CAP");
        assert_eq!(hits[0].snippet, "OData in CAP");
    }

    #[tokio::test]
    async fn bot_challenge_degrades_to_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/2.0/search"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("<html>Request unsuccessful. Incapsula incident</html>"),
            )
            .mount(&server)
            .await;

        let adapter =
            CommunityAdapter::new(reqwest::Client::new()).with_base_url(server.uri());
        let hits = adapter.search("odata").await.unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn get_by_id_rejects_foreign_prefixes() {
        let adapter = CommunityAdapter::new(reqwest::Client::new());
        assert!(adapter.get_by_id("sap-help-1").await.unwrap().is_none());
    }
}
