//! ABAP feature matrix adapter.
//!
//! The matrix is a published JSON dataset mapping ABAP language features to
//! their availability on-premise and in SAP BTP ABAP Environment. One fetch
//! per TTL window; lookups run fuzzy matching over the cached rows.

use std::time::Duration;

use async_trait::async_trait;
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;
use serde::Deserialize;

use super::LiveAdapter;
use crate::text::slugify;
use crate::types::LiveHit;
use crate::{Error, Result};

const DEFAULT_BASE: &str = "https://abap-feature-matrix.github.io/data";

/// Adapter over the ABAP feature matrix dataset.
pub struct FeatureMatrixAdapter {
    client: reqwest::Client,
    base_url: String,
}

/// One row of the published matrix.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FeatureRow {
    feature: String,
    #[serde(default)]
    category: String,
    #[serde(default)]
    on_prem: String,
    #[serde(default)]
    cloud: String,
    #[serde(default)]
    url: String,
}

impl FeatureMatrixAdapter {
    /// Creates the adapter against the published dataset.
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

    async fn rows(&self) -> Result<Vec<FeatureRow>> {
        let url = format!("{}/feature-matrix.json", self.base_url);
        let response = self.client.get(&url).send().await?;
        response
            .json()
            .await
            .map_err(|e| Error::Parse(format!("feature matrix dataset: {e}")))
    }

    fn render(row: &FeatureRow) -> String {
        format!(
            "# {}\n\nCategory: {}\nOn-premise: {}\nABAP Cloud: {}\n{}",
            row.feature,
            if row.category.is_empty() { "-" } else { &row.category },
            if row.on_prem.is_empty() { "unknown" } else { &row.on_prem },
            if row.cloud.is_empty() { "unknown" } else { &row.cloud },
            if row.url.is_empty() {
                String::new()
            } else {
                format!("\nSource: {}\n", row.url)
            }
        )
    }
}

#[async_trait]
impl LiveAdapter for FeatureMatrixAdapter {
    fn name(&self) -> &'static str {
        "abap-feature-matrix"
    }

    fn id_prefix(&self) -> &'static str {
        "abap-feature-matrix-"
    }

    fn ttl(&self) -> Duration {
        Duration::from_secs(24 * 60 * 60)
    }

    async fn search(&self, query: &str) -> Result<Vec<LiveHit>> {
        let rows = self.rows().await?;
        let matcher = SkimMatcherV2::default();

        let mut scored: Vec<(i64, FeatureRow)> = rows
            .into_iter()
            .filter_map(|row| {
                let haystack = format!("{} {}", row.feature, row.category);
                matcher
                    .fuzzy_match(&haystack.to_lowercase(), &query.to_lowercase())
                    .map(|score| (score, row))
            })
            .collect();
        scored.sort_by(|a, b| b.0.cmp(&a.0));

        Ok(scored
            .into_iter()
            .take(10)
            .map(|(_, row)| LiveHit {
                id: format!("abap-feature-matrix-{}", slugify(&row.feature)),
                title: row.feature.clone(),
                url: row.url.clone(),
                snippet: format!("On-premise: {} / Cloud: {}", row.on_prem, row.cloud),
                source: "abap-feature-matrix".into(),
            })
            .collect())
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<String>> {
        let Some(slug) = id.strip_prefix(self.id_prefix()) else {
            return Ok(None);
        };
        let rows = self.rows().await?;
        Ok(rows
            .iter()
            .find(|row| slugify(&row.feature) == slug)
            .map(Self::render))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const DATASET: &str = r#"[
        {"feature":"Inline Declarations","category":"Declarations","onPrem":"7.40","cloud":"yes","url":"https://example.com/inline"},
        {"feature":"SELECT ... INTO TABLE","category":"Open SQL","onPrem":"7.0","cloud":"yes","url":""}
    ]"#;

    async fn adapter(server: &MockServer) -> FeatureMatrixAdapter {
        Mock::given(method("GET"))
            .and(path("/feature-matrix.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string(DATASET))
            .mount(server)
            .await;
        FeatureMatrixAdapter::new(reqwest::Client::new()).with_base_url(server.uri())
    }

    #[tokio::test]
    async fn fuzzy_matches_features() {
        let server = MockServer::start().await;
        let adapter = adapter(&server).await;

        let hits = adapter.search("inline decl").await.unwrap();
        assert!(!hits.is_empty());
        assert_eq!(hits[0].id, "abap-feature-matrix-inline-declarations");
        assert!(hits[0].snippet.contains("7.40"));
    }

    #[tokio::test]
    async fn get_by_id_renders_the_row() {
        let server = MockServer::start().await;
        let adapter = adapter(&server).await;

        let body = adapter
            .get_by_id("abap-feature-matrix-inline-declarations")
            .await
            .unwrap()
            .unwrap();
        assert!(body.contains("# Inline Declarations"));
        assert!(body.contains("On-premise: 7.40"));

        assert!(
            adapter
                .get_by_id("abap-feature-matrix-nope")
                .await
                .unwrap()
                .is_none()
        );
    }
}
