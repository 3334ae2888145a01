use async_trait::async_trait;
use nb_core::{ApiClient, Article, NewsSource, Result, SearchQuery};
use serde::Deserialize;

use crate::FetchConfig;

#[derive(Deserialize)]
struct NewsResponse {
    #[serde(default)]
    articles: Vec<Article>,
}

/// Article search over the briefing HTTP API (`POST api/news`).
#[derive(Debug, Clone)]
pub struct RemoteNewsSource {
    client: ApiClient,
}

impl RemoteNewsSource {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        Ok(Self {
            client: ApiClient::new(&config.api_url, config.timeout)?,
        })
    }
}

#[async_trait]
impl NewsSource for RemoteNewsSource {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<Article>> {
        let response: NewsResponse = self.client.post_json("api/news", query).await?;
        tracing::debug!("🔍 {} articles for {}", response.articles.len(), query.topic);
        Ok(response.articles)
    }
}
