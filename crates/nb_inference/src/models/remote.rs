use std::fmt;

use async_trait::async_trait;
use nb_core::{ApiClient, Article, Result, SummaryModel};
use serde::{Deserialize, Serialize};

use crate::Config;

#[derive(Serialize)]
struct SummarizeAllRequest<'a> {
    articles: &'a [Article],
}

#[derive(Serialize)]
struct SummarizeArticleRequest<'a> {
    url: &'a str,
}

#[derive(Serialize)]
struct SummarizeTopicRequest<'a> {
    topic: &'a str,
    #[serde(rename = "bulletPoints")]
    bullet_points: &'a [String],
}

#[derive(Deserialize)]
struct SummaryResponse {
    #[serde(default)]
    summary: String,
}

/// Summarization backend reached over the briefing HTTP API.
pub struct RemoteModel {
    client: ApiClient,
    name: String,
}

impl RemoteModel {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            client: ApiClient::new(&config.api_url, config.timeout)?,
            name: config.model_name.clone().unwrap_or_else(|| "Remote".to_string()),
        })
    }

    async fn summary(&self, path: &str, body: &(impl Serialize + Sync)) -> Result<String> {
        let response: SummaryResponse = self.client.post_json(path, body).await?;
        Ok(response.summary)
    }
}

impl fmt::Debug for RemoteModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteModel")
            .field("client", &self.client)
            .field("name", &self.name)
            .finish()
    }
}

#[async_trait]
impl SummaryModel for RemoteModel {
    fn name(&self) -> &str {
        &self.name
    }

    async fn summarize_all(&self, articles: &[Article]) -> Result<String> {
        tracing::debug!("Summarizing {} articles", articles.len());
        self.summary("api/summarize_all", &SummarizeAllRequest { articles }).await
    }

    async fn summarize_article(&self, url: &str) -> Result<String> {
        self.summary("api/summarize", &SummarizeArticleRequest { url }).await
    }

    async fn summarize_topic(&self, topic: &str, bullets: &[String]) -> Result<String> {
        let request = SummarizeTopicRequest { topic, bullet_points: bullets };
        self.summary("api/summarize_topic", &request).await
    }
}
