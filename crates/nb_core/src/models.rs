use std::fmt;

use async_trait::async_trait;

use crate::types::Article;
use crate::Result;

/// A summarization backend speaking the line-oriented briefing convention.
#[async_trait]
pub trait SummaryModel: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    /// Summarize a batch of articles. The returned text carries one
    /// `Article N:` block per input article, in input order, followed by an
    /// `All Articles Summary:` block.
    async fn summarize_all(&self, articles: &[Article]) -> Result<String>;

    /// Summarize a single article by URL.
    async fn summarize_article(&self, url: &str) -> Result<String>;

    /// Condense one topic's bullets into a short synthesized paragraph.
    async fn summarize_topic(&self, topic: &str, bullets: &[String]) -> Result<String>;
}
