use std::fmt;

use nb_core::{Article, Result, SummaryModel};

use crate::parser::ALL_ARTICLES_MARKER;

/// Offline model that answers in the batch convention using article titles.
pub struct DummyModel;

impl fmt::Debug for DummyModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DummyModel").finish()
    }
}

impl DummyModel {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DummyModel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl SummaryModel for DummyModel {
    fn name(&self) -> &str {
        "Dummy"
    }

    async fn summarize_all(&self, articles: &[Article]) -> Result<String> {
        let mut text = String::new();
        for (i, article) in articles.iter().enumerate() {
            text.push_str(&format!("Article {}:\n- {}\n\n", i + 1, article.title));
        }
        text.push_str(ALL_ARTICLES_MARKER);
        text.push('\n');
        text.push_str(&format!("- {} articles reviewed\n", articles.len()));
        Ok(text)
    }

    async fn summarize_article(&self, url: &str) -> Result<String> {
        Ok(format!("Summary unavailable offline for {}", url))
    }

    async fn summarize_topic(&self, topic: &str, bullets: &[String]) -> Result<String> {
        // first 20 words of the joined bullets
        let text = bullets.join(" ");
        let words: Vec<&str> = text.split_whitespace().take(20).collect();
        Ok(format!("{}: {}", topic, words.join(" ")))
    }
}
