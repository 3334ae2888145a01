use std::time::Duration;

use nb_core::http::{DEFAULT_API_URL, DEFAULT_TIMEOUT};

pub mod aggregate;
pub mod models;
pub mod parser;

#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub model_name: Option<String>,
    pub timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            model_name: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

pub mod prelude {
    pub use super::aggregate::{BriefingReport, TopicAggregator, TopicSection};
    pub use super::models::create_model;
    pub use super::parser::{parse_summary, Layout, SummaryParser};
    pub use super::Config;
    pub use nb_core::{Article, Error, ParsedSummary, Result, SummaryModel};
}

pub use aggregate::{BriefingReport, TopicAggregator, TopicSection, BULLET_SEPARATOR};
pub use models::create_model;
pub use parser::{parse_summary, Layout, SummaryParser};

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::prelude::*;

    #[tokio::test]
    async fn test_inference_pipeline() {
        let config = Config { model_name: Some("dummy".to_string()), ..Config::default() };
        let model = create_model(Some(config)).await.unwrap();
        let articles = vec![
            Article::new("Rates hold", "https://a").with_topic("Finance"),
            Article::new("Flu falls", "https://b").with_topic("Health"),
        ];

        let raw = model.summarize_all(&articles).await.unwrap();
        let parsed = parse_summary(&raw, &articles);
        let report = TopicAggregator::new(Arc::clone(&model)).synthesize(&parsed).await;
        assert_eq!(report.text(), "Finance:\nFinance: Rates hold\n\nHealth:\nHealth: Flu falls");
    }
}
