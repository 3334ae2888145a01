use std::fmt;
use std::sync::Arc;

use futures::future::join_all;
use nb_core::{ParsedSummary, SummaryModel};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Separator used when a topic's bullets stand in for its synthesized text.
pub const BULLET_SEPARATOR: &str = "\n• ";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicSection {
    pub topic: String,
    pub body: String,
    /// False when `body` is the joined bullets because the model call failed
    /// or came back empty.
    pub synthesized: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BriefingReport {
    pub sections: Vec<TopicSection>,
}

impl BriefingReport {
    /// `"{topic}:\n{body}\n\n"` per section, trimmed.
    pub fn text(&self) -> String {
        let mut report = String::new();
        for section in &self.sections {
            report.push_str(&format!("{}:\n{}\n\n", section.topic, section.body));
        }
        report.trim().to_string()
    }

    pub fn section(&self, topic: &str) -> Option<&TopicSection> {
        self.sections.iter().find(|section| section.topic == topic)
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

/// Re-summarizes each topic's lead bullets into a paragraph.
pub struct TopicAggregator {
    model: Arc<dyn SummaryModel>,
}

impl fmt::Debug for TopicAggregator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TopicAggregator")
            .field("model", &self.model.name())
            .finish()
    }
}

impl TopicAggregator {
    pub fn new(model: Arc<dyn SummaryModel>) -> Self {
        Self { model }
    }

    /// Runs one model call per topic that has bullets, all concurrently.
    /// Sections keep the topic order of `parsed`. A failed call never fails
    /// the report; that topic falls back to its bullets.
    pub async fn synthesize(&self, parsed: &ParsedSummary) -> BriefingReport {
        let topics: Vec<(&str, &[String])> = parsed
            .topic_summaries
            .iter()
            .filter(|(_, bullets)| !bullets.is_empty())
            .collect();

        info!("🧠 Synthesizing {} topic summaries with {}", topics.len(), self.model.name());

        let calls = topics.iter().map(|(topic, bullets)| async move {
            let fallback = || bullets.join(BULLET_SEPARATOR);
            match self.model.summarize_topic(topic, bullets).await {
                Ok(body) if !body.trim().is_empty() => TopicSection {
                    topic: topic.to_string(),
                    body,
                    synthesized: true,
                },
                Ok(_) => {
                    warn!("⚠️ Empty synthesis for topic {}, using bullets", topic);
                    TopicSection { topic: topic.to_string(), body: fallback(), synthesized: false }
                }
                Err(e) => {
                    warn!("⚠️ Failed to synthesize topic {}: {}", topic, e);
                    TopicSection { topic: topic.to_string(), body: fallback(), synthesized: false }
                }
            }
        });

        BriefingReport { sections: join_all(calls).await }
    }
}
