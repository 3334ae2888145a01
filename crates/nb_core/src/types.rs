use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::bullets::BulletMap;
use crate::{Error, Result};

pub const DEFAULT_BRIEFING_NAME: &str = "My Briefing";

pub const SUGGESTED_TOPICS: &[&str] = &[
    "Technology",
    "Business",
    "Politics",
    "Health",
    "Science",
    "Environment",
    "Sports",
    "Entertainment",
    "Education",
    "Finance",
];

/// One item returned by the article search endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Article {
    #[serde(default)]
    pub title: String,
    pub url: String,
    #[serde(rename = "seendate", alias = "date", alias = "publishedAt", default)]
    pub published_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(rename = "socialimage", alias = "image", default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(rename = "sourcecountry", default, skip_serializing_if = "Option::is_none")]
    pub source_country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_mobile: Option<String>,
}

impl Article {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }
}

/// Articles of one topic, in batch order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicArticles {
    pub topic: String,
    pub articles: Vec<Article>,
}

/// Groups articles by their topic tag in order of first appearance.
/// Untagged articles (and empty tags) are left out.
pub fn group_by_topic(articles: &[Article]) -> Vec<TopicArticles> {
    let mut groups: Vec<TopicArticles> = Vec::new();
    for article in articles {
        let Some(topic) = article.topic.as_deref().filter(|t| !t.is_empty()) else {
            continue;
        };
        match groups.iter_mut().find(|g| g.topic == topic) {
            Some(group) => group.articles.push(article.clone()),
            None => groups.push(TopicArticles {
                topic: topic.to_string(),
                articles: vec![article.clone()],
            }),
        }
    }
    groups
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub id: String,
    pub name: String,
    #[serde(rename = "isCustom", default)]
    pub is_custom: bool,
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Frequency::Daily => write!(f, "daily"),
            Frequency::Weekly => write!(f, "weekly"),
            Frequency::Monthly => write!(f, "monthly"),
        }
    }
}

impl FromStr for Frequency {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "daily" => Ok(Frequency::Daily),
            "weekly" => Ok(Frequency::Weekly),
            "monthly" => Ok(Frequency::Monthly),
            other => Err(Error::validation(format!("Unknown frequency: {}", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BriefingConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub user_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub topics: Vec<Topic>,
    #[serde(default)]
    pub frequency: Frequency,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl BriefingConfig {
    pub fn new(user_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: None,
            user_id: user_id.into(),
            name: name.into(),
            description: None,
            topics: Vec::new(),
            frequency: Frequency::default(),
            is_active: false,
            created_at: None,
            updated_at: None,
        }
    }

    /// Appends a topic; blank names are ignored.
    pub fn add_topic(&mut self, name: &str, is_custom: bool) -> Option<&Topic> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        self.topics.push(Topic {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            is_custom,
        });
        self.topics.last()
    }

    pub fn remove_topic(&mut self, topic_id: &str) {
        self.topics.retain(|topic| topic.id != topic_id);
    }

    pub fn topic_names(&self) -> impl Iterator<Item = &str> {
        self.topics.iter().map(|topic| topic.name.as_str())
    }

    /// Checks the rules a config must satisfy before it can be saved and run.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::validation("Please enter a name for your briefing"));
        }
        if self.topics.is_empty() {
            return Err(Error::validation("Please add at least one topic"));
        }
        Ok(())
    }

    /// Key under which generations of this config are serialized.
    pub fn lock_key(&self) -> String {
        match &self.id {
            Some(id) => id.clone(),
            None => format!("{}/{}", self.user_id, self.name),
        }
    }
}

/// Structured form of a batch summarization response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedSummary {
    pub article_bullets: BulletMap,
    pub overall_summary: String,
    #[serde(default)]
    pub overall_bullets: Vec<String>,
    pub topic_summaries: BulletMap,
}

impl ParsedSummary {
    pub fn bullets_for(&self, url: &str) -> &[String] {
        self.article_bullets.get(url).unwrap_or(&[])
    }
}

/// Snapshot stored with a briefing history record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistorySummary {
    pub summary: String,
    #[serde(rename = "articleMap", default)]
    pub article_map: BulletMap,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BriefingHistory {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub user_id: String,
    pub briefing_config_id: String,
    pub articles: Vec<Article>,
    pub summary: HistorySummary,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl BriefingHistory {
    pub fn articles_by_topic(&self) -> Vec<TopicArticles> {
        group_by_topic(&self.articles)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsSearch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub user_id: String,
    pub topic: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub articles: Vec<Article>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overall_summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Request body of the article search endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub topic: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl SearchQuery {
    pub fn new(topic: impl Into<String>, range: crate::dates::DateRange) -> Self {
        Self {
            topic: topic.into(),
            start_date: range.start,
            end_date: range.end,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.topic.trim().is_empty() {
            return Err(Error::validation("Missing topic"));
        }
        crate::dates::DateRange::new(self.start_date, self.end_date).map(|_| ())
    }
}
