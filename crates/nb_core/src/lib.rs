pub mod bullets;
pub mod dates;
pub mod error;
pub mod http;
pub mod models;
pub mod news;
pub mod storage;
pub mod types;

pub use bullets::BulletMap;
pub use dates::DateRange;
pub use error::{Error, Result};
pub use http::ApiClient;
pub use models::SummaryModel;
pub use news::NewsSource;
pub use storage::BriefingStore;
pub use types::{
    group_by_topic, Article, BriefingConfig, BriefingHistory, Frequency, HistorySummary,
    NewsSearch, ParsedSummary, SearchQuery, Topic, TopicArticles,
};
