use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use nb_core::{
    Article, BriefingConfig, BriefingHistory, BriefingStore, DateRange, Error, HistorySummary,
    NewsSearch, NewsSource, ParsedSummary, Result, SearchQuery, SummaryModel,
};
use nb_inference::parser::{Layout, SummaryParser};
use nb_inference::{BriefingReport, TopicAggregator};
use serde::Serialize;
use tokio::sync::Mutex as TokioMutex;
use tracing::info;

use crate::logging::Logger;
use crate::FetchConfig;

pub const BRIEFING_FAILED: &str = "Failed to fetch briefing";
pub const SEARCH_SUMMARY_FAILED: &str = "Failed to summarize all articles.";
pub const ARTICLE_SUMMARY_FAILED: &str = "Failed to summarize.";
pub const NO_SUMMARY: &str = "No summary available.";

/// Outcome of one briefing run.
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedBriefing {
    pub range: DateRange,
    pub articles: Vec<Article>,
    pub parsed: ParsedSummary,
    pub report: BriefingReport,
    /// Stored record, when the run produced articles and the save succeeded.
    pub history: Option<BriefingHistory>,
}

impl GeneratedBriefing {
    fn empty(range: DateRange) -> Self {
        Self {
            range,
            articles: Vec::new(),
            parsed: ParsedSummary::default(),
            report: BriefingReport::default(),
            history: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }

    pub fn summary(&self) -> String {
        self.report.text()
    }
}

/// Drives fetch, summarize, parse, aggregate and persist for briefing
/// configs, plus the ad-hoc search flow.
pub struct BriefingManager {
    storage: Arc<dyn BriefingStore>,
    news: Arc<dyn NewsSource>,
    model: Arc<dyn SummaryModel>,
    config: FetchConfig,
    locks: TokioMutex<HashMap<String, Arc<TokioMutex<()>>>>,
}

impl fmt::Debug for BriefingManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BriefingManager")
            .field("storage", &"<dyn BriefingStore>")
            .field("news", &"<dyn NewsSource>")
            .field("model", &self.model.name())
            .field("config", &self.config)
            .finish()
    }
}

impl BriefingManager {
    pub fn new(
        storage: Arc<dyn BriefingStore>,
        news: Arc<dyn NewsSource>,
        model: Arc<dyn SummaryModel>,
        config: FetchConfig,
    ) -> Self {
        Self {
            storage,
            news,
            model,
            config,
            locks: TokioMutex::new(HashMap::new()),
        }
    }

    pub fn storage(&self) -> &Arc<dyn BriefingStore> {
        &self.storage
    }

    async fn generation_lock(&self, key: &str) -> Arc<TokioMutex<()>> {
        let mut locks = self.locks.lock().await;
        locks.entry(key.to_string()).or_default().clone()
    }

    /// Drops the table entry once no other generation holds or waits on it.
    async fn release_lock(&self, key: &str, lock: Arc<TokioMutex<()>>) {
        let mut locks = self.locks.lock().await;
        drop(lock);
        if locks.get(key).is_some_and(|entry| Arc::strong_count(entry) == 1) {
            locks.remove(key);
        }
    }

    /// Loads a config, treating one owned by another user as missing.
    async fn owned_config(&self, user_id: &str, config_id: &str) -> Result<BriefingConfig> {
        self.storage
            .get_config(config_id)
            .await?
            .filter(|config| config.user_id == user_id)
            .ok_or_else(|| Error::not_found(format!("Briefing config {}", config_id)))
    }

    /// Generates a briefing for the window ending today.
    pub async fn generate(&self, config: &BriefingConfig) -> Result<GeneratedBriefing> {
        self.generate_on(config, Utc::now().date_naive()).await
    }

    /// Looks one of the user's stored configs up by id and generates it.
    pub async fn generate_by_id(&self, user_id: &str, config_id: &str) -> Result<GeneratedBriefing> {
        let config = self.owned_config(user_id, config_id).await?;
        self.generate(&config).await
    }

    pub async fn generate_on(&self, config: &BriefingConfig, today: NaiveDate) -> Result<GeneratedBriefing> {
        if config.topics.is_empty() {
            return Err(Error::validation("Please add at least one topic"));
        }

        let key = config.lock_key();
        let lock = self.generation_lock(&key).await;
        let result = {
            let _guard = lock.lock().await;
            self.run_generation(config, today).await
        };
        self.release_lock(&key, lock).await;
        result
    }

    async fn run_generation(&self, config: &BriefingConfig, today: NaiveDate) -> Result<GeneratedBriefing> {
        let logger = Logger::new().with_new_prefixes(format!("[{}]", config.name));
        let range = DateRange::for_frequency(config.frequency, today);
        logger.info(&format!("📰 Generating {} briefing for {} to {}", config.frequency, range.start, range.end));

        let articles = self.fetch_topics(config, range, &logger).await;
        if articles.is_empty() {
            logger.info("📭 No articles found");
            return Ok(GeneratedBriefing::empty(range));
        }

        let raw = self.model.summarize_all(&articles).await.map_err(|e| {
            logger.error(&format!("❌ Batch summarization failed: {}", e));
            Error::Fetch(BRIEFING_FAILED.to_string())
        })?;

        let parsed = SummaryParser::new(Layout::Briefing).parse(&raw, &articles);
        logger.info(&format!(
            "✨ Parsed bullets for {}/{} articles",
            parsed.article_bullets.len(),
            articles.len()
        ));
        let report = TopicAggregator::new(Arc::clone(&self.model)).synthesize(&parsed).await;

        let history = self.persist(config, &articles, &parsed, &report, &logger).await;
        logger.info("✅ Briefing ready");

        Ok(GeneratedBriefing { range, articles, parsed, report, history })
    }

    async fn fetch_topics(&self, config: &BriefingConfig, range: DateRange, logger: &Logger) -> Vec<Article> {
        let mut articles = Vec::new();
        for topic in config.topic_names() {
            let topic_logger = logger.with_prefix(format!("[{}]", topic));
            match self.news.search(&SearchQuery::new(topic, range)).await {
                Ok(found) => {
                    topic_logger.debug(&format!("🔍 {} articles found", found.len()));
                    articles.extend(
                        found
                            .into_iter()
                            .take(self.config.articles_per_topic)
                            .map(|article| article.with_topic(topic)),
                    );
                }
                Err(e) => topic_logger.warn(&format!("⚠️ Skipping topic: {}", e)),
            }
        }
        articles
    }

    async fn persist(
        &self,
        config: &BriefingConfig,
        articles: &[Article],
        parsed: &ParsedSummary,
        report: &BriefingReport,
        logger: &Logger,
    ) -> Option<BriefingHistory> {
        let Some(config_id) = config.id.clone() else {
            logger.debug("Config not saved yet, skipping history");
            return None;
        };
        let record = BriefingHistory {
            id: None,
            user_id: config.user_id.clone(),
            briefing_config_id: config_id,
            articles: articles.to_vec(),
            summary: HistorySummary {
                summary: report.text(),
                article_map: parsed.article_bullets.clone(),
            },
            created_at: None,
            updated_at: None,
        };
        match self.storage.save_briefing(&record).await {
            Ok(saved) => Some(saved),
            Err(e) => {
                logger.error(&format!("💾 Failed to save briefing: {}", e));
                None
            }
        }
    }

    /// Runs an ad-hoc search and records it when anything came back.
    pub async fn search(&self, user_id: &str, topic: &str, start: NaiveDate, end: NaiveDate) -> Result<NewsSearch> {
        let query = SearchQuery {
            topic: topic.trim().to_string(),
            start_date: start,
            end_date: end,
        };
        query.validate()?;

        let articles = self.news.search(&query).await?;
        info!("🔍 {} articles for {} ({} to {})", articles.len(), query.topic, start, end);

        let search = NewsSearch {
            id: None,
            user_id: user_id.to_string(),
            topic: query.topic,
            start_date: start,
            end_date: end,
            articles,
            overall_summary: None,
            created_at: None,
        };
        if search.articles.is_empty() {
            return Ok(search);
        }
        let saved = self.storage.save_search(&search).await;
        match saved {
            Ok(saved) => Ok(saved),
            Err(e) => {
                tracing::error!("💾 Failed to save search: {}", e);
                Ok(search)
            }
        }
    }

    /// Summarizes search results and stores the overview on the user's most
    /// recent search.
    pub async fn summarize_search(&self, user_id: &str, articles: &[Article]) -> Result<ParsedSummary> {
        if articles.is_empty() {
            return Err(Error::validation("No articles to summarize"));
        }

        let raw = match self.model.summarize_all(articles).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!("⚠️ Search summarization failed: {}", e);
                return Ok(ParsedSummary {
                    overall_summary: SEARCH_SUMMARY_FAILED.to_string(),
                    ..ParsedSummary::default()
                });
            }
        };
        let parser = SummaryParser::new(Layout::Search);
        let parsed = parser.parse(&raw, articles);
        let Some(summary) = parser.narrative(&raw) else {
            tracing::debug!("Response carried no summary text, leaving search history as is");
            return Ok(parsed);
        };

        match self.storage.latest_search(user_id).await {
            Ok(Some(NewsSearch { id: Some(id), .. })) => {
                if let Err(e) = self.storage.update_search_summary(&id, &summary).await {
                    tracing::error!("💾 Failed to store search summary: {}", e);
                }
            }
            Ok(_) => tracing::debug!("No stored search to attach the summary to"),
            Err(e) => tracing::error!("💾 Failed to load latest search: {}", e),
        }
        Ok(parsed)
    }

    /// Never fails; errors and empty replies become fixed messages.
    pub async fn summarize_article(&self, url: &str) -> String {
        match self.model.summarize_article(url).await {
            Ok(summary) if !summary.trim().is_empty() => summary,
            Ok(_) => NO_SUMMARY.to_string(),
            Err(e) => {
                tracing::warn!("⚠️ Failed to summarize {}: {}", url, e);
                ARTICLE_SUMMARY_FAILED.to_string()
            }
        }
    }

    /// Validates and stores a config, marking it active. An existing id must
    /// belong to the config's user.
    pub async fn save_config(&self, config: &BriefingConfig) -> Result<BriefingConfig> {
        config.validate()?;
        if let Some(id) = config.id.as_deref() {
            self.owned_config(&config.user_id, id).await?;
        }
        let mut config = config.clone();
        config.is_active = true;
        self.storage.save_config(&config).await
    }

    /// Creates an inactive config with no topics yet.
    pub async fn create_config(&self, user_id: &str, name: &str, description: Option<&str>) -> Result<BriefingConfig> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::validation("Please enter a name for your briefing"));
        }
        let mut config = BriefingConfig::new(user_id, name);
        config.description = description.map(str::to_string).filter(|d| !d.trim().is_empty());
        self.storage.save_config(&config).await
    }

    pub async fn list_configs(&self, user_id: &str) -> Result<Vec<BriefingConfig>> {
        self.storage.list_configs(user_id).await
    }

    pub async fn delete_config(&self, user_id: &str, id: &str) -> Result<()> {
        self.owned_config(user_id, id).await?;
        self.storage.delete_config(id).await
    }

    pub async fn latest_briefing(&self, user_id: &str, config_id: Option<&str>) -> Result<Option<BriefingHistory>> {
        self.storage.latest_briefing(user_id, config_id).await
    }

    pub async fn briefing_history(&self, user_id: &str) -> Result<Vec<BriefingHistory>> {
        self.storage.list_briefings(user_id).await
    }

    pub async fn delete_briefing(&self, user_id: &str, id: &str) -> Result<()> {
        let owned = self.storage.list_briefings(user_id).await?;
        if !owned.iter().any(|briefing| briefing.id.as_deref() == Some(id)) {
            return Err(Error::not_found(format!("Briefing {}", id)));
        }
        self.storage.delete_briefing(id).await
    }

    pub async fn search_history(&self, user_id: &str) -> Result<Vec<NewsSearch>> {
        self.storage.list_searches(user_id).await
    }

    pub async fn delete_search(&self, user_id: &str, id: &str) -> Result<()> {
        let owned = self.storage.list_searches(user_id).await?;
        if !owned.iter().any(|search| search.id.as_deref() == Some(id)) {
            return Err(Error::not_found(format!("Search {}", id)));
        }
        self.storage.delete_search(id).await
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use nb_core::Frequency;
    use nb_inference::models::DummyModel;
    use nb_inference::parser::GENERIC_OVERVIEW;
    use nb_storage::MemoryStorage;
    use tokio::sync::Mutex;

    /// Returns five articles per topic and records every query.
    #[derive(Debug, Default)]
    pub(crate) struct FakeNews {
        pub queries: Mutex<Vec<SearchQuery>>,
        in_flight: AtomicUsize,
        pub max_in_flight: AtomicUsize,
    }

    #[async_trait]
    impl NewsSource for FakeNews {
        async fn search(&self, query: &SearchQuery) -> Result<Vec<Article>> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(10)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            self.queries.lock().await.push(query.clone());
            if query.topic == "Broken" {
                return Err(Error::Fetch("search endpoint down".to_string()));
            }
            if query.topic == "Quiet" {
                return Ok(Vec::new());
            }
            Ok((1..=5)
                .map(|i| {
                    let slug = query.topic.to_lowercase();
                    Article::new(format!("{} {}", query.topic, i), format!("https://news.example/{}/{}", slug, i))
                })
                .collect())
        }
    }

    #[derive(Debug)]
    struct DownModel;

    #[async_trait]
    impl SummaryModel for DownModel {
        fn name(&self) -> &str {
            "Down"
        }

        async fn summarize_all(&self, _articles: &[Article]) -> Result<String> {
            Err(Error::Inference("offline".to_string()))
        }

        async fn summarize_article(&self, _url: &str) -> Result<String> {
            Err(Error::Inference("offline".to_string()))
        }

        async fn summarize_topic(&self, _topic: &str, _bullets: &[String]) -> Result<String> {
            Err(Error::Inference("offline".to_string()))
        }
    }

    /// Answers every batch with a fixed reply.
    #[derive(Debug)]
    struct CannedModel(&'static str);

    #[async_trait]
    impl SummaryModel for CannedModel {
        fn name(&self) -> &str {
            "Canned"
        }

        async fn summarize_all(&self, _articles: &[Article]) -> Result<String> {
            Ok(self.0.to_string())
        }

        async fn summarize_article(&self, _url: &str) -> Result<String> {
            Ok(self.0.to_string())
        }

        async fn summarize_topic(&self, _topic: &str, _bullets: &[String]) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    pub(crate) fn manager_with(news: Arc<FakeNews>, model: Arc<dyn SummaryModel>) -> BriefingManager {
        BriefingManager::new(Arc::new(MemoryStorage::new()), news, model, FetchConfig::default())
    }

    fn config(topics: &[&str]) -> BriefingConfig {
        let mut config = BriefingConfig::new("user-1", "Morning");
        for topic in topics {
            config.add_topic(topic, false);
        }
        config.id = Some("cfg-1".to_string());
        config
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()
    }

    #[tokio::test]
    async fn test_generate_keeps_three_per_topic() {
        let news = Arc::new(FakeNews::default());
        let manager = manager_with(news.clone(), Arc::new(DummyModel::new()));

        let briefing = manager.generate_on(&config(&["Health", "Sports"]), today()).await.unwrap();
        assert_eq!(briefing.articles.len(), 6);
        assert!(briefing.articles[..3].iter().all(|a| a.topic.as_deref() == Some("Health")));
        assert_eq!(briefing.articles[3].title, "Sports 1");

        let queries = news.queries.lock().await;
        assert_eq!(queries[0].start_date, NaiveDate::from_ymd_opt(2024, 3, 9).unwrap());
        assert_eq!(queries[0].end_date, today());

        assert_eq!(
            briefing.summary(),
            "Health:\nHealth: Health 1 Health 2 Health 3\n\nSports:\nSports: Sports 1 Sports 2 Sports 3"
        );
        let history = briefing.history.unwrap();
        assert_eq!(history.briefing_config_id, "cfg-1");
        assert_eq!(history.summary.article_map.len(), 6);

        let latest = manager.latest_briefing("user-1", Some("cfg-1")).await.unwrap().unwrap();
        assert_eq!(latest.id, history.id);
    }

    #[tokio::test]
    async fn test_failed_topic_is_skipped() {
        let news = Arc::new(FakeNews::default());
        let manager = manager_with(news, Arc::new(DummyModel::new()));

        let briefing = manager.generate_on(&config(&["Broken", "Health"]), today()).await.unwrap();
        assert_eq!(briefing.articles.len(), 3);
        assert!(briefing.report.section("Broken").is_none());
    }

    #[tokio::test]
    async fn test_no_articles_gives_empty_briefing() {
        let news = Arc::new(FakeNews::default());
        let manager = manager_with(news, Arc::new(DownModel));

        let briefing = manager.generate_on(&config(&["Quiet"]), today()).await.unwrap();
        assert!(briefing.is_empty());
        assert!(briefing.history.is_none());
        assert!(manager.briefing_history("user-1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_batch_failure_is_top_level_error() {
        let news = Arc::new(FakeNews::default());
        let manager = manager_with(news, Arc::new(DownModel));

        let err = manager.generate_on(&config(&["Health"]), today()).await.unwrap_err();
        assert_eq!(err.to_string(), BRIEFING_FAILED);
    }

    #[tokio::test]
    async fn test_empty_topics_rejected_before_fetch() {
        let news = Arc::new(FakeNews::default());
        let manager = manager_with(news.clone(), Arc::new(DummyModel::new()));

        let err = manager.generate_on(&config(&[]), today()).await.unwrap_err();
        assert!(err.is_validation());
        assert!(news.queries.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_monthly_window() {
        let news = Arc::new(FakeNews::default());
        let manager = manager_with(news.clone(), Arc::new(DummyModel::new()));
        let mut config = config(&["Health"]);
        config.frequency = Frequency::Monthly;

        let briefing = manager.generate_on(&config, today()).await.unwrap();
        assert_eq!(briefing.range.start, NaiveDate::from_ymd_opt(2024, 2, 10).unwrap());
    }

    #[tokio::test]
    async fn test_same_config_generations_are_serialized() {
        let news = Arc::new(FakeNews::default());
        let manager = manager_with(news.clone(), Arc::new(DummyModel::new()));
        let config = config(&["Health", "Sports"]);

        let (first, second) = tokio::join!(
            manager.generate_on(&config, today()),
            manager.generate_on(&config, today())
        );
        assert!(first.is_ok() && second.is_ok());
        assert_eq!(news.max_in_flight.load(Ordering::SeqCst), 1);
        assert_eq!(news.queries.lock().await.len(), 4);
    }

    #[tokio::test]
    async fn test_search_validates_and_records() {
        let news = Arc::new(FakeNews::default());
        let manager = manager_with(news.clone(), Arc::new(DummyModel::new()));

        let err = manager
            .search("user-1", "Health", today(), NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "End date must be after or equal to start date.");
        assert!(manager.search("user-1", "  ", today(), today()).await.unwrap_err().is_validation());
        assert!(news.queries.lock().await.is_empty());

        let quiet = manager.search("user-1", "Quiet", today(), today()).await.unwrap();
        assert!(quiet.id.is_none());

        let found = manager.search("user-1", "Health", today(), today()).await.unwrap();
        assert!(found.id.is_some());
        assert_eq!(manager.search_history("user-1").await.unwrap().len(), 1);

        let parsed = manager.summarize_search("user-1", &found.articles).await.unwrap();
        assert_eq!(parsed.overall_summary, "5 articles reviewed");
        let latest = manager.search_history("user-1").await.unwrap().remove(0);
        assert_eq!(latest.overall_summary.as_deref(), Some("5 articles reviewed"));
    }

    #[tokio::test]
    async fn test_summary_fallbacks() {
        let news = Arc::new(FakeNews::default());
        let manager = manager_with(news, Arc::new(DownModel));

        assert_eq!(manager.summarize_article("https://a").await, ARTICLE_SUMMARY_FAILED);
        let parsed = manager
            .summarize_search("user-1", &[Article::new("a", "https://a")])
            .await
            .unwrap();
        assert_eq!(parsed.overall_summary, SEARCH_SUMMARY_FAILED);
        assert!(manager.summarize_search("user-1", &[]).await.unwrap_err().is_validation());
    }

    #[tokio::test]
    async fn test_search_history_keeps_only_real_summaries() {
        let news = Arc::new(FakeNews::default());
        let manager = manager_with(news, Arc::new(CannedModel("Article 1:\n- one\nOverall Summary:\n")));

        let found = manager.search("user-1", "Health", today(), today()).await.unwrap();
        let parsed = manager.summarize_search("user-1", &found.articles).await.unwrap();
        assert_eq!(parsed.overall_summary, GENERIC_OVERVIEW);

        let latest = manager.search_history("user-1").await.unwrap().remove(0);
        assert_eq!(latest.overall_summary, None);
    }

    #[tokio::test]
    async fn test_config_management() {
        let news = Arc::new(FakeNews::default());
        let manager = manager_with(news, Arc::new(DummyModel::new()));

        assert!(manager.create_config("user-1", "   ", None).await.unwrap_err().is_validation());
        let created = manager.create_config("user-1", " Evening ", Some("after work")).await.unwrap();
        assert_eq!(created.name, "Evening");
        assert!(!created.is_active);
        assert!(created.topics.is_empty());

        assert!(manager.save_config(&created).await.unwrap_err().is_validation());

        let mut with_topic = created.clone();
        with_topic.add_topic("Health", false);
        let saved = manager.save_config(&with_topic).await.unwrap();
        assert!(saved.is_active);
        assert_eq!(saved.id, created.id);
        assert_eq!(manager.list_configs("user-1").await.unwrap().len(), 1);

        let briefing = manager.generate_by_id("user-1", saved.id.as_deref().unwrap()).await.unwrap();
        assert_eq!(briefing.articles.len(), 3);
        assert!(matches!(manager.generate_by_id("user-1", "missing").await, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_records_are_scoped_to_their_user() {
        let news = Arc::new(FakeNews::default());
        let manager = manager_with(news.clone(), Arc::new(DummyModel::new()));

        let mut config = manager.create_config("alice", "Morning", None).await.unwrap();
        config.add_topic("Health", false);
        let config = manager.save_config(&config).await.unwrap();
        let config_id = config.id.clone().unwrap();
        let briefing = manager.generate_by_id("alice", &config_id).await.unwrap();
        let briefing_id = briefing.history.unwrap().id.unwrap();
        let search = manager.search("alice", "Health", today(), today()).await.unwrap();
        let search_id = search.id.unwrap();
        let queries = news.queries.lock().await.len();

        let not_found = |result: Result<()>| matches!(result, Err(Error::NotFound(_)));
        assert!(matches!(manager.generate_by_id("mallory", &config_id).await, Err(Error::NotFound(_))));
        assert_eq!(news.queries.lock().await.len(), queries);

        let mut takeover = config.clone();
        takeover.user_id = "mallory".to_string();
        assert!(matches!(manager.save_config(&takeover).await, Err(Error::NotFound(_))));

        assert!(not_found(manager.delete_config("mallory", &config_id).await));
        assert!(not_found(manager.delete_briefing("mallory", &briefing_id).await));
        assert!(not_found(manager.delete_search("mallory", &search_id).await));

        assert_eq!(manager.list_configs("alice").await.unwrap().len(), 1);
        assert_eq!(manager.briefing_history("alice").await.unwrap().len(), 1);
        assert_eq!(manager.search_history("alice").await.unwrap().len(), 1);

        manager.delete_briefing("alice", &briefing_id).await.unwrap();
        manager.delete_search("alice", &search_id).await.unwrap();
        manager.delete_config("alice", &config_id).await.unwrap();
        assert!(manager.list_configs("alice").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_lock_entries_are_released() {
        let news = Arc::new(FakeNews::default());
        let manager = manager_with(news, Arc::new(DownModel));
        let health = config(&["Health"]);

        let (first, second) = tokio::join!(
            manager.generate_on(&health, today()),
            manager.generate_on(&health, today())
        );
        assert!(first.is_err() && second.is_err());
        assert!(manager.locks.lock().await.is_empty());

        let mut unsaved = config(&["Sports"]);
        unsaved.id = None;
        manager.generate_on(&unsaved, today()).await.unwrap_err();
        assert!(manager.locks.lock().await.is_empty());
    }
}
