use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use nb_core::{BriefingConfig, BriefingHistory, BriefingStore, Error, NewsSearch, Result};
use tokio::sync::RwLock;

use crate::StorageBackend;

#[derive(Debug, Default)]
pub struct MemoryStore {
    configs: Vec<BriefingConfig>,
    briefings: Vec<BriefingHistory>,
    searches: Vec<NewsSearch>,
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Newest first; among equal timestamps the later insert wins.
fn newest_first<T: Clone>(records: &[T], keep: impl Fn(&T) -> bool, created: impl Fn(&T) -> Option<DateTime<Utc>>) -> Vec<T> {
    let mut matching: Vec<T> = records.iter().rev().filter(|r| keep(r)).cloned().collect();
    matching.sort_by(|a, b| created(b).cmp(&created(a)));
    matching
}

impl MemoryStore {
    fn save_config(&mut self, config: &BriefingConfig) -> BriefingConfig {
        let now = Utc::now();
        let mut saved = config.clone();
        saved.updated_at = Some(now);

        let id = saved.id.clone();
        let existing = id
            .as_deref()
            .and_then(|id| self.configs.iter_mut().find(|c| c.id.as_deref() == Some(id)));
        match existing {
            Some(existing) => {
                saved.created_at = existing.created_at.or(Some(now));
                *existing = saved.clone();
            }
            None => {
                saved.id.get_or_insert_with(new_id);
                saved.created_at.get_or_insert(now);
                self.configs.push(saved.clone());
            }
        }
        saved
    }

    fn save_briefing(&mut self, briefing: &BriefingHistory) -> BriefingHistory {
        let now = Utc::now();
        let mut saved = briefing.clone();
        saved.id.get_or_insert_with(new_id);
        saved.created_at.get_or_insert(now);
        saved.updated_at = Some(now);
        self.briefings.retain(|b| b.id != saved.id);
        self.briefings.push(saved.clone());
        saved
    }

    fn save_search(&mut self, search: &NewsSearch) -> NewsSearch {
        let mut saved = search.clone();
        saved.id.get_or_insert_with(new_id);
        saved.created_at.get_or_insert_with(Utc::now);
        self.searches.retain(|s| s.id != saved.id);
        self.searches.push(saved.clone());
        saved
    }
}

fn remove_by_id<T>(records: &mut Vec<T>, id: &str, id_of: impl Fn(&T) -> Option<&str>, what: &str) -> Result<()> {
    let before = records.len();
    records.retain(|r| id_of(r) != Some(id));
    if records.len() == before {
        return Err(Error::not_found(format!("{} {}", what, id)));
    }
    Ok(())
}

/// Process-local store; contents are lost on exit.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    store: Arc<RwLock<MemoryStore>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StorageBackend for MemoryStorage {
    fn get_error_message() -> &'static str {
        "Memory storage should be available"
    }

    async fn new() -> Result<Self> {
        Ok(MemoryStorage::new())
    }
}

#[async_trait]
impl BriefingStore for MemoryStorage {
    async fn save_config(&self, config: &BriefingConfig) -> Result<BriefingConfig> {
        Ok(self.store.write().await.save_config(config))
    }

    async fn get_config(&self, id: &str) -> Result<Option<BriefingConfig>> {
        let store = self.store.read().await;
        Ok(store.configs.iter().find(|c| c.id.as_deref() == Some(id)).cloned())
    }

    async fn list_configs(&self, user_id: &str) -> Result<Vec<BriefingConfig>> {
        let store = self.store.read().await;
        Ok(newest_first(&store.configs, |c| c.user_id == user_id, |c| c.created_at))
    }

    async fn delete_config(&self, id: &str) -> Result<()> {
        let mut store = self.store.write().await;
        remove_by_id(&mut store.configs, id, |c| c.id.as_deref(), "Briefing config")
    }

    async fn save_briefing(&self, briefing: &BriefingHistory) -> Result<BriefingHistory> {
        Ok(self.store.write().await.save_briefing(briefing))
    }

    async fn latest_briefing(&self, user_id: &str, config_id: Option<&str>) -> Result<Option<BriefingHistory>> {
        let store = self.store.read().await;
        let keep = |b: &BriefingHistory| {
            b.user_id == user_id && config_id.map_or(true, |id| b.briefing_config_id == id)
        };
        Ok(newest_first(&store.briefings, keep, |b| b.created_at).into_iter().next())
    }

    async fn list_briefings(&self, user_id: &str) -> Result<Vec<BriefingHistory>> {
        let store = self.store.read().await;
        Ok(newest_first(&store.briefings, |b| b.user_id == user_id, |b| b.created_at))
    }

    async fn delete_briefing(&self, id: &str) -> Result<()> {
        let mut store = self.store.write().await;
        remove_by_id(&mut store.briefings, id, |b| b.id.as_deref(), "Briefing")
    }

    async fn save_search(&self, search: &NewsSearch) -> Result<NewsSearch> {
        Ok(self.store.write().await.save_search(search))
    }

    async fn list_searches(&self, user_id: &str) -> Result<Vec<NewsSearch>> {
        let store = self.store.read().await;
        Ok(newest_first(&store.searches, |s| s.user_id == user_id, |s| s.created_at))
    }

    async fn update_search_summary(&self, id: &str, overall_summary: &str) -> Result<()> {
        let mut store = self.store.write().await;
        let search = store
            .searches
            .iter_mut()
            .find(|s| s.id.as_deref() == Some(id))
            .ok_or_else(|| Error::not_found(format!("News search {}", id)))?;
        search.overall_summary = Some(overall_summary.to_string());
        Ok(())
    }

    async fn delete_search(&self, id: &str) -> Result<()> {
        let mut store = self.store.write().await;
        remove_by_id(&mut store.searches, id, |s| s.id.as_deref(), "News search")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};
    use nb_core::{Article, HistorySummary};

    fn briefing(user: &str, config: &str, at: DateTime<Utc>) -> BriefingHistory {
        BriefingHistory {
            id: None,
            user_id: user.to_string(),
            briefing_config_id: config.to_string(),
            articles: vec![Article::new("a", "https://a").with_topic("Health")],
            summary: HistorySummary { summary: format!("{} at {}", config, at), ..Default::default() },
            created_at: Some(at),
            updated_at: None,
        }
    }

    fn search(user: &str, topic: &str) -> NewsSearch {
        let day = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        NewsSearch {
            id: None,
            user_id: user.to_string(),
            topic: topic.to_string(),
            start_date: day,
            end_date: day,
            articles: Vec::new(),
            overall_summary: None,
            created_at: None,
        }
    }

    #[tokio::test]
    async fn test_config_insert_then_update() {
        let storage = MemoryStorage::new();
        let mut config = BriefingConfig::new("user-1", "Morning");
        config.add_topic("Health", false);

        let saved = storage.save_config(&config).await.unwrap();
        let id = saved.id.clone().unwrap();
        assert!(saved.created_at.is_some());

        let mut changed = saved.clone();
        changed.name = "Evening".to_string();
        let updated = storage.save_config(&changed).await.unwrap();
        assert_eq!(updated.id.as_deref(), Some(id.as_str()));
        assert_eq!(updated.created_at, saved.created_at);

        let configs = storage.list_configs("user-1").await.unwrap();
        assert_eq!(configs.len(), 1);
        assert_eq!(configs[0].name, "Evening");
        assert!(storage.list_configs("user-2").await.unwrap().is_empty());

        storage.delete_config(&id).await.unwrap();
        assert!(storage.get_config(&id).await.unwrap().is_none());
        assert!(matches!(storage.delete_config(&id).await, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_latest_briefing_by_user_and_config() {
        let storage = MemoryStorage::new();
        let now = Utc::now();
        storage.save_briefing(&briefing("user-1", "cfg-a", now - Duration::hours(2))).await.unwrap();
        storage.save_briefing(&briefing("user-1", "cfg-b", now - Duration::hours(1))).await.unwrap();
        storage.save_briefing(&briefing("user-1", "cfg-a", now - Duration::hours(3))).await.unwrap();
        storage.save_briefing(&briefing("user-2", "cfg-c", now)).await.unwrap();

        let latest = storage.latest_briefing("user-1", None).await.unwrap().unwrap();
        assert_eq!(latest.briefing_config_id, "cfg-b");

        let latest = storage.latest_briefing("user-1", Some("cfg-a")).await.unwrap().unwrap();
        assert_eq!(latest.created_at, Some(now - Duration::hours(2)));

        let history = storage.list_briefings("user-1").await.unwrap();
        assert_eq!(history.len(), 3);
        assert!(history.windows(2).all(|w| w[0].created_at >= w[1].created_at));

        assert!(storage.latest_briefing("user-3", None).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_search_summary_update() {
        let storage = MemoryStorage::new();
        storage.save_search(&search("user-1", "Health")).await.unwrap();
        let second = storage.save_search(&search("user-1", "Sports")).await.unwrap();

        // same-instant inserts still come back newest first
        let latest = storage.latest_search("user-1").await.unwrap().unwrap();
        assert_eq!(latest.topic, "Sports");

        let id = second.id.unwrap();
        storage.update_search_summary(&id, "Derby won.").await.unwrap();
        let searches = storage.list_searches("user-1").await.unwrap();
        assert_eq!(searches[0].overall_summary.as_deref(), Some("Derby won."));
        assert!(searches[1].overall_summary.is_none());

        storage.delete_search(&id).await.unwrap();
        assert_eq!(storage.list_searches("user-1").await.unwrap().len(), 1);
        assert!(storage.update_search_summary(&id, "x").await.is_err());
    }
}
