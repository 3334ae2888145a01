use async_trait::async_trait;

use crate::types::{BriefingConfig, BriefingHistory, NewsSearch};
use crate::Result;

/// Persistence for briefing configs, briefing history and news searches.
///
/// Records are keyed by an opaque user id. Every `list_*` and `latest_*`
/// query returns newest first by creation time.
#[async_trait]
pub trait BriefingStore: Send + Sync {
    /// Insert a config when it has no id, otherwise update it in place.
    async fn save_config(&self, config: &BriefingConfig) -> Result<BriefingConfig>;

    async fn get_config(&self, id: &str) -> Result<Option<BriefingConfig>>;

    async fn list_configs(&self, user_id: &str) -> Result<Vec<BriefingConfig>>;

    async fn delete_config(&self, id: &str) -> Result<()>;

    async fn save_briefing(&self, briefing: &BriefingHistory) -> Result<BriefingHistory>;

    async fn latest_briefing(&self, user_id: &str, config_id: Option<&str>) -> Result<Option<BriefingHistory>>;

    async fn list_briefings(&self, user_id: &str) -> Result<Vec<BriefingHistory>>;

    async fn delete_briefing(&self, id: &str) -> Result<()>;

    async fn save_search(&self, search: &NewsSearch) -> Result<NewsSearch>;

    async fn list_searches(&self, user_id: &str) -> Result<Vec<NewsSearch>>;

    async fn update_search_summary(&self, id: &str, overall_summary: &str) -> Result<()>;

    async fn delete_search(&self, id: &str) -> Result<()>;

    async fn latest_search(&self, user_id: &str) -> Result<Option<NewsSearch>> {
        Ok(self.list_searches(user_id).await?.into_iter().next())
    }
}
