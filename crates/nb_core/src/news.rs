use async_trait::async_trait;

use crate::types::{Article, SearchQuery};
use crate::Result;

#[async_trait]
pub trait NewsSource: Send + Sync {
    /// Articles matching the query's topic within its date window.
    async fn search(&self, query: &SearchQuery) -> Result<Vec<Article>>;
}
