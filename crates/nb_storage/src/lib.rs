use std::sync::Arc;

use async_trait::async_trait;
use nb_core::{BriefingStore, Error, Result};
use tracing::info;

pub mod backends;

pub use backends::*;

pub const AVAILABLE_BACKENDS: &[&str] = &["memory", "sqlite"];

#[async_trait]
pub trait StorageBackend: BriefingStore {
    fn get_error_message() -> &'static str;
    async fn new() -> Result<Self>
    where
        Self: Sized;
}

/// Opens the store named by `kind`. `database_url` only applies to SQLite.
#[cfg_attr(not(feature = "sqlite"), allow(unused_variables))]
pub async fn create_storage(kind: &str, database_url: Option<&str>) -> Result<Arc<dyn BriefingStore>> {
    let storage: Arc<dyn BriefingStore> = match kind {
        "memory" => Arc::new(<MemoryStorage as StorageBackend>::new().await?),
        #[cfg(feature = "sqlite")]
        "sqlite" => match database_url {
            Some(url) => Arc::new(SQLiteStorage::connect(url).await?),
            None => Arc::new(<SQLiteStorage as StorageBackend>::new().await.map_err(|e| {
                Error::storage(format!("{} ({})", SQLiteStorage::get_error_message(), e))
            })?),
        },
        #[cfg(not(feature = "sqlite"))]
        "sqlite" => {
            return Err(Error::storage("SQLite support requires the `sqlite` feature"));
        }
        other => {
            return Err(Error::storage(format!(
                "Unknown storage backend: {} (available: {})",
                other,
                AVAILABLE_BACKENDS.join(", ")
            )))
        }
    };
    info!("🏦 Storage backend initialized (using {})", kind);
    Ok(storage)
}

pub mod prelude {
    pub use super::backends::*;
    pub use super::{create_storage, StorageBackend};
}
