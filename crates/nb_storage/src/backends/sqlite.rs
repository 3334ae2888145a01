use std::path::{Path, PathBuf};
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use nb_core::{BriefingConfig, BriefingHistory, BriefingStore, Error, NewsSearch, Result};
use serde::de::DeserializeOwned;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqliteRow};
use sqlx::Row;

use crate::StorageBackend;

const DEFAULT_DB_PATH: &str = "briefings.db";

const MIGRATIONS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS briefing_configs (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        name TEXT NOT NULL,
        description TEXT,
        topics TEXT NOT NULL,
        frequency TEXT NOT NULL,
        is_active INTEGER NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS briefing_history (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        briefing_config_id TEXT NOT NULL,
        articles TEXT NOT NULL,
        summary TEXT NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS news_searches (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        topic TEXT NOT NULL,
        start_date TEXT NOT NULL,
        end_date TEXT NOT NULL,
        articles TEXT NOT NULL,
        overall_summary TEXT,
        created_at TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_briefing_history_user ON briefing_history (user_id, created_at)",
    "CREATE INDEX IF NOT EXISTS idx_news_searches_user ON news_searches (user_id, created_at)",
];

fn db_error(action: &str) -> impl FnOnce(sqlx::Error) -> Error + '_ {
    move |e| Error::storage(format!("Failed to {}: {}", action, e))
}

/// Fixed-width RFC 3339 so text ordering matches time ordering.
fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|at| at.with_timezone(&Utc))
        .map_err(|e| Error::storage(format!("Failed to parse timestamp {}: {}", raw, e)))
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|e| Error::storage(format!("Failed to parse date {}: {}", raw, e)))
}

fn column<T>(row: &SqliteRow, name: &str) -> Result<T>
where
    T: for<'r> sqlx::Decode<'r, sqlx::Sqlite> + sqlx::Type<sqlx::Sqlite>,
{
    row.try_get(name).map_err(db_error("read column"))
}

fn json_column<T: DeserializeOwned>(row: &SqliteRow, name: &str) -> Result<T> {
    let raw: String = column(row, name)?;
    Ok(serde_json::from_str(&raw)?)
}

fn config_from_row(row: &SqliteRow) -> Result<BriefingConfig> {
    let frequency: String = column(row, "frequency")?;
    let created_at: String = column(row, "created_at")?;
    let updated_at: String = column(row, "updated_at")?;
    Ok(BriefingConfig {
        id: Some(column(row, "id")?),
        user_id: column(row, "user_id")?,
        name: column(row, "name")?,
        description: column(row, "description")?,
        topics: json_column(row, "topics")?,
        frequency: frequency.parse()?,
        is_active: column::<i64>(row, "is_active")? != 0,
        created_at: Some(parse_timestamp(&created_at)?),
        updated_at: Some(parse_timestamp(&updated_at)?),
    })
}

fn briefing_from_row(row: &SqliteRow) -> Result<BriefingHistory> {
    let created_at: String = column(row, "created_at")?;
    let updated_at: String = column(row, "updated_at")?;
    Ok(BriefingHistory {
        id: Some(column(row, "id")?),
        user_id: column(row, "user_id")?,
        briefing_config_id: column(row, "briefing_config_id")?,
        articles: json_column(row, "articles")?,
        summary: json_column(row, "summary")?,
        created_at: Some(parse_timestamp(&created_at)?),
        updated_at: Some(parse_timestamp(&updated_at)?),
    })
}

fn search_from_row(row: &SqliteRow) -> Result<NewsSearch> {
    let start_date: String = column(row, "start_date")?;
    let end_date: String = column(row, "end_date")?;
    let created_at: String = column(row, "created_at")?;
    Ok(NewsSearch {
        id: Some(column(row, "id")?),
        user_id: column(row, "user_id")?,
        topic: column(row, "topic")?,
        start_date: parse_date(&start_date)?,
        end_date: parse_date(&end_date)?,
        articles: json_column(row, "articles")?,
        overall_summary: column(row, "overall_summary")?,
        created_at: Some(parse_timestamp(&created_at)?),
    })
}

fn ensure_affected(rows: u64, what: &str, id: &str) -> Result<()> {
    if rows == 0 {
        return Err(Error::not_found(format!("{} {}", what, id)));
    }
    Ok(())
}

pub struct SQLiteStorage {
    pool: SqlitePool,
    db_path: PathBuf,
}

#[async_trait]
impl StorageBackend for SQLiteStorage {
    fn get_error_message() -> &'static str {
        "SQLite database should be available at ./briefings.db"
    }

    async fn new() -> Result<Self> {
        Self::new_with_path(Path::new(DEFAULT_DB_PATH)).await
    }
}

impl SQLiteStorage {
    pub async fn new_with_path(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true);
        Self::open(options, db_path.to_path_buf()).await
    }

    /// Accepts a `sqlite:` URL or a plain file path.
    pub async fn connect(database_url: &str) -> Result<Self> {
        if !database_url.starts_with("sqlite:") {
            return Self::new_with_path(Path::new(database_url)).await;
        }
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(db_error("parse database url"))?
            .create_if_missing(true);
        let db_path = options.clone().get_filename().to_path_buf();
        Self::open(options, db_path).await
    }

    async fn open(options: SqliteConnectOptions, db_path: PathBuf) -> Result<Self> {
        let pool = SqlitePool::connect_with(options)
            .await
            .map_err(db_error("connect to database"))?;

        for (i, migration) in MIGRATIONS.iter().enumerate() {
            sqlx::query(migration)
                .execute(&pool)
                .await
                .map_err(|e| Error::storage(format!("Failed to run migration {}: {}", i, e)))?;
        }

        tracing::debug!("SQLite storage ready at {}", db_path.display());
        Ok(Self { pool, db_path })
    }

    pub fn get_db_path(&self) -> &Path {
        &self.db_path
    }
}

#[async_trait]
impl BriefingStore for SQLiteStorage {
    async fn save_config(&self, config: &BriefingConfig) -> Result<BriefingConfig> {
        let now = Utc::now();
        let mut saved = config.clone();
        let id = saved.id.get_or_insert_with(|| uuid::Uuid::new_v4().to_string()).clone();
        saved.updated_at = Some(now);

        let existing = self.get_config(&id).await?;
        saved.created_at = existing
            .and_then(|c| c.created_at)
            .or(saved.created_at)
            .or(Some(now));

        sqlx::query(
            r#"
            INSERT OR REPLACE INTO briefing_configs
            (id, user_id, name, description, topics, frequency, is_active, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&saved.user_id)
        .bind(&saved.name)
        .bind(saved.description.as_deref())
        .bind(serde_json::to_string(&saved.topics)?)
        .bind(saved.frequency.to_string())
        .bind(saved.is_active as i64)
        .bind(timestamp(saved.created_at.unwrap_or(now)))
        .bind(timestamp(now))
        .execute(&self.pool)
        .await
        .map_err(db_error("save briefing config"))?;

        Ok(saved)
    }

    async fn get_config(&self, id: &str) -> Result<Option<BriefingConfig>> {
        let row = sqlx::query("SELECT * FROM briefing_configs WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("get briefing config"))?;
        row.as_ref().map(config_from_row).transpose()
    }

    async fn list_configs(&self, user_id: &str) -> Result<Vec<BriefingConfig>> {
        let rows = sqlx::query(
            "SELECT * FROM briefing_configs WHERE user_id = ? ORDER BY created_at DESC, rowid DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("list briefing configs"))?;
        rows.iter().map(config_from_row).collect()
    }

    async fn delete_config(&self, id: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM briefing_configs WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error("delete briefing config"))?;
        ensure_affected(result.rows_affected(), "Briefing config", id)
    }

    async fn save_briefing(&self, briefing: &BriefingHistory) -> Result<BriefingHistory> {
        let now = Utc::now();
        let mut saved = briefing.clone();
        let id = saved.id.get_or_insert_with(|| uuid::Uuid::new_v4().to_string()).clone();
        let created_at = *saved.created_at.get_or_insert(now);
        saved.updated_at = Some(now);

        sqlx::query(
            r#"
            INSERT OR REPLACE INTO briefing_history
            (id, user_id, briefing_config_id, articles, summary, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&saved.user_id)
        .bind(&saved.briefing_config_id)
        .bind(serde_json::to_string(&saved.articles)?)
        .bind(serde_json::to_string(&saved.summary)?)
        .bind(timestamp(created_at))
        .bind(timestamp(now))
        .execute(&self.pool)
        .await
        .map_err(db_error("save briefing"))?;

        Ok(saved)
    }

    async fn latest_briefing(&self, user_id: &str, config_id: Option<&str>) -> Result<Option<BriefingHistory>> {
        let row = match config_id {
            Some(config_id) => sqlx::query(
                r#"
                SELECT * FROM briefing_history
                WHERE user_id = ? AND briefing_config_id = ?
                ORDER BY created_at DESC, rowid DESC
                LIMIT 1
                "#,
            )
            .bind(user_id)
            .bind(config_id),
            None => sqlx::query(
                "SELECT * FROM briefing_history WHERE user_id = ? ORDER BY created_at DESC, rowid DESC LIMIT 1",
            )
            .bind(user_id),
        }
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("get latest briefing"))?;
        row.as_ref().map(briefing_from_row).transpose()
    }

    async fn list_briefings(&self, user_id: &str) -> Result<Vec<BriefingHistory>> {
        let rows = sqlx::query(
            "SELECT * FROM briefing_history WHERE user_id = ? ORDER BY created_at DESC, rowid DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("list briefings"))?;
        rows.iter().map(briefing_from_row).collect()
    }

    async fn delete_briefing(&self, id: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM briefing_history WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error("delete briefing"))?;
        ensure_affected(result.rows_affected(), "Briefing", id)
    }

    async fn save_search(&self, search: &NewsSearch) -> Result<NewsSearch> {
        let mut saved = search.clone();
        let id = saved.id.get_or_insert_with(|| uuid::Uuid::new_v4().to_string()).clone();
        let created_at = *saved.created_at.get_or_insert_with(Utc::now);

        sqlx::query(
            r#"
            INSERT OR REPLACE INTO news_searches
            (id, user_id, topic, start_date, end_date, articles, overall_summary, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&saved.user_id)
        .bind(&saved.topic)
        .bind(saved.start_date.format("%Y-%m-%d").to_string())
        .bind(saved.end_date.format("%Y-%m-%d").to_string())
        .bind(serde_json::to_string(&saved.articles)?)
        .bind(saved.overall_summary.as_deref())
        .bind(timestamp(created_at))
        .execute(&self.pool)
        .await
        .map_err(db_error("save news search"))?;

        Ok(saved)
    }

    async fn list_searches(&self, user_id: &str) -> Result<Vec<NewsSearch>> {
        let rows = sqlx::query(
            "SELECT * FROM news_searches WHERE user_id = ? ORDER BY created_at DESC, rowid DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("list news searches"))?;
        rows.iter().map(search_from_row).collect()
    }

    async fn update_search_summary(&self, id: &str, overall_summary: &str) -> Result<()> {
        let result = sqlx::query("UPDATE news_searches SET overall_summary = ? WHERE id = ?")
            .bind(overall_summary)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error("update news search"))?;
        ensure_affected(result.rows_affected(), "News search", id)
    }

    async fn delete_search(&self, id: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM news_searches WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error("delete news search"))?;
        ensure_affected(result.rows_affected(), "News search", id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use nb_core::{Article, BulletMap, Frequency, HistorySummary};
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_sqlite_configs() {
        let temp_dir = tempdir().unwrap();
        let storage = SQLiteStorage::new_with_path(&temp_dir.path().join("test.db")).await.unwrap();

        let mut config = BriefingConfig::new("user-1", "Morning");
        config.add_topic("Health", false);
        config.frequency = Frequency::Weekly;
        config.is_active = true;

        let saved = storage.save_config(&config).await.unwrap();
        let id = saved.id.clone().unwrap();
        let loaded = storage.get_config(&id).await.unwrap().unwrap();
        assert_eq!(loaded.topics, config.topics);
        assert_eq!(loaded.frequency, Frequency::Weekly);
        assert!(loaded.is_active);

        let mut renamed = loaded.clone();
        renamed.name = "Evening".to_string();
        storage.save_config(&renamed).await.unwrap();
        let configs = storage.list_configs("user-1").await.unwrap();
        assert_eq!(configs.len(), 1);
        assert_eq!(configs[0].name, "Evening");
        assert_eq!(configs[0].created_at, loaded.created_at);

        storage.delete_config(&id).await.unwrap();
        assert!(matches!(storage.delete_config(&id).await, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_connect_with_sqlite_url() {
        let temp_dir = tempdir().unwrap();
        let db_path = temp_dir.path().join("briefings.db");
        let url = format!("sqlite:{}", db_path.display());

        let storage = SQLiteStorage::connect(&url).await.unwrap();
        assert_eq!(storage.get_db_path(), db_path.as_path());
        assert!(db_path.exists());

        let saved = storage.save_config(&BriefingConfig::new("user-1", "Morning")).await.unwrap();
        drop(storage);

        let reopened = SQLiteStorage::connect(&url).await.unwrap();
        let loaded = reopened.get_config(saved.id.as_deref().unwrap()).await.unwrap();
        assert_eq!(loaded.map(|c| c.name), Some("Morning".to_string()));
    }

    #[tokio::test]
    async fn test_sqlite_briefings_newest_first() {
        let temp_dir = tempdir().unwrap();
        let storage = SQLiteStorage::connect(temp_dir.path().join("nested/briefings.db").to_str().unwrap())
            .await
            .unwrap();

        let now = Utc::now();
        for (config, hours) in [("cfg-a", 3), ("cfg-b", 1), ("cfg-a", 2)] {
            let mut article_map = BulletMap::new();
            article_map.insert("https://a", vec![format!("{} point", config)]);
            let briefing = BriefingHistory {
                id: None,
                user_id: "user-1".to_string(),
                briefing_config_id: config.to_string(),
                articles: vec![Article::new("a", "https://a").with_topic("Health")],
                summary: HistorySummary { summary: "Health:\npoint".to_string(), article_map },
                created_at: Some(now - Duration::hours(hours)),
                updated_at: None,
            };
            storage.save_briefing(&briefing).await.unwrap();
        }

        let latest = storage.latest_briefing("user-1", None).await.unwrap().unwrap();
        assert_eq!(latest.briefing_config_id, "cfg-b");
        let latest = storage.latest_briefing("user-1", Some("cfg-a")).await.unwrap().unwrap();
        assert_eq!(latest.summary.article_map.get("https://a").unwrap(), ["cfg-a point".to_string()]);
        assert_eq!(latest.articles[0].topic.as_deref(), Some("Health"));
        assert_eq!(storage.list_briefings("user-1").await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_sqlite_search_summary() {
        let temp_dir = tempdir().unwrap();
        let storage = SQLiteStorage::new_with_path(&temp_dir.path().join("test.db")).await.unwrap();
        let day = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let search = NewsSearch {
            id: None,
            user_id: "user-1".to_string(),
            topic: "Health".to_string(),
            start_date: day - Duration::days(7),
            end_date: day,
            articles: vec![Article::new("a", "https://a")],
            overall_summary: None,
            created_at: None,
        };

        let saved = storage.save_search(&search).await.unwrap();
        let id = saved.id.unwrap();
        storage.update_search_summary(&id, "Flu fell.").await.unwrap();

        let latest = storage.latest_search("user-1").await.unwrap().unwrap();
        assert_eq!(latest.overall_summary.as_deref(), Some("Flu fell."));
        assert_eq!(latest.start_date, NaiveDate::from_ymd_opt(2024, 3, 3).unwrap());

        storage.delete_search(&id).await.unwrap();
        assert!(storage.list_searches("user-1").await.unwrap().is_empty());
    }
}
