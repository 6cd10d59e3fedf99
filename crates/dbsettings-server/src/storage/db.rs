//! SQLite settings backend (embedded, no external dependencies)

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dbsettings_core::{Setting, SettingsBackend, SettingsError};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use std::sync::Arc;

pub struct SqliteBackend {
    pool: Arc<SqlitePool>,
}

impl SqliteBackend {
    pub async fn new(database_path: &str) -> Result<Self> {
        tracing::info!("Opening SQLite database at: {}", database_path);

        // Create parent directory if needed
        if let Some(parent) = std::path::Path::new(database_path).parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.with_context(|| {
                    format!("Failed to create database directory: {}", parent.display())
                })?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(database_path)
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .with_context(|| {
                format!("Failed to connect to SQLite database at: {}", database_path)
            })?;

        Self::create_schema(&pool)
            .await
            .context("Failed to create settings table")?;

        tracing::info!("Database initialization complete");

        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    async fn create_schema(pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS setting (
                category TEXT NOT NULL,
                "key" TEXT NOT NULL,
                value TEXT,
                created_at DATETIME,
                created_by TEXT,
                updated_at DATETIME,
                updated_by TEXT,
                PRIMARY KEY (category, "key")
            )
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }
}

fn db_error(e: sqlx::Error) -> SettingsError {
    SettingsError::Database(e.to_string())
}

#[async_trait]
impl SettingsBackend for SqliteBackend {
    async fn fetch(&self, categories: &[String]) -> dbsettings_core::Result<Vec<Setting>> {
        if categories.is_empty() {
            return Ok(Vec::new());
        }

        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(
            r#"SELECT category, "key", value, created_at, created_by, updated_at, updated_by
            FROM setting WHERE category IN ("#,
        );
        let mut separated = query.separated(", ");
        for category in categories {
            separated.push_bind(category.as_str());
        }
        separated.push_unseparated(")");

        let rows: Vec<SettingRow> = query
            .build_query_as()
            .fetch_all(&*self.pool)
            .await
            .map_err(db_error)?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    async fn insert(
        &self,
        category: &str,
        key: &str,
        value: &str,
        actor: Option<&str>,
    ) -> dbsettings_core::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO setting (category, "key", value, created_at, created_by)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT (category, "key") DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.created_at,
                updated_by = excluded.created_by
            "#,
        )
        .bind(category)
        .bind(key)
        .bind(value)
        .bind(Utc::now())
        .bind(actor)
        .execute(&*self.pool)
        .await
        .map_err(db_error)?;

        Ok(())
    }

    async fn update(
        &self,
        category: &str,
        key: &str,
        value: &str,
        actor: Option<&str>,
    ) -> dbsettings_core::Result<()> {
        sqlx::query(
            r#"
            UPDATE setting SET value = ?1, updated_at = ?2, updated_by = ?3
            WHERE category = ?4 AND "key" = ?5
            "#,
        )
        .bind(value)
        .bind(Utc::now())
        .bind(actor)
        .bind(category)
        .bind(key)
        .execute(&*self.pool)
        .await
        .map_err(db_error)?;

        Ok(())
    }

    async fn delete_category(&self, category: &str) -> dbsettings_core::Result<()> {
        sqlx::query(
            r#"
            DELETE FROM setting WHERE category = ?1
            "#,
        )
        .bind(category)
        .execute(&*self.pool)
        .await
        .map_err(db_error)?;

        Ok(())
    }

    async fn delete_key(&self, category: &str, key: &str) -> dbsettings_core::Result<()> {
        sqlx::query(
            r#"
            DELETE FROM setting WHERE category = ?1 AND "key" = ?2
            "#,
        )
        .bind(category)
        .bind(key)
        .execute(&*self.pool)
        .await
        .map_err(db_error)?;

        Ok(())
    }
}

// Helper struct for sqlx query_as
#[derive(sqlx::FromRow)]
struct SettingRow {
    category: String,
    key: String,
    value: Option<String>,
    created_at: Option<DateTime<Utc>>,
    created_by: Option<String>,
    updated_at: Option<DateTime<Utc>>,
    updated_by: Option<String>,
}

impl From<SettingRow> for Setting {
    fn from(r: SettingRow) -> Self {
        Setting {
            category: r.category,
            key: r.key,
            value: r.value,
            created_at: r.created_at,
            created_by: r.created_by,
            updated_at: r.updated_at,
            updated_by: r.updated_by,
        }
    }
}
