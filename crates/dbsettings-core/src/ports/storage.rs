//! Storage trait for persistence

use crate::Result;
use async_trait::async_trait;
use dbsettings_types::Setting;

/// Row-level settings persistence
///
/// `value` arguments are already encoded. `actor` is recorded in the
/// created/updated-by columns.
#[async_trait]
pub trait SettingsBackend: Send + Sync {
    /// Fetch every row whose category is in `categories`
    async fn fetch(&self, categories: &[String]) -> Result<Vec<Setting>>;

    async fn insert(&self, category: &str, key: &str, value: &str, actor: Option<&str>)
        -> Result<()>;

    async fn update(&self, category: &str, key: &str, value: &str, actor: Option<&str>)
        -> Result<()>;

    /// Delete every row of a category
    async fn delete_category(&self, category: &str) -> Result<()>;

    async fn delete_key(&self, category: &str, key: &str) -> Result<()>;
}
