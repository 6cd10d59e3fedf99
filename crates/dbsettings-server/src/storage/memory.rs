//! In-memory settings backend using DashMap (no database required)

use async_trait::async_trait;
use dashmap::DashMap;
use dbsettings_core::{Result, Setting, SettingsBackend};

/// Settings rows held in process memory, lost on restart
pub struct MemoryBackend {
    rows: DashMap<(String, String), Setting>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self {
            rows: DashMap::new(),
        }
    }

    /// Number of stored rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SettingsBackend for MemoryBackend {
    async fn fetch(&self, categories: &[String]) -> Result<Vec<Setting>> {
        let mut rows: Vec<Setting> = self
            .rows
            .iter()
            .filter(|entry| categories.contains(&entry.key().0))
            .map(|entry| entry.value().clone())
            .collect();
        rows.sort_by(|a, b| (&a.category, &a.key).cmp(&(&b.category, &b.key)));
        Ok(rows)
    }

    async fn insert(
        &self,
        category: &str,
        key: &str,
        value: &str,
        actor: Option<&str>,
    ) -> Result<()> {
        self.rows.insert(
            (category.to_string(), key.to_string()),
            Setting::new(
                category.to_string(),
                key.to_string(),
                value.to_string(),
                actor.map(str::to_string),
            ),
        );
        Ok(())
    }

    async fn update(
        &self,
        category: &str,
        key: &str,
        value: &str,
        actor: Option<&str>,
    ) -> Result<()> {
        if let Some(mut row) = self.rows.get_mut(&(category.to_string(), key.to_string())) {
            row.touch(value.to_string(), actor.map(str::to_string));
        }
        Ok(())
    }

    async fn delete_category(&self, category: &str) -> Result<()> {
        self.rows.retain(|(c, _), _| c != category);
        Ok(())
    }

    async fn delete_key(&self, category: &str, key: &str) -> Result<()> {
        self.rows.remove(&(category.to_string(), key.to_string()));
        Ok(())
    }
}
