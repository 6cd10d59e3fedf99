//! Settings store
//!
//! Lazily loads whole categories from a [`SettingsBackend`] and keeps them in
//! memory for the lifetime of the store. Every write goes to the backend
//! first and is then mirrored into the cache.

use crate::codec::{decode_or_raw, encode};
use crate::ports::SettingsBackend;
use crate::Result;
use dbsettings_types::SettingsMap;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Settings store owning its cache
///
/// A store is meant to live for one unit of work (typically a request).
/// A cached category is never reloaded, so long-lived stores will not see
/// writes made through other stores.
pub struct SettingsStore {
    backend: Arc<dyn SettingsBackend>,
    actor: Option<String>,
    items: HashMap<String, SettingsMap>,
}

impl SettingsStore {
    pub fn new(backend: Arc<dyn SettingsBackend>) -> Self {
        Self {
            backend,
            actor: None,
            items: HashMap::new(),
        }
    }

    /// Record `actor` as the author of every write made through this store
    pub fn with_actor(mut self, actor: Option<String>) -> Self {
        self.actor = actor;
        self
    }

    /// Create a store and load `categories` up front
    pub async fn preloaded(
        backend: Arc<dyn SettingsBackend>,
        actor: Option<String>,
        categories: &[String],
    ) -> Result<Self> {
        let mut store = Self::new(backend).with_actor(actor);
        if !categories.is_empty() {
            store.load(categories).await?;
        }
        Ok(store)
    }

    /// Whether a category is in the cache
    pub fn is_loaded(&self, category: &str) -> bool {
        self.items.contains_key(category)
    }

    /// Load categories that are not cached yet with a single backend fetch
    pub async fn load<S: AsRef<str>>(&mut self, categories: &[S]) -> Result<()> {
        let mut pending: Vec<String> = Vec::new();
        for category in categories {
            let category = category.as_ref();
            if !self.items.contains_key(category) && !pending.iter().any(|p| p == category) {
                pending.push(category.to_string());
            }
        }

        if pending.is_empty() {
            return Ok(());
        }

        debug!("Loading settings categories: {:?}", pending);
        let rows = self.backend.fetch(&pending).await?;

        for category in &pending {
            self.items.insert(category.clone(), SettingsMap::new());
        }
        for row in rows {
            let value = row.value.as_deref().map(decode_or_raw).unwrap_or(Value::Null);
            self.items
                .entry(row.category)
                .or_default()
                .insert(row.key, value);
        }

        Ok(())
    }

    /// Get a single setting, or `default` if it is unset or null
    pub async fn get(
        &mut self,
        category: &str,
        key: &str,
        default: Option<Value>,
    ) -> Result<Option<Value>> {
        self.load(&[category]).await?;

        Ok(self
            .items
            .get(category)
            .and_then(|m| m.get(key))
            .filter(|v| !v.is_null())
            .cloned()
            .or(default))
    }

    /// Get every setting of a category, or `default` if there are none
    pub async fn get_all(&mut self, category: &str, default: SettingsMap) -> Result<SettingsMap> {
        self.load(&[category]).await?;

        match self.items.get(category) {
            Some(map) if !map.is_empty() => Ok(map.clone()),
            _ => Ok(default),
        }
    }

    /// Get several settings at once
    ///
    /// Keys without a value fall back to the matching entry of `defaults`,
    /// then to null.
    pub async fn get_many<S: AsRef<str>>(
        &mut self,
        category: &str,
        keys: &[S],
        defaults: Option<&SettingsMap>,
    ) -> Result<SettingsMap> {
        self.load(&[category]).await?;

        let cached = self.items.get(category);
        let mut result = SettingsMap::new();
        for key in keys {
            let key = key.as_ref();
            let value = cached
                .and_then(|m| m.get(key))
                .filter(|v| !v.is_null())
                .or_else(|| defaults.and_then(|d| d.get(key)))
                .cloned()
                .unwrap_or(Value::Null);
            result.insert(key.to_string(), value);
        }

        Ok(result)
    }

    /// Save a single setting, inserting or updating the row as needed
    pub async fn set(&mut self, category: &str, key: &str, value: Value) -> Result<()> {
        let encoded = encode(&value)?;

        self.load(&[category]).await?;

        let exists = self
            .items
            .get(category)
            .map(|m| m.contains_key(key))
            .unwrap_or(false);

        if exists {
            debug!("Updating setting {}.{}", category, key);
            self.backend
                .update(category, key, &encoded, self.actor.as_deref())
                .await?;
        } else {
            debug!("Inserting setting {}.{}", category, key);
            self.backend
                .insert(category, key, &encoded, self.actor.as_deref())
                .await?;
        }

        self.items
            .entry(category.to_string())
            .or_default()
            .insert(key.to_string(), value);

        Ok(())
    }

    /// Save several settings, one row at a time
    ///
    /// Stops at the first failure; settings saved before it stay saved.
    pub async fn set_many(&mut self, category: &str, values: SettingsMap) -> Result<()> {
        for (key, value) in values {
            self.set(category, &key, value).await?;
        }
        Ok(())
    }

    /// Delete every setting of a category
    pub async fn remove_all(&mut self, category: &str) -> Result<()> {
        debug!("Removing settings category {}", category);
        self.backend.delete_category(category).await?;
        self.items.remove(category);
        Ok(())
    }

    /// Delete a single setting
    pub async fn remove(&mut self, category: &str, key: &str) -> Result<()> {
        debug!("Removing setting {}.{}", category, key);
        self.backend.delete_key(category, key).await?;
        if let Some(map) = self.items.get_mut(category) {
            map.remove(key);
        }
        Ok(())
    }

    /// Delete several settings, one row at a time
    pub async fn remove_many<S: AsRef<str>>(&mut self, category: &str, keys: &[S]) -> Result<()> {
        for key in keys {
            self.remove(category, key.as_ref()).await?;
        }
        Ok(())
    }
}
