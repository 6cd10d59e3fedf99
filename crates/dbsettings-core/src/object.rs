//! Settings-backed objects
//!
//! An object owning one settings category. The store is passed in
//! explicitly; [`SettingsObject::settings`] binds it to the object's
//! category.

use crate::form::FormField;
use crate::store::SettingsStore;
use crate::Result;
use dbsettings_types::SettingsMap;
use serde_json::Value;

pub trait SettingsObject: Send + Sync {
    /// Category holding this object's settings
    fn settings_category(&self) -> &str;

    /// Fields to show on the settings form, in display order
    fn settings_form_config(&self) -> Vec<FormField> {
        Vec::new()
    }

    /// Bind `store` to this object's category
    fn settings<'s>(&self, store: &'s mut SettingsStore) -> BoundSettings<'s> {
        BoundSettings::new(store, self.settings_category())
    }
}

/// A store with the category pre-filled
pub struct BoundSettings<'s> {
    store: &'s mut SettingsStore,
    category: String,
}

impl<'s> BoundSettings<'s> {
    pub fn new(store: &'s mut SettingsStore, category: impl Into<String>) -> Self {
        Self {
            store,
            category: category.into(),
        }
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub async fn get_setting(&mut self, key: &str, default: Option<Value>) -> Result<Option<Value>> {
        self.store.get(&self.category, key, default).await
    }

    pub async fn get_settings(&mut self, default: SettingsMap) -> Result<SettingsMap> {
        self.store.get_all(&self.category, default).await
    }

    pub async fn get_settings_many<S: AsRef<str>>(
        &mut self,
        keys: &[S],
        defaults: Option<&SettingsMap>,
    ) -> Result<SettingsMap> {
        self.store.get_many(&self.category, keys, defaults).await
    }

    pub async fn set_setting(&mut self, key: &str, value: Value) -> Result<()> {
        self.store.set(&self.category, key, value).await
    }

    pub async fn set_settings(&mut self, values: SettingsMap) -> Result<()> {
        self.store.set_many(&self.category, values).await
    }

    pub async fn remove_setting(&mut self, key: &str) -> Result<()> {
        self.store.remove(&self.category, key).await
    }

    pub async fn remove_settings(&mut self) -> Result<()> {
        self.store.remove_all(&self.category).await
    }

    pub async fn remove_settings_many<S: AsRef<str>>(&mut self, keys: &[S]) -> Result<()> {
        self.store.remove_many(&self.category, keys).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Op, RecordingBackend};
    use serde_json::json;
    use std::sync::Arc;

    struct Mailer;

    impl SettingsObject for Mailer {
        fn settings_category(&self) -> &str {
            "mail"
        }
    }

    #[tokio::test]
    async fn test_bound_settings_use_category() {
        let backend = Arc::new(RecordingBackend::new());
        let mut store = SettingsStore::new(backend.clone());
        let mailer = Mailer;

        let mut settings = mailer.settings(&mut store);
        assert_eq!(settings.category(), "mail");
        settings.set_setting("host", json!("smtp")).await.unwrap();
        assert_eq!(
            settings.get_setting("host", None).await.unwrap(),
            Some(json!("smtp"))
        );
        assert_eq!(
            settings.get_setting("port", Some(json!(25))).await.unwrap(),
            Some(json!(25))
        );

        let mut more = SettingsMap::new();
        more.insert("port".to_string(), json!(587));
        more.insert("user".to_string(), json!("bob"));
        settings.set_settings(more).await.unwrap();

        let many = settings
            .get_settings_many(&["port", "missing"], None)
            .await
            .unwrap();
        assert_eq!(many["port"], json!(587));
        assert_eq!(many["missing"], Value::Null);

        settings.remove_settings_many(&["user", "port"]).await.unwrap();
        settings.remove_setting("host").await.unwrap();
        assert!(settings
            .get_settings(SettingsMap::new())
            .await
            .unwrap()
            .is_empty());

        settings.remove_settings().await.unwrap();
        assert!(backend
            .ops()
            .iter()
            .any(|op| *op == Op::DeleteCategory("mail".to_string())));
        assert!(mailer.settings_form_config().is_empty());
    }
}
