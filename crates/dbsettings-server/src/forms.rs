//! Settings forms loaded from a YAML file

use dbsettings_core::form::validate_config;
use dbsettings_core::{FieldSpec, FormField, Result, SettingsError, SettingsObject};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Default, Deserialize)]
pub struct FormsFile {
    #[serde(default)]
    pub forms: Vec<FormDefinition>,
}

/// A settings object described entirely by configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FormDefinition {
    pub id: String,
    /// Defaults to the form id
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub fields: Vec<FieldSpec>,
}

impl FormDefinition {
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.id)
    }
}

impl SettingsObject for FormDefinition {
    fn settings_category(&self) -> &str {
        self.category.as_deref().unwrap_or(&self.id)
    }

    fn settings_form_config(&self) -> Vec<FormField> {
        self.fields.iter().cloned().map(FormField::from).collect()
    }
}

#[derive(Debug, Default)]
pub struct FormRegistry {
    forms: BTreeMap<String, FormDefinition>,
}

impl FormRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn load(path: &Path) -> Result<Self> {
        info!("Loading settings forms from {}", path.display());
        let content = tokio::fs::read_to_string(path).await?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let file: FormsFile = serde_yaml::from_str(content)?;

        let mut registry = Self::new();
        for form in file.forms {
            if let Err(e) = validate_config(&form.settings_form_config()) {
                // Still registered; building the form reports the error
                warn!("Settings form {} is misconfigured: {}", form.id, e);
            }
            if registry.forms.contains_key(&form.id) {
                return Err(SettingsError::Config(format!(
                    "Duplicate settings form id: {}",
                    form.id
                )));
            }
            registry.forms.insert(form.id.clone(), form);
        }

        info!("Registered {} settings forms", registry.forms.len());
        Ok(registry)
    }

    pub fn get(&self, id: &str) -> Result<&FormDefinition> {
        self.forms
            .get(id)
            .ok_or_else(|| SettingsError::FormNotFound(id.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &FormDefinition> {
        self.forms.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FORMS: &str = r#"
forms:
  - id: mail
    title: Mail
    fields:
      - name: host
        default: localhost
      - name: encryption
        input: dropdown
        options:
          - { value: tls, label: TLS }
  - id: branding
    category: site
"#;

    #[test]
    fn test_from_yaml() {
        let registry = FormRegistry::from_yaml(FORMS).unwrap();

        let mail = registry.get("mail").unwrap();
        assert_eq!(mail.settings_category(), "mail");
        assert_eq!(mail.title(), "Mail");
        assert_eq!(mail.settings_form_config().len(), 2);

        let branding = registry.get("branding").unwrap();
        assert_eq!(branding.settings_category(), "site");
        assert_eq!(branding.title(), "branding");

        assert!(matches!(
            registry.get("nope"),
            Err(SettingsError::FormNotFound(_))
        ));
        assert_eq!(registry.iter().count(), 2);
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let yaml = "forms:\n  - id: a\n  - id: a\n";
        assert!(matches!(
            FormRegistry::from_yaml(yaml),
            Err(SettingsError::Config(_))
        ));
    }
}
