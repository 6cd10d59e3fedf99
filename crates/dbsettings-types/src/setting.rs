//! Setting row types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Decoded settings of one category, keyed by setting name
pub type SettingsMap = BTreeMap<String, Value>;

/// A persisted setting row
///
/// `value` holds the JSON encoding of the setting, or an arbitrary string
/// written by something other than this library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Setting {
    pub category: String,
    pub key: String,
    pub value: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub created_by: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
    pub updated_by: Option<String>,
}

impl Setting {
    /// Create a freshly inserted row stamped with the current time
    pub fn new(category: String, key: String, value: String, created_by: Option<String>) -> Self {
        Self {
            category,
            key,
            value: Some(value),
            created_at: Some(Utc::now()),
            created_by,
            updated_at: None,
            updated_by: None,
        }
    }

    /// Replace the stored value and stamp the update metadata
    pub fn touch(&mut self, value: String, updated_by: Option<String>) {
        self.value = Some(value);
        self.updated_at = Some(Utc::now());
        self.updated_by = updated_by;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_and_touch() {
        let mut row = Setting::new(
            "mail".to_string(),
            "host".to_string(),
            "\"a\"".to_string(),
            Some("42".to_string()),
        );
        assert!(row.created_at.is_some());
        assert_eq!(row.created_by.as_deref(), Some("42"));
        assert!(row.updated_at.is_none());

        row.touch("\"b\"".to_string(), None);
        assert_eq!(row.value.as_deref(), Some("\"b\""));
        assert!(row.updated_at.is_some());
        assert_eq!(row.created_by.as_deref(), Some("42"));
    }
}
