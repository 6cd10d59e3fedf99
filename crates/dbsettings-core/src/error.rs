//! Error types for dbsettings

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SettingsError>;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid form config: {0}")]
    InvalidFormConfig(String),

    #[error("Form not found: {0}")]
    FormNotFound(String),

    #[error("Config error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for SettingsError {
    fn from(e: serde_json::Error) -> Self {
        SettingsError::Serialization(e.to_string())
    }
}

impl From<serde_yaml::Error> for SettingsError {
    fn from(e: serde_yaml::Error) -> Self {
        SettingsError::Config(e.to_string())
    }
}
