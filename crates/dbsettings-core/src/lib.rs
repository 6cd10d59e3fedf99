//! dbsettings Core Library
//!
//! Settings store with a lazily loaded per-category cache, the storage port
//! it persists through, settings-backed objects and their HTML forms.

// Re-export pure types from dbsettings-types
pub use dbsettings_types::*;

pub mod codec;
pub mod error;
pub mod form;
pub mod object;
pub mod ports;
pub mod store;

#[cfg(test)]
mod testing;

pub use codec::{decode, decode_or_raw, encode, RawString};
pub use error::{Result, SettingsError};
pub use form::{parse_posted, FormField, FormModel, SettingsForm};
pub use object::{BoundSettings, SettingsObject};
pub use ports::SettingsBackend;
pub use store::SettingsStore;
