//! dbsettings Types - Pure type definitions
//!
//! This crate contains only pure data types with no async runtime dependencies:
//! the persisted setting row and the declarative form field descriptors.

pub mod form;
pub mod setting;

pub use form::*;
pub use setting::*;
