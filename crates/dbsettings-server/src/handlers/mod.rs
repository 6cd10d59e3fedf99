//! HTTP handlers

pub mod forms;
pub mod health;
pub mod settings;

pub use health::health;
