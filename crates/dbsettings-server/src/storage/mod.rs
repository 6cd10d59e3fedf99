//! Storage layer
//!
//! SQLite (embedded) for persistent settings, DashMap for a throwaway
//! in-memory store.

pub mod db;
pub mod memory;

pub use db::SqliteBackend;
pub use memory::MemoryBackend;
