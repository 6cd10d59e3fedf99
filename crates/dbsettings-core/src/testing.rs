//! Recording backend for unit tests

use crate::ports::SettingsBackend;
use crate::{Result, SettingsError};
use async_trait::async_trait;
use dbsettings_types::Setting;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    Fetch(Vec<String>),
    Insert {
        category: String,
        key: String,
        value: String,
    },
    Update {
        category: String,
        key: String,
        value: String,
    },
    DeleteCategory(String),
    DeleteKey {
        category: String,
        key: String,
    },
}

/// In-memory backend that logs every call
#[derive(Default)]
pub struct RecordingBackend {
    rows: Mutex<Vec<Setting>>,
    ops: Mutex<Vec<Op>>,
    fail_fetch: AtomicBool,
    fail_key: Mutex<Option<String>>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put a row in storage without logging an operation
    pub fn seed(&self, category: &str, key: &str, raw: &str) {
        self.rows.lock().unwrap().push(Setting::new(
            category.to_string(),
            key.to_string(),
            raw.to_string(),
            None,
        ));
    }

    pub fn fail_next_fetch(&self) {
        self.fail_fetch.store(true, Ordering::SeqCst);
    }

    /// Make every insert or update of `key` fail
    pub fn fail_writes_to(&self, key: &str) {
        *self.fail_key.lock().unwrap() = Some(key.to_string());
    }

    pub fn ops(&self) -> Vec<Op> {
        self.ops.lock().unwrap().clone()
    }

    pub fn count(&self, pred: impl Fn(&Op) -> bool) -> usize {
        self.ops.lock().unwrap().iter().filter(|op| pred(op)).count()
    }

    pub fn rows(&self) -> Vec<Setting> {
        self.rows.lock().unwrap().clone()
    }

    fn record(&self, op: Op) {
        self.ops.lock().unwrap().push(op);
    }

    fn check_write(&self, key: &str) -> Result<()> {
        match self.fail_key.lock().unwrap().as_deref() {
            Some(failing) if failing == key => {
                Err(SettingsError::Database(format!("write to {} failed", key)))
            }
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl SettingsBackend for RecordingBackend {
    async fn fetch(&self, categories: &[String]) -> Result<Vec<Setting>> {
        if self.fail_fetch.swap(false, Ordering::SeqCst) {
            return Err(SettingsError::Database("fetch failed".to_string()));
        }
        self.record(Op::Fetch(categories.to_vec()));
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| categories.contains(&r.category))
            .cloned()
            .collect())
    }

    async fn insert(
        &self,
        category: &str,
        key: &str,
        value: &str,
        actor: Option<&str>,
    ) -> Result<()> {
        self.check_write(key)?;
        self.record(Op::Insert {
            category: category.to_string(),
            key: key.to_string(),
            value: value.to_string(),
        });
        self.rows.lock().unwrap().push(Setting::new(
            category.to_string(),
            key.to_string(),
            value.to_string(),
            actor.map(str::to_string),
        ));
        Ok(())
    }

    async fn update(
        &self,
        category: &str,
        key: &str,
        value: &str,
        actor: Option<&str>,
    ) -> Result<()> {
        self.check_write(key)?;
        self.record(Op::Update {
            category: category.to_string(),
            key: key.to_string(),
            value: value.to_string(),
        });
        for row in self.rows.lock().unwrap().iter_mut() {
            if row.category == category && row.key == key {
                row.touch(value.to_string(), actor.map(str::to_string));
            }
        }
        Ok(())
    }

    async fn delete_category(&self, category: &str) -> Result<()> {
        self.record(Op::DeleteCategory(category.to_string()));
        self.rows.lock().unwrap().retain(|r| r.category != category);
        Ok(())
    }

    async fn delete_key(&self, category: &str, key: &str) -> Result<()> {
        self.record(Op::DeleteKey {
            category: category.to_string(),
            key: key.to_string(),
        });
        self.rows
            .lock()
            .unwrap()
            .retain(|r| !(r.category == category && r.key == key));
        Ok(())
    }
}
