use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use anyhow::Result;
use async_trait::async_trait;

use super::ProgressBackend;
use crate::models::ProgressRecord;

/// Process-local progress storage.
///
/// Used as the fallback when the persistent backend is unavailable; its
/// contents are lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    records: Mutex<HashMap<String, ProgressRecord>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn records(&self) -> MutexGuard<'_, HashMap<String, ProgressRecord>> {
        // A poisoned map still holds valid records; keep using it.
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn read(&self, card_id: &str) -> Option<ProgressRecord> {
        self.records().get(card_id).copied()
    }

    pub fn write(&self, card_id: &str, record: ProgressRecord) {
        self.records().insert(card_id.to_string(), record);
    }

    pub fn wipe(&self) {
        self.records().clear();
    }

    pub fn len(&self) -> usize {
        self.records().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ProgressBackend for MemoryBackend {
    async fn get(&self, card_id: &str) -> Result<Option<ProgressRecord>> {
        Ok(self.read(card_id))
    }

    async fn put(&self, card_id: &str, record: &ProgressRecord) -> Result<()> {
        self.write(card_id, *record);
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.wipe();
        Ok(())
    }
}
