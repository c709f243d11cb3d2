use anyhow::Result;
use async_trait::async_trait;

use super::ProgressBackend;
use crate::db::Database;
use crate::models::ProgressRecord;

#[async_trait]
impl ProgressBackend for Database {
    async fn get(&self, card_id: &str) -> Result<Option<ProgressRecord>> {
        self.get_progress(card_id)
    }

    async fn put(&self, card_id: &str, record: &ProgressRecord) -> Result<()> {
        self.put_progress(card_id, record)
    }

    async fn clear(&self) -> Result<()> {
        let removed = self.clear_progress()?;
        tracing::debug!(removed, "Cleared persisted progress");
        Ok(())
    }
}
