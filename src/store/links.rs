use anyhow::{Context, Result};

use super::Store;

impl Store {
    /// True if the link was already included in a previous digest.
    pub async fn is_known(&self, link: &str) -> Result<bool> {
        let conn = self.connection();
        let conn = conn.lock().await;
        let found: bool = conn
            .query_row(
                "SELECT count(*) > 0 FROM posted WHERE link = ?1",
                rusqlite::params![link],
                |row| row.get(0),
            )
            .context("Failed to query posted link")?;
        Ok(found)
    }

    /// Mark a link as posted. Idempotent.
    pub async fn record(&self, link: &str) -> Result<()> {
        let conn = self.connection();
        let conn = conn.lock().await;
        conn.execute(
            "INSERT OR IGNORE INTO posted (link) VALUES (?1)",
            rusqlite::params![link],
        )
        .context("Failed to record posted link")?;
        Ok(())
    }
}
