use anyhow::{Context, Result};

use super::Store;

impl Store {
    /// Remember a chat as a broadcast destination. Idempotent.
    pub async fn register_chat(&self, chat_id: i64) -> Result<()> {
        let conn = self.connection();
        let conn = conn.lock().await;
        conn.execute(
            "INSERT OR IGNORE INTO chats (chat_id) VALUES (?1)",
            rusqlite::params![chat_id],
        )
        .context("Failed to register chat")?;
        Ok(())
    }

    /// All known broadcast destinations, in no particular order.
    pub async fn list_chats(&self) -> Result<Vec<i64>> {
        let conn = self.connection();
        let conn = conn.lock().await;
        let mut stmt = conn
            .prepare("SELECT chat_id FROM chats")
            .context("Failed to prepare chat query")?;
        let chats = stmt
            .query_map([], |row| row.get(0))
            .context("Failed to map rows")?
            .collect::<rusqlite::Result<Vec<i64>>>()
            .context("Failed to collect rows")?;
        Ok(chats)
    }
}
