//! Settings Repository
//!
//! Key-value rows in the `settings` table.

use async_trait::async_trait;
use rusqlite::{params, OptionalExtension};

use super::store::SqliteStore;
use super::traits::SettingsOperations;
use crate::domain::{DomainResult, Settings, SettingsPatch};

#[async_trait]
impl SettingsOperations for SqliteStore {
    async fn get_settings(&self) -> DomainResult<Settings> {
        self.state
            .read(|db| {
                let mut settings = Settings::default();
                let theme: Option<String> = db
                    .conn()
                    .query_row(
                        "SELECT value FROM settings WHERE key = ?1",
                        params!["themeColor"],
                        |row| row.get(0),
                    )
                    .optional()?;
                if let Some(theme) = theme {
                    settings.theme_color = theme;
                }
                Ok(settings)
            })
            .await
    }

    async fn set_settings(&self, patch: &SettingsPatch) -> DomainResult<()> {
        self.state
            .write(|db| {
                let mut stmt = db.conn().prepare(
                    "INSERT INTO settings (key, value) VALUES (?1, ?2)
                     ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                )?;
                for (key, value) in patch.entries() {
                    stmt.execute(params![key, value])?;
                }
                Ok(())
            })
            .await
    }
}
