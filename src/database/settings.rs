// file: src/database/settings.rs
use anyhow::Result;
use sqlx::SqlitePool;

use crate::models::Setting;

pub async fn get(pool: &SqlitePool, key: &str) -> Result<Option<String>> {
    let setting = sqlx::query_as::<_, Setting>("SELECT key, value FROM settings WHERE key = ?")
        .bind(key)
        .fetch_optional(pool)
        .await?;

    Ok(setting.map(|setting| setting.value))
}

pub async fn set(pool: &SqlitePool, key: &str, value: &str) -> Result<()> {
    sqlx::query(
        "INSERT INTO settings (key, value) VALUES (?, ?) ON CONFLICT(key) DO UPDATE SET value = excluded.value",
    )
    .bind(key)
    .bind(value)
    .execute(pool)
    .await?;

    Ok(())
}
