pub mod lock;
pub mod memory;
pub mod news_items;

pub use memory::MemoryNewsStore;
pub use news_items::PgNewsStore;

use crate::domain::news::NewsItem;
use crate::domain::sentiment::SentimentLabel;
use anyhow::Context;
use chrono::{DateTime, Utc};

pub async fn migrate(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("sqlx migrations failed")?;
    Ok(())
}

/// Persistence for scored news items. Subject matching is case-insensitive.
#[async_trait::async_trait]
pub trait NewsStore: Send + Sync {
    /// Returns `false` when an item with the same (title, subject) already exists.
    async fn save(&self, item: &NewsItem) -> anyhow::Result<bool>;

    /// Newest first.
    async fn latest(&self, subject: &str, limit: usize) -> anyhow::Result<Vec<NewsItem>>;

    /// Items published in `[start, end]`, oldest first.
    async fn between(
        &self,
        subject: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> anyhow::Result<Vec<NewsItem>>;

    /// Newest first. Unscored items count as neutral.
    async fn by_label(&self, subject: &str, label: SentimentLabel)
        -> anyhow::Result<Vec<NewsItem>>;

    /// Case-insensitive substring match on title or description, newest first.
    async fn search(&self, subject: &str, keyword: &str) -> anyhow::Result<Vec<NewsItem>>;
}
