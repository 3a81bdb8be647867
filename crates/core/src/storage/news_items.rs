use crate::domain::news::NewsItem;
use crate::domain::sentiment::{SentimentLabel, SentimentScore};
use crate::storage::NewsStore;
use anyhow::Context;
use chrono::{DateTime, Utc};
use uuid::Uuid;

const SELECT_COLUMNS: &str = "SELECT title, description, subject, published_at, source, url, \
     sentiment_positive, sentiment_negative FROM news_items";

type NewsRow = (
    String,
    String,
    String,
    DateTime<Utc>,
    String,
    Option<String>,
    Option<f64>,
    Option<f64>,
);

/// [`NewsStore`] over the `news_items` table.
#[derive(Debug, Clone)]
pub struct PgNewsStore {
    pool: sqlx::PgPool,
}

impl PgNewsStore {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &sqlx::PgPool {
        &self.pool
    }

    async fn fetch(&self, sql: &str, subject: &str, what: &str) -> anyhow::Result<Vec<NewsItem>> {
        let rows: Vec<NewsRow> = sqlx::query_as(sql)
            .persistent(false)
            .bind(subject)
            .fetch_all(&self.pool)
            .await
            .with_context(|| format!("select news_items ({what}) failed for subject={subject}"))?;
        Ok(rows.into_iter().map(into_item).collect())
    }
}

#[async_trait::async_trait]
impl NewsStore for PgNewsStore {
    async fn save(&self, item: &NewsItem) -> anyhow::Result<bool> {
        let score = item.sentiment();
        let res = sqlx::query(
            "INSERT INTO news_items (id, title, description, subject, published_at, source, url, \
               sentiment_positive, sentiment_negative, sentiment_neutral, sentiment_compound, sentiment_label) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
             ON CONFLICT (title, subject) DO NOTHING",
        )
        .persistent(false)
        .bind(Uuid::new_v4())
        .bind(item.title())
        .bind(item.description())
        .bind(item.subject())
        .bind(item.published_at())
        .bind(item.source())
        .bind(item.url())
        .bind(score.map(SentimentScore::positive))
        .bind(score.map(SentimentScore::negative))
        .bind(score.map(SentimentScore::neutral))
        .bind(score.map(SentimentScore::compound))
        .bind(item.label().as_str())
        .execute(&self.pool)
        .await
        .context("insert news_items failed")?;

        Ok(res.rows_affected() == 1)
    }

    async fn latest(&self, subject: &str, limit: usize) -> anyhow::Result<Vec<NewsItem>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows: Vec<NewsRow> = sqlx::query_as(&format!(
            "{SELECT_COLUMNS} WHERE lower(subject) = lower($1) ORDER BY published_at DESC LIMIT $2"
        ))
        .persistent(false)
        .bind(subject)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .with_context(|| format!("select latest news_items failed for subject={subject}"))?;
        Ok(rows.into_iter().map(into_item).collect())
    }

    async fn between(
        &self,
        subject: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> anyhow::Result<Vec<NewsItem>> {
        let rows: Vec<NewsRow> = sqlx::query_as(&format!(
            "{SELECT_COLUMNS} WHERE lower(subject) = lower($1) \
             AND published_at >= $2 AND published_at <= $3 ORDER BY published_at ASC"
        ))
        .persistent(false)
        .bind(subject)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await
        .with_context(|| format!("select news_items in range failed for subject={subject}"))?;
        Ok(rows.into_iter().map(into_item).collect())
    }

    async fn by_label(
        &self,
        subject: &str,
        label: SentimentLabel,
    ) -> anyhow::Result<Vec<NewsItem>> {
        let sql = format!(
            "{SELECT_COLUMNS} WHERE lower(subject) = lower($1) AND sentiment_label = '{}' \
             ORDER BY published_at DESC",
            label.as_str()
        );
        self.fetch(&sql, subject, label.as_str()).await
    }

    async fn search(&self, subject: &str, keyword: &str) -> anyhow::Result<Vec<NewsItem>> {
        let pattern = format!("%{}%", escape_like(keyword.trim()));
        let rows: Vec<NewsRow> = sqlx::query_as(&format!(
            "{SELECT_COLUMNS} WHERE lower(subject) = lower($1) \
             AND (title ILIKE $2 ESCAPE '\\' OR description ILIKE $2 ESCAPE '\\') \
             ORDER BY published_at DESC"
        ))
        .persistent(false)
        .bind(subject)
        .bind(pattern)
        .fetch_all(&self.pool)
        .await
        .with_context(|| format!("search news_items failed for subject={subject}"))?;
        Ok(rows.into_iter().map(into_item).collect())
    }
}

fn into_item(row: NewsRow) -> NewsItem {
    let (title, description, subject, published_at, source, url, positive, negative) = row;
    let sentiment = match (positive, negative) {
        (Some(p), Some(n)) => Some(SentimentScore::from_sums(p, n)),
        _ => None,
    };
    NewsItem::new(title, description, subject, published_at, source, url).with_sentiment(sentiment)
}

/// Escapes LIKE wildcards so a keyword matches literally.
fn escape_like(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
