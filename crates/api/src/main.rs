use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use coinpulse_core::config::{parse_subject_list, AnalyticsOptions, Settings};
use coinpulse_core::domain::analytics::{AnalyticsReport, AnalyticsSummary};
use coinpulse_core::domain::news::NewsItem;
use coinpulse_core::domain::outcome::Outcome;
use coinpulse_core::domain::sentiment::{SentimentLabel, SentimentScore};
use coinpulse_core::ingest::{ChatCompletionsProvider, CommentaryKind, NewsProvider};
use coinpulse_core::sentiment::{Lexicon, ScoreCache, SentimentScorer};
use coinpulse_core::service::NewsAnalyticsService;
use coinpulse_core::storage::{NewsStore, PgNewsStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let lexicon = Arc::new(Lexicon::from_settings(&settings)?);
    let cache = ScoreCache::new(SentimentScorer::new(lexicon));
    let options = AnalyticsOptions::from_env();

    let store = connect_db(&settings)
        .await
        .map(|pool| Arc::new(PgNewsStore::new(pool)) as Arc<dyn NewsStore>);

    let provider: Option<Arc<dyn NewsProvider>> =
        match ChatCompletionsProvider::from_settings(&settings) {
            Ok(p) => Some(Arc::new(p)),
            Err(e) => {
                tracing::warn!(error = %e, "news provider unavailable; serving stored news only");
                None
            }
        };

    let service = NewsAnalyticsService::new(cache, provider, store, options);
    tracing::info!(?service, "analytics service ready");

    let app = router(AppState { service }).layer(TraceLayer::new_for_http());

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3000);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!(%addr, "api listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn connect_db(settings: &Settings) -> Option<PgPool> {
    match settings.require_database_url() {
        Ok(db_url) => match sqlx::postgres::PgPoolOptions::new()
            .max_connections(5)
            .connect(db_url)
            .await
        {
            Ok(pool) => match coinpulse_core::storage::migrate(&pool).await {
                Ok(()) => Some(pool),
                Err(e) => {
                    sentry_anyhow::capture_anyhow(&e);
                    tracing::error!(error = %e, "db migrations failed; starting API in degraded mode");
                    None
                }
            },
            Err(e) => {
                let err = anyhow::Error::new(e);
                sentry_anyhow::capture_anyhow(&err);
                tracing::error!(error = %err, "db connect failed; starting API in degraded mode");
                None
            }
        },
        Err(e) => {
            tracing::warn!(error = %e, "DATABASE_URL missing; starting API in degraded mode");
            None
        }
    }
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/sentiment", post(post_sentiment))
        .route("/analytics", post(post_analytics))
        .route("/news/:subject/latest", get(get_latest))
        .route("/news/:subject/analytics", get(get_analytics))
        .route("/news/:subject/report", get(get_report))
        .route("/news/:subject/positive", get(get_positive))
        .route("/news/:subject/negative", get(get_negative))
        .route("/news/:subject/search", get(get_search))
        .route("/news/:subject/commentary/:kind", get(get_commentary))
        .route("/compare", get(get_compare))
        .with_state(state)
}

#[derive(Debug, Clone)]
struct AppState {
    service: NewsAnalyticsService,
}

#[derive(Debug, Serialize)]
struct Health {
    status: &'static str,
    provider: bool,
    store: bool,
}

async fn healthz(State(state): State<AppState>) -> Json<Health> {
    let provider = state.service.has_provider();
    let store = state.service.has_store();
    Json(Health {
        status: if provider && store { "ok" } else { "degraded" },
        provider,
        store,
    })
}

#[derive(Debug, Deserialize)]
struct SentimentRequest {
    text: String,
}

#[derive(Debug, Serialize)]
struct SentimentResponse {
    score: SentimentScore,
    label: SentimentLabel,
}

async fn post_sentiment(
    State(state): State<AppState>,
    Json(req): Json<SentimentRequest>,
) -> Json<SentimentResponse> {
    let score = state.service.score(&req.text).into_value();
    Json(SentimentResponse {
        score,
        label: score.label(),
    })
}

#[derive(Debug, Deserialize)]
struct AnalyticsRequest {
    subject: String,
    window: Option<String>,
    #[serde(default)]
    items: Vec<AnalyticsItemInput>,
}

/// Item as posted by a client; the subject comes from the enclosing request.
#[derive(Debug, Deserialize)]
struct AnalyticsItemInput {
    title: String,
    #[serde(default)]
    description: String,
    published_at: DateTime<Utc>,
    #[serde(default)]
    source: String,
    url: Option<String>,
    sentiment: Option<SentimentScore>,
}

impl AnalyticsItemInput {
    fn into_item(self, subject: &str) -> NewsItem {
        NewsItem::new(
            self.title,
            self.description,
            subject,
            self.published_at,
            self.source,
            self.url,
        )
        .with_sentiment(self.sentiment)
    }
}

async fn post_analytics(
    State(state): State<AppState>,
    Json(req): Json<AnalyticsRequest>,
) -> Result<Json<AnalyticsSummary>, StatusCode> {
    let subject = normalize_subject(&req.subject)?;
    let items = req
        .items
        .into_iter()
        .map(|i| i.into_item(&subject))
        .collect();
    Ok(Json(state.service.summarize(
        &subject,
        req.window.as_deref(),
        items,
    )))
}

#[derive(Debug, Deserialize)]
struct LimitQuery {
    limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct WindowQuery {
    window: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    keywords: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CompareQuery {
    subjects: Option<String>,
}

async fn get_latest(
    State(state): State<AppState>,
    Path(subject): Path<String>,
    Query(q): Query<LimitQuery>,
) -> Result<Json<Outcome<Vec<NewsItem>>>, StatusCode> {
    let subject = normalize_subject(&subject)?;
    Ok(Json(state.service.latest_news(&subject, q.limit).await))
}

async fn get_analytics(
    State(state): State<AppState>,
    Path(subject): Path<String>,
    Query(q): Query<WindowQuery>,
) -> Result<Json<Outcome<AnalyticsSummary>>, StatusCode> {
    let subject = normalize_subject(&subject)?;
    Ok(Json(
        state
            .service
            .analyze(&subject, q.window.as_deref())
            .await,
    ))
}

async fn get_report(
    State(state): State<AppState>,
    Path(subject): Path<String>,
    Query(q): Query<WindowQuery>,
) -> Result<Json<Outcome<AnalyticsReport>>, StatusCode> {
    let subject = normalize_subject(&subject)?;
    Ok(Json(state.service.report(&subject, q.window.as_deref()).await))
}

async fn get_positive(
    State(state): State<AppState>,
    Path(subject): Path<String>,
    Query(q): Query<LimitQuery>,
) -> Result<Json<Outcome<Vec<NewsItem>>>, StatusCode> {
    let subject = normalize_subject(&subject)?;
    Ok(Json(state.service.positive_news(&subject, q.limit).await))
}

async fn get_negative(
    State(state): State<AppState>,
    Path(subject): Path<String>,
    Query(q): Query<LimitQuery>,
) -> Result<Json<Outcome<Vec<NewsItem>>>, StatusCode> {
    let subject = normalize_subject(&subject)?;
    Ok(Json(state.service.negative_news(&subject, q.limit).await))
}

async fn get_search(
    State(state): State<AppState>,
    Path(subject): Path<String>,
    Query(q): Query<SearchQuery>,
) -> Result<Json<Outcome<Vec<NewsItem>>>, StatusCode> {
    let subject = normalize_subject(&subject)?;
    let keywords = q
        .keywords
        .as_deref()
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .ok_or(StatusCode::BAD_REQUEST)?;
    Ok(Json(state.service.search_news(&subject, keywords).await))
}

async fn get_commentary(
    State(state): State<AppState>,
    Path((subject, kind)): Path<(String, String)>,
    Query(q): Query<WindowQuery>,
) -> Result<Json<Outcome<String>>, StatusCode> {
    let subject = normalize_subject(&subject)?;
    let default_window = state.service.options().default_window();
    let kind = CommentaryKind::from_slug(&kind, &subject, q.window.as_deref(), &default_window)
        .map_err(|e| {
            tracing::debug!(error = %e, "rejected commentary kind");
            StatusCode::NOT_FOUND
        })?;
    Ok(Json(state.service.commentary(&kind).await))
}

async fn get_compare(
    State(state): State<AppState>,
    Query(q): Query<CompareQuery>,
) -> Result<Json<Outcome<String>>, StatusCode> {
    let subjects = parse_subject_list(q.subjects.as_deref().unwrap_or_default());
    if subjects.len() < 2 {
        return Err(StatusCode::BAD_REQUEST);
    }
    let kind = CommentaryKind::Compare { subjects };
    Ok(Json(state.service.commentary(&kind).await))
}

/// Trimmed and upper-cased; blank subjects are rejected.
fn normalize_subject(raw: &str) -> Result<String, StatusCode> {
    let subject = raw.trim().to_uppercase();
    if subject.is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }
    Ok(subject)
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

fn init_sentry(settings: &Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn subjects_are_normalized() {
        assert_eq!(normalize_subject(" btc ").unwrap(), "BTC");
        assert_eq!(normalize_subject("  "), Err(StatusCode::BAD_REQUEST));
    }

    #[test]
    fn analytics_request_takes_subject_from_envelope() {
        let req: AnalyticsRequest = serde_json::from_value(json!({
            "subject": "eth",
            "items": [
                {"title": "ETH upgrade ships", "published_at": "2026-02-01T00:00:00Z"}
            ]
        }))
        .unwrap();

        assert!(req.window.is_none());
        let item = req.items.into_iter().next().unwrap().into_item("ETH");
        assert_eq!(item.subject(), "ETH");
        assert!(item.sentiment().is_none());
    }

    #[test]
    fn posted_scores_are_rederived() {
        let req: AnalyticsRequest = serde_json::from_value(json!({
            "subject": "btc",
            "items": [{
                "title": "BTC pumps",
                "published_at": "2026-02-01T00:00:00Z",
                "sentiment": {"positive": -3.0, "negative": 0.0, "neutral": 1.0, "compound": 5.0}
            }]
        }))
        .unwrap();

        let item = req.items.into_iter().next().unwrap().into_item("BTC");
        assert_eq!(item.compound(), Some(0.0));
        assert_eq!(item.label(), SentimentLabel::Neutral);
    }
}
