use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use coinpulse_core::config::{AnalyticsOptions, Settings};
use coinpulse_core::domain::news::NewsItem;
use coinpulse_core::ingest::{ChatCompletionsProvider, NewsProvider};
use coinpulse_core::sentiment::{Lexicon, ScoreCache, SentimentScorer};
use coinpulse_core::service::NewsAnalyticsService;
use coinpulse_core::storage::lock::{release_subject_lock, try_acquire_subject_lock};
use coinpulse_core::storage::{MemoryNewsStore, NewsStore, PgNewsStore};

#[derive(Debug, Parser)]
#[command(name = "coinpulse_worker")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Fetch, score and store news for the tracked subjects once.
    Poll {
        /// Subject to poll; repeatable. Defaults to NEWS_TRACKED_SUBJECTS.
        #[arg(long = "subject")]
        subjects: Vec<String>,

        /// Snippets requested per subject.
        #[arg(long, default_value_t = 5)]
        limit: usize,

        /// Do everything except writing to the database.
        #[arg(long)]
        dry_run: bool,
    },

    /// Score one text and print the result as JSON.
    Score { text: String },

    /// Print an analytics summary as JSON.
    Analyze {
        #[arg(long)]
        subject: String,

        /// Window descriptor such as "24 hours" or "7 days".
        #[arg(long)]
        window: Option<String>,

        /// JSON array of news items to summarize offline instead of querying live sources.
        #[arg(long)]
        input: Option<PathBuf>,
    },
}

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

    let args = Args::parse();

    let lexicon = Arc::new(Lexicon::from_settings(&settings)?);
    let cache = ScoreCache::new(SentimentScorer::new(lexicon));
    let options = AnalyticsOptions::from_env();

    let res = match args.command {
        Command::Poll {
            subjects,
            limit,
            dry_run,
        } => poll(&settings, cache, options, subjects, limit, dry_run).await,
        Command::Score { text } => {
            let score = cache.score(&text);
            print_json(&serde_json::json!({ "score": score, "label": score.label() }))
        }
        Command::Analyze {
            subject,
            window,
            input,
        } => analyze(&settings, cache, options, &subject, window.as_deref(), input).await,
    };

    if let Err(err) = &res {
        sentry_anyhow::capture_anyhow(err);
        tracing::error!(error = %err, "worker run failed");
    }
    res
}

async fn poll(
    settings: &Settings,
    cache: ScoreCache,
    options: AnalyticsOptions,
    subjects: Vec<String>,
    limit: usize,
    dry_run: bool,
) -> anyhow::Result<()> {
    let subjects = if subjects.is_empty() {
        options.tracked_subjects.clone()
    } else {
        subjects.iter().map(|s| s.trim().to_uppercase()).collect()
    };
    anyhow::ensure!(!subjects.is_empty(), "no subjects to poll");

    let provider: Arc<dyn NewsProvider> = Arc::new(ChatCompletionsProvider::from_settings(settings)?);

    if dry_run {
        let service = NewsAnalyticsService::new(
            cache,
            Some(provider),
            Some(Arc::new(MemoryNewsStore::new()) as Arc<dyn NewsStore>),
            options,
        );
        for subject in &subjects {
            let items = service.poll(subject, limit).await?;
            log_new_items(subject, &items);
            tracing::info!(subject, dry_run = true, fetched = items.len(), "poll finished (dry-run)");
        }
        return Ok(());
    }

    let db_url = settings.require_database_url()?;
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(db_url)
        .await
        .context("connect DATABASE_URL failed")?;

    coinpulse_core::storage::migrate(&pool).await?;

    let store: Arc<dyn NewsStore> = Arc::new(PgNewsStore::new(pool.clone()));
    let service = NewsAnalyticsService::new(cache, Some(provider), Some(store), options);

    let mut failures = 0usize;
    for subject in &subjects {
        let mut conn = pool.acquire().await.context("acquire db connection failed")?;

        if !try_acquire_subject_lock(&mut conn, subject).await? {
            tracing::warn!(subject, "subject lock not acquired; another poll in progress");
            continue;
        }

        match service.poll(subject, limit).await {
            Ok(items) => {
                log_new_items(subject, &items);
                tracing::info!(subject, inserted = items.len(), "poll finished");
            }
            Err(err) => {
                failures += 1;
                sentry_anyhow::capture_anyhow(&err);
                tracing::error!(subject, error = %err, "poll failed");
            }
        }

        let _ = release_subject_lock(&mut conn, subject).await;
    }

    anyhow::ensure!(
        failures == 0,
        "poll failed for {failures} of {} subjects",
        subjects.len()
    );
    Ok(())
}

async fn analyze(
    settings: &Settings,
    cache: ScoreCache,
    options: AnalyticsOptions,
    subject: &str,
    window: Option<&str>,
    input: Option<PathBuf>,
) -> anyhow::Result<()> {
    let subject = subject.trim().to_uppercase();
    anyhow::ensure!(!subject.is_empty(), "--subject must be non-empty");

    if let Some(path) = input {
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let items: Vec<NewsItem> = serde_json::from_str(&text)
            .with_context(|| format!("{} is not a JSON array of news items", path.display()))?;

        let service = NewsAnalyticsService::new(cache, None, None, options);
        let summary = service.summarize(&subject, window, items);
        return print_json(&summary);
    }

    let provider = ChatCompletionsProvider::from_settings(settings)
        .map(|p| Arc::new(p) as Arc<dyn NewsProvider>)
        .map_err(|e| tracing::warn!(error = %e, "news provider unavailable"))
        .ok();

    let store = match settings.require_database_url() {
        Ok(db_url) => {
            let pool = sqlx::postgres::PgPoolOptions::new()
                .max_connections(2)
                .connect(db_url)
                .await
                .context("connect DATABASE_URL failed")?;
            coinpulse_core::storage::migrate(&pool).await?;
            Some(Arc::new(PgNewsStore::new(pool)) as Arc<dyn NewsStore>)
        }
        Err(_) => None,
    };

    let service = NewsAnalyticsService::new(cache, provider, store, options);
    let outcome = service.analyze(&subject, window).await;
    if let Some(reason) = outcome.fallback_reason() {
        tracing::warn!(%subject, reason, "summary built from fallback data");
    }
    print_json(&outcome)
}

fn log_new_items(subject: &str, items: &[NewsItem]) {
    for item in items {
        tracing::info!(
            subject,
            title = item.title(),
            label = %item.label(),
            compound = item.compound().unwrap_or(0.0),
            "new news item"
        );
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("serialize output failed")?;
    println!("{out}");
    Ok(())
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

    #[test]
    fn parses_poll_flags() {
        let args = Args::try_parse_from([
            "coinpulse_worker",
            "poll",
            "--subject",
            "btc",
            "--subject",
            "sol",
            "--limit",
            "3",
            "--dry-run",
        ])
        .unwrap();

        match args.command {
            Command::Poll {
                subjects,
                limit,
                dry_run,
            } => {
                assert_eq!(subjects, vec!["btc", "sol"]);
                assert_eq!(limit, 3);
                assert!(dry_run);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_analyze_with_input() {
        let args = Args::try_parse_from([
            "coinpulse_worker",
            "analyze",
            "--subject",
            "ETH",
            "--window",
            "7 days",
            "--input",
            "items.json",
        ])
        .unwrap();

        match args.command {
            Command::Analyze {
                subject,
                window,
                input,
            } => {
                assert_eq!(subject, "ETH");
                assert_eq!(window.as_deref(), Some("7 days"));
                assert_eq!(input, Some(PathBuf::from("items.json")));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
