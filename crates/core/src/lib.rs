pub mod analytics;
pub mod domain;
pub mod ingest;
pub mod sentiment;
pub mod service;
pub mod storage;
pub mod time;

pub mod config {
    use anyhow::Context;

    #[derive(Debug, Clone, Default)]
    pub struct Settings {
        pub database_url: Option<String>,
        pub sentry_dsn: Option<String>,
        pub news_provider_base_url: Option<String>,
        pub news_provider_api_key: Option<String>,
        pub news_provider_model: Option<String>,
        pub lexicon_path: Option<String>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Ok(Self {
                database_url: non_empty_var("DATABASE_URL"),
                sentry_dsn: non_empty_var("SENTRY_DSN"),
                news_provider_base_url: non_empty_var("NEWS_PROVIDER_BASE_URL"),
                news_provider_api_key: non_empty_var("NEWS_PROVIDER_API_KEY"),
                news_provider_model: non_empty_var("NEWS_PROVIDER_MODEL"),
                lexicon_path: non_empty_var("LEXICON_PATH"),
            })
        }

        pub fn require_database_url(&self) -> anyhow::Result<&str> {
            self.database_url
                .as_deref()
                .context("DATABASE_URL is required")
        }

        pub fn require_news_provider_base_url(&self) -> anyhow::Result<&str> {
            self.news_provider_base_url
                .as_deref()
                .context("NEWS_PROVIDER_BASE_URL is required")
        }

        pub fn require_news_provider_api_key(&self) -> anyhow::Result<&str> {
            self.news_provider_api_key
                .as_deref()
                .context("NEWS_PROVIDER_API_KEY is required")
        }
    }

    fn non_empty_var(key: &str) -> Option<String> {
        std::env::var(key).ok().filter(|s| !s.trim().is_empty())
    }

    /// Knobs for the news analytics service.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct AnalyticsOptions {
        /// Items returned by positive/negative listings when the caller gives no limit.
        pub default_article_limit: usize,

        /// Upper bound on snippets requested from the provider in one call.
        pub max_articles_per_request: usize,

        /// Window used when the descriptor is absent or unrecognized.
        pub default_window_hours: u32,

        /// Stored items returned when the provider is unavailable.
        pub fallback_history_limit: usize,

        pub top_items_limit: usize,
        pub topic_limit: usize,

        /// Subjects the worker polls by default.
        pub tracked_subjects: Vec<String>,
    }

    impl Default for AnalyticsOptions {
        fn default() -> Self {
            Self {
                default_article_limit: 10,
                max_articles_per_request: 20,
                default_window_hours: 24,
                fallback_history_limit: 10,
                top_items_limit: 3,
                topic_limit: 10,
                tracked_subjects: vec!["BTC".to_string(), "ETH".to_string()],
            }
        }
    }

    impl AnalyticsOptions {
        pub fn from_env() -> Self {
            let mut out = Self::default();

            if let Ok(s) = std::env::var("NEWS_DEFAULT_ARTICLE_LIMIT") {
                if let Ok(n) = s.parse::<usize>() {
                    out.default_article_limit = n;
                }
            }

            if let Ok(s) = std::env::var("NEWS_MAX_ARTICLES_PER_REQUEST") {
                if let Ok(n) = s.parse::<usize>() {
                    out.max_articles_per_request = n;
                }
            }

            if let Ok(s) = std::env::var("NEWS_DEFAULT_WINDOW_HOURS") {
                if let Ok(n) = s.parse::<u32>() {
                    out.default_window_hours = n;
                }
            }

            if let Ok(s) = std::env::var("NEWS_TRACKED_SUBJECTS") {
                let subjects = parse_subject_list(&s);
                if !subjects.is_empty() {
                    out.tracked_subjects = subjects;
                }
            }

            out
        }

        /// Descriptor for the default window, e.g. "24 hours".
        pub fn default_window(&self) -> String {
            format!("{} hours", self.default_window_hours)
        }
    }

    /// Comma-separated list, trimmed and upper-cased, blanks dropped.
    pub fn parse_subject_list(s: &str) -> Vec<String> {
        s.split(',')
            .map(|p| p.trim().to_uppercase())
            .filter(|p| !p.is_empty())
            .collect()
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn defaults_match_documented_values() {
            let o = AnalyticsOptions::default();
            assert_eq!(o.default_article_limit, 10);
            assert_eq!(o.max_articles_per_request, 20);
            assert_eq!(o.default_window(), "24 hours");
            assert_eq!(o.top_items_limit, 3);
            assert_eq!(o.topic_limit, 10);
            assert_eq!(o.tracked_subjects, vec!["BTC", "ETH"]);
        }

        #[test]
        fn subject_list_parsing() {
            assert_eq!(parse_subject_list(" btc, ,Eth ,sol"), vec!["BTC", "ETH", "SOL"]);
            assert!(parse_subject_list(" , ").is_empty());
        }

        #[test]
        fn missing_settings_are_reported_by_name() {
            let s = Settings::default();
            let err = s.require_database_url().unwrap_err();
            assert!(err.to_string().contains("DATABASE_URL"));
            assert!(s.require_news_provider_base_url().is_err());
        }
    }
}
