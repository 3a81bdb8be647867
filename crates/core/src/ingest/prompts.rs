use serde::{Deserialize, Serialize};

pub fn latest_news_prompt(subject: &str, max: usize) -> String {
    format!(
        "Get the latest {max} news articles about {subject} cryptocurrency. \
         Provide a brief summary of each article focusing on market impact and sentiment."
    )
}

pub fn search_prompt(subject: &str, keywords: &str) -> String {
    format!(
        "Search for recent news about {subject} cryptocurrency containing keywords: {keywords}. \
         Provide relevant articles that match these topics and explain their significance."
    )
}

/// Free-text questions the provider answers verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CommentaryKind {
    MarketSentiment { subject: String, window: String },
    TrendForecast { subject: String },
    MarketMovingEvents { subject: String },
    PriceCorrelation { subject: String },
    Compare { subjects: Vec<String> },
}

impl CommentaryKind {
    /// Resolves a route slug such as `sentiment` or `forecast` for one subject.
    ///
    /// `window` only matters for market sentiment and defaults to `default_window`.
    pub fn from_slug(
        slug: &str,
        subject: &str,
        window: Option<&str>,
        default_window: &str,
    ) -> anyhow::Result<Self> {
        let subject = subject.to_string();
        let kind = match slug.trim().to_ascii_lowercase().as_str() {
            "sentiment" | "market_sentiment" => CommentaryKind::MarketSentiment {
                subject,
                window: window
                    .filter(|w| !w.trim().is_empty())
                    .unwrap_or(default_window)
                    .to_string(),
            },
            "forecast" | "trend_forecast" => CommentaryKind::TrendForecast { subject },
            "events" | "market_moving_events" => CommentaryKind::MarketMovingEvents { subject },
            "correlation" | "price_correlation" => CommentaryKind::PriceCorrelation { subject },
            other => anyhow::bail!(
                "unknown commentary kind {other:?} (expected sentiment, forecast, events or correlation)"
            ),
        };
        Ok(kind)
    }

    pub fn prompt(&self) -> String {
        match self {
            CommentaryKind::MarketSentiment { subject, window } => format!(
                "Analyze the current market sentiment for {subject} cryptocurrency over the past {window}. \
                 Consider recent news, social media buzz, and market movements. \
                 Provide a comprehensive sentiment analysis with bullish/bearish indicators."
            ),
            CommentaryKind::TrendForecast { subject } => format!(
                "Provide a short-term trend forecast for {subject} cryptocurrency. \
                 Consider technical analysis, recent developments, market conditions, \
                 and institutional adoption. Give concrete price predictions if possible."
            ),
            CommentaryKind::MarketMovingEvents { subject } => format!(
                "Identify the most significant recent events affecting {subject} cryptocurrency. \
                 Include regulatory news, partnerships, technical upgrades, market movements, \
                 and any major announcements that could impact price."
            ),
            CommentaryKind::PriceCorrelation { subject } => format!(
                "Analyze the correlation between news sentiment and price movements for {subject}. \
                 Examine how positive and negative news has historically affected the price. \
                 Provide insights on sentiment-driven price movements and their reliability."
            ),
            CommentaryKind::Compare { subjects } => format!(
                "Compare the following cryptocurrencies: {}. \
                 Analyze their recent performance, market sentiment, adoption rates, \
                 technical developments, and investment potential. \
                 Provide a detailed comparison with pros and cons for each.",
                subjects.join(", ")
            ),
        }
    }

    /// Returned in place of an answer when the provider fails.
    pub fn unavailable_message(&self) -> &'static str {
        match self {
            CommentaryKind::MarketSentiment { .. } => {
                "Unable to analyze market sentiment at this time."
            }
            CommentaryKind::TrendForecast { .. } => "Unable to generate trend forecast at this time.",
            CommentaryKind::MarketMovingEvents { .. } => {
                "No significant market-moving events identified at this time."
            }
            CommentaryKind::PriceCorrelation { .. } => {
                "Unable to analyze sentiment-price correlation at this time."
            }
            CommentaryKind::Compare { .. } => "Unable to compare cryptocurrencies at this time.",
        }
    }
}
