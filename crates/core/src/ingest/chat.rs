use crate::config::Settings;
use crate::ingest::error::ProviderDiagnosticsError;
use crate::ingest::prompts::{latest_news_prompt, search_prompt};
use crate::ingest::snippets::split_snippets;
use crate::ingest::types::{ChatRequest, ChatResponse};
use crate::ingest::NewsProvider;
use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.perplexity.ai";
const DEFAULT_MODEL: &str = "sonar-pro";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_RETRIES: u32 = 3;
const MAX_BACKOFF_SHIFT: u32 = 5;
const COMPLETIONS_PATH: &str = "/chat/completions";

/// Keyword searches are not bounded by the caller; this keeps one answer from flooding a listing.
const MAX_SEARCH_SNIPPETS: usize = 50;

pub const SOURCE_NAME: &str = "Perplexity AI";

/// News provider backed by an OpenAI/Perplexity-style chat completions endpoint.
#[derive(Debug, Clone)]
pub struct ChatCompletionsProvider {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    retries: u32,
}

impl ChatCompletionsProvider {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let api_key = settings.require_news_provider_api_key()?.to_string();
        let base_url = settings
            .news_provider_base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let model = settings
            .news_provider_model
            .clone()
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let timeout_secs = std::env::var("NEWS_PROVIDER_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let retries = std::env::var("NEWS_PROVIDER_RETRIES")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(DEFAULT_RETRIES)
            .max(1);

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build news provider http client")?;

        Ok(Self {
            http,
            base_url,
            api_key,
            model,
            retries,
        })
    }

    fn url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), COMPLETIONS_PATH)
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.api_key))
                .context("news provider api key is not a valid header value")?,
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    async fn complete_once(&self, prompt: &str) -> Result<String> {
        let req = ChatRequest::user(&self.model, prompt);
        let res = self
            .http
            .post(self.url())
            .headers(self.headers()?)
            .json(&req)
            .send()
            .await
            .context("news provider request failed")?;

        let status = res.status();
        let text = res
            .text()
            .await
            .context("failed to read news provider response body")?;

        if !status.is_success() {
            let raw_response_json = serde_json::from_str::<serde_json::Value>(&text).ok();
            return Err(ProviderDiagnosticsError {
                provider: SOURCE_NAME.to_string(),
                stage: "http",
                detail: format!("status={status}"),
                raw_body: Some(text),
                raw_response_json,
            }
            .into());
        }

        let parsed = serde_json::from_str::<ChatResponse>(&text)
            .with_context(|| format!("news provider response is not a chat completion: {text}"))?;

        match parsed.first_content() {
            Some(content) => Ok(content.to_string()),
            None => Err(ProviderDiagnosticsError {
                provider: SOURCE_NAME.to_string(),
                stage: "decode",
                detail: "response has no answer content".to_string(),
                raw_body: Some(text),
                raw_response_json: None,
            }
            .into()),
        }
    }

    /// Sends one prompt, retrying with exponential backoff (1s, 2s, ...).
    pub async fn complete(&self, prompt: &str) -> Result<String> {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            match self.complete_once(prompt).await {
                Ok(text) => return Ok(text),
                Err(err) => {
                    if attempt >= self.retries {
                        return Err(err);
                    }
                    let backoff = backoff_for(attempt);
                    tracing::warn!(attempt, ?backoff, error = %err, "news provider call failed; retrying");
                    tokio::time::sleep(backoff).await;
                }
            }
        }
    }
}

/// 1s, 2s, 4s, ... doubling per failed attempt, capped at 2^MAX_BACKOFF_SHIFT seconds.
fn backoff_for(attempt: u32) -> Duration {
    let shift = attempt.saturating_sub(1).min(MAX_BACKOFF_SHIFT);
    Duration::from_secs(1u64 << shift)
}

#[async_trait::async_trait]
impl NewsProvider for ChatCompletionsProvider {
    fn provider_name(&self) -> &str {
        SOURCE_NAME
    }

    async fn fetch_snippets(&self, subject: &str, max: usize) -> Result<Vec<String>> {
        let answer = self.complete(&latest_news_prompt(subject, max)).await?;
        let snippets = split_snippets(&answer, max);
        tracing::info!(subject, count = snippets.len(), "fetched news snippets");
        Ok(snippets)
    }

    async fn search_snippets(&self, subject: &str, keywords: &str) -> Result<Vec<String>> {
        let answer = self.complete(&search_prompt(subject, keywords)).await?;
        Ok(split_snippets(&answer, MAX_SEARCH_SNIPPETS))
    }

    async fn ask(&self, prompt: &str) -> Result<String> {
        self.complete(prompt).await
    }
}
