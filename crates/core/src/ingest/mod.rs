//! Upstream text source: a chat-style model that answers news questions in free text.

pub mod chat;
pub mod error;
pub mod prompts;
pub mod snippets;
pub mod types;

pub use chat::ChatCompletionsProvider;
pub use error::ProviderDiagnosticsError;
pub use prompts::CommentaryKind;

#[async_trait::async_trait]
pub trait NewsProvider: Send + Sync {
    /// Label stored as the `source` of items built from this provider's snippets.
    fn provider_name(&self) -> &str;

    /// Up to `max` short news snippets about `subject`.
    async fn fetch_snippets(&self, subject: &str, max: usize) -> anyhow::Result<Vec<String>>;

    async fn search_snippets(&self, subject: &str, keywords: &str) -> anyhow::Result<Vec<String>>;

    /// Free-form question; the answer text is returned as is.
    async fn ask(&self, prompt: &str) -> anyhow::Result<String>;
}
