use serde_json::Value;

/// Provider failure that keeps the raw upstream body around for diagnostics.
///
/// Travels inside `anyhow::Error`; recover it with `downcast_ref::<ProviderDiagnosticsError>()`.
#[derive(Debug, Clone, thiserror::Error)]
#[error("news provider error (provider={provider}, stage={stage}): {detail}")]
pub struct ProviderDiagnosticsError {
    pub provider: String,
    pub stage: &'static str,
    pub detail: String,
    pub raw_body: Option<String>,
    pub raw_response_json: Option<Value>,
}
