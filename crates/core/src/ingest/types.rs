use serde::{Deserialize, Serialize};

/// Request body for an OpenAI/Perplexity-style `/chat/completions` endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f64,
    pub top_p: f64,
    pub stream: bool,
}

impl ChatRequest {
    pub fn user(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.into(),
            }],
            temperature: 0.2,
            top_p: 0.9,
            stream: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice {
    pub message: ChatMessage,
}

impl ChatResponse {
    /// Text of the first choice, if it has any non-blank content.
    pub fn first_content(&self) -> Option<&str> {
        self.choices
            .first()
            .map(|c| c.message.content.as_str())
            .filter(|s| !s.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_serializes_single_user_message() {
        let req = ChatRequest::user("sonar-pro", "hello");
        let v = serde_json::to_value(&req).unwrap();
        assert_eq!(v["model"], "sonar-pro");
        assert_eq!(v["messages"], json!([{"role": "user", "content": "hello"}]));
        assert_eq!(v["stream"], false);
    }

    #[test]
    fn response_ignores_unknown_fields() {
        let v = json!({
            "id": "abc",
            "citations": ["https://example.com"],
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "Bitcoin rallies"}}]
        });
        let parsed: ChatResponse = serde_json::from_value(v).unwrap();
        assert_eq!(parsed.first_content(), Some("Bitcoin rallies"));
    }

    #[test]
    fn blank_or_missing_choices_have_no_content() {
        let empty: ChatResponse = serde_json::from_value(json!({})).unwrap();
        assert_eq!(empty.first_content(), None);

        let blank: ChatResponse = serde_json::from_value(json!({
            "choices": [{"message": {"role": "assistant", "content": "  "}}]
        }))
        .unwrap();
        assert_eq!(blank.first_content(), None);
    }
}
