//! OpenAI chat-completions summarizer, the cascade's primary stage.

use async_trait::async_trait;
use newsdeck_core::{Provider, ProviderError};
use serde::Deserialize;

use super::Article;
use crate::fetch::{request_error, status_error};

const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
const MODEL: &str = "gpt-4o-mini";
const MAX_TOKENS: u32 = 160;

pub struct OpenAiSummarizer {
    http: reqwest::Client,
    api_key: Option<String>,
    endpoint: String,
}

impl OpenAiSummarizer {
    pub fn new(http: reqwest::Client, api_key: Option<String>) -> Self {
        Self { http, api_key, endpoint: DEFAULT_ENDPOINT.to_string() }
    }
}

/// Relevant slice of the chat-completions response.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    #[serde(default)]
    content: Option<String>,
}

fn extract_text(response: ChatResponse) -> Option<String> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .map(|text| text.trim().to_string())
}

#[async_trait]
impl Provider<Article, String> for OpenAiSummarizer {
    fn name(&self) -> &str {
        "openai"
    }

    async fn attempt(&self, article: &Article) -> Result<String, ProviderError> {
        let api_key = self
            .api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| ProviderError::MissingCredentials("NEWSDECK_OPENAI_API_KEY".to_string()))?;

        let body = serde_json::json!({
            "model": MODEL,
            "max_tokens": MAX_TOKENS,
            "temperature": 0.3,
            "messages": [{
                "role": "user",
                "content": format!(
                    "Summarize this tech news item in two plain sentences.\n\nTitle: {}\nURL: {}",
                    article.title, article.url
                ),
            }],
        });

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(request_error)?;

        if let Some(e) = status_error(response.status()) {
            return Err(e);
        }

        let bytes = response.bytes().await.map_err(request_error)?;
        let parsed: ChatResponse =
            serde_json::from_slice(&bytes).map_err(|e| ProviderError::Parse(e.to_string()))?;

        extract_text(parsed).ok_or_else(|| ProviderError::InvalidPayload("no completion content".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE_JSON: &str = r#"{
        "id": "chatcmpl-1",
        "choices": [
            {
                "index": 0,
                "message": {
                    "role": "assistant",
                    "content": "  A concise two-sentence summary. It covers the item.  "
                },
                "finish_reason": "stop"
            }
        ]
    }"#;

    #[test]
    fn test_extract_text_trims() {
        let parsed: ChatResponse = serde_json::from_str(FIXTURE_JSON).unwrap();
        assert_eq!(
            extract_text(parsed).unwrap(),
            "A concise two-sentence summary. It covers the item."
        );
    }

    #[test]
    fn test_empty_choices_yields_none() {
        let parsed: ChatResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        assert!(extract_text(parsed).is_none());
    }

    #[tokio::test]
    async fn test_missing_key_is_configuration_error() {
        let provider = OpenAiSummarizer::new(reqwest::Client::new(), None);
        let article = Article { title: "T".to_string(), url: "https://example.com".to_string() };
        let result = provider.attempt(&article).await;
        assert!(matches!(result, Err(ProviderError::MissingCredentials(_))));
    }

    #[tokio::test]
    async fn test_empty_key_is_configuration_error() {
        let provider = OpenAiSummarizer::new(reqwest::Client::new(), Some(String::new()));
        let article = Article { title: "T".to_string(), url: "https://example.com".to_string() };
        let result = provider.attempt(&article).await;
        assert!(matches!(result, Err(ProviderError::MissingCredentials(_))));
    }
}
