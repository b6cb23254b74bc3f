//! Gemini generateContent summarizer, the cascade's secondary stage.

use async_trait::async_trait;
use newsdeck_core::{Provider, ProviderError};
use serde::Deserialize;

use super::Article;
use crate::fetch::{request_error, status_error};

const DEFAULT_ENDPOINT: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent";

pub struct GeminiSummarizer {
    http: reqwest::Client,
    api_key: Option<String>,
    endpoint: String,
}

impl GeminiSummarizer {
    pub fn new(http: reqwest::Client, api_key: Option<String>) -> Self {
        Self { http, api_key, endpoint: DEFAULT_ENDPOINT.to_string() }
    }
}

/// Relevant slice of the generateContent response.
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

fn extract_text(response: GenerateResponse) -> Option<String> {
    response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content.parts.into_iter().next())
        .and_then(|part| part.text)
        .map(|text| text.trim().to_string())
}

#[async_trait]
impl Provider<Article, String> for GeminiSummarizer {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn attempt(&self, article: &Article) -> Result<String, ProviderError> {
        let api_key = self
            .api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| ProviderError::MissingCredentials("NEWSDECK_GEMINI_API_KEY".to_string()))?;

        let body = serde_json::json!({
            "contents": [{
                "parts": [{
                    "text": format!(
                        "Summarize this tech news item in two plain sentences.\n\nTitle: {}\nURL: {}",
                        article.title, article.url
                    ),
                }],
            }],
        });

        let response = self
            .http
            .post(&self.endpoint)
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await
            .map_err(request_error)?;

        if let Some(e) = status_error(response.status()) {
            return Err(e);
        }

        let bytes = response.bytes().await.map_err(request_error)?;
        let parsed: GenerateResponse =
            serde_json::from_slice(&bytes).map_err(|e| ProviderError::Parse(e.to_string()))?;

        extract_text(parsed).ok_or_else(|| ProviderError::InvalidPayload("no candidate content".to_string()))
    }
}
