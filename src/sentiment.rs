//! 感情分類
//!
//! Gemini の generateContent API でレビュー本文を Positive / Negative / Neutral に分類する。

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ScraperConfig;
use crate::error::ScraperError;
use crate::review::Sentiment;
use crate::traits::SentimentLabeler;

const LABEL_TIMEOUT_SECS: u64 = 20;

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateResponse {
    fn first_text(&self) -> Option<&str> {
        self.candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .first()?
            .text
            .as_deref()
    }
}

fn prompt(text: &str) -> String {
    format!(
        "Analyze the sentiment of this book review: '{}'. Return 'Positive', 'Negative', or 'Neutral'.",
        text
    )
}

/// Gemini API による分類
pub struct GeminiLabeler {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: String,
}

impl GeminiLabeler {
    pub fn new(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self, ScraperError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(LABEL_TIMEOUT_SECS))
            .build()
            .map_err(|e| ScraperError::Environment(format!("HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key: api_key.into(),
        })
    }

    /// 設定に API キーがあれば作成
    pub fn from_config(config: &ScraperConfig) -> Result<Option<Self>, ScraperError> {
        config
            .gemini_api_key
            .as_ref()
            .map(|key| Self::new(&config.gemini_endpoint, &config.gemini_model, key))
            .transpose()
    }

    fn url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.endpoint, self.model
        )
    }
}

#[async_trait]
impl SentimentLabeler for GeminiLabeler {
    async fn classify(&self, text: &str) -> Result<Sentiment, ScraperError> {
        let prompt = prompt(text);
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: &prompt }],
            }],
        };

        let response = self
            .client
            .post(self.url())
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| ScraperError::Labeling(e.without_url().to_string()))?;

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| ScraperError::Labeling(format!("malformed response: {}", e.without_url())))?;

        let answer = parsed
            .first_text()
            .ok_or_else(|| ScraperError::Labeling("response contained no text".to_string()))?;
        debug!("Gemini answered {:?}", answer);

        Sentiment::from_model_text(answer)
            .ok_or_else(|| ScraperError::Labeling(format!("unrecognised label {:?}", answer.trim())))
    }
}

/// 常に Neutral を返す（APIキー未設定時やテスト用）
#[derive(Debug, Clone, Copy, Default)]
pub struct NeutralLabeler;

#[async_trait]
impl SentimentLabeler for NeutralLabeler {
    async fn classify(&self, _text: &str) -> Result<Sentiment, ScraperError> {
        Ok(Sentiment::Neutral)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const MODEL_PATH: &str = "/v1beta/models/gemini-2.0-flash:generateContent";

    fn answer(text: &str) -> serde_json::Value {
        json!({
            "candidates": [{ "content": { "parts": [{ "text": text }], "role": "model" } }]
        })
    }

    async fn labeler(server: &MockServer) -> GeminiLabeler {
        GeminiLabeler::new(server.uri(), "gemini-2.0-flash", "test-key").unwrap()
    }

    #[tokio::test]
    async fn test_classify_positive() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(MODEL_PATH))
            .and(query_param("key", "test-key"))
            .and(body_string_contains("Analyze the sentiment of this book review"))
            .respond_with(ResponseTemplate::new(200).set_body_json(answer("Positive\n")))
            .expect(1)
            .mount(&server)
            .await;

        let labeler = labeler(&server).await;
        assert_eq!(
            labeler.classify("great book").await.unwrap(),
            Sentiment::Positive
        );
    }

    #[tokio::test]
    async fn test_http_error_degrades_to_neutral() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let labeler = labeler(&server).await;
        assert!(matches!(
            labeler.classify("text").await,
            Err(ScraperError::Labeling(_))
        ));
        assert_eq!(labeler.label("text").await, Sentiment::Neutral);
    }

    #[tokio::test]
    async fn test_error_message_hides_api_key() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = labeler(&server).await.classify("text").await.unwrap_err();
        assert!(!err.to_string().contains("test-key"));
    }

    #[tokio::test]
    async fn test_malformed_and_empty_responses() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
            .mount(&server)
            .await;

        let labeler = labeler(&server).await;
        assert!(labeler.classify("text").await.is_err());
        assert_eq!(labeler.label("text").await, Sentiment::Neutral);
    }

    #[tokio::test]
    async fn test_unrecognised_label_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(answer("Mixed feelings")))
            .mount(&server)
            .await;

        let labeler = labeler(&server).await;
        assert!(labeler.classify("text").await.is_err());
    }

    #[tokio::test]
    async fn test_neutral_labeler() {
        assert_eq!(NeutralLabeler.label("anything").await, Sentiment::Neutral);
    }

    #[test]
    fn test_from_config_requires_key() {
        let config = ScraperConfig::default();
        assert!(GeminiLabeler::from_config(&config).unwrap().is_none());

        let config = config.with_gemini_api_key("k");
        assert!(GeminiLabeler::from_config(&config).unwrap().is_some());
    }
}
