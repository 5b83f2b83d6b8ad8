use async_trait::async_trait;
use log::info;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{AssistError, AssistResult};

/// Reply language used before any customer message has been translated.
pub const FALLBACK_SOURCE_LANGUAGE: &str = "en";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

// ─── Request / Response types ────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationResult {
    pub translated_text: String,
    pub source_language: String,
    pub target_language: String,
}

#[derive(Serialize)]
struct TranslateRequest<'a> {
    raw_text: &'a str,
    target_language: &'a str,
}

#[derive(Deserialize)]
struct TranslateResponse {
    translated_text: String,
    #[serde(default)]
    source_language: String,
}

#[async_trait]
pub trait Translate: Send + Sync {
    async fn translate(&self, text: &str, target_language: &str) -> AssistResult<TranslationResult>;
}

// ─── Translation client ──────────────────────────────────────────────

pub struct TranslationClient {
    http: reqwest::Client,
    endpoint: String,
}

impl TranslationClient {
    pub fn new(endpoint: impl Into<String>) -> AssistResult<Self> {
        let endpoint = endpoint.into();
        if endpoint.trim().is_empty() {
            return Err(AssistError::Translation(
                "no translation service configured".into(),
            ));
        }
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AssistError::Translation(e.to_string()))?;
        info!("Translation client ready ({})", endpoint);
        Ok(Self { http, endpoint })
    }
}

#[async_trait]
impl Translate for TranslationClient {
    async fn translate(&self, text: &str, target_language: &str) -> AssistResult<TranslationResult> {
        if text.trim().is_empty() {
            return Err(AssistError::Translation("nothing to translate".into()));
        }

        let resp = self
            .http
            .post(&self.endpoint)
            .json(&TranslateRequest {
                raw_text: text,
                target_language,
            })
            .send()
            .await
            .map_err(|e| AssistError::Translation(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AssistError::Translation(format_service_error(status, &body)));
        }

        let data: TranslateResponse = resp
            .json()
            .await
            .map_err(|e| AssistError::Translation(format!("unexpected response: {}", e)))?;

        Ok(TranslationResult {
            translated_text: data.translated_text,
            source_language: data.source_language,
            target_language: target_language.to_string(),
        })
    }
}

// ─── Error formatting ────────────────────────────────────────────────

fn format_service_error(status: reqwest::StatusCode, body: &str) -> String {
    match status.as_u16() {
        429 => "Rate limit exceeded, please wait".into(),
        503 => "Translation service unavailable".into(),
        _ => {
            let detail: String = body.chars().take(200).collect();
            format!("{} {}", status, detail).trim_end().to_string()
        }
    }
}
