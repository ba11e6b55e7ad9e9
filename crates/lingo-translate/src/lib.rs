//! # lingo-translate
//!
//! Adapter over the Gemini `generateContent` REST endpoint that turns a
//! message into a naturally translated rendition for a differing-locale
//! recipient.
//!
//! Failure semantics are the whole point: network error, timeout, non-2xx
//! status, malformed or empty response all degrade to returning the input
//! text unchanged.  Translation failure must never block message delivery,
//! so the public API is infallible and logs failures at `warn`.  One
//! attempt per message, no retry.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use lingo_shared::locale::language_for;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const MODEL: &str = "gemini-2.0-flash-exp";

/// Upper bound on one translation round-trip.  On expiry the original text
/// is returned instead of holding up the send.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Everything the prompt needs to know about the recipient and sender.
#[derive(Debug, Clone)]
pub struct TranslationRequest {
    /// Raw text to translate (non-empty).
    pub text: String,
    /// Recipient locale key, e.g. `"USA"`.  Unknown keys target English.
    pub target_nationality: String,
    pub target_gender: String,
    pub target_age: u32,
    /// Sender display name embedded in the instruction.
    pub sender_name: String,
}

#[derive(Error, Debug)]
enum TranslateError {
    #[error("no API key configured")]
    MissingApiKey,

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("response contained no text")]
    EmptyResponse,
}

/// Gemini REST client with locale-aware prompting.
pub struct Translator {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl Translator {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Point the adapter at a different endpoint.  Tests use an unreachable
    /// address to exercise the fallback path.
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            http,
            api_key: api_key.into(),
            base_url: base_url.into(),
        }
    }

    /// Translate `request.text` for its recipient, returning the original
    /// text unchanged on any failure.
    pub async fn translate(&self, request: &TranslationRequest) -> String {
        match self.generate(&build_prompt(request)).await {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "translation failed, falling back to original text");
                request.text.clone()
            }
        }
    }

    /// Name the language of `text` in English, or `"Unknown"` on failure.
    pub async fn detect_language(&self, text: &str) -> String {
        let prompt = format!(
            "Detect the language of this text and return only the language name \
             in English (e.g., \"Korean\", \"Vietnamese\", \"English\"): \"{text}\""
        );
        match self.generate(&prompt).await {
            Ok(language) => language,
            Err(e) => {
                warn!(error = %e, "language detection failed");
                "Unknown".to_string()
            }
        }
    }

    async fn generate(&self, prompt: &str) -> Result<String, TranslateError> {
        if self.api_key.is_empty() {
            return Err(TranslateError::MissingApiKey);
        }

        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, MODEL, self.api_key
        );
        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        };

        let response: GenerateContentResponse = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let text = response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or(TranslateError::EmptyResponse)?;

        Ok(text)
    }
}

/// Translation instruction embedding politeness-level guidance derived from
/// the recipient's age and gender.
fn build_prompt(request: &TranslationRequest) -> String {
    let target_language = language_for(&request.target_nationality);
    let gender_text = if request.target_gender == "male" {
        "남성"
    } else {
        "여성"
    };

    format!(
        "You are a professional translator. Translate the following message naturally.\n\
         \n\
         Original message from {sender}: \"{text}\"\n\
         \n\
         Target language: {language}\n\
         Target recipient: {age}세 {gender}\n\
         \n\
         Rules:\n\
         1. Translate naturally, not word-by-word\n\
         2. Use appropriate politeness level for the recipient's age\n\
         3. Keep the original meaning and emotion\n\
         4. If already in the target language, return as-is\n\
         5. Only return the translated text, nothing else\n\
         \n\
         Translated message:",
        sender = request.sender_name,
        text = request.text,
        language = target_language,
        age = request.target_age,
        gender = gender_text,
    )
}

// ─── Wire types for the generateContent endpoint ───

#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Content,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> TranslationRequest {
        TranslationRequest {
            text: "안녕".into(),
            target_nationality: "USA".into(),
            target_gender: "female".into(),
            target_age: 28,
            sender_name: "Kim".into(),
        }
    }

    #[test]
    fn prompt_targets_recipient_language() {
        let prompt = build_prompt(&request());
        assert!(prompt.contains("Target language: English"));
        assert!(prompt.contains("Original message from Kim: \"안녕\""));
        assert!(prompt.contains("28세 여성"));
        assert!(prompt.contains("If already in the target language, return as-is"));
    }

    #[test]
    fn prompt_defaults_unknown_locale_to_english() {
        let mut req = request();
        req.target_nationality = "Atlantis".into();
        assert!(build_prompt(&req).contains("Target language: English"));
    }

    #[tokio::test]
    async fn missing_api_key_falls_back_to_original() {
        let translator = Translator::new("");
        assert_eq!(translator.translate(&request()).await, "안녕");
    }

    #[tokio::test]
    async fn unreachable_endpoint_falls_back_to_original() {
        // Nothing listens here; the request errors immediately and the
        // original text comes back untouched.
        let translator = Translator::with_base_url("test-key", "http://127.0.0.1:1");
        assert_eq!(translator.translate(&request()).await, "안녕");
        assert_eq!(translator.detect_language("안녕").await, "Unknown");
    }

    #[tokio::test]
    async fn response_parsing_extracts_first_candidate() {
        let json = r#"{
            "candidates": [
                { "content": { "parts": [ { "text": "  Hello\n" } ] } }
            ]
        }"#;
        let parsed: GenerateContentResponse = serde_json::from_str(json).unwrap();
        let text = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text.trim().to_string())
            .unwrap();
        assert_eq!(text, "Hello");
    }
}
