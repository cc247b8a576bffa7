use base64::{Engine as _, engine::general_purpose::STANDARD};
use regex::Regex;
use serde_json::{Value as JsonValue, json};
use std::{sync::LazyLock, time::Duration};

use crate::data_url::sniff_image_mime;
use crate::error::ServiceError;

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Thin client for a Gemini `generateContent` endpoint.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
    /// Name used in errors and logs ("vision", "image generation").
    pub service: &'static str,
}

impl GeminiClient {
    #[must_use]
    pub const fn new(
        endpoint: String,
        api_key: Option<String>,
        timeout: Duration,
        service: &'static str,
    ) -> Self {
        Self {
            endpoint,
            api_key,
            timeout,
            service,
        }
    }

    /// Sends one user turn made of `parts` and returns the decoded envelope.
    ///
    /// # Errors
    ///
    /// `MissingCredential` without an API key, `External` on transport errors,
    /// non-2xx statuses and `error` payloads, `MalformedResponse` when the
    /// body is not JSON.
    pub async fn generate_content(
        &self,
        http: &reqwest::Client,
        parts: Vec<JsonValue>,
    ) -> Result<JsonValue, ServiceError> {
        let key = self
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(ServiceError::MissingCredential(self.service))?;

        let body = json!({ "contents": [ { "parts": parts } ] });

        let resp = http
            .post(&self.endpoint)
            .header(API_KEY_HEADER, key)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| ServiceError::external(self.service, e.to_string()))?;

        let status = resp.status();
        let text = resp.text().await.unwrap_or_default();
        tracing::debug!(service = self.service, %status, bytes = text.len(), "gemini response");

        if !status.is_success() {
            return Err(ServiceError::external(
                self.service,
                format!("HTTP {status}: {}", preview(&text, 500)),
            ));
        }

        let envelope: JsonValue = serde_json::from_str(&text)
            .map_err(|e| ServiceError::malformed(self.service, e.to_string()))?;

        if let Some(err) = envelope.get("error") {
            return Err(ServiceError::external(self.service, err.to_string()));
        }

        Ok(envelope)
    }
}

#[must_use]
pub fn text_part(text: &str) -> JsonValue {
    json!({ "text": text })
}

/// Inline image part with a MIME type sniffed from the bytes.
#[must_use]
pub fn image_part(bytes: &[u8]) -> JsonValue {
    json!({
        "inlineData": {
            "mimeType": sniff_image_mime(bytes),
            "data": STANDARD.encode(bytes),
        }
    })
}

/// Parts of the first candidate, if the envelope has any candidate.
#[must_use]
pub fn first_candidate_parts(envelope: &JsonValue) -> Option<&[JsonValue]> {
    envelope
        .get("candidates")?
        .as_array()?
        .first()?
        .pointer("/content/parts")
        .and_then(JsonValue::as_array)
        .map(Vec::as_slice)
}

/// Text of the first part of the first candidate.
#[must_use]
pub fn first_text(envelope: &JsonValue) -> Option<&str> {
    first_candidate_parts(envelope)?
        .first()?
        .get("text")
        .and_then(JsonValue::as_str)
}

#[must_use]
pub fn preview(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        format!("{}…", s.chars().take(max_chars).collect::<String>())
    } else {
        s.to_string()
    }
}

/// Extract JSON object from a ```json ... ``` fenced block.
/// Accepts ```json``` or plain ``` ``` fences (case-insensitive).
pub fn extract_fenced_json(s: &str) -> Option<String> {
    static FENCE_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?is)```(?:json)?\s*(\{.*?\})\s*```").unwrap());

    FENCE_RE
        .captures(s)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
}

/// Fallback: the *largest* balanced `{ ... }` object in text, ignoring braces
/// inside string literals.
#[must_use]
pub fn extract_largest_json_object(s: &str) -> Option<String> {
    let mut best: Option<(usize, usize)> = None;
    let mut depth: usize = 0;
    let mut start: Option<usize> = None;
    let mut in_str = false;
    let mut esc = false;

    for (i, ch) in s.char_indices() {
        if in_str {
            match ch {
                _ if esc => esc = false,
                '\\' => esc = true,
                '"' => in_str = false,
                _ => {}
            }
            continue;
        }

        match ch {
            '"' => in_str = true,
            '{' => {
                if depth == 0 {
                    start = Some(i);
                }
                depth += 1;
            }
            '}' if depth > 0 => {
                depth -= 1;
                if depth == 0
                    && let Some(st) = start.take()
                {
                    let better = best.is_none_or(|(a, b)| i - st > b - a);
                    if better {
                        best = Some((st, i));
                    }
                }
            }
            _ => {}
        }
    }

    best.map(|(a, b)| s[a..=b].to_string())
}

/// The JSON object embedded in model text, if there is one.
#[must_use]
pub fn extract_json_object(s: &str) -> Option<String> {
    if s.trim_start().starts_with('{') && serde_json::from_str::<JsonValue>(s).is_ok() {
        return Some(s.trim().to_string());
    }
    extract_fenced_json(s).or_else(|| extract_largest_json_object(s))
}
