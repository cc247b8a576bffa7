use async_trait::async_trait;
use serde_json::Value as JsonValue;

use crate::collaborators::ImageGenerator;
use crate::data_url::{self, PNG_MIME};
use crate::error::ServiceError;
use crate::gemini::{GeminiClient, first_candidate_parts, image_part, text_part};

pub const REFERENCE_PREAMBLE: &str = "Based on the provided reference image, maintain the person's face, \
body shape, and existing clothing as much as possible. Only change the recommended clothing item while \
keeping everything else identical. The result should look like the same person wearing the new \
recommended item. ";

/// Text prompt sent to the model; anchored prompts get the preservation
/// instructions in front.
#[must_use]
pub fn effective_prompt(prompt: &str, has_reference: bool) -> String {
    if has_reference {
        format!("{REFERENCE_PREAMBLE}{prompt}")
    } else {
        prompt.to_string()
    }
}

/// `(mime, base64)` of the first inline image in `part`, accepting both the
/// camelCase and snake_case spellings.
fn inline_image(part: &JsonValue) -> Option<(&str, &str)> {
    let (inline, mime_key) = part
        .get("inlineData")
        .map(|d| (d, "mimeType"))
        .or_else(|| part.get("inline_data").map(|d| (d, "mime_type")))?;

    let data = inline.get("data").and_then(JsonValue::as_str)?;
    if data.is_empty() {
        tracing::warn!("inline image part has empty data");
        return None;
    }
    let mime = inline
        .get(mime_key)
        .and_then(JsonValue::as_str)
        .unwrap_or(PNG_MIME);
    Some((mime, data))
}

/// Data URL of the first generated image in the envelope.
///
/// # Errors
///
/// `MalformedResponse` when no part carries inline image data.
pub fn parse_generated_image(
    service: &'static str,
    envelope: &JsonValue,
) -> Result<String, ServiceError> {
    first_candidate_parts(envelope)
        .unwrap_or_default()
        .iter()
        .find_map(inline_image)
        .map(|(mime, data)| {
            tracing::info!(mime, payload_len = data.len(), "received generated image");
            data_url::from_base64(mime, data)
        })
        .ok_or_else(|| ServiceError::malformed(service, "no inline image data in response"))
}

/// [`ImageGenerator`] backed by a Gemini image model.
#[derive(Debug, Clone)]
pub struct GeminiImageGenerator {
    http: reqwest::Client,
    client: GeminiClient,
}

impl GeminiImageGenerator {
    #[must_use]
    pub const fn new(http: reqwest::Client, client: GeminiClient) -> Self {
        Self { http, client }
    }
}

#[async_trait]
impl ImageGenerator for GeminiImageGenerator {
    async fn generate(
        &self,
        reference: Option<&[u8]>,
        prompt: &str,
    ) -> Result<String, ServiceError> {
        let reference = reference.filter(|r| !r.is_empty());
        let mut parts = Vec::with_capacity(2);

        if let Some(bytes) = reference {
            tracing::info!(
                bytes = bytes.len(),
                mime = data_url::sniff_image_mime(bytes),
                "attaching reference image"
            );
            parts.push(image_part(bytes));
        }
        parts.push(text_part(&effective_prompt(prompt, reference.is_some())));

        let envelope = self.client.generate_content(&self.http, parts).await?;
        parse_generated_image(self.client.service, &envelope)
    }
}
