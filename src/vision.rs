use async_trait::async_trait;
use serde_json::{Map, Value as JsonValue};

use crate::collaborators::Vision;
use crate::error::ServiceError;
use crate::gemini::{GeminiClient, extract_json_object, first_candidate_parts, image_part, text_part};
use crate::models::FashionAttributes;

const ATTRIBUTES_PROMPT: &str = "이 이미지의 패션 아이템을 분석하여 다음 정보를 JSON 형식으로 추출해주세요:
- colors: 주요 색상 리스트
- style: 스타일 (캐주얼, 포멀, 스포츠, 스트릿 등)
- clothingType: 의류 종류 (상의, 하의, 아우터, 원피스 등)
- pattern: 패턴 (스트라이프, 체크, 플레인, 도트 등)
- season: 계절성 (봄, 여름, 가을, 겨울)
- material: 재질 (면, 폴리에스터, 니트, 데님 등)
- additionalAttributes: 기타 특징 리스트

JSON 형식으로만 응답해주세요.";

const RECOMMEND_PROMPT: &str = "이 옷 이미지를 보고, 이 옷에 어울리는 다른 옷 하나만 추천해주세요.
구체적인 제품명을 한글로 하나만 추천해주세요.
예시: \"캐주얼 브라운 재킷\", \"검정 슬랙스\", \"베이지 가디건\", \"화이트 셔츠\" 등

추천 제품명만 응답해주세요 (설명 없이 제품명만).";

const UNSPECIFIED: &str = "미지정";

fn or_unspecified(v: Option<&String>) -> &str {
    v.map(String::as_str)
        .filter(|s| !s.is_empty())
        .unwrap_or(UNSPECIFIED)
}

#[must_use]
pub fn attribute_recommend_prompt(attrs: &FashionAttributes) -> String {
    let colors = if attrs.colors.is_empty() {
        UNSPECIFIED.to_string()
    } else {
        attrs.colors.join(", ")
    };
    format!(
        "다음 패션 속성을 분석하여 어울리는 옷 하나를 추천해주세요:
- 색상: {colors}
- 스타일: {style}
- 의류 종류: {kind}
- 패턴: {pattern}
- 계절: {season}
- 재질: {material}

이 속성들에 어울리는 다른 옷 하나만 구체적인 제품명으로 추천해주세요.
예시: \"캐주얼 브라운 재킷\", \"검정 슬랙스\", \"베이지 가디건\", \"화이트 셔츠\" 등

추천 제품명만 응답해주세요 (설명 없이 제품명만).",
        style = or_unspecified(attrs.style.as_ref()),
        kind = or_unspecified(attrs.clothing_type.as_ref()),
        pattern = or_unspecified(attrs.pattern.as_ref()),
        season = or_unspecified(attrs.season.as_ref()),
        material = or_unspecified(attrs.material.as_ref()),
    )
}

/// First line of the model answer with quotes removed.
#[must_use]
pub fn clean_product_name(raw: &str) -> String {
    raw.trim()
        .lines()
        .next()
        .unwrap_or_default()
        .trim()
        .replace(['"', '\''], "")
}

fn scalar_text(v: &JsonValue) -> Option<String> {
    match v {
        JsonValue::Null => None,
        JsonValue::String(s) if s.is_empty() => None,
        JsonValue::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn text_field(obj: &Map<String, JsonValue>, key: &str) -> Option<String> {
    obj.get(key).and_then(scalar_text)
}

fn list_field(obj: &Map<String, JsonValue>, key: &str) -> Vec<String> {
    obj.get(key)
        .and_then(JsonValue::as_array)
        .map(|items| items.iter().filter_map(scalar_text).collect())
        .unwrap_or_default()
}

/// Attribute set from model text.
///
/// No JSON object at all reads as "nothing recognized" (every field unknown);
/// an object that does not parse falls back to [`FashionAttributes::fallback`].
#[must_use]
pub fn parse_attributes(model_text: &str) -> FashionAttributes {
    let Some(raw) = extract_json_object(model_text) else {
        tracing::warn!("vision answer contained no JSON object");
        return FashionAttributes::default();
    };

    match serde_json::from_str::<JsonValue>(&raw) {
        Ok(JsonValue::Object(obj)) => FashionAttributes {
            colors: list_field(&obj, "colors"),
            style: text_field(&obj, "style"),
            clothing_type: text_field(&obj, "clothingType"),
            pattern: text_field(&obj, "pattern"),
            season: text_field(&obj, "season"),
            material: text_field(&obj, "material"),
            additional_attributes: list_field(&obj, "additionalAttributes"),
        },
        Ok(other) => {
            tracing::warn!(kind = ?other, "vision attributes are not an object, using defaults");
            FashionAttributes::fallback()
        }
        Err(e) => {
            tracing::warn!(error = %e, "failed to parse vision attributes, using defaults");
            FashionAttributes::fallback()
        }
    }
}

/// [`Vision`] backed by a Gemini multimodal model.
#[derive(Debug, Clone)]
pub struct GeminiVision {
    http: reqwest::Client,
    client: GeminiClient,
}

impl GeminiVision {
    #[must_use]
    pub const fn new(http: reqwest::Client, client: GeminiClient) -> Self {
        Self { http, client }
    }

    async fn ask(&self, prompt: &str, image: &[u8]) -> Result<Vec<JsonValue>, ServiceError> {
        let envelope = self
            .client
            .generate_content(&self.http, vec![text_part(prompt), image_part(image)])
            .await?;

        first_candidate_parts(&envelope)
            .map(<[JsonValue]>::to_vec)
            .ok_or_else(|| ServiceError::external(self.client.service, "response has no candidates"))
    }
}

#[async_trait]
impl Vision for GeminiVision {
    async fn extract_attributes(&self, image: &[u8]) -> Result<FashionAttributes, ServiceError> {
        tracing::debug!(bytes = image.len(), "extracting fashion attributes");
        let parts = self.ask(ATTRIBUTES_PROMPT, image).await?;
        let text = parts
            .first()
            .and_then(|p| p.get("text"))
            .and_then(JsonValue::as_str)
            .unwrap_or_default();

        let attrs = parse_attributes(text);
        tracing::info!(?attrs, "extracted fashion attributes");
        Ok(attrs)
    }

    async fn recommend_product_name(
        &self,
        image: &[u8],
        attrs: Option<&FashionAttributes>,
    ) -> Result<String, ServiceError> {
        let prompt = attrs.map_or_else(|| RECOMMEND_PROMPT.to_string(), attribute_recommend_prompt);
        let parts = self.ask(&prompt, image).await?;
        let text = parts
            .first()
            .and_then(|p| p.get("text"))
            .and_then(JsonValue::as_str)
            .ok_or_else(|| {
                ServiceError::malformed(self.client.service, "first candidate part has no text")
            })?;

        let name = clean_product_name(text);
        tracing::info!(product = %name, "vision recommended product");
        Ok(name)
    }
}
