use crate::models::FashionAttributes;
use crate::translate::TermTranslator;

pub const DEFAULT_OUTFIT_TEXT: &str = "심플하고 깔끔한 캐주얼 코디";
pub const DEFAULT_PRODUCT_NAME: &str = "패션 의류";
const PLAIN_PATTERN: &str = "플레인";
const GENERIC_GARMENT: &str = "옷";

fn known(v: Option<&String>) -> Option<&str> {
    v.map(String::as_str).filter(|s| !s.is_empty())
}

/// Turns extracted attributes into the Korean outfit description shown to
/// users and fed to the prompt composer.
#[derive(Debug, Clone, Default)]
pub struct OutfitTextComposer {
    translator: TermTranslator,
}

impl OutfitTextComposer {
    #[must_use]
    pub const fn new(translator: TermTranslator) -> Self {
        Self { translator }
    }

    /// Fragment order is part of the output format:
    /// style, colors, clothing type, pattern, season, material, extras.
    #[must_use]
    pub fn compose(&self, attrs: &FashionAttributes) -> String {
        let t = &self.translator;
        let mut fragments: Vec<String> = Vec::with_capacity(7);

        if let Some(style) = known(attrs.style.as_ref()) {
            fragments.push(format!("{} 스타일", t.translate(style)));
        }

        if !attrs.colors.is_empty() {
            let colors: Vec<String> = attrs.colors.iter().map(|c| t.translate(c)).collect();
            fragments.push(format!("{} 컬러 조합", colors.join("와 ")));
        }

        if let Some(kind) = known(attrs.clothing_type.as_ref()) {
            fragments.push(format!("{} 중심 코디", t.translate(kind)));
        }

        if let Some(pattern) = known(attrs.pattern.as_ref()) {
            let ko = t.translate(pattern);
            if ko != PLAIN_PATTERN {
                fragments.push(format!("{ko} 패턴"));
            }
        }

        // season stays as the model wrote it
        if let Some(season) = known(attrs.season.as_ref()) {
            fragments.push(format!("{season}에 어울리는"));
        }

        if let Some(material) = known(attrs.material.as_ref()) {
            fragments.push(format!("{} 소재", t.translate(material)));
        }

        if !attrs.additional_attributes.is_empty() {
            let extras: Vec<String> = attrs
                .additional_attributes
                .iter()
                .map(|a| t.translate(a))
                .collect();
            fragments.push(extras.join(", "));
        }

        fragments.retain(|f| !f.is_empty());
        let text = fragments.join(", ");

        if text.is_empty() {
            DEFAULT_OUTFIT_TEXT.to_string()
        } else {
            tracing::debug!(outfit_text = %text, "composed outfit text");
            text
        }
    }

    /// Single concrete product name: `[style] [first color] <type | 옷>`.
    /// Only the dominant (first) color is used.
    #[must_use]
    pub fn compose_product_name(&self, attrs: &FashionAttributes) -> String {
        let t = &self.translator;
        let mut name = String::new();

        if let Some(style) = known(attrs.style.as_ref()) {
            let ko = t.translate(style);
            if !ko.is_empty() {
                name.push_str(&ko);
                name.push(' ');
            }
        }

        if let Some(first) = attrs.colors.first() {
            name.push_str(&t.translate(first));
            name.push(' ');
        }

        match known(attrs.clothing_type.as_ref()).map(|k| t.translate(k)) {
            Some(kind) if !kind.is_empty() => name.push_str(&kind),
            _ => name.push_str(GENERIC_GARMENT),
        }

        let name = name.trim();
        if name.is_empty() {
            DEFAULT_PRODUCT_NAME.to_string()
        } else {
            tracing::info!(product_name = %name, "composed product name");
            name.to_string()
        }
    }
}
