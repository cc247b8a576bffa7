use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::Config;
use crate::pipeline::Pipeline;

/* ---------- App state ---------- */
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
    pub config: Config,
}

/* ---------- Domain models ---------- */

/// Clothing description extracted from a photo. Every field may be unknown.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FashionAttributes {
    #[serde(default)]
    pub colors: Vec<String>,
    pub style: Option<String>,
    pub clothing_type: Option<String>,
    pub pattern: Option<String>,
    pub season: Option<String>,
    pub material: Option<String>,
    #[serde(default)]
    pub additional_attributes: Vec<String>,
}

impl FashionAttributes {
    /// Used when the vision model answers with something that is not
    /// parseable attribute JSON.
    #[must_use]
    pub fn fallback() -> Self {
        Self {
            colors: Vec::new(),
            style: Some("캐주얼".into()),
            clothing_type: Some("상의".into()),
            pattern: Some("플레인".into()),
            season: Some("사계절".into()),
            material: Some("면".into()),
            additional_attributes: Vec::new(),
        }
    }
}

/// One product image search hit.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProductCandidate {
    pub title: String,
    pub image_url: String,
    /// Product page; falls back to `image_url` when the hit has no context link.
    pub link: String,
    pub snippet: String,
    pub search_query: String,
}

/// Result of one pipeline run, returned as-is to the HTTP caller.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OutfitSuggestion {
    pub description: String,
    /// `data:<mime>;base64,<payload>`
    pub outfit_image_url: String,
    pub prompt: String,
    pub search_query: String,
    pub products: Vec<ProductCandidate>,
}
