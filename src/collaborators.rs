//! Boundaries to the remote AI and search services.
//!
//! The pipeline only ever talks to these traits; the Gemini and Google Custom
//! Search implementations live in `vision`, `image_gen` and `search`.

use async_trait::async_trait;

use crate::error::ServiceError;
use crate::models::{FashionAttributes, ProductCandidate};

#[async_trait]
pub trait Vision: Send + Sync {
    /// Attributes of the clothing in `image`. Unparseable model output degrades
    /// to [`FashionAttributes::fallback`]; transport failures are errors.
    async fn extract_attributes(&self, image: &[u8]) -> Result<FashionAttributes, ServiceError>;

    /// One complementary product name (single line, quotes stripped).
    /// With `attrs`, the recommendation is steered by the given attributes.
    async fn recommend_product_name(
        &self,
        image: &[u8],
        attrs: Option<&FashionAttributes>,
    ) -> Result<String, ServiceError>;
}

#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Renders `prompt`, optionally anchored on `reference`, and returns a
    /// `data:` URL.
    async fn generate(&self, reference: Option<&[u8]>, prompt: &str)
    -> Result<String, ServiceError>;
}

#[async_trait]
pub trait ProductSearch: Send + Sync {
    /// Never fails: credential, transport and parse problems yield an empty list.
    async fn search(&self, query: &str, max_results: usize) -> Vec<ProductCandidate>;
}
