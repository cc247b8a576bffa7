use std::sync::Arc;
use std::time::Duration;

use crate::collaborators::{ImageGenerator, ProductSearch, Vision};
use crate::config::Config;
use crate::data_url;
use crate::error::ServiceError;
use crate::gemini::GeminiClient;
use crate::image_gen::GeminiImageGenerator;
use crate::models::OutfitSuggestion;
use crate::outfit_text::OutfitTextComposer;
use crate::prompt::PromptComposer;
use crate::search::GoogleImageSearch;
use crate::vision::GeminiVision;

/// Requested product count; the search collaborator clamps it further.
pub const PRODUCT_SEARCH_LIMIT: usize = 20;

const COMBINED_SEPARATOR: &str = " + ";

/// Joins the attribute description and the recommended item.
#[must_use]
pub fn combine_description(outfit_text: &str, recommended_product: &str) -> String {
    format!("{outfit_text}{COMBINED_SEPARATOR}{recommended_product}")
}

fn log_failure(flow: &'static str, step: u8, what: &'static str) -> impl FnOnce(&ServiceError) {
    move |e| tracing::error!(flow, step, what, error = %e, "pipeline step failed")
}

/// Runs the two outfit flows. Steps are strictly sequential and the first
/// collaborator error ends the run.
pub struct Pipeline {
    vision: Arc<dyn Vision>,
    image_gen: Arc<dyn ImageGenerator>,
    search: Arc<dyn ProductSearch>,
    text: OutfitTextComposer,
    prompts: PromptComposer,
}

impl Pipeline {
    pub fn new(
        vision: Arc<dyn Vision>,
        image_gen: Arc<dyn ImageGenerator>,
        search: Arc<dyn ProductSearch>,
        text: OutfitTextComposer,
    ) -> Self {
        Self {
            vision,
            image_gen,
            search,
            text,
            prompts: PromptComposer,
        }
    }

    /// Wires the Gemini and Custom Search clients from configuration.
    #[must_use]
    pub fn from_config(config: &Config, http: &reqwest::Client) -> Self {
        let vision = GeminiVision::new(
            http.clone(),
            GeminiClient::new(
                config.vision_endpoint.clone(),
                config.gemini_api_key.clone(),
                Duration::from_secs(config.vision_timeout_secs),
                "vision",
            ),
        );
        let image_gen = GeminiImageGenerator::new(
            http.clone(),
            GeminiClient::new(
                config.image_endpoint.clone(),
                config.image_api_key(),
                Duration::from_secs(config.image_timeout_secs),
                "image generation",
            ),
        );
        let search = GoogleImageSearch::new(
            http.clone(),
            config.search_endpoint.clone(),
            config.search_api_key.clone(),
            config.search_engine_id.clone(),
            config.search_site.clone(),
            Duration::from_secs(config.search_timeout_secs),
        );

        Self::new(
            Arc::new(vision),
            Arc::new(image_gen),
            Arc::new(search),
            OutfitTextComposer::default(),
        )
    }

    /// Flow A: recommend a complementary item for the uploaded photo and
    /// render the person wearing it, using the photo as reference.
    ///
    /// # Errors
    ///
    /// First vision or image-generation failure.
    pub async fn recommend(&self, image: &[u8]) -> Result<OutfitSuggestion, ServiceError> {
        const FLOW: &str = "recommend";
        tracing::info!(flow = FLOW, bytes = image.len(), "pipeline started");

        tracing::info!(flow = FLOW, step = 1, "asking vision for a complementary item");
        let recommended = self
            .vision
            .recommend_product_name(image, None)
            .await
            .inspect_err(log_failure(FLOW, 1, "recommend product"))?;
        tracing::info!(flow = FLOW, product = %recommended, "recommended product");

        tracing::info!(flow = FLOW, step = 2, query = %recommended, "searching products");
        let products = self.search.search(&recommended, PRODUCT_SEARCH_LIMIT).await;
        tracing::info!(flow = FLOW, count = products.len(), "products found");

        tracing::info!(flow = FLOW, step = 3, "extracting attributes of the uploaded photo");
        let attrs = self
            .vision
            .extract_attributes(image)
            .await
            .inspect_err(log_failure(FLOW, 3, "extract attributes"))?;

        let description = combine_description(&self.text.compose(&attrs), &recommended);
        tracing::info!(flow = FLOW, step = 4, %description, "composed outfit text");

        let prompt = self.prompts.to_english_prompt(&description);
        tracing::info!(flow = FLOW, step = 5, %prompt, "composed image prompt");

        tracing::info!(flow = FLOW, step = 6, "generating outfit image from reference");
        let outfit_image_url = self
            .image_gen
            .generate(Some(image), &prompt)
            .await
            .inspect_err(log_failure(FLOW, 6, "generate image"))?;

        tracing::info!(flow = FLOW, "pipeline finished");
        Ok(OutfitSuggestion {
            description,
            outfit_image_url,
            prompt,
            search_query: recommended,
            products,
        })
    }

    /// Flow B: imagine an outfit from the photo's attributes, then recommend
    /// and search for an item that goes with the generated look.
    ///
    /// # Errors
    ///
    /// First vision or image-generation failure, or an undecodable image
    /// payload.
    pub async fn products(&self, image: &[u8]) -> Result<OutfitSuggestion, ServiceError> {
        const FLOW: &str = "products";
        tracing::info!(flow = FLOW, bytes = image.len(), "pipeline started");

        tracing::info!(flow = FLOW, step = 1, "extracting attributes");
        let attrs = self
            .vision
            .extract_attributes(image)
            .await
            .inspect_err(log_failure(FLOW, 1, "extract attributes"))?;

        let description = self.text.compose(&attrs);
        tracing::info!(flow = FLOW, step = 2, %description, "composed outfit text");

        let prompt = self.prompts.to_english_prompt(&description);
        tracing::info!(flow = FLOW, step = 3, %prompt, "composed image prompt");

        tracing::info!(flow = FLOW, step = 4, "generating outfit image");
        let outfit_image_url = self
            .image_gen
            .generate(None, &prompt)
            .await
            .inspect_err(log_failure(FLOW, 4, "generate image"))?;

        tracing::info!(flow = FLOW, step = 5, "decoding generated image");
        let generated = data_url::decode(&outfit_image_url).map_err(|e| {
            let err = ServiceError::malformed("image generation", format!("bad base64 payload: {e}"));
            log_failure(FLOW, 5, "decode image")(&err);
            err
        })?;

        tracing::info!(flow = FLOW, step = 6, bytes = generated.len(), "asking vision about the generated look");
        let recommended = self
            .vision
            .recommend_product_name(&generated, None)
            .await
            .inspect_err(log_failure(FLOW, 6, "recommend product"))?;
        tracing::info!(flow = FLOW, product = %recommended, "recommended product");

        tracing::info!(flow = FLOW, step = 7, query = %recommended, "searching products");
        let products = self.search.search(&recommended, PRODUCT_SEARCH_LIMIT).await;
        tracing::info!(flow = FLOW, count = products.len(), "products found");

        tracing::info!(flow = FLOW, "pipeline finished");
        Ok(OutfitSuggestion {
            description,
            outfit_image_url,
            prompt,
            search_query: recommended,
            products,
        })
    }
}
