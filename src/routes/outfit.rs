use axum::{
    Json,
    extract::{Multipart, State},
    http::StatusCode,
};

use crate::error::AppResult;
use crate::models::{AppState, OutfitSuggestion};

/// Bytes of the first `image` (or `file`) field.
///
/// # Errors
///
/// 400 when no such field exists or it is empty, or the multipart error's own
/// status when the body cannot be read.
async fn read_upload(mut multipart: Multipart) -> AppResult<Vec<u8>> {
    let mut upload: Option<(Option<String>, Vec<u8>)> = None;

    while let Some(field) = multipart.next_field().await? {
        if let Some("image" | "file") = field.name() {
            let file_name = field.file_name().map(ToString::to_string);
            upload = Some((file_name, field.bytes().await?.to_vec()));
            break;
        }
    }

    let Some((file_name, bytes)) = upload else {
        tracing::warn!("upload without an image field");
        return Err((StatusCode::BAD_REQUEST, "missing image field".to_string()).into());
    };

    tracing::info!(
        file_name = file_name.as_deref().unwrap_or("-"),
        bytes = bytes.len(),
        "received upload"
    );

    if bytes.is_empty() {
        tracing::warn!("rejecting empty upload");
        return Err((StatusCode::BAD_REQUEST, "uploaded file is empty".to_string()).into());
    }
    Ok(bytes)
}

/// Recommend a complementary item and render the uploader wearing it.
///
/// # Errors
///
/// 400 for a missing or empty upload, 500 when vision or image generation fails.
pub async fn recommend(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<Json<OutfitSuggestion>> {
    let bytes = read_upload(multipart).await?;
    let suggestion = state.pipeline.recommend(&bytes).await?;
    Ok(Json(suggestion))
}

/// Generate an outfit from the photo's attributes and find matching products.
///
/// # Errors
///
/// 400 for a missing or empty upload, 500 when vision or image generation fails.
pub async fn products(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<Json<OutfitSuggestion>> {
    let bytes = read_upload(multipart).await?;
    let suggestion = state.pipeline.products(&bytes).await?;
    Ok(Json(suggestion))
}

pub async fn health() -> &'static str {
    "OK"
}
