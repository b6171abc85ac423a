use axum::{extract::State, http::StatusCode, response::Json};
use serde_json::json;

use crate::{
    errors::{AppError, Result},
    handlers::{require_email, AppState},
    models::{AddImageRequest, RecentImagesRequest, RecentImagesResponse},
};

/// Called once an image has been generated for a user.
pub async fn add_image(
    State(state): State<AppState>,
    Json(request): Json<AddImageRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>)> {
    let email = require_email(request.email)?;
    let image_url = request
        .image_url
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty())
        .ok_or_else(|| AppError::Validation("Missing imageURL".to_string()))?;

    state.store.record_usage(&email).await?;

    if !state.store.add_image(&email, &image_url).await? {
        return Err(AppError::QuotaExceeded(format!(
            "Limit exceeded. Only last {} images can be stored.",
            state.store.image_cap()
        )));
    }

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Image recorded successfully",
            "data": {
                "email": email,
                "image_url": image_url
            }
        })),
    ))
}

pub async fn recent_images(
    State(state): State<AppState>,
    Json(request): Json<RecentImagesRequest>,
) -> Result<Json<RecentImagesResponse>> {
    let email = require_email(request.email)?;
    let images = state.store.get_recent_images(&email).await?;

    Ok(Json(RecentImagesResponse { images }))
}
