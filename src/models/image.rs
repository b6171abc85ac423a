use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ImageRecord {
    pub id: i64,
    pub email: String,
    pub image_url: String,
    pub timestamp: NaiveDateTime,
}

#[derive(Debug, Deserialize)]
pub struct AddImageRequest {
    pub email: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RecentImagesRequest {
    pub email: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RecentImagesResponse {
    pub images: Vec<String>,
}
