use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct UserQuota {
    pub email: String,
    pub count: i64,
}

#[derive(Debug, Deserialize)]
pub struct QuotaQuery {
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaStatus {
    pub email: String,
    pub usage_count: i64,
    pub image_count: i64,
    pub image_cap: i64,
    pub remaining: i64,
    pub accepting_images: bool,
}
