use axum::{
    extract::{Query, State},
    response::Json,
};

use crate::{
    errors::Result,
    handlers::{require_email, AppState},
    models::{QuotaQuery, QuotaStatus},
};

pub async fn get_quota(
    State(state): State<AppState>,
    Query(query): Query<QuotaQuery>,
) -> Result<Json<QuotaStatus>> {
    let email = require_email(query.email)?;
    let status = state.store.quota_status(&email).await?;

    Ok(Json(status))
}
