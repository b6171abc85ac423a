use crate::{
    config::Config,
    errors::{AppError, Result},
    services::QuotaStore,
};

pub mod health;
pub mod images;
pub mod quota;

#[derive(Clone)]
pub struct AppState {
    pub store: QuotaStore,
    pub config: Config,
}

pub(crate) fn require_email(email: Option<String>) -> Result<String> {
    let email = email
        .map(|e| e.trim().to_string())
        .filter(|e| !e.is_empty())
        .ok_or_else(|| AppError::Validation("Missing email".to_string()))?;

    if !email.contains('@') {
        return Err(AppError::Validation("Invalid email format".to_string()));
    }

    Ok(email)
}
