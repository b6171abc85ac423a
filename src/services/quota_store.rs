use tracing::{debug, warn};

use crate::{
    config::{Config, RetentionPolicy},
    database::{
        queries::{ImageQueries, QuotaQueries},
        Database,
    },
    errors::Result,
    models::{ImageRecord, QuotaStatus},
};

pub const DEFAULT_IMAGE_CAP: i64 = 5;

/// Per-email usage counters and capped image history.
///
/// Built once at startup and shared through `AppState`; clones share the
/// same connection pool.
#[derive(Clone)]
pub struct QuotaStore {
    database: Database,
    image_cap: i64,
    retention: RetentionPolicy,
}

impl QuotaStore {
    pub fn new(database: Database) -> Self {
        Self::with_policy(database, DEFAULT_IMAGE_CAP, RetentionPolicy::Capped)
    }

    pub fn with_policy(database: Database, image_cap: i64, retention: RetentionPolicy) -> Self {
        Self {
            database,
            image_cap,
            retention,
        }
    }

    pub fn from_config(database: Database, config: &Config) -> Self {
        Self::with_policy(database, config.image_cap, config.retention)
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn image_cap(&self) -> i64 {
        self.image_cap
    }

    pub fn retention(&self) -> RetentionPolicy {
        self.retention
    }

    pub async fn ensure_schema(&self) -> Result<()> {
        self.database.ensure_schema().await
    }

    pub async fn record_usage(&self, email: &str) -> Result<()> {
        QuotaQueries::increment(self.database.pool(), email).await?;
        debug!(email, "recorded image generation");
        Ok(())
    }

    /// Stores `image_url` for `email`. Returns `false` when the email is at
    /// its cap under the capped policy; nothing is written in that case.
    pub async fn add_image(&self, email: &str, image_url: &str) -> Result<bool> {
        let limit = match self.retention {
            RetentionPolicy::Capped => Some(self.image_cap),
            RetentionPolicy::Rolling => None,
        };

        let accepted =
            ImageQueries::insert_within_limit(self.database.pool(), email, image_url, limit).await?;

        if accepted {
            debug!(email, image_url, "stored image record");
        } else {
            warn!(email, cap = self.image_cap, "image cap reached, record rejected");
        }

        Ok(accepted)
    }

    pub async fn get_recent_images(&self, email: &str) -> Result<Vec<String>> {
        let records = self.recent_image_records(email).await?;
        Ok(records.into_iter().map(|record| record.image_url).collect())
    }

    pub async fn recent_image_records(&self, email: &str) -> Result<Vec<ImageRecord>> {
        ImageQueries::recent_for_email(self.database.pool(), email, self.image_cap).await
    }

    pub async fn usage_count(&self, email: &str) -> Result<Option<i64>> {
        let quota = QuotaQueries::find_by_email(self.database.pool(), email).await?;
        Ok(quota.map(|quota| quota.count))
    }

    pub async fn image_count(&self, email: &str) -> Result<i64> {
        ImageQueries::count_for_email(self.database.pool(), email).await
    }

    pub async fn quota_status(&self, email: &str) -> Result<QuotaStatus> {
        let usage_count = self.usage_count(email).await?.unwrap_or(0);
        let image_count = self.image_count(email).await?;
        let remaining = (self.image_cap - image_count).max(0);

        let accepting_images = match self.retention {
            RetentionPolicy::Capped => remaining > 0,
            RetentionPolicy::Rolling => true,
        };

        Ok(QuotaStatus {
            email: email.to_string(),
            usage_count,
            image_count,
            image_cap: self.image_cap,
            remaining,
            accepting_images,
        })
    }
}
