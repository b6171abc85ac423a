use sqlx::SqlitePool;

use crate::errors::Result;
use crate::models::*;

pub struct QuotaQueries;

impl QuotaQueries {
    /// Creates the row at zero on first sight, then bumps it, in one statement.
    pub async fn increment(pool: &SqlitePool, email: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO user_quota (email, count)
            VALUES (?, 1)
            ON CONFLICT(email) DO UPDATE SET count = count + 1
            "#,
        )
        .bind(email)
        .execute(pool)
        .await?;

        Ok(())
    }

    pub async fn find_by_email(pool: &SqlitePool, email: &str) -> Result<Option<UserQuota>> {
        let quota = sqlx::query_as::<_, UserQuota>(
            "SELECT email, count FROM user_quota WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(pool)
        .await?;

        Ok(quota)
    }
}

pub struct ImageQueries;

impl ImageQueries {
    /// Inserts an image record unless the email already holds `limit` records.
    ///
    /// The count check and the insert are a single statement, so concurrent
    /// callers cannot both slip under the limit. With `limit` of `None` the
    /// insert is unconditional. Returns whether a row was written.
    pub async fn insert_within_limit(
        pool: &SqlitePool,
        email: &str,
        image_url: &str,
        limit: Option<i64>,
    ) -> Result<bool> {
        let mut tx = pool.begin().await?;

        // Keeps the foreign key satisfied for callers that skip record_usage.
        sqlx::query("INSERT OR IGNORE INTO user_quota (email, count) VALUES (?, 0)")
            .bind(email)
            .execute(&mut *tx)
            .await?;

        let result = match limit {
            Some(limit) => {
                sqlx::query(
                    r#"
                    INSERT INTO email_images (email, image_url)
                    SELECT ?, ?
                    WHERE (SELECT COUNT(*) FROM email_images WHERE email = ?) < ?
                    "#,
                )
                .bind(email)
                .bind(image_url)
                .bind(email)
                .bind(limit)
                .execute(&mut *tx)
                .await?
            }
            None => {
                sqlx::query("INSERT INTO email_images (email, image_url) VALUES (?, ?)")
                    .bind(email)
                    .bind(image_url)
                    .execute(&mut *tx)
                    .await?
            }
        };

        tx.commit().await?;

        Ok(result.rows_affected() == 1)
    }

    pub async fn count_for_email(pool: &SqlitePool, email: &str) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM email_images WHERE email = ?")
            .bind(email)
            .fetch_one(pool)
            .await?;

        Ok(count)
    }

    /// Newest first. Records inserted within the same second fall back to id order.
    pub async fn recent_for_email(
        pool: &SqlitePool,
        email: &str,
        limit: i64,
    ) -> Result<Vec<ImageRecord>> {
        let records = sqlx::query_as::<_, ImageRecord>(
            r#"
            SELECT id, email, image_url, timestamp
            FROM email_images
            WHERE email = ?
            ORDER BY timestamp DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(email)
        .bind(limit)
        .fetch_all(pool)
        .await?;

        Ok(records)
    }
}
