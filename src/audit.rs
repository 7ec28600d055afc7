//! Append-only log of privileged actions. Entries are inserted once with a
//! server-assigned timestamp and never updated or deleted.

use serde::Serialize;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AuditLog {
    pub id: Uuid,
    pub user_id: Uuid,
    pub action: String,
    pub details: String,
    pub ip_address: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl AuditLog {
    pub async fn append(
        db: &PgPool,
        user_id: Uuid,
        action: &str,
        details: &str,
        ip_address: &str,
    ) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO audit_logs (user_id, action, details, ip_address)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(user_id)
        .bind(action)
        .bind(details)
        .bind(ip_address)
        .execute(db)
        .await?;
        Ok(())
    }

    /// Newest entries first. 1-indexed pages; a page past the end is an empty
    /// vec, not an error.
    pub async fn list(db: &PgPool, page: i64, per_page: i64) -> anyhow::Result<Vec<AuditLog>> {
        let offset = (page - 1) * per_page;
        let logs = sqlx::query_as::<_, AuditLog>(
            r#"
            SELECT id, user_id, action, details, ip_address, created_at
            FROM audit_logs
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(per_page)
        .bind(offset)
        .fetch_all(db)
        .await?;
        Ok(logs)
    }

    pub async fn count(db: &PgPool) -> anyhow::Result<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM audit_logs")
            .fetch_one(db)
            .await?;
        Ok(count)
    }
}
