use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// Account role. Stored as lowercase text in `users.role`; anything else is
/// rejected when the value crosses the HTTP boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            other => Err(format!("invalid role: {other:?}")),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => f.write_str("user"),
            Role::Admin => f.write_str("admin"),
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub role: Role,
}

impl User {
    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, created_at, role
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Pages through all accounts in insertion order. 1-indexed; a page past
    /// the end is an empty vec.
    pub async fn list(db: &PgPool, page: i64, per_page: i64) -> anyhow::Result<Vec<User>> {
        let offset = (page - 1) * per_page;
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, created_at, role
            FROM users
            ORDER BY created_at ASC, id ASC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(per_page)
        .bind(offset)
        .fetch_all(db)
        .await?;
        Ok(users)
    }

    pub async fn count(db: &PgPool) -> anyhow::Result<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(db)
            .await?;
        Ok(count)
    }

    /// Persists a new role. Returns false when no such user exists, in which
    /// case nothing was written.
    pub async fn update_role(db: &PgPool, id: Uuid, role: Role) -> anyhow::Result<bool> {
        let updated = sqlx::query("UPDATE users SET role = $1 WHERE id = $2")
            .bind(role)
            .bind(id)
            .execute(db)
            .await?
            .rows_affected();
        Ok(updated > 0)
    }

    /// Removes the user together with their trips, OAuth connections and
    /// password-reset tokens, all-or-nothing. Returns false (having written
    /// nothing) when no such user exists.
    pub async fn delete(db: &PgPool, id: Uuid) -> anyhow::Result<bool> {
        let mut tx = db.begin().await?;

        sqlx::query("DELETE FROM trips WHERE user_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM oauth_connections WHERE user_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM password_reset_tokens WHERE user_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let deleted = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if deleted == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        tx.commit().await?;
        Ok(true)
    }

    /// Names of OAuth providers linked to this account.
    pub async fn oauth_providers(db: &PgPool, id: Uuid) -> anyhow::Result<Vec<String>> {
        let providers = sqlx::query_scalar(
            r#"
            SELECT provider FROM oauth_connections
            WHERE user_id = $1
            ORDER BY provider ASC
            "#,
        )
        .bind(id)
        .fetch_all(db)
        .await?;
        Ok(providers)
    }

    /// Trip count plus first and last trip dates for the profile view.
    pub async fn trip_summary(
        db: &PgPool,
        id: Uuid,
    ) -> anyhow::Result<(i64, Option<String>, Option<String>)> {
        let row: (i64, Option<String>, Option<String>) = sqlx::query_as(
            r#"
            SELECT COUNT(*),
                   to_char(MIN(date), 'YYYY-MM-DD'),
                   to_char(MAX(date), 'YYYY-MM-DD')
            FROM trips
            WHERE user_id = $1
            "#,
        )
        .bind(id)
        .fetch_one(db)
        .await?;
        Ok(row)
    }
}
