//! Admin-panel schema evolution, applied on every startup after the baseline
//! migrations. Safe to run any number of times; the first successful run is
//! the only one with side effects.

use sqlx::PgPool;
use tracing::info;

const CREATE_AUDIT_LOGS: &str = r#"
CREATE TABLE IF NOT EXISTS audit_logs (
    id         UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    user_id    UUID NOT NULL,
    action     TEXT NOT NULL,
    details    TEXT NOT NULL,
    ip_address TEXT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
)
"#;

const ROLE_COLUMN_EXISTS: &str = r#"
SELECT EXISTS (
    SELECT 1 FROM information_schema.columns
    WHERE table_name = 'users' AND column_name = 'role'
)
"#;

// Lowest created_at wins; id breaks ties so the choice is deterministic.
const PROMOTE_FIRST_USER: &str = r#"
UPDATE users SET role = 'admin'
WHERE id = (SELECT id FROM users ORDER BY created_at ASC, id ASC LIMIT 1)
"#;

/// Ensures the audit table and the `users.role` column exist.
///
/// The whole routine runs in one transaction (Postgres DDL is transactional),
/// so a failure at any step leaves the schema untouched. The first user ever
/// created is promoted to admin exactly once: only when the role column was
/// absent before this call.
pub async fn ensure_admin_schema(db: &PgPool) -> anyhow::Result<()> {
    let mut tx = db.begin().await?;

    sqlx::query(CREATE_AUDIT_LOGS).execute(&mut *tx).await?;

    let has_role: bool = sqlx::query_scalar(ROLE_COLUMN_EXISTS)
        .fetch_one(&mut *tx)
        .await?;

    if !has_role {
        sqlx::query("ALTER TABLE users ADD COLUMN role TEXT NOT NULL DEFAULT 'user'")
            .execute(&mut *tx)
            .await?;
        let promoted = sqlx::query(PROMOTE_FIRST_USER)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        info!(promoted, "added role column to users");
    }

    tx.commit().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::users::repo::Role;

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires a reachable PostgreSQL (DATABASE_URL)"]
    async fn migrator_is_idempotent_and_promotes_once(pool: PgPool) {
        // Distinct created_at values so the promotion choice is fixed.
        sqlx::query(
            "INSERT INTO users (username, email, created_at) VALUES
             ('first', 'first@example.com', now() - interval '2 days'),
             ('second', 'second@example.com', now() - interval '1 day')",
        )
        .execute(&pool)
        .await
        .unwrap();

        ensure_admin_schema(&pool).await.unwrap();
        ensure_admin_schema(&pool).await.unwrap();

        let admins: Vec<String> = sqlx::query_scalar(
            "SELECT username FROM users WHERE role = 'admin' ORDER BY username",
        )
        .fetch_all(&pool)
        .await
        .unwrap();
        assert_eq!(admins, vec!["first".to_string()]);

        // The audit table exists and is usable after repeated runs.
        let entries: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM audit_logs")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(entries, 0);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires a reachable PostgreSQL (DATABASE_URL)"]
    async fn later_users_default_to_user_role(pool: PgPool) {
        ensure_admin_schema(&pool).await.unwrap();

        sqlx::query("INSERT INTO users (username, email) VALUES ('late', 'late@example.com')")
            .execute(&pool)
            .await
            .unwrap();

        let role: Role =
            sqlx::query_scalar("SELECT role FROM users WHERE username = 'late'")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(role, Role::User);
    }
}
