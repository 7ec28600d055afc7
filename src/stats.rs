//! Aggregate statistics for the admin dashboard. Read-only; every query
//! tolerates empty tables. Time windows are relative to the moment of the
//! call, so results drift as the clock moves.

use serde::Serialize;
use sqlx::{FromRow, PgPool};

#[derive(Debug, Serialize)]
pub struct UserStats {
    pub total_users: i64,
    /// Accounts created within the trailing 7 days.
    pub new_users_7d: i64,
    /// Distinct accounts with at least one OAuth connection.
    pub oauth_users: i64,
}

#[derive(Debug, Serialize, FromRow)]
pub struct MonthlyTripCount {
    /// "MM-YYYY" label.
    pub month: String,
    pub trips: i64,
}

#[derive(Debug, Serialize)]
pub struct TripStats {
    pub total_trips: i64,
    /// Trips dated within the trailing 30 days.
    pub recent_trips_30d: i64,
    /// Mean cost across all trips; 0 when there are none.
    pub avg_cost: f64,
    /// Trailing 6 months, most recent first.
    pub monthly: Vec<MonthlyTripCount>,
}

pub async fn user_stats(db: &PgPool) -> anyhow::Result<UserStats> {
    let total_users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(db)
        .await?;
    let new_users_7d: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM users WHERE created_at > now() - interval '7 days'",
    )
    .fetch_one(db)
    .await?;
    let oauth_users: i64 =
        sqlx::query_scalar("SELECT COUNT(DISTINCT user_id) FROM oauth_connections")
            .fetch_one(db)
            .await?;

    Ok(UserStats {
        total_users,
        new_users_7d,
        oauth_users,
    })
}

pub async fn trip_stats(db: &PgPool) -> anyhow::Result<TripStats> {
    let total_trips: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM trips")
        .fetch_one(db)
        .await?;
    let recent_trips_30d: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM trips WHERE date > CURRENT_DATE - interval '30 days'",
    )
    .fetch_one(db)
    .await?;
    let avg_cost: f64 =
        sqlx::query_scalar("SELECT COALESCE(AVG(cost), 0)::double precision FROM trips")
            .fetch_one(db)
            .await?;
    let monthly = sqlx::query_as::<_, MonthlyTripCount>(
        r#"
        SELECT to_char(date_trunc('month', date), 'MM-YYYY') AS month,
               COUNT(*) AS trips
        FROM trips
        WHERE date > CURRENT_DATE - interval '6 months'
        GROUP BY date_trunc('month', date)
        ORDER BY date_trunc('month', date) DESC
        "#,
    )
    .fetch_all(db)
    .await?;

    Ok(TripStats {
        total_trips,
        recent_trips_30d,
        avg_cost,
        monthly,
    })
}
