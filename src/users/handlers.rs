use axum::{extract::State, routing::get, Json, Router};
use tracing::instrument;

use crate::auth::extractors::CurrentUser;
use crate::error::AppError;
use crate::state::AppState;
use crate::users::dto::{ProfileResponse, PublicUser};
use crate::users::repo::User;

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(profile))
}

/// Profile view for the authenticated user: account fields, linked OAuth
/// providers and a trip summary.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn profile(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<ProfileResponse>, AppError> {
    let oauth_providers = User::oauth_providers(&state.db, user.id).await?;
    let (trip_count, first_trip, last_trip) = User::trip_summary(&state.db, user.id).await?;

    Ok(Json(ProfileResponse {
        user: PublicUser {
            id: user.id,
            username: user.username,
            email: user.email,
            created_at: user.created_at,
            role: user.role,
        },
        oauth_providers,
        trip_count,
        first_trip,
        last_trip,
    }))
}
